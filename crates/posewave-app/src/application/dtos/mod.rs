mod ledger_dto;
mod round_dto;
mod stats_dto;

pub use ledger_dto::LedgerDto;
pub use round_dto::RoundSnapshotDto;
pub use stats_dto::{StatsDto, StreakDto, TrendPointDto};
