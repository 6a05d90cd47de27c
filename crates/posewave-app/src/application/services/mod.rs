mod ledger_service;
mod profile_service;
mod round_controller;
mod session_recorder;
mod stats_service;

#[cfg(test)]
mod tests;

pub use ledger_service::LedgerService;
pub use profile_service::ProfileService;
pub use round_controller::RoundController;
pub use session_recorder::SessionRecorder;
pub use stats_service::StatsService;
