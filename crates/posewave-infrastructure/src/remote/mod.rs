mod ledger_repo;
mod profile_repo;
mod session_history_repo;

pub use ledger_repo::RemoteLedgerRepository;
pub use profile_repo::RemoteProfileRepository;
pub use session_history_repo::RemoteSessionHistoryRepository;
