mod database;
mod local_state_repo;

pub use database::Database;
pub use local_state_repo::SqliteLocalStateRepository;
