use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerDto {
    pub total: u64,
    pub spent: u64,
    pub available: u64,
}
