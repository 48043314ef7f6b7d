//! Journal configuration

use serde::{Deserialize, Serialize};

/// How hard an append pushes a record towards stable storage before returning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SyncPolicy {
    /// Hand the bytes to the OS; a crash may lose recent records
    Buffered,
    /// `fdatasync` after every record
    #[default]
    Data,
    /// `fsync` (data and metadata) after every record
    All,
}

/// Configuration for a record log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Durability applied on every append
    pub sync: SyncPolicy,
}

impl JournalConfig {
    /// Configuration with an explicit sync policy
    pub fn with_sync(sync: SyncPolicy) -> Self {
        Self { sync }
    }
}
