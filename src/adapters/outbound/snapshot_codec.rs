use serde::{Deserialize, Serialize};

use crate::common::{ApplicationError, ApplicationResult};
use crate::domains::building_map::BuildingMapSnapshot;

/// Payload format for snapshots leaving the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    #[default]
    Binary,
    Json,
}

impl SnapshotFormat {
    pub fn encode(&self, snapshot: &BuildingMapSnapshot) -> ApplicationResult<Vec<u8>> {
        match self {
            SnapshotFormat::Binary => bincode::serialize(snapshot)
                .map_err(|e| ApplicationError::Transport(format!("Failed to encode snapshot: {}", e))),
            SnapshotFormat::Json => serde_json::to_vec(snapshot)
                .map_err(|e| ApplicationError::Transport(format!("Failed to encode snapshot: {}", e))),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> ApplicationResult<BuildingMapSnapshot> {
        match self {
            SnapshotFormat::Binary => bincode::deserialize(bytes)
                .map_err(|e| ApplicationError::Transport(format!("Failed to decode snapshot: {}", e))),
            SnapshotFormat::Json => serde_json::from_slice(bytes)
                .map_err(|e| ApplicationError::Transport(format!("Failed to decode snapshot: {}", e))),
        }
    }
}
