use crate::common::ApplicationResult;
use async_trait::async_trait;
use std::sync::Arc;

use super::snapshot::BuildingMapSnapshot;

/// Port for the retained "latest map" broadcast.
///
/// Implementations must deliver the published value to subscribers that
/// join after `publish` returned.
#[async_trait]
pub trait MapPublisher: Send + Sync {
    async fn publish(&self, snapshot: Arc<BuildingMapSnapshot>) -> ApplicationResult<()>;
}

/// Fetch request. Carries no filters yet; every request receives the full map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetBuildingMapRequest {}

#[derive(Debug, Clone)]
pub struct GetBuildingMapResponse {
    pub building_map: Arc<BuildingMapSnapshot>,
}
