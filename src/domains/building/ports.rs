use crate::common::LoadResult;
use super::model::Building;
use std::path::Path;

/// Port the snapshot builder depends on for the building model.
/// Adapters parse a concrete map document format.
pub trait BuildingModelProvider: Send + Sync {
    fn load(&self) -> LoadResult<Building>;

    /// Directory relative floor-plan filenames are resolved against.
    fn base_dir(&self) -> &Path;
}
