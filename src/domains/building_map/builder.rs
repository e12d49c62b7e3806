use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use crate::common::{BuildError, BuildResult};
use crate::domains::building::{Building, Door, FloorPlan, Level, Lift, ParamBag, ParamValue};
use crate::domains::logger::DynLogger;

use super::snapshot::*;

/// Graph indices 0..NAV_GRAPH_COUNT are translated; graphs are named by their index.
pub const NAV_GRAPH_COUNT: u32 = 9;

/// Door parameters after validation of the document's parameter bag.
#[derive(Debug, Clone, PartialEq)]
pub struct DoorParams {
    pub name: String,
    pub motion_range: f64,
    pub motion_direction: i32,
    pub door_type: DoorType,
}

impl DoorParams {
    pub fn from_bag(level: &str, door_idx: usize, bag: &ParamBag) -> BuildResult<Self> {
        let door_label = bag
            .get("name")
            .map(ParamValue::to_text)
            .unwrap_or_else(|| format!("#{}", door_idx));

        let require = |param: &'static str| {
            bag.get(param).ok_or_else(|| BuildError::MissingParameter {
                level: level.to_string(),
                door: door_label.clone(),
                param,
            })
        };
        let invalid = |param: &'static str, value: &ParamValue| BuildError::InvalidParameter {
            level: level.to_string(),
            door: door_label.clone(),
            param,
            value: value.to_text(),
        };

        let name = require("name")?.to_text();

        let motion_degrees = require("motion_degrees")?;
        let motion_range = motion_degrees
            .as_f64()
            .ok_or_else(|| invalid("motion_degrees", motion_degrees))?;

        let direction = require("motion_direction")?;
        let motion_direction = direction
            .as_i64()
            .and_then(|d| i32::try_from(d).ok())
            .ok_or_else(|| invalid("motion_direction", direction))?;

        let door_type = DoorType::from_model(&require("type")?.to_text());

        Ok(Self { name, motion_range, motion_direction, door_type })
    }
}

/// Encoding tag for a floor-plan file: the text after the last `.` of its file name.
pub fn image_encoding(filename: &str, lowercase: bool) -> String {
    let file = Path::new(filename)
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(filename);
    let suffix = file.rsplit('.').next().unwrap_or(file);
    if lowercase {
        suffix.to_lowercase()
    } else {
        suffix.to_string()
    }
}

/// Translates a loaded [`Building`] into a [`BuildingMapSnapshot`].
pub struct SnapshotBuilder {
    base_dir: PathBuf,
    logger: Option<DynLogger>,
    lowercase_encoding: bool,
}

impl SnapshotBuilder {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            logger: None,
            lowercase_encoding: true,
        }
    }

    pub fn with_logger(mut self, logger: DynLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn lowercase_encoding(mut self, enabled: bool) -> Self {
        self.lowercase_encoding = enabled;
        self
    }

    /// Build the full snapshot. The first inconsistency aborts the whole build.
    pub fn build(&self, building: &Building) -> BuildResult<BuildingMapSnapshot> {
        let levels = building
            .levels
            .iter()
            .map(|level| self.level_snapshot(level))
            .collect::<BuildResult<Vec<_>>>()?;
        let lifts = building.lifts.iter().map(lift_snapshot).collect();

        Ok(BuildingMapSnapshot {
            name: building.name.clone(),
            levels,
            lifts,
        })
    }

    fn level_snapshot(&self, level: &Level) -> BuildResult<LevelSnapshot> {
        let images = match &level.floor_plan {
            Some(plan) => vec![self.image_snapshot(plan)?],
            None => Vec::new(),
        };

        let doors = level
            .doors
            .iter()
            .enumerate()
            .map(|(idx, door)| door_snapshot(level, idx, door))
            .collect::<BuildResult<Vec<_>>>()?;

        Ok(LevelSnapshot {
            name: level.name.clone(),
            elevation: level.elevation,
            images,
            doors,
            nav_graphs: nav_graphs(level),
        })
    }

    fn image_snapshot(&self, plan: &FloorPlan) -> BuildResult<ImageSnapshot> {
        let path = self.base_dir.join(&plan.filename);
        self.log_info(&format!("opening: {}", path.display()));

        let mut file = fs::File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => BuildError::ImageNotFound { path: path.clone() },
            _ => BuildError::ImageRead { path: path.clone(), source: e },
        })?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| BuildError::ImageRead { path: path.clone(), source: e })?;
        self.log_info(&format!("read {} byte image: {}", data.len(), plan.filename));

        Ok(ImageSnapshot {
            encoding: image_encoding(&plan.filename, self.lowercase_encoding),
            scale: plan.transform.scale,
            x_offset: plan.transform.translation_x,
            y_offset: plan.transform.translation_y,
            yaw: plan.transform.yaw,
            data,
        })
    }

    fn log_info(&self, msg: &str) {
        if let Some(logger) = &self.logger {
            logger.info(msg);
        }
    }
}

fn door_snapshot(level: &Level, door_idx: usize, door: &Door) -> BuildResult<DoorSnapshot> {
    let params = DoorParams::from_bag(&level.name, door_idx, &door.params)?;

    let vertex = |index: usize| {
        level.vertices.get(index).ok_or_else(|| BuildError::VertexIndexOutOfRange {
            level: level.name.clone(),
            door: params.name.clone(),
            index,
            vertex_count: level.vertices.len(),
        })
    };
    let v1 = vertex(door.start_idx)?;
    let v2 = vertex(door.end_idx)?;

    Ok(DoorSnapshot {
        v1_x: v1.x,
        v1_y: v1.y,
        v2_x: v2.x,
        v2_y: v2.y,
        motion_range: params.motion_range,
        motion_direction: params.motion_direction,
        door_type: params.door_type,
        name: params.name,
    })
}

fn nav_graphs(level: &Level) -> Vec<GraphSnapshot> {
    (0..NAV_GRAPH_COUNT)
        .filter_map(|graph_idx| {
            let graph = level.generate_nav_graph(graph_idx, false);
            if graph.lanes.is_empty() {
                return None;
            }
            Some(GraphSnapshot {
                name: graph_idx.to_string(),
                vertices: graph
                    .vertices
                    .into_iter()
                    .map(|v| GraphNodeSnapshot { x: v.x, y: v.y, name: v.name })
                    .collect(),
                edges: graph
                    .lanes
                    .into_iter()
                    .map(|l| GraphEdgeSnapshot {
                        v1_idx: l.v1_idx,
                        v2_idx: l.v2_idx,
                        edge_type: EdgeType::from(l.is_bidirectional),
                    })
                    .collect(),
            })
        })
        .collect()
}

fn lift_snapshot(lift: &Lift) -> LiftSnapshot {
    LiftSnapshot {
        name: lift.name.clone(),
        levels: lift.level_names.clone(),
        ref_x: lift.x,
        ref_y: lift.y,
        ref_yaw: lift.yaw,
        width: lift.width,
        depth: lift.depth,
    }
}

/// Build with default options: lowercase encodings, no logging.
pub fn build(model: &Building, base_dir: &Path) -> BuildResult<BuildingMapSnapshot> {
    SnapshotBuilder::new(base_dir).build(model)
}
