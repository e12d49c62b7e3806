use serde::{Deserialize, Serialize};

/// Immutable wire representation of a whole building map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingMapSnapshot {
    pub name: String,
    pub levels: Vec<LevelSnapshot>,
    pub lifts: Vec<LiftSnapshot>,
}

impl BuildingMapSnapshot {
    pub fn level(&self, name: &str) -> Option<&LevelSnapshot> {
        self.levels.iter().find(|l| l.name == name)
    }

    /// Total floor-plan payload carried by the snapshot.
    pub fn image_bytes(&self) -> usize {
        self.levels
            .iter()
            .flat_map(|l| l.images.iter())
            .map(|i| i.data.len())
            .sum()
    }

    pub fn door_count(&self) -> usize {
        self.levels.iter().map(|l| l.doors.len()).sum()
    }

    pub fn graph_count(&self) -> usize {
        self.levels.iter().map(|l| l.nav_graphs.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub name: String,
    pub elevation: f64,
    /// Zero or one floor plan.
    pub images: Vec<ImageSnapshot>,
    pub doors: Vec<DoorSnapshot>,
    pub nav_graphs: Vec<GraphSnapshot>,
}

impl LevelSnapshot {
    pub fn nav_graph(&self, name: &str) -> Option<&GraphSnapshot> {
        self.nav_graphs.iter().find(|g| g.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSnapshot {
    pub encoding: String,
    pub scale: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    pub yaw: f64,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorType {
    Undefined,
    SingleSliding,
    SingleSwing,
    DoubleSliding,
    DoubleSwing,
}

impl DoorType {
    /// Map the document's door `type` string. Unknown values are tolerated as `Undefined`.
    pub fn from_model(value: &str) -> Self {
        match value {
            "sliding" => DoorType::SingleSliding,
            "hinged" => DoorType::SingleSwing,
            "double_sliding" => DoorType::DoubleSliding,
            "double_hinged" => DoorType::DoubleSwing,
            _ => DoorType::Undefined,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorSnapshot {
    pub name: String,
    pub v1_x: f64,
    pub v1_y: f64,
    pub v2_x: f64,
    pub v2_y: f64,
    pub motion_range: f64,
    pub motion_direction: i32,
    pub door_type: DoorType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub name: String,
    pub vertices: Vec<GraphNodeSnapshot>,
    pub edges: Vec<GraphEdgeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNodeSnapshot {
    pub x: f64,
    pub y: f64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeType {
    Unidirectional,
    Bidirectional,
}

impl From<bool> for EdgeType {
    fn from(is_bidirectional: bool) -> Self {
        if is_bidirectional {
            EdgeType::Bidirectional
        } else {
            EdgeType::Unidirectional
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdgeSnapshot {
    pub v1_idx: usize,
    pub v2_idx: usize,
    pub edge_type: EdgeType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiftSnapshot {
    pub name: String,
    pub levels: Vec<String>,
    pub ref_x: f64,
    pub ref_y: f64,
    pub ref_yaw: f64,
    pub width: f64,
    pub depth: f64,
}
