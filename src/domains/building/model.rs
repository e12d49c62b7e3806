use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A typed parameter value as carried by the map document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    String(String),
    Int(i64),
    Double(f64),
    Bool(bool),
}

impl ParamValue {
    /// Numeric view of the value. Strings are parsed; booleans are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Double(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::String(s) => s.trim().parse::<f64>().ok(),
            ParamValue::Bool(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Double(v) if v.fract() == 0.0 => Some(*v as i64),
            ParamValue::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Int(v) => Some(*v != 0),
            ParamValue::String(s) => s.trim().parse::<bool>().ok(),
            ParamValue::Double(_) => None,
        }
    }

    /// Text rendering used for string-valued parameters such as names and types.
    pub fn to_text(&self) -> String {
        match self {
            ParamValue::String(s) => s.clone(),
            ParamValue::Int(v) => v.to_string(),
            ParamValue::Double(v) => v.to_string(),
            ParamValue::Bool(b) => b.to_string(),
        }
    }
}

pub type ParamBag = BTreeMap<String, ParamValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub name: String,
    pub levels: Vec<Level>,
    pub lifts: Vec<Lift>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub elevation: f64,
    pub floor_plan: Option<FloorPlan>,
    pub vertices: Vec<Vertex>,
    pub lanes: Vec<Lane>,
    pub doors: Vec<Door>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPlan {
    pub filename: String,
    pub transform: LevelTransform,
}

/// 2-D affine placement of a floor-plan image in level coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTransform {
    pub scale: f64,
    pub translation_x: f64,
    pub translation_y: f64,
    pub yaw: f64,
}

impl Default for LevelTransform {
    fn default() -> Self {
        Self { scale: 1.0, translation_x: 0.0, translation_y: 0.0, yaw: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub name: String,
    #[serde(default)]
    pub params: ParamBag,
}

impl Vertex {
    pub fn new(x: f64, y: f64, name: impl Into<String>) -> Self {
        Self { x, y, name: name.into(), params: ParamBag::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub start_idx: usize,
    pub end_idx: usize,
    pub graph_idx: u32,
    pub bidirectional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub start_idx: usize,
    pub end_idx: usize,
    pub params: ParamBag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lift {
    pub name: String,
    pub level_names: Vec<String>,
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub width: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavVertex {
    pub x: f64,
    pub y: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavLane {
    pub v1_idx: usize,
    pub v2_idx: usize,
    pub is_bidirectional: bool,
}

/// Navigation graph derived from one graph index of a level.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavGraph {
    pub vertices: Vec<NavVertex>,
    pub lanes: Vec<NavLane>,
}

impl Level {
    /// Derive the navigation graph for `graph_idx`.
    ///
    /// Only vertices touched by a matching lane are emitted, numbered in the
    /// order lanes first reference them. When `always_unidirectional` is set a
    /// bidirectional lane becomes two opposite one-way lanes.
    pub fn generate_nav_graph(&self, graph_idx: u32, always_unidirectional: bool) -> NavGraph {
        let lanes: Vec<&Lane> = self
            .lanes
            .iter()
            .filter(|l| l.graph_idx == graph_idx)
            .filter(|l| l.start_idx < self.vertices.len() && l.end_idx < self.vertices.len())
            .collect();

        let mut remap: HashMap<usize, usize> = HashMap::new();
        let mut order: Vec<usize> = Vec::new();
        for lane in &lanes {
            for idx in [lane.start_idx, lane.end_idx] {
                remap.entry(idx).or_insert_with(|| {
                    order.push(idx);
                    order.len() - 1
                });
            }
        }

        let mut graph = NavGraph {
            vertices: order
                .iter()
                .map(|&idx| {
                    let v = &self.vertices[idx];
                    NavVertex { x: v.x, y: v.y, name: v.name.clone() }
                })
                .collect(),
            lanes: Vec::with_capacity(lanes.len()),
        };

        for lane in lanes {
            let v1 = remap[&lane.start_idx];
            let v2 = remap[&lane.end_idx];
            if always_unidirectional && lane.bidirectional {
                graph.lanes.push(NavLane { v1_idx: v1, v2_idx: v2, is_bidirectional: false });
                graph.lanes.push(NavLane { v1_idx: v2, v2_idx: v1, is_bidirectional: false });
            } else {
                graph.lanes.push(NavLane { v1_idx: v1, v2_idx: v2, is_bidirectional: lane.bidirectional });
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_with_lanes(lanes: Vec<Lane>) -> Level {
        Level {
            name: "L1".to_string(),
            elevation: 0.0,
            floor_plan: None,
            vertices: vec![
                Vertex::new(0.0, 0.0, "a"),
                Vertex::new(1.0, 0.0, ""),
                Vertex::new(2.0, 0.0, "c"),
                Vertex::new(3.0, 0.0, "d"),
            ],
            lanes,
            doors: vec![],
        }
    }

    #[test]
    fn test_nav_graph_reindexes_only_used_vertices() {
        let level = level_with_lanes(vec![
            Lane { start_idx: 3, end_idx: 1, graph_idx: 0, bidirectional: true },
            Lane { start_idx: 1, end_idx: 2, graph_idx: 0, bidirectional: false },
            Lane { start_idx: 0, end_idx: 2, graph_idx: 1, bidirectional: true },
        ]);

        let graph = level.generate_nav_graph(0, false);
        let names: Vec<&str> = graph.vertices.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["d", "", "c"]);
        assert_eq!(
            graph.lanes,
            vec![
                NavLane { v1_idx: 0, v2_idx: 1, is_bidirectional: true },
                NavLane { v1_idx: 1, v2_idx: 2, is_bidirectional: false },
            ]
        );
    }

    #[test]
    fn test_nav_graph_splits_bidirectional_when_forced() {
        let level = level_with_lanes(vec![Lane { start_idx: 0, end_idx: 1, graph_idx: 2, bidirectional: true }]);

        let graph = level.generate_nav_graph(2, true);
        assert_eq!(graph.lanes.len(), 2);
        assert_eq!((graph.lanes[1].v1_idx, graph.lanes[1].v2_idx), (1, 0));
        assert!(graph.lanes.iter().all(|l| !l.is_bidirectional));
    }

    #[test]
    fn test_nav_graph_for_unused_index_is_empty() {
        let level = level_with_lanes(vec![Lane { start_idx: 0, end_idx: 1, graph_idx: 0, bidirectional: true }]);
        let graph = level.generate_nav_graph(5, false);
        assert!(graph.lanes.is_empty());
        assert!(graph.vertices.is_empty());
    }

    #[test]
    fn test_param_value_numeric_views() {
        assert_eq!(ParamValue::String(" 90.5 ".into()).as_f64(), Some(90.5));
        assert_eq!(ParamValue::Int(-1).as_f64(), Some(-1.0));
        assert_eq!(ParamValue::Bool(true).as_f64(), None);
        assert_eq!(ParamValue::Double(1.0).as_i64(), Some(1));
        assert_eq!(ParamValue::Double(1.5).as_i64(), None);
    }
}
