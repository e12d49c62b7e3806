use serde_yaml::{Mapping, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::common::{LoadError, LoadResult};
use crate::domains::building::{
    Building, BuildingModelProvider, Door, FloorPlan, Lane, Level, LevelTransform, Lift, ParamBag, ParamValue,
    Vertex,
};

const REFERENCE_IMAGE: &str = "reference_image";

/// Building model provider for traffic-editor building YAML documents.
///
/// Levels and lifts keep their document order. Parameters use the editor's
/// `[type_code, value]` pairs (1 string, 2 int, 3 double, 4 bool).
pub struct YamlBuildingSource {
    path: PathBuf,
    base_dir: PathBuf,
}

impl YamlBuildingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let base_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self { path, base_dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a document already held in memory. Errors cite this source's path.
    pub fn parse(&self, text: &str) -> LoadResult<Building> {
        let root: Value = serde_yaml::from_str(text).map_err(|e| self.parse_error(e.to_string()))?;
        let root = root
            .as_mapping()
            .ok_or_else(|| self.parse_error("document root is not a mapping"))?;

        let name = root
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| self.parse_error("missing building 'name'"))?
            .to_string();

        let reference_image = root
            .get("coordinate_system")
            .and_then(Value::as_str)
            .map_or(true, |cs| cs == REFERENCE_IMAGE);

        let mut levels = Vec::new();
        let mut scales = Vec::new();
        if let Some(nodes) = optional_mapping(root, "levels").map_err(|r| self.parse_error(r))? {
            for (key, node) in nodes {
                let level_name = key
                    .as_str()
                    .ok_or_else(|| self.parse_error("level name is not a string"))?;
                let (level, scale) = self.parse_level(level_name, node, reference_image)?;
                levels.push(level);
                scales.push(scale);
            }
        }

        let mut lifts = Vec::new();
        if let Some(nodes) = optional_mapping(root, "lifts").map_err(|r| self.parse_error(r))? {
            for (key, node) in nodes {
                let lift_name = key
                    .as_str()
                    .ok_or_else(|| self.parse_error("lift name is not a string"))?;
                lifts.push(self.parse_lift(lift_name, node, &levels, &scales, reference_image)?);
            }
        }

        Ok(Building { name, levels, lifts })
    }

    /// Returns the level together with its metres-per-pixel scale.
    fn parse_level(&self, name: &str, node: &Value, reference_image: bool) -> LoadResult<(Level, f64)> {
        let ctx = |reason: String| self.parse_error(format!("level {}: {}", name, reason));
        let node = node.as_mapping().ok_or_else(|| ctx("not a mapping".into()))?;

        let elevation = node.get("elevation").and_then(Value::as_f64).unwrap_or(0.0);

        let mut raw_vertices = Vec::new();
        for (idx, item) in sequence(node, "vertices").map_err(ctx)?.iter().enumerate() {
            raw_vertices.push(parse_vertex(item).map_err(|r| ctx(format!("vertex {}: {}", idx, r)))?);
        }

        let scale = if reference_image {
            let measurements = sequence(node, "measurements").map_err(ctx)?;
            self.measured_scale(name, measurements, &raw_vertices)?
        } else {
            1.0
        };

        // Doors read these converted vertices too, so door endpoints share the
        // nav-graph frame instead of raw image pixels.
        let vertices = raw_vertices
            .into_iter()
            .map(|v| {
                let (x, y) = to_level_frame(v.x, v.y, scale, reference_image);
                Vertex { x, y, ..v }
            })
            .collect::<Vec<_>>();

        let mut lanes = Vec::new();
        for (idx, item) in sequence(node, "lanes").map_err(ctx)?.iter().enumerate() {
            let (start_idx, end_idx, params) =
                parse_edge(item).map_err(|r| ctx(format!("lane {}: {}", idx, r)))?;
            if start_idx >= vertices.len() || end_idx >= vertices.len() {
                return Err(LoadError::Invalid {
                    path: self.path.clone(),
                    reason: format!(
                        "level {}: lane {} references vertex {} but the level has {} vertices",
                        name,
                        idx,
                        start_idx.max(end_idx),
                        vertices.len()
                    ),
                });
            }
            // absent attributes default; present but unusable ones are rejected
            let invalid = |param: &str, value: &ParamValue| LoadError::Invalid {
                path: self.path.clone(),
                reason: format!(
                    "level {}: lane {} has invalid '{}': {}",
                    name,
                    idx,
                    param,
                    value.to_text()
                ),
            };
            let graph_idx = match params.get("graph_idx") {
                None => 0,
                Some(value) => value
                    .as_i64()
                    .and_then(|g| u32::try_from(g).ok())
                    .ok_or_else(|| invalid("graph_idx", value))?,
            };
            let bidirectional = match params.get("bidirectional") {
                None => false,
                Some(value) => value.as_bool().ok_or_else(|| invalid("bidirectional", value))?,
            };
            lanes.push(Lane {
                start_idx,
                end_idx,
                graph_idx,
                bidirectional,
            });
        }

        let mut doors = Vec::new();
        for (idx, item) in sequence(node, "doors").map_err(ctx)?.iter().enumerate() {
            let (start_idx, end_idx, params) =
                parse_edge(item).map_err(|r| ctx(format!("door {}: {}", idx, r)))?;
            doors.push(Door { start_idx, end_idx, params });
        }

        let floor_plan = node
            .get("drawing")
            .and_then(|d| d.get("filename"))
            .and_then(Value::as_str)
            .filter(|f| !f.is_empty())
            .map(|filename| FloorPlan {
                filename: filename.to_string(),
                transform: LevelTransform { scale, ..LevelTransform::default() },
            });

        let level = Level {
            name: name.to_string(),
            elevation,
            floor_plan,
            vertices,
            lanes,
            doors,
        };
        Ok((level, scale))
    }

    /// Metres per pixel: mean of `distance / pixel length` over the level's measurements.
    fn measured_scale(&self, level: &str, measurements: &[Value], vertices: &[Vertex]) -> LoadResult<f64> {
        let mut ratios = Vec::new();
        for (idx, item) in measurements.iter().enumerate() {
            let (v1, v2, params) = parse_edge(item)
                .map_err(|r| self.parse_error(format!("level {}: measurement {}: {}", level, idx, r)))?;
            let (a, b) = match (vertices.get(v1), vertices.get(v2)) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    return Err(LoadError::Invalid {
                        path: self.path.clone(),
                        reason: format!("level {}: measurement {} references a missing vertex", level, idx),
                    })
                }
            };
            let pixels = (b.x - a.x).hypot(b.y - a.y);
            let distance = params.get("distance").and_then(ParamValue::as_f64);
            if let Some(distance) = distance.filter(|_| pixels > 0.0) {
                ratios.push(distance / pixels);
            }
        }
        if ratios.is_empty() {
            return Ok(1.0);
        }
        Ok(ratios.iter().sum::<f64>() / ratios.len() as f64)
    }

    fn parse_lift(
        &self,
        name: &str,
        node: &Value,
        levels: &[Level],
        scales: &[f64],
        reference_image: bool,
    ) -> LoadResult<Lift> {
        let node = node
            .as_mapping()
            .ok_or_else(|| self.parse_error(format!("lift {}: not a mapping", name)))?;
        let number = |key: &str| -> LoadResult<f64> {
            node.get(key)
                .and_then(Value::as_f64)
                .ok_or_else(|| self.parse_error(format!("lift {}: missing numeric '{}'", name, key)))
        };

        let level_names = match node.get("level_doors").and_then(Value::as_mapping) {
            Some(doors) => doors
                .iter()
                .filter_map(|(level, _)| level.as_str())
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        };

        // lift poses are drawn on the reference floor
        let reference = node.get("reference_floor_name").and_then(Value::as_str);
        let reference_idx = levels
            .iter()
            .position(|l| Some(l.name.as_str()) == reference)
            .unwrap_or(0);
        let scale = scales.get(reference_idx).copied().unwrap_or(1.0);
        let (x, y) = to_level_frame(number("x")?, number("y")?, scale, reference_image);

        Ok(Lift {
            name: name.to_string(),
            level_names,
            x,
            y,
            yaw: number("yaw")?,
            width: number("width")?,
            depth: number("depth")?,
        })
    }

    fn parse_error(&self, reason: impl Into<String>) -> LoadError {
        LoadError::Parse {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

impl BuildingModelProvider for YamlBuildingSource {
    fn load(&self) -> LoadResult<Building> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LoadError::NotFound { path: self.path.clone() },
            _ => LoadError::Io { path: self.path.clone(), source: e },
        })?;
        self.parse(&text)
    }

    fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

fn to_level_frame(x: f64, y: f64, scale: f64, reference_image: bool) -> (f64, f64) {
    if reference_image {
        // image rows grow downwards
        (x * scale, -y * scale)
    } else {
        (x, y)
    }
}

fn optional_mapping<'a>(node: &'a Mapping, key: &str) -> Result<Option<&'a Mapping>, String> {
    match node.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Mapping(m)) => Ok(Some(m)),
        Some(_) => Err(format!("'{}' is not a mapping", key)),
    }
}

fn sequence<'a>(node: &'a Mapping, key: &str) -> Result<&'a [Value], String> {
    match node.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Sequence(items)) => Ok(items.as_slice()),
        Some(_) => Err(format!("'{}' is not a list", key)),
    }
}

/// `[x, y, z?, name?, {params}?]`
fn parse_vertex(item: &Value) -> Result<Vertex, String> {
    let fields = item.as_sequence().ok_or("not a list")?;
    let coord = |i: usize| fields.get(i).and_then(Value::as_f64).ok_or(format!("field {} is not a number", i));
    let x = coord(0)?;
    let y = coord(1)?;
    let name = fields
        .iter()
        .skip(2)
        .find_map(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let params = match fields.iter().skip(2).find_map(Value::as_mapping) {
        Some(m) => parse_params(m)?,
        None => ParamBag::new(),
    };
    Ok(Vertex { x, y, name, params })
}

/// `[start_idx, end_idx, {params}?]`
fn parse_edge(item: &Value) -> Result<(usize, usize, ParamBag), String> {
    let fields = item.as_sequence().ok_or("not a list")?;
    let index = |i: usize| {
        fields
            .get(i)
            .and_then(Value::as_u64)
            .map(|v| v as usize)
            .ok_or(format!("field {} is not a vertex index", i))
    };
    let params = match fields.get(2).and_then(Value::as_mapping) {
        Some(m) => parse_params(m)?,
        None => ParamBag::new(),
    };
    Ok((index(0)?, index(1)?, params))
}

fn parse_params(node: &Mapping) -> Result<ParamBag, String> {
    let mut bag = ParamBag::new();
    for (key, value) in node {
        let key = key.as_str().ok_or("parameter name is not a string")?;
        let value = parse_param(value).ok_or(format!("parameter '{}' has an unsupported value", key))?;
        bag.insert(key.to_string(), value);
    }
    Ok(bag)
}

fn parse_param(value: &Value) -> Option<ParamValue> {
    if let Some(pair) = value.as_sequence() {
        if let [Value::Number(code), raw] = pair.as_slice() {
            return match code.as_u64()? {
                1 => Some(ParamValue::String(scalar_text(raw)?)),
                2 => raw.as_i64().map(ParamValue::Int),
                3 => raw.as_f64().map(ParamValue::Double),
                4 => raw.as_bool().map(ParamValue::Bool),
                _ => None,
            };
        }
        return None;
    }
    match value {
        Value::String(s) => Some(ParamValue::String(s.clone())),
        Value::Bool(b) => Some(ParamValue::Bool(*b)),
        Value::Number(n) if n.is_i64() || n.is_u64() => n.as_i64().map(ParamValue::Int),
        Value::Number(n) => n.as_f64().map(ParamValue::Double),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
