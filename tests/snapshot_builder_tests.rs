use building_map_server::common::BuildError;
use building_map_server::domains::building::*;
use building_map_server::domains::building_map::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn door(start_idx: usize, end_idx: usize, name: &str, door_type: &str) -> Door {
    let mut params = ParamBag::new();
    params.insert("name".into(), ParamValue::String(name.into()));
    params.insert("motion_degrees".into(), ParamValue::Double(90.0));
    params.insert("motion_direction".into(), ParamValue::Int(1));
    params.insert("type".into(), ParamValue::String(door_type.into()));
    Door { start_idx, end_idx, params }
}

fn level(name: &str) -> Level {
    Level {
        name: name.to_string(),
        elevation: 0.0,
        floor_plan: None,
        vertices: vec![Vertex::new(0.0, 0.0, "a"), Vertex::new(1.0, 0.0, "b")],
        lanes: vec![],
        doors: vec![],
    }
}

fn building(levels: Vec<Level>, lifts: Vec<Lift>) -> Building {
    Building { name: "test_building".to_string(), levels, lifts }
}

fn lift(name: &str, levels: &[&str]) -> Lift {
    Lift {
        name: name.to_string(),
        level_names: levels.iter().map(|l| l.to_string()).collect(),
        x: 4.0,
        y: -2.0,
        yaw: 1.57,
        width: 2.0,
        depth: 1.5,
    }
}

#[test]
fn test_single_level_end_to_end() {
    let mut l1 = level("L1");
    l1.doors.push(door(0, 1, "main_door", "hinged"));
    l1.lanes.push(Lane { start_idx: 0, end_idx: 1, graph_idx: 0, bidirectional: true });

    let snapshot = build(&building(vec![l1], vec![]), Path::new(".")).unwrap();

    assert_eq!(snapshot.name, "test_building");
    assert_eq!(snapshot.levels.len(), 1);
    assert!(snapshot.lifts.is_empty());

    let level = &snapshot.levels[0];
    assert_eq!(level.name, "L1");
    assert_eq!(level.elevation, 0.0);
    assert!(level.images.is_empty());

    assert_eq!(level.doors.len(), 1);
    let d = &level.doors[0];
    assert_eq!(d.name, "main_door");
    assert_eq!(d.door_type, DoorType::SingleSwing);
    assert_eq!((d.v1_x, d.v1_y, d.v2_x, d.v2_y), (0.0, 0.0, 1.0, 0.0));
    assert_eq!(d.motion_range, 90.0);
    assert_eq!(d.motion_direction, 1);

    assert_eq!(level.nav_graphs.len(), 1);
    let graph = &level.nav_graphs[0];
    assert_eq!(graph.name, "0");
    assert_eq!(graph.vertices.len(), 2);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].edge_type, EdgeType::Bidirectional);
}

#[test]
fn test_door_type_mapping() {
    let cases = [
        ("sliding", DoorType::SingleSliding),
        ("hinged", DoorType::SingleSwing),
        ("double_sliding", DoorType::DoubleSliding),
        ("double_hinged", DoorType::DoubleSwing),
        ("foo", DoorType::Undefined),
    ];

    let mut l1 = level("L1");
    for (i, (source, _)) in cases.iter().enumerate() {
        l1.doors.push(door(0, 1, &format!("d{}", i), source));
    }

    let snapshot = build(&building(vec![l1], vec![]), Path::new(".")).unwrap();
    let mapped: Vec<DoorType> = snapshot.levels[0].doors.iter().map(|d| d.door_type).collect();
    let expected: Vec<DoorType> = cases.iter().map(|(_, t)| *t).collect();
    assert_eq!(mapped, expected);
}

#[test]
fn test_graph_indices_without_lanes_are_omitted() {
    let mut l1 = level("L1");
    l1.vertices.push(Vertex::new(2.0, 2.0, "c"));
    l1.lanes.push(Lane { start_idx: 0, end_idx: 1, graph_idx: 3, bidirectional: false });
    l1.lanes.push(Lane { start_idx: 1, end_idx: 2, graph_idx: 7, bidirectional: true });
    l1.lanes.push(Lane { start_idx: 2, end_idx: 0, graph_idx: 7, bidirectional: false });
    // outside the translated range
    l1.lanes.push(Lane { start_idx: 0, end_idx: 2, graph_idx: 9, bidirectional: true });

    let snapshot = build(&building(vec![l1], vec![]), Path::new(".")).unwrap();
    let level = &snapshot.levels[0];
    let names: Vec<&str> = level.nav_graphs.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["3", "7"]);

    let g3 = level.nav_graph("3").unwrap();
    assert_eq!(g3.edges[0].edge_type, EdgeType::Unidirectional);

    let g7 = level.nav_graph("7").unwrap();
    assert_eq!(g7.vertices.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(), vec!["b", "c", "a"]);
    assert_eq!(
        g7.edges,
        vec![
            GraphEdgeSnapshot { v1_idx: 0, v2_idx: 1, edge_type: EdgeType::Bidirectional },
            GraphEdgeSnapshot { v1_idx: 1, v2_idx: 2, edge_type: EdgeType::Unidirectional },
        ]
    );
    assert!(level.nav_graph("0").is_none());
}

#[test]
fn test_level_and_lift_order_is_preserved() {
    let names = ["roof", "L3", "basement", "L1"];
    let levels = names.iter().map(|n| level(n)).collect();
    let lifts = vec![lift("lift_b", &["L1", "L3"]), lift("lift_a", &["basement"])];

    let snapshot = build(&building(levels, lifts), Path::new(".")).unwrap();

    let level_names: Vec<&str> = snapshot.levels.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(level_names, names.to_vec());
    let lift_names: Vec<&str> = snapshot.lifts.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(lift_names, vec!["lift_b", "lift_a"]);

    let lift_b = &snapshot.lifts[0];
    assert_eq!(lift_b.levels, vec!["L1".to_string(), "L3".to_string()]);
    assert_eq!((lift_b.ref_x, lift_b.ref_y, lift_b.ref_yaw), (4.0, -2.0, 1.57));
    assert_eq!((lift_b.width, lift_b.depth), (2.0, 1.5));
}

#[test]
fn test_floor_plan_is_read_in_full() {
    let dir = tempdir().unwrap();
    let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    fs::write(dir.path().join("floor1.PNG"), &bytes).unwrap();

    let mut l1 = level("L1");
    l1.floor_plan = Some(FloorPlan {
        filename: "floor1.PNG".to_string(),
        transform: LevelTransform { scale: 0.05, translation_x: 1.5, translation_y: -3.0, yaw: 0.25 },
    });
    let l2 = level("L2");

    let snapshot = build(&building(vec![l1, l2], vec![]), dir.path()).unwrap();

    let images = &snapshot.levels[0].images;
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].encoding, "png");
    assert_eq!(images[0].data, bytes);
    assert_eq!(images[0].scale, 0.05);
    assert_eq!((images[0].x_offset, images[0].y_offset, images[0].yaw), (1.5, -3.0, 0.25));
    assert!(snapshot.levels[1].images.is_empty());
    assert_eq!(snapshot.image_bytes(), 4096);
}

#[test]
fn test_literal_encoding_when_lowercasing_disabled() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("plan.JPG"), b"jpeg").unwrap();

    let mut l1 = level("L1");
    l1.floor_plan = Some(FloorPlan { filename: "plan.JPG".to_string(), transform: LevelTransform::default() });

    let snapshot = SnapshotBuilder::new(dir.path())
        .lowercase_encoding(false)
        .build(&building(vec![l1], vec![]))
        .unwrap();
    assert_eq!(snapshot.levels[0].images[0].encoding, "JPG");
}

#[test]
fn test_missing_floor_plan_fails_build() {
    let dir = tempdir().unwrap();
    let mut l1 = level("L1");
    l1.floor_plan = Some(FloorPlan { filename: "missing.png".to_string(), transform: LevelTransform::default() });

    match build(&building(vec![l1], vec![]), dir.path()) {
        Err(BuildError::ImageNotFound { path }) => assert!(path.ends_with("missing.png")),
        other => panic!("Expected ImageNotFound, got {:?}", other),
    }
}

#[test]
fn test_unreadable_floor_plan_fails_build() {
    let dir = tempdir().unwrap();
    // opens on Linux, but reading a directory fails
    fs::create_dir(dir.path().join("plan.png")).unwrap();
    let mut l1 = level("L1");
    l1.floor_plan = Some(FloorPlan { filename: "plan.png".to_string(), transform: LevelTransform::default() });

    match build(&building(vec![l1], vec![]), dir.path()) {
        Err(BuildError::ImageRead { path, .. }) => assert!(path.ends_with("plan.png")),
        other => panic!("Expected ImageRead, got {:?}", other),
    }
}

#[test]
fn test_out_of_range_door_vertex_fails_build() {
    let mut l1 = level("L1");
    l1.doors.push(door(0, 2, "bad_door", "sliding"));

    match build(&building(vec![l1], vec![]), Path::new(".")) {
        Err(BuildError::VertexIndexOutOfRange { level, door, index, vertex_count }) => {
            assert_eq!(level, "L1");
            assert_eq!(door, "bad_door");
            assert_eq!(index, 2);
            assert_eq!(vertex_count, 2);
        }
        other => panic!("Expected VertexIndexOutOfRange, got {:?}", other),
    }
}

#[test]
fn test_unparsable_motion_degrees_fails_build() {
    let mut bad = door(0, 1, "d1", "hinged");
    bad.params.insert("motion_degrees".into(), ParamValue::String("ninety".into()));
    let mut l1 = level("L1");
    l1.doors.push(bad);

    let err = build(&building(vec![l1], vec![]), Path::new(".")).unwrap_err();
    match &err {
        BuildError::InvalidParameter { param, value, .. } => {
            assert_eq!(*param, "motion_degrees");
            assert_eq!(value, "ninety");
        }
        other => panic!("Expected InvalidParameter, got {:?}", other),
    }
    assert!(err.to_string().contains("motion_degrees"));
}

#[test]
fn test_missing_door_parameter_fails_build() {
    let mut partial = door(0, 1, "d1", "hinged");
    partial.params.remove("motion_direction");
    let mut l1 = level("L1");
    l1.doors.push(partial);

    match build(&building(vec![l1], vec![]), Path::new(".")) {
        Err(BuildError::MissingParameter { door, param, .. }) => {
            assert_eq!(door, "d1");
            assert_eq!(param, "motion_direction");
        }
        other => panic!("Expected MissingParameter, got {:?}", other),
    }
}

#[test]
fn test_failure_on_later_level_yields_no_snapshot() {
    let mut good = level("L1");
    good.doors.push(door(0, 1, "ok", "hinged"));
    let mut bad = level("L2");
    bad.doors.push(door(5, 1, "broken", "hinged"));

    assert!(build(&building(vec![good, bad], vec![]), Path::new(".")).is_err());
}

#[test]
fn test_build_is_deterministic() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("l1.png"), b"\x89PNG").unwrap();

    let mut l1 = level("L1");
    l1.floor_plan = Some(FloorPlan { filename: "l1.png".to_string(), transform: LevelTransform::default() });
    l1.doors.push(door(1, 0, "d", "double_hinged"));
    l1.lanes.push(Lane { start_idx: 0, end_idx: 1, graph_idx: 1, bidirectional: false });
    let model = building(vec![l1, level("L2")], vec![lift("lift", &["L1", "L2"])]);

    let first = build(&model, dir.path()).unwrap();
    let second = build(&model, dir.path()).unwrap();
    assert_eq!(first, second);
}
