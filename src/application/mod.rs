pub mod building_map_service;

pub use building_map_service::*;
