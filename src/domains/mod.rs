pub mod building;
pub mod building_map;
pub mod logger;

pub use building::*;
pub use building_map::*;
pub use logger::*;
