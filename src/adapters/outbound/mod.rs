pub mod file_logger;
#[cfg(feature = "kafka")]
pub mod kafka_publisher;
pub mod noop_logger;
pub mod retained_broadcast;
pub mod snapshot_codec;
pub mod tracing_logger;
pub mod yaml_building;

pub use file_logger::*;
#[cfg(feature = "kafka")]
pub use kafka_publisher::*;
pub use noop_logger::*;
pub use retained_broadcast::*;
pub use snapshot_codec::*;
pub use tracing_logger::*;
pub use yaml_building::*;
