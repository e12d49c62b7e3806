pub mod builder;
pub mod snapshot;
pub mod transport;

pub use builder::*;
pub use snapshot::*;
pub use transport::*;
