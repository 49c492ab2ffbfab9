pub mod params;
pub mod point;
pub mod snapshot;
pub mod topo;

pub use params::*;
pub use point::*;
pub use snapshot::*;
pub use topo::*;
