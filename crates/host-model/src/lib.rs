pub mod memory;
pub mod primitives;
pub mod traits;
pub mod types;

pub use memory::{
    AssignmentTables, MemoryDocument, MemoryGeometry, MemoryShape, SlotTable, TypeCatalog,
    TypeDefinition,
};
pub use traits::*;
pub use types::*;
