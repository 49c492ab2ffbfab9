pub mod errors;
pub mod layout;
pub mod load;
pub mod metadata;
pub mod save;

pub use errors::{LayoutError, LoadError, SaveError};
pub use layout::{
    discover_exchange_files, export_stem, SnapshotLayout, EXCHANGE_EXTENSIONS, GEOMETRY_DIR,
    SNAPSHOT_FILE,
};
pub use load::{load_snapshot, read_snapshot};
pub use metadata::{now_timestamp, parse_timestamp, SnapshotInfo, TIMESTAMP_FORMAT};
pub use save::{save_snapshot, write_snapshot};
pub use propsync_types::SNAPSHOT_VERSION;
