pub mod compare;
pub mod correlate;
pub mod disambiguate;
pub mod locate;

pub use compare::{points_equal, Tolerance, DEFAULT_TOLERANCE};
pub use correlate::{
    best_live_for_snapshot, best_snapshot_for_live, duplicate_names, name_conflicts, name_score,
    Correlation, EXACT_SCORE,
};
pub use disambiguate::{disambiguate, recorded_groups, Disambiguation, SubshapeGroup};
pub use locate::{find_edge, find_face, find_solid, find_vertex, locate_subshape};
