pub mod capture;
pub mod check_names;
pub mod reconcile;
