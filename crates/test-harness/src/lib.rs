//! Test harness for reconciliation scenarios.
//!
//! Scripts the capture / export / re-import / reconcile round trip against
//! the in-memory host and checks the resulting document.
//!
//! # Key Components
//!
//! - [`Scenario`]: fluent API for building a source model, capturing it and
//!   replaying the snapshot onto a re-imported copy
//! - [`oracle`]: document checks returning pass/fail verdicts
//! - [`helpers`]: error type, point sets, snapshot builders
//! - [`assertions`]: assertion helpers with diagnostics

pub mod assertions;
pub mod helpers;
pub mod oracle;
pub mod workflow;

pub use helpers::{HarnessError, SnapshotBuilder};
pub use oracle::OracleVerdict;
pub use workflow::Scenario;
