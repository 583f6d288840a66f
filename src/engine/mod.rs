//! Schedule synchronization engine.
//!
//! Drives the fetch → parse → filter → reconcile pipeline on a fixed
//! interval, owns the last accepted schedule snapshot, and publishes
//! minimal change sets instead of full replacements. One pipeline run is
//! in flight at most; a failed cycle never touches the accepted state.

pub mod filter;
pub mod reconcile;
pub mod runner;
pub mod state;

pub use reconcile::{ChangeSet, UpdatedEntry, reconcile};
pub use runner::{RefreshHandle, ScheduleEngine};
pub use state::{EngineState, FetchOutcome};
