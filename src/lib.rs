//! Marquee: desktop livestream schedule shell core.
//!
//! This crate is the schedule synchronization engine behind the shell UI:
//! it periodically fetches a remote schedule, normalises it into canonical
//! records, drops stale entries, and reconciles the result against the
//! previously accepted snapshot so consumers receive minimal change sets
//! instead of a full replacement every cycle.
//!
//! # Architecture
//!
//! One cycle flows through independent stages, strictly in order:
//! - **Fetch**: `marquee-schedule` pulls the raw document from the
//!   configured source (legacy page, revised page, or API)
//! - **Parse/normalise**: backend-specific parsing into [`ScheduleEntry`]
//!   records, de-duplicated by identity
//! - **Filter**: Tokyo-local start times resolved; stale and unparsable
//!   entries dropped, live entries always kept
//! - **Reconcile**: keyed diff against the accepted snapshot
//! - **Publish**: new snapshot plus [`ChangeSet`] sent over the event
//!   channel; the UI side renders, the engine knows nothing about widgets
//!
//! The engine loop owns all mutable state. Consumers hold immutable `Arc`
//! snapshots, so no lock guards the read path.

pub mod config;
pub mod engine;
pub mod error;
pub mod runtime;

pub use config::ShellConfig;
pub use engine::{ChangeSet, RefreshHandle, ScheduleEngine};
pub use error::{Result, ShellError};
pub use marquee_schedule::{LiveStatus, ScheduleEntry, SourceBackend, SourceConfig};
pub use runtime::{EngineEvent, PipelineStage, ScheduleUpdate};
