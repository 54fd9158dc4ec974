//! Tessera Runner — suite loading, planning and variant execution.
//!
//! This crate builds on `tessera-core` to provide:
//! - Suite files (TOML) declaring trait types, policies and test classes
//! - Planning: every class expanded into ordered variants
//! - Runner shim with bounded restarts and lifecycle listeners
//! - Runner configuration

pub mod config;
pub mod lifecycle;
pub mod plan;
pub mod runner;
pub mod suite;

pub use config::{ConfigError, RunnerConfig, DEFAULT_MAX_RESTARTS};
pub use lifecycle::{LifecycleListener, ListenerId, ListenerSet, TracingListener};
pub use plan::{plan_suite, ClassPlan, PlannedVariant};
pub use runner::{Outcome, RunError, RunReport, RunSummary, Runner, TestBody, TestStatus};
pub use suite::{LoadedSuite, SuiteError};
