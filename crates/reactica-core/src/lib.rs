//! Arrival scheduling, lifecycle orchestration, and event persistence for
//! the Reactica user pipeline.
//!
//! # Pipeline
//!
//! ```text
//! Producer process                           Consumer process
//!
//! Generator --delay--> Orchestrator          Subscription
//!   ^                    |                       |
//!   |                    +-- put NEW  --> users  +--> EventPersister
//!   |                    +-- queue                     |
//!   |                    +-- put QUEUED -> users       +-- put --> userevents
//!   |                    +-- publish ----> bus ------->
//!   +--- outcome --------+
//! ```
//!
//! The generator owns *when* a user is created, and runs one chain at a
//! time. The orchestrator owns the user's transitions and is the only
//! writer of its key. The persister owns the consumer-side cache.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with environment overrides
//! - [`schedule`] -- Jittered inter-arrival delay policy
//! - [`names`] -- User name generation
//! - [`orchestrator`] -- The per-user write/queue/write/publish chain
//! - [`generator`] -- The serialized generate-orchestrate-reschedule loop
//! - [`persister`] -- Consumer-side event persistence
//! - [`shutdown`] -- Cooperative shutdown signal
//! - [`telemetry`] -- Tracing subscriber setup

pub mod config;
pub mod generator;
pub mod names;
pub mod orchestrator;
pub mod persister;
pub mod schedule;
pub mod shutdown;
pub mod telemetry;

pub use config::{ConfigError, ConfigSource, ReacticaConfig};
pub use generator::{Generator, GeneratorSummary};
pub use names::{CuteNameGenerator, NameSource};
pub use orchestrator::{ChainError, ChainOutcome, ChainStage, Orchestrator};
pub use persister::EventPersister;
pub use schedule::{DelayDraw, DelayPolicy};
pub use shutdown::{Shutdown, ShutdownSignal};
