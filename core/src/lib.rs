//! Query-execution boundary of the lookout service.
//!
//! The surrounding service supplies a snapshot of tracked entries through
//! [`EntrySource`] and the running server version string; this crate wires
//! those into the expression evaluator and the capability registry and
//! shapes the command-level responses.

pub use lookout_capabilities::{CapabilityRegistry, NegotiationResult};
pub use lookout_query::{Expression, FileType, QueryParseError, TrackedEntry, WatchScope};

pub mod config;
pub mod query;
pub mod version;

pub use config::{get_config, ConfigError, RootConfig, ROOT_CONFIG_FILENAME};
pub use query::{run_query, EntrySource, QueryError, QueryOptions, QueryResponse};
pub use version::{capability_check, version, CapabilityOptions, VersionResponse};
