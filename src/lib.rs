//! Agent Brain - derivation engine for captured browser network traffic
//!
//! Agent Brain turns canonical capture events (HTTP request/response pairs and
//! WebSocket frames) into a site profile through a deterministic pipeline:
//! event fusion → endpoint clustering / auth classification / third-party
//! detection / performance summary, plus realtime tracking over raw events.
//!
//! ## Modules
//!
//! - **Schema**: Canonical event model and NDJSON ingestion
//! - **Derivation**: Pure reducers producing each profile facet
//! - **Session**: Event collection, build outputs and persistence

pub mod auth;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod fusion;
pub mod performance;
pub mod pipeline;
pub mod realtime;
pub mod schema;
pub mod session;
pub mod summary;
pub mod templater;
pub mod third_party;
pub mod types;

pub use config::BrainConfig;
pub use error::BrainError;
pub use pipeline::{build_profile, ProfileBuilder};
pub use session::BrainSession;
pub use summary::render_summary;
pub use templater::template_path;

// Schema exports
pub use schema::{Event, IngestReport, LineOutcome, ValidationError};

/// Crate version reported by the CLI
pub const BRAIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Profile schema identifier
pub const PROFILE_SCHEMA: &str = "profile.v1";
