//! Canonical capture event schema
//!
//! This module defines the event records produced by the capture extension
//! and the line-oriented ingestion boundary that admits them into a session.

mod event;
mod ingest;

pub use event::*;
pub use ingest::*;
