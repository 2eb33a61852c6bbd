//! Brain session
//!
//! A session owns the ingested event collection and the outputs of the last
//! build. Ingestion appends; building reads the whole collection. Callers
//! sharing a session across threads must serialize access themselves.

use crate::config::BrainConfig;
use crate::error::BrainError;
use crate::pipeline::ProfileBuilder;
use crate::schema::{ingest_ndjson, Event, IngestReport};
use crate::summary::render_summary;
use crate::types::Profile;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use uuid::Uuid;

pub const PROFILE_FILE: &str = "profile.v1.json";
pub const SUMMARY_FILE: &str = "summary.md";

/// Snapshot of session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub events: usize,
    pub profile_built: bool,
}

/// Log prefix identifying a session
#[derive(Debug, Clone)]
struct LogContext {
    session_id: String,
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[session={}]", self.session_id)
    }
}

/// In-memory session holding events and build outputs
pub struct BrainSession {
    ctx: LogContext,
    config: BrainConfig,
    builder: ProfileBuilder,
    events: Vec<Event>,
    profile: Option<Profile>,
    summary: Option<String>,
}

impl Default for BrainSession {
    fn default() -> Self {
        Self::new(BrainConfig::default())
    }
}

impl BrainSession {
    pub fn new(config: BrainConfig) -> Self {
        let session_id = format!("session-{}", &Uuid::new_v4().to_string()[..8]);
        Self {
            ctx: LogContext { session_id },
            builder: ProfileBuilder::from_config(&config),
            config,
            events: Vec::new(),
            profile: None,
            summary: None,
        }
    }

    pub fn config(&self) -> &BrainConfig {
        &self.config
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Ingest newline-delimited JSON events
    pub fn ingest(&mut self, data: &str) -> IngestReport {
        let report = ingest_ndjson(data, &mut self.events);
        log::info!(
            "{} ingested accepted={} duplicates={} rejected={} total={}",
            self.ctx,
            report.accepted,
            report.duplicates,
            report.rejected,
            report.total
        );
        report
    }

    /// Rebuild the profile and summary from every ingested event.
    ///
    /// Fails with `NoData` when nothing has been ingested; previous outputs
    /// are left untouched in that case.
    pub fn build_profile(&mut self) -> Result<&Profile, BrainError> {
        let profile = match self.builder.build(&self.events) {
            Ok(profile) => profile,
            Err(e) => {
                log::warn!("{} build failed: {}", self.ctx, e);
                return Err(e);
            }
        };

        log::info!(
            "{} built profile services={} endpoints={} auth={} third_parties={} sockets={}",
            self.ctx,
            profile.services.len(),
            profile.endpoints.len(),
            profile.auth.mode.as_str(),
            profile.third_parties.len(),
            profile.realtime.sockets.len()
        );

        self.summary = Some(render_summary(&profile));
        Ok(self.profile.insert(profile))
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            events: self.events.len(),
            profile_built: self.profile.is_some(),
        }
    }

    /// Drop all events and build outputs
    pub fn clear(&mut self) {
        self.events.clear();
        self.profile = None;
        self.summary = None;
    }

    /// Persist built outputs to the configured output directory
    pub fn save(&self) -> Result<(), BrainError> {
        self.write_outputs(&self.config.output_dir)
    }

    /// Write `profile.v1.json` and `summary.md` for whatever has been built
    pub fn write_outputs(&self, dir: &Path) -> Result<(), BrainError> {
        fs::create_dir_all(dir)?;

        if let Some(profile) = &self.profile {
            fs::write(dir.join(PROFILE_FILE), serde_json::to_string_pretty(profile)?)?;
        }
        if let Some(summary) = &self.summary {
            fs::write(dir.join(SUMMARY_FILE), summary)?;
        }

        log::debug!("{} wrote outputs to {}", self.ctx, dir.display());
        Ok(())
    }
}
