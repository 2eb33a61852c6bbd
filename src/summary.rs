//! Human-readable profile summary
//!
//! Renders the markdown `summary.md` companion of `profile.v1.json`.

use crate::types::Profile;

pub const SUMMARY_TITLE: &str = "# Site Profile Summary";

/// Render the five summary facts (origin, services, auth, third parties, endpoints)
pub fn render_summary(profile: &Profile) -> String {
    let auth_line = match profile.auth.evidence_ids.as_deref() {
        Some(ids) if !ids.is_empty() => format!(
            "Authentication mode: {} (evidence: {})",
            profile.auth.mode.as_str(),
            ids.join(", ")
        ),
        _ => format!("Authentication mode: {}", profile.auth.mode.as_str()),
    };

    let lines = [
        SUMMARY_TITLE.to_string(),
        String::new(),
        format!("Origin: {}", profile.site.origin),
        format!("Observed {} services.", profile.services.len()),
        auth_line,
        format!("Detected {} third-party hosts.", profile.third_parties.len()),
        format!("Captured {} endpoints.", profile.endpoints.len()),
    ];

    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        AuthMode, AuthProfile, PerformanceSummary, RealtimeProfile, Service, Site,
        ThirdPartyEntry,
    };
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn profile(auth: AuthProfile) -> Profile {
        Profile {
            site: Site {
                origin: "https://example.com/".to_string(),
                captured_at: Utc::now(),
            },
            services: vec![Service {
                host: "example.com".to_string(),
                request_count: 3,
            }],
            auth,
            endpoints: Vec::new(),
            realtime: RealtimeProfile::default(),
            third_parties: vec![ThirdPartyEntry {
                provider: "Sentry".to_string(),
                host: "o1.ingest.sentry.io".to_string(),
            }],
            risks: Vec::new(),
            performance: PerformanceSummary::default(),
        }
    }

    #[test]
    fn test_summary_with_evidence() {
        let summary = render_summary(&profile(AuthProfile {
            mode: AuthMode::Mixed,
            cookies: vec!["session".to_string()],
            evidence_ids: Some(vec!["evt_1r".to_string(), "evt_40r".to_string()]),
        }));

        assert_eq!(
            summary,
            "# Site Profile Summary\n\
             \n\
             Origin: https://example.com/\n\
             Observed 1 services.\n\
             Authentication mode: mixed (evidence: evt_1r, evt_40r)\n\
             Detected 1 third-party hosts.\n\
             Captured 0 endpoints.\n"
        );
    }

    #[test]
    fn test_summary_without_evidence() {
        let summary = render_summary(&profile(AuthProfile::default()));
        assert!(summary.contains("Authentication mode: unknown\n"));
    }
}
