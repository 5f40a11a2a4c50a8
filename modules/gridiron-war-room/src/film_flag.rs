//! Film-flag gate: decides which dossiers get a Film Room deep review and
//! issues that request best-effort.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use gridiron_common::{DebateOutcome, Dossier};

use crate::traits::DeepReviewer;

/// Borderline grade band, inclusive on both ends.
pub const BORDERLINE_BAND: std::ops::RangeInclusive<u8> = 70..=85;

/// Evaluator confidence below this always earns a review.
pub const MIN_EVALUATOR_CONFIDENCE: u8 = 60;

/// Split debate, borderline grade, or low evaluator confidence.
pub fn flag_condition(outcome: DebateOutcome, grade: u8, evaluator_confidence: u8) -> bool {
    outcome == DebateOutcome::Split
        || BORDERLINE_BAND.contains(&grade)
        || evaluator_confidence < MIN_EVALUATOR_CONFIDENCE
}

pub fn should_flag(dossier: &Dossier) -> bool {
    flag_condition(
        dossier.debate_outcome,
        dossier.composite_grade,
        dossier.adjustment.evaluator_confidence,
    )
}

pub struct FilmFlagGate {
    reviewer: Option<Arc<dyn DeepReviewer>>,
    timeout: Duration,
}

impl FilmFlagGate {
    pub fn new(reviewer: Option<Arc<dyn DeepReviewer>>, timeout: Duration) -> Self {
        Self { reviewer, timeout }
    }

    /// A gate with no reviewer: dossiers are still flagged, nothing is called.
    pub fn disabled() -> Self {
        Self::new(None, Duration::from_secs(0))
    }

    pub fn is_enabled(&self) -> bool {
        self.reviewer.is_some()
    }

    /// Ask the Film Room for a second look at a flagged dossier.
    ///
    /// Never fails: unflagged dossiers, a missing reviewer, errors and
    /// timeouts all resolve to `None`. The dossier is not touched.
    pub async fn request_deep_review(&self, dossier: &Dossier) -> Option<serde_json::Value> {
        if !dossier.needs_deep_review {
            return None;
        }
        let reviewer = self.reviewer.as_ref()?;

        match tokio::time::timeout(self.timeout, reviewer.analyze(dossier)).await {
            Ok(Ok(Some(result))) => {
                info!(prospect = dossier.prospect_name.as_str(), "Film analysis received");
                Some(result)
            }
            Ok(Ok(None)) => None,
            Ok(Err(e)) => {
                warn!(prospect = dossier.prospect_name.as_str(), error = %e, "Film Room unavailable");
                None
            }
            Err(_) => {
                warn!(
                    prospect = dossier.prospect_name.as_str(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Film Room request timed out"
                );
                None
            }
        }
    }
}
