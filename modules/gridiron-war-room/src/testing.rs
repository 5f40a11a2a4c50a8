// Test mocks and builders for the War Room pipeline.
//
// Two mocks matching the two collaborator traits:
// - MockReviewer (DeepReviewer): canned result, failure, or a hang
// - MockSynthesizer (SpeechSynthesizer): canned audio, failure, or a hang
//
// Plus builders for DebateRecord and Dossier fixtures.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use uuid::Uuid;

use gridiron_common::{
    Adjustment, CitedStat, DebateArgument, DebateOutcome, DebateRecord, Dossier, EvidenceVolume,
    FactorScores, Pool, Prospect, RecordStatus, Stance, StatValue, Tier,
};

use crate::film_flag;
use crate::traits::{DeepReviewer, SpeechSynthesizer};

// ---------------------------------------------------------------------------
// Debate builders
// ---------------------------------------------------------------------------

pub struct ArgumentBuilder {
    argument: DebateArgument,
}

/// One side of a debate at the given confidence.
pub fn argument(side: Stance, confidence: f64) -> ArgumentBuilder {
    ArgumentBuilder {
        argument: DebateArgument {
            side,
            claims: Vec::new(),
            cited_stats: Vec::new(),
            confidence,
        },
    }
}

impl ArgumentBuilder {
    /// Append `n` single-entry stat lines.
    pub fn with_stats(mut self, n: usize) -> Self {
        for i in 0..n {
            let mut stat = CitedStat::new();
            stat.insert(format!("stat_{i}"), StatValue::Number(i as f64 * 10.0));
            self.argument.cited_stats.push(stat);
        }
        self
    }

    pub fn with_claims(mut self, claims: &[&str]) -> Self {
        self.argument
            .claims
            .extend(claims.iter().map(|c| c.to_string()));
        self
    }

    pub fn build(self) -> DebateArgument {
        self.argument
    }
}

impl From<ArgumentBuilder> for DebateArgument {
    fn from(builder: ArgumentBuilder) -> Self {
        builder.build()
    }
}

pub struct DebateBuilder {
    record: DebateRecord,
}

/// A gradable debate with no arguments and no evidence.
pub fn debate(name: &str, pool: Pool) -> DebateBuilder {
    DebateBuilder {
        record: DebateRecord {
            debate_id: format!("DEB-{}", Uuid::new_v4().simple()),
            prospect: Prospect {
                name: name.to_string(),
                pool,
                source: "test".to_string(),
                position: None,
                school: None,
                state: None,
                class_year: None,
            },
            arguments: Vec::new(),
            evidence_volume: EvidenceVolume::default(),
            status: RecordStatus::Ok,
        },
    }
}

impl DebateBuilder {
    pub fn with_argument(mut self, argument: impl Into<DebateArgument>) -> Self {
        self.record.arguments.push(argument.into());
        self
    }

    pub fn with_evidence(mut self, stats_found: u32, pages_scraped: u32) -> Self {
        self.record.evidence_volume = EvidenceVolume {
            search_result_count: pages_scraped * 3,
            pages_scraped,
            stats_found,
        };
        self
    }

    pub fn position(mut self, position: &str) -> Self {
        self.record.prospect.position = Some(position.to_string());
        self
    }

    pub fn failed(mut self) -> Self {
        self.record.status = RecordStatus::Failed;
        self
    }

    pub fn build(self) -> DebateRecord {
        self.record
    }
}

// ---------------------------------------------------------------------------
// Dossier fixtures
// ---------------------------------------------------------------------------

/// Dossier with the three flag inputs pinned. Multiplier is 1.0 and the
/// flag is derived the same way grading derives it.
pub fn dossier_with(outcome: DebateOutcome, grade: u8, evaluator_confidence: u8) -> Dossier {
    Dossier {
        dossier_id: format!("DOS-TEST-{}", &Uuid::new_v4().simple().to_string()[..8]),
        prospect_name: "Marcus Hill".to_string(),
        pool: Pool::HighSchool,
        position: None,
        factor_scores: FactorScores {
            game_performance: grade,
            raw_athletics: grade,
            overall_production: grade,
            competition_level: grade,
        },
        adjustment: Adjustment {
            leadership_multiplier: 1.0,
            upside_ceiling: grade,
            known_concerns: Vec::new(),
            evaluator_confidence,
        },
        composite_grade: grade,
        tier: Tier::from_grade(grade),
        needs_deep_review: film_flag::flag_condition(outcome, grade, evaluator_confidence),
        debate_outcome: outcome,
        validated_stats: Vec::new(),
    }
}

/// Clear-winner dossier for ledger tests.
pub fn graded(name: &str, pool: Pool, grade: u8) -> Dossier {
    Dossier {
        prospect_name: name.to_string(),
        pool,
        ..dossier_with(DebateOutcome::SideAWins, grade, 80)
    }
}

// ---------------------------------------------------------------------------
// Mock collaborators
// ---------------------------------------------------------------------------

enum Behavior<T> {
    Return(T),
    Fail,
    Hang(Duration),
}

/// Recording deep reviewer.
pub struct MockReviewer {
    behavior: Behavior<serde_json::Value>,
    requested: Mutex<Vec<String>>,
}

impl MockReviewer {
    pub fn returning(result: serde_json::Value) -> Self {
        Self::with(Behavior::Return(result))
    }

    pub fn failing() -> Self {
        Self::with(Behavior::Fail)
    }

    /// Sleeps for `delay` before answering with nothing.
    pub fn hanging(delay: Duration) -> Self {
        Self::with(Behavior::Hang(delay))
    }

    fn with(behavior: Behavior<serde_json::Value>) -> Self {
        Self {
            behavior,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    /// Prospect names in request order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeepReviewer for MockReviewer {
    async fn analyze(&self, dossier: &Dossier) -> Result<Option<serde_json::Value>> {
        self.requested
            .lock()
            .unwrap()
            .push(dossier.prospect_name.clone());

        match &self.behavior {
            Behavior::Return(value) => Ok(Some(value.clone())),
            Behavior::Fail => bail!("MockReviewer: film room unreachable"),
            Behavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(None)
            }
        }
    }
}

/// Recording speech synthesizer.
pub struct MockSynthesizer {
    behavior: Behavior<Vec<u8>>,
    calls: AtomicUsize,
    scripts: Mutex<BTreeMap<usize, String>>,
}

impl MockSynthesizer {
    pub fn returning(audio: Vec<u8>) -> Self {
        Self::with(Behavior::Return(audio))
    }

    pub fn failing() -> Self {
        Self::with(Behavior::Fail)
    }

    pub fn hanging(delay: Duration) -> Self {
        Self::with(Behavior::Hang(delay))
    }

    fn with(behavior: Behavior<Vec<u8>>) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            scripts: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Texts submitted for synthesis, in call order.
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.scripts.lock().unwrap().insert(n, text.to_string());

        match &self.behavior {
            Behavior::Return(audio) => Ok(audio.clone()),
            Behavior::Fail => bail!("MockSynthesizer: 401 invalid api key"),
            Behavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                bail!("MockSynthesizer: hung")
            }
        }
    }
}
