//! The War Room: owns the pipeline state and drives scout deliveries through
//! grading, the film-flag gate, content generation and the ranking ledger.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};
use typed_builder::TypedBuilder;

use elevenlabs_client::ElevenLabsClient;
use film_room_client::FilmRoomClient;
use gridiron_common::{
    Config, ContentArtifact, ContentKind, DebateRecord, Dossier, Pool, PoolSelector, RankingEntry,
    WarRoomError,
};

use crate::content::{self, AudioScriptGenerator};
use crate::delivery::{self, ScoutDelivery};
use crate::film_flag::FilmFlagGate;
use crate::grading::{Grader, GradingPolicy};
use crate::jitter::{JitterSource, SeededJitter};
use crate::ledger::RankingLedger;
use crate::retention::{Retention, DEFAULT_RETENTION};
use crate::stats::{Counters, DeliveryReport};
use crate::traits::{DeepReviewer, SpeechSynthesizer};

pub const SERVICE_NAME: &str = "gridiron-war-room";

/// Collaborator endpoints reported on the status surface.
#[derive(Debug, Clone, Default)]
pub struct Collaborators {
    pub film_room_url: Option<String>,
    pub scout_hub_url: String,
    pub chickenhawk_core_url: String,
    pub brave_configured: bool,
}

/// Dependency container for a `WarRoom`.
///
/// Collaborators are optional: with neither set the War Room still grades and
/// ranks, skips deep review, and emits text-only audio scripts.
#[derive(Clone, TypedBuilder)]
pub struct WarRoomDeps {
    #[builder(default)]
    pub reviewer: Option<Arc<dyn DeepReviewer>>,
    #[builder(default)]
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    #[builder(default = Duration::from_secs(15))]
    pub collaborator_timeout: Duration,
    #[builder(default = PathBuf::from("/data/content"), setter(into))]
    pub content_dir: PathBuf,
    #[builder(default = PathBuf::from("/data/debate-logs"), setter(into))]
    pub debate_log_dir: PathBuf,
    #[builder(default = DEFAULT_RETENTION)]
    pub retention_limit: usize,
    #[builder(default)]
    pub policy: GradingPolicy,
    #[builder(default)]
    pub grading_seed: Option<u64>,
    #[builder(default)]
    pub collaborators: Collaborators,
}

impl WarRoomDeps {
    /// Build production deps, constructing HTTP clients for every configured
    /// collaborator.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let reviewer: Option<Arc<dyn DeepReviewer>> = match &config.film_room_url {
            Some(url) => Some(Arc::new(FilmRoomClient::new(url, config.collaborator_timeout)?)),
            None => None,
        };

        let synthesizer: Option<Arc<dyn SpeechSynthesizer>> = if config.tts_configured() {
            Some(Arc::new(ElevenLabsClient::new(
                &config.elevenlabs_api_key,
                &config.elevenlabs_voice_id,
                config.collaborator_timeout,
            )?))
        } else {
            None
        };

        Ok(Self::builder()
            .reviewer(reviewer)
            .synthesizer(synthesizer)
            .collaborator_timeout(config.collaborator_timeout)
            .content_dir(config.content_dir.clone())
            .debate_log_dir(config.debate_log_dir.clone())
            .retention_limit(config.retention_limit)
            .policy(GradingPolicy {
                concern_keywords: config.concern_keywords.clone(),
                debate_margin: config.debate_margin,
            })
            .grading_seed(config.grading_seed)
            .collaborators(Collaborators {
                film_room_url: config.film_room_url.clone(),
                scout_hub_url: config.scout_hub_url.clone(),
                chickenhawk_core_url: config.chickenhawk_core_url.clone(),
                brave_configured: config.brave_configured(),
            })
            .build())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastDelivery {
    pub run_id: String,
    pub received_at: DateTime<Utc>,
    pub report: DeliveryReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingsPage {
    pub pool: String,
    pub total: usize,
    pub rankings: Vec<RankingEntry>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingsCount {
    pub high_school: usize,
    pub college: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub service: &'static str,
    pub total_prospects_graded: u64,
    pub total_content_pieces: u64,
    pub rankings_count: RankingsCount,
    pub uptime_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPage {
    /// Matching artifacts before the limit is applied.
    pub total: usize,
    pub items: Vec<ContentArtifact>,
}

/// Pipeline counters and retained-state sizes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusState {
    pub total_prospects_graded: u64,
    pub total_content_pieces: u64,
    pub active_dossiers: usize,
    pub rankings: RankingsCount,
    pub content_queue: usize,
    pub last_scout_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connections {
    pub film_room: Option<String>,
    pub scout_hub: String,
    pub chickenhawk_core: String,
    pub eleven_labs_configured: bool,
    pub brave_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarRoomStatus {
    pub service: &'static str,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
    pub state: StatusState,
    pub connections: Connections,
    pub retention_limit: usize,
    pub last_delivery: Option<LastDelivery>,
    pub film_room_enabled: bool,
    pub shutting_down: bool,
}

pub struct WarRoom {
    grader: Mutex<Grader>,
    ledger: Mutex<RankingLedger>,
    dossiers: Mutex<Retention<Dossier>>,
    content: Mutex<Retention<ContentArtifact>>,
    film_gate: FilmFlagGate,
    audio: AudioScriptGenerator,
    debate_log_dir: PathBuf,
    retention_limit: usize,
    collaborators: Collaborators,
    graded_total: AtomicU64,
    content_total: AtomicU64,
    last_delivery: Mutex<Option<LastDelivery>>,
    cancelled: AtomicBool,
    started_at: DateTime<Utc>,
    started: Instant,
}

impl WarRoom {
    /// Jitter is seeded from `grading_seed`, or from OS entropy when unset.
    pub fn new(deps: WarRoomDeps) -> Self {
        let jitter = SeededJitter::from_optional_seed(deps.grading_seed);
        Self::with_jitter(deps, Box::new(jitter))
    }

    pub fn with_jitter(deps: WarRoomDeps, jitter: Box<dyn JitterSource>) -> Self {
        let retention_limit = deps.retention_limit.max(1);
        Self {
            grader: Mutex::new(Grader::new(deps.policy, jitter)),
            ledger: Mutex::new(RankingLedger::new()),
            dossiers: Mutex::new(Retention::new(retention_limit)),
            content: Mutex::new(Retention::new(retention_limit)),
            film_gate: FilmFlagGate::new(deps.reviewer, deps.collaborator_timeout),
            audio: AudioScriptGenerator::new(
                deps.synthesizer,
                deps.content_dir,
                deps.collaborator_timeout,
            ),
            debate_log_dir: deps.debate_log_dir,
            retention_limit,
            collaborators: deps.collaborators,
            graded_total: AtomicU64::new(0),
            content_total: AtomicU64::new(0),
            last_delivery: Mutex::new(None),
            cancelled: AtomicBool::new(false),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    // --- Ingestion ---

    /// Handle a scout delivery: inline debates first, then the side-channel
    /// debate log for the run if one exists. Only a malformed inline batch
    /// fails the delivery; side-channel problems are logged.
    pub async fn receive_delivery(
        &self,
        delivery: &ScoutDelivery,
    ) -> Result<DeliveryReport, WarRoomError> {
        delivery::validate_run_id(&delivery.run_id)?;
        info!(
            run_id = delivery.run_id.as_str(),
            announced = delivery.debate_count.unwrap_or(0),
            "Scout delivery received"
        );

        let mut report = DeliveryReport::default();

        if let Some(debates) = &delivery.debates {
            report.merge(&self.process_delivery(debates).await?);
        }

        match delivery::load_debate_log(&self.debate_log_dir, &delivery.run_id).await {
            Ok(Some(debates)) => match self.process_delivery(&debates).await {
                Ok(side) => report.merge(&side),
                Err(e) => warn!(run_id = delivery.run_id.as_str(), error = %e, "Rejected debate log batch"),
            },
            Ok(None) => {}
            Err(e) => warn!(run_id = delivery.run_id.as_str(), error = %e, "Failed to read debate log"),
        }

        *self.last_delivery.lock().await = Some(LastDelivery {
            run_id: delivery.run_id.clone(),
            received_at: Utc::now(),
            report: report.clone(),
        });

        info!(run_id = delivery.run_id.as_str(), %report, "Scout delivery processed");
        Ok(report)
    }

    /// Run a batch through the pipeline, one record at a time in order.
    ///
    /// The batch is validated up front; a single malformed record rejects it
    /// before anything is graded. FAILED records are skipped. Collaborator
    /// failures never fail the batch.
    pub async fn process_delivery(
        &self,
        records: &[DebateRecord],
    ) -> Result<DeliveryReport, WarRoomError> {
        delivery::validate_batch(records)?;

        let mut report = DeliveryReport {
            received: records.len() as u32,
            ..Default::default()
        };
        info!(records = records.len(), "Processing debate batch");

        for (i, record) in records.iter().enumerate() {
            if self.is_cancelled() {
                report.cancelled = (records.len() - i) as u32;
                warn!(remaining = report.cancelled, "Shutdown requested, stopping batch");
                break;
            }

            if record.is_failed() {
                report.skipped_failed += 1;
                info!(
                    debate_id = record.debate_id.as_str(),
                    prospect = record.prospect.name.as_str(),
                    "Skipping failed debate"
                );
                continue;
            }

            self.process_record(record, &mut report).await;
        }

        Ok(report)
    }

    async fn process_record(&self, record: &DebateRecord, report: &mut DeliveryReport) {
        let dossier = self.grader.lock().await.grade(record);
        self.graded_total.fetch_add(1, Ordering::Relaxed);
        report.graded += 1;
        info!(
            prospect = dossier.prospect_name.as_str(),
            pool = %dossier.pool,
            grade = dossier.composite_grade,
            tier = %dossier.tier,
            outcome = %dossier.debate_outcome,
            "Prospect graded"
        );

        if dossier.needs_deep_review {
            report.flagged += 1;
            info!(prospect = dossier.prospect_name.as_str(), "Flagged for film review");
            if self.film_gate.request_deep_review(&dossier).await.is_some() {
                report.deep_reviews_received += 1;
            }
        }

        let narrative = content::narrative(&dossier);
        let audio = self.audio.audio_script(&dossier).await;
        if audio.is_text_fallback() {
            report.audio_fallbacks += 1;
        }
        {
            let mut queue = self.content.lock().await;
            queue.push(narrative);
            queue.push(audio);
        }
        self.content_total.fetch_add(2, Ordering::Relaxed);
        report.content_produced += 2;

        let entry = self.ledger.lock().await.upsert(&dossier, Utc::now());
        info!(
            prospect = entry.prospect_name.as_str(),
            pool = %entry.pool,
            rank = entry.rank,
            trend = %entry.trend,
            "Ranking updated"
        );

        self.dossiers.lock().await.push(dossier);
    }

    /// Grade one record without touching the archive, content, counters or
    /// rankings.
    pub async fn grade_preview(&self, record: &DebateRecord) -> Result<Dossier, WarRoomError> {
        record.validate()?;
        if record.is_failed() {
            return Err(WarRoomError::Validation(format!(
                "debate {} is FAILED and cannot be graded",
                record.debate_id
            )));
        }
        Ok(self.grader.lock().await.grade(record))
    }

    // --- Queries ---

    pub async fn rankings(&self, selector: PoolSelector, limit: usize) -> RankingsPage {
        let ledger = self.ledger.lock().await;
        RankingsPage {
            pool: selector.to_string(),
            total: ledger.total(selector),
            rankings: ledger.query(selector, limit),
        }
    }

    /// Most recent retained dossier for the prospect, falling back to the one
    /// behind its current ranking.
    pub async fn dossier(&self, name: &str, pool: Option<Pool>) -> Result<Dossier, WarRoomError> {
        let retained = self
            .dossiers
            .lock()
            .await
            .newest_first()
            .find(|d| d.prospect_name == name && pool.map_or(true, |p| d.pool == p))
            .cloned();
        if let Some(dossier) = retained {
            return Ok(dossier);
        }

        let ledger = self.ledger.lock().await;
        match pool {
            Some(pool) => ledger.get(pool, name).cloned(),
            None => ledger
                .find(name)
                .cloned()
                .ok_or_else(|| WarRoomError::not_found(None, name)),
        }
    }

    /// Newest first, optionally filtered by kind.
    pub async fn content(&self, kind: Option<ContentKind>, limit: usize) -> ContentPage {
        let queue = self.content.lock().await;
        let matching: Vec<&ContentArtifact> = queue
            .newest_first()
            .filter(|a| kind.map_or(true, |k| a.kind == k))
            .collect();
        ContentPage {
            total: matching.len(),
            items: matching.into_iter().take(limit).cloned().collect(),
        }
    }

    pub fn counters(&self) -> Counters {
        Counters {
            total_prospects_graded: self.graded_total.load(Ordering::Relaxed),
            total_content_pieces: self.content_total.load(Ordering::Relaxed),
        }
    }

    async fn rankings_count(&self) -> RankingsCount {
        let ledger = self.ledger.lock().await;
        RankingsCount {
            high_school: ledger.len(Pool::HighSchool),
            college: ledger.len(Pool::College),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub async fn health(&self) -> Health {
        let counters = self.counters();
        Health {
            status: "ok",
            service: SERVICE_NAME,
            total_prospects_graded: counters.total_prospects_graded,
            total_content_pieces: counters.total_content_pieces,
            rankings_count: self.rankings_count().await,
            uptime_secs: self.uptime().as_secs(),
        }
    }

    pub async fn status(&self) -> WarRoomStatus {
        let counters = self.counters();
        let last_delivery = self.last_delivery.lock().await.clone();
        WarRoomStatus {
            service: SERVICE_NAME,
            started_at: self.started_at,
            uptime_secs: self.uptime().as_secs(),
            state: StatusState {
                total_prospects_graded: counters.total_prospects_graded,
                total_content_pieces: counters.total_content_pieces,
                active_dossiers: self.dossiers.lock().await.len(),
                rankings: self.rankings_count().await,
                content_queue: self.content.lock().await.len(),
                last_scout_delivery: last_delivery.as_ref().map(|d| d.received_at),
            },
            connections: Connections {
                film_room: self.collaborators.film_room_url.clone(),
                scout_hub: self.collaborators.scout_hub_url.clone(),
                chickenhawk_core: self.collaborators.chickenhawk_core_url.clone(),
                eleven_labs_configured: self.audio.is_configured(),
                brave_configured: self.collaborators.brave_configured,
            },
            retention_limit: self.retention_limit,
            last_delivery,
            film_room_enabled: self.film_gate.is_enabled(),
            shutting_down: self.is_cancelled(),
        }
    }

    // --- Shutdown ---

    /// Stop in-flight batches at the next record boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
