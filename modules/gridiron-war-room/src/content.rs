//! Content generators: a markdown scouting narrative and a short audio script
//! per dossier.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};

use gridiron_common::{
    ContentArtifact, ContentKind, DebateOutcome, Dossier, TEXT_FALLBACK_MARKER,
};

use crate::traits::SpeechSynthesizer;

pub const NARRATIVE_AUTHOR: &str = "Boomer_Analyst_Ang";
pub const AUDIO_AUTHOR: &str = "Boomer_Publisher_Ang";

fn headline(outcome: DebateOutcome) -> &'static str {
    match outcome {
        DebateOutcome::SideAWins => "is being slept on",
        DebateOutcome::SideBWins => "may be getting more hype than warranted",
        DebateOutcome::Split => "is a polarizing prospect",
    }
}

fn verdict(dossier: &Dossier) -> String {
    let tier = dossier.tier.label();
    match dossier.debate_outcome {
        DebateOutcome::SideAWins => format!("The underrated case carried the room: this is a {tier} talent."),
        DebateOutcome::SideBWins => format!("The overrated case carried the room: we project a {tier} ceiling."),
        DebateOutcome::Split => "Our scouts could not agree on this one.".to_string(),
    }
}

fn winner_label(outcome: DebateOutcome) -> &'static str {
    match outcome {
        DebateOutcome::SideAWins => "Side A (underrated)",
        DebateOutcome::SideBWins => "Side B (overrated)",
        DebateOutcome::Split => "Split decision",
    }
}

/// Markdown scouting report. Pure template rendering.
pub fn narrative(dossier: &Dossier) -> ContentArtifact {
    let title = format!("Why {} {}", dossier.prospect_name, headline(dossier.debate_outcome));
    let f = &dossier.factor_scores;
    let adj = &dossier.adjustment;

    let mut body = format!(
        "# {title}\n\n\
         {verdict}\n\n\
         ## Per|Form Grade: {grade}/100 ({tier})\n\n\
         ### GROC Breakdown\n\
         | Component | Score |\n\
         |-----------|-------|\n\
         | Game Performance (G) | {g} |\n\
         | Raw Athletics (R) | {r} |\n\
         | Overall Production (O) | {o} |\n\
         | Competition Level (C) | {c} |\n\n\
         ### Luke Adjustment\n\
         - **Leadership Multiplier:** {mult:.2}x\n\
         - **Upside Ceiling:** {upside}/100\n\
         - **Evaluator Confidence:** {conf}%\n",
        verdict = verdict(dossier),
        grade = dossier.composite_grade,
        tier = dossier.tier,
        g = f.game_performance,
        r = f.raw_athletics,
        o = f.overall_production,
        c = f.competition_level,
        mult = adj.leadership_multiplier,
        upside = adj.upside_ceiling,
        conf = adj.evaluator_confidence,
    );

    if !adj.known_concerns.is_empty() {
        body.push_str("\n### Concerns\n");
        for concern in &adj.known_concerns {
            body.push_str(&format!("- {concern}\n"));
        }
    }

    body.push_str(&format!(
        "\n### The Debate\n\
         Two scouts argued {name} head-to-head:\n\
         - **Side A** argued this prospect is underrated\n\
         - **Side B** argued this prospect is overrated\n\
         - **Winner:** {winner}\n",
        name = dossier.prospect_name,
        winner = winner_label(dossier.debate_outcome),
    ));

    if dossier.needs_deep_review {
        body.push_str(
            "\n> **Flagged for deep review:** this prospect has been sent to the Film Room for video analysis to settle the debate.\n",
        );
    }

    body.push_str("\n---\n*Generated by the Per|Form Gridiron War Room*\n");

    ContentArtifact {
        kind: ContentKind::Narrative,
        subject_name: dossier.prospect_name.clone(),
        title,
        body,
        produced_at: Utc::now(),
        produced_by: NARRATIVE_AUTHOR.to_string(),
    }
}

/// One-paragraph spoken summary.
pub fn script_text(dossier: &Dossier) -> String {
    let debate = match dossier.debate_outcome {
        DebateOutcome::SideAWins => "the underrated side won the debate",
        DebateOutcome::SideBWins => "the overrated side won the debate",
        DebateOutcome::Split => "it was a split decision",
    };
    let review = if dossier.needs_deep_review {
        "We've flagged this prospect for film review to get more clarity."
    } else {
        "The tape matches the numbers on this one."
    };

    format!(
        "{name} comes in at a {grade} out of 100 in our Per Form grading system. \
         That puts them in the {tier} tier. \
         Our scouts debated this one and {debate}. \
         {review}",
        name = dossier.prospect_name,
        grade = dossier.composite_grade,
        tier = dossier.tier.label(),
    )
}

pub struct AudioScriptGenerator {
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    content_dir: PathBuf,
    timeout: Duration,
}

impl AudioScriptGenerator {
    pub fn new(
        synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
        content_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            synthesizer,
            content_dir: content_dir.into(),
            timeout,
        }
    }

    /// Text-only generator.
    pub fn text_only() -> Self {
        Self::new(None, PathBuf::new(), Duration::from_secs(0))
    }

    pub fn is_configured(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Audio artifact referencing a synthesized MP3, or a marked text
    /// fallback when synthesis is unconfigured or fails for any reason.
    pub async fn audio_script(&self, dossier: &Dossier) -> ContentArtifact {
        let script = script_text(dossier);

        let body = match self.try_synthesize(dossier, &script).await {
            Ok(Some(path)) => path.display().to_string(),
            Ok(None) => format!("{TEXT_FALLBACK_MARKER}{script}"),
            Err(e) => {
                warn!(prospect = dossier.prospect_name.as_str(), error = %e, "TTS failed, using text script");
                format!("{TEXT_FALLBACK_MARKER}{script}")
            }
        };

        ContentArtifact {
            kind: ContentKind::AudioScript,
            subject_name: dossier.prospect_name.clone(),
            title: format!("Per|Form Quick Take: {}", dossier.prospect_name),
            body,
            produced_at: Utc::now(),
            produced_by: AUDIO_AUTHOR.to_string(),
        }
    }

    async fn try_synthesize(&self, dossier: &Dossier, script: &str) -> anyhow::Result<Option<PathBuf>> {
        let Some(synthesizer) = &self.synthesizer else {
            return Ok(None);
        };

        let audio = tokio::time::timeout(self.timeout, synthesizer.synthesize(script))
            .await
            .context("TTS request timed out")??;

        let path = persist_audio(&self.content_dir, &dossier.dossier_id, &audio).await?;
        info!(prospect = dossier.prospect_name.as_str(), path = %path.display(), "Podcast clip written");
        Ok(Some(path))
    }
}

/// Write `podcast-<dossierId>.mp3` under `dir`, creating it if needed.
pub async fn persist_audio(dir: &Path, dossier_id: &str, audio: &[u8]) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(format!("podcast-{dossier_id}.mp3"));
    tokio::fs::write(&path, audio)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
