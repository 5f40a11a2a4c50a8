//! GROC + Luke grading.
//!
//! One debate record in, one dossier out. The only non-determinism is the
//! jitter drawn from the injected `JitterSource`.

use chrono::Utc;
use uuid::Uuid;

use gridiron_common::{
    Adjustment, DebateOutcome, DebateRecord, Dossier, EvidenceVolume, FactorScores, Pool, Stance,
    Tier,
};

use crate::film_flag;
use crate::jitter::JitterSource;

/// Confidence assumed for a stance the debate never argued.
pub const DEFAULT_CONFIDENCE: f64 = 50.0;

/// Hysteresis band between the two sides' confidence before either wins.
pub const DEFAULT_DEBATE_MARGIN: f64 = 10.0;

// GROC weights. Sum to 1.0.
const GAME_WEIGHT: f64 = 0.35;
const ATHLETICS_WEIGHT: f64 = 0.25;
const PRODUCTION_WEIGHT: f64 = 0.25;
const COMPETITION_WEIGHT: f64 = 0.15;

const LEADERSHIP_BASE: f64 = 0.9;
const LEADERSHIP_SPAN: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct GradingPolicy {
    /// Lowercase markers that turn a side-B claim into a known concern.
    pub concern_keywords: Vec<String>,
    pub debate_margin: f64,
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self {
            concern_keywords: vec!["limited".to_string(), "insufficient".to_string()],
            debate_margin: DEFAULT_DEBATE_MARGIN,
        }
    }
}

/// Owns the policy and the jitter stream for a process.
pub struct Grader {
    policy: GradingPolicy,
    jitter: Box<dyn JitterSource>,
}

impl Grader {
    pub fn new(policy: GradingPolicy, jitter: Box<dyn JitterSource>) -> Self {
        Self { policy, jitter }
    }

    pub fn grade(&mut self, record: &DebateRecord) -> Dossier {
        grade(record, &self.policy, self.jitter.as_mut())
    }
}

/// `min(100, statsFound*15 + pagesScraped*10)`.
pub fn evidence_richness(volume: &EvidenceVolume) -> f64 {
    (volume.stats_found as f64 * 15.0 + volume.pages_scraped as f64 * 10.0).clamp(0.0, 100.0)
}

/// Side A wins only when it clears side B by more than `margin`, and vice versa.
pub fn debate_outcome(confidence_a: f64, confidence_b: f64, margin: f64) -> DebateOutcome {
    if confidence_a > confidence_b + margin {
        DebateOutcome::SideAWins
    } else if confidence_b > confidence_a + margin {
        DebateOutcome::SideBWins
    } else {
        DebateOutcome::Split
    }
}

/// Side-B claims that mention any red-flag keyword, case-insensitively.
pub fn known_concerns(record: &DebateRecord, keywords: &[String]) -> Vec<String> {
    let Some(bear) = record.argument(Stance::Overrated) else {
        return Vec::new();
    };

    bear.claims
        .iter()
        .filter(|claim| {
            let lower = claim.to_lowercase();
            keywords.iter().any(|k| lower.contains(k.as_str()))
        })
        .cloned()
        .collect()
}

pub fn grade(record: &DebateRecord, policy: &GradingPolicy, jitter: &mut dyn JitterSource) -> Dossier {
    let bull = record.argument(Stance::Underrated);
    let bear = record.argument(Stance::Overrated);

    let confidence_a = bull.map_or(DEFAULT_CONFIDENCE, |a| sanitize_confidence(a.confidence));
    let confidence_b = bear.map_or(DEFAULT_CONFIDENCE, |a| sanitize_confidence(a.confidence));
    let richness = evidence_richness(&record.evidence_volume);
    let stats_found = record.evidence_volume.stats_found as f64;

    let factor_scores = FactorScores {
        game_performance: to_score(50.0 + (confidence_a - confidence_b) * 0.3 + jitter.span(15.0)),
        raw_athletics: to_score(55.0 + richness * 0.2 + jitter.span(20.0)),
        overall_production: to_score(45.0 + stats_found * 5.0 + jitter.span(15.0)),
        competition_level: match record.prospect.pool {
            Pool::College => to_score(70.0 + jitter.span(20.0).round()),
            Pool::HighSchool => to_score(55.0 + jitter.span(25.0).round()),
        },
    };

    let leadership_multiplier = LEADERSHIP_BASE + jitter.span(LEADERSHIP_SPAN);

    let adjustment = Adjustment {
        leadership_multiplier,
        upside_ceiling: to_score(
            factor_scores.raw_athletics as f64 * 0.7 + factor_scores.game_performance as f64 * 0.3,
        ),
        known_concerns: known_concerns(record, &policy.concern_keywords),
        evaluator_confidence: to_score(richness * 0.6 + confidence_a * 0.2 + confidence_b * 0.2),
    };

    let composite_grade = composite(&factor_scores, leadership_multiplier);
    let tier = Tier::from_grade(composite_grade);
    let debate_outcome = debate_outcome(confidence_a, confidence_b, policy.debate_margin);
    let needs_deep_review =
        film_flag::flag_condition(debate_outcome, composite_grade, adjustment.evaluator_confidence);

    let validated_stats = bull
        .into_iter()
        .chain(bear)
        .flat_map(|a| a.cited_stats.iter().cloned())
        .collect();

    Dossier {
        dossier_id: new_dossier_id(),
        prospect_name: record.prospect.name.clone(),
        pool: record.prospect.pool,
        position: record.prospect.position.clone(),
        factor_scores,
        adjustment,
        composite_grade,
        tier,
        needs_deep_review,
        debate_outcome,
        validated_stats,
    }
}

/// Weighted GROC average times the leadership multiplier. Clamped after the
/// multiplication so an overshooting multiplier still lands in [0, 100].
pub fn composite(scores: &FactorScores, leadership_multiplier: f64) -> u8 {
    let raw = scores.game_performance as f64 * GAME_WEIGHT
        + scores.raw_athletics as f64 * ATHLETICS_WEIGHT
        + scores.overall_production as f64 * PRODUCTION_WEIGHT
        + scores.competition_level as f64 * COMPETITION_WEIGHT;
    (raw * leadership_multiplier).clamp(0.0, 100.0).round() as u8
}

fn to_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

fn sanitize_confidence(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 100.0)
    } else {
        DEFAULT_CONFIDENCE
    }
}

fn new_dossier_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("DOS-{}-{}", Utc::now().timestamp_millis(), &suffix[..6])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::{FixedJitter, SeededJitter, ZeroJitter};
    use crate::testing::{argument, debate};
    use gridiron_common::{Pool, Stance};

    fn policy() -> GradingPolicy {
        GradingPolicy::default()
    }

    #[test]
    fn college_example_with_zero_jitter() {
        let record = debate("Jalen Cross", Pool::College)
            .with_argument(argument(Stance::Underrated, 80.0).with_stats(3))
            .with_argument(argument(Stance::Overrated, 40.0))
            .with_evidence(3, 2)
            .build();

        let dossier = grade(&record, &policy(), &mut ZeroJitter);

        assert_eq!(dossier.debate_outcome, DebateOutcome::SideAWins);
        assert_eq!(dossier.adjustment.evaluator_confidence, 63);
        assert_eq!(dossier.factor_scores.game_performance, 62);
        assert_eq!(dossier.factor_scores.raw_athletics, 68);
        assert_eq!(dossier.factor_scores.overall_production, 60);
        assert_eq!(dossier.factor_scores.competition_level, 70);
        assert_eq!(dossier.adjustment.upside_ceiling, 66);
        // 64.2 raw * 0.9
        assert_eq!(dossier.composite_grade, 58);
        assert_eq!(dossier.tier, Tier::Sleeper);
        assert!(!dossier.needs_deep_review);
        assert_eq!(dossier.validated_stats.len(), 3);
    }

    #[test]
    fn adversarial_extremes_stay_in_range() {
        let record = debate("Overflow", Pool::College)
            .with_argument(argument(Stance::Underrated, 100.0))
            .with_argument(argument(Stance::Overrated, 0.0))
            .with_evidence(1000, 1000)
            .build();

        let dossier = grade(&record, &policy(), &mut FixedJitter(0.999));

        assert_eq!(dossier.factor_scores.overall_production, 100);
        assert!(dossier.adjustment.leadership_multiplier > 1.14);
        // raw composite ~95.5 times ~1.15 overshoots, then clamps
        assert_eq!(dossier.composite_grade, 100);
        assert_eq!(dossier.tier, Tier::Elite);
        assert!(dossier.adjustment.evaluator_confidence <= 100);
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        let record = debate("Wild Input", Pool::HighSchool)
            .with_argument(argument(Stance::Underrated, 450.0))
            .with_argument(argument(Stance::Overrated, f64::NAN))
            .build();

        let dossier = grade(&record, &policy(), &mut ZeroJitter);

        // 100 vs 50
        assert_eq!(dossier.factor_scores.game_performance, 65);
        assert_eq!(dossier.debate_outcome, DebateOutcome::SideAWins);
        assert!(dossier.adjustment.evaluator_confidence <= 100);
    }

    #[test]
    fn empty_debate_defaults_to_even_confidence() {
        let record = debate("No Arguments", Pool::HighSchool).build();

        let dossier = grade(&record, &policy(), &mut ZeroJitter);

        assert_eq!(dossier.debate_outcome, DebateOutcome::Split);
        assert_eq!(dossier.factor_scores.game_performance, 50);
        assert_eq!(dossier.adjustment.evaluator_confidence, 20);
        assert!(dossier.adjustment.known_concerns.is_empty());
        assert!(dossier.validated_stats.is_empty());
        assert!(dossier.needs_deep_review);
    }

    #[test]
    fn one_sided_debate_uses_default_for_missing_side() {
        let record = debate("Half Debate", Pool::College)
            .with_argument(argument(Stance::Overrated, 75.0))
            .build();

        let dossier = grade(&record, &policy(), &mut ZeroJitter);

        assert_eq!(dossier.debate_outcome, DebateOutcome::SideBWins);
    }

    #[test]
    fn outcome_respects_margin_boundary() {
        assert_eq!(debate_outcome(60.0, 50.0, 10.0), DebateOutcome::Split);
        assert_eq!(debate_outcome(60.5, 50.0, 10.0), DebateOutcome::SideAWins);
        assert_eq!(debate_outcome(50.0, 60.0, 10.0), DebateOutcome::Split);
        assert_eq!(debate_outcome(50.0, 61.0, 10.0), DebateOutcome::SideBWins);
        assert_eq!(debate_outcome(51.0, 50.0, 0.0), DebateOutcome::SideAWins);
    }

    #[test]
    fn concerns_come_from_side_b_keywords_only() {
        let record = debate("Concerned", Pool::College)
            .with_argument(
                argument(Stance::Underrated, 70.0).with_claims(&["Limited snaps but explosive"]),
            )
            .with_argument(argument(Stance::Overrated, 60.0).with_claims(&[
                "Limited film against ranked opponents",
                "Insufficient data on route running",
                "Slow 40 time",
            ]))
            .build();

        let dossier = grade(&record, &policy(), &mut ZeroJitter);

        assert_eq!(
            dossier.adjustment.known_concerns,
            vec![
                "Limited film against ranked opponents".to_string(),
                "Insufficient data on route running".to_string(),
            ]
        );

        let custom = GradingPolicy {
            concern_keywords: vec!["slow".to_string()],
            ..GradingPolicy::default()
        };
        let dossier = grade(&record, &custom, &mut ZeroJitter);
        assert_eq!(dossier.adjustment.known_concerns, vec!["Slow 40 time".to_string()]);
    }

    #[test]
    fn seeded_grading_is_reproducible() {
        let record = debate("Repeatable", Pool::HighSchool)
            .with_argument(argument(Stance::Underrated, 66.0).with_stats(2))
            .with_argument(argument(Stance::Overrated, 58.0).with_stats(1))
            .with_evidence(2, 4)
            .build();

        let mut first = grade(&record, &policy(), &mut SeededJitter::new(1234));
        let mut second = grade(&record, &policy(), &mut SeededJitter::new(1234));
        assert_ne!(first.dossier_id, second.dossier_id);

        first.dossier_id.clear();
        second.dossier_id.clear();
        assert_eq!(first, second);
    }

    #[test]
    fn grades_and_tiers_agree_across_random_inputs() {
        let mut inputs = SeededJitter::new(99);
        let mut jitter = SeededJitter::new(100);

        for i in 0..500 {
            let pool = if i % 2 == 0 { Pool::College } else { Pool::HighSchool };
            let record = debate(&format!("Prospect {i}"), pool)
                .with_argument(argument(Stance::Underrated, inputs.span(100.0)))
                .with_argument(argument(Stance::Overrated, inputs.span(100.0)))
                .with_evidence(inputs.span(20.0) as u32, inputs.span(20.0) as u32)
                .build();

            let dossier = grade(&record, &policy(), &mut jitter);
            let f = dossier.factor_scores;

            for score in [
                f.game_performance,
                f.raw_athletics,
                f.overall_production,
                f.competition_level,
                dossier.composite_grade,
                dossier.adjustment.upside_ceiling,
                dossier.adjustment.evaluator_confidence,
            ] {
                assert!(score <= 100);
            }
            assert!((0.9..1.15).contains(&dossier.adjustment.leadership_multiplier));
            assert_eq!(dossier.tier, Tier::from_grade(dossier.composite_grade));
            assert_eq!(
                dossier.needs_deep_review,
                film_flag::should_flag(&dossier),
                "flag mismatch for {}",
                dossier.prospect_name
            );
        }
    }

    #[test]
    fn composite_clamps_after_multiplier() {
        let scores = FactorScores {
            game_performance: 100,
            raw_athletics: 100,
            overall_production: 100,
            competition_level: 100,
        };
        assert_eq!(composite(&scores, 1.15), 100);
        assert_eq!(composite(&scores, 0.9), 90);
    }

    #[test]
    fn dossier_ids_have_expected_shape() {
        let id = new_dossier_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts[0], "DOS");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 6);
    }
}
