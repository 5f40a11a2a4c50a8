use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::WarRoomError;

/// Marker prefixed to audio-script artifacts that carry script text instead of an audio reference.
pub const TEXT_FALLBACK_MARKER: &str = "[TTS not configured] Script: ";

/// Position recorded on ranking entries when the scout did not report one.
pub const DEFAULT_POSITION: &str = "ATH";

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Pool {
    HighSchool,
    College,
}

impl Pool {
    pub const ALL: [Pool; 2] = [Pool::HighSchool, Pool::College];

    /// Key used on the query surface (`highSchool`, `college`).
    pub fn query_key(&self) -> &'static str {
        match self {
            Pool::HighSchool => "highSchool",
            Pool::College => "college",
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pool::HighSchool => write!(f, "HIGH_SCHOOL"),
            Pool::College => write!(f, "COLLEGE"),
        }
    }
}

/// Which ranking view a query addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolSelector {
    Only(Pool),
    #[default]
    All,
}

impl FromStr for PoolSelector {
    type Err = WarRoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" | "ALL" => Ok(PoolSelector::All),
            "highSchool" | "HIGH_SCHOOL" | "high_school" => Ok(PoolSelector::Only(Pool::HighSchool)),
            "college" | "COLLEGE" => Ok(PoolSelector::Only(Pool::College)),
            other => Err(WarRoomError::Validation(format!("unknown pool '{other}'"))),
        }
    }
}

impl fmt::Display for PoolSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolSelector::Only(pool) => write!(f, "{}", pool.query_key()),
            PoolSelector::All => write!(f, "all"),
        }
    }
}

/// Debate stance. Underrated is side A, overrated is side B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stance {
    Underrated,
    Overrated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    /// Scout Hub reports `COMPLETE` or `PARTIAL`; both are gradable.
    #[default]
    #[serde(alias = "COMPLETE", alias = "PARTIAL")]
    Ok,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Developmental,
    Sleeper,
    Prospect,
    BlueChip,
    Elite,
}

impl Tier {
    /// Inclusive lower bounds: 90 elite, 80 blue chip, 70 prospect, 55 sleeper.
    pub fn from_grade(grade: u8) -> Self {
        match grade {
            90..=u8::MAX => Tier::Elite,
            80..=89 => Tier::BlueChip,
            70..=79 => Tier::Prospect,
            55..=69 => Tier::Sleeper,
            _ => Tier::Developmental,
        }
    }

    /// Lowercase words, e.g. `blue chip`.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Elite => "elite",
            Tier::BlueChip => "blue chip",
            Tier::Prospect => "prospect",
            Tier::Sleeper => "sleeper",
            Tier::Developmental => "developmental",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Elite => write!(f, "ELITE"),
            Tier::BlueChip => write!(f, "BLUE_CHIP"),
            Tier::Prospect => write!(f, "PROSPECT"),
            Tier::Sleeper => write!(f, "SLEEPER"),
            Tier::Developmental => write!(f, "DEVELOPMENTAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebateOutcome {
    SideAWins,
    SideBWins,
    Split,
}

impl fmt::Display for DebateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebateOutcome::SideAWins => write!(f, "SIDE_A_WINS"),
            DebateOutcome::SideBWins => write!(f, "SIDE_B_WINS"),
            DebateOutcome::Split => write!(f, "SPLIT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentKind {
    Narrative,
    AudioScript,
}

impl FromStr for ContentKind {
    type Err = WarRoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "NARRATIVE" | "narrative" | "BLOG" => Ok(ContentKind::Narrative),
            "AUDIO_SCRIPT" | "audio_script" | "PODCAST" => Ok(ContentKind::AudioScript),
            other => Err(WarRoomError::Validation(format!("unknown content kind '{other}'"))),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Narrative => write!(f, "NARRATIVE"),
            ContentKind::AudioScript => write!(f, "AUDIO_SCRIPT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Up,
    Down,
    Steady,
    New,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "UP"),
            Trend::Down => write!(f, "DOWN"),
            Trend::Steady => write!(f, "STEADY"),
            Trend::New => write!(f, "NEW"),
        }
    }
}

// --- Debate input ---

/// A single scalar inside a cited stat line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

pub type CitedStat = BTreeMap<String, StatValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prospect {
    pub name: String,
    pub pool: Pool,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_year: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebateArgument {
    #[serde(alias = "stance")]
    pub side: Stance,
    #[serde(default, alias = "points")]
    pub claims: Vec<String>,
    #[serde(default, alias = "statsCited")]
    pub cited_stats: Vec<CitedStat>,
    /// 0-100.
    pub confidence: f64,
}

/// Proxy for how much evidence the scouts gathered.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceVolume {
    #[serde(default, alias = "braveResults")]
    pub search_result_count: u32,
    #[serde(default, alias = "firecrawlPages")]
    pub pages_scraped: u32,
    #[serde(default)]
    pub stats_found: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebateRecord {
    pub debate_id: String,
    pub prospect: Prospect,
    #[serde(default)]
    pub arguments: Vec<DebateArgument>,
    #[serde(default, alias = "rawData")]
    pub evidence_volume: EvidenceVolume,
    #[serde(default)]
    pub status: RecordStatus,
}

impl DebateRecord {
    /// First argument taking the given stance, if any.
    pub fn argument(&self, side: Stance) -> Option<&DebateArgument> {
        self.arguments.iter().find(|a| a.side == side)
    }

    pub fn is_failed(&self) -> bool {
        self.status == RecordStatus::Failed
    }

    /// Reject records that lack the identity the pipeline keys on.
    pub fn validate(&self) -> Result<(), WarRoomError> {
        if self.debate_id.trim().is_empty() {
            return Err(WarRoomError::Validation("debate record is missing debateId".into()));
        }
        if self.prospect.name.trim().is_empty() {
            return Err(WarRoomError::Validation(format!(
                "debate {} is missing prospect name",
                self.debate_id
            )));
        }
        if self.arguments.len() > 2 {
            return Err(WarRoomError::Validation(format!(
                "debate {} has {} arguments (at most 2)",
                self.debate_id,
                self.arguments.len()
            )));
        }
        Ok(())
    }
}

// --- Dossier ---

/// GROC factor scores, each 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FactorScores {
    pub game_performance: u8,
    pub raw_athletics: u8,
    pub overall_production: u8,
    pub competition_level: u8,
}

/// Luke adjustment layered on top of the GROC factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Adjustment {
    pub leadership_multiplier: f64,
    pub upside_ceiling: u8,
    pub known_concerns: Vec<String>,
    pub evaluator_confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dossier {
    pub dossier_id: String,
    pub prospect_name: String,
    pub pool: Pool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    pub factor_scores: FactorScores,
    pub adjustment: Adjustment,
    pub composite_grade: u8,
    pub tier: Tier,
    pub needs_deep_review: bool,
    pub debate_outcome: DebateOutcome,
    pub validated_stats: Vec<CitedStat>,
}

// --- Content ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentArtifact {
    pub kind: ContentKind,
    pub subject_name: String,
    pub title: String,
    pub body: String,
    pub produced_at: DateTime<Utc>,
    pub produced_by: String,
}

impl ContentArtifact {
    /// Audio-script artifact whose body is script text rather than an audio reference.
    pub fn is_text_fallback(&self) -> bool {
        self.kind == ContentKind::AudioScript && self.body.starts_with(TEXT_FALLBACK_MARKER)
    }
}

// --- Rankings ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub rank: u32,
    pub prospect_name: String,
    pub position: String,
    pub pool: Pool,
    pub grade: u8,
    pub tier: Tier,
    pub trend: Trend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_rank: Option<u32>,
    pub last_updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_are_inclusive_lower_bounds() {
        assert_eq!(Tier::from_grade(100), Tier::Elite);
        assert_eq!(Tier::from_grade(90), Tier::Elite);
        assert_eq!(Tier::from_grade(89), Tier::BlueChip);
        assert_eq!(Tier::from_grade(80), Tier::BlueChip);
        assert_eq!(Tier::from_grade(79), Tier::Prospect);
        assert_eq!(Tier::from_grade(70), Tier::Prospect);
        assert_eq!(Tier::from_grade(69), Tier::Sleeper);
        assert_eq!(Tier::from_grade(55), Tier::Sleeper);
        assert_eq!(Tier::from_grade(54), Tier::Developmental);
        assert_eq!(Tier::from_grade(0), Tier::Developmental);
    }

    #[test]
    fn pool_selector_accepts_query_keys_and_wire_names() {
        assert_eq!("highSchool".parse::<PoolSelector>().unwrap(), PoolSelector::Only(Pool::HighSchool));
        assert_eq!("COLLEGE".parse::<PoolSelector>().unwrap(), PoolSelector::Only(Pool::College));
        assert_eq!("all".parse::<PoolSelector>().unwrap(), PoolSelector::All);
        assert!("juco".parse::<PoolSelector>().is_err());
    }

    #[test]
    fn scout_hub_field_names_deserialize() {
        let json = serde_json::json!({
            "debateId": "DEB-1",
            "prospect": { "name": "Jalen Cross", "pool": "COLLEGE", "source": "247" },
            "arguments": [
                { "hawk": "Lil_Bull_Hawk", "stance": "UNDERRATED", "points": ["fast"], "statsCited": [{"yards": 1200}], "confidence": 72 },
                { "hawk": "Lil_Bear_Hawk", "stance": "OVERRATED", "points": ["limited film"], "statsCited": [], "confidence": 40 }
            ],
            "rawData": { "braveResults": 9, "firecrawlPages": 2, "statsFound": 3 },
            "status": "PARTIAL"
        });

        let record: DebateRecord = serde_json::from_value(json).unwrap();
        assert!(!record.is_failed());
        assert_eq!(record.evidence_volume.pages_scraped, 2);
        assert_eq!(record.evidence_volume.search_result_count, 9);
        let bull = record.argument(Stance::Underrated).unwrap();
        assert_eq!(bull.claims, vec!["fast".to_string()]);
        assert_eq!(bull.cited_stats[0].get("yards"), Some(&StatValue::Number(1200.0)));
    }

    #[test]
    fn validate_rejects_missing_identity() {
        let mut record: DebateRecord = serde_json::from_value(serde_json::json!({
            "debateId": "DEB-2",
            "prospect": { "name": "  ", "pool": "HIGH_SCHOOL" }
        }))
        .unwrap();
        assert!(matches!(record.validate(), Err(WarRoomError::Validation(_))));

        record.prospect.name = "Marcus Hill".into();
        assert!(record.validate().is_ok());

        record.debate_id = String::new();
        assert!(record.validate().is_err());
    }

    #[test]
    fn text_fallback_detection_only_applies_to_audio_scripts() {
        let mut artifact = ContentArtifact {
            kind: ContentKind::AudioScript,
            subject_name: "Marcus Hill".into(),
            title: "t".into(),
            body: format!("{TEXT_FALLBACK_MARKER}hello"),
            produced_at: Utc::now(),
            produced_by: "test".into(),
        };
        assert!(artifact.is_text_fallback());

        artifact.body = "/data/content/podcast-DOS-1.mp3".into();
        assert!(!artifact.is_text_fallback());

        artifact.kind = ContentKind::Narrative;
        artifact.body = format!("{TEXT_FALLBACK_MARKER}hello");
        assert!(!artifact.is_text_fallback());
    }
}
