use std::fmt;

use serde::Serialize;

/// Outcome of one scout delivery batch.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    pub received: u32,
    pub graded: u32,
    pub skipped_failed: u32,
    pub flagged: u32,
    pub deep_reviews_received: u32,
    pub content_produced: u32,
    pub audio_fallbacks: u32,
    /// Records left unprocessed because shutdown was requested mid-batch.
    pub cancelled: u32,
}

impl DeliveryReport {
    pub fn merge(&mut self, other: &DeliveryReport) {
        self.received += other.received;
        self.graded += other.graded;
        self.skipped_failed += other.skipped_failed;
        self.flagged += other.flagged;
        self.deep_reviews_received += other.deep_reviews_received;
        self.content_produced += other.content_produced;
        self.audio_fallbacks += other.audio_fallbacks;
        self.cancelled += other.cancelled;
    }
}

impl fmt::Display for DeliveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received={} graded={} skipped_failed={} flagged={} deep_reviews={} content={} audio_fallbacks={} cancelled={}",
            self.received,
            self.graded,
            self.skipped_failed,
            self.flagged,
            self.deep_reviews_received,
            self.content_produced,
            self.audio_fallbacks,
            self.cancelled,
        )
    }
}

/// Process-lifetime counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub total_prospects_graded: u64,
    pub total_content_pieces: u64,
}
