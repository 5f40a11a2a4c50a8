//! Scout delivery ingestion.
//!
//! A batch arrives inline in the request payload, as a `<runId>.json` file on
//! the shared debate-log volume, or both. Every path ends in
//! `WarRoom::process_delivery`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gridiron_common::{DebateRecord, WarRoomError};

/// Body of `POST /api/scout-delivery`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoutDelivery {
    pub run_id: String,
    #[serde(default)]
    pub debate_count: Option<u32>,
    #[serde(default)]
    pub debates: Option<Vec<DebateRecord>>,
}

/// On-disk debate log written by the Scout Hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateLogFile {
    #[serde(default)]
    pub debates: Vec<DebateRecord>,
}

/// Reject the whole batch if any record lacks identity. Nothing is graded
/// from a batch that fails here.
pub fn validate_batch(records: &[DebateRecord]) -> Result<(), WarRoomError> {
    records.iter().try_for_each(DebateRecord::validate)
}

/// Run ids become file names; keep them to a safe alphabet.
pub fn validate_run_id(run_id: &str) -> Result<(), WarRoomError> {
    let ok = !run_id.is_empty()
        && run_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !run_id.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(WarRoomError::Validation(format!("invalid runId '{run_id}'")))
    }
}

pub fn debate_log_path(dir: &Path, run_id: &str) -> PathBuf {
    dir.join(format!("{run_id}.json"))
}

/// Read `<dir>/<runId>.json`. A missing file is `Ok(None)`; an unreadable or
/// malformed one is an error for the caller to log.
pub async fn load_debate_log(
    dir: &Path,
    run_id: &str,
) -> Result<Option<Vec<DebateRecord>>, WarRoomError> {
    validate_run_id(run_id)?;
    let path = debate_log_path(dir, run_id);

    let raw = match tokio::fs::read(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let log: DebateLogFile = serde_json::from_slice(&raw)?;
    Ok(Some(log.debates))
}
