//! Per-pool Per|Form rankings.
//!
//! Each pool's list is kept sorted by grade descending with dense 1-based
//! ranks after every upsert. Ties keep insertion order (stable sort).
//!
//! Trend policy: strictly higher grade is `UP`, strictly lower is `DOWN`,
//! an equal grade is `STEADY`, and a first appearance is `NEW`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use gridiron_common::{
    Dossier, Pool, PoolSelector, RankingEntry, Trend, WarRoomError, DEFAULT_POSITION,
};

#[derive(Debug, Default)]
pub struct RankingLedger {
    lists: HashMap<Pool, Vec<RankingEntry>>,
    latest: HashMap<(Pool, String), Dossier>,
}

pub fn trend_for(new_grade: u8, old_grade: u8) -> Trend {
    match new_grade.cmp(&old_grade) {
        std::cmp::Ordering::Greater => Trend::Up,
        std::cmp::Ordering::Less => Trend::Down,
        std::cmp::Ordering::Equal => Trend::Steady,
    }
}

impl RankingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the prospect's entry from its newest dossier, then
    /// re-sort and re-rank the pool. Returns the entry as ranked.
    pub fn upsert(&mut self, dossier: &Dossier, now: DateTime<Utc>) -> RankingEntry {
        let pool = dossier.pool;
        let list = self.lists.entry(pool).or_default();
        let existing = list
            .iter()
            .position(|e| e.prospect_name == dossier.prospect_name);

        let (trend, previous_rank) = match existing {
            Some(i) => (
                trend_for(dossier.composite_grade, list[i].grade),
                Some(list[i].rank),
            ),
            None => (Trend::New, None),
        };

        let mut entry = RankingEntry {
            rank: 0,
            prospect_name: dossier.prospect_name.clone(),
            position: dossier
                .position
                .clone()
                .unwrap_or_else(|| DEFAULT_POSITION.to_string()),
            pool,
            grade: dossier.composite_grade,
            tier: dossier.tier,
            trend,
            previous_rank,
            last_updated: now,
        };

        match existing {
            Some(i) => list[i] = entry.clone(),
            None => list.push(entry.clone()),
        }

        list.sort_by(|a, b| b.grade.cmp(&a.grade));
        assign_ranks(list);

        if let Some(i) = list.iter().position(|e| e.prospect_name == entry.prospect_name) {
            entry.rank = list[i].rank;
        }

        self.latest
            .insert((pool, dossier.prospect_name.clone()), dossier.clone());

        entry
    }

    /// Top `limit` entries. `All` merges the pools and re-ranks the merged
    /// view on copies; stored per-pool ranks are untouched.
    pub fn query(&self, selector: PoolSelector, limit: usize) -> Vec<RankingEntry> {
        match selector {
            PoolSelector::Only(pool) => self
                .lists
                .get(&pool)
                .map(|list| list.iter().take(limit).cloned().collect())
                .unwrap_or_default(),
            PoolSelector::All => {
                let mut merged: Vec<RankingEntry> = Pool::ALL
                    .iter()
                    .filter_map(|pool| self.lists.get(pool))
                    .flatten()
                    .cloned()
                    .collect();
                merged.sort_by(|a, b| b.grade.cmp(&a.grade));
                assign_ranks(&mut merged);
                merged.truncate(limit);
                merged
            }
        }
    }

    /// Number of ranked prospects in the selected view.
    pub fn total(&self, selector: PoolSelector) -> usize {
        match selector {
            PoolSelector::Only(pool) => self.len(pool),
            PoolSelector::All => Pool::ALL.iter().map(|p| self.len(*p)).sum(),
        }
    }

    pub fn len(&self, pool: Pool) -> usize {
        self.lists.get(&pool).map_or(0, Vec::len)
    }

    /// Dossier behind the prospect's current ranking.
    pub fn get(&self, pool: Pool, prospect_name: &str) -> Result<&Dossier, WarRoomError> {
        self.latest
            .get(&(pool, prospect_name.to_string()))
            .ok_or_else(|| WarRoomError::not_found(Some(pool), prospect_name))
    }

    /// Search every pool for the prospect's ranked dossier.
    pub fn find(&self, prospect_name: &str) -> Option<&Dossier> {
        Pool::ALL
            .iter()
            .find_map(|pool| self.latest.get(&(*pool, prospect_name.to_string())))
    }
}

fn assign_ranks(list: &mut [RankingEntry]) {
    for (i, entry) in list.iter_mut().enumerate() {
        entry.rank = i as u32 + 1;
    }
}
