//! Fold event fragments into composite attack records.
//!
//! Each fragment kind owns a disjoint set of record fields, so folding is a
//! sparse outer join keyed by the attack id and the input order does not
//! matter.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::event::{Fragment, RawEvent};

/// Description prefix for an attack where the consumer itself was stopped
/// and no second actor intervened.
const CONSUMER_PREFIX: &str = "CONSUMER";
/// Marker for an attack blocked by a teammate's item.
const STEELED_MARKER: &str = "STEELED";
/// Upper bound on the item modifier score.
const MAX_MODIFIERS: u8 = 5;

/// Merged view of every fragment describing one attack.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompositeRecord {
    pub record_id: String,
    pub description: String,
    pub season: i64,
    pub day: i64,
    pub primary_actor_id: Option<String>,
    pub secondary_actor_id: Option<String>,
    pub item_defended: bool,
    pub before: Option<f64>,
    pub after: Option<f64>,
    pub item: Option<String>,
    pub modifiers: Option<u8>,
    pub primary_name: Option<String>,
    pub secondary_name: Option<String>,
}

impl CompositeRecord {
    #[must_use]
    pub fn new(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            ..Self::default()
        }
    }

    fn apply_attack(&mut self, season: i64, day: i64, description: String, actor_ids: &[String]) {
        if self.primary_actor_id.is_some() {
            debug!(record = %self.record_id, "attack fragment seen twice, later one wins");
        }

        let steeled = description.contains(STEELED_MARKER);
        let mut secondary = if description.starts_with(CONSUMER_PREFIX) {
            None
        } else {
            actor_ids.get(1).cloned()
        };
        if secondary.is_none() && steeled {
            secondary = actor_ids.get(1).cloned();
        }

        self.primary_actor_id = actor_ids.first().cloned();
        self.secondary_actor_id = secondary;
        self.item_defended = steeled;
        self.season = season;
        self.day = day;
        self.description = description;
    }

    fn apply_stat_loss(&mut self, before: Option<f64>, after: Option<f64>) {
        if self.before.is_some() || self.after.is_some() {
            debug!(record = %self.record_id, "stat loss fragment seen twice, later one wins");
        }
        self.before = before;
        self.after = after;
    }

    fn apply_item_change(&mut self, item_name: Option<String>) {
        let Some(item_name) = item_name else {
            debug!(record = %self.record_id, "item fragment has no item name, ignoring");
            return;
        };
        if self.item.is_some() {
            debug!(record = %self.record_id, "item fragment seen twice, later one wins");
        }
        self.modifiers = Some(modifier_score(&item_name));
        self.item = Some(item_name);
    }
}

/// Quality score for an item: one point per word past the first, capped.
#[must_use]
pub fn modifier_score(item_name: &str) -> u8 {
    let words = item_name.split_whitespace().count();
    let extra = words.saturating_sub(1);
    u8::try_from(extra).map_or(MAX_MODIFIERS, |n| n.min(MAX_MODIFIERS))
}

/// Fold raw fragments into composite records keyed by attack id.
///
/// Fragments that cannot be lowered are reported to `diagnostics` and
/// skipped; coin announcements contribute nothing.
pub fn merge(
    fragments: impl IntoIterator<Item = RawEvent>,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<String, CompositeRecord> {
    let mut records: BTreeMap<String, CompositeRecord> = BTreeMap::new();

    for raw in fragments {
        let fragment = match Fragment::from_raw(raw) {
            Ok(fragment) => fragment,
            Err(diagnostic) => {
                diagnostics.push(diagnostic);
                continue;
            }
        };

        match fragment {
            Fragment::Attack {
                id,
                season,
                day,
                description,
                actor_ids,
            } => {
                entry(&mut records, id).apply_attack(season, day, description, &actor_ids);
            }
            Fragment::StatLoss {
                parent_id,
                before,
                after,
            } => entry(&mut records, parent_id).apply_stat_loss(before, after),
            Fragment::ItemChanged {
                parent_id,
                item_name,
            } => entry(&mut records, parent_id).apply_item_change(item_name),
            Fragment::CoinAnnouncement => {}
        }
    }

    records
}

fn entry(records: &mut BTreeMap<String, CompositeRecord>, id: String) -> &mut CompositeRecord {
    records
        .entry(id)
        .or_insert_with_key(|key| CompositeRecord::new(key.clone()))
}
