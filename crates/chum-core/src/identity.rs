//! Resolve actor ids to display names through a batched player lookup.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SourceError;
use crate::merge::CompositeRecord;

/// Most ids the player endpoint accepts in one request.
pub const IDENTITY_BATCH_SIZE: usize = 10;

/// Trait flag marking a player whose public name was scrambled.
const SCATTERED_FLAG: &str = "SCATTERED";

/// Player record as the player endpoint returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "permAttr", default)]
    pub perm_attr: Vec<String>,
    #[serde(default)]
    pub state: Option<PlayerState>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    #[serde(default)]
    pub unscattered_name: Option<String>,
}

/// A player as the rest of the pipeline sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub id: String,
    pub display_name: String,
    pub is_altered: bool,
    pub altered_original_name: Option<String>,
}

impl From<PlayerRecord> for PlayerIdentity {
    fn from(record: PlayerRecord) -> Self {
        let is_altered = record.perm_attr.iter().any(|attr| attr == SCATTERED_FLAG);
        Self {
            id: record.id,
            display_name: record.name,
            is_altered,
            altered_original_name: record.state.and_then(|state| state.unscattered_name),
        }
    }
}

impl PlayerIdentity {
    /// Name to print: the original name for altered players.
    ///
    /// An altered player with no recorded original name has no usable name
    /// and is treated like a missing player.
    #[must_use]
    pub fn resolved_name(&self) -> Option<&str> {
        if self.is_altered {
            self.altered_original_name.as_deref()
        } else {
            Some(&self.display_name)
        }
    }
}

/// Batched player lookup.
pub trait PlayerDirectory {
    /// Fetch the records for one batch of at most [`IDENTITY_BATCH_SIZE`] ids.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the lookup fails; the run aborts.
    fn fetch_identities(&self, ids: &[String]) -> Result<Vec<PlayerRecord>, SourceError>;
}

/// Every actor id named by `records`, deduplicated, absent ids excluded.
#[must_use]
pub fn collect_actor_ids<'a>(
    records: impl IntoIterator<Item = &'a CompositeRecord>,
) -> BTreeSet<String> {
    records
        .into_iter()
        .flat_map(|record| [&record.primary_actor_id, &record.secondary_actor_id])
        .filter_map(Option::clone)
        .collect()
}

/// Resolve `ids` to display names in batches of [`IDENTITY_BATCH_SIZE`].
///
/// Ids the directory does not return are simply missing from the map.
///
/// # Errors
///
/// Propagates the first [`SourceError`] from the directory.
pub fn resolve(
    ids: &BTreeSet<String>,
    directory: &dyn PlayerDirectory,
) -> Result<HashMap<String, String>, SourceError> {
    let ids: Vec<String> = ids.iter().cloned().collect();
    let mut names = HashMap::with_capacity(ids.len());

    for batch in ids.chunks(IDENTITY_BATCH_SIZE) {
        debug!(size = batch.len(), "looking up player batch");
        for record in directory.fetch_identities(batch)? {
            let identity = PlayerIdentity::from(record);
            let Some(name) = identity.resolved_name().map(ToString::to_string) else {
                debug!(player = %identity.id, "altered player has no original name");
                continue;
            };
            names.insert(identity.id, name);
        }
    }

    Ok(names)
}

/// Copy resolved names onto the records.
pub fn apply_names<'a>(
    records: impl IntoIterator<Item = &'a mut CompositeRecord>,
    names: &HashMap<String, String>,
) {
    let lookup = |id: &Option<String>| id.as_ref().and_then(|id| names.get(id)).cloned();
    for record in records {
        record.primary_name = lookup(&record.primary_actor_id);
        record.secondary_name = lookup(&record.secondary_actor_id);
    }
}
