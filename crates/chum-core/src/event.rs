//! Raw event fragments as served by the event log, and their typed form.
//!
//! The log emits one JSON object per fragment. Several fragments can describe
//! one incident: the attack itself plus optional stat-loss and item-change
//! fragments that point back at it through `metadata.parent`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::diagnostics::Diagnostic;

/// Event type code for a consumer attack.
pub const ATTACK_CODE: i64 = 67;
/// Event type code for a stat loss caused by an attack.
pub const STAT_LOSS_CODE: i64 = 118;
/// Event type code for an item being damaged.
pub const ITEM_DAMAGED_CODE: i64 = 185;
/// Event type code for an item breaking.
pub const ITEM_BROKEN_CODE: i64 = 186;
/// Every code lowered into [`FragmentKind::ItemChanged`].
pub const ITEM_CHANGED_CODES: [i64; 2] = [ITEM_DAMAGED_CODE, ITEM_BROKEN_CODE];
/// Event type code for a coin announcement that merely mentions consumers.
pub const COIN_ANNOUNCEMENT_CODE: i64 = 29;

/// One fragment exactly as the event log returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub type_code: i64,
    #[serde(default)]
    pub season: i64,
    #[serde(default)]
    pub day: i64,
    #[serde(default)]
    pub description: String,
    /// Actor ids; index 0 is the primary actor, index 1 the secondary.
    #[serde(default)]
    pub player_tags: Vec<String>,
    #[serde(default)]
    pub metadata: Option<RawMetadata>,
}

/// Optional metadata block carried by augmenting fragments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetadata {
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub before: Option<f64>,
    #[serde(default)]
    pub after: Option<f64>,
    #[serde(default)]
    pub item_name: Option<String>,
}

/// The fragment kinds the merge engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    AttackOccurred,
    StatLossOccurred,
    ItemChanged,
    CoinAnnouncement,
}

impl FragmentKind {
    /// Map a numeric event type code onto a known kind.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            ATTACK_CODE => Some(Self::AttackOccurred),
            STAT_LOSS_CODE => Some(Self::StatLossOccurred),
            ITEM_DAMAGED_CODE | ITEM_BROKEN_CODE => Some(Self::ItemChanged),
            COIN_ANNOUNCEMENT_CODE => Some(Self::CoinAnnouncement),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AttackOccurred => "attack",
            Self::StatLossOccurred => "stat-loss",
            Self::ItemChanged => "item-changed",
            Self::CoinAnnouncement => "coin-announcement",
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fragment lowered into the shape its kind guarantees.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Attack {
        id: String,
        season: i64,
        day: i64,
        description: String,
        actor_ids: Vec<String>,
    },
    StatLoss {
        parent_id: String,
        before: Option<f64>,
        after: Option<f64>,
    },
    ItemChanged {
        parent_id: String,
        /// Absent when the log omitted `itemName`; the record keeps no item.
        item_name: Option<String>,
    },
    CoinAnnouncement,
}

impl Fragment {
    /// Lower a raw event.
    ///
    /// # Errors
    ///
    /// Returns a [`Diagnostic`] when the type code is unknown or when an
    /// augmenting fragment carries no parent id to key it by.
    pub fn from_raw(raw: RawEvent) -> Result<Self, Diagnostic> {
        let Some(kind) = FragmentKind::from_code(raw.type_code) else {
            return Err(Diagnostic::UnrecognizedFragmentKind {
                event_id: raw.id,
                code: raw.type_code,
            });
        };

        match kind {
            FragmentKind::AttackOccurred => Ok(Self::Attack {
                id: raw.id,
                season: raw.season,
                day: raw.day,
                description: raw.description,
                actor_ids: raw.player_tags,
            }),
            FragmentKind::StatLossOccurred => {
                let metadata = raw.metadata.unwrap_or_default();
                let parent_id = require_parent(raw.id, kind, metadata.parent)?;
                Ok(Self::StatLoss {
                    parent_id,
                    before: metadata.before,
                    after: metadata.after,
                })
            }
            FragmentKind::ItemChanged => {
                let metadata = raw.metadata.unwrap_or_default();
                let parent_id = require_parent(raw.id, kind, metadata.parent)?;
                Ok(Self::ItemChanged {
                    parent_id,
                    item_name: metadata.item_name,
                })
            }
            FragmentKind::CoinAnnouncement => Ok(Self::CoinAnnouncement),
        }
    }
}

fn require_parent(
    event_id: String,
    kind: FragmentKind,
    parent: Option<String>,
) -> Result<String, Diagnostic> {
    parent.ok_or(Diagnostic::MalformedFragment { event_id, kind })
}
