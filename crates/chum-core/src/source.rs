//! Event log collaborator and the queries sent to it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::event::RawEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort order '{other}': expected asc or desc")),
        }
    }
}

/// Filters for one event log request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Case-insensitive substring the description must contain.
    pub description: Option<String>,
    pub event_type: Option<i64>,
    pub sort_order: Option<SortOrder>,
    pub limit: Option<u32>,
}

impl EventQuery {
    /// Query parameters in a stable order, unset filters omitted.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if let Some(order) = self.sort_order {
            params.push(("sortorder", order.to_string()));
        }
        if let Some(description) = &self.description {
            params.push(("description", description.clone()));
        }
        if let Some(event_type) = self.event_type {
            params.push(("type", event_type.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

/// Something that can answer an [`EventQuery`].
pub trait EventLog {
    /// Fetch every fragment matching `query`.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] on transport or decode failure.
    fn fetch_events(&self, query: &EventQuery) -> Result<Vec<RawEvent>, SourceError>;
}
