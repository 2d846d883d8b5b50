//! Concrete event log and player directory collaborators.
//!
//! [`BlaseballClient`] talks to the live endpoints. [`ReplayLog`] and
//! [`ReplayDirectory`] read saved JSON responses so a run can be repeated
//! offline.

use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chum_core::config::SourceConfig;
use chum_core::error::SourceError;
use chum_core::event::RawEvent;
use chum_core::identity::{PlayerDirectory, PlayerRecord};
use chum_core::source::{EventLog, EventQuery};
use serde::de::DeserializeOwned;
use tracing::debug;

pub struct BlaseballClient {
    events_url: String,
    players_url: String,
    user_agent: String,
    requests: Cell<usize>,
}

impl BlaseballClient {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            events_url: config.events_url.clone(),
            players_url: config.players_url.clone(),
            user_agent: config.user_agent.clone(),
            requests: Cell::new(0),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.get()
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, SourceError> {
        self.requests.set(self.requests.get() + 1);

        let mut request = ureq::get(url)
            .set("Accept", "application/json")
            .set("User-Agent", &self.user_agent);
        for (key, value) in params {
            request = request.query(key, value);
        }
        debug!(url, params = params.len(), "GET");

        let response = request.call().map_err(|err| SourceError::Request {
            url: url.to_string(),
            message: err.to_string(),
        })?;

        response
            .into_json::<T>()
            .map_err(|err| SourceError::Decode {
                url: url.to_string(),
                message: err.to_string(),
            })
    }
}

impl EventLog for BlaseballClient {
    fn fetch_events(&self, query: &EventQuery) -> Result<Vec<RawEvent>, SourceError> {
        self.get_json(&self.events_url, &query.params())
    }
}

impl PlayerDirectory for BlaseballClient {
    fn fetch_identities(&self, ids: &[String]) -> Result<Vec<PlayerRecord>, SourceError> {
        self.get_json(&self.players_url, &[("ids", ids.join(","))])
    }
}

fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|err| SourceError::Decode {
        url: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Event log backed by a saved response file.
///
/// The file is read on every fetch. Query parameters other than `limit`
/// are ignored; the file is assumed to already hold the filtered events.
pub struct ReplayLog {
    path: PathBuf,
}

impl ReplayLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EventLog for ReplayLog {
    fn fetch_events(&self, query: &EventQuery) -> Result<Vec<RawEvent>, SourceError> {
        let mut events: Vec<RawEvent> = read_json_array(&self.path)?;
        if let Some(limit) = query.limit {
            events.truncate(limit as usize);
        }
        debug!(path = %self.path.display(), events = events.len(), "replayed events");
        Ok(events)
    }
}

/// Player directory backed by a saved response file.
pub struct ReplayDirectory {
    players: HashMap<String, PlayerRecord>,
}

impl ReplayDirectory {
    /// Load every player record in `path`.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not a JSON array of players.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let records: Vec<PlayerRecord> = read_json_array(path)?;
        let players = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Ok(Self { players })
    }
}

impl PlayerDirectory for ReplayDirectory {
    fn fetch_identities(&self, ids: &[String]) -> Result<Vec<PlayerRecord>, SourceError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.players.get(id).cloned())
            .collect())
    }
}
