use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{SharedStore, REFERENCES_KEY};

pub const MAX_REFERENCES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceSource {
    Drop,
    Document,
    Layer,
}

impl ReferenceSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Document => "document",
            Self::Layer => "layer",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "drop" => Some(Self::Drop),
            "document" | "canvas" => Some(Self::Document),
            "layer" => Some(Self::Layer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceImage {
    pub id: String,
    /// Base64 PNG payload.
    pub data: String,
    pub source: ReferenceSource,
}

/// Stored ids further ahead of the local clock than this are not trusted.
const MAX_CLOCK_SKEW_MS: i64 = 24 * 60 * 60 * 1000;

/// Millisecond ids that never repeat and never go backwards, even when two
/// references land in the same millisecond or the stored list came from a
/// clock that ran slightly ahead.
#[derive(Debug, Default, Clone)]
struct IdClock {
    last: i64,
}

impl IdClock {
    fn observe(&mut self, id: &str) {
        let Ok(value) = id.parse::<i64>() else {
            return;
        };
        let horizon = Utc::now()
            .timestamp_millis()
            .saturating_add(MAX_CLOCK_SKEW_MS);
        if value > horizon {
            log::warn!("ignoring stored reference id {id} from the far future");
            return;
        }
        self.last = self.last.max(value);
    }

    fn next(&mut self) -> String {
        let next = Utc::now()
            .timestamp_millis()
            .max(self.last.saturating_add(1));
        self.last = next;
        next.to_string()
    }
}

/// Bounded FIFO of reference images, re-persisted in full after every mutation.
pub struct ReferenceManager {
    store: SharedStore,
    entries: Vec<ReferenceImage>,
    clock: IdClock,
}

impl ReferenceManager {
    /// Loads the stored collection once. Anything unreadable is dropped with a
    /// warning; startup never fails on bad storage.
    pub fn load(store: SharedStore) -> Self {
        let mut entries = store
            .get(REFERENCES_KEY)
            .map(|raw| parse_stored_references(&raw))
            .unwrap_or_default();
        if entries.len() > MAX_REFERENCES {
            let excess = entries.len() - MAX_REFERENCES;
            entries.drain(..excess);
        }
        let mut clock = IdClock::default();
        for entry in &entries {
            clock.observe(&entry.id);
        }
        Self {
            store,
            entries,
            clock,
        }
    }

    /// Adds raw image bytes. Empty input is a no-op and returns `None`.
    pub fn add(
        &mut self,
        image: &[u8],
        source: ReferenceSource,
    ) -> anyhow::Result<Option<ReferenceImage>> {
        if image.is_empty() {
            return Ok(None);
        }
        self.add_encoded(BASE64.encode(image), source)
    }

    /// Adds an already base64-encoded payload. Blank input is a no-op.
    pub fn add_encoded(
        &mut self,
        data: String,
        source: ReferenceSource,
    ) -> anyhow::Result<Option<ReferenceImage>> {
        if data.trim().is_empty() {
            return Ok(None);
        }
        let reference = ReferenceImage {
            id: self.clock.next(),
            data,
            source,
        };
        let overflow = (self.entries.len() + 1).saturating_sub(MAX_REFERENCES);
        let (evicted, kept) = self.entries.split_at(overflow);
        let evicted: Vec<String> = evicted.iter().map(|entry| entry.id.clone()).collect();
        let mut next = kept.to_vec();
        next.push(reference.clone());
        self.commit(next)?;
        for id in evicted {
            log::debug!("evicted oldest reference {id}");
        }
        Ok(Some(reference))
    }

    /// Removes the entry with `id`; returns whether one was removed.
    pub fn remove(&mut self, id: &str) -> anyhow::Result<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let next = self
            .entries
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();
        self.commit(next)?;
        Ok(true)
    }

    /// Drops every entry; returns how many there were.
    pub fn clear(&mut self) -> anyhow::Result<usize> {
        let removed = self.entries.len();
        self.commit(Vec::new())?;
        Ok(removed)
    }

    pub fn list(&self) -> &[ReferenceImage] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&ReferenceImage> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores `next` and only then makes it the live collection, so a failed
    /// write leaves memory matching storage.
    fn commit(&mut self, next: Vec<ReferenceImage>) -> anyhow::Result<()> {
        let encoded = serde_json::to_string(&next)?;
        self.store.set(REFERENCES_KEY, &encoded)?;
        self.entries = next;
        Ok(())
    }
}

fn parse_stored_references(raw: &str) -> Vec<ReferenceImage> {
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("failed to parse stored references: {err}");
            return Vec::new();
        }
    };
    let Some(rows) = parsed.as_array() else {
        log::warn!("stored references are not a list; starting empty");
        return Vec::new();
    };
    rows.iter()
        .filter_map(|row| serde_json::from_value::<ReferenceImage>(row.clone()).ok())
        .filter(|row| !row.data.trim().is_empty())
        .collect()
}
