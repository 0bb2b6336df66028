//! Firebase streaming protocol
//!
//! The REST streaming endpoint speaks Server-Sent Events. `put` replaces the
//! value at a path, `patch` merges children into it. We keep the whole
//! collection as a JSON tree and rebuild a `Snapshot` after each change.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::entities::{IdeaId, IdeaRecord, Snapshot};
use crate::error::FirebaseError;

/// One dispatched SSE event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Longest line the parser buffers. The initial `put` carries the whole
/// collection on one line, so this bounds the collection size too.
pub const MAX_LINE_BYTES: usize = 32 * 1024 * 1024;

/// Incremental SSE parser. Chunks may split lines (and UTF-8 sequences)
/// anywhere; only complete lines are interpreted.
#[derive(Debug)]
pub struct SseParser {
    pending: Vec<u8>,
    /// Bytes of `pending` already known to hold no newline
    scanned: usize,
    max_line: usize,
    event: Option<String>,
    data: Vec<String>,
}

impl Default for SseParser {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            pending: Vec::new(),
            scanned: 0,
            max_line,
            event: None,
            data: Vec::new(),
        }
    }

    /// Feed raw bytes, returning every event completed by them
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>, FirebaseError> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(offset) = self.pending[self.scanned..].iter().position(|&b| b == b'\n') {
            let pos = self.scanned + offset;
            self.scanned = 0;
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(event) = self.dispatch() {
                    events.push(event);
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            match field {
                "event" => self.event = Some(value.to_string()),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }

        self.scanned = self.pending.len();
        if self.pending.len() > self.max_line {
            return Err(FirebaseError::Stream(format!(
                "line exceeds {} bytes",
                self.max_line
            )));
        }
        Ok(events)
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        let data = std::mem::take(&mut self.data);
        if event.is_none() && data.is_empty() {
            return None;
        }
        Some(SseEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data: data.join("\n"),
        })
    }
}

/// Outcome of applying one event to the cached tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamUpdate {
    /// The tree changed; publish a new snapshot
    Changed,
    /// Nothing to do (keep-alive, unknown event)
    Ignored,
    /// The server ended the stream
    Closed(String),
}

#[derive(Deserialize)]
struct ChangePayload {
    path: String,
    data: Value,
}

/// Apply a streaming event to the collection tree
pub fn apply_event(tree: &mut Value, event: &SseEvent) -> Result<StreamUpdate, FirebaseError> {
    match event.event.as_str() {
        "put" => {
            let payload = parse_payload(&event.data)?;
            set_at_path(tree, &segments(&payload.path), payload.data);
            Ok(StreamUpdate::Changed)
        }
        "patch" => {
            let payload = parse_payload(&event.data)?;
            let Value::Object(children) = payload.data else {
                return Err(FirebaseError::Deserialization(
                    "patch data must be an object".to_string(),
                ));
            };
            let base = segments(&payload.path);
            for (key, value) in children {
                let mut path = base.clone();
                path.extend(segments(&key));
                set_at_path(tree, &path, value);
            }
            Ok(StreamUpdate::Changed)
        }
        "keep-alive" => Ok(StreamUpdate::Ignored),
        "cancel" => Ok(StreamUpdate::Closed(format!("cancelled: {}", event.data))),
        "auth_revoked" => Ok(StreamUpdate::Closed("auth revoked".to_string())),
        other => {
            tracing::debug!(event = other, "Ignoring unknown stream event");
            Ok(StreamUpdate::Ignored)
        }
    }
}

fn parse_payload(data: &str) -> Result<ChangePayload, FirebaseError> {
    serde_json::from_str(data).map_err(|e| FirebaseError::Deserialization(e.to_string()))
}

fn segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Write `value` at `path`, creating intermediate objects. Writing null
/// removes the key.
fn set_at_path(tree: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *tree = value;
        return;
    };

    let mut node = tree;
    for segment in parents {
        node = object_mut(node)
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let object = object_mut(node);
    if value.is_null() {
        object.remove(last);
    } else {
        object.insert(last.clone(), value);
    }
}

fn object_mut(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

/// Convert the collection tree into a snapshot, skipping records that do not
/// have the expected shape or whose key is not a usable idea id
pub fn snapshot_from_value(tree: &Value) -> Snapshot {
    let Value::Object(entries) = tree else {
        return Snapshot::new();
    };

    entries
        .iter()
        .filter_map(|(key, value)| {
            let Ok(id) = IdeaId::parse(key) else {
                tracing::warn!(idea_id = %key.escape_debug(), "Skipping idea with invalid key");
                return None;
            };
            match serde_json::from_value::<IdeaRecord>(value.clone()) {
                Ok(record) => Some((id, record)),
                Err(e) => {
                    tracing::warn!(idea_id = %key, "Skipping malformed idea record: {}", e);
                    None
                }
            }
        })
        .collect()
}
