//! Firebase Realtime Database implementation of RecordStore

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::watch;
use urlencoding::encode;

use super::stream::{apply_event, snapshot_from_value, SseParser, StreamUpdate};
use crate::domain::entities::{IdeaId, NewIdea, Snapshot, Vote};
use crate::domain::ports::{RecordStore, SnapshotReceiver};
use crate::error::{DomainError, FirebaseError};

/// Record Store backed by the Firebase REST API
pub struct FirebaseRecordStore {
    http: Client,
    base_url: String,
    collection: String,
    auth: Option<String>,
}

impl FirebaseRecordStore {
    pub fn new(base_url: String, collection: String, auth: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: collection.trim_matches('/').to_string(),
            auth,
        }
    }

    /// REST URL for a location under the collection
    fn url(&self, children: &[&str]) -> String {
        let mut path = self.collection.clone();
        for child in children {
            path.push('/');
            path.push_str(&encode(child));
        }

        let mut url = format!("{}/{}.json", self.base_url, path);
        if let Some(auth) = &self.auth {
            url.push_str("?auth=");
            url.push_str(&encode(auth));
        }
        url
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, FirebaseError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| FirebaseError::Deserialization(e.to_string()))
        } else if status.as_u16() == 401 {
            Err(FirebaseError::Unauthorized)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(FirebaseError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), FirebaseError> {
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else if status.as_u16() == 401 {
            Err(FirebaseError::Unauthorized)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(FirebaseError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn open_stream(&self) -> Result<reqwest::Response, FirebaseError> {
        let response = self
            .http
            .get(self.url(&[]))
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else if status.as_u16() == 401 {
            Err(FirebaseError::Unauthorized)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(FirebaseError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Body written for a new idea. Timestamp and counters are filled in by the
/// database, so concurrent clients never disagree on them.
#[derive(Serialize)]
struct CreateIdeaRequest<'a> {
    name: &'a str,
    text: &'a str,
    timestamp: Value,
    likes: u64,
    dislikes: u64,
}

/// Response to a push: the generated key
#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

#[async_trait]
impl RecordStore for FirebaseRecordStore {
    async fn snapshot(&self) -> Result<Snapshot, DomainError> {
        let response = self.http.get(self.url(&[])).send().await.map_err(FirebaseError::from)?;
        let tree: Value = self.handle_response(response).await?;

        Ok(snapshot_from_value(&tree))
    }

    async fn append(&self, idea: &NewIdea) -> Result<IdeaId, DomainError> {
        let body = CreateIdeaRequest {
            name: &idea.author,
            text: &idea.text,
            timestamp: json!({ ".sv": "timestamp" }),
            likes: 0,
            dislikes: 0,
        };

        let response = self
            .http
            .post(self.url(&[]))
            .json(&body)
            .send()
            .await
            .map_err(FirebaseError::from)?;
        let pushed: PushResponse = self.handle_response(response).await?;

        Ok(IdeaId(pushed.name))
    }

    async fn increment(&self, id: &IdeaId, vote: Vote) -> Result<(), DomainError> {
        // A server increment on a missing path would create a record with
        // only a counter in it
        let response = self
            .http
            .get(self.url(&[id.as_str(), "text"]))
            .send()
            .await
            .map_err(FirebaseError::from)?;
        let text: Value = self.handle_response(response).await?;
        if text.is_null() {
            return Err(DomainError::NotFound(format!("Idea {}", id)));
        }

        let response = self
            .http
            .put(self.url(&[id.as_str(), vote.field()]))
            .json(&json!({ ".sv": { "increment": 1 } }))
            .send()
            .await
            .map_err(FirebaseError::from)?;

        Ok(self.handle_empty_response(response).await?)
    }

    async fn subscribe(&self) -> Result<SnapshotReceiver, DomainError> {
        let response = self.open_stream().await?;
        let (sender, receiver) = watch::channel(Arc::new(Snapshot::new()));

        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut parser = SseParser::new();
            let mut tree = Value::Null;

            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        tracing::warn!("Firebase stream read failed: {}", e);
                        return;
                    }
                };

                let events = match parser.push(&chunk) {
                    Ok(events) => events,
                    Err(e) => {
                        tracing::warn!("Firebase stream dropped: {}", e);
                        return;
                    }
                };

                for event in events {
                    match apply_event(&mut tree, &event) {
                        Ok(StreamUpdate::Changed) => {
                            sender.send_replace(Arc::new(snapshot_from_value(&tree)));
                        }
                        Ok(StreamUpdate::Ignored) => {}
                        Ok(StreamUpdate::Closed(reason)) => {
                            tracing::warn!("Firebase closed the stream: {}", reason);
                            return;
                        }
                        Err(e) => {
                            tracing::warn!(event = %event.event, "Bad stream event: {}", e);
                        }
                    }
                }

                if sender.is_closed() {
                    tracing::debug!("No snapshot subscribers left, closing stream");
                    return;
                }
            }
            tracing::debug!("Firebase stream ended");
        });

        Ok(receiver)
    }
}
