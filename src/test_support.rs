//! In-memory [`Transport`] used by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use crate::catalog::transport::{FileBody, Transport};
use crate::error::{Error, Result};

const ROUTES_PATH: &str = "/api/mountainroutes";

/// A canned file response.
struct MockFile {
    disposition: Option<String>,
    body: Vec<u8>,
}

/// Serves canned JSON and files, and records every request it sees.
#[derive(Default)]
pub struct MockTransport {
    json: HashMap<String, serde_json::Value>,
    routes: HashMap<String, serde_json::Value>,
    files: HashMap<u64, MockFile>,
    failing: HashSet<String>,
    calls: Mutex<Vec<(String, Vec<(&'static str, String)>)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `value` for GET `path`.
    pub fn with_json(mut self, path: &str, value: serde_json::Value) -> Self {
        self.json.insert(path.to_string(), value);
        self
    }

    /// Serves `value` for route searches with `mountain_id` = `mountain`.
    pub fn with_routes(mut self, mountain: u32, value: serde_json::Value) -> Self {
        self.routes.insert(mountain.to_string(), value);
        self
    }

    /// Serves a document body, optionally with a `Content-Disposition` header.
    pub fn with_file(mut self, id: u64, disposition: Option<&str>, body: &[u8]) -> Self {
        self.files.insert(
            id,
            MockFile {
                disposition: disposition.map(str::to_string),
                body: body.to_vec(),
            },
        );
        self
    }

    /// Answers GET `path` with HTTP 500.
    pub fn failing(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    /// Number of requests made for `path`.
    pub fn count(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .count()
    }

    /// Query parameters of the most recent request for `path`.
    pub fn last_query(&self, path: &str) -> Option<Vec<(&'static str, String)>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, q)| q.clone())
    }

    fn record(&self, path: &str, query: &[(&'static str, String)]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), query.to_vec()));
        if self.failing.contains(path) {
            return Err(Error::Status {
                status: 500,
                url: format!("http://mock{path}"),
            });
        }
        Ok(())
    }

    fn not_found(path: &str) -> Error {
        Error::Status {
            status: 404,
            url: format!("http://mock{path}"),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, path: &str, query: &[(&'static str, String)]) -> Result<Bytes> {
        self.record(path, query)?;
        let value = if path == ROUTES_PATH {
            let mountain = query
                .iter()
                .find(|(k, _)| *k == "mountain_id")
                .map(|(_, v)| v.as_str())
                .unwrap_or_default();
            Some(
                self.routes
                    .get(mountain)
                    .cloned()
                    .unwrap_or_else(|| serde_json::json!([])),
            )
        } else {
            self.json.get(path).cloned()
        };
        let value = value.ok_or_else(|| Self::not_found(path))?;
        Ok(Bytes::from(value.to_string()))
    }

    async fn get_file(&self, path: &str) -> Result<FileBody> {
        self.record(path, &[])?;
        let file = path
            .strip_prefix("/api/files/")
            .and_then(|id| id.parse::<u64>().ok())
            .and_then(|id| self.files.get(&id))
            .ok_or_else(|| Self::not_found(path))?;

        // Split into uneven pieces so chunked writes see more than one frame.
        let pieces: Vec<Result<Bytes>> = file
            .body
            .chunks(3000)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(FileBody {
            content_disposition: file.disposition.clone(),
            body: futures::stream::iter(pieces).boxed(),
        })
    }
}
