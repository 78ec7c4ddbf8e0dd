// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Area persistence.
//!
//! Stores hand back a [`Pending`] result instead of blocking: HTTP requests
//! run on a background thread and the UI thread polls for the outcome once
//! per frame.

use crate::error::StoreError;
use crate::io::serialization;
use crate::models::area::{AreaMap, Point, PointSet, Quad};
use crate::models::document::AreaDocument;
use crate::models::signal::SignalId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::time::Duration;

/// Result of a store operation that may still be in flight.
pub struct Pending<T> {
    receiver: Receiver<Result<T, StoreError>>,
}

pub type PendingSave = Pending<()>;
pub type PendingLoad = Pending<AreaMap>;

impl<T: Send + 'static> Pending<T> {
    /// Run `job` on a background thread.
    pub fn spawn<F>(job: F) -> Self
    where
        F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    {
        let (sender, receiver) = channel();
        std::thread::spawn(move || {
            let _ = sender.send(job());
        });
        Self { receiver }
    }
}

impl<T> Pending<T> {
    /// An already-resolved result.
    pub fn ready(result: Result<T, StoreError>) -> Self {
        let (sender, pending) = Self::deferred();
        let _ = sender.send(result);
        pending
    }

    /// A result that is resolved later through the returned sender.
    pub fn deferred() -> (Sender<Result<T, StoreError>>, Self) {
        let (sender, receiver) = channel();
        (sender, Self { receiver })
    }

    /// Take the result if it has arrived.
    pub fn try_take(&self) -> Option<Result<T, StoreError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(StoreError::Disconnected)),
        }
    }
}

/// Backend persistence for detection areas.
pub trait AreaStore {
    /// Persist one signal's completed area.
    fn save_area(&self, signal: SignalId, points: Quad) -> PendingSave;

    /// Fetch every stored area.
    fn load_areas(&self) -> PendingLoad;

    /// Short description for log messages.
    fn describe(&self) -> String;
}

#[derive(Debug, Serialize)]
struct SaveAreaRequest {
    signal_id: SignalId,
    area: Vec<Point>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AreasResponse {
    #[serde(default, alias = "areas")]
    area: BTreeMap<String, Vec<Point>>,
}

/// Store backed by the traffic backend's REST endpoints.
pub struct HttpAreaStore {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpAreaStore {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl AreaStore for HttpAreaStore {
    fn save_area(&self, signal: SignalId, points: Quad) -> PendingSave {
        let agent = self.agent.clone();
        let url = self.endpoint("api/save_area/");
        let payload = SaveAreaRequest {
            signal_id: signal,
            area: points.to_vec(),
        };

        Pending::spawn(move || {
            log::debug!("POST {} for signal {}", url, signal);
            match agent.post(&url).send_json(payload) {
                Ok(_) => Ok(()),
                Err(ureq::Error::Status(status, response)) => {
                    let body = response.into_string().unwrap_or_default();
                    let message = error_message(&body)
                        .unwrap_or_else(|| format!("Failed to save area for signal {}", signal));
                    Err(StoreError::Rejected { status, message })
                }
                Err(e) => Err(StoreError::Transport(e.to_string())),
            }
        })
    }

    fn load_areas(&self) -> PendingLoad {
        let agent = self.agent.clone();
        let url = self.endpoint("api/get_area/");

        Pending::spawn(move || {
            log::debug!("GET {}", url);
            match agent.get(&url).call() {
                Ok(response) => {
                    let body = response.into_string()?;
                    decode_areas(&body)
                }
                Err(ureq::Error::Status(status, response)) => {
                    let body = response.into_string().unwrap_or_default();
                    let message =
                        error_message(&body).unwrap_or_else(|| "Failed to fetch areas".to_string());
                    Err(StoreError::Rejected { status, message })
                }
                Err(e) => Err(StoreError::Transport(e.to_string())),
            }
        })
    }

    fn describe(&self) -> String {
        format!("backend {}", self.base_url)
    }
}

/// Extract the `error` field from a backend error body.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body).ok()?.error
}

/// Decode the backend's area listing, keyed by signal letter.
fn decode_areas(body: &str) -> Result<AreaMap, StoreError> {
    let response: AreasResponse =
        serde_json::from_str(body).map_err(|e| StoreError::InvalidData(e.to_string()))?;

    let mut areas = AreaMap::new();
    for (key, points) in response.area {
        let Some(signal) = SignalId::from_letter(&key) else {
            log::warn!("Ignoring area for unknown signal {:?}", key);
            continue;
        };
        let points =
            PointSet::try_from(points).map_err(|e| StoreError::InvalidData(e.to_string()))?;
        areas.set(signal, points);
    }
    Ok(areas)
}

/// Store that keeps all areas in a local YAML or JSON document.
pub struct FileAreaStore {
    path: PathBuf,
}

impl FileAreaStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<AreaDocument, StoreError> {
        if !self.path.exists() {
            return Ok(AreaDocument::default());
        }
        serialization::import_document(&self.path)
            .map_err(|e| StoreError::InvalidData(format!("{:#}", e)))
    }

    fn write_area(&self, signal: SignalId, points: Quad) -> Result<(), StoreError> {
        let mut document = self.read()?;
        document.areas.set(signal, PointSet::from(points));
        serialization::export_document(&document, &self.path)
            .map_err(|e| StoreError::Io(format!("{:#}", e)))
    }
}

impl AreaStore for FileAreaStore {
    fn save_area(&self, signal: SignalId, points: Quad) -> PendingSave {
        Pending::ready(self.write_area(signal, points))
    }

    fn load_areas(&self) -> PendingLoad {
        Pending::ready(self.read().map(|document| document.areas))
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: Quad = [
        Point::new(10, 10),
        Point::new(100, 10),
        Point::new(100, 100),
        Point::new(10, 100),
    ];

    #[test]
    fn test_pending_ready_and_deferred() {
        let ready = Pending::ready(Ok(7));
        assert_eq!(ready.try_take(), Some(Ok(7)));

        let (sender, pending) = Pending::<()>::deferred();
        assert_eq!(pending.try_take(), None);
        sender.send(Err(StoreError::Transport("refused".into()))).unwrap();
        assert_eq!(
            pending.try_take(),
            Some(Err(StoreError::Transport("refused".into())))
        );
    }

    #[test]
    fn test_pending_reports_dropped_worker() {
        let (sender, pending) = Pending::<()>::deferred();
        drop(sender);
        assert_eq!(pending.try_take(), Some(Err(StoreError::Disconnected)));
    }

    #[test]
    fn test_pending_spawn_delivers() {
        let pending = Pending::spawn(|| Ok(42));
        let result = loop {
            if let Some(result) = pending.try_take() {
                break result;
            }
            std::thread::sleep(Duration::from_millis(1));
        };
        assert_eq!(result, Ok(42));
    }

    #[test]
    fn test_save_request_wire_shape() {
        let request = SaveAreaRequest {
            signal_id: SignalId::B,
            area: QUAD.to_vec(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "signal_id": "B",
                "area": [[10, 10], [100, 10], [100, 100], [10, 100]]
            })
        );
    }

    #[test]
    fn test_error_message_from_body() {
        assert_eq!(
            error_message(r#"{"error": "area must be a list of 4 points"}"#),
            Some("area must be a list of 4 points".to_string())
        );
        assert_eq!(error_message("<html>502</html>"), None);
        assert_eq!(error_message("{}"), None);
    }

    #[test]
    fn test_decode_areas_accepts_both_keys() {
        let body = r#"{"area": {"A": [[1,2],[3,4],[5,6],[7,8]], "Z": [[0,0]]}}"#;
        let areas = decode_areas(body).unwrap();
        assert_eq!(areas.get(SignalId::A).len(), 4);
        assert_eq!(areas.complete_count(), 1);
        assert!(areas.get(SignalId::B).is_empty());

        let body = r#"{"areas": {"b": [[9,9]]}}"#;
        let areas = decode_areas(body).unwrap();
        assert_eq!(areas.get(SignalId::B).points(), &[Point::new(9, 9)]);

        assert!(matches!(
            decode_areas("not json"),
            Err(StoreError::InvalidData(_))
        ));
        assert!(matches!(
            decode_areas(r#"{"area": {"A": [[1,1],[2,2],[3,3],[4,4],[5,5]]}}"#),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_file_store_saves_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAreaStore::new(dir.path().join("areas.yaml"));

        let empty = store.load_areas().try_take().unwrap().unwrap();
        assert_eq!(empty, AreaMap::new());

        assert_eq!(store.save_area(SignalId::A, QUAD).try_take(), Some(Ok(())));
        let mut shifted = QUAD;
        shifted[0] = Point::new(0, 0);
        assert_eq!(store.save_area(SignalId::D, shifted).try_take(), Some(Ok(())));

        let areas = store.load_areas().try_take().unwrap().unwrap();
        assert_eq!(areas.get(SignalId::A).as_quad(), Some(QUAD));
        assert_eq!(areas.get(SignalId::D).as_quad(), Some(shifted));
        assert!(areas.get(SignalId::B).is_empty());
    }

    #[test]
    fn test_file_store_reports_bad_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAreaStore::new(dir.path().join("areas.txt"));
        assert!(matches!(
            store.save_area(SignalId::A, QUAD).try_take(),
            Some(Err(StoreError::Io(_)))
        ));
    }
}
