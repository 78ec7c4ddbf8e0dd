// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Area configuration across all four signals.
//!
//! The flow owns the area map, opens one capture session per signal in
//! order, persists each finished area through an [`AreaStore`], and decides
//! what happens when persisting fails. It also keeps the operator-facing
//! activity log.

use super::session::{CaptureSession, SessionCallbacks, SessionOutcome};
use crate::io::media::{FrameSource, LoadedImage, MediaUpdate};
use crate::error::StoreError;
use crate::io::store::{AreaStore, PendingLoad, PendingSave};
use crate::models::area::{AreaMap, PointSet, Quad};
use crate::models::signal::SignalId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

/// What to do after a signal's area failed to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistFailurePolicy {
    /// Log the failure and move on to the next signal.
    #[default]
    Advance,
    /// Reopen the same signal with the unsaved points.
    Retry,
}

/// Video locator per signal.
pub type VideoSources = BTreeMap<SignalId, String>;

/// Operator-facing log lines, `[INFO]`/`[ERROR]` prefixed.
#[derive(Debug, Default)]
pub struct ActivityLog {
    lines: Vec<String>,
}

impl ActivityLog {
    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);
        self.lines.push(format!("[INFO] {}", message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{}", message);
        self.lines.push(format!("[ERROR] {}", message));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Active session plus the media feeding its backdrop.
struct ActiveCapture {
    session: CaptureSession,
    media: FrameSource,
}

/// Sequencer for the four per-signal capture sessions.
pub struct CaptureFlow {
    store: Rc<dyn AreaStore>,
    sources: VideoSources,
    areas: AreaMap,
    policy: PersistFailurePolicy,
    fetch_timeout: Duration,
    active: Option<ActiveCapture>,
    pending_load: Option<PendingLoad>,
    /// Saves still in flight from sessions cancelled mid-save.
    orphaned_saves: Vec<(SignalId, Quad, PendingSave)>,
    generation: u64,
    log: ActivityLog,
}

impl CaptureFlow {
    /// `fetch_timeout` bounds remote video fetches.
    pub fn new(
        store: Rc<dyn AreaStore>,
        sources: VideoSources,
        policy: PersistFailurePolicy,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            store,
            sources,
            areas: AreaMap::new(),
            policy,
            fetch_timeout,
            active: None,
            pending_load: None,
            orphaned_saves: Vec::new(),
            generation: 0,
            log: ActivityLog::default(),
        }
    }

    pub fn areas(&self) -> &AreaMap {
        &self.areas
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut ActivityLog {
        &mut self.log
    }

    #[cfg(test)]
    pub fn session(&self) -> Option<&CaptureSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    pub fn session_mut(&mut self) -> Option<&mut CaptureSession> {
        self.active.as_mut().map(|a| &mut a.session)
    }

    pub fn is_capturing(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Whether a load or an orphaned save still needs polling.
    pub fn has_pending_work(&self) -> bool {
        self.is_loading() || !self.orphaned_saves.is_empty()
    }

    /// Bumped whenever a session is opened or closed, so the host can drop
    /// frames that belong to a previous signal.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Clear every area and start capturing from signal A.
    pub fn start_new_areas(&mut self) {
        self.areas.clear();
        self.log.info("Starting area selection process");
        self.open_session(SignalId::A);
    }

    /// Walk all signals again, pre-populated with the current areas.
    pub fn edit_areas(&mut self) {
        self.log.info("Editing saved areas");
        self.open_session(SignalId::A);
    }

    /// Replace the area map wholesale (e.g. from an imported file).
    pub fn replace_areas(&mut self, areas: AreaMap) {
        self.areas = areas;
    }

    /// Ask the store for every saved area.
    pub fn load_areas(&mut self) {
        self.log.info(format!("Loading saved areas from {}...", self.store.describe()));
        self.pending_load = Some(self.store.load_areas());
    }

    /// Abort area selection. A save already in flight is still reported.
    pub fn cancel(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let Some(outcome) = active.session.cancel() else {
            return;
        };
        if let Some((points, pending)) = active.session.take_abandoned_save() {
            let signal = active.session.signal();
            self.orphaned_saves.push((signal, points, pending));
        }
        self.handle_outcome(outcome);
    }

    /// Open a fresh session for `signal`, seeded from the area map.
    fn open_session(&mut self, signal: SignalId) {
        let source = self.sources.get(&signal).cloned().unwrap_or_default();
        let existing = self.areas.get(signal);

        let store = Rc::clone(&self.store);
        let callbacks = SessionCallbacks {
            on_save: Box::new(move |signal, points| store.save_area(signal, points)),
            on_cancel: Box::new(|signal| log::debug!("Cancel requested for signal {}", signal)),
        };

        let media = FrameSource::open(&source, self.fetch_timeout);
        let session = CaptureSession::new(signal, source, existing, callbacks);
        // Replacing the previous capture drops its session and media.
        self.active = Some(ActiveCapture { session, media });
        self.generation += 1;
    }

    fn close_session(&mut self) {
        self.active = None;
        self.generation += 1;
    }

    /// Poll media, pending saves, and pending loads. Call once per frame.
    ///
    /// Returns the newest video frame for the active session, if one arrived.
    pub fn update(&mut self) -> Option<LoadedImage> {
        let mut frame = None;

        if let Some(active) = self.active.as_mut() {
            match active.media.poll() {
                Some(MediaUpdate::Frame(image)) => {
                    active.session.on_video_ready();
                    frame = Some(image);
                }
                Some(MediaUpdate::Failed(e)) => {
                    active.session.on_video_failed(&e);
                    let signal = active.session.signal();
                    self.log.error(format!("Video for Signal {} unavailable: {}", signal, e));
                }
                None => {}
            }
        }

        if let Some(outcome) = self.active.as_mut().and_then(|a| a.session.poll()) {
            self.handle_outcome(outcome);
            frame = None;
        }

        let mut settled = Vec::new();
        self.orphaned_saves
            .retain(|(signal, points, pending)| match pending.try_take() {
                Some(result) => {
                    settled.push((*signal, *points, result));
                    false
                }
                None => true,
            });
        for (signal, points, persisted) in settled {
            if self.report_persisted(signal, &persisted) {
                self.areas.set(signal, PointSet::from(points));
            }
        }

        if let Some(result) = self.pending_load.as_ref().and_then(|p| p.try_take()) {
            self.pending_load = None;
            match result {
                Ok(areas) => {
                    self.areas = areas;
                    self.log.info("Areas loaded successfully.");
                }
                Err(e) => self.log.error(format!("Failed to load areas: {}", e)),
            }
        }

        frame
    }

    /// Log the result of a save. Returns whether it persisted.
    fn report_persisted(&mut self, signal: SignalId, persisted: &Result<(), StoreError>) -> bool {
        match persisted {
            Ok(()) => {
                self.log.info(format!("Area for Signal {} saved to backend.", signal));
                true
            }
            Err(e) => {
                self.log
                    .error(format!("Failed to save area for Signal {}: {}", signal, e));
                false
            }
        }
    }

    fn handle_outcome(&mut self, outcome: SessionOutcome) {
        match outcome {
            SessionOutcome::Saved {
                signal,
                points,
                persisted,
            } => {
                self.areas.set(signal, PointSet::from(points));

                if !self.report_persisted(signal, &persisted)
                    && self.policy == PersistFailurePolicy::Retry
                {
                    self.log.info(format!("Retrying Signal {}", signal));
                    self.open_session(signal);
                    return;
                }

                match signal.next() {
                    Some(next) => {
                        self.log.info(format!("Moving to Signal {}.", next));
                        self.open_session(next);
                    }
                    None => {
                        self.close_session();
                        self.log.info("All signal areas configured successfully");
                    }
                }
            }
            SessionOutcome::Cancelled { .. } => {
                self.close_session();
                self.log.info("Area selection cancelled");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::session::SessionPhase;
    use crate::io::store::Pending;
    use crate::models::area::Point;
    use std::cell::RefCell;
    use std::sync::mpsc::Sender;

    const SQUARE: [(f32, f32); 4] = [(10.0, 10.0), (100.0, 10.0), (100.0, 100.0), (10.0, 100.0)];

    /// In-memory store that records saves and fails the signals listed.
    #[derive(Default)]
    struct FakeStore {
        saved: RefCell<Vec<(SignalId, Quad)>>,
        failing: RefCell<Vec<SignalId>>,
        stored: AreaMap,
        /// Hold save results until the test sends them.
        defer_saves: bool,
        held: RefCell<Option<Sender<Result<(), StoreError>>>>,
    }

    impl AreaStore for FakeStore {
        fn save_area(&self, signal: SignalId, points: Quad) -> PendingSave {
            self.saved.borrow_mut().push((signal, points));
            if self.defer_saves {
                let (sender, pending) = Pending::deferred();
                *self.held.borrow_mut() = Some(sender);
                return pending;
            }
            if self.failing.borrow().contains(&signal) {
                Pending::ready(Err(StoreError::Rejected {
                    status: 500,
                    message: "boom".into(),
                }))
            } else {
                Pending::ready(Ok(()))
            }
        }

        fn load_areas(&self) -> PendingLoad {
            Pending::ready(Ok(self.stored.clone()))
        }

        fn describe(&self) -> String {
            "fake".into()
        }
    }

    fn flow(store: &Rc<FakeStore>, policy: PersistFailurePolicy) -> CaptureFlow {
        CaptureFlow::new(
            Rc::clone(store) as Rc<dyn AreaStore>,
            VideoSources::new(),
            policy,
            Duration::from_secs(1),
        )
    }

    fn capture_square(flow: &mut CaptureFlow) {
        let session = flow.session_mut().unwrap();
        for click in SQUARE {
            session.on_pointer_click(click, (0.0, 0.0));
        }
        session.save().unwrap();
        flow.update();
    }

    fn current_signal(flow: &CaptureFlow) -> Option<SignalId> {
        flow.session().map(|s| s.signal())
    }

    fn has_line(flow: &CaptureFlow, line: &str) -> bool {
        flow.log().lines().iter().any(|l| l == line)
    }

    #[test]
    fn test_sequence_advances_through_all_signals() {
        let store = Rc::new(FakeStore::default());
        let mut flow = flow(&store, PersistFailurePolicy::Advance);
        flow.start_new_areas();

        for signal in SignalId::ALL {
            assert_eq!(current_signal(&flow), Some(signal));
            assert!(flow.session().unwrap().points().is_empty());
            capture_square(&mut flow);
        }

        assert!(!flow.is_capturing());
        assert_eq!(flow.areas().complete_count(), 4);
        let saved: Vec<_> = store.saved.borrow().iter().map(|(s, _)| *s).collect();
        assert_eq!(saved, SignalId::ALL.to_vec());
        assert!(has_line(&flow, "[INFO] All signal areas configured successfully"));
    }

    #[test]
    fn test_failed_save_advances_by_default() {
        let store = Rc::new(FakeStore::default());
        store.failing.borrow_mut().push(SignalId::A);
        let mut flow = flow(&store, PersistFailurePolicy::Advance);
        flow.start_new_areas();
        capture_square(&mut flow);

        assert_eq!(current_signal(&flow), Some(SignalId::B));
        assert!(has_line(
            &flow,
            "[ERROR] Failed to save area for Signal A: boom (HTTP 500)"
        ));
        assert_eq!(flow.areas().get(SignalId::A).len(), 4);
    }

    #[test]
    fn test_failed_save_retries_same_signal() {
        let store = Rc::new(FakeStore::default());
        store.failing.borrow_mut().push(SignalId::A);
        let mut flow = flow(&store, PersistFailurePolicy::Retry);
        flow.start_new_areas();
        capture_square(&mut flow);

        assert_eq!(current_signal(&flow), Some(SignalId::A));
        let session = flow.session_mut().unwrap();
        assert_eq!(session.points().len(), 4);

        store.failing.borrow_mut().clear();
        session.save().unwrap();
        flow.update();
        assert_eq!(current_signal(&flow), Some(SignalId::B));
        assert_eq!(store.saved.borrow().len(), 2);
    }

    #[test]
    fn test_cancel_closes_flow_without_saving() {
        let store = Rc::new(FakeStore::default());
        let mut flow = flow(&store, PersistFailurePolicy::Advance);
        flow.start_new_areas();
        let session = flow.session_mut().unwrap();
        session.on_pointer_click((1.0, 1.0), (0.0, 0.0));
        session.on_pointer_click((2.0, 2.0), (0.0, 0.0));

        let generation = flow.generation();
        flow.cancel();
        assert!(!flow.is_capturing());
        assert!(flow.generation() > generation);
        assert!(store.saved.borrow().is_empty());
        assert!(flow.areas().get(SignalId::A).is_empty());
        assert!(has_line(&flow, "[INFO] Area selection cancelled"));

        flow.start_new_areas();
        assert_eq!(current_signal(&flow), Some(SignalId::A));
    }

    fn cancel_mid_save(store: &Rc<FakeStore>) -> CaptureFlow {
        let mut flow = flow(store, PersistFailurePolicy::Advance);
        flow.start_new_areas();
        capture_square(&mut flow);
        assert_eq!(flow.session().unwrap().phase(), SessionPhase::Saving);

        flow.cancel();
        assert!(!flow.is_capturing());
        assert!(flow.has_pending_work());
        flow
    }

    #[test]
    fn test_failure_after_cancel_is_logged() {
        let store = Rc::new(FakeStore {
            defer_saves: true,
            ..FakeStore::default()
        });
        let mut flow = cancel_mid_save(&store);

        let sender = store.held.borrow_mut().take().unwrap();
        sender
            .send(Err(StoreError::Rejected {
                status: 500,
                message: "db down".into(),
            }))
            .unwrap();
        flow.update();

        assert!(has_line(
            &flow,
            "[ERROR] Failed to save area for Signal A: db down (HTTP 500)"
        ));
        assert!(has_line(&flow, "[INFO] Area selection cancelled"));
        assert!(flow.areas().get(SignalId::A).is_empty());
        assert!(!flow.has_pending_work());
        assert!(!flow.is_capturing());
    }

    #[test]
    fn test_success_after_cancel_updates_map() {
        let store = Rc::new(FakeStore {
            defer_saves: true,
            ..FakeStore::default()
        });
        let mut flow = cancel_mid_save(&store);

        flow.update();
        assert!(flow.has_pending_work());

        let sender = store.held.borrow_mut().take().unwrap();
        sender.send(Ok(())).unwrap();
        flow.update();

        assert!(has_line(&flow, "[INFO] Area for Signal A saved to backend."));
        assert_eq!(flow.areas().get(SignalId::A).len(), 4);
        assert!(!flow.has_pending_work());
        assert!(!flow.is_capturing());
    }

    #[test]
    fn test_edit_prepopulates_each_signal() {
        let mut stored = AreaMap::new();
        let a = PointSet::try_from(vec![Point::new(1, 1), Point::new(2, 2)]).unwrap();
        stored.set(SignalId::A, a.clone());
        let store = Rc::new(FakeStore {
            stored,
            ..FakeStore::default()
        });
        let mut flow = flow(&store, PersistFailurePolicy::Advance);

        flow.load_areas();
        assert!(flow.is_loading());
        flow.update();
        assert!(!flow.is_loading());
        assert!(has_line(&flow, "[INFO] Areas loaded successfully."));

        flow.edit_areas();
        assert_eq!(flow.session().unwrap().points(), a.points());

        let session = flow.session_mut().unwrap();
        session.on_pointer_click((3.0, 3.0), (0.0, 0.0));
        session.on_pointer_click((4.0, 4.0), (0.0, 0.0));
        session.save().unwrap();
        flow.update();

        // Signal B had nothing stored, and nothing leaks over from A.
        assert_eq!(current_signal(&flow), Some(SignalId::B));
        assert!(flow.session().unwrap().points().is_empty());
    }

    #[test]
    fn test_new_areas_clears_map() {
        let mut stored = AreaMap::new();
        stored.set(SignalId::C, PointSet::try_from(vec![Point::new(1, 1)]).unwrap());
        let store = Rc::new(FakeStore {
            stored,
            ..FakeStore::default()
        });
        let mut flow = flow(&store, PersistFailurePolicy::Advance);
        flow.load_areas();
        flow.update();
        assert_eq!(flow.areas().get(SignalId::C).len(), 1);

        flow.start_new_areas();
        assert!(flow.areas().get(SignalId::C).is_empty());
    }
}
