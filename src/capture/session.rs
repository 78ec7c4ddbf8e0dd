// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Capture session for one signal's detection area.
//!
//! A session collects up to four clicked points over the signal's video,
//! validates them, hands a complete area to its save callback, and ends with
//! exactly one [`SessionOutcome`]. A new signal always gets a new session.

use super::render::{render_overlay, OverlaySurface};
use super::scheduler::{FrameRequester, RepaintScheduler};
use crate::error::{CaptureError, MediaError, StoreError};
use crate::io::store::PendingSave;
use crate::models::area::{Point, PointSet, Quad};
use crate::models::signal::SignalId;
use crate::util::geometry::to_canvas_point;

/// Persists a completed area; the result arrives later.
pub type SaveCallback = Box<dyn FnMut(SignalId, Quad) -> PendingSave>;

/// Told when the operator aborts a session.
pub type CancelCallback = Box<dyn FnMut(SignalId)>;

/// Host hooks a session reports to.
pub struct SessionCallbacks {
    pub on_save: SaveCallback,
    pub on_cancel: CancelCallback,
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for the first video frame; clicks still register.
    Loading,
    /// Fewer than four points collected.
    Collecting,
    /// Four points collected, save available.
    ReadyToSave,
    /// Save callback invoked, waiting for its result.
    Saving,
    Saved,
    Cancelled,
}

/// The single terminal result of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The area was handed to the save callback. `persisted` carries the
    /// result of that attempt; a failure is not rolled back here.
    Saved {
        signal: SignalId,
        points: Quad,
        persisted: Result<(), StoreError>,
    },
    Cancelled { signal: SignalId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ended {
    Saved,
    Cancelled,
}

/// One signal's point-capture session.
pub struct CaptureSession {
    signal: SignalId,
    video_source: String,
    points: PointSet,
    video_ready: bool,
    video_error: Option<String>,
    error: Option<String>,
    saving: Option<(Quad, PendingSave)>,
    abandoned: Option<(Quad, PendingSave)>,
    ended: Option<Ended>,
    callbacks: SessionCallbacks,
    scheduler: RepaintScheduler,
}

impl CaptureSession {
    /// Start a session for `signal`, pre-populated with `existing` points.
    pub fn new(
        signal: SignalId,
        video_source: impl Into<String>,
        existing: PointSet,
        callbacks: SessionCallbacks,
    ) -> Self {
        let mut scheduler = RepaintScheduler::new();
        scheduler.start();

        let session = Self {
            signal,
            video_source: video_source.into(),
            points: existing,
            video_ready: false,
            video_error: None,
            error: None,
            saving: None,
            abandoned: None,
            ended: None,
            callbacks,
            scheduler,
        };
        log::info!(
            "Capture session started for signal {} ({} existing points)",
            session.signal,
            session.points.len()
        );
        session
    }

    pub fn signal(&self) -> SignalId {
        self.signal
    }

    pub fn video_source(&self) -> &str {
        &self.video_source
    }

    pub fn points(&self) -> &[Point] {
        self.points.points()
    }

    pub fn video_ready(&self) -> bool {
        self.video_ready
    }

    /// Why the video backdrop is unavailable, if it failed.
    pub fn video_error(&self) -> Option<&str> {
        self.video_error.as_deref()
    }

    /// Validation message for the operator.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> SessionPhase {
        match self.ended {
            Some(Ended::Saved) => SessionPhase::Saved,
            Some(Ended::Cancelled) => SessionPhase::Cancelled,
            None if self.saving.is_some() => SessionPhase::Saving,
            None if self.points.is_complete() => SessionPhase::ReadyToSave,
            None if !self.video_ready => SessionPhase::Loading,
            None => SessionPhase::Collecting,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.ended.is_some()
    }

    /// Whether points may still be added, removed, or saved.
    fn is_editable(&self) -> bool {
        self.ended.is_none() && self.saving.is_none()
    }

    pub fn can_save(&self) -> bool {
        self.is_editable() && self.points.is_complete()
    }

    pub fn can_reset(&self) -> bool {
        self.is_editable() && !self.points.is_empty()
    }

    /// Whether another click would add a point.
    pub fn accepts_points(&self) -> bool {
        self.is_editable() && !self.points.is_complete()
    }

    /// Add the clicked position as the next vertex.
    ///
    /// Returns the stored point, or `None` when the click was ignored because
    /// the area is complete or the session no longer accepts edits.
    pub fn on_pointer_click(&mut self, event: (f32, f32), origin: (f32, f32)) -> Option<Point> {
        if !self.accepts_points() {
            return None;
        }
        let point = to_canvas_point(event, origin);
        self.points.push(point);
        log::debug!(
            "Signal {}: point {} at ({}, {})",
            self.signal,
            self.points.len(),
            point.x,
            point.y
        );
        Some(point)
    }

    /// Remove all points. The active signal is unchanged.
    pub fn reset(&mut self) -> Result<(), CaptureError> {
        if !self.is_editable() {
            return Err(CaptureError::Locked {
                signal: self.signal,
            });
        }
        self.points.clear();
        log::debug!("Signal {}: points cleared", self.signal);
        Ok(())
    }

    /// Hand the complete area to the save callback.
    ///
    /// With fewer than four points the error message is set and nothing is
    /// saved; the session stays open.
    pub fn save(&mut self) -> Result<(), CaptureError> {
        if !self.is_editable() {
            return Err(CaptureError::Locked {
                signal: self.signal,
            });
        }

        let Some(quad) = self.points.as_quad() else {
            let err = CaptureError::Incomplete {
                count: self.points.len(),
            };
            log::warn!("Signal {}: save with {} points", self.signal, self.points.len());
            self.error = Some(err.to_string());
            return Err(err);
        };

        self.error = None;
        let pending = (self.callbacks.on_save)(self.signal, quad);
        self.saving = Some((quad, pending));
        log::info!("Saving area for signal {}", self.signal);
        Ok(())
    }

    /// Check on a pending save without blocking.
    pub fn poll(&mut self) -> Option<SessionOutcome> {
        let (quad, pending) = self.saving.as_ref()?;
        let persisted = pending.try_take()?;
        let points = *quad;

        self.saving = None;
        self.ended = Some(Ended::Saved);
        self.scheduler.stop();
        Some(SessionOutcome::Saved {
            signal: self.signal,
            points,
            persisted,
        })
    }

    /// Abort the session.
    ///
    /// A save already handed to the store is not revoked; it is kept for
    /// [`take_abandoned_save`](Self::take_abandoned_save) so its result can
    /// still be reported. Returns `None` if the session had already ended.
    pub fn cancel(&mut self) -> Option<SessionOutcome> {
        if self.ended.is_some() {
            return None;
        }
        self.abandoned = self.saving.take();
        self.points.clear();
        self.ended = Some(Ended::Cancelled);
        self.scheduler.stop();
        (self.callbacks.on_cancel)(self.signal);
        log::info!("Capture session for signal {} cancelled", self.signal);
        Some(SessionOutcome::Cancelled {
            signal: self.signal,
        })
    }

    /// The video delivered its first decodable frame.
    pub fn on_video_ready(&mut self) {
        if !self.video_ready {
            log::debug!("Signal {}: video ready", self.signal);
        }
        self.video_ready = true;
        self.video_error = None;
    }

    /// The video could not be opened. Capture continues without a backdrop.
    pub fn on_video_failed(&mut self, error: &MediaError) {
        log::warn!("Signal {}: video unavailable: {}", self.signal, error);
        self.video_error = Some(error.to_string());
    }

    /// Draw one overlay frame and schedule the next, while the session lives.
    pub fn render(&mut self, surface: &mut dyn OverlaySurface, requester: &dyn FrameRequester) -> bool {
        let points = self.points.points();
        let video_ready = self.video_ready;
        self.scheduler
            .frame(requester, || render_overlay(surface, points, video_ready))
    }

    /// A save that was still in flight when the session was cancelled.
    pub fn take_abandoned_save(&mut self) -> Option<(Quad, PendingSave)> {
        self.abandoned.take()
    }

    #[cfg(test)]
    pub fn scheduler(&self) -> &RepaintScheduler {
        &self.scheduler
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.scheduler.stop();
    }
}
