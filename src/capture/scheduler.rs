// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Repaint scheduling for the capture overlay.
//!
//! The overlay is redrawn on every display frame while a capture session is
//! live, so a playing video stays current under the points. Each session
//! owns one scheduler; once stopped it never draws or requests a frame again.

/// Something that can be asked for another display frame.
pub trait FrameRequester {
    fn request_frame(&self);
}

impl FrameRequester for egui::Context {
    fn request_frame(&self) {
        self.request_repaint();
    }
}

/// Lifecycle of a [`RepaintScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

/// Per-session repaint loop.
#[derive(Debug)]
pub struct RepaintScheduler {
    state: SchedulerState,
    frames_drawn: u64,
}

impl Default for RepaintScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RepaintScheduler {
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
            frames_drawn: 0,
        }
    }

    /// Begin scheduling frames. A stopped scheduler stays stopped.
    pub fn start(&mut self) {
        if self.state == SchedulerState::Idle {
            self.state = SchedulerState::Running;
        }
    }

    /// Stop scheduling. Idempotent.
    pub fn stop(&mut self) {
        if self.state != SchedulerState::Stopped {
            log::debug!("Repaint loop stopped after {} frames", self.frames_drawn);
        }
        self.state = SchedulerState::Stopped;
    }

    #[cfg(test)]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    #[cfg(test)]
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Run one frame: draw, then ask for the next frame.
    ///
    /// Returns `false` without calling `draw` unless the scheduler is running.
    pub fn frame(&mut self, requester: &dyn FrameRequester, draw: impl FnOnce()) -> bool {
        if !self.is_running() {
            return false;
        }
        draw();
        self.frames_drawn += 1;
        requester.request_frame();
        true
    }
}
