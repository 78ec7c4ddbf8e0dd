// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for capture, persistence, and media.

use crate::models::signal::SignalId;

/// Errors raised by a capture session operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// Save was requested before exactly four points were collected.
    #[error("Please select exactly 4 points ({count} selected)")]
    Incomplete { count: usize },

    /// The session is saving or has already ended.
    #[error("area for signal {signal} can no longer be edited")]
    Locked { signal: SignalId },
}

/// Errors reported by an area store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backend answered with an error status.
    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response or file could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(String),

    /// The worker delivering the result went away.
    #[error("request was abandoned before completing")]
    Disconnected,
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

/// Errors raised while opening or decoding a video source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("no video source configured")]
    NoSource,

    #[error("failed to read {locator}: {reason}")]
    Unreadable { locator: String, reason: String },

    #[error("failed to decode {locator}: {reason}")]
    Decode { locator: String, reason: String },

    /// Video files need the `video-opencv` feature.
    #[error("video playback is not available for {0}")]
    UnsupportedVideo(String),
}
