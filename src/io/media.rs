// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media loading for the capture overlay (images and videos).
//!
//! This module decodes a signal's video source on a background thread and
//! hands RGBA frames to the UI thread, which turns them into egui textures.
//! Still images (local or over HTTP) are always supported; video files need
//! the `video-opencv` feature.

use crate::error::MediaError;
use std::io::Read;
use std::path::Path;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError};
use std::time::Duration;

/// Frames buffered between the decoder thread and the UI.
const FRAME_BUFFER: usize = 2;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp", "gif"];

/// A decoded RGBA frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Load an image file from disk.
pub fn load_image(path: &Path) -> Result<LoadedImage, MediaError> {
    let bytes = std::fs::read(path).map_err(|e| MediaError::Unreadable {
        locator: path.display().to_string(),
        reason: e.to_string(),
    })?;
    decode_image(&bytes, &path.display().to_string())
}

/// Decode image bytes into RGBA pixels.
pub fn decode_image(bytes: &[u8], locator: &str) -> Result<LoadedImage, MediaError> {
    let image = image::load_from_memory(bytes).map_err(|e| MediaError::Decode {
        locator: locator.to_string(),
        reason: e.to_string(),
    })?;
    let rgba = image.to_rgba8();
    Ok(LoadedImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

fn is_remote(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}

fn is_still_image(locator: &str) -> bool {
    let path = locator.split(['?', '#']).next().unwrap_or(locator);
    Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn fetch_remote_image(url: &str, timeout: Duration) -> Result<LoadedImage, MediaError> {
    let unreadable = |reason: String| MediaError::Unreadable {
        locator: url.to_string(),
        reason,
    };
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    let response = agent.get(url).call().map_err(|e| unreadable(e.to_string()))?;
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| unreadable(e.to_string()))?;
    decode_image(&bytes, url)
}

/// Update delivered by [`FrameSource::poll`].
#[derive(Debug)]
pub enum MediaUpdate {
    /// The newest decoded frame.
    Frame(LoadedImage),
    /// The source could not be opened or decoded.
    Failed(MediaError),
}

/// Background decoder for one signal's video source.
///
/// Dropping the source disconnects the channel, which stops a streaming
/// decoder at its next frame.
pub struct FrameSource {
    locator: String,
    receiver: Option<Receiver<Result<LoadedImage, MediaError>>>,
    frames_seen: u64,
}

impl FrameSource {
    /// Start decoding `locator` in the background. Remote fetches give up
    /// after `timeout`.
    pub fn open(locator: &str, timeout: Duration) -> Self {
        let (sender, receiver) = sync_channel(FRAME_BUFFER);
        let owned = locator.trim().to_string();

        let thread_locator = owned.clone();
        std::thread::spawn(move || {
            if let Err(e) = decode_source(&thread_locator, timeout, &sender) {
                let _ = sender.send(Err(e));
            }
        });

        Self {
            locator: owned,
            receiver: Some(receiver),
            frames_seen: 0,
        }
    }

    /// Drain decoded frames, keeping only the newest.
    pub fn poll(&mut self) -> Option<MediaUpdate> {
        let receiver = self.receiver.as_ref()?;
        let mut latest = None;

        loop {
            match receiver.try_recv() {
                Ok(Ok(frame)) => {
                    self.frames_seen += 1;
                    latest = Some(frame);
                }
                Ok(Err(e)) => {
                    self.receiver = None;
                    return Some(MediaUpdate::Failed(e));
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.receiver = None;
                    if self.frames_seen == 0 {
                        return Some(MediaUpdate::Failed(MediaError::Decode {
                            locator: self.locator.clone(),
                            reason: "decoder stopped without producing a frame".to_string(),
                        }));
                    }
                    break;
                }
            }
        }

        latest.map(MediaUpdate::Frame)
    }
}

fn decode_source(
    locator: &str,
    timeout: Duration,
    sender: &SyncSender<Result<LoadedImage, MediaError>>,
) -> Result<(), MediaError> {
    if locator.is_empty() {
        return Err(MediaError::NoSource);
    }

    if is_still_image(locator) {
        let image = if is_remote(locator) {
            fetch_remote_image(locator, timeout)?
        } else {
            load_image(Path::new(locator))?
        };
        log::info!("Loaded frame: {} ({}x{})", locator, image.width, image.height);
        let _ = sender.send(Ok(image));
        return Ok(());
    }

    stream_video(locator, sender)
}

#[cfg(feature = "video-opencv")]
fn stream_video(
    locator: &str,
    sender: &SyncSender<Result<LoadedImage, MediaError>>,
) -> Result<(), MediaError> {
    use opencv::core::Mat;
    use opencv::prelude::*;
    use opencv::{imgproc, videoio};

    let decode_err = |e: opencv::Error| MediaError::Decode {
        locator: locator.to_string(),
        reason: e.to_string(),
    };

    let mut capture = videoio::VideoCapture::from_file(locator, videoio::CAP_ANY).map_err(decode_err)?;
    if !capture.is_opened().map_err(decode_err)? {
        return Err(MediaError::Unreadable {
            locator: locator.to_string(),
            reason: "could not open video".to_string(),
        });
    }

    let fps = capture.get(videoio::CAP_PROP_FPS).unwrap_or(0.0);
    let frame_delay = if fps > 0.0 {
        Duration::from_secs_f64(1.0 / fps)
    } else {
        Duration::from_millis(40)
    };
    log::info!("Opened video: {} ({:.1} fps)", locator, fps);

    let mut bgr = Mat::default();
    let mut rgba = Mat::default();
    // Plays once and leaves the last frame on screen, like an unlooped player.
    while capture.read(&mut bgr).map_err(decode_err)? && bgr.rows() > 0 {
        imgproc::cvt_color(&bgr, &mut rgba, imgproc::COLOR_BGR2RGBA, 0).map_err(decode_err)?;
        let frame = LoadedImage {
            width: rgba.cols() as u32,
            height: rgba.rows() as u32,
            pixels: rgba.data_bytes().map_err(decode_err)?.to_vec(),
        };
        if sender.send(Ok(frame)).is_err() {
            log::debug!("Stopped decoding {}", locator);
            break;
        }
        std::thread::sleep(frame_delay);
    }
    Ok(())
}

#[cfg(not(feature = "video-opencv"))]
fn stream_video(
    locator: &str,
    _sender: &SyncSender<Result<LoadedImage, MediaError>>,
) -> Result<(), MediaError> {
    Err(MediaError::UnsupportedVideo(locator.to_string()))
}
