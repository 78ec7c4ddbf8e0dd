// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Area document for file storage and import/export.
//!
//! The document records the overlay size the points were captured in so
//! that consumers can rescale them to a video's native resolution.

use super::area::AreaMap;
use crate::util::geometry::{OVERLAY_HEIGHT, OVERLAY_WIDTH};
use serde::{Deserialize, Serialize};

/// Complete area data for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaDocument {
    pub canvas_width: u32,
    pub canvas_height: u32,
    #[serde(default)]
    pub areas: AreaMap,
}

impl AreaDocument {
    /// Create a document in the standard overlay coordinate space.
    pub fn new(areas: AreaMap) -> Self {
        Self {
            canvas_width: OVERLAY_WIDTH,
            canvas_height: OVERLAY_HEIGHT,
            areas,
        }
    }
}

impl Default for AreaDocument {
    fn default() -> Self {
        Self::new(AreaMap::new())
    }
}
