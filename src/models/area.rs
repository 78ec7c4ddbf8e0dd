// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Detection area data structures.
//!
//! This module defines points in overlay space, the bounded point set a
//! capture session collects, and the per-signal area map the host keeps.

use super::signal::SignalId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of vertices in a complete detection area.
pub const AREA_VERTICES: usize = 4;

/// An integer pixel position in overlay coordinates.
///
/// Serialized as a two-element array `[x, y]`, which is what the backend
/// stores and returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (i32, i32) {
    fn from(point: Point) -> Self {
        (point.x, point.y)
    }
}

/// A completed detection area, vertices in click order.
pub type Quad = [Point; AREA_VERTICES];

/// Rejected attempt to build a point set from too many points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("an area holds at most 4 points, got {0}")]
pub struct TooManyPoints(pub usize);

/// Ordered vertices of one signal's area, never more than four.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex. Returns `false` and leaves the set untouched when it
    /// is already complete.
    pub fn push(&mut self, point: Point) -> bool {
        if self.is_complete() {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Check whether the set has exactly four vertices.
    pub fn is_complete(&self) -> bool {
        self.points.len() == AREA_VERTICES
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The four vertices, if the set is complete.
    pub fn as_quad(&self) -> Option<Quad> {
        <Quad>::try_from(self.points.as_slice()).ok()
    }
}

impl TryFrom<Vec<Point>> for PointSet {
    type Error = TooManyPoints;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        if points.len() > AREA_VERTICES {
            return Err(TooManyPoints(points.len()));
        }
        Ok(Self { points })
    }
}

impl From<PointSet> for Vec<Point> {
    fn from(set: PointSet) -> Self {
        set.points
    }
}

impl From<Quad> for PointSet {
    fn from(quad: Quad) -> Self {
        Self {
            points: quad.to_vec(),
        }
    }
}

/// Per-signal detection areas, as held by the host across capture sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaMap {
    areas: BTreeMap<SignalId, PointSet>,
}

impl AreaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points stored for a signal; empty when none were captured.
    pub fn get(&self, signal: SignalId) -> PointSet {
        self.areas.get(&signal).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, signal: SignalId, points: PointSet) {
        self.areas.insert(signal, points);
    }

    pub fn clear(&mut self) {
        self.areas.clear();
    }

    /// Number of signals with a complete area.
    pub fn complete_count(&self) -> usize {
        self.areas.values().filter(|p| p.is_complete()).count()
    }
}
