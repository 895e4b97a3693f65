//! Spatial Index Module
//!
//! R-tree over symbol bounds for hit testing and lasso selection.
//! Point queries are O(log n) instead of a scan over every symbol.

use rstar::{AABB, RTree, RTreeObject};
use std::collections::HashMap;

use crate::geometry::{Point, Rect};
use crate::types::SymbolId;

/// A symbol's bounds and center as stored in the tree.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub id: SymbolId,
    pub bounds: Rect,
    pub center: Point,
}

impl SpatialEntry {
    pub fn new(id: SymbolId, bounds: Rect, center: Point) -> Self {
        Self { id, bounds, center }
    }
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bounds.left, self.bounds.top],
            [self.bounds.right(), self.bounds.bottom()],
        )
    }
}

impl PartialEq for SpatialEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
    entries: HashMap<SymbolId, SpatialEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: SpatialEntry) {
        self.remove(entry.id);
        self.tree.insert(entry);
        self.entries.insert(entry.id, entry);
    }

    pub fn remove(&mut self, id: SymbolId) -> bool {
        if let Some(entry) = self.entries.remove(&id) {
            self.tree.remove(&entry);
            true
        } else {
            false
        }
    }

    /// All symbols whose bounds contain `p` (edges included).
    pub fn query_point(&self, p: Point) -> Vec<SymbolId> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([p.x, p.y]))
            .filter(|entry| entry.bounds.contains(p))
            .map(|entry| entry.id)
            .collect()
    }

    /// The most recently created symbol under `p`; newer symbols paint on top.
    pub fn topmost_at(&self, p: Point) -> Option<SymbolId> {
        self.query_point(p).into_iter().max()
    }

    /// Symbols whose center lies strictly inside `rect`.
    ///
    /// A center always lies within its own bounds, so the envelope query
    /// cannot miss a candidate.
    pub fn centers_inside(&self, rect: &Rect) -> Vec<SymbolId> {
        let envelope = AABB::from_corners([rect.left, rect.top], [rect.right(), rect.bottom()]);
        let mut ids: Vec<SymbolId> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| rect.contains_strictly(entry.center))
            .map(|entry| entry.id)
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rebuild<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = SpatialEntry>,
    {
        let entries: Vec<SpatialEntry> = entries.into_iter().collect();
        self.entries = entries.iter().map(|e| (e.id, *e)).collect();
        self.tree = RTree::bulk_load(entries);
    }
}
