//! Quadtree broad phase
//!
//! Stores `(BodyId, Rect)` entries, never the bodies themselves. An entry
//! lives at the deepest node whose quadrant fully contains it; entries that
//! straddle a quadrant boundary stay at the parent. Nothing is duplicated
//! across siblings.
//!
//! Two maintenance strategies are supported:
//! - `update`: incremental, relocating only moving bodies that left their node
//! - `rebuild`: clear and re-insert everything each frame
//!
//! The tree remembers the bounds each entry was filed under, so finding an
//! entry again only walks the nodes along that one descent.

use std::collections::HashMap;

use glam::Vec2;

use super::body::{BodyId, Collider};
use crate::error::QuadtreeError;
use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    id: BodyId,
    bounds: Rect,
}

/// Region quadtree over body bounds
#[derive(Debug, Clone)]
pub struct Quadtree {
    root: QuadNode,
    /// Bounds each stored id was last filed under
    filed: HashMap<BodyId, Rect>,
}

/// One node of the tree; the root is level 0
#[derive(Debug, Clone)]
pub struct QuadNode {
    bounds: Rect,
    level: usize,
    capacity: usize,
    max_levels: usize,
    entries: Vec<Entry>,
    children: Option<Box<[QuadNode; 4]>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relocation {
    Kept,
    Taken,
}

impl QuadNode {
    fn new(bounds: Rect, level: usize, capacity: usize, max_levels: usize) -> Self {
        Self {
            bounds,
            level,
            capacity,
            max_levels,
            entries: Vec::new(),
            children: None,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Entries held directly at this node (not in children)
    pub fn local_len(&self) -> usize {
        self.entries.len()
    }

    pub fn children(&self) -> Option<&[QuadNode; 4]> {
        self.children.as_deref()
    }

    /// True iff both corners of `bounds` lie inside this node
    #[inline]
    pub fn contains(&self, bounds: &Rect) -> bool {
        self.bounds.contains_rect(bounds)
    }

    /// Total entries in this subtree
    pub fn len(&self) -> usize {
        self.entries.len()
            + self
                .children
                .as_ref()
                .map_or(0, |c| c.iter().map(QuadNode::len).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nodes in this subtree, including itself
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |c| c.iter().map(QuadNode::node_count).sum())
    }

    /// Deepest level reached below (and including) this node
    pub fn depth(&self) -> usize {
        self.children
            .as_ref()
            .map_or(self.level, |c| c.iter().map(QuadNode::depth).max().unwrap_or(self.level))
    }

    fn insert_entry(&mut self, entry: Entry) {
        if let Some(children) = self.children.as_deref_mut() {
            if let Some(child) = children.iter_mut().find(|c| c.contains(&entry.bounds)) {
                child.insert_entry(entry);
                return;
            }
        }

        self.entries.push(entry);

        if self.children.is_none()
            && self.entries.len() > self.capacity
            && self.level < self.max_levels
        {
            self.subdivide();
        }
    }

    /// Split into four quadrants and push down every entry one of them fully
    /// contains
    fn subdivide(&mut self) {
        let [q0, q1, q2, q3] = self.bounds.quadrants();
        let (level, capacity, max_levels) = (self.level + 1, self.capacity, self.max_levels);
        let make = |q| QuadNode::new(q, level, capacity, max_levels);
        self.children = Some(Box::new([make(q0), make(q1), make(q2), make(q3)]));

        log::debug!(
            "Quadtree subdivided at level {} ({} entries)",
            self.level,
            self.entries.len()
        );

        let held = std::mem::take(&mut self.entries);
        for entry in held {
            self.insert_entry(entry);
        }
    }

    fn query_into(&self, region: &Rect, out: &mut Vec<BodyId>) {
        if !self.bounds.intersects(region) {
            return;
        }
        out.extend(
            self.entries
                .iter()
                .filter(|e| e.bounds.intersects(region))
                .map(|e| e.id),
        );
        if let Some(children) = self.children.as_deref() {
            for child in children {
                child.query_into(region, out);
            }
        }
    }

    /// Children an entry filed under `filed` may have been pushed into
    fn descent<'a>(&'a mut self, filed: &'a Rect) -> impl Iterator<Item = &'a mut QuadNode> + 'a {
        self.children
            .as_deref_mut()
            .into_iter()
            .flat_map(|c| c.iter_mut())
            .filter(move |child| child.contains(filed))
    }

    /// Take an entry out, looking only along the descent of `filed`
    fn remove_entry(&mut self, id: BodyId, filed: &Rect) -> Option<Entry> {
        if let Some(pos) = self.entries.iter().position(|e| e.id == id) {
            return Some(self.entries.swap_remove(pos));
        }
        self.descent(filed).find_map(|child| child.remove_entry(id, filed))
    }

    /// Whether this node is still the right home for `bounds`: it contains
    /// them (the root only needs to touch them) and no child fully does.
    fn still_fits(&self, bounds: &Rect) -> bool {
        let here = if self.level == 0 {
            self.bounds.intersects(bounds)
        } else {
            self.contains(bounds)
        };
        let deeper = self
            .children
            .as_deref()
            .is_some_and(|c| c.iter().any(|child| child.contains(bounds)));
        here && !deeper
    }

    /// Refresh an entry in place if it still fits its node, otherwise take it
    /// out. `None` when the id is not found along the descent of `filed`.
    fn refresh_or_take(&mut self, id: BodyId, filed: &Rect, bounds: Rect) -> Option<Relocation> {
        if let Some(pos) = self.entries.iter().position(|e| e.id == id) {
            if self.still_fits(&bounds) {
                self.entries[pos].bounds = bounds;
                return Some(Relocation::Kept);
            }
            self.entries.swap_remove(pos);
            return Some(Relocation::Taken);
        }
        self.descent(filed)
            .find_map(|child| child.refresh_or_take(id, filed, bounds))
    }
}

impl Quadtree {
    pub fn new(bounds: Rect, capacity: usize, max_levels: usize) -> Self {
        Self {
            root: QuadNode::new(bounds, 0, capacity.max(1), max_levels),
            filed: HashMap::new(),
        }
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.root.bounds
    }

    /// The level-0 node
    pub fn root(&self) -> &QuadNode {
        &self.root
    }

    /// Entries held directly at the root
    pub fn local_len(&self) -> usize {
        self.root.local_len()
    }

    pub fn children(&self) -> Option<&[QuadNode; 4]> {
        self.root.children()
    }

    #[inline]
    pub fn contains(&self, bounds: &Rect) -> bool {
        self.root.contains(bounds)
    }

    /// Total stored entries
    pub fn len(&self) -> usize {
        self.filed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filed.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Add a body's bounds, replacing any entry it already has.
    ///
    /// Bounds must be finite with non-negative size and must touch the root
    /// region. Rejections are logged and reported, never fatal.
    pub fn insert(&mut self, id: BodyId, bounds: Rect) -> Result<(), QuadtreeError> {
        if !bounds.is_valid() {
            log::warn!("Quadtree rejected {id}: invalid bounds {bounds:?}");
            return Err(QuadtreeError::InvalidBounds { id: id.0 });
        }
        if !self.root.bounds.intersects(&bounds) {
            log::warn!("Quadtree rejected {id}: outside root bounds");
            return Err(QuadtreeError::OutOfBounds { id: id.0 });
        }
        if let Some(old) = self.filed.insert(id, bounds) {
            let _ = self.root.remove_entry(id, &old);
        }
        self.root.insert_entry(Entry { id, bounds });
        Ok(())
    }

    /// Ids of every entry whose bounds intersect `region`
    pub fn query(&self, region: &Rect) -> Vec<BodyId> {
        let mut out = Vec::new();
        if !region.is_valid() {
            log::warn!("Quadtree query with invalid region {region:?}");
            return out;
        }
        self.root.query_into(region, &mut out);
        out
    }

    /// Ids of every entry whose bounds contain `point`
    pub fn query_point(&self, point: Vec2) -> Vec<BodyId> {
        self.query(&Rect::point(point))
    }

    /// Remove a body's entry, returning its cached bounds
    pub fn remove(&mut self, id: BodyId) -> Result<Rect, QuadtreeError> {
        let filed = self.filed.remove(&id).ok_or(QuadtreeError::NotFound { id: id.0 })?;
        self.root
            .remove_entry(id, &filed)
            .map(|e| e.bounds)
            .ok_or(QuadtreeError::NotFound { id: id.0 })
    }

    /// Bring one body's entry up to date with its current bounds, moving it
    /// only when its node no longer fits. Unknown ids are inserted. Returns
    /// whether the entry was (re)inserted.
    pub fn relocate(&mut self, id: BodyId, bounds: Rect) -> Result<bool, QuadtreeError> {
        if !bounds.is_valid() {
            let _ = self.remove(id);
            log::warn!("Quadtree dropped {id}: inconsistent bounds");
            return Err(QuadtreeError::InvalidBounds { id: id.0 });
        }
        let outcome = match self.filed.get(&id).copied() {
            Some(filed) => self.root.refresh_or_take(id, &filed, bounds),
            None => None,
        };
        match outcome {
            Some(Relocation::Kept) => {
                self.filed.insert(id, bounds);
                Ok(false)
            }
            Some(Relocation::Taken) | None => {
                self.filed.remove(&id);
                self.insert(id, bounds).map(|()| true)
            }
        }
    }

    /// Incremental maintenance: every moving body whose node no longer fits
    /// its current bounds is removed and re-inserted from the root. Returns
    /// the number of relocated bodies.
    pub fn update<C: Collider>(&mut self, bodies: &[C]) -> usize {
        let mut relocated = 0;

        for body in bodies.iter().filter(|b| b.is_moving()) {
            let id = body.id();
            let Some(bounds) = body.bounds() else {
                log::warn!("Quadtree update dropping {id}: no bounds");
                let _ = self.remove(id);
                continue;
            };
            if let Ok(true) = self.relocate(id, bounds) {
                relocated += 1;
            }
        }

        relocated
    }

    /// Drop every entry and child node
    pub fn clear(&mut self) {
        self.root.entries.clear();
        self.root.children = None;
        self.filed.clear();
    }

    /// Full rebuild from the arena
    pub fn rebuild<C: Collider>(&mut self, bodies: &[C]) {
        self.clear();
        for body in bodies {
            if let Some(bounds) = body.bounds() {
                // Rejections are already logged
                let _ = self.insert(body.id(), bounds);
            }
        }
    }
}
