//! Octree spatial partitioning structure
//!
//! Divides the world volume into hierarchical cells for the collision broad
//! phase. A leaf cell subdivides into 8 octants once it holds more objects
//! than the configured threshold, until its level budget reaches zero.
//!
//! The tree is rebuilt from scratch every physics tick. Cells live in a pooled
//! arena that [`Octree::clear`] rewinds instead of freeing, so a rebuild
//! reuses the previous tick's allocations.

use std::collections::HashSet;

use log::trace;

use crate::config::PhysicsConfig;
use crate::debug::draw::OCTREE_COLOR;
use crate::debug::DebugDrawSystem;
use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec3;
use crate::scene::{BoundingBox, Scene};

/// Index of the root cell in the arena
const ROOT: usize = 0;

/// Object stored in the octree with the footprint it was inserted with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeEntry {
    /// Node the entry stands for
    pub node: NodeId,
    /// Footprint snapshot taken at insertion
    pub bounds: BoundingBox,
}

/// Single cell in the octree hierarchy
#[derive(Debug, Clone)]
struct OctreeCell {
    /// World-space bounds of this cell
    bounds: BoundingBox,

    /// Remaining subdivision budget (0 = always a leaf)
    level: i32,

    /// Arena indices of the 8 octants, `None` while this is a leaf
    children: Option<[usize; 8]>,

    /// Objects held directly; always empty once subdivided
    entries: Vec<OctreeEntry>,
}

impl OctreeCell {
    fn reset(&mut self, bounds: BoundingBox, level: i32) {
        self.bounds = bounds;
        self.level = level;
        self.children = None;
        self.entries.clear();
    }
}

/// Octree spatial partitioning structure
#[derive(Debug, Clone)]
pub struct Octree {
    cells: Vec<OctreeCell>,

    /// Number of cells in use; cells past this index are spare
    live: usize,

    max_levels: i32,
    max_objects: usize,
}

impl Octree {
    /// Create an empty octree covering `world_bounds`
    pub fn new(world_bounds: BoundingBox, max_levels: i32, max_objects: usize) -> Self {
        Self {
            cells: vec![OctreeCell {
                bounds: world_bounds,
                level: max_levels,
                children: None,
                entries: Vec::new(),
            }],
            live: 1,
            max_levels,
            max_objects,
        }
    }

    /// Create an empty octree from the physics tunables
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::new(config.world_bounds(), config.octree_max_levels, config.max_objects_per_cell)
    }

    /// Axis-aligned footprint of a node: world position ± half world scale
    pub fn footprint(scene: &Scene, node: NodeId) -> Option<BoundingBox> {
        let position = scene.position(node)?;
        let scale = scene.scale(node)?;
        Some(BoundingBox::from_center_extents(position, scale.abs() * 0.5))
    }

    /// World volume covered by the root cell
    pub fn bounds(&self) -> BoundingBox {
        self.cells[ROOT].bounds
    }

    /// Number of cells currently in the tree
    pub fn cell_count(&self) -> usize {
        self.live
    }

    /// Whether the root cell has subdivided
    pub fn is_subdivided(&self) -> bool {
        self.cells[ROOT].children.is_some()
    }

    /// Insert a node using its current footprint; returns false for an expired handle
    pub fn insert_node(&mut self, scene: &Scene, node: NodeId) -> bool {
        match Self::footprint(scene, node) {
            Some(bounds) => {
                self.insert(OctreeEntry { node, bounds });
                true
            }
            None => false,
        }
    }

    /// Insert an entry into every leaf whose bounds its footprint touches
    ///
    /// An entry straddling a cell boundary is stored in each cell it touches.
    /// Entries outside the root bounds are ignored.
    pub fn insert(&mut self, entry: OctreeEntry) {
        self.insert_into(ROOT, entry);
    }

    fn insert_into(&mut self, index: usize, entry: OctreeEntry) {
        if !self.cells[index].bounds.intersects(&entry.bounds) {
            return;
        }

        if let Some(children) = self.cells[index].children {
            for child in children {
                self.insert_into(child, entry);
            }
            return;
        }

        let cell = &mut self.cells[index];
        cell.entries.push(entry);
        if cell.entries.len() > self.max_objects && cell.level > 0 {
            self.subdivide(index);
        }
    }

    /// Split a leaf into 8 octants and push its entries down
    fn subdivide(&mut self, index: usize) {
        let bounds = self.cells[index].bounds;
        let level = self.cells[index].level;
        let center = bounds.get_center();
        let quarter = bounds.get_size() * 0.25;

        let mut children = [ROOT; 8];
        for (octant, child) in children.iter_mut().enumerate() {
            let sign = |bit: usize| if octant & bit != 0 { 1.0 } else { -1.0 };
            let child_center = center + Vec3::new(quarter.x * sign(1), quarter.y * sign(2), quarter.z * sign(4));
            *child = self.alloc_cell(BoundingBox::from_center_extents(child_center, quarter), level - 1);
        }

        let mut entries = std::mem::take(&mut self.cells[index].entries);
        self.cells[index].children = Some(children);
        trace!("Octree cell at level {} subdivided with {} object(s)", level, entries.len());

        for entry in entries.drain(..) {
            for child in children {
                self.insert_into(child, entry);
            }
        }
        // Hand the emptied buffer back so the cell keeps its capacity
        self.cells[index].entries = entries;
    }

    fn alloc_cell(&mut self, bounds: BoundingBox, level: i32) -> usize {
        let index = self.live;
        self.live += 1;
        match self.cells.get_mut(index) {
            Some(cell) => cell.reset(bounds, level),
            None => self.cells.push(OctreeCell {
                bounds,
                level,
                children: None,
                entries: Vec::new(),
            }),
        }
        index
    }

    /// Nodes whose footprint intersects `area`, each reported once
    ///
    /// Results keep first-seen order from a depth-first walk of the octants.
    pub fn query(&self, area: &BoundingBox) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        self.query_cell(ROOT, area, &mut seen, &mut found);
        found
    }

    fn query_cell(&self, index: usize, area: &BoundingBox, seen: &mut HashSet<NodeId>, found: &mut Vec<NodeId>) {
        let cell = &self.cells[index];
        if cell.level < 0 || !cell.bounds.intersects(area) {
            return;
        }

        match cell.children {
            Some(children) => {
                for child in children {
                    self.query_cell(child, area, seen, found);
                }
            }
            None => {
                for entry in &cell.entries {
                    if entry.bounds.intersects(area) && seen.insert(entry.node) {
                        found.push(entry.node);
                    }
                }
            }
        }
    }

    /// Drop every cell and object, keeping the arena for reuse
    pub fn clear(&mut self) {
        let bounds = self.cells[ROOT].bounds;
        self.cells[ROOT].reset(bounds, self.max_levels);
        self.live = 1;
    }

    /// Outline every occupied leaf cell
    pub fn draw(&self, debug: &mut DebugDrawSystem, duration: f32) {
        for cell in &self.cells[..self.live] {
            if cell.children.is_none() && !cell.entries.is_empty() {
                debug.draw_box(cell.bounds.get_center(), cell.bounds.extents(), OCTREE_COLOR, duration);
            }
        }
    }
}
