//=========================================================================
// Object Areas
//=========================================================================
//
// Spatial grid over a room used to narrow collision and draw queries.
//
// Architecture:
//   cells: Vec<BTreeSet<ObjectId>>   cols × rows grid, row-major
//   void:  BTreeSet<ObjectId>        everything reaching outside the grid
//   membership: ObjectId → slots     where each object is registered
//
// Sets are ordered by id, so query results come out in creation order.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{BTreeSet, HashMap};

//=== Internal Dependencies ===============================================

use crate::core::object::ObjectId;

//=== Slot ================================================================

/// A grid cell index, or `None` for the void area.
type Slot = Option<usize>;

//=== ObjectAreas =========================================================

#[derive(Debug, Clone)]
pub(crate) struct ObjectAreas {
    area_width: f64,
    area_height: f64,
    cols: usize,
    rows: usize,
    cells: Vec<BTreeSet<ObjectId>>,
    void: BTreeSet<ObjectId>,
    membership: HashMap<ObjectId, Vec<Slot>>,
}

impl ObjectAreas {
    /// An empty grid of `area_width × area_height` cells covering the
    /// room.
    pub(crate) fn new(room_width: f64, room_height: f64, area_width: f64, area_height: f64) -> Self {
        let area_width = area_width.max(1.0);
        let area_height = area_height.max(1.0);
        let cols = (room_width.max(0.0) / area_width).ceil() as usize;
        let rows = (room_height.max(0.0) / area_height).ceil() as usize;
        Self {
            area_width,
            area_height,
            cols,
            rows,
            cells: vec![BTreeSet::new(); cols * rows],
            void: BTreeSet::new(),
            membership: HashMap::new(),
        }
    }

    pub(crate) fn grid_size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Slots touched by a rectangle. Whatever reaches outside the grid
    /// adds the void slot.
    fn slots(&self, x: f64, y: f64, width: f64, height: f64) -> Vec<Slot> {
        let mut xis = (x / self.area_width).floor() as i64;
        let mut yis = (y / self.area_height).floor() as i64;
        let mut xie = ((x + width) / self.area_width).ceil() as i64;
        let mut yie = ((y + height) / self.area_height).ceil() as i64;
        let (cols, rows) = (self.cols as i64, self.rows as i64);

        let inside = !self.cells.is_empty() && xis < cols && yis < rows && xie > 0 && yie > 0;
        if !inside {
            return vec![None];
        }

        let mut slots = Vec::new();
        let mut use_void = false;
        if xis < 0 {
            xis = 0;
            use_void = true;
        }
        if yis < 0 {
            yis = 0;
            use_void = true;
        }
        if xie > cols {
            xie = cols;
            use_void = true;
        }
        if yie > rows {
            yie = rows;
            use_void = true;
        }
        if use_void {
            slots.push(None);
        }
        for row in yis..yie {
            for col in xis..xie {
                slots.push(Some((row * cols + col) as usize));
            }
        }
        slots
    }

    fn slot_mut(&mut self, slot: Slot) -> Option<&mut BTreeSet<ObjectId>> {
        match slot {
            Some(i) => self.cells.get_mut(i),
            None => Some(&mut self.void),
        }
    }

    fn slot(&self, slot: Slot) -> Option<&BTreeSet<ObjectId>> {
        match slot {
            Some(i) => self.cells.get(i),
            None => Some(&self.void),
        }
    }

    /// Re-registers an object for the rectangle it now covers.
    pub(crate) fn update(&mut self, id: ObjectId, rect: (f64, f64, f64, f64)) {
        let (x, y, w, h) = rect;
        let slots = self.slots(x, y, w, h);
        if self.membership.get(&id) == Some(&slots) {
            return;
        }
        self.remove(id);
        for &slot in &slots {
            if let Some(set) = self.slot_mut(slot) {
                set.insert(id);
            }
        }
        self.membership.insert(id, slots);
    }

    pub(crate) fn remove(&mut self, id: ObjectId) {
        if let Some(slots) = self.membership.remove(&id) {
            for slot in slots {
                if let Some(set) = self.slot_mut(slot) {
                    set.remove(&id);
                }
            }
        }
    }

    /// Objects registered in any area a rectangle touches.
    pub(crate) fn query(&self, x: f64, y: f64, width: f64, height: f64) -> BTreeSet<ObjectId> {
        let mut found = BTreeSet::new();
        for slot in self.slots(x, y, width, height) {
            if let Some(set) = self.slot(slot) {
                found.extend(set.iter().copied());
            }
        }
        found
    }

    /// Objects sharing at least one area with `id` (including `id`).
    pub(crate) fn neighbours(&self, id: ObjectId) -> BTreeSet<ObjectId> {
        let mut found = BTreeSet::new();
        if let Some(slots) = self.membership.get(&id) {
            for &slot in slots {
                if let Some(set) = self.slot(slot) {
                    found.extend(set.iter().copied());
                }
            }
        }
        found
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
