//=========================================================================
// Room Manager
//=========================================================================
//
// Owns every registered room and remembers which one the game starts
// in.
//
// Rooms are stored in a HashMap by key. A room keeps its objects and
// state while another room runs, so switching back resumes it where it
// was left.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::Room;

//=== Room Key Trait ======================================================

/// Marker trait for room identifiers.
///
/// Room keys uniquely identify rooms in the game. Typically implemented
/// by game-specific enums.
pub trait RoomKey: Clone + Copy + Eq + Hash + Debug + Send + 'static {}

//=== Room Manager ========================================================

pub(crate) struct RoomManager<R: RoomKey> {
    rooms: HashMap<R, Room<R>>,
    start: Option<R>,
}

impl<R: RoomKey> RoomManager<R> {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            start: None,
        }
    }

    //--- Registration -----------------------------------------------------

    pub(crate) fn register_room(&mut self, key: R, room: Room<R>) {
        if self.rooms.insert(key, room).is_some() {
            warn!("Room {:?} was already registered and has been replaced", key);
        }
    }

    /// Registers a room and makes it the one the game starts in.
    pub(crate) fn register_start_room(&mut self, key: R, room: Room<R>) {
        self.register_room(key, room);
        if let Some(previous) = self.start.replace(key) {
            if previous != key {
                warn!("Start room changed from {:?} to {:?}", previous, key);
            }
        }
        debug!("Registered room {:?} as start room", key);
    }

    pub(crate) fn start_key(&self) -> Option<R> {
        self.start
    }

    //--- Access -----------------------------------------------------------

    pub(crate) fn contains(&self, key: R) -> bool {
        self.rooms.contains_key(&key)
    }

    pub(crate) fn get(&self, key: R) -> Option<&Room<R>> {
        self.rooms.get(&key)
    }

    pub(crate) fn get_mut(&mut self, key: R) -> Option<&mut Room<R>> {
        self.rooms.get_mut(&key)
    }

    pub(crate) fn len(&self) -> usize {
        self.rooms.len()
    }
}

impl<R: RoomKey> Default for RoomManager<R> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
