//=========================================================================
// Lifecycle Queue
//=========================================================================
//
// Queue of pending create and destroy events of a room's objects.
//
// Rooms queue lifecycle events here when objects are added or removed.
// The game fires them once the running event returns, so adding or
// removing objects never re-enters the room while it is borrowed.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::RoomKey;
use crate::core::object::{Object, ObjectId};

//=== Lifecycle Event =====================================================

/// A pending object lifecycle event.
pub(crate) enum Lifecycle<R: RoomKey> {
    /// The object was added; its create event has not fired yet.
    Create(ObjectId),

    /// The object was removed from the running room. It is kept here
    /// until its destroy event has fired.
    Destroy(Object<R>),
}

//=== Lifecycle Queue =====================================================

pub(crate) struct LifecycleQueue<R: RoomKey> {
    queue: Vec<Lifecycle<R>>,
}

impl<R: RoomKey> LifecycleQueue<R> {
    pub(crate) fn new() -> Self {
        Self { queue: Vec::new() }
    }

    pub(crate) fn push(&mut self, event: Lifecycle<R>) {
        self.queue.push(event);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether a create event for `id` is still waiting.
    pub(crate) fn has_pending_create(&self, id: ObjectId) -> bool {
        self.queue
            .iter()
            .any(|e| matches!(e, Lifecycle::Create(c) if *c == id))
    }

    /// Drops a waiting create event. Returns whether one was queued.
    pub(crate) fn cancel_create(&mut self, id: ObjectId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|e| !matches!(e, Lifecycle::Create(c) if *c == id));
        self.queue.len() != before
    }

    /// Takes all events from the queue, leaving it empty.
    pub(crate) fn take(&mut self) -> Vec<Lifecycle<R>> {
        std::mem::take(&mut self.queue)
    }
}

impl<R: RoomKey> Default for LifecycleQueue<R> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::ObjectState;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestRoom {
        Main,
    }

    impl RoomKey for TestRoom {}

    #[test]
    fn queue_keeps_push_order() {
        let mut queue: LifecycleQueue<TestRoom> = LifecycleQueue::new();
        let a = ObjectState::new(0.0, 0.0).id();
        let b = Object::new(ObjectState::new(0.0, 0.0), ());
        let b_id = b.id();

        queue.push(Lifecycle::Create(a));
        queue.push(Lifecycle::Destroy(b));
        assert_eq!(queue.len(), 2);

        let events = queue.take();
        assert!(queue.is_empty());
        assert!(matches!(events[0], Lifecycle::Create(id) if id == a));
        assert!(matches!(&events[1], Lifecycle::Destroy(obj) if obj.id() == b_id));
    }

    #[test]
    fn create_can_be_cancelled() {
        let mut queue: LifecycleQueue<TestRoom> = LifecycleQueue::new();
        let a = ObjectState::new(0.0, 0.0).id();
        queue.push(Lifecycle::Create(a));

        assert!(queue.has_pending_create(a));
        assert!(queue.cancel_create(a));
        assert!(!queue.cancel_create(a));
        assert!(queue.is_empty());
    }
}
