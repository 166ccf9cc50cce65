//! Contract between tracked objects and the indexes tracking them.
//!
//! Every spatial object embeds a [`SpatialBody`] which keeps its axis-aligned
//! bounding box and notifies registered listeners, synchronously and with the
//! old value, whenever the box is moved or resized.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
    sync::atomic::{AtomicU64, Ordering},
};

use glam::Vec2;

use crate::{category::Category, rect::Rect};

/// Shared handle of a tracked object. Indexes keep these as associative
/// references, they never decide about the object lifetime.
pub type SpatialRef = Rc<dyn Spatial>;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a spatial object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpatialId(u64);

impl SpatialId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An object with a position, size and move / resize notifications.
pub trait Spatial {
    fn body(&self) -> &SpatialBody;

    /// Most specific category of the object.
    fn category(&self) -> Category;

    fn id(&self) -> SpatialId {
        self.body().id()
    }

    /// Top-left corner of the bounding box.
    fn position(&self) -> Vec2 {
        self.body().position()
    }

    fn size(&self) -> Vec2 {
        self.body().size()
    }

    /// Bottom-right corner of the bounding box, i.e. `position + size`.
    fn max(&self) -> Vec2 {
        self.body().max()
    }

    fn bounds(&self) -> Rect {
        self.body().bounds()
    }
}

/// Receiver of move and resize notifications.
pub trait SpatialListener {
    /// Called right after the position of a spatial object changed.
    fn moved(&self, id: SpatialId, old_position: Vec2);

    /// Called right after the size of a spatial object changed.
    fn resized(&self, id: SpatialId, old_size: Vec2);
}

/// Registration token returned by [`SpatialBody::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription(u32);

/// Bounding box state and listener registry of a spatial object.
pub struct SpatialBody {
    id: SpatialId,
    position: Cell<Vec2>,
    size: Cell<Vec2>,
    next_subscription: Cell<u32>,
    listeners: RefCell<Vec<(Subscription, Weak<dyn SpatialListener>)>>,
}

impl SpatialBody {
    /// # Panics
    ///
    /// Panics in debug builds if any component of `size` is negative.
    pub fn new(position: Vec2, size: Vec2) -> Self {
        debug_assert!(size.cmpge(Vec2::ZERO).all(), "Negative size {size}.");
        Self {
            id: SpatialId::next(),
            position: Cell::new(position),
            size: Cell::new(size),
            next_subscription: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn id(&self) -> SpatialId {
        self.id
    }

    pub fn position(&self) -> Vec2 {
        self.position.get()
    }

    pub fn size(&self) -> Vec2 {
        self.size.get()
    }

    pub fn max(&self) -> Vec2 {
        self.position() + self.size()
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_position_size(self.position(), self.size())
    }

    /// Moves the object and notifies all listeners with the old position.
    pub fn set_position(&self, position: Vec2) {
        let old = self.position.replace(position);
        for listener in self.live_listeners() {
            listener.moved(self.id, old);
        }
    }

    pub fn translate(&self, delta: Vec2) {
        self.set_position(self.position() + delta);
    }

    /// Resizes the object and notifies all listeners with the old size.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if any component of `size` is negative.
    pub fn set_size(&self, size: Vec2) {
        debug_assert!(size.cmpge(Vec2::ZERO).all(), "Negative size {size}.");
        let old = self.size.replace(size);
        for listener in self.live_listeners() {
            listener.resized(self.id, old);
        }
    }

    /// Registers a listener. The body keeps only a weak reference, a dropped
    /// listener is silently forgotten.
    pub fn subscribe(&self, listener: Weak<dyn SpatialListener>) -> Subscription {
        let subscription = Subscription(self.next_subscription.get());
        self.next_subscription.set(subscription.0.wrapping_add(1));
        self.listeners.borrow_mut().push((subscription, listener));
        subscription
    }

    /// Deregisters a listener. Returns false if the subscription was not
    /// active.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let len = listeners.len();
        listeners.retain(|(other, _)| *other != subscription);
        listeners.len() != len
    }

    pub fn num_listeners(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Returns strong references to live listeners and prunes dead ones.
    ///
    /// The registry is not borrowed during the notification so listeners
    /// may (un)subscribe from within the callback.
    fn live_listeners(&self) -> Vec<Rc<dyn SpatialListener>> {
        let mut listeners = self.listeners.borrow_mut();
        listeners.retain(|(_, listener)| listener.strong_count() > 0);
        listeners
            .iter()
            .filter_map(|(_, listener)| listener.upgrade())
            .collect()
    }
}

impl fmt::Debug for SpatialBody {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SpatialBody")
            .field("id", &self.id)
            .field("position", &self.position())
            .field("size", &self.size())
            .finish()
    }
}
