//! Named-instance registry: one live instance per (kind, name).
//!
//! Lookups of existing instances take a shared read lock only. Construction
//! runs under a single reentrant lock with the existence check repeated after
//! acquiring it, so concurrent requests for the same name construct once.
//! The lock is reentrant because constructors and release callbacks may call
//! back into the registry on the same thread.
//!
//! The registry map owns every instance until [`Registry::clear`]; callers get
//! [`Handle`]s whose lifetime is recorded in the [`CleanupList`].

mod tracker;

pub use tracker::{CleanupList, Tracker};

use crate::Error;
use crate::internal;
use crate::level::{self, Level, LevelSpec};
use parking_lot::{ReentrantMutex, RwLock};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Instance kinds kept in separate namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Logger,
    StreamSink,
    FileSink,
    StdErrSink,
}

impl Kind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Logger => "logger",
            Self::StreamSink => "stream-sink",
            Self::FileSink => "file-sink",
            Self::StdErrSink => "stderr-sink",
        }
    }

    #[must_use]
    pub const fn all() -> [Self; 4] {
        [
            Self::Logger,
            Self::StreamSink,
            Self::FileSink,
            Self::StdErrSink,
        ]
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Types the registry can hold. `KIND` selects the namespace.
pub trait Registered: Send + Sync + 'static {
    const KIND: Kind;
}

/// Process-unique identity of a constructed instance.
///
/// Never reused, so an instance created after `clear` is distinguishable from
/// every earlier one with the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Slot {
    id: InstanceId,
    instance: Arc<dyn Any + Send + Sync>,
    tracker: Weak<Tracker>,
}

pub(crate) struct Shared {
    /// Guards all mutation of `slots` and of the cleanup list itself.
    lock: ReentrantMutex<RefCell<CleanupList>>,
    /// Written only while `lock` is held; read freely on the fast path.
    slots: RwLock<HashMap<Kind, HashMap<String, Slot>>>,
    next_serial: AtomicU64,
}

impl Default for Shared {
    fn default() -> Self {
        Self {
            lock: ReentrantMutex::new(RefCell::new(CleanupList::default())),
            slots: RwLock::new(HashMap::new()),
            next_serial: AtomicU64::new(1),
        }
    }
}

impl Shared {
    fn new_tracker(
        self: &Arc<Self>,
        cleanup: &RefCell<CleanupList>,
        kind: Kind,
        name: &str,
    ) -> Arc<Tracker> {
        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::downgrade(self);
        let tracker = Tracker::new(serial, move |serial| {
            if let Some(shared) = registry.upgrade() {
                shared.untrack(serial);
            }
        });
        cleanup.borrow_mut().push(kind, name, &tracker);
        tracker
    }

    /// Release callback target. May run on any thread, including one that
    /// already holds the lock.
    fn untrack(&self, serial: u64) {
        let guard = self.lock.lock();
        guard.borrow_mut().remove(serial);
    }

    /// Registry-side lookup that does not count as an external owner.
    pub(crate) fn instance<T: Registered>(&self, name: &str) -> Option<Arc<T>> {
        let instance = {
            let slots = self.slots.read();
            Arc::clone(&slots.get(&T::KIND)?.get(name)?.instance)
        };
        instance.downcast::<T>().ok()
    }
}

fn downcast<T: Registered>(
    instance: &Arc<dyn Any + Send + Sync>,
    name: &str,
) -> Result<Arc<T>, Error> {
    Arc::clone(instance)
        .downcast::<T>()
        .map_err(|_| Error::KindMismatch {
            kind: T::KIND,
            name: name.to_string(),
        })
}

/// Injectable registry. Clones share the same state.
#[derive(Clone, Default)]
pub struct Registry {
    shared: Arc<Shared>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn downgrade(&self) -> Weak<Shared> {
        Arc::downgrade(&self.shared)
    }

    /// Returns the instance registered under `name`, constructing it first if needed.
    ///
    /// `construct` runs at most once per (kind, name) until `clear`, and receives
    /// the normalized level. It runs under the registry lock, so it may itself
    /// use this registry.
    ///
    /// # Errors
    /// `InvalidLevel` if `level` does not normalize (checked on every call),
    /// any error from `construct` (nothing is registered in that case), and
    /// `KindMismatch` if the name is held by a different type of the same kind.
    pub fn get_or_create<T, F>(
        &self,
        name: &str,
        level: impl Into<LevelSpec>,
        construct: F,
    ) -> Result<Handle<T>, Error>
    where
        T: Registered,
        F: FnOnce(&str, Level) -> Result<T, Error>,
    {
        let level = level::normalize(level)?;

        if let Some(handle) = self.lookup::<T>(name)? {
            return Ok(handle);
        }

        let guard = self.shared.lock.lock();
        if let Some(handle) = self.attach_locked::<T>(&guard, name)? {
            return Ok(handle);
        }

        let instance = Arc::new(construct(name, level)?);
        let id = InstanceId::next();
        let tracker = self.shared.new_tracker(&guard, T::KIND, name);
        let erased: Arc<dyn Any + Send + Sync> = Arc::<T>::clone(&instance);
        self.shared
            .slots
            .write()
            .entry(T::KIND)
            .or_default()
            .insert(
                name.to_string(),
                Slot {
                    id,
                    instance: erased,
                    tracker: Arc::downgrade(&tracker),
                },
            );
        drop(guard);

        internal::debug(
            "REGISTRY",
            &format!("Created {} '{name}' {id} at {level}", T::KIND),
        );
        Ok(Handle {
            instance,
            id,
            tracker,
        })
    }

    /// Looks up an existing instance without constructing one.
    ///
    /// # Errors
    /// `KindMismatch` if the name is held by a different type of the same kind.
    pub fn get<T: Registered>(&self, name: &str) -> Result<Option<Handle<T>>, Error> {
        if let Some(handle) = self.lookup::<T>(name)? {
            return Ok(Some(handle));
        }
        let guard = self.shared.lock.lock();
        self.attach_locked::<T>(&guard, name)
    }

    /// Fast path: read lock only, succeeds when the instance already has live handles.
    fn lookup<T: Registered>(&self, name: &str) -> Result<Option<Handle<T>>, Error> {
        // Trackers must not drop while the read guard is held, since their
        // release callback takes the registry lock.
        let found = {
            let slots = self.shared.slots.read();
            slots.get(&T::KIND).and_then(|m| m.get(name)).map(|slot| {
                (
                    slot.id,
                    Arc::clone(&slot.instance),
                    slot.tracker.upgrade(),
                )
            })
        };

        let Some((id, instance, Some(tracker))) = found else {
            return Ok(None);
        };
        let instance = downcast::<T>(&instance, name)?;
        Ok(Some(Handle {
            instance,
            id,
            tracker,
        }))
    }

    /// Slow path under the lock: re-check, and re-track an instance whose
    /// external handles were all dropped.
    fn attach_locked<T: Registered>(
        &self,
        cleanup: &RefCell<CleanupList>,
        name: &str,
    ) -> Result<Option<Handle<T>>, Error> {
        let mut slots = self.shared.slots.write();
        let Some(slot) = slots.get_mut(&T::KIND).and_then(|m| m.get_mut(name)) else {
            return Ok(None);
        };
        let instance = downcast::<T>(&slot.instance, name)?;
        let tracker = if let Some(tracker) = slot.tracker.upgrade() {
            tracker
        } else {
            let tracker = self.shared.new_tracker(cleanup, T::KIND, name);
            slot.tracker = Arc::downgrade(&tracker);
            tracker
        };
        Ok(Some(Handle {
            instance,
            id: slot.id,
            tracker,
        }))
    }

    /// Removes every instance of `kind` from the map and the cleanup list.
    ///
    /// Target resources are not closed; call `close()` first if they must be released.
    /// Returns the number of instances removed.
    pub fn clear(&self, kind: Kind) -> usize {
        let guard = self.shared.lock.lock();
        let removed = self.shared.slots.write().remove(&kind).unwrap_or_default();
        let untracked = guard.borrow_mut().remove_kind(kind);
        drop(guard);

        let count = removed.len();
        drop(removed);
        internal::debug(
            "REGISTRY",
            &format!("Cleared {count} {kind} instances ({untracked} tracked)"),
        );
        count
    }

    /// Clears every kind.
    pub fn clear_all(&self) -> usize {
        Kind::all().into_iter().map(|kind| self.clear(kind)).sum()
    }

    /// Registered instances of `kind`. Not a snapshot under concurrent mutation.
    #[must_use]
    pub fn count(&self, kind: Kind) -> usize {
        self.shared.slots.read().get(&kind).map_or(0, HashMap::len)
    }

    #[must_use]
    pub fn contains(&self, kind: Kind, name: &str) -> bool {
        self.shared
            .slots
            .read()
            .get(&kind)
            .is_some_and(|m| m.contains_key(name))
    }

    /// Registered names of `kind`, sorted.
    #[must_use]
    pub fn names(&self, kind: Kind) -> Vec<String> {
        let mut names: Vec<String> = self
            .shared
            .slots
            .read()
            .get(&kind)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Cleanup-list entries of `kind`, i.e. instances with outstanding external handles.
    #[must_use]
    pub fn tracked(&self, kind: Kind) -> usize {
        self.shared.lock.lock().borrow().count(kind)
    }

    /// Disposal pass: drops cleanup entries whose handles are all gone.
    ///
    /// Release callbacks normally do this eagerly; the pass catches anything
    /// they have not reached yet. Returns the number of entries removed.
    pub fn collect(&self) -> usize {
        let guard = self.shared.lock.lock();
        let swept = guard.borrow_mut().sweep();
        drop(guard);
        if swept > 0 {
            internal::trace("REGISTRY", &format!("Swept {swept} released handles"));
        }
        swept
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for kind in Kind::all() {
            map.entry(&kind.as_str(), &self.count(kind));
        }
        map.finish()
    }
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// The process-wide registry, created on first use.
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(Registry::new)
}

/// Owning handle to a registered instance.
///
/// All clones share one [`Tracker`]; when the last one drops, the instance
/// leaves the cleanup list but stays registered.
pub struct Handle<T> {
    instance: Arc<T>,
    id: InstanceId,
    tracker: Arc<Tracker>,
}

impl<T> Handle<T> {
    #[must_use]
    pub const fn id(&self) -> InstanceId {
        self.id
    }

    /// True if both handles refer to the same constructed instance.
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }

    /// Explicit release, equivalent to dropping the handle.
    pub fn release(self) {
        drop(self);
    }

    #[must_use]
    pub fn serial(&self) -> u64 {
        self.tracker.serial()
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            instance: Arc::clone(&self.instance),
            id: self.id,
            tracker: Arc::clone(&self.tracker),
        }
    }
}

impl<T> Deref for Handle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.instance
    }
}

impl<T: fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.id)
            .field("instance", &self.instance)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget(Level);

    impl Registered for Widget {
        const KIND: Kind = Kind::StreamSink;
    }

    #[test]
    fn reacquire_after_release_retracks_same_instance() {
        let registry = Registry::new();
        let first = registry
            .get_or_create("widget", Level::INFO, |_, level| Ok(Widget(level)))
            .unwrap();
        let id = first.id();
        first.release();
        assert_eq!(registry.tracked(Kind::StreamSink), 0);

        let again = registry.get::<Widget>("widget").unwrap().unwrap();
        assert_eq!(again.id(), id);
        assert_eq!(again.0, Level::INFO);
        assert_eq!(registry.tracked(Kind::StreamSink), 1);
    }

    #[test]
    fn constructor_may_reenter_registry() {
        let registry = Registry::new();
        let inner = registry.clone();
        let outer = registry
            .get_or_create("outer", Level::DEBUG, move |_, level| {
                inner.get_or_create::<Widget, _>("inner", level, |_, level| Ok(Widget(level)))?;
                Ok(Widget(level))
            })
            .unwrap();

        assert_eq!(outer.0, Level::DEBUG);
        assert_eq!(registry.count(Kind::StreamSink), 2);
    }

    #[test]
    fn failed_construction_leaves_no_entry() {
        let registry = Registry::new();
        let result = registry.get_or_create::<Widget, _>("broken", Level::INFO, |_, _| {
            Err(Error::InvalidLevel("widget".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(registry.count(Kind::StreamSink), 0);
        assert_eq!(registry.tracked(Kind::StreamSink), 0);
    }
}
