//! Weak-handle bookkeeping for instances that external code holds.
//!
//! The registry map owns every instance; the cleanup list only records which
//! instances also have outside owners. Rust has no finalizers, so ownership
//! is made explicit: every external [`Handle`](super::Handle) shares one
//! [`Tracker`], and dropping the last one runs the tracker's removal callback.
//! Cleanup is best-effort. It happens when the last handle drops or when
//! [`Registry::collect`](super::Registry::collect) sweeps, not at any fixed time.

use super::Kind;
use std::sync::{Arc, Weak};

type ReleaseFn = Box<dyn FnOnce(u64) + Send + Sync>;

/// Disposal guard shared by every external handle to one instance.
pub struct Tracker {
    serial: u64,
    on_release: Option<ReleaseFn>,
}

impl Tracker {
    pub(crate) fn new(
        serial: u64,
        on_release: impl FnOnce(u64) + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            serial,
            on_release: Some(Box::new(on_release)),
        })
    }

    #[must_use]
    pub const fn serial(&self) -> u64 {
        self.serial
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        if let Some(release) = self.on_release.take() {
            release(self.serial);
        }
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker").field("serial", &self.serial).finish()
    }
}

#[derive(Debug)]
struct CleanupEntry {
    serial: u64,
    kind: Kind,
    name: String,
    handle: Weak<Tracker>,
}

/// Live weak handles, guarded by the registry's reentrant lock.
#[derive(Debug, Default)]
pub struct CleanupList {
    entries: Vec<CleanupEntry>,
}

impl CleanupList {
    pub(crate) fn push(&mut self, kind: Kind, name: &str, tracker: &Arc<Tracker>) {
        self.entries.push(CleanupEntry {
            serial: tracker.serial(),
            kind,
            name: name.to_string(),
            handle: Arc::downgrade(tracker),
        });
    }

    /// Removes the entry for `serial`. An absent entry is not an error: `clear`
    /// may have removed it before the last handle dropped.
    pub(crate) fn remove(&mut self, serial: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.serial != serial);
        self.entries.len() != before
    }

    pub(crate) fn remove_kind(&mut self, kind: Kind) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.kind != kind);
        before - self.entries.len()
    }

    /// Drops entries whose tracker is already gone.
    pub(crate) fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle.strong_count() > 0);
        before - self.entries.len()
    }

    #[must_use]
    pub fn count(&self, kind: Kind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    #[must_use]
    pub fn contains(&self, kind: Kind, name: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.kind == kind && e.name == name && e.handle.strong_count() > 0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
