//! Transient display handles for on-screen previews.
//!
//! A handle stands for a revocable preview URL (an object URL in the
//! browser). Whoever acquires a handle must release it when the preview goes
//! away or is replaced, otherwise every edit would leak one.

use std::collections::HashMap;
use std::fmt;

use crate::collection::ItemId;

/// Opaque, revocable preview handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayHandle(u64);

impl DisplayHandle {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preview#{}", self.0)
    }
}

/// Table of live preview handles.
#[derive(Debug, Default)]
pub struct PreviewHandles {
    live: HashMap<DisplayHandle, ItemId>,
    next: u64,
}

impl PreviewHandles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle previewing `item`.
    pub fn acquire(&mut self, item: ItemId) -> DisplayHandle {
        let handle = DisplayHandle(self.next);
        self.next += 1;
        self.live.insert(handle, item);
        tracing::trace!(%handle, %item, "preview handle acquired");
        handle
    }

    /// Revoke a handle. Returns `false` if it was already released.
    pub fn release(&mut self, handle: DisplayHandle) -> bool {
        let released = self.live.remove(&handle).is_some();
        if released {
            tracing::trace!(%handle, "preview handle released");
        }
        released
    }

    pub fn is_live(&self, handle: DisplayHandle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Item a live handle previews.
    pub fn item(&self, handle: DisplayHandle) -> Option<ItemId> {
        self.live.get(&handle).copied()
    }

    /// Number of handles not yet released.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
