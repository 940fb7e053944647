// crates/backdrop-store/src/observe.rs
// ============================================================================
// Module: Backdrop Store Observation
// Description: Channel-backed observers for paths, path sets, and changes.
// Purpose: Deliver current values plus ordered updates to subscribers.
// Dependencies: backdrop-core, tokio
// ============================================================================

//! ## Overview
//! Observation is a lazy sequence: the current value is delivered eagerly at
//! subscription time, followed by one item per change, in the order the
//! owning store committed them. Senders live inside the store; observers
//! hold the receiving half and may consume it asynchronously or blocking.
//! Observers must not call back into the store from the delivery path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use backdrop_core::Change;
use backdrop_core::KeyPath;
use backdrop_core::StoreValue;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

// ============================================================================
// SECTION: Value Observer
// ============================================================================

/// Observer of a single path.
///
/// Yields the value at the path (`None` when absent), starting with the
/// current value and then once per change touching the path.
#[derive(Debug)]
pub struct ValueObserver {
    /// Receiving half of the subscription channel.
    receiver: UnboundedReceiver<Option<StoreValue>>,
}

impl ValueObserver {
    /// Waits for the next item; `None` when the store is gone.
    pub async fn next(&mut self) -> Option<Option<StoreValue>> {
        self.receiver.recv().await
    }

    /// Blocking variant of [`ValueObserver::next`] for synchronous callers.
    ///
    /// # Panics
    ///
    /// Panics when called from inside an async runtime; use
    /// [`ValueObserver::next`] there.
    #[must_use]
    pub fn next_blocking(&mut self) -> Option<Option<StoreValue>> {
        self.receiver.blocking_recv()
    }

    /// Returns the next item only if one is already queued.
    #[must_use]
    pub fn try_next(&mut self) -> Option<Option<StoreValue>> {
        self.receiver.try_recv().ok()
    }
}

// ============================================================================
// SECTION: Set Observer
// ============================================================================

/// Observer of a set of paths (wildcards allowed).
///
/// Yields an object value mapping each watched path's text to its latest
/// value (`null` when absent); the initial item is delivered eagerly.
#[derive(Debug)]
pub struct SetObserver {
    /// Receiving half of the subscription channel.
    receiver: UnboundedReceiver<StoreValue>,
}

impl SetObserver {
    /// Waits for the next batch; `None` when the store is gone.
    pub async fn next(&mut self) -> Option<StoreValue> {
        self.receiver.recv().await
    }

    /// Blocking variant of [`SetObserver::next`] for synchronous callers.
    ///
    /// # Panics
    ///
    /// Panics when called from inside an async runtime; use
    /// [`SetObserver::next`] there.
    #[must_use]
    pub fn next_blocking(&mut self) -> Option<StoreValue> {
        self.receiver.blocking_recv()
    }

    /// Returns the next batch only if one is already queued.
    #[must_use]
    pub fn try_next(&mut self) -> Option<StoreValue> {
        self.receiver.try_recv().ok()
    }
}

// ============================================================================
// SECTION: Change Observer
// ============================================================================

/// Observer of the store-level change stream.
///
/// Yields every committed [`Change`] in commit order; a transaction arrives
/// as exactly one item.
#[derive(Debug)]
pub struct ChangeObserver {
    /// Receiving half of the subscription channel.
    receiver: UnboundedReceiver<Change>,
}

impl ChangeObserver {
    /// Waits for the next change; `None` when the store is gone.
    pub async fn next(&mut self) -> Option<Change> {
        self.receiver.recv().await
    }

    /// Blocking variant of [`ChangeObserver::next`] for synchronous callers.
    ///
    /// # Panics
    ///
    /// Panics when called from inside an async runtime; use
    /// [`ChangeObserver::next`] there.
    #[must_use]
    pub fn next_blocking(&mut self) -> Option<Change> {
        self.receiver.blocking_recv()
    }

    /// Returns the next change only if one is already queued.
    #[must_use]
    pub fn try_next(&mut self) -> Option<Change> {
        self.receiver.try_recv().ok()
    }
}

// ============================================================================
// SECTION: Store-Side Subscriptions
// ============================================================================

/// Store-side record of one path subscription.
#[derive(Debug)]
pub struct PathSubscription {
    /// Watched path.
    pub path: KeyPath,
    /// Sending half; closed receivers are pruned on delivery.
    pub sender: UnboundedSender<Option<StoreValue>>,
}

/// Store-side record of one path-set subscription.
#[derive(Debug)]
pub struct SetSubscription {
    /// Watched paths, wildcards allowed.
    pub paths: Vec<KeyPath>,
    /// Sending half; closed receivers are pruned on delivery.
    pub sender: UnboundedSender<StoreValue>,
}

/// Store-side record of one change-stream subscription.
#[derive(Debug)]
pub struct ChangeSubscription {
    /// Sending half; closed receivers are pruned on delivery.
    pub sender: UnboundedSender<Change>,
}

/// Creates a path subscription pair.
#[must_use]
pub fn path_channel(path: KeyPath) -> (PathSubscription, ValueObserver) {
    let (sender, receiver) = unbounded_channel();
    (
        PathSubscription {
            path,
            sender,
        },
        ValueObserver {
            receiver,
        },
    )
}

/// Creates a path-set subscription pair.
#[must_use]
pub fn set_channel(paths: Vec<KeyPath>) -> (SetSubscription, SetObserver) {
    let (sender, receiver) = unbounded_channel();
    (
        SetSubscription {
            paths,
            sender,
        },
        SetObserver {
            receiver,
        },
    )
}

/// Creates a change-stream subscription pair.
#[must_use]
pub fn change_channel() -> (ChangeSubscription, ChangeObserver) {
    let (sender, receiver) = unbounded_channel();
    (
        ChangeSubscription {
            sender,
        },
        ChangeObserver {
            receiver,
        },
    )
}
