//! # vprop-state — Validation State Store
//!
//! Owns the live field states of one form and exposes the operations a
//! host drives them with.
//!
//! ## Store (`store`)
//!
//! [`Store`] is built by [`StoreBuilder`] from declarations, an optional
//! generator, the host input and external change handlers. It offers
//! per-field reads and mutations (also through a [`FieldHandle`]),
//! `validate_all`, `errors_count`, host-input reconciliation and
//! [`StoreSnapshot`]s.
//!
//! ## Notification (`notify`, `mirror`)
//!
//! Every mutation is reported to the host as a [`StateUpdate`] through the
//! injected [`Notifier`]. [`QueuedNotifier`] models a host whose displayed
//! copy ([`HostMirror`]) lags the store until it flushes.
//!
//! ## Crate Policy
//!
//! - Single-threaded and synchronous. No locks, no background work.
//! - No global state: notifier, input and handlers are injected.
//! - Validator panics are not caught.

pub mod handle;
pub mod mirror;
pub mod notify;
pub mod snapshot;
pub mod store;

// ─── Store re-exports ───────────────────────────────────────────────

pub use handle::FieldHandle;
pub use store::{ChangeHandler, Store, StoreBuilder};

// ─── Notification re-exports ────────────────────────────────────────

pub use mirror::HostMirror;
pub use notify::{Continuation, ImmediateNotifier, Mutation, Notifier, QueuedNotifier, StateUpdate};

// ─── Snapshot re-exports ────────────────────────────────────────────

pub use snapshot::{FieldSnapshot, FieldView, SnapshotEntry, StoreSnapshot, ValidatorSnapshot, VALIDATOR_ENTRY};
