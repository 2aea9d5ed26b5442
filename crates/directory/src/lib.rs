//! Parking lot directory synchronization.
//!
//! The client learns the directory size from a single allocation message, then
//! fills lots in lazily: the first occupancy update for an unknown lot triggers
//! one metadata request, and the companion answers with the lot's name and
//! capacity. This crate holds the state for that protocol:
//!
//! * [`Registry`]: sized once, owns every [`Record`].
//! * [`SyncState`]: the state machine that routes decoded messages.
//! * [`Projection`]: read-only accessors for a rendering surface.
//! * [`DirectoryService`]: an actor that serializes message application.

#![warn(missing_docs)]

pub mod builtin;
pub mod config;
pub mod error;
pub mod projection;
pub mod record;
pub mod registry;
pub mod service;
pub mod sync;

pub use config::{EnvelopeLimits, PendingStatusPolicy, RefetchPolicy, SyncConfig};
pub use error::{ConfigError, ServiceError, SyncError};
pub use parkwatch_proto::{Count, LotId, LotMessage, LotName};
pub use projection::{Detail, Dirty, Invalidation, Projection, RowSummary, ViewFrame};
pub use record::Record;
pub use registry::Registry;
pub use service::{DirectoryHandle, DirectoryService, DirectoryStats};
pub use sync::{Applied, LotPhase, SyncState};
