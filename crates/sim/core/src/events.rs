//! Deterministic simulation events.
//!
//! Side-effecting hooks (message popups, status visuals) are decoupled from
//! the core: mutations push events into the world's queue and the host
//! drains them after each step. Event order is fully determined by the
//! mutation order, never by rendering.

use crate::handle::Handle;
use crate::status::StatusKind;

/// An observable state change the host may react to.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimEvent {
    StatusAdded {
        status: Handle,
        kind: StatusKind,
        target: Handle,
    },
    StatusRemoved {
        status: Handle,
        kind: StatusKind,
        target: Handle,
    },
    /// Fired whenever a status effect's stack count crosses an integer
    /// boundary, in either direction.
    StackChanged {
        status: Handle,
        kind: StatusKind,
        from: u32,
        to: u32,
    },
}
