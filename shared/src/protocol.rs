//! RPC message types exchanged between client and server.

use crate::grid::Grid;
use serde::{Deserialize, Serialize};

/// Client-to-server calls. Move targets are absolute grid coordinates,
/// signed so clients can request off-grid targets and let the server
/// decide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    Register { name: String },
    Move { name: String, x: i32, y: i32 },
    PollUpdate { name: String },
}

/// Server-to-client replies, one per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Response {
    /// Successful registration: spawn position plus the full world.
    Registered { x: i32, y: i32, grid: Grid },
    /// A move was received. `ok` is true whether or not the move was
    /// applied; blocked and out-of-bounds targets are absorbed silently.
    MoveAck { ok: bool },
    /// A delivered snapshot: current position plus the full world.
    Update { x: i32, y: i32, grid: Grid },
    Error { kind: ErrorKind, message: String },
}

/// Error category carried across the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Registration under a name that is already taken.
    DuplicateName,
    /// Move or poll for a name that was never registered.
    UnknownClient,
    /// Registration when no vacant spawn cell is left.
    MapFull,
}
