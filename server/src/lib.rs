//! # gridwalk server
//!
//! Authoritative server for a shared, grid-based multiplayer session.
//! Remote clients register under a unique name, get spawned on a random
//! open cell, move across the grid, and poll for full-world snapshots.
//!
//! ## Architecture
//!
//! All shared state (the grid plus the client directory) lives behind one
//! mutex inside [`service::SyncService`], so registrations, moves, and the
//! broadcast fan-out serialize cleanly. Each client owns a single-slot
//! [`queue::UpdateQueue`]; an accepted move clones the world once per
//! client into those slots, and a client that polls slowly simply misses
//! intermediate states instead of accumulating a backlog.
//!
//! The network layer ([`network`]) accepts TCP connections on one endpoint
//! and runs a length-prefixed bincode RPC loop per connection. A session
//! blocked waiting for an update never blocks the world lock.
//!
//! There is deliberately no deregistration: a client that stops calling
//! keeps its directory entry and its cell until the process exits.

pub mod directory;
pub mod network;
pub mod queue;
pub mod service;
