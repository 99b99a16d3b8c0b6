//! # gridwalk client
//!
//! Terminal client for the gridwalk server: registers under a name, reads
//! single-key moves from stdin, and keeps a background session polling for
//! world updates. The server is authoritative; this side only renders what
//! it is sent.

pub mod network;
pub mod view;
