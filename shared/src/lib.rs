//! Types shared between the gridwalk server and client: the world model,
//! the RPC message set, and the frame codec they travel in.

pub mod codec;
pub mod grid;
pub mod protocol;

pub use codec::{read_frame, write_frame, FrameError, MAX_FRAME_LEN};
pub use grid::{Cell, Color, Grid, LoadError};
pub use protocol::{ErrorKind, Request, Response};
