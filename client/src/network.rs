//! Client-side proxy for the server's RPC operations.

use shared::{read_frame, write_frame, ErrorKind, FrameError, Grid, Request, Response};
use tokio::net::TcpStream;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("server rejected the call ({kind:?}): {message}")]
    Server { kind: ErrorKind, message: String },
    #[error("server sent a response that does not match the call")]
    UnexpectedResponse,
}

/// One RPC session with the server. Calls run strictly one at a time per
/// connection, so a proxy kept busy in [`ServerProxy::poll_update`] cannot
/// also send moves; open a second proxy for that.
pub struct ServerProxy {
    stream: TcpStream,
}

impl ServerProxy {
    pub async fn connect(addr: &str) -> Result<ServerProxy, ProxyError> {
        let stream = TcpStream::connect(addr).await.map_err(FrameError::Io)?;
        Ok(ServerProxy { stream })
    }

    async fn call(&mut self, request: &Request) -> Result<Response, ProxyError> {
        write_frame(&mut self.stream, request).await?;
        let response: Response = read_frame(&mut self.stream).await?;
        if let Response::Error { kind, message } = response {
            return Err(ProxyError::Server { kind, message });
        }
        Ok(response)
    }

    /// Registers `name` and returns the spawn position and initial world.
    pub async fn register(&mut self, name: &str) -> Result<(i32, i32, Grid), ProxyError> {
        let request = Request::Register {
            name: name.to_string(),
        };
        match self.call(&request).await? {
            Response::Registered { x, y, grid } => Ok((x, y, grid)),
            _ => Err(ProxyError::UnexpectedResponse),
        }
    }

    /// Requests a move to the absolute target `(x, y)`.
    pub async fn send_move(&mut self, name: &str, x: i32, y: i32) -> Result<bool, ProxyError> {
        let request = Request::Move {
            name: name.to_string(),
            x,
            y,
        };
        match self.call(&request).await? {
            Response::MoveAck { ok } => Ok(ok),
            _ => Err(ProxyError::UnexpectedResponse),
        }
    }

    /// Blocks until the server delivers the next world snapshot.
    pub async fn poll_update(&mut self, name: &str) -> Result<(i32, i32, Grid), ProxyError> {
        let request = Request::PollUpdate {
            name: name.to_string(),
        };
        match self.call(&request).await? {
            Response::Update { x, y, grid } => Ok((x, y, grid)),
            _ => Err(ProxyError::UnexpectedResponse),
        }
    }
}
