//! TCP listener and per-connection RPC sessions.
//!
//! Every accepted connection gets its own task running a sequential
//! read-dispatch-write loop against the one shared [`SyncService`]. A
//! session that blocks in `PollUpdate` only occupies its own connection.

use crate::service::{SyncService, WorldError};
use log::{error, info, warn};
use shared::{read_frame, write_frame, FrameError, Request, Response};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

pub struct Server {
    listener: TcpListener,
    service: Arc<SyncService>,
}

impl Server {
    /// Binds the listening endpoint.
    pub async fn bind(addr: &str, service: Arc<SyncService>) -> std::io::Result<Server> {
        let listener = TcpListener::bind(addr).await?;
        info!("listening on {}", listener.local_addr()?);
        Ok(Server { listener, service })
    }

    /// Address the server actually bound to (relevant when binding port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, one session task per connection.
    pub async fn run(self) -> std::io::Result<()> {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("failed to accept connection: {}", e);
                    continue;
                }
            };

            info!("connection from {}", peer);
            let service = Arc::clone(&self.service);
            tokio::spawn(async move {
                match handle_session(stream, service).await {
                    Ok(()) => info!("session from {} closed", peer),
                    Err(e) => warn!("session from {} failed: {}", peer, e),
                }
            });
        }
    }
}

/// Runs one RPC session until the peer hangs up.
async fn handle_session(
    mut stream: TcpStream,
    service: Arc<SyncService>,
) -> Result<(), FrameError> {
    loop {
        let request: Request = match read_frame(&mut stream).await {
            Ok(request) => request,
            Err(e) if e.is_clean_eof() => return Ok(()),
            Err(e) => return Err(e),
        };

        let response = dispatch(&service, request).await;
        write_frame(&mut stream, &response).await?;
    }
}

/// Maps one request onto the service and its result onto the wire.
async fn dispatch(service: &SyncService, request: Request) -> Response {
    match request {
        Request::Register { name } => match service.register(&name).await {
            Ok((x, y, grid)) => Response::Registered { x, y, grid },
            Err(e) => error_response(e),
        },
        Request::Move { name, x, y } => match service.apply_move(&name, x, y).await {
            Ok(ok) => Response::MoveAck { ok },
            Err(e) => error_response(e),
        },
        Request::PollUpdate { name } => match service.poll_update(&name).await {
            Ok((x, y, grid)) => Response::Update { x, y, grid },
            Err(e) => error_response(e),
        },
    }
}

fn error_response(err: WorldError) -> Response {
    Response::Error {
        kind: err.kind(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Cell, ErrorKind, Grid};

    fn test_service() -> Arc<SyncService> {
        Arc::new(SyncService::new(Grid::parse("▤▤▤▤▤\n▤   ▤\n▤▤▤▤▤").unwrap()))
    }

    #[tokio::test]
    async fn dispatch_register_returns_spawn_and_world() {
        let service = test_service();
        match dispatch(
            &service,
            Request::Register {
                name: "alice".to_string(),
            },
        )
        .await
        {
            Response::Registered { x, y, grid } => {
                assert_eq!(grid.at(x as usize, y as usize), Cell::PLAYER)
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn dispatch_surfaces_unknown_client() {
        let service = test_service();
        match dispatch(
            &service,
            Request::Move {
                name: "ghost".to_string(),
                x: 1,
                y: 1,
            },
        )
        .await
        {
            Response::Error { kind, .. } => assert_eq!(kind, ErrorKind::UnknownClient),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn dispatch_acks_blocked_moves() {
        let service = test_service();
        service.register("alice").await.unwrap();

        match dispatch(
            &service,
            Request::Move {
                name: "alice".to_string(),
                x: 0,
                y: 0,
            },
        )
        .await
        {
            Response::MoveAck { ok } => assert!(ok),
            other => panic!("unexpected response: {:?}", other),
        }
    }
}
