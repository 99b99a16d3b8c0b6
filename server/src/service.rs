//! The synchronization service: the single owner of the shared world.
//!
//! All grid and directory mutation happens inside one mutex, which makes
//! every registration, move, and broadcast fan-out atomic with respect to
//! each other. The only thing that happens outside the lock is a client
//! parked on its own update queue, so a waiting client never stalls
//! anybody else's registration or movement.

use crate::directory::Directory;
use log::{debug, warn};
use shared::{Cell, ErrorKind, Grid};
use tokio::sync::Mutex;

/// Errors surfaced to callers of the three service operations. Blocked or
/// out-of-bounds moves are not errors; see [`SyncService::apply_move`].
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("client {0} is already registered")]
    DuplicateName(String),
    #[error("client {0} is not registered")]
    UnknownClient(String),
    #[error("no vacant cell left to spawn on")]
    MapFull,
}

impl WorldError {
    /// Wire category for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorldError::DuplicateName(_) => ErrorKind::DuplicateName,
            WorldError::UnknownClient(_) => ErrorKind::UnknownClient,
            WorldError::MapFull => ErrorKind::MapFull,
        }
    }
}

struct WorldState {
    grid: Grid,
    directory: Directory,
}

/// RPC-facing owner of the grid and the client directory. Exposes exactly
/// three operations; no caller ever touches the fields directly.
pub struct SyncService {
    state: Mutex<WorldState>,
}

impl SyncService {
    pub fn new(grid: Grid) -> Self {
        Self {
            state: Mutex::new(WorldState {
                grid,
                directory: Directory::new(),
            }),
        }
    }

    /// Registers `name`, spawns its character, and returns the spawn
    /// position together with the world as it looks after placement.
    pub async fn register(&self, name: &str) -> Result<(i32, i32, Grid), WorldError> {
        let mut state = self.state.lock().await;
        let WorldState { grid, directory } = &mut *state;

        let (x, y) = directory.register(name, grid)?;
        Ok((x as i32, y as i32, grid.clone()))
    }

    /// Moves `name` to the absolute target `(x, y)` if the target is on
    /// the grid and not tangible, then broadcasts the new world to every
    /// registered client.
    ///
    /// Invalid targets are absorbed: nothing changes, yet the returned ack
    /// is still `true`. Only an unregistered name is an error.
    pub async fn apply_move(&self, name: &str, x: i32, y: i32) -> Result<bool, WorldError> {
        let mut state = self.state.lock().await;
        let WorldState { grid, directory } = &mut *state;

        let client = directory
            .get_mut(name)
            .ok_or_else(|| WorldError::UnknownClient(name.to_string()))?;

        if !grid.in_bounds(x, y) || grid.at(x as usize, y as usize).tangible {
            debug!("absorbed move of {} to blocked target ({}, {})", name, x, y);
            return Ok(true);
        }
        let (tx, ty) = (x as usize, y as usize);

        // Put back the terrain the character was standing on, remember
        // what it is about to cover, and step onto the target.
        let restored = client.under;
        client.under = grid.at(tx, ty);
        grid.set(client.x, client.y, restored);
        grid.set(tx, ty, Cell::PLAYER);
        client.x = tx;
        client.y = ty;
        debug!("client {} moved to ({}, {})", name, tx, ty);

        let snapshot = grid.clone();
        for other in directory.iter() {
            if !other.queue.try_deliver(snapshot.clone()) {
                warn!(
                    "update queue for {} is full, dropping snapshot",
                    other.name
                );
            }
        }

        Ok(true)
    }

    /// Waits for the next world snapshot delivered to `name` and returns
    /// it together with the client's current position.
    pub async fn poll_update(&self, name: &str) -> Result<(i32, i32, Grid), WorldError> {
        // Grab the queue handle under the lock, then wait outside it.
        let queue = {
            let state = self.state.lock().await;
            state
                .directory
                .get(name)
                .ok_or_else(|| WorldError::UnknownClient(name.to_string()))?
                .queue
                .clone()
        };

        let snapshot = queue.take().await;

        let state = self.state.lock().await;
        let client = state
            .directory
            .get(name)
            .ok_or_else(|| WorldError::UnknownClient(name.to_string()))?;
        Ok((client.x as i32, client.y as i32, snapshot))
    }

    /// Current world, for diagnostics and tests.
    pub async fn grid(&self) -> Grid {
        self.state.lock().await.grid.clone()
    }

    /// Number of registered clients.
    pub async fn client_count(&self) -> usize {
        self.state.lock().await.directory.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // 5x3 arena: walls all around, one vegetation tile inside.
    const ARENA: &str = "▤▤▤▤▤\n▤ ♣ ▤\n▤▤▤▤▤";

    fn service() -> SyncService {
        SyncService::new(Grid::parse(ARENA).unwrap())
    }

    #[tokio::test]
    async fn register_reports_the_placed_cell() {
        let service = service();
        let (x, y, grid) = service.register("alice").await.unwrap();
        assert_eq!(grid.at(x as usize, y as usize), Cell::PLAYER);
        assert_eq!(service.client_count().await, 1);
    }

    #[tokio::test]
    async fn move_for_unknown_name_changes_nothing() {
        let service = service();
        let before = service.grid().await;

        let err = service.apply_move("ghost", 1, 1).await.unwrap_err();
        assert!(matches!(err, WorldError::UnknownClient(_)));
        assert_eq!(service.grid().await, before);
    }

    #[tokio::test]
    async fn blocked_move_is_absorbed_but_acked() {
        let service = service();
        let (x, y, _) = service.register("alice").await.unwrap();
        let before = service.grid().await;

        // Out of bounds, into a wall, and onto the own (tangible) cell.
        for (tx, ty) in [(-1, 0), (0, 0), (x, y)] {
            let ack = service.apply_move("alice", tx, ty).await.unwrap();
            assert!(ack);
        }
        assert_eq!(service.grid().await, before);
    }

    #[tokio::test]
    async fn valid_move_touches_exactly_two_cells() {
        let service = service();
        let (x, y, before) = service.register("alice").await.unwrap();

        // The arena has two open interior cells; step to the other one.
        let (tx, ty) = if x == 1 { (3, 1) } else { (1, 1) };
        assert!(service.apply_move("alice", tx, ty).await.unwrap());

        let after = service.grid().await;
        assert_eq!(after.at(x as usize, y as usize), Cell::EMPTY);
        assert_eq!(after.at(tx as usize, ty as usize), Cell::PLAYER);
        for gy in 0..after.height() {
            for gx in 0..after.width() {
                if (gx, gy) != (x as usize, y as usize) && (gx, gy) != (tx as usize, ty as usize) {
                    assert_eq!(after.at(gx, gy), before.at(gx, gy));
                }
            }
        }
    }

    #[tokio::test]
    async fn vegetation_reappears_after_the_character_leaves() {
        let service = service();
        let (x, _, _) = service.register("alice").await.unwrap();
        let other = if x == 1 { 3 } else { 1 };

        // Step onto the vegetation tile, then off it again.
        assert!(service.apply_move("alice", 2, 1).await.unwrap());
        assert_eq!(service.grid().await.at(2, 1), Cell::PLAYER);

        assert!(service.apply_move("alice", other, 1).await.unwrap());
        let after = service.grid().await;
        assert_eq!(after.at(2, 1), Cell::VEGETATION);
        assert_eq!(after.at(other as usize, 1), Cell::PLAYER);
    }

    #[tokio::test]
    async fn broadcast_reaches_mover_and_bystander() {
        let service = service();
        let (ax, _, _) = service.register("alice").await.unwrap();
        // Spawning only targets empty cells, so bob takes the remaining
        // open tile and the vegetation cell stays free for the move.
        service.register("bob").await.unwrap();

        assert!(service.apply_move("alice", 2, 1).await.unwrap());

        let (_, _, seen_by_alice) = service.poll_update("alice").await.unwrap();
        let (_, _, seen_by_bob) = service.poll_update("bob").await.unwrap();
        assert_eq!(seen_by_alice, seen_by_bob);
        assert_eq!(seen_by_alice.at(2, 1), Cell::PLAYER);
        assert_eq!(seen_by_alice.at(ax as usize, 1), Cell::EMPTY);
    }

    #[tokio::test]
    async fn poll_blocks_until_somebody_moves() {
        let service = std::sync::Arc::new(service());
        service.register("alice").await.unwrap();

        let waiter = std::sync::Arc::clone(&service);
        let handle = tokio::spawn(async move { waiter.poll_update("alice").await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        // A waiting poller must not hold the world lock.
        service.register("bob").await.unwrap();
        assert!(service.apply_move("alice", 2, 1).await.unwrap());

        let (x, y, _) = handle.await.unwrap().unwrap();
        assert_eq!((x, y), (2, 1));
    }

    #[tokio::test]
    async fn slow_consumer_keeps_only_one_pending_snapshot() {
        let service = service();
        let (x, _, _) = service.register("alice").await.unwrap();
        let other = if x == 1 { 3 } else { 1 };

        // Three accepted moves without a poll in between: the first
        // snapshot stays pending, the later ones are dropped.
        assert!(service.apply_move("alice", 2, 1).await.unwrap());
        assert!(service.apply_move("alice", other, 1).await.unwrap());
        assert!(service.apply_move("alice", 2, 1).await.unwrap());

        let (_, _, first) = service.poll_update("alice").await.unwrap();
        assert_eq!(first.at(2, 1), Cell::PLAYER);
        assert_eq!(first.at(x as usize, 1), Cell::EMPTY);

        // The slot is empty again; the next accepted move is delivered.
        assert!(service.apply_move("alice", other, 1).await.unwrap());
        let (_, _, second) = service.poll_update("alice").await.unwrap();
        assert_eq!(second.at(other as usize, 1), Cell::PLAYER);
    }
}
