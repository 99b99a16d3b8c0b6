//! Registered-client bookkeeping: the name-keyed directory and spawn
//! placement.

use crate::queue::UpdateQueue;
use crate::service::WorldError;
use log::info;
use rand::Rng;
use shared::{Cell, Grid};
use std::collections::HashMap;

/// State of one registered participant.
#[derive(Debug)]
pub struct ClientInfo {
    pub name: String,
    /// Current position, always within grid bounds.
    pub x: usize,
    pub y: usize,
    /// Terrain that was beneath the character before it was placed here;
    /// restored at this coordinate when the character moves away.
    pub under: Cell,
    /// Private delivery slot for world updates.
    pub queue: UpdateQueue,
}

/// Mapping from client name to client state. Owns the name-uniqueness
/// invariant; entries are never removed (clients live for the process
/// lifetime).
#[derive(Debug, Default)]
pub struct Directory {
    clients: HashMap<String, ClientInfo>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new name and places its character on a uniformly random
    /// vacant cell of `grid`. Fails without touching any state when the
    /// name is taken or the map has no vacant cell left.
    pub fn register(&mut self, name: &str, grid: &mut Grid) -> Result<(usize, usize), WorldError> {
        if self.clients.contains_key(name) {
            return Err(WorldError::DuplicateName(name.to_string()));
        }

        let vacant = grid.vacant_cells();
        if vacant.is_empty() {
            return Err(WorldError::MapFull);
        }
        let (x, y) = vacant[rand::thread_rng().gen_range(0..vacant.len())];

        let under = grid.at(x, y);
        grid.set(x, y, Cell::PLAYER);
        self.clients.insert(
            name.to_string(),
            ClientInfo {
                name: name.to_string(),
                x,
                y,
                under,
                queue: UpdateQueue::new(),
            },
        );

        info!("client {} registered at ({}, {})", name, x, y);
        Ok((x, y))
    }

    pub fn get(&self, name: &str) -> Option<&ClientInfo> {
        self.clients.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ClientInfo> {
        self.clients.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClientInfo> {
        self.clients.values()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
