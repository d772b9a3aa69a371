//! Logical router blocks and their placement on physical routers.
//!
//! A router block is what the placer moves. At any time each block sits on
//! exactly one physical router and each physical router holds at most one
//! block.

use crate::error::ModelError;
use crate::ids::{NocRouterId, RouterBlockId};
use noc_common::{Arena, Ident};
use serde::{Deserialize, Serialize};

/// A movable router block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterBlock {
    /// Dense ID of this block.
    pub id: RouterBlockId,
    /// Interned instance name, written to the placement file.
    pub name: Ident,
    /// Physical router this block currently occupies.
    pub router: NocRouterId,
}

/// Router block placement table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterBlocks {
    blocks: Arena<RouterBlockId, RouterBlock>,
    /// Block on each physical router, `INVALID` when empty.
    occupant: Arena<NocRouterId, RouterBlockId>,
}

impl RouterBlocks {
    /// Creates an empty table for a NoC with `router_count` physical routers.
    pub fn new(router_count: usize) -> Self {
        Self {
            blocks: Arena::new(),
            occupant: Arena::filled(router_count, RouterBlockId::INVALID),
        }
    }

    /// Adds a block placed on `router` and returns its ID.
    pub fn add_block(&mut self, name: Ident, router: NocRouterId) -> Result<RouterBlockId, ModelError> {
        let occupant = *self
            .occupant
            .get(router)
            .ok_or(ModelError::UnknownRouter(router))?;
        if occupant.is_valid() {
            return Err(ModelError::RouterOccupied { router, occupant });
        }
        let id = self.blocks.alloc(RouterBlock {
            id: RouterBlockId::INVALID,
            name,
            router,
        });
        self.blocks[id].id = id;
        self.occupant[router] = id;
        Ok(id)
    }

    /// Returns the block with the given ID.
    pub fn block(&self, id: RouterBlockId) -> &RouterBlock {
        &self.blocks[id]
    }

    /// Returns `true` if `id` names a block of this table.
    pub fn contains(&self, id: RouterBlockId) -> bool {
        self.blocks.contains(id)
    }

    /// Returns the physical router a block currently occupies.
    pub fn router_of(&self, id: RouterBlockId) -> NocRouterId {
        self.blocks[id].router
    }

    /// Returns the block on `router`, if any.
    pub fn occupant(&self, router: NocRouterId) -> Option<RouterBlockId> {
        self.occupant.get(router).copied().filter(|b| b.is_valid())
    }

    /// Moves `block` to the physical router `to`.
    ///
    /// Only clears the old router's occupant slot if it still points at
    /// `block`, so the two halves of a swap can be applied in either order.
    /// After both halves the table is consistent again.
    pub fn relocate(&mut self, block: RouterBlockId, to: NocRouterId) -> Result<(), ModelError> {
        if !self.blocks.contains(block) {
            return Err(ModelError::UnknownBlock(block));
        }
        if !self.occupant.contains(to) {
            return Err(ModelError::UnknownRouter(to));
        }
        let from = self.blocks[block].router;
        if self.occupant[from] == block {
            self.occupant[from] = RouterBlockId::INVALID;
        }
        self.blocks[block].router = to;
        self.occupant[to] = block;
        Ok(())
    }

    /// Checks that the occupant table agrees with every block's router.
    pub fn check_occupancy(&self) -> Result<(), String> {
        for block in self.blocks.values() {
            if self.occupant[block.router] != block.id {
                return Err(format!(
                    "router block {} claims router {} but the router holds {}",
                    block.id, block.router, self.occupant[block.router]
                ));
            }
        }
        let occupied = self.occupant.values().filter(|b| b.is_valid()).count();
        if occupied != self.blocks.len() {
            return Err(format!(
                "{occupied} routers occupied by {} router blocks",
                self.blocks.len()
            ));
        }
        Ok(())
    }

    /// Returns the number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if there are no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterates over all blocks in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &RouterBlock> {
        self.blocks.values()
    }
}
