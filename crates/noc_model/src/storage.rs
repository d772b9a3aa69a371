//! Physical NoC fabric: routers, unidirectional links and link usage.
//!
//! [`NocStorage`] is built once when the NoC description is loaded. Its
//! topology never changes afterwards; only each link's bandwidth-usage
//! accumulator is mutated, by the route manager, as flows are installed and
//! uninstalled.

use crate::error::ModelError;
use crate::ids::{NocLinkId, NocRouterId};
use noc_common::Arena;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Position of a physical router on the device grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridLoc {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Die layer. Routing only connects routers on the same layer.
    pub layer: i32,
}

impl GridLoc {
    /// Creates a location on layer 0.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y, layer: 0 }
    }

    /// Manhattan distance in the x/y plane.
    pub fn manhattan(self, other: GridLoc) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// A physical router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NocRouter {
    /// Dense ID of this router.
    pub id: NocRouterId,
    /// ID from the NoC description, written to the placement file.
    pub user_id: u32,
    /// Grid position.
    pub loc: GridLoc,
    /// Latency a packet spends in this router (seconds).
    pub latency: f64,
}

/// A unidirectional link between two routers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NocLink {
    /// Dense ID of this link.
    pub id: NocLinkId,
    /// Router the link leaves.
    pub src: NocRouterId,
    /// Router the link enters.
    pub dst: NocRouterId,
    /// Capacity (bits per second). Reported, not enforced.
    pub bandwidth: f64,
    /// Traversal latency (seconds).
    pub latency: f64,
    /// Sum of the bandwidths of all flows whose route uses this link.
    pub bandwidth_usage: f64,
}

/// Parameters for [`NocStorage::mesh`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshParams {
    /// Capacity of every link.
    pub link_bandwidth: f64,
    /// Latency of every link.
    pub link_latency: f64,
    /// Latency of every router.
    pub router_latency: f64,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            link_bandwidth: 1.0e9,
            link_latency: 1.0e-9,
            router_latency: 1.0e-9,
        }
    }
}

/// The NoC fabric graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NocStorage {
    routers: Arena<NocRouterId, NocRouter>,
    links: Arena<NocLinkId, NocLink>,
    outgoing: Arena<NocRouterId, Vec<NocLinkId>>,
    /// Auxiliary index: (src, dst) to link (rebuilt on deserialization).
    #[serde(skip)]
    link_lookup: HashMap<(NocRouterId, NocRouterId), NocLinkId>,
    /// Auxiliary index: user-facing router ID to dense ID (rebuilt on
    /// deserialization).
    #[serde(skip)]
    router_by_user_id: HashMap<u32, NocRouterId>,
}

impl NocStorage {
    /// Creates an empty NoC.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a `cols` x `rows` 2D mesh on layer 0 with a link in each
    /// direction between every pair of horizontally or vertically adjacent
    /// routers.
    ///
    /// Router `(x, y)` gets user ID `y * cols + x`.
    pub fn mesh(cols: u32, rows: u32, params: MeshParams) -> Self {
        let mut noc = Self::new();
        for y in 0..rows {
            for x in 0..cols {
                noc.push_router(
                    y * cols + x,
                    GridLoc::new(x as i32, y as i32),
                    params.router_latency,
                );
            }
        }
        let at = |x: u32, y: u32| NocRouterId::from_raw(y * cols + x);
        for y in 0..rows {
            for x in 0..cols {
                if x + 1 < cols {
                    noc.push_link(at(x, y), at(x + 1, y), params.link_bandwidth, params.link_latency);
                    noc.push_link(at(x + 1, y), at(x, y), params.link_bandwidth, params.link_latency);
                }
                if y + 1 < rows {
                    noc.push_link(at(x, y), at(x, y + 1), params.link_bandwidth, params.link_latency);
                    noc.push_link(at(x, y + 1), at(x, y), params.link_bandwidth, params.link_latency);
                }
            }
        }
        noc
    }

    /// Adds a router and returns its ID.
    pub fn add_router(
        &mut self,
        user_id: u32,
        loc: GridLoc,
        latency: f64,
    ) -> Result<NocRouterId, ModelError> {
        if self.router_by_user_id.contains_key(&user_id) {
            return Err(ModelError::DuplicateRouterId(user_id));
        }
        check_non_negative("router latency", latency)?;
        Ok(self.push_router(user_id, loc, latency))
    }

    /// Adds a unidirectional link and returns its ID.
    pub fn add_link(
        &mut self,
        src: NocRouterId,
        dst: NocRouterId,
        bandwidth: f64,
        latency: f64,
    ) -> Result<NocLinkId, ModelError> {
        for router in [src, dst] {
            if !self.routers.contains(router) {
                return Err(ModelError::UnknownRouter(router));
            }
        }
        if src == dst {
            return Err(ModelError::SelfLink(src));
        }
        if self.link_lookup.contains_key(&(src, dst)) {
            return Err(ModelError::DuplicateLink { src, dst });
        }
        check_non_negative("link bandwidth", bandwidth)?;
        check_non_negative("link latency", latency)?;
        Ok(self.push_link(src, dst, bandwidth, latency))
    }

    fn push_router(&mut self, user_id: u32, loc: GridLoc, latency: f64) -> NocRouterId {
        let id = self.routers.alloc(NocRouter {
            id: NocRouterId::INVALID,
            user_id,
            loc,
            latency,
        });
        self.routers[id].id = id;
        self.outgoing.alloc(Vec::new());
        self.router_by_user_id.insert(user_id, id);
        id
    }

    fn push_link(
        &mut self,
        src: NocRouterId,
        dst: NocRouterId,
        bandwidth: f64,
        latency: f64,
    ) -> NocLinkId {
        let id = self.links.alloc(NocLink {
            id: NocLinkId::INVALID,
            src,
            dst,
            bandwidth,
            latency,
            bandwidth_usage: 0.0,
        });
        self.links[id].id = id;
        self.outgoing[src].push(id);
        self.link_lookup.insert((src, dst), id);
        id
    }

    /// Returns the router with the given ID.
    pub fn router(&self, id: NocRouterId) -> &NocRouter {
        &self.routers[id]
    }

    /// Returns the router with the given ID, or `None` if out of range.
    pub fn try_router(&self, id: NocRouterId) -> Option<&NocRouter> {
        self.routers.get(id)
    }

    /// Returns the link with the given ID.
    pub fn link(&self, id: NocLinkId) -> &NocLink {
        &self.links[id]
    }

    /// Returns the link with the given ID, or `None` if out of range.
    pub fn try_link(&self, id: NocLinkId) -> Option<&NocLink> {
        self.links.get(id)
    }

    /// Returns a mutable reference to the link with the given ID.
    pub fn link_mut(&mut self, id: NocLinkId) -> &mut NocLink {
        &mut self.links[id]
    }

    /// Returns the links leaving `router`, in creation order.
    pub fn outgoing_links(&self, router: NocRouterId) -> &[NocLinkId] {
        &self.outgoing[router]
    }

    /// Returns the link from `src` to `dst`, if one exists.
    pub fn find_link(&self, src: NocRouterId, dst: NocRouterId) -> Option<NocLinkId> {
        self.link_lookup.get(&(src, dst)).copied()
    }

    /// Returns the router with the given user-facing ID.
    pub fn router_by_user_id(&self, user_id: u32) -> Option<NocRouterId> {
        self.router_by_user_id.get(&user_id).copied()
    }

    /// Iterates over all routers.
    pub fn routers(&self) -> impl Iterator<Item = &NocRouter> {
        self.routers.values()
    }

    /// Iterates over all links.
    pub fn links(&self) -> impl Iterator<Item = &NocLink> {
        self.links.values()
    }

    /// Returns the number of routers.
    pub fn router_count(&self) -> usize {
        self.routers.len()
    }

    /// Returns the number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Sets every link's bandwidth usage to zero.
    pub fn reset_link_usage(&mut self) {
        for link in self.links.values_mut() {
            link.bandwidth_usage = 0.0;
        }
    }

    /// Rebuilds auxiliary indices after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.link_lookup = self.links.iter().map(|(id, l)| ((l.src, l.dst), id)).collect();
        self.router_by_user_id = self.routers.iter().map(|(id, r)| (r.user_id, id)).collect();
    }
}

fn check_non_negative(what: &'static str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidValue { what, value })
    }
}
