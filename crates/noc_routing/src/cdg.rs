//! Channel dependency graph over NoC links.
//!
//! A vertex per link, and an edge from link A to link B whenever some route
//! leaves A straight into B. A cycle means a set of flows can each hold a
//! link while waiting on the next, i.e. the routing can deadlock.

use crate::error::CdgError;
use noc_common::Arena;
use noc_model::NocLinkId;

/// Dependency graph built from a snapshot of flow routes.
#[derive(Debug, Clone)]
pub struct ChannelDependencyGraph {
    successors: Arena<NocLinkId, Vec<NocLinkId>>,
    edge_count: usize,
}

impl ChannelDependencyGraph {
    /// Builds the graph for a NoC with `link_count` links from `routes`.
    ///
    /// Fails without a partial graph if a route references a link outside
    /// `0..link_count` or uses one link twice in a row. The same edge
    /// induced by several flows is stored once.
    pub fn new<'a, I>(link_count: usize, routes: I) -> Result<Self, CdgError>
    where
        I: IntoIterator<Item = &'a [NocLinkId]>,
    {
        let mut successors: Arena<NocLinkId, Vec<NocLinkId>> = Arena::filled(link_count, Vec::new());
        let mut edge_count = 0;

        for route in routes {
            for &link in route {
                if !successors.contains(link) {
                    return Err(CdgError::LinkOutOfRange { link, link_count });
                }
            }
            for pair in route.windows(2) {
                let (from, to) = (pair[0], pair[1]);
                if from == to {
                    return Err(CdgError::SelfDependency(from));
                }
                let out = &mut successors[from];
                if !out.contains(&to) {
                    out.push(to);
                    edge_count += 1;
                }
            }
        }

        Ok(Self {
            successors,
            edge_count,
        })
    }

    /// Number of vertices (links).
    pub fn vertex_count(&self) -> usize {
        self.successors.len()
    }

    /// Number of distinct dependency edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Links that some route enters directly after `link`.
    pub fn successors(&self, link: NocLinkId) -> &[NocLinkId] {
        self.successors.get(link).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns `true` if the graph contains a directed cycle.
    ///
    /// Depth-first search with an explicit stack of `(vertex, next
    /// successor)` frames. Each vertex is pushed at most once across all
    /// roots and each edge is followed once.
    pub fn has_cycles(&self) -> bool {
        let n = self.vertex_count();
        let mut visited: Arena<NocLinkId, bool> = Arena::filled(n, false);
        let mut on_stack: Arena<NocLinkId, bool> = Arena::filled(n, false);
        let mut stack: Vec<(NocLinkId, usize)> = Vec::new();

        for root in self.successors.keys() {
            if visited[root] {
                continue;
            }
            visited[root] = true;
            on_stack[root] = true;
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let (vertex, cursor) = *frame;
                match self.successors[vertex].get(cursor) {
                    Some(&next) => {
                        frame.1 += 1;
                        if on_stack[next] {
                            return true;
                        }
                        if !visited[next] {
                            visited[next] = true;
                            on_stack[next] = true;
                            stack.push((next, 0));
                        }
                    }
                    None => {
                        on_stack[vertex] = false;
                        stack.pop();
                    }
                }
            }
        }
        false
    }

    /// Returns the vertices in index order together with their successor
    /// counts.
    pub fn out_degrees(&self) -> impl Iterator<Item = (NocLinkId, usize)> + '_ {
        self.successors.iter().map(|(id, out)| (id, out.len()))
    }
}

/// Convenience for the common "is this routing deadlock-free" query.
pub fn routes_have_cycles<'a, I>(link_count: usize, routes: I) -> Result<bool, CdgError>
where
    I: IntoIterator<Item = &'a [NocLinkId]>,
{
    Ok(ChannelDependencyGraph::new(link_count, routes)?.has_cycles())
}
