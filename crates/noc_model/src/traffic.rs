//! Traffic flow registry.
//!
//! Flows are loaded once and never change. Each flow's route lives next to
//! it, indexed by the same [`TrafficFlowId`], and is replaced wholesale by
//! [`TrafficFlows::replace_route`] whenever the flow is rerouted.

use crate::error::ModelError;
use crate::ids::{NocLinkId, RouterBlockId, TrafficFlowId};
use noc_common::{Arena, Ident};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A communication requirement between two router blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficFlow {
    /// Dense ID of this flow.
    pub id: TrafficFlowId,
    /// Interned flow name.
    pub name: Ident,
    /// Block the traffic originates at.
    pub source: RouterBlockId,
    /// Block the traffic is delivered to.
    pub sink: RouterBlockId,
    /// Required bandwidth (bits per second).
    pub bandwidth: f64,
    /// Upper bound on route latency (seconds), if constrained.
    pub max_latency: Option<f64>,
    /// Cost multiplier for this flow.
    pub priority: u32,
}

/// All traffic flows of the design and their current routes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrafficFlows {
    flows: Arena<TrafficFlowId, TrafficFlow>,
    routes: Arena<TrafficFlowId, Vec<NocLinkId>>,
    #[serde(skip)]
    flows_by_block: HashMap<RouterBlockId, Vec<TrafficFlowId>>,
}

impl TrafficFlows {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a flow with an empty route and returns its ID.
    pub fn add_flow(
        &mut self,
        name: Ident,
        source: RouterBlockId,
        sink: RouterBlockId,
        bandwidth: f64,
        max_latency: Option<f64>,
        priority: u32,
    ) -> Result<TrafficFlowId, ModelError> {
        if source == sink {
            return Err(ModelError::SelfFlow(source));
        }
        if !bandwidth.is_finite() || bandwidth < 0.0 {
            return Err(ModelError::InvalidValue {
                what: "flow bandwidth",
                value: bandwidth,
            });
        }
        if let Some(latency) = max_latency {
            if !latency.is_finite() || latency <= 0.0 {
                return Err(ModelError::InvalidValue {
                    what: "flow max latency",
                    value: latency,
                });
            }
        }
        if priority == 0 {
            return Err(ModelError::InvalidValue {
                what: "flow priority",
                value: 0.0,
            });
        }

        let id = self.flows.alloc(TrafficFlow {
            id: TrafficFlowId::INVALID,
            name,
            source,
            sink,
            bandwidth,
            max_latency,
            priority,
        });
        self.flows[id].id = id;
        self.routes.alloc(Vec::new());
        self.index_flow(id, source, sink);
        Ok(id)
    }

    fn index_flow(&mut self, id: TrafficFlowId, source: RouterBlockId, sink: RouterBlockId) {
        self.flows_by_block.entry(source).or_default().push(id);
        self.flows_by_block.entry(sink).or_default().push(id);
    }

    /// Returns the flow with the given ID.
    pub fn flow(&self, id: TrafficFlowId) -> &TrafficFlow {
        &self.flows[id]
    }

    /// Returns the flow with the given ID, or `None` if out of range.
    pub fn try_flow(&self, id: TrafficFlowId) -> Option<&TrafficFlow> {
        self.flows.get(id)
    }

    /// Returns the current route of a flow. Empty until the flow is routed.
    pub fn route(&self, id: TrafficFlowId) -> &[NocLinkId] {
        &self.routes[id]
    }

    /// Installs `route` as the flow's route and hands back the old one.
    pub fn replace_route(&mut self, id: TrafficFlowId, route: Vec<NocLinkId>) -> Vec<NocLinkId> {
        std::mem::replace(&mut self.routes[id], route)
    }

    /// Returns the flows whose source or sink is `block`, in ID order.
    pub fn associated_flows(&self, block: RouterBlockId) -> &[TrafficFlowId] {
        self.flows_by_block.get(&block).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the number of flows.
    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    /// Returns `true` if no flows are registered.
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Iterates over all flows in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &TrafficFlow> {
        self.flows.values()
    }

    /// Iterates over all flow IDs.
    pub fn ids(&self) -> impl Iterator<Item = TrafficFlowId> {
        self.flows.keys()
    }

    /// Iterates over all current routes, in flow ID order.
    pub fn routes(&self) -> impl Iterator<Item = &[NocLinkId]> {
        self.routes.values().map(Vec::as_slice)
    }

    /// Rebuilds the block-to-flow index after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.flows_by_block.clear();
        let endpoints: Vec<_> = self.flows.iter().map(|(id, f)| (id, f.source, f.sink)).collect();
        for (id, source, sink) in endpoints {
            self.index_flow(id, source, sink);
        }
    }
}
