//! Incremental traffic-flow route management.
//!
//! [`NocRouteManager`] owns the NoC fabric, the traffic flows with their
//! routes, the router block placement and the cost model. The placer drives
//! it with one move at a time:
//!
//! 1. [`reroute_affected`](NocRouteManager::reroute_affected) applies the
//!    block moves, reroutes every flow touching a moved block and returns
//!    the cost change;
//! 2. the placer accepts with [`commit`](NocRouteManager::commit) or rejects
//!    with [`revert`](NocRouteManager::revert), which restores routes, link
//!    usage and placement exactly as they were.

use crate::cost::{NocCostModel, NocCostTerms};
use crate::error::NocError;
use crate::transaction::{MoveTransaction, MovedRouterBlock, NocMoveDelta};
use noc_common::{InternalError, NocResult};
use noc_config::NocOpts;
use noc_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use noc_model::{
    ModelError, NocLinkId, NocRouterId, NocStorage, RouterBlockId, RouterBlocks, TrafficFlowId,
    TrafficFlows,
};
use noc_routing::{create_turn_model, ChannelDependencyGraph, RoutingError, TurnModel};
use std::collections::BTreeSet;

/// Relative tolerance for link usage checks.
const USAGE_TOLERANCE: f64 = 1.0e-9;

/// Builds the deadlock warning for a routing whose dependency graph is
/// cyclic, or `None` if it is acyclic.
fn cycle_warning(cdg: &ChannelDependencyGraph) -> Option<Diagnostic> {
    if !cdg.has_cycles() {
        return None;
    }
    let dependent = cdg.out_degrees().filter(|&(_, degree)| degree > 0).count();
    Some(
        Diagnostic::warning(
            DiagnosticCode::new(Category::Routing, 3),
            "the channel dependency graph of the initial routing has a cycle",
        )
        .with_note(format!(
            "{dependent} of {} links wait on another link ({} dependencies)",
            cdg.vertex_count(),
            cdg.edge_count()
        ))
        .with_help("the NoC may deadlock; choose a turn model that suits this topology"),
    )
}

/// Whether a route's bandwidth is being added to or removed from its links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkUsageUpdate {
    /// The route is being installed.
    Increment,
    /// The route is being uninstalled.
    Decrement,
}

/// Adds or removes `bandwidth` on every link of `route`.
///
/// Fails without touching any link if a decrement would drive a link's
/// usage negative; that means the route was never installed.
pub fn update_link_usage(
    noc: &mut NocStorage,
    route: &[NocLinkId],
    update: LinkUsageUpdate,
    bandwidth: f64,
) -> NocResult<()> {
    if update == LinkUsageUpdate::Decrement {
        for &id in route {
            let usage = noc.link(id).bandwidth_usage;
            if usage - bandwidth < -USAGE_TOLERANCE * bandwidth.max(1.0) {
                return Err(InternalError::new(format!(
                    "removing {bandwidth} from link {id} would leave negative usage {}",
                    usage - bandwidth
                )));
            }
        }
    }
    for &id in route {
        let link = noc.link_mut(id);
        link.bandwidth_usage = match update {
            LinkUsageUpdate::Increment => link.bandwidth_usage + bandwidth,
            LinkUsageUpdate::Decrement => (link.bandwidth_usage - bandwidth).max(0.0),
        };
    }
    Ok(())
}

/// Routes traffic flows and keeps link usage and costs in step with them.
pub struct NocRouteManager {
    noc: NocStorage,
    flows: TrafficFlows,
    blocks: RouterBlocks,
    model: Box<dyn TurnModel>,
    costs: NocCostModel,
    pending: Option<MoveTransaction>,
    routed: bool,
}

impl NocRouteManager {
    /// Creates a manager with the turn model selected by `opts`.
    ///
    /// Every flow must connect two existing router blocks and every block
    /// must sit on its own physical router.
    pub fn new(
        noc: NocStorage,
        flows: TrafficFlows,
        blocks: RouterBlocks,
        opts: &NocOpts,
    ) -> Result<Self, NocError> {
        for flow in flows.iter() {
            for block in [flow.source, flow.sink] {
                if !blocks.contains(block) {
                    return Err(ModelError::UnknownBlock(block).into());
                }
            }
        }
        for block in blocks.iter() {
            if noc.try_router(block.router).is_none() {
                return Err(ModelError::UnknownRouter(block.router).into());
            }
        }
        blocks.check_occupancy().map_err(NocError::Inconsistent)?;

        let costs = NocCostModel::new(flows.flow_count(), opts);
        Ok(Self {
            model: create_turn_model(opts.routing_algorithm, opts.tie_break),
            noc,
            flows,
            blocks,
            costs,
            pending: None,
            routed: false,
        })
    }

    /// Routes every flow from scratch, installs link usage, computes all
    /// costs and derives the normalization factors.
    ///
    /// Must run once before the first move.
    pub fn initial_noc_routing(&mut self, sink: &DiagnosticSink) -> Result<NocCostTerms, NocError> {
        if self.pending.is_some() {
            return Err(InternalError::new("initial routing requested with a move pending").into());
        }
        self.noc.reset_link_usage();
        let ids: Vec<_> = self.flows.ids().collect();
        for &id in &ids {
            self.flows.replace_route(id, Vec::new());
        }
        for id in ids {
            let route = match self.compute_route(id) {
                Ok(route) => route,
                Err(err) => {
                    self.report_unroutable(&err, sink);
                    return Err(err.into());
                }
            };
            update_link_usage(
                &mut self.noc,
                &route,
                LinkUsageUpdate::Increment,
                self.flows.flow(id).bandwidth,
            )?;
            self.flows.replace_route(id, route);
        }

        let totals = self.costs.reset_from_routes(&self.noc, &self.flows);
        self.costs.update_normalization_factors();
        self.routed = true;

        sink.emit(
            Diagnostic::note(
                DiagnosticCode::new(Category::Routing, 2),
                format!(
                    "routed {} traffic flows with {} routing",
                    self.flows.flow_count(),
                    self.model.name()
                ),
            )
            .with_note(format!("aggregate bandwidth cost: {}", totals.aggregate_bandwidth))
            .with_note(format!("latency cost: {}", totals.latency))
            .with_note(format!(
                "latency constraints met: {} of {}",
                self.latency_constraints_met(),
                self.flows.flow_count()
            )),
        );
        if let Some(warning) = cycle_warning(&self.channel_dependency_graph()?) {
            sink.emit(warning);
        }
        Ok(totals)
    }

    fn report_unroutable(&self, err: &RoutingError, sink: &DiagnosticSink) {
        sink.emit(
            Diagnostic::error(DiagnosticCode::new(Category::Routing, 1), err.to_string())
                .with_note(format!("turn model: {}", self.model.name())),
        );
    }

    fn compute_route(&self, flow: TrafficFlowId) -> Result<Vec<NocLinkId>, RoutingError> {
        let f = self.flows.flow(flow);
        noc_routing::route(
            &self.noc,
            self.model.as_ref(),
            self.blocks.router_of(f.source),
            self.blocks.router_of(f.sink),
            flow,
        )
    }

    /// Reroutes `flow` between the routers its blocks occupy now, swapping
    /// the new route's link usage in for the old one. Returns the old route.
    fn install_route(
        &mut self,
        flow: TrafficFlowId,
        txn: Option<&mut MoveTransaction>,
    ) -> Result<Vec<NocLinkId>, NocError> {
        let route = self.compute_route(flow)?;
        if let Some(txn) = txn {
            for &id in self.flows.route(flow).iter().chain(&route) {
                txn.save_usage(id, self.noc.link(id).bandwidth_usage);
            }
        }
        let bandwidth = self.flows.flow(flow).bandwidth;
        update_link_usage(
            &mut self.noc,
            self.flows.route(flow),
            LinkUsageUpdate::Decrement,
            bandwidth,
        )?;
        update_link_usage(&mut self.noc, &route, LinkUsageUpdate::Increment, bandwidth)?;
        Ok(self.flows.replace_route(flow, route))
    }

    /// Reroutes a single flow outside of any move and commits its new costs
    /// immediately. Returns the cost change.
    pub fn route_flow(&mut self, flow: TrafficFlowId) -> Result<NocCostTerms, NocError> {
        self.require_idle("route_flow")?;
        if self.flows.try_flow(flow).is_none() {
            return Err(NocError::Inconsistent(format!("unknown traffic flow {flow}")));
        }
        self.install_route(flow, None)?;
        let terms = self.costs.flow_terms(&self.noc, &self.flows, flow);
        let delta = self.costs.propose(flow, terms);
        self.costs.commit_flow(flow);
        Ok(delta)
    }

    fn require_idle(&self, operation: &str) -> NocResult<()> {
        if !self.routed {
            return Err(InternalError::new(format!(
                "{operation} called before initial NoC routing"
            )));
        }
        if self.pending.is_some() {
            return Err(InternalError::new(format!(
                "{operation} called while a move is pending"
            )));
        }
        Ok(())
    }

    /// Applies `moves`, reroutes every flow whose source or sink block was
    /// moved, and returns the resulting cost change.
    ///
    /// Each affected flow is rerouted once, in ascending flow ID order. The
    /// new routes and link usage are live until [`commit`](Self::commit) or
    /// [`revert`](Self::revert); the cost totals change only on commit. If a
    /// flow cannot be routed, everything done for this move is undone before
    /// the error is returned.
    pub fn reroute_affected(&mut self, moves: &[MovedRouterBlock]) -> Result<NocMoveDelta, NocError> {
        self.require_idle("reroute_affected")?;
        self.apply_moves(moves)?;

        let affected: BTreeSet<TrafficFlowId> = moves
            .iter()
            .flat_map(|mv| self.flows.associated_flows(mv.block).iter().copied())
            .collect();

        let mut txn = MoveTransaction::new(moves);
        for &flow in &affected {
            match self.install_route(flow, Some(&mut txn)) {
                Ok(old) => txn.old_routes.push((flow, old)),
                Err(err) => {
                    self.restore(txn)?;
                    return Err(err);
                }
            }
        }

        let mut delta = NocMoveDelta {
            flows_rerouted: txn.flows_rerouted(),
            ..NocMoveDelta::default()
        };
        for flow in txn.rerouted_flows() {
            let terms = self.costs.flow_terms(&self.noc, &self.flows, flow);
            let change = self.costs.propose(flow, terms);
            delta.aggregate_bandwidth_delta += change.aggregate_bandwidth;
            delta.latency_delta += change.latency;
        }
        self.pending = Some(txn);
        Ok(delta)
    }

    /// Validates `moves` against the current placement and applies them.
    ///
    /// Every block must be on its `from` router, no block or target router
    /// may appear twice, and a target router may only be occupied by a block
    /// that is itself moving away.
    fn apply_moves(&mut self, moves: &[MovedRouterBlock]) -> Result<(), NocError> {
        let moved: BTreeSet<RouterBlockId> = moves.iter().map(|mv| mv.block).collect();
        let targets: BTreeSet<NocRouterId> = moves.iter().map(|mv| mv.to).collect();
        if moved.len() != moves.len() || targets.len() != moves.len() {
            return Err(NocError::Inconsistent(
                "a move names the same router block or target router twice".to_string(),
            ));
        }
        for mv in moves {
            if !self.blocks.contains(mv.block) {
                return Err(ModelError::UnknownBlock(mv.block).into());
            }
            if self.noc.try_router(mv.to).is_none() {
                return Err(ModelError::UnknownRouter(mv.to).into());
            }
            let at = self.blocks.router_of(mv.block);
            if at != mv.from {
                return Err(NocError::Inconsistent(format!(
                    "router block {} is on router {at}, not {}",
                    mv.block, mv.from
                )));
            }
            if let Some(occupant) = self.blocks.occupant(mv.to) {
                if !moved.contains(&occupant) {
                    return Err(NocError::Inconsistent(format!(
                        "router {} holds router block {occupant}, which is not moving",
                        mv.to
                    )));
                }
            }
        }
        for mv in moves {
            self.blocks.relocate(mv.block, mv.to)?;
        }
        self.blocks.check_occupancy().map_err(InternalError::from)?;
        Ok(())
    }

    fn undo_moves(&mut self, moves: &[MovedRouterBlock]) -> NocResult<()> {
        for mv in moves.iter().rev() {
            self.blocks
                .relocate(mv.block, mv.from)
                .map_err(|e| InternalError::new(format!("cannot undo move: {e}")))?;
        }
        Ok(())
    }

    /// Puts back everything `txn` recorded: routes, link usage, placement
    /// and proposed costs.
    fn restore(&mut self, txn: MoveTransaction) -> NocResult<()> {
        for (flow, old) in txn.old_routes.into_iter().rev() {
            self.flows.replace_route(flow, old);
            self.costs.discard_flow(flow);
        }
        for (id, usage) in txn.old_usage {
            self.noc.link_mut(id).bandwidth_usage = usage;
        }
        self.undo_moves(&txn.moves)
    }

    /// Accepts the pending move. `flows_rerouted` must match the count
    /// [`reroute_affected`](Self::reroute_affected) reported.
    pub fn commit(&mut self, flows_rerouted: usize) -> NocResult<()> {
        let txn = self
            .pending
            .take()
            .ok_or_else(|| InternalError::new("commit called with no move pending"))?;
        if txn.flows_rerouted() != flows_rerouted {
            let message = format!(
                "commit of {flows_rerouted} flows but the pending move rerouted {}",
                txn.flows_rerouted()
            );
            self.pending = Some(txn);
            return Err(InternalError::new(message));
        }
        for flow in txn.rerouted_flows() {
            self.costs.commit_flow(flow);
        }
        Ok(())
    }

    /// Rejects the pending move, which must be the one made of `moves`.
    ///
    /// Routes and link usage are restored from the transaction buffer
    /// without rerouting, so the result is bit-identical to the state before
    /// the move.
    pub fn revert(&mut self, moves: &[MovedRouterBlock]) -> NocResult<()> {
        let txn = self
            .pending
            .take()
            .ok_or_else(|| InternalError::new("revert called with no move pending"))?;
        if txn.moves != moves {
            self.pending = Some(txn);
            return Err(InternalError::new(
                "revert called with moves that differ from the pending move",
            ));
        }
        self.restore(txn)
    }

    /// Returns `true` while a move awaits commit or revert.
    pub fn has_pending_move(&self) -> bool {
        self.pending.is_some()
    }

    /// Recomputes both cost totals from the current routes.
    pub fn recompute_costs_from_scratch(&self) -> NocCostTerms {
        self.costs.recompute(&self.noc, &self.flows)
    }

    /// Checks the running cost totals against a full recomputation.
    ///
    /// Only valid between moves: a pending move's routes are already
    /// installed but its delta is not yet in the totals.
    pub fn check_costs(&self) -> Result<(), NocError> {
        self.require_idle("check_costs")?;
        self.costs.check_costs(self.recompute_costs_from_scratch())
    }

    /// Replaces the running totals with a full recomputation, warning on
    /// `sink` if they had drifted. Returns the new totals.
    pub fn resync_costs(&mut self, sink: &DiagnosticSink) -> NocResult<NocCostTerms> {
        self.require_idle("resync_costs")?;
        let recomputed = self.recompute_costs_from_scratch();
        self.costs.resync(recomputed, sink);
        Ok(recomputed)
    }

    /// Re-derives the cost normalization factors from the running totals.
    pub fn update_normalization_factors(&mut self) {
        self.costs.update_normalization_factors();
    }

    /// Builds the channel dependency graph of the current routes.
    pub fn channel_dependency_graph(&self) -> Result<ChannelDependencyGraph, NocError> {
        Ok(ChannelDependencyGraph::new(
            self.noc.link_count(),
            self.flows.routes(),
        )?)
    }

    /// Returns `true` if the current routes could deadlock.
    pub fn has_cycles(&self) -> Result<bool, NocError> {
        Ok(self.channel_dependency_graph()?.has_cycles())
    }

    /// Recomputes every link's usage from the routes and compares it with
    /// the stored usage.
    pub fn verify_link_usage(&self) -> NocResult<()> {
        let mut expected = vec![0.0_f64; self.noc.link_count()];
        for flow in self.flows.iter() {
            for &id in self.flows.route(flow.id) {
                let slot = expected.get_mut(id.as_raw() as usize).ok_or_else(|| {
                    InternalError::new(format!("flow {} routes over unknown link {id}", flow.id))
                })?;
                *slot += flow.bandwidth;
            }
        }
        for (link, want) in self.noc.links().zip(expected) {
            let tolerance = USAGE_TOLERANCE * want.abs().max(1.0);
            if (link.bandwidth_usage - want).abs() > tolerance {
                return Err(InternalError::new(format!(
                    "link {} has usage {} but its routes need {want}",
                    link.id, link.bandwidth_usage
                )));
            }
        }
        Ok(())
    }

    /// Checks that every route runs contiguously from the router of its
    /// flow's source block to the router of its sink block.
    pub fn verify_routes(&self) -> NocResult<()> {
        for flow in self.flows.iter() {
            let mut at = self.blocks.router_of(flow.source);
            let route = self.flows.route(flow.id);
            for pair in route.windows(2) {
                if pair[0] == pair[1] {
                    return Err(InternalError::new(format!(
                        "flow {} uses link {} twice in a row",
                        flow.id, pair[0]
                    )));
                }
            }
            for &id in route {
                let link = self
                    .noc
                    .try_link(id)
                    .ok_or_else(|| InternalError::new(format!("flow {} uses unknown link {id}", flow.id)))?;
                if link.src != at {
                    return Err(InternalError::new(format!(
                        "flow {} route is broken at link {id}: expected to leave router {at}",
                        flow.id
                    )));
                }
                at = link.dst;
            }
            if at != self.blocks.router_of(flow.sink) {
                return Err(InternalError::new(format!(
                    "flow {} route ends at router {at}, not at its sink",
                    flow.id
                )));
            }
        }
        Ok(())
    }

    /// Number of flows whose current route meets their latency constraint.
    /// Unconstrained flows always count.
    pub fn latency_constraints_met(&self) -> usize {
        self.flows
            .iter()
            .filter(|flow| match flow.max_latency {
                Some(max) => crate::cost::route_latency(&self.noc, self.flows.route(flow.id)) <= max,
                None => true,
            })
            .count()
    }

    /// [`NocCostModel::weighted_cost`] of the running totals.
    pub fn weighted_cost(&self) -> f64 {
        self.costs.weighted_cost(self.costs.totals())
    }

    /// The NoC fabric.
    pub fn noc(&self) -> &NocStorage {
        &self.noc
    }

    /// The traffic flows and their routes.
    pub fn flows(&self) -> &TrafficFlows {
        &self.flows
    }

    /// The router block placement.
    pub fn blocks(&self) -> &RouterBlocks {
        &self.blocks
    }

    /// The cost model.
    pub fn costs(&self) -> &NocCostModel {
        &self.costs
    }

    /// Configuration name of the active turn model.
    pub fn routing_algorithm(&self) -> &'static str {
        self.model.name()
    }

    /// Physical router a block currently occupies.
    pub fn router_of(&self, block: RouterBlockId) -> NocRouterId {
        self.blocks.router_of(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noc_common::Interner;
    use noc_model::{GridLoc, MeshParams};

    fn r(i: u32) -> NocRouterId {
        NocRouterId::from_raw(i)
    }

    /// 3x3 mesh, one block per router, flows 0->8, 2->6 and 4->5.
    fn grid_manager() -> NocRouteManager {
        let noc = NocStorage::mesh(3, 3, MeshParams::default());
        let interner = Interner::new();
        let mut blocks = RouterBlocks::new(noc.router_count());
        let ids: Vec<_> = (0..9)
            .map(|i| {
                blocks
                    .add_block(interner.get_or_intern(&format!("rb{i}")), r(i))
                    .unwrap()
            })
            .collect();
        let mut flows = TrafficFlows::new();
        for (s, t, bw) in [(0, 8, 1.0e8), (2, 6, 2.0e8), (4, 5, 5.0e7)] {
            flows
                .add_flow(interner.get_or_intern("flow"), ids[s], ids[t], bw, Some(2.0e-8), 1)
                .unwrap();
        }
        NocRouteManager::new(noc, flows, blocks, &NocOpts::default()).unwrap()
    }

    fn routed() -> NocRouteManager {
        let mut m = grid_manager();
        m.initial_noc_routing(&DiagnosticSink::new()).unwrap();
        m
    }

    #[test]
    fn update_link_usage_round_trip() {
        let mut noc = NocStorage::mesh(2, 1, MeshParams::default());
        let route = vec![noc.find_link(r(0), r(1)).unwrap()];
        update_link_usage(&mut noc, &route, LinkUsageUpdate::Increment, 3.0).unwrap();
        assert_eq!(noc.link(route[0]).bandwidth_usage, 3.0);
        update_link_usage(&mut noc, &route, LinkUsageUpdate::Decrement, 3.0).unwrap();
        assert_eq!(noc.link(route[0]).bandwidth_usage, 0.0);
    }

    #[test]
    fn update_link_usage_rejects_negative() {
        let mut noc = NocStorage::mesh(3, 1, MeshParams::default());
        let route = vec![
            noc.find_link(r(0), r(1)).unwrap(),
            noc.find_link(r(1), r(2)).unwrap(),
        ];
        noc.link_mut(route[0]).bandwidth_usage = 5.0;
        assert!(update_link_usage(&mut noc, &route, LinkUsageUpdate::Decrement, 1.0).is_err());
        // nothing was touched
        assert_eq!(noc.link(route[0]).bandwidth_usage, 5.0);
    }

    #[test]
    fn initial_routing_installs_everything() {
        let sink = DiagnosticSink::new();
        let mut m = grid_manager();
        let totals = m.initial_noc_routing(&sink).unwrap();
        m.verify_link_usage().unwrap();
        m.verify_routes().unwrap();
        assert!(!m.has_cycles().unwrap());
        assert_eq!(totals, m.recompute_costs_from_scratch());
        // 1e8 * 4 + 2e8 * 4 + 5e7 * 1
        assert!((totals.aggregate_bandwidth - 1.25e9).abs() < 1.0);
        assert_eq!(m.costs().normalization().aggregate_bandwidth, 1.0 / totals.aggregate_bandwidth);
        assert!(!sink.has_errors());
        assert_eq!(sink.diagnostics()[0].code.to_string(), "R002");
    }

    #[test]
    fn operations_require_initial_routing() {
        let mut m = grid_manager();
        let flow = TrafficFlowId::from_raw(0);
        assert!(matches!(m.route_flow(flow), Err(NocError::Internal(_))));
        assert!(matches!(m.reroute_affected(&[]), Err(NocError::Internal(_))));
    }

    #[test]
    fn reroute_then_commit() {
        let mut m = routed();
        let block = RouterBlockId::from_raw(4);
        // swap the center block rb4 with the corner block rb6
        let moves = [
            MovedRouterBlock { block, from: r(4), to: r(6) },
            MovedRouterBlock { block: RouterBlockId::from_raw(6), from: r(6), to: r(4) },
        ];
        let before = m.recompute_costs_from_scratch();
        let delta = m.reroute_affected(&moves).unwrap();
        // flow 1 (2->6) and flow 2 (4->5)
        assert_eq!(delta.flows_rerouted, 2);
        assert!(m.has_pending_move());
        m.verify_link_usage().unwrap();
        m.verify_routes().unwrap();

        m.commit(delta.flows_rerouted).unwrap();
        let after = m.recompute_costs_from_scratch();
        assert!((after.aggregate_bandwidth - before.aggregate_bandwidth - delta.aggregate_bandwidth_delta).abs() < 1e-3);
        assert!((after.latency - before.latency - delta.latency_delta).abs() < 1e-18);
        m.check_costs().unwrap();
        assert_eq!(m.router_of(block), r(6));
    }

    #[test]
    fn revert_restores_exactly() {
        let mut m = routed();
        let routes_before: Vec<Vec<NocLinkId>> = m.flows().routes().map(<[_]>::to_vec).collect();
        let usage_before: Vec<f64> = m.noc().links().map(|l| l.bandwidth_usage).collect();
        let totals_before = m.costs().totals();

        // swap rb8 with rb7: only flow 0 (0->8) is affected
        let moves = [
            MovedRouterBlock { block: RouterBlockId::from_raw(8), from: r(8), to: r(7) },
            MovedRouterBlock { block: RouterBlockId::from_raw(7), from: r(7), to: r(8) },
        ];
        let delta = m.reroute_affected(&moves).unwrap();
        assert_eq!(delta.flows_rerouted, 1);
        m.revert(&moves).unwrap();

        let routes_after: Vec<Vec<NocLinkId>> = m.flows().routes().map(<[_]>::to_vec).collect();
        let usage_after: Vec<f64> = m.noc().links().map(|l| l.bandwidth_usage).collect();
        assert_eq!(routes_before, routes_after);
        assert_eq!(usage_before, usage_after);
        assert_eq!(totals_before, m.costs().totals());
        assert_eq!(m.router_of(RouterBlockId::from_raw(8)), r(8));
        assert!(m.blocks().check_occupancy().is_ok());
        assert!(!m.has_pending_move());
    }

    #[test]
    fn pending_move_blocks_another() {
        let mut m = routed();
        let moves = [
            MovedRouterBlock { block: RouterBlockId::from_raw(1), from: r(1), to: r(3) },
            MovedRouterBlock { block: RouterBlockId::from_raw(3), from: r(3), to: r(1) },
        ];
        let delta = m.reroute_affected(&moves).unwrap();
        assert_eq!(delta.flows_rerouted, 0);
        assert!(matches!(m.reroute_affected(&moves), Err(NocError::Internal(_))));
        assert!(matches!(m.route_flow(TrafficFlowId::from_raw(0)), Err(NocError::Internal(_))));
        assert!(m.commit(5).is_err());
        assert!(m.has_pending_move());
        m.commit(0).unwrap();
        assert!(m.commit(0).is_err());
        assert!(m.revert(&moves).is_err());
    }

    #[test]
    fn cycle_warning_counts_dependent_links() {
        let l = |raw: &[u32]| raw.iter().copied().map(NocLinkId::from_raw).collect::<Vec<_>>();
        // 0 -> 1 -> 2 -> 0, link 3 is unused
        let ring = [l(&[0, 1]), l(&[1, 2]), l(&[2, 0])];
        let cdg = ChannelDependencyGraph::new(4, ring.iter().map(Vec::as_slice)).unwrap();
        let warning = cycle_warning(&cdg).unwrap();
        assert_eq!(warning.code.to_string(), "R003");
        assert_eq!(warning.notes, vec!["3 of 4 links wait on another link (3 dependencies)"]);

        let chain = [l(&[0, 1, 2])];
        let cdg = ChannelDependencyGraph::new(4, chain.iter().map(Vec::as_slice)).unwrap();
        assert!(cycle_warning(&cdg).is_none());
    }

    #[test]
    fn cost_checks_refused_while_move_pending() {
        let mut m = routed();
        let totals_before = m.costs().totals();
        // rb5 to the far corner: flow 2 (4->5) gets longer
        let moves = [
            MovedRouterBlock { block: RouterBlockId::from_raw(5), from: r(5), to: r(0) },
            MovedRouterBlock { block: RouterBlockId::from_raw(0), from: r(0), to: r(5) },
        ];
        let delta = m.reroute_affected(&moves).unwrap();
        assert!(delta.aggregate_bandwidth_delta != 0.0);

        let sink = DiagnosticSink::new();
        assert!(matches!(m.check_costs(), Err(NocError::Internal(_))));
        assert!(m.resync_costs(&sink).is_err());
        assert_eq!(sink.warning_count(), 0);
        assert_eq!(m.costs().totals(), totals_before);
        assert!(m.has_pending_move());

        m.commit(delta.flows_rerouted).unwrap();
        m.check_costs().unwrap();
        assert_eq!(m.resync_costs(&sink).unwrap(), m.costs().totals());
        assert_eq!(sink.warning_count(), 0);
    }

    #[test]
    fn revert_with_wrong_moves_keeps_pending() {
        let mut m = routed();
        let moves = [
            MovedRouterBlock { block: RouterBlockId::from_raw(0), from: r(0), to: r(1) },
            MovedRouterBlock { block: RouterBlockId::from_raw(1), from: r(1), to: r(0) },
        ];
        m.reroute_affected(&moves).unwrap();
        assert!(m.revert(&moves[..1]).is_err());
        assert!(m.has_pending_move());
        m.revert(&moves).unwrap();
    }

    #[test]
    fn stale_move_rejected_without_side_effects() {
        let mut m = routed();
        let bad = [MovedRouterBlock { block: RouterBlockId::from_raw(0), from: r(3), to: r(1) }];
        assert!(matches!(m.reroute_affected(&bad), Err(NocError::Inconsistent(_))));
        // a half swap would put two blocks on router 1
        let half = [MovedRouterBlock { block: RouterBlockId::from_raw(0), from: r(0), to: r(1) }];
        assert!(matches!(m.reroute_affected(&half), Err(NocError::Inconsistent(_))));
        assert_eq!(m.router_of(RouterBlockId::from_raw(0)), r(0));
        assert!(m.blocks().check_occupancy().is_ok());
        assert!(!m.has_pending_move());
    }

    #[test]
    fn routing_failure_rolls_back_the_move() {
        // 1x3 line with an isolated fourth router at (5, 5)
        let mut noc = NocStorage::mesh(3, 1, MeshParams::default());
        let island = noc.add_router(99, GridLoc::new(5, 5), 1.0e-9).unwrap();
        let interner = Interner::new();
        let mut blocks = RouterBlocks::new(noc.router_count());
        let a = blocks.add_block(interner.get_or_intern("a"), r(0)).unwrap();
        let b = blocks.add_block(interner.get_or_intern("b"), r(2)).unwrap();
        let mut flows = TrafficFlows::new();
        flows.add_flow(interner.get_or_intern("ab"), a, b, 1.0, None, 1).unwrap();
        flows.add_flow(interner.get_or_intern("ba"), b, a, 1.0, None, 1).unwrap();
        let mut m = NocRouteManager::new(noc, flows, blocks, &NocOpts::default()).unwrap();
        m.initial_noc_routing(&DiagnosticSink::new()).unwrap();
        let usage_before: Vec<f64> = m.noc().links().map(|l| l.bandwidth_usage).collect();

        let moves = [MovedRouterBlock { block: b, from: r(2), to: island }];
        assert!(matches!(m.reroute_affected(&moves), Err(NocError::Routing(_))));
        assert!(!m.has_pending_move());
        assert_eq!(m.router_of(b), r(2));
        let usage_after: Vec<f64> = m.noc().links().map(|l| l.bandwidth_usage).collect();
        assert_eq!(usage_before, usage_after);
        m.verify_routes().unwrap();
        m.check_costs().unwrap();
    }

    #[test]
    fn initial_routing_reports_unroutable_flow() {
        let mut noc = NocStorage::mesh(2, 1, MeshParams::default());
        let island = noc.add_router(50, GridLoc::new(4, 4), 0.0).unwrap();
        let interner = Interner::new();
        let mut blocks = RouterBlocks::new(noc.router_count());
        let a = blocks.add_block(interner.get_or_intern("a"), r(0)).unwrap();
        let b = blocks.add_block(interner.get_or_intern("b"), island).unwrap();
        let mut flows = TrafficFlows::new();
        flows.add_flow(interner.get_or_intern("ab"), a, b, 1.0, None, 1).unwrap();
        let mut m = NocRouteManager::new(noc, flows, blocks, &NocOpts::default()).unwrap();

        let sink = DiagnosticSink::new();
        assert!(matches!(
            m.initial_noc_routing(&sink),
            Err(NocError::Routing(RoutingError::Unroutable { .. }))
        ));
        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.diagnostics()[0].code.to_string(), "R001");
    }

    #[test]
    fn new_rejects_unknown_block() {
        let noc = NocStorage::mesh(2, 1, MeshParams::default());
        let interner = Interner::new();
        let mut blocks = RouterBlocks::new(noc.router_count());
        let a = blocks.add_block(interner.get_or_intern("a"), r(0)).unwrap();
        let mut flows = TrafficFlows::new();
        flows
            .add_flow(interner.get_or_intern("f"), a, RouterBlockId::from_raw(7), 1.0, None, 1)
            .unwrap();
        assert!(matches!(
            NocRouteManager::new(noc, flows, blocks, &NocOpts::default()),
            Err(NocError::Model(ModelError::UnknownBlock(_)))
        ));
    }

    #[test]
    fn route_flow_is_idempotent_on_fixed_placement() {
        let mut m = routed();
        let flow = TrafficFlowId::from_raw(1);
        let before = m.flows().route(flow).to_vec();
        let delta = m.route_flow(flow).unwrap();
        assert_eq!(delta, NocCostTerms::default());
        assert_eq!(m.flows().route(flow), before.as_slice());
        m.verify_link_usage().unwrap();
        m.check_costs().unwrap();
    }

    #[test]
    fn latency_constraints_counted() {
        let m = routed();
        // 4-hop routes: 5 routers + 4 links at 1ns each = 9ns, within 20ns
        assert_eq!(m.latency_constraints_met(), 3);
    }

    #[test]
    fn weighted_cost_uses_normalized_totals() {
        let m = routed();
        let opts = NocOpts::default();
        // both normalized terms are 1 right after initial routing
        let expected = opts.placement_weighting * (opts.aggregate_bandwidth_weighting + 1.0);
        assert!((m.weighted_cost() - expected).abs() < 1e-9);
    }
}
