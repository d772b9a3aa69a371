//! NoC cost functions and the incrementally maintained cost totals.
//!
//! Every flow contributes an aggregate-bandwidth term and a latency term.
//! The totals are running sums: a committed reroute subtracts the flow's old
//! terms and adds its new ones. A full recomputation only happens when the
//! placer asks for a consistency check.

use crate::error::{CostTerm, NocError};
use crate::transaction::NocMoveDelta;
use noc_common::Arena;
use noc_config::NocOpts;
use noc_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use noc_model::{NocLinkId, NocStorage, TrafficFlow, TrafficFlowId, TrafficFlows};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

/// Ceiling on the aggregate-bandwidth normalization factor.
pub const MAX_INV_NOC_AGGREGATE_BANDWIDTH_COST: f64 = 1.0;
/// Ceiling on the latency normalization factor.
pub const MAX_INV_NOC_LATENCY_COST: f64 = 1.0e12;
/// Latency totals below this are too small to compare meaningfully.
pub const MIN_EXPECTED_NOC_LATENCY_COST: f64 = 1.0e-12;

/// The two NoC cost components, for one flow or summed over all of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NocCostTerms {
    /// Aggregate-bandwidth cost.
    pub aggregate_bandwidth: f64,
    /// Latency cost, including the constraint-violation penalty.
    pub latency: f64,
}

impl Add for NocCostTerms {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            aggregate_bandwidth: self.aggregate_bandwidth + rhs.aggregate_bandwidth,
            latency: self.latency + rhs.latency,
        }
    }
}

impl Sub for NocCostTerms {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            aggregate_bandwidth: self.aggregate_bandwidth - rhs.aggregate_bandwidth,
            latency: self.latency - rhs.latency,
        }
    }
}

impl AddAssign for NocCostTerms {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// `bandwidth × hops × priority`.
pub fn aggregate_bandwidth_cost(route: &[NocLinkId], flow: &TrafficFlow) -> f64 {
    flow.bandwidth * route.len() as f64 * f64::from(flow.priority)
}

/// Latency a packet accumulates along `route`: the first router's latency,
/// then each link's latency plus the latency of the router it enters.
///
/// An empty route (source and sink on the same router) has zero latency.
pub fn route_latency(noc: &NocStorage, route: &[NocLinkId]) -> f64 {
    let Some(&first) = route.first() else {
        return 0.0;
    };
    let start = noc.router(noc.link(first).src).latency;
    route.iter().fold(start, |acc, &id| {
        let link = noc.link(id);
        acc + link.latency + noc.router(link.dst).latency
    })
}

/// `priority × (latency_w × latency + constraint_w × max(0, latency − max_latency))`.
///
/// Flows without a latency constraint pay no constraint term.
pub fn latency_cost(measured_latency: f64, flow: &TrafficFlow, opts: &NocOpts) -> f64 {
    let overshoot = flow
        .max_latency
        .map_or(0.0, |max| (measured_latency - max).max(0.0));
    f64::from(flow.priority)
        * (opts.latency_weighting * measured_latency
            + opts.latency_constraints_weighting * overshoot)
}

/// Both cost terms of `flow` routed along `route`.
pub fn flow_cost_terms(
    noc: &NocStorage,
    route: &[NocLinkId],
    flow: &TrafficFlow,
    opts: &NocOpts,
) -> NocCostTerms {
    NocCostTerms {
        aggregate_bandwidth: aggregate_bandwidth_cost(route, flow),
        latency: latency_cost(route_latency(noc, route), flow, opts),
    }
}

fn relative_mismatch(incremental: f64, recomputed: f64, tolerance: f64) -> bool {
    (incremental - recomputed).abs() > recomputed.abs() * tolerance
}

/// Per-flow costs, running totals and normalization factors.
#[derive(Debug, Clone)]
pub struct NocCostModel {
    opts: NocOpts,
    committed: Arena<TrafficFlowId, NocCostTerms>,
    proposed: Arena<TrafficFlowId, NocCostTerms>,
    totals: NocCostTerms,
    normalization: NocCostTerms,
}

impl NocCostModel {
    /// Creates a model for `flow_count` flows with all costs at zero.
    pub fn new(flow_count: usize, opts: &NocOpts) -> Self {
        Self {
            opts: opts.clone(),
            committed: Arena::filled(flow_count, NocCostTerms::default()),
            proposed: Arena::filled(flow_count, NocCostTerms::default()),
            totals: NocCostTerms::default(),
            normalization: NocCostTerms {
                aggregate_bandwidth: MAX_INV_NOC_AGGREGATE_BANDWIDTH_COST,
                latency: MAX_INV_NOC_LATENCY_COST,
            },
        }
    }

    /// The options the model weighs costs with.
    pub fn opts(&self) -> &NocOpts {
        &self.opts
    }

    /// Cost terms of `flow` on its current route.
    pub fn flow_terms(&self, noc: &NocStorage, flows: &TrafficFlows, flow: TrafficFlowId) -> NocCostTerms {
        flow_cost_terms(noc, flows.route(flow), flows.flow(flow), &self.opts)
    }

    /// Sums every flow's cost terms from the current routes.
    pub fn recompute(&self, noc: &NocStorage, flows: &TrafficFlows) -> NocCostTerms {
        flows.ids().fold(NocCostTerms::default(), |acc, id| {
            acc + self.flow_terms(noc, flows, id)
        })
    }

    /// Replaces every committed per-flow cost and the totals with values
    /// computed from the current routes.
    pub fn reset_from_routes(&mut self, noc: &NocStorage, flows: &TrafficFlows) -> NocCostTerms {
        let mut totals = NocCostTerms::default();
        for id in flows.ids() {
            let terms = self.flow_terms(noc, flows, id);
            self.committed[id] = terms;
            self.proposed[id] = terms;
            totals += terms;
        }
        self.totals = totals;
        totals
    }

    /// Committed cost terms of one flow.
    pub fn committed(&self, flow: TrafficFlowId) -> NocCostTerms {
        self.committed[flow]
    }

    /// Records `terms` as the proposed costs of `flow` and returns the change
    /// relative to its committed costs.
    pub fn propose(&mut self, flow: TrafficFlowId, terms: NocCostTerms) -> NocCostTerms {
        self.proposed[flow] = terms;
        terms - self.committed[flow]
    }

    /// Folds the proposed costs of `flow` into the committed costs and
    /// totals.
    pub fn commit_flow(&mut self, flow: TrafficFlowId) {
        let delta = self.proposed[flow] - self.committed[flow];
        self.totals += delta;
        self.committed[flow] = self.proposed[flow];
    }

    /// Drops the proposed costs of `flow`.
    pub fn discard_flow(&mut self, flow: TrafficFlowId) {
        self.proposed[flow] = self.committed[flow];
    }

    /// Running cost totals over all flows.
    pub fn totals(&self) -> NocCostTerms {
        self.totals
    }

    /// Current normalization factors.
    pub fn normalization(&self) -> NocCostTerms {
        self.normalization
    }

    /// Re-derives the normalization factors from the current totals:
    /// `min(1 / total, ceiling)` per term. A zero total gives the ceiling.
    pub fn update_normalization_factors(&mut self) {
        let inverse = |total: f64, ceiling: f64| {
            if total > 0.0 {
                (1.0 / total).min(ceiling)
            } else {
                ceiling
            }
        };
        self.normalization = NocCostTerms {
            aggregate_bandwidth: inverse(
                self.totals.aggregate_bandwidth,
                MAX_INV_NOC_AGGREGATE_BANDWIDTH_COST,
            ),
            latency: inverse(self.totals.latency, MAX_INV_NOC_LATENCY_COST),
        };
    }

    /// The single scalar the placer adds to its own cost for `terms`.
    pub fn weighted_cost(&self, terms: NocCostTerms) -> f64 {
        self.opts.placement_weighting
            * (self.opts.aggregate_bandwidth_weighting
                * terms.aggregate_bandwidth
                * self.normalization.aggregate_bandwidth
                + terms.latency * self.normalization.latency)
    }

    /// [`weighted_cost`](Self::weighted_cost) of a move's cost change.
    pub fn weighted_delta(&self, delta: &NocMoveDelta) -> f64 {
        self.weighted_cost(NocCostTerms {
            aggregate_bandwidth: delta.aggregate_bandwidth_delta,
            latency: delta.latency_delta,
        })
    }

    /// Compares the running totals against `recomputed` with the configured
    /// relative tolerance.
    ///
    /// The latency comparison is skipped when the recomputed latency total
    /// is below [`MIN_EXPECTED_NOC_LATENCY_COST`].
    pub fn check_costs(&self, recomputed: NocCostTerms) -> Result<(), NocError> {
        let tolerance = self.opts.cost_tolerance;
        if relative_mismatch(
            self.totals.aggregate_bandwidth,
            recomputed.aggregate_bandwidth,
            tolerance,
        ) {
            return Err(NocError::CostDrift {
                term: CostTerm::AggregateBandwidth,
                incremental: self.totals.aggregate_bandwidth,
                recomputed: recomputed.aggregate_bandwidth,
            });
        }
        if recomputed.latency >= MIN_EXPECTED_NOC_LATENCY_COST
            && relative_mismatch(self.totals.latency, recomputed.latency, tolerance)
        {
            return Err(NocError::CostDrift {
                term: CostTerm::Latency,
                incremental: self.totals.latency,
                recomputed: recomputed.latency,
            });
        }
        Ok(())
    }

    /// Adopts `recomputed` as the running totals, reporting a warning when
    /// it differs from them beyond tolerance.
    pub fn resync(&mut self, recomputed: NocCostTerms, sink: &DiagnosticSink) {
        if let Err(err) = self.check_costs(recomputed) {
            sink.emit(
                Diagnostic::warning(DiagnosticCode::new(Category::Cost, 1), err.to_string())
                    .with_note(format!(
                        "aggregate bandwidth: incremental {}, recomputed {}",
                        self.totals.aggregate_bandwidth, recomputed.aggregate_bandwidth
                    ))
                    .with_note(format!(
                        "latency: incremental {}, recomputed {}",
                        self.totals.latency, recomputed.latency
                    ))
                    .with_help("continuing with the recomputed totals"),
            );
        }
        self.totals = recomputed;
    }
}
