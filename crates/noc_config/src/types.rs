//! Configuration types deserialized from `noc.toml`.

use serde::Deserialize;
use std::fmt;

/// The top-level configuration file.
#[derive(Debug, Default, Deserialize)]
pub struct NocConfig {
    /// NoC routing and cost options.
    #[serde(default)]
    pub noc: NocOpts,
}

/// Options for NoC-aware placement.
///
/// ```toml
/// [noc]
/// routing_algorithm = "negative_first"
/// tie_break = "priority"
/// placement_weighting = 0.6
/// aggregate_bandwidth_weighting = 0.38
/// latency_weighting = 0.02
/// latency_constraints_weighting = 0.6
/// swap_percentage = 10
/// cost_tolerance = 0.01
/// placement_file = "design.noc.place"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NocOpts {
    /// Turn model used to route every traffic flow.
    pub routing_algorithm: RoutingAlgorithm,
    /// How a turn model picks among several legal directions.
    pub tie_break: TieBreak,
    /// Scale of the whole NoC cost relative to the placer's own cost.
    pub placement_weighting: f64,
    /// Weight of the aggregate-bandwidth term inside the NoC cost.
    pub aggregate_bandwidth_weighting: f64,
    /// Weight of a flow's measured latency in its latency cost.
    pub latency_weighting: f64,
    /// Weight of a flow's latency-constraint overshoot in its latency cost.
    pub latency_constraints_weighting: f64,
    /// Percentage of placer moves that should be router block swaps.
    pub swap_percentage: u32,
    /// Relative tolerance when checking incremental costs against a full
    /// recomputation.
    pub cost_tolerance: f64,
    /// Where to write the final router block placement, if anywhere.
    pub placement_file: Option<String>,
}

impl Default for NocOpts {
    fn default() -> Self {
        Self {
            routing_algorithm: RoutingAlgorithm::default(),
            tie_break: TieBreak::default(),
            placement_weighting: 0.6,
            aggregate_bandwidth_weighting: 0.38,
            latency_weighting: 0.02,
            latency_constraints_weighting: 0.6,
            swap_percentage: 0,
            cost_tolerance: 0.01,
            placement_file: None,
        }
    }
}

/// The turn-restriction variant used to route traffic flows.
///
/// The `*_routing` aliases accept the option spellings used by existing
/// NoC flows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingAlgorithm {
    /// Dimension-order routing: all X travel, then all Y travel.
    #[serde(alias = "xy_routing")]
    Xy,
    /// No turns into West; westward travel happens first.
    #[serde(alias = "west_first_routing")]
    WestFirst,
    /// No turns out of North; northward travel happens last.
    #[serde(alias = "north_last_routing")]
    NorthLast,
    /// No turns from a negative direction into a positive one.
    #[default]
    #[serde(alias = "negative_first_routing")]
    NegativeFirst,
    /// Chiu's odd-even turn model (turn restrictions depend on column parity).
    #[serde(alias = "odd_even_routing")]
    OddEven,
}

impl RoutingAlgorithm {
    /// Every supported algorithm, in declaration order.
    pub const ALL: [RoutingAlgorithm; 5] = [
        RoutingAlgorithm::Xy,
        RoutingAlgorithm::WestFirst,
        RoutingAlgorithm::NorthLast,
        RoutingAlgorithm::NegativeFirst,
        RoutingAlgorithm::OddEven,
    ];

    /// Returns the configuration spelling of this algorithm.
    pub fn as_str(self) -> &'static str {
        match self {
            RoutingAlgorithm::Xy => "xy",
            RoutingAlgorithm::WestFirst => "west_first",
            RoutingAlgorithm::NorthLast => "north_last",
            RoutingAlgorithm::NegativeFirst => "negative_first",
            RoutingAlgorithm::OddEven => "odd_even",
        }
    }
}

impl fmt::Display for RoutingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a turn model picks one direction when several are legal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The first legal direction in the model's fixed priority order.
    #[default]
    Priority,
    /// A pseudo-random legal direction derived from a hash of the flow and
    /// router IDs. Spreads flows across minimal paths while staying
    /// reproducible.
    Hashed,
}
