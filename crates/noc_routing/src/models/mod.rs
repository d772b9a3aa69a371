//! The turn-model variants and the factory that selects one from config.

mod negative_first;
mod north_last;
mod odd_even;
mod west_first;
mod xy;

pub use negative_first::NegativeFirstRouting;
pub use north_last::NorthLastRouting;
pub use odd_even::OddEvenRouting;
pub use west_first::WestFirstRouting;
pub use xy::XyRouting;

use crate::turn_model::TurnModel;
use noc_config::{RoutingAlgorithm, TieBreak};

/// Creates the turn model selected by `algorithm`.
pub fn create_turn_model(algorithm: RoutingAlgorithm, tie_break: TieBreak) -> Box<dyn TurnModel> {
    match algorithm {
        RoutingAlgorithm::Xy => Box::new(XyRouting::new(tie_break)),
        RoutingAlgorithm::WestFirst => Box::new(WestFirstRouting::new(tie_break)),
        RoutingAlgorithm::NorthLast => Box::new(NorthLastRouting::new(tie_break)),
        RoutingAlgorithm::NegativeFirst => Box::new(NegativeFirstRouting::new(tie_break)),
        RoutingAlgorithm::OddEven => Box::new(OddEvenRouting::new(tie_break)),
    }
}
