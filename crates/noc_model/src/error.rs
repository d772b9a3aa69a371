//! Errors raised while building the NoC model.

use crate::ids::{NocRouterId, RouterBlockId};

/// An inconsistency in the routers, links, flows or blocks handed to the
/// model. These come from the external loader and are reported to it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Two physical routers share a user-facing ID.
    #[error("duplicate NoC router id {0}")]
    DuplicateRouterId(u32),

    /// A router ID does not name a router of this NoC.
    #[error("unknown NoC router {0}")]
    UnknownRouter(NocRouterId),

    /// A router block ID does not name a block of this design.
    #[error("unknown router block {0}")]
    UnknownBlock(RouterBlockId),

    /// A second link between the same ordered router pair.
    #[error("duplicate link from router {src} to router {dst}")]
    DuplicateLink {
        /// Source router of the link.
        src: NocRouterId,
        /// Destination router of the link.
        dst: NocRouterId,
    },

    /// A link whose source and destination are the same router.
    #[error("link from router {0} to itself")]
    SelfLink(NocRouterId),

    /// A traffic flow whose source and sink are the same block.
    #[error("traffic flow from router block {0} to itself")]
    SelfFlow(RouterBlockId),

    /// A numeric attribute outside its legal range.
    #[error("invalid {what}: {value}")]
    InvalidValue {
        /// The attribute (e.g. "link bandwidth").
        what: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A block was placed on a router that already holds another block.
    #[error("router {router} already holds router block {occupant}")]
    RouterOccupied {
        /// The contested router.
        router: NocRouterId,
        /// The block already placed there.
        occupant: RouterBlockId,
    },
}
