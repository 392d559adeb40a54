mod error;
mod placement;
mod search;
mod store;
mod types;

pub use error::GraphError;
pub use placement::{Placement, PlacementBranch, PositionAllocator};
pub use store::GraphStore;
pub use types::{
    EdgeId, EdgeOutcome, EdgeSubmission, FlowDirection, FlowEdge, InferredEdgePolicy, NodeId,
    NodeOutcome, TransactionRef, WalletNode, WalletSubmission,
};
