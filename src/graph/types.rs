use std::fmt;

use eframe::egui::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    Inflow,
    Outflow,
}

impl FlowDirection {
    pub fn label(self) -> &'static str {
        match self {
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
        }
    }
}

/// How an edge is recorded when a new wallet shares a transaction id with an
/// existing one. The edge always runs from the existing wallet to the new one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InferredEdgePolicy {
    #[default]
    InflowToNew,
    OutflowFromExisting,
    Disabled,
}

impl InferredEdgePolicy {
    pub fn direction(self) -> Option<FlowDirection> {
        match self {
            Self::InflowToNew => Some(FlowDirection::Inflow),
            Self::OutflowFromExisting => Some(FlowDirection::Outflow),
            Self::Disabled => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransactionRef {
    pub id: String,
    pub amount: f64,
}

impl TransactionRef {
    pub fn new(id: impl Into<String>, amount: f64) -> Self {
        Self {
            id: id.into(),
            amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WalletNode {
    pub id: NodeId,
    pub address: String,
    pub amount: f64,
    pub entity_name: String,
    pub token_type: String,
    pub transaction_type: String,
    pub position: Vec2,
    pub transactions: Vec<TransactionRef>,
}

impl WalletNode {
    pub fn has_transaction(&self, transaction_id: &str) -> bool {
        self.transactions
            .iter()
            .any(|transaction| transaction.id == transaction_id)
    }

    pub(crate) fn matches_key(&self, key: &str) -> bool {
        self.address == key || self.id.to_string() == key
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub direction: FlowDirection,
    pub amount: f64,
    pub transaction_id: String,
    pub inferred: bool,
}

impl FlowEdge {
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// A wallet sighting as it arrives from the input layer.
#[derive(Clone, Debug, PartialEq)]
pub struct WalletSubmission {
    pub address: String,
    pub amount: f64,
    pub transactions: Vec<TransactionRef>,
    pub entity_name: String,
    pub token_type: String,
    pub transaction_type: String,
}

impl WalletSubmission {
    pub fn new(address: impl Into<String>, amount: f64) -> Self {
        Self {
            address: address.into(),
            amount,
            transactions: Vec::new(),
            entity_name: String::new(),
            token_type: String::new(),
            transaction_type: String::new(),
        }
    }

    pub fn with_transaction(mut self, id: impl Into<String>, amount: f64) -> Self {
        self.transactions.push(TransactionRef::new(id, amount));
        self
    }

    pub fn with_entity(mut self, entity_name: impl Into<String>) -> Self {
        self.entity_name = entity_name.into();
        self
    }

    pub fn with_token(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }

    pub fn with_transaction_type(mut self, transaction_type: impl Into<String>) -> Self {
        self.transaction_type = transaction_type.into();
        self
    }
}

/// An explicit edge request. `source` and `target` may name a node by id
/// (`w3`) or by address.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeSubmission {
    pub source: String,
    pub target: String,
    pub direction: FlowDirection,
    pub amount: f64,
    pub transaction_id: String,
}

impl EdgeSubmission {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        direction: FlowDirection,
        amount: f64,
        transaction_id: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            direction,
            amount,
            transaction_id: transaction_id.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeOutcome {
    Created { id: NodeId, inferred: Vec<EdgeId> },
    Merged { id: NodeId, added_transactions: usize },
}

impl NodeOutcome {
    pub fn id(&self) -> NodeId {
        match self {
            Self::Created { id, .. } | Self::Merged { id, .. } => *id,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeOutcome {
    Created(EdgeId),
    AlreadyLinked(EdgeId),
}
