use thiserror::Error;

use super::types::NodeId;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum GraphError {
    #[error("wallet address must not be empty")]
    EmptyAddress,

    #[error("invalid {field}: {value} (expected a finite, non-negative number)")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("wallet {address} has no amount")]
    MissingAmount { address: String },

    #[error("edge endpoint {endpoint} does not match any wallet id or address")]
    UnresolvedEndpoint { endpoint: String },

    #[error("unknown node {0}")]
    UnknownNode(NodeId),
}

pub(super) fn check_amount(field: &'static str, value: f64) -> Result<f64, GraphError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(GraphError::InvalidAmount { field, value })
    }
}
