use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::controller::{Applied, Command, Controller};
use crate::graph::{
    EdgeOutcome, EdgeSubmission, FlowDirection, GraphError, NodeOutcome, TransactionRef,
    WalletSubmission,
};

const SAMPLE_BATCH: &str = include_str!("../../data/sample.json");

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub tx_amount: f64,
    pub transaction_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub beneficiary_address: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
    #[serde(default)]
    pub entity_name: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub transaction_type: String,
}

impl WalletRecord {
    /// A missing amount is rejected rather than read as zero.
    pub fn into_submission(self) -> Result<WalletSubmission, GraphError> {
        let Some(amount) = self.amount else {
            return Err(GraphError::MissingAmount {
                address: self.beneficiary_address,
            });
        };

        Ok(WalletSubmission {
            address: self.beneficiary_address,
            amount,
            transactions: self
                .transactions
                .into_iter()
                .map(|record| TransactionRef::new(record.transaction_id, record.tx_amount))
                .collect(),
            entity_name: self.entity_name,
            token_type: self.token_type,
            transaction_type: self.transaction_type,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub direction: FlowDirection,
    pub amount: f64,
    pub transaction_id: String,
}

impl From<EdgeRecord> for EdgeSubmission {
    fn from(record: EdgeRecord) -> Self {
        EdgeSubmission::new(
            record.source,
            record.target,
            record.direction,
            record.amount,
            record.transaction_id,
        )
    }
}

/// Wallets and explicit edges to feed into the graph. Wallets are applied
/// before edges so edges can name wallets from the same batch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletBatch {
    #[serde(default)]
    pub wallets: Vec<WalletRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl WalletBatch {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid wallet batch JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read wallet batch {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn sample() -> Result<Self> {
        Self::parse(SAMPLE_BATCH).context("bundled sample batch is malformed")
    }
}

/// Where the initial batch comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchSource {
    Empty,
    Sample,
    File(PathBuf),
}

impl BatchSource {
    pub fn load(&self) -> Result<WalletBatch> {
        match self {
            Self::Empty => Ok(WalletBatch::default()),
            Self::Sample => WalletBatch::sample(),
            Self::File(path) => WalletBatch::load(path),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Empty => "empty graph".to_owned(),
            Self::Sample => "bundled sample".to_owned(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    pub created: usize,
    pub merged: usize,
    pub inferred_edges: usize,
    pub explicit_edges: usize,
    pub already_linked: usize,
    pub rejected: Vec<GraphError>,
}

pub fn apply_batch(controller: &mut Controller, batch: WalletBatch) -> BatchReport {
    let mut report = BatchReport::default();

    let wallet_commands = batch
        .wallets
        .into_iter()
        .map(|record| record.into_submission().map(Command::SubmitWallet));
    let edge_commands = batch
        .edges
        .into_iter()
        .map(|record| Ok(Command::SubmitEdge(record.into())));

    for command in wallet_commands.chain(edge_commands) {
        let outcome = command.and_then(|command| controller.apply(command));
        match outcome {
            Ok(Applied::Node(NodeOutcome::Created { inferred, .. })) => {
                report.created += 1;
                report.inferred_edges += inferred.len();
            }
            Ok(Applied::Node(NodeOutcome::Merged { .. })) => report.merged += 1,
            Ok(Applied::Edge(EdgeOutcome::Created(_))) => report.explicit_edges += 1,
            Ok(Applied::Edge(EdgeOutcome::AlreadyLinked(_))) => report.already_linked += 1,
            Ok(_) => {}
            Err(error) => {
                warn!(%error, "rejected batch entry");
                report.rejected.push(error);
            }
        }
    }

    info!(
        created = report.created,
        merged = report.merged,
        inferred_edges = report.inferred_edges,
        explicit_edges = report.explicit_edges,
        already_linked = report.already_linked,
        rejected = report.rejected.len(),
        "applied wallet batch"
    );
    report
}
