use anyhow::{Context, Result};
use serde::Serialize;

use crate::controller::GraphSnapshot;
use crate::graph::FlowDirection;
use crate::viewport::Viewport;

use super::batch::TransactionRecord;

#[derive(Debug, Serialize)]
struct NodeExport<'a> {
    id: String,
    address: &'a str,
    amount: f64,
    entity_name: &'a str,
    token_type: &'a str,
    transaction_type: &'a str,
    x: f32,
    y: f32,
    transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Serialize)]
struct EdgeExport<'a> {
    id: String,
    source: String,
    target: String,
    #[serde(rename = "type")]
    direction: FlowDirection,
    amount: f64,
    transaction_id: &'a str,
    inferred: bool,
}

#[derive(Debug, Serialize)]
struct SnapshotExport<'a> {
    nodes: Vec<NodeExport<'a>>,
    edges: Vec<EdgeExport<'a>>,
    viewport: Viewport,
    selected: Option<String>,
}

/// Pretty JSON of the renderer snapshot, positions included.
pub fn snapshot_json(snapshot: &GraphSnapshot<'_>) -> Result<String> {
    let export = SnapshotExport {
        nodes: snapshot
            .nodes
            .iter()
            .map(|node| NodeExport {
                id: node.id.to_string(),
                address: &node.address,
                amount: node.amount,
                entity_name: &node.entity_name,
                token_type: &node.token_type,
                transaction_type: &node.transaction_type,
                x: node.position.x,
                y: node.position.y,
                transactions: node
                    .transactions
                    .iter()
                    .map(|transaction| TransactionRecord {
                        tx_amount: transaction.amount,
                        transaction_id: transaction.id.clone(),
                    })
                    .collect(),
            })
            .collect(),
        edges: snapshot
            .edges
            .iter()
            .map(|edge| EdgeExport {
                id: edge.id.to_string(),
                source: edge.source.to_string(),
                target: edge.target.to_string(),
                direction: edge.direction,
                amount: edge.amount,
                transaction_id: &edge.transaction_id,
                inferred: edge.inferred,
            })
            .collect(),
        viewport: snapshot.viewport,
        selected: snapshot.selected.map(|id| id.to_string()),
    };

    serde_json::to_string_pretty(&export).context("failed to serialize graph snapshot")
}
