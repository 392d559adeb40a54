mod force;
mod overlap;
mod tree;

use std::collections::HashMap;
use std::time::Instant;

use eframe::egui::Vec2;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::AppConfig;
use crate::graph::{FlowEdge, NodeId, WalletNode};

pub use force::force_layout;
pub use overlap::resolve_overlaps;
pub use tree::tree_layout;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Hierarchical placement from root wallets outward.
    Tree,
    /// Spring/repulsion simulation seeded with the current positions.
    Force,
    /// Overlap cleanup only.
    Declutter,
}

impl LayoutKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Tree => "Tree",
            Self::Force => "Force",
            Self::Declutter => "Declutter",
        }
    }
}

fn index_edges(nodes: &[WalletNode], edges: &[FlowEdge]) -> Vec<(usize, usize)> {
    let index_by_id = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id, index))
        .collect::<HashMap<_, _>>();

    edges
        .iter()
        .filter_map(|edge| {
            let source = index_by_id.get(&edge.source)?;
            let target = index_by_id.get(&edge.target)?;
            Some((*source, *target))
        })
        .collect()
}

/// Runs one full layout pass over a snapshot. The snapshot is not modified;
/// the result holds a position for every node, in input order, ready to be
/// applied as one batch.
pub fn compute_layout(
    kind: LayoutKind,
    nodes: &[WalletNode],
    edges: &[FlowEdge],
    config: &AppConfig,
) -> Vec<(NodeId, Vec2)> {
    let started = Instant::now();
    let indexed_edges = index_edges(nodes, edges);
    let current = nodes.iter().map(|node| node.position).collect::<Vec<_>>();

    let positions = match kind {
        LayoutKind::Tree => {
            tree_layout(nodes.len(), &indexed_edges, &config.tree, &config.overlap)
        }
        LayoutKind::Force => force_layout(&current, &indexed_edges, &config.force),
        LayoutKind::Declutter => resolve_overlaps(&current, &config.overlap),
    };

    info!(
        layout = kind.label(),
        nodes = nodes.len(),
        edges = indexed_edges.len(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "layout pass finished"
    );

    nodes
        .iter()
        .zip(positions)
        .map(|(node, position)| (node.id, position))
        .collect()
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::graph::{EdgeSubmission, FlowDirection, GraphStore, WalletSubmission};

    fn sample_store() -> GraphStore {
        let mut store = GraphStore::with_seed(&AppConfig::default(), 5);
        for (address, tx) in [("A", "t1"), ("B", "t1"), ("C", "t2"), ("D", "t3")] {
            store
                .add_node(WalletSubmission::new(address, 1.0).with_transaction(tx, 1.0))
                .unwrap();
        }
        store
            .add_edge(EdgeSubmission::new("B", "C", FlowDirection::Outflow, 1.0, "t2"))
            .unwrap();
        store
    }

    #[test]
    fn tree_layout_covers_every_node_in_order() {
        let store = sample_store();
        let layout = compute_layout(
            LayoutKind::Tree,
            store.nodes(),
            store.edges(),
            &AppConfig::default(),
        );

        let ids = layout.iter().map(|(id, _)| *id).collect::<Vec<_>>();
        let expected = store.nodes().iter().map(|node| node.id).collect::<Vec<_>>();
        assert_eq!(ids, expected);

        // A -> B -> C chain, D alone.
        assert_eq!(layout[0].1, vec2(150.0, 100.0));
        assert_eq!(layout[1].1, vec2(400.0, 100.0));
        assert_eq!(layout[2].1, vec2(650.0, 100.0));
        assert_eq!(layout[3].1, vec2(150.0, 250.0));
    }

    #[test]
    fn tree_layout_ignores_current_positions() {
        let mut first = sample_store();
        let second = sample_store();
        let id = first.nodes()[0].id;
        first.update_node_position(id, vec2(-999.0, 999.0)).unwrap();

        let config = AppConfig::default();
        assert_eq!(
            compute_layout(LayoutKind::Tree, first.nodes(), first.edges(), &config),
            compute_layout(LayoutKind::Tree, second.nodes(), second.edges(), &config)
        );
    }

    #[test]
    fn declutter_keeps_clear_layouts() {
        let mut store = sample_store();
        let spread = store
            .nodes()
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id, vec2(index as f32 * 500.0, 0.0)))
            .collect::<Vec<_>>();
        store.apply_positions(&spread).unwrap();

        let layout = compute_layout(
            LayoutKind::Declutter,
            store.nodes(),
            store.edges(),
            &AppConfig::default(),
        );
        assert_eq!(layout, spread);
    }

    #[test]
    fn force_layout_returns_one_position_per_node() {
        let store = sample_store();
        let layout = compute_layout(
            LayoutKind::Force,
            store.nodes(),
            store.edges(),
            &AppConfig::default(),
        );
        assert_eq!(layout.len(), store.node_count());
        assert!(layout.iter().all(|(_, position)| position.is_finite()));
    }
}
