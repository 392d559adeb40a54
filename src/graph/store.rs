use std::collections::{HashMap, HashSet};

use eframe::egui::Vec2;
use tracing::{debug, info, warn};

use crate::config::AppConfig;

use super::error::{GraphError, check_amount};
use super::placement::{Placement, PositionAllocator};
use super::search::search_nodes;
use super::types::{
    EdgeId, EdgeOutcome, EdgeSubmission, FlowDirection, FlowEdge, InferredEdgePolicy, NodeId,
    NodeOutcome, TransactionRef, WalletNode, WalletSubmission,
};

const DEFAULT_ENTITY_NAME: &str = "Unknown";

fn pair_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}

struct Connection {
    node: NodeId,
    position: Vec2,
    transaction_id: String,
    amount: f64,
}

/// Canonical wallet graph. Nodes keep insertion order, which the tree layout
/// relies on for determinism.
pub struct GraphStore {
    nodes: Vec<WalletNode>,
    edges: Vec<FlowEdge>,
    index_by_id: HashMap<NodeId, usize>,
    index_by_address: HashMap<String, usize>,
    linked_pairs: HashMap<(NodeId, NodeId), EdgeId>,
    selected: Option<NodeId>,
    allocator: PositionAllocator,
    inferred_edges: InferredEdgePolicy,
    next_node_id: u64,
    next_edge_id: u64,
}

impl GraphStore {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_allocator(config, PositionAllocator::new(config.placement))
    }

    pub fn with_seed(config: &AppConfig, seed: u64) -> Self {
        Self::with_allocator(config, PositionAllocator::with_seed(config.placement, seed))
    }

    fn with_allocator(config: &AppConfig, allocator: PositionAllocator) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            index_by_id: HashMap::new(),
            index_by_address: HashMap::new(),
            linked_pairs: HashMap::new(),
            selected: None,
            allocator,
            inferred_edges: config.graph.inferred_edges,
            next_node_id: 1,
            next_edge_id: 1,
        }
    }

    pub fn nodes(&self) -> &[WalletNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&WalletNode> {
        self.index_by_id.get(&id).map(|&index| &self.nodes[index])
    }

    pub fn node_by_address(&self, address: &str) -> Option<&WalletNode> {
        self.index_by_address
            .get(address)
            .map(|&index| &self.nodes[index])
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<NodeId>) -> Result<(), GraphError> {
        if let Some(id) = id
            && !self.index_by_id.contains_key(&id)
        {
            return Err(GraphError::UnknownNode(id));
        }
        self.selected = id;
        Ok(())
    }

    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.linked_pairs.get(&pair_key(a, b)).copied()
    }

    pub fn inflows(&self, id: NodeId) -> impl Iterator<Item = &FlowEdge> + '_ {
        self.edges
            .iter()
            .filter(move |edge| edge.target == id && edge.direction == FlowDirection::Inflow)
    }

    pub fn outflows(&self, id: NodeId) -> impl Iterator<Item = &FlowEdge> + '_ {
        self.edges
            .iter()
            .filter(move |edge| edge.source == id && edge.direction == FlowDirection::Outflow)
    }

    pub fn search(&self, query: &str) -> Vec<NodeId> {
        search_nodes(&self.nodes, query)
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.nodes.iter().map(|node| node.position).collect()
    }

    /// Creates a wallet on first sighting of its address, otherwise merges the
    /// submission into the existing wallet.
    pub fn add_node(&mut self, submission: WalletSubmission) -> Result<NodeOutcome, GraphError> {
        if submission.address.trim().is_empty() {
            warn!("rejected wallet submission with empty address");
            return Err(GraphError::EmptyAddress);
        }

        let amount = check_amount("wallet amount", submission.amount)?;
        let mut seen = HashSet::new();
        let mut transactions = Vec::with_capacity(submission.transactions.len());
        for transaction in submission.transactions {
            check_amount("transaction amount", transaction.amount)?;
            if seen.insert(transaction.id.clone()) {
                transactions.push(transaction);
            }
        }

        if let Some(&index) = self.index_by_address.get(&submission.address) {
            let node = &mut self.nodes[index];
            let mut added_transactions = 0;
            for transaction in transactions {
                if !node.has_transaction(&transaction.id) {
                    node.transactions.push(transaction);
                    added_transactions += 1;
                }
            }
            node.amount = amount;

            debug!(
                id = %node.id,
                address = %node.address,
                added_transactions,
                "merged wallet submission"
            );
            return Ok(NodeOutcome::Merged {
                id: node.id,
                added_transactions,
            });
        }

        let connections = self.connections_for(&transactions);
        let placement = self.place_new_node(&connections);

        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let entity_name = if submission.entity_name.trim().is_empty() {
            DEFAULT_ENTITY_NAME.to_owned()
        } else {
            submission.entity_name
        };

        let index = self.nodes.len();
        self.index_by_id.insert(id, index);
        self.index_by_address
            .insert(submission.address.clone(), index);
        self.nodes.push(WalletNode {
            id,
            address: submission.address,
            amount,
            entity_name,
            token_type: submission.token_type,
            transaction_type: submission.transaction_type,
            position: placement.position,
            transactions,
        });

        let mut inferred = Vec::new();
        if let Some(direction) = self.inferred_edges.direction() {
            for connection in connections {
                if self.edge_between(connection.node, id).is_some() {
                    continue;
                }
                let edge_id = self.insert_edge(
                    connection.node,
                    id,
                    direction,
                    connection.amount,
                    connection.transaction_id,
                    true,
                );
                inferred.push(edge_id);
            }
        }

        debug!(
            %id,
            address = %self.nodes[index].address,
            branch = ?placement.branch,
            inferred_edges = inferred.len(),
            "created wallet node"
        );
        Ok(NodeOutcome::Created { id, inferred })
    }

    /// Existing wallets sharing at least one transaction id with the
    /// submission, in insertion order. The first shared transaction (in
    /// submission order) is the one an inferred edge records.
    fn connections_for(&self, transactions: &[TransactionRef]) -> Vec<Connection> {
        self.nodes
            .iter()
            .filter_map(|node| {
                transactions
                    .iter()
                    .find(|transaction| node.has_transaction(&transaction.id))
                    .map(|shared| Connection {
                        node: node.id,
                        position: node.position,
                        transaction_id: shared.id.clone(),
                        amount: shared.amount,
                    })
            })
            .collect()
    }

    fn place_new_node(&mut self, connections: &[Connection]) -> Placement {
        let existing = self.positions();
        let connecting = connections
            .iter()
            .map(|connection| connection.position)
            .collect::<Vec<_>>();
        self.allocator
            .place_near_connections(&existing, &connecting)
    }

    pub fn add_edge(&mut self, submission: EdgeSubmission) -> Result<EdgeOutcome, GraphError> {
        let amount = check_amount("edge amount", submission.amount)?;

        let Some(source) = self.resolve(&submission.source) else {
            warn!(endpoint = %submission.source, "edge source did not resolve");
            return Err(GraphError::UnresolvedEndpoint {
                endpoint: submission.source,
            });
        };
        let Some(target) = self.resolve(&submission.target) else {
            warn!(endpoint = %submission.target, "edge target did not resolve");
            return Err(GraphError::UnresolvedEndpoint {
                endpoint: submission.target,
            });
        };

        if let Some(existing) = self.edge_between(source, target) {
            debug!(%source, %target, edge = %existing, "edge pair already linked");
            return Ok(EdgeOutcome::AlreadyLinked(existing));
        }

        let edge_id = self.insert_edge(
            source,
            target,
            submission.direction,
            amount,
            submission.transaction_id,
            false,
        );
        debug!(%source, %target, edge = %edge_id, "created edge");
        Ok(EdgeOutcome::Created(edge_id))
    }

    /// First wallet in insertion order whose address or displayed id equals
    /// `key`.
    fn resolve(&self, key: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|node| node.matches_key(key))
            .map(|node| node.id)
    }

    fn insert_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        direction: FlowDirection,
        amount: f64,
        transaction_id: String,
        inferred: bool,
    ) -> EdgeId {
        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;

        self.linked_pairs.insert(pair_key(source, target), id);
        self.edges.push(FlowEdge {
            id,
            source,
            target,
            direction,
            amount,
            transaction_id,
            inferred,
        });
        id
    }

    pub fn update_node_position(&mut self, id: NodeId, position: Vec2) -> Result<(), GraphError> {
        let Some(&index) = self.index_by_id.get(&id) else {
            return Err(GraphError::UnknownNode(id));
        };
        self.nodes[index].position = position;
        Ok(())
    }

    /// Writes a whole layout at once. Every id is checked before any position
    /// changes, so a failed batch leaves the graph untouched.
    pub fn apply_positions(&mut self, positions: &[(NodeId, Vec2)]) -> Result<usize, GraphError> {
        if let Some((missing, _)) = positions
            .iter()
            .find(|(id, _)| !self.index_by_id.contains_key(id))
        {
            return Err(GraphError::UnknownNode(*missing));
        }

        for (id, position) in positions {
            let index = self.index_by_id[id];
            self.nodes[index].position = *position;
        }
        Ok(positions.len())
    }

    pub fn clear(&mut self) {
        info!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "clearing graph"
        );
        self.nodes.clear();
        self.edges.clear();
        self.index_by_id.clear();
        self.index_by_address.clear();
        self.linked_pairs.clear();
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use pretty_assertions::assert_eq;

    use super::*;

    fn store() -> GraphStore {
        GraphStore::with_seed(&AppConfig::default(), 11)
    }

    fn wallet(address: &str, amount: f64, tx: &str) -> WalletSubmission {
        WalletSubmission::new(address, amount)
            .with_transaction(tx, amount)
            .with_entity("Entity")
            .with_token("BTC")
            .with_transaction_type("Normal")
    }

    #[test]
    fn shared_transaction_creates_inferred_inflow() {
        let mut store = store();
        let a = store.add_node(wallet("A", 1.0, "t1")).unwrap();
        assert!(matches!(a, NodeOutcome::Created { ref inferred, .. } if inferred.is_empty()));
        assert_eq!(store.node_count(), 1);
        assert_eq!(store.edge_count(), 0);

        let b = store
            .add_node(WalletSubmission::new("B", 0.5).with_transaction("t1", 1.0))
            .unwrap();
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.edge_count(), 1);

        let edge = &store.edges()[0];
        assert_eq!(edge.source, a.id());
        assert_eq!(edge.target, b.id());
        assert_eq!(edge.direction, FlowDirection::Inflow);
        assert_eq!(edge.transaction_id, "t1");
        assert_eq!(edge.amount, 1.0);
        assert!(edge.inferred);
    }

    #[test]
    fn resubmission_merges_and_overwrites_amount() {
        let mut store = store();
        let first = store.add_node(wallet("A", 1.0, "t1")).unwrap();
        let second = store
            .add_node(
                WalletSubmission::new("A", 3.0)
                    .with_transaction("t1", 1.0)
                    .with_transaction("t2", 2.0),
            )
            .unwrap();

        assert_eq!(
            second,
            NodeOutcome::Merged {
                id: first.id(),
                added_transactions: 1
            }
        );
        let node = store.node_by_address("A").unwrap();
        assert_eq!(node.amount, 3.0);
        assert_eq!(node.entity_name, "Entity");
        let ids = node
            .transactions
            .iter()
            .map(|transaction| transaction.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn identical_resubmission_is_a_noop() {
        let mut store = store();
        store.add_node(wallet("A", 1.0, "t1")).unwrap();
        let before = store.nodes().to_vec();
        let outcome = store.add_node(wallet("A", 1.0, "t1")).unwrap();
        assert!(matches!(
            outcome,
            NodeOutcome::Merged {
                added_transactions: 0,
                ..
            }
        ));
        assert_eq!(store.nodes(), before.as_slice());
    }

    #[test]
    fn duplicate_transactions_in_one_submission_are_dropped() {
        let mut store = store();
        store
            .add_node(
                WalletSubmission::new("A", 1.0)
                    .with_transaction("t1", 1.0)
                    .with_transaction("t1", 1.0),
            )
            .unwrap();
        assert_eq!(store.node_by_address("A").unwrap().transactions.len(), 1);
    }

    #[test]
    fn blank_entity_defaults_to_unknown() {
        let mut store = store();
        store.add_node(WalletSubmission::new("A", 1.0)).unwrap();
        assert_eq!(store.node_by_address("A").unwrap().entity_name, "Unknown");
    }

    #[test]
    fn invalid_submissions_are_rejected() {
        let mut store = store();
        assert_eq!(
            store.add_node(WalletSubmission::new("  ", 1.0)),
            Err(GraphError::EmptyAddress)
        );
        assert!(matches!(
            store.add_node(WalletSubmission::new("A", f64::NAN)),
            Err(GraphError::InvalidAmount { .. })
        ));
        assert!(matches!(
            store.add_node(WalletSubmission::new("A", -1.0)),
            Err(GraphError::InvalidAmount { .. })
        ));
        assert!(matches!(
            store.add_node(WalletSubmission::new("A", 1.0).with_transaction("t", f64::INFINITY)),
            Err(GraphError::InvalidAmount { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn edge_endpoints_resolve_by_address_or_id() {
        let mut store = store();
        let a = store.add_node(wallet("A", 1.0, "t1")).unwrap().id();
        let b = store.add_node(wallet("B", 1.0, "t2")).unwrap().id();

        let outcome = store
            .add_edge(EdgeSubmission::new(
                "A",
                b.to_string(),
                FlowDirection::Outflow,
                0.4,
                "t9",
            ))
            .unwrap();
        let EdgeOutcome::Created(edge_id) = outcome else {
            panic!("expected a new edge, got {outcome:?}");
        };
        assert_eq!(store.edge_between(a, b), Some(edge_id));
        assert_eq!(store.outflows(a).count(), 1);
        assert_eq!(store.inflows(b).count(), 0);
    }

    #[test]
    fn endpoint_key_takes_earliest_matching_wallet() {
        let mut store = store();
        let first = store.add_node(wallet("A", 1.0, "t1")).unwrap().id();
        let named_like_first = store.add_node(wallet("w1", 1.0, "t2")).unwrap().id();
        let c = store.add_node(wallet("C", 1.0, "t3")).unwrap().id();
        assert_eq!(first.to_string(), "w1");

        store
            .add_edge(EdgeSubmission::new("w1", "C", FlowDirection::Outflow, 1.0, "t4"))
            .unwrap();

        let edge = &store.edges()[0];
        assert_eq!(edge.source, first);
        assert_eq!(edge.target, c);
        assert_eq!(store.edge_between(named_like_first, c), None);
    }

    #[test]
    fn reverse_edge_is_already_linked() {
        let mut store = store();
        store.add_node(wallet("A", 1.0, "t1")).unwrap();
        store.add_node(wallet("B", 1.0, "t2")).unwrap();

        let first = store
            .add_edge(EdgeSubmission::new("A", "B", FlowDirection::Outflow, 1.0, "x"))
            .unwrap();
        let second = store
            .add_edge(EdgeSubmission::new("B", "A", FlowDirection::Inflow, 2.0, "y"))
            .unwrap();

        let EdgeOutcome::Created(id) = first else {
            panic!("expected a new edge, got {first:?}");
        };
        assert_eq!(second, EdgeOutcome::AlreadyLinked(id));
        assert_eq!(store.edge_count(), 1);
    }

    #[test]
    fn unresolved_endpoint_is_reported() {
        let mut store = store();
        store.add_node(wallet("A", 1.0, "t1")).unwrap();
        let result = store.add_edge(EdgeSubmission::new(
            "A",
            "missing",
            FlowDirection::Inflow,
            1.0,
            "t1",
        ));
        assert_eq!(
            result,
            Err(GraphError::UnresolvedEndpoint {
                endpoint: "missing".to_owned()
            })
        );
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn inferred_edge_skips_already_linked_pairs() {
        let mut store = store();
        store.add_node(wallet("A", 1.0, "t1")).unwrap();
        store.add_node(wallet("B", 1.0, "t2")).unwrap();
        store
            .add_edge(EdgeSubmission::new("A", "B", FlowDirection::Outflow, 1.0, "t1"))
            .unwrap();

        // B already exists, so this merges and infers nothing.
        store.add_node(wallet("B", 1.0, "t1")).unwrap();
        assert_eq!(store.edge_count(), 1);
    }

    #[test]
    fn disabled_policy_infers_nothing() {
        let mut config = AppConfig::default();
        config.graph.inferred_edges = InferredEdgePolicy::Disabled;
        let mut store = GraphStore::with_seed(&config, 1);
        store.add_node(wallet("A", 1.0, "t1")).unwrap();
        store.add_node(wallet("B", 1.0, "t1")).unwrap();
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn outflow_policy_records_outflow() {
        let mut config = AppConfig::default();
        config.graph.inferred_edges = InferredEdgePolicy::OutflowFromExisting;
        let mut store = GraphStore::with_seed(&config, 1);
        let a = store.add_node(wallet("A", 1.0, "t1")).unwrap().id();
        store.add_node(wallet("B", 1.0, "t1")).unwrap();
        assert_eq!(store.edges()[0].direction, FlowDirection::Outflow);
        assert_eq!(store.outflows(a).count(), 1);
    }

    #[test]
    fn update_position_and_unknown_node() {
        let mut store = store();
        let a = store.add_node(wallet("A", 1.0, "t1")).unwrap().id();
        store.update_node_position(a, vec2(10.0, 20.0)).unwrap();
        assert_eq!(store.node(a).unwrap().position, vec2(10.0, 20.0));
        assert_eq!(
            store.update_node_position(NodeId(999), Vec2::ZERO),
            Err(GraphError::UnknownNode(NodeId(999)))
        );
    }

    #[test]
    fn apply_positions_is_all_or_nothing() {
        let mut store = store();
        let a = store.add_node(wallet("A", 1.0, "t1")).unwrap().id();
        let before = store.node(a).unwrap().position;

        let result = store.apply_positions(&[(a, vec2(1.0, 1.0)), (NodeId(77), Vec2::ZERO)]);
        assert_eq!(result, Err(GraphError::UnknownNode(NodeId(77))));
        assert_eq!(store.node(a).unwrap().position, before);

        assert_eq!(store.apply_positions(&[(a, vec2(1.0, 1.0))]), Ok(1));
        assert_eq!(store.node(a).unwrap().position, vec2(1.0, 1.0));
    }

    #[test]
    fn clear_empties_graph_and_selection() {
        let mut store = store();
        let a = store.add_node(wallet("A", 1.0, "t1")).unwrap().id();
        store.add_node(wallet("B", 1.0, "t1")).unwrap();
        store.select(Some(a)).unwrap();

        store.clear();
        assert_eq!(store.node_count(), 0);
        assert_eq!(store.edge_count(), 0);
        assert_eq!(store.selected(), None);
        assert!(store.node_by_address("A").is_none());

        let again = store.add_node(wallet("A", 1.0, "t1")).unwrap().id();
        assert_ne!(again, a);
    }

    #[test]
    fn select_rejects_unknown_node() {
        let mut store = store();
        assert_eq!(
            store.select(Some(NodeId(5))),
            Err(GraphError::UnknownNode(NodeId(5)))
        );
        assert_eq!(store.select(None), Ok(()));
    }

    #[test]
    fn search_matches_address_and_entity() {
        let mut store = store();
        let binance = store
            .add_node(WalletSubmission::new("bc1qxy2kgdy", 1.0).with_entity("Binance"))
            .unwrap()
            .id();
        store
            .add_node(WalletSubmission::new("bc1qm34lsc6", 1.0).with_entity("Cold Storage"))
            .unwrap();

        assert_eq!(store.search("binance").first(), Some(&binance));
        assert_eq!(store.search("bc1q").len(), 2);
        assert!(store.search("   ").is_empty());
    }

    #[test]
    fn search_ignores_query_case() {
        let mut store = store();
        let cold = store
            .add_node(WalletSubmission::new("bc1qm34lsc6", 1.0).with_entity("cold storage"))
            .unwrap()
            .id();

        assert_eq!(store.search("BC1QM34"), vec![cold]);
        assert_eq!(store.search("COLD"), vec![cold]);
    }
}
