use eframe::egui::{Pos2, Vec2};
use tracing::debug;

use crate::config::AppConfig;
use crate::graph::{
    EdgeOutcome, EdgeSubmission, FlowEdge, GraphError, GraphStore, NodeId, NodeOutcome,
    WalletNode, WalletSubmission,
};
use crate::layout::{LayoutKind, compute_layout};
use crate::viewport::{Viewport, ViewportTransform};

/// One input event. Commands are applied one at a time and each runs to
/// completion before the next.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    SubmitWallet(WalletSubmission),
    SubmitEdge(EdgeSubmission),
    MoveNode { id: NodeId, position: Vec2 },
    Select(Option<NodeId>),
    Reset,
    Layout(LayoutKind),
    Zoom { delta: f32, cursor: Pos2 },
    ZoomIn { anchor: Pos2 },
    ZoomOut { anchor: Pos2 },
    Pan(Vec2),
    ResetView,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Applied {
    Node(NodeOutcome),
    Edge(EdgeOutcome),
    Moved(NodeId),
    Selected(Option<NodeId>),
    Cleared,
    LaidOut { kind: LayoutKind, nodes: usize },
    View(Viewport),
}

/// Read-only view handed to the renderer.
#[derive(Clone, Copy, Debug)]
pub struct GraphSnapshot<'a> {
    pub nodes: &'a [WalletNode],
    pub edges: &'a [FlowEdge],
    pub viewport: Viewport,
    pub selected: Option<NodeId>,
}

/// Sole owner of the graph and the viewport.
pub struct Controller {
    store: GraphStore,
    view: ViewportTransform,
    config: AppConfig,
}

impl Controller {
    pub fn new(config: AppConfig, seed: Option<u64>) -> Self {
        let store = match seed {
            Some(seed) => GraphStore::with_seed(&config, seed),
            None => GraphStore::new(&config),
        };
        Self {
            store,
            view: ViewportTransform::new(config.viewport),
            config,
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn view(&self) -> &ViewportTransform {
        &self.view
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn snapshot(&self) -> GraphSnapshot<'_> {
        GraphSnapshot {
            nodes: self.store.nodes(),
            edges: self.store.edges(),
            viewport: self.view.viewport(),
            selected: self.store.selected(),
        }
    }

    pub fn apply(&mut self, command: Command) -> Result<Applied, GraphError> {
        match command {
            Command::SubmitWallet(submission) => self.store.add_node(submission).map(Applied::Node),
            Command::SubmitEdge(submission) => self.store.add_edge(submission).map(Applied::Edge),
            Command::MoveNode { id, position } => {
                self.store.update_node_position(id, position)?;
                Ok(Applied::Moved(id))
            }
            Command::Select(id) => {
                self.store.select(id)?;
                Ok(Applied::Selected(id))
            }
            Command::Reset => {
                self.store.clear();
                Ok(Applied::Cleared)
            }
            Command::Layout(kind) => {
                let positions = compute_layout(
                    kind,
                    self.store.nodes(),
                    self.store.edges(),
                    &self.config,
                );
                let nodes = self.store.apply_positions(&positions)?;
                Ok(Applied::LaidOut { kind, nodes })
            }
            Command::Zoom { delta, cursor } => {
                self.view.zoom(delta, cursor);
                Ok(self.view_changed())
            }
            Command::ZoomIn { anchor } => {
                self.view.zoom_in(anchor);
                Ok(self.view_changed())
            }
            Command::ZoomOut { anchor } => {
                self.view.zoom_out(anchor);
                Ok(self.view_changed())
            }
            Command::Pan(delta) => {
                self.view.pan(delta);
                Ok(self.view_changed())
            }
            Command::ResetView => {
                self.view.reset();
                Ok(self.view_changed())
            }
        }
    }

    fn view_changed(&self) -> Applied {
        let viewport = self.view.viewport();
        debug!(
            scale = viewport.scale,
            translate_x = viewport.translate_x,
            translate_y = viewport.translate_y,
            "viewport changed"
        );
        Applied::View(viewport)
    }

    /// Applies a batch in order and collects the failures instead of stopping
    /// at the first one.
    pub fn apply_all(
        &mut self,
        commands: impl IntoIterator<Item = Command>,
    ) -> Vec<(usize, GraphError)> {
        commands
            .into_iter()
            .enumerate()
            .filter_map(|(index, command)| self.apply(command).err().map(|error| (index, error)))
            .collect()
    }
}
