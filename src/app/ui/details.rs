use eframe::egui::{self, RichText, Ui};

use wallet_flow::controller::Command;
use wallet_flow::graph::{FlowEdge, GraphStore, NodeId};
use wallet_flow::util::{format_amount, short_address};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Wallet Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.controller.store().selected() else {
            ui.label("Select a wallet from the graph or search results.");
            return;
        };

        let store = self.controller.store();
        let Some(node) = store.node(selected_id) else {
            ui.label("Selected wallet no longer exists in the graph.");
            return;
        };

        ui.label(RichText::new(short_address(&node.address)).strong());
        ui.small(node.address.as_str());
        ui.add_space(6.0);

        ui.label(format!("Id: {}", node.id));
        ui.label(format!("Entity: {}", node.entity_name));
        ui.label(format!(
            "Balance: {}",
            format_amount(node.amount, &node.token_type)
        ));
        if !node.transaction_type.is_empty() {
            ui.label(format!("Transaction type: {}", node.transaction_type));
        }
        ui.label(format!(
            "Position: ({:.1}, {:.1})",
            node.position.x, node.position.y
        ));

        ui.separator();
        ui.label(RichText::new("Transactions").strong());
        if node.transactions.is_empty() {
            ui.label("No transactions recorded.");
        }
        for transaction in &node.transactions {
            ui.label(format!(
                "{}  {}",
                transaction.id,
                format_amount(transaction.amount, &node.token_type)
            ));
        }

        let inflows = store.inflows(selected_id).collect::<Vec<_>>();
        let outflows = store.outflows(selected_id).collect::<Vec<_>>();
        let mut jump = None;

        ui.separator();
        ui.label(RichText::new(format!("Inflows ({})", inflows.len())).strong());
        flow_rows(ui, "inflow_rows", &inflows, |edge| edge.source, &mut jump, store);

        ui.separator();
        ui.label(RichText::new(format!("Outflows ({})", outflows.len())).strong());
        flow_rows(ui, "outflow_rows", &outflows, |edge| edge.target, &mut jump, store);

        ui.add_space(8.0);
        let clear = ui.button("Clear selection").clicked();

        if let Some(id) = jump {
            self.dispatch(Command::Select(Some(id)));
        } else if clear {
            self.dispatch(Command::Select(None));
        }
    }
}

fn flow_rows(
    ui: &mut Ui,
    salt: &str,
    flows: &[&FlowEdge],
    counterpart: impl Fn(&FlowEdge) -> NodeId,
    jump: &mut Option<NodeId>,
    store: &GraphStore,
) {
    if flows.is_empty() {
        ui.label("None.");
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt(salt)
        .max_height(200.0)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            for edge in flows {
                let other = counterpart(edge);
                let Some(node) = store.node(other) else {
                    continue;
                };
                let marker = if edge.inferred { " (inferred)" } else { "" };
                let label = format!(
                    "{}  {:.8}  tx {}{marker}",
                    short_address(&node.address),
                    edge.amount,
                    edge.transaction_id
                );
                if ui.link(label).on_hover_text(node.address.as_str()).clicked() {
                    *jump = Some(other);
                }
            }
        });
}
