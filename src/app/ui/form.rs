use eframe::egui::{self, RichText, Ui};

use wallet_flow::controller::{Applied, Command};
use wallet_flow::graph::{EdgeOutcome, EdgeSubmission, FlowDirection, NodeOutcome, WalletSubmission};

use super::super::{EdgeDraft, ViewModel, WalletDraft};

fn parse_amount(label: &str, raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("{label} must be a number"))
}

impl WalletDraft {
    fn to_submission(&self) -> Result<WalletSubmission, String> {
        let amount = parse_amount("amount", &self.amount)?;
        let mut submission = WalletSubmission::new(self.address.clone(), amount)
            .with_entity(self.entity_name.trim())
            .with_token(self.token_type.trim())
            .with_transaction_type(self.transaction_type.trim());

        let transaction_id = self.transaction_id.trim();
        if !transaction_id.is_empty() {
            let tx_amount = if self.transaction_amount.trim().is_empty() {
                amount
            } else {
                parse_amount("transaction amount", &self.transaction_amount)?
            };
            submission = submission.with_transaction(transaction_id, tx_amount);
        }

        Ok(submission)
    }
}

impl EdgeDraft {
    fn to_submission(&self) -> Result<EdgeSubmission, String> {
        Ok(EdgeSubmission::new(
            self.source.trim(),
            self.target.trim(),
            self.direction,
            parse_amount("amount", &self.amount)?,
            self.transaction_id.trim(),
        ))
    }
}

fn labeled_field(ui: &mut Ui, label: &str, value: &mut String) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.text_edit_singleline(value);
    });
}

impl ViewModel {
    pub(in crate::app) fn draw_forms(&mut self, ui: &mut Ui) {
        ui.heading("Add wallet");
        let draft = &mut self.wallet_draft;
        labeled_field(ui, "Address", &mut draft.address);
        labeled_field(ui, "Amount", &mut draft.amount);
        labeled_field(ui, "Transaction", &mut draft.transaction_id);
        labeled_field(ui, "Tx amount", &mut draft.transaction_amount);
        labeled_field(ui, "Entity", &mut draft.entity_name);
        labeled_field(ui, "Token", &mut draft.token_type);
        labeled_field(ui, "Type", &mut draft.transaction_type);

        if ui.button("Submit wallet").clicked() {
            match self.wallet_draft.to_submission() {
                Ok(submission) => {
                    if let Some(Applied::Node(outcome)) =
                        self.dispatch(Command::SubmitWallet(submission))
                    {
                        self.status = Some(match &outcome {
                            NodeOutcome::Created { id, inferred } => {
                                format!("created {id} with {} inferred flows", inferred.len())
                            }
                            NodeOutcome::Merged {
                                id,
                                added_transactions,
                            } => format!("merged into {id}, {added_transactions} new transactions"),
                        });
                        self.wallet_draft = WalletDraft::default();
                    }
                }
                Err(message) => self.status = Some(message),
            }
        }

        ui.add_space(10.0);
        ui.label(RichText::new("Add flow").strong());
        let draft = &mut self.edge_draft;
        labeled_field(ui, "Source", &mut draft.source);
        labeled_field(ui, "Target", &mut draft.target);
        ui.horizontal(|ui| {
            ui.label("Direction");
            egui::ComboBox::from_id_salt("edge_direction")
                .selected_text(draft.direction.label())
                .show_ui(ui, |ui| {
                    for direction in [FlowDirection::Inflow, FlowDirection::Outflow] {
                        ui.selectable_value(&mut draft.direction, direction, direction.label());
                    }
                });
        });
        labeled_field(ui, "Amount", &mut draft.amount);
        labeled_field(ui, "Transaction", &mut draft.transaction_id);

        if ui.button("Submit flow").clicked() {
            match self.edge_draft.to_submission() {
                Ok(submission) => {
                    if let Some(Applied::Edge(outcome)) =
                        self.dispatch(Command::SubmitEdge(submission))
                    {
                        self.status = Some(match outcome {
                            EdgeOutcome::Created(id) => format!("created flow {id}"),
                            EdgeOutcome::AlreadyLinked(id) => {
                                format!("wallets already linked by {id}")
                            }
                        });
                        self.edge_draft = EdgeDraft::default();
                    }
                }
                Err(message) => self.status = Some(message),
            }
        }
    }
}
