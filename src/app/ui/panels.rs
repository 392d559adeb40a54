use eframe::egui::{self, Align, Context, Layout, Pos2, Vec2};
use tracing::warn;

use wallet_flow::controller::{Applied, Command, Controller};
use wallet_flow::io::BatchReport;
use wallet_flow::layout::LayoutKind;
use wallet_flow::util::short_address;

use super::super::{EdgeDraft, ViewModel, WalletDraft, report_summary};

impl ViewModel {
    pub(in crate::app) fn new(controller: Controller, report: &BatchReport) -> Self {
        Self {
            controller,
            search: String::new(),
            wallet_draft: WalletDraft::default(),
            edge_draft: EdgeDraft::default(),
            status: Some(report_summary(report)),
            dragging: None,
            canvas_size: Vec2::ZERO,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("wallet-flow");
                    ui.separator();
                    ui.label(format!("source: {source}"));
                    ui.label(format!("wallets: {}", self.controller.store().node_count()));
                    ui.label(format!("flows: {}", self.controller.store().edge_count()));
                    ui.separator();

                    for kind in [LayoutKind::Tree, LayoutKind::Force, LayoutKind::Declutter] {
                        if ui.button(kind.label()).clicked() {
                            self.dispatch(Command::Layout(kind));
                        }
                    }
                    ui.separator();

                    let anchor = self.canvas_center();
                    if ui.button("Zoom in").clicked() {
                        self.dispatch(Command::ZoomIn { anchor });
                    }
                    if ui.button("Zoom out").clicked() {
                        self.dispatch(Command::ZoomOut { anchor });
                    }
                    if ui.button("Reset view").clicked() {
                        self.dispatch(Command::ResetView);
                    }
                    if ui.button("Clear graph").clicked() {
                        self.dispatch(Command::Reset);
                    }
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload batch"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "zoom {:.0}%",
                            self.controller.view().scale() * 100.0
                        ));
                        if let Some(status) = &self.status {
                            ui.label(status.as_str());
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.draw_forms(ui);
                    ui.separator();
                    self.draw_search(ui);
                });
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.draw_details(ui));
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading wallet batch...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    /// Canvas-local center, used as the anchor for the zoom buttons.
    fn canvas_center(&self) -> Pos2 {
        (self.canvas_size * 0.5).to_pos2()
    }

    pub(in crate::app) fn dispatch(&mut self, command: Command) -> Option<Applied> {
        match self.controller.apply(command) {
            Ok(applied) => {
                if let Some(status) = status_for(&applied) {
                    self.status = Some(status);
                }
                Some(applied)
            }
            Err(error) => {
                warn!(%error, "command rejected");
                self.status = Some(error.to_string());
                None
            }
        }
    }

    fn draw_search(&mut self, ui: &mut egui::Ui) {
        ui.heading("Search");
        ui.add(egui::TextEdit::singleline(&mut self.search).hint_text("address or entity"));

        let query = self.search.trim();
        if query.is_empty() {
            return;
        }

        let matches = self.controller.store().search(query);
        if matches.is_empty() {
            ui.label("No wallets match.");
            return;
        }

        let mut picked = None;
        for id in matches.into_iter().take(30) {
            let Some(node) = self.controller.store().node(id) else {
                continue;
            };
            let label = format!("{}  ({})", short_address(&node.address), node.entity_name);
            if ui.link(label).on_hover_text(node.address.as_str()).clicked() {
                picked = Some(id);
            }
        }

        if let Some(id) = picked {
            self.dispatch(Command::Select(Some(id)));
        }
    }
}

fn status_for(applied: &Applied) -> Option<String> {
    match applied {
        Applied::LaidOut { kind, nodes } => {
            Some(format!("{} layout placed {nodes} wallets", kind.label()))
        }
        Applied::Cleared => Some("graph cleared".to_owned()),
        _ => None,
    }
}
