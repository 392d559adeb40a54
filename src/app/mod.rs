use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use tracing::{error, info};

use wallet_flow::config::AppConfig;
use wallet_flow::controller::{Command, Controller};
use wallet_flow::graph::{FlowDirection, NodeId};
use wallet_flow::io::{BatchReport, BatchSource, WalletBatch, apply_batch};
use wallet_flow::layout::LayoutKind;

mod graph;
mod render_utils;
mod ui;

pub struct LoadSettings {
    pub source: BatchSource,
    pub config: AppConfig,
    pub seed: Option<u64>,
    pub initial_layout: Option<LayoutKind>,
}

pub struct WalletFlowApp {
    settings: LoadSettings,
    state: AppState,
    reload_rx: Option<Receiver<Result<WalletBatch, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<WalletBatch, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    controller: Controller,
    search: String,
    wallet_draft: WalletDraft,
    edge_draft: EdgeDraft,
    status: Option<String>,
    dragging: Option<NodeId>,
    canvas_size: Vec2,
}

#[derive(Default)]
struct WalletDraft {
    address: String,
    amount: String,
    transaction_id: String,
    transaction_amount: String,
    entity_name: String,
    token_type: String,
    transaction_type: String,
}

struct EdgeDraft {
    source: String,
    target: String,
    direction: FlowDirection,
    amount: String,
    transaction_id: String,
}

impl Default for EdgeDraft {
    fn default() -> Self {
        Self {
            source: String::new(),
            target: String::new(),
            direction: FlowDirection::Outflow,
            amount: String::new(),
            transaction_id: String::new(),
        }
    }
}

impl WalletFlowApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: LoadSettings) -> Self {
        let state = Self::start_load(settings.source.clone());
        Self {
            settings,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: BatchSource) -> Receiver<Result<WalletBatch, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = source.load().map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: BatchSource) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }

    fn ready_state(&self, batch: WalletBatch) -> AppState {
        let mut controller = Controller::new(self.settings.config.clone(), self.settings.seed);
        let report = apply_batch(&mut controller, batch);
        info!(source = %self.settings.source.describe(), "batch loaded into viewer");

        if let Some(kind) = self.settings.initial_layout
            && let Err(error) = controller.apply(Command::Layout(kind))
        {
            error!(%error, "initial layout failed");
        }

        AppState::Ready(Box::new(ViewModel::new(controller, &report)))
    }

    fn finish_load(&self, result: Result<WalletBatch, String>) -> AppState {
        match result {
            Ok(batch) => self.ready_state(batch),
            Err(error) => AppState::Error(error),
        }
    }
}

impl eframe::App for WalletFlowApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(result);
                } else {
                    ctx.request_repaint();
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading wallet batch...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load wallet batch");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        self.reload_rx = Some(Self::spawn_load(self.settings.source.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(
                    ctx,
                    &self.settings.source.describe(),
                    &mut reload_requested,
                    is_reloading,
                );

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.settings.source.clone()));
                }
            }
        }

        if let Some(rx) = self.reload_rx.take() {
            match rx.try_recv() {
                Ok(result) => transition = Some(result),
                Err(TryRecvError::Empty) => {
                    self.reload_rx = Some(rx);
                    ctx.request_repaint();
                }
                Err(TryRecvError::Disconnected) => {
                    transition = Some(Err("Background load worker disconnected".to_owned()));
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = self.finish_load(result);
        }
    }
}

fn report_summary(report: &BatchReport) -> String {
    let mut summary = format!(
        "{} wallets created, {} merged, {} inferred edges, {} explicit edges",
        report.created, report.merged, report.inferred_edges, report.explicit_edges
    );
    if !report.rejected.is_empty() {
        summary.push_str(&format!(", {} rejected", report.rejected.len()));
    }
    summary
}
