mod batch;
mod export;

pub use batch::{
    BatchReport, BatchSource, EdgeRecord, TransactionRecord, WalletBatch, WalletRecord,
    apply_batch,
};
pub use export::snapshot_json;
