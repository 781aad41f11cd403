use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Lmdb(#[from] accredit_store_lmdb::LmdbError),

    #[error("store error: {0}")]
    Store(#[from] accredit_store::StoreError),

    #[error("ledger error: {0}")]
    Ledger(#[from] accredit_ledger::LedgerError),

    #[error("classifier error: {0}")]
    Classifier(#[from] accredit_fraud::ClassifierError),

    #[error("data directory failed integrity check: {0}")]
    Integrity(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
