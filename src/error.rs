use thiserror::Error;

/// everything that can go wrong between a dataset and a saved model
#[derive(Debug, Error)]
pub enum Error {
    /// fit was called with zero rows
    #[error("empty dataset")]
    EmptyDataset,
    /// |X| != |y|, or rows of X disagree on width
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    /// a learner was configured with a value it cannot train under
    #[error("invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),
    /// the underlying byte stream refused a read or write
    #[error("persistence failure: {0}")]
    Persistence(#[from] std::io::Error),
    /// the subprocess back-end exited abnormally or left no output
    #[error("external backend failure: {0}")]
    External(String),
    /// the dataset file could not be parsed
    #[error("ingest failure: {0}")]
    Ingest(#[from] csv::Error),
}
