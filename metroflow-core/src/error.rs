use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unknown node id: {0}")]
    UnknownNode(String),
    #[error("No route from {origin} to {destination} satisfies the query")]
    NotFound { origin: String, destination: String },
    #[error("Network leaves {} node(s) unreachable", .0.len())]
    Disconnected(Vec<String>),
    #[error("Computation cancelled")]
    Cancelled,
    #[error("Computation exceeded its deadline")]
    Timeout,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
