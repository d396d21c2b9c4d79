use thiserror::Error;

#[derive(Error, Debug)]
pub enum DuesError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    InputShape(#[from] InputShapeError),
}

pub type DuesResult<T> = Result<T, DuesError>;

/// A record failed the type contract while being decoded at the fetch boundary.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{record}.{field} has malformed value '{value}'")]
pub struct InputShapeError {
    pub record: &'static str,
    pub field:  &'static str,
    pub value:  String,
}

impl InputShapeError {
    pub fn new(record: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self { record, field, value: value.into() }
    }
}

/// Retrieval of a collector's records failed. Either half failing fails the whole fetch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Member retrieval failed for collector '{collector}': {cause}")]
    Members { collector: String, cause: String },

    #[error("Pending payment retrieval failed for collector '{collector}': {cause}")]
    PendingRequests { collector: String, cause: String },

    #[error("Record rejected for collector '{collector}': {source}")]
    Rejected {
        collector: String,
        #[source]
        source: InputShapeError,
    },
}

impl FetchError {
    pub fn collector(&self) -> &str {
        match self {
            Self::Members { collector, .. }
            | Self::PendingRequests { collector, .. }
            | Self::Rejected { collector, .. } => collector,
        }
    }
}
