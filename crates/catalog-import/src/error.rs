use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} fetching {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("not a recognized tabular format: {reason}")]
    Parse { reason: String },

    #[error(transparent)]
    Persistence(#[from] catalog_db::DbError),
}

impl ImportError {
    pub(crate) fn parse(reason: impl Into<String>) -> Self {
        ImportError::Parse {
            reason: reason.into(),
        }
    }
}
