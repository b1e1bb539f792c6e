#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Layout(#[from] dotlayout::Error),

    #[error("canvas settings JSON error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("no item for {0}")]
    UnknownItem(String),
}

pub type Result<T> = std::result::Result<T, Error>;
