#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("DOT parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("invalid attribute name: {name:?}")]
    InvalidAttributeName { name: String },

    #[error("unknown layout engine: {name}")]
    UnknownLayoutEngine { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
