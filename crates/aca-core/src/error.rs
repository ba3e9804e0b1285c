use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Task inputs ──
    #[error("missing required argument: {detail}")]
    MissingRequiredArgument { detail: String },

    #[error("conflicting arguments: '{first}' and '{second}' cannot both be provided")]
    ConflictingArguments {
        first: &'static str,
        second: &'static str,
    },

    #[error("invalid format for '{input}': {detail}")]
    InvalidArgumentFormat { input: &'static str, detail: String },

    // ── Policy file ──
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Error {
    pub(crate) fn invalid(input: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidArgumentFormat {
            input,
            detail: detail.into(),
        }
    }
}
