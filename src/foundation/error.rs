/// Convenience result type used across layermint.
pub type MintResult<T> = Result<T, MintError>;

/// Top-level error taxonomy used by generator APIs.
#[derive(thiserror::Error, Debug)]
pub enum MintError {
    /// Invalid configuration or asset layout, detected before any output is produced.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A DNA references an option that the catalog cannot resolve.
    #[error("missing asset: {0}")]
    MissingAsset(String),

    /// The duplicate-DNA tolerance ran out before the requested edition count was reached.
    #[error(
        "exhausted unique DNA in tier {tier}: produced {achieved} of {requested} editions after \
         {failures} duplicate rejections; add more layers or options to grow the collection"
    )]
    Exhausted {
        /// Zero-based index of the layer configuration that was running.
        tier: usize,
        /// Cumulative edition count the tier was asked to grow to.
        requested: u32,
        /// Editions accepted so far across all tiers.
        achieved: u32,
        /// Duplicate rejections counted when the run stopped.
        failures: u32,
    },

    /// Errors when serializing or deserializing config or metadata.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MintError {
    /// Build a [`MintError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`MintError::MissingAsset`] value.
    pub fn missing_asset(msg: impl Into<String>) -> Self {
        Self::MissingAsset(msg.into())
    }

    /// Build a [`MintError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for MintError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
