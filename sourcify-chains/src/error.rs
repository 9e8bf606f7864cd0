//! Unified error type for the chain registry.

use thiserror::Error;

/// Top-level error type for registry construction and chain lookups.
///
/// Everything except [`Error::UnsupportedChain`] and [`Error::UnknownChain`]
/// is raised while the registry is being built and aborts startup.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be resolved, read, or parsed.
    #[error("config: {0}")]
    Config(String),

    /// Chain catalog could not be read or parsed.
    #[error("catalog: {0}")]
    Catalog(String),

    /// Extension table could not be parsed or resolved.
    #[error("extensions: {0}")]
    Extensions(String),

    /// Two catalog records share a chain id.
    #[error("corrupt chains catalog: multiple chains have the same chain id {0}")]
    DuplicateChainId(u64),

    /// Extension entries reference chain ids the catalog does not provide.
    #[error(
        "some chains in the extension table are not in the catalog: {}",
        .0.join(",")
    )]
    OrphanedExtensions(Vec<String>),

    /// The chain exists but does not accept new verifications.
    #[error("Chain {0} not supported for verification!")]
    UnsupportedChain(String),

    /// The chain id is not known to the registry.
    #[error("Chain {0} is not a Sourcify chain!")]
    UnknownChain(String),

    /// Server bind or runtime error.
    #[error("server: {0}")]
    Server(String),

    /// Command output could not be encoded or written.
    #[error("output: {0}")]
    Output(String),
}

impl Error {
    /// Creates a [`Error::Config`] from a message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a [`Error::Config`] from a message and an underlying cause.
    pub fn config_with(msg: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Self::Config(format!("{}: {source}", msg.into()))
    }

    /// Creates a [`Error::Catalog`] from a message and an underlying cause.
    pub fn catalog_with(msg: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Self::Catalog(format!("{}: {source}", msg.into()))
    }

    /// Creates a [`Error::Extensions`] from a message.
    pub fn extensions(msg: impl Into<String>) -> Self {
        Self::Extensions(msg.into())
    }

    /// Creates a [`Error::Output`] from a message and an underlying cause.
    pub fn output_with(msg: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Self::Output(format!("{}: {source}", msg.into()))
    }

    /// Whether this error is meant to be shown to API users as-is.
    ///
    /// Only the unsupported-chain rejection qualifies; an unknown chain id
    /// signals a caller bug rather than bad user input.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(self, Self::UnsupportedChain(_))
    }
}
