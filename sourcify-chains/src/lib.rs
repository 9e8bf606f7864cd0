//! Chain registry for the Sourcify verification service.
//!
//! Merges the chainid.network catalog with Sourcify's per-chain extension
//! table into an immutable [`Registry`]:
//!
//! - [`chain`] — catalog records, the extension table, RPC and explorer templates.
//! - [`registry`] — construction, integrity checks, display order, lookups.
//! - [`error`] — the crate-wide [`Error`].

pub mod chain;
pub mod error;
pub mod registry;

#[cfg(test)]
mod testing;

pub use self::error::Error;
pub use self::registry::{ChainView, Mode, Registry, SourcifyChain};
