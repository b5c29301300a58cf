//! Domain state for the vault flow engine.
//!
//! Vaults are read-only catalog entries, positions and transactions are
//! owned by the ledger.

pub mod position;
pub mod transaction;
pub mod vault;

pub use position::*;
pub use transaction::*;
pub use vault::*;
