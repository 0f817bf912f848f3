//! Contract logic for the thoughts ledger.
//!
//! `contract::verify` is the deterministic, side-effect-free rule-set that
//! accepts or rejects a proposed state transition; `builder` assembles
//! issuance and move proposals expected to satisfy it.

pub mod builder;
pub mod contract;

pub use builder::TransactionBuilder;
pub use contract::verify;
