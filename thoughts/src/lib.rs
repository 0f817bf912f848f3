//! Ledger for simple ownership-transferable thought records.
//!
//! This crate re-exports all the components of the thoughts system.

pub use thoughts_contract::*;
pub use thoughts_core::*;
pub use thoughts_flows::*;
