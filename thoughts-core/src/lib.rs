//! Core data model for the thoughts ledger.
//!
//! A thought is a simple ownership-transferable asset. This crate defines the
//! parties that hold it, the state that records it, the commands that govern
//! it and the transaction shape the contract layer verifies.

pub mod command;
pub mod error;
pub mod identity;
pub mod state;
pub mod transaction;

// Re-export the main types for convenience
pub use command::{Command, CommandData};
pub use error::{BuildError, ContractError, FlowError};
pub use identity::{PartyIdentity, PartyKey};
pub use state::ThoughtState;
pub use transaction::{
    LedgerTransaction, StateAndRef, StateGroup, StateRef, TimeWindow, TransactionHash,
};
