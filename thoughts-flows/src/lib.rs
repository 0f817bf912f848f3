//! Flow orchestration for the thoughts ledger.
//!
//! Flows assemble a proposal, bind its validity window, verify it locally,
//! gather counterparty signatures and hand it to the notary for
//! finalization. The external collaborators (identity resolution, signature
//! collection, finalization, vault query) live behind the [`NodeServices`]
//! trait so the whole layer is testable without a network; [`mock::MockNode`]
//! is the in-memory implementation used by tests.

pub mod flows;
pub mod mock;
pub mod services;

pub use flows::{issue_thought, move_thought};
pub use mock::MockNode;
pub use services::{CommittedTransaction, NodeServices, SignedTransaction};
