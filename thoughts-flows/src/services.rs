use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use thoughts_core::error::FlowError;
use thoughts_core::identity::{PartyIdentity, PartyKey};
use thoughts_core::transaction::{LedgerTransaction, StateAndRef, TransactionHash};

/// A transaction plus the signatures gathered for it so far.
///
/// Signatures are opaque key attestations; the cryptographic verification of
/// each one is an external, already-trusted precondition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: LedgerTransaction,
    pub signatures: BTreeSet<PartyKey>,
}

impl SignedTransaction {
    /// Wrap a freshly built transaction with its first signature
    pub fn new(transaction: LedgerTransaction, signer: PartyKey) -> Self {
        Self {
            transaction,
            signatures: BTreeSet::from([signer]),
        }
    }

    /// Add a counterparty's signature
    pub fn with_signature(mut self, signer: PartyKey) -> Self {
        self.signatures.insert(signer);
        self
    }

    pub fn is_signed_by(&self, key: &PartyKey) -> bool {
        self.signatures.contains(key)
    }

    /// The hash identifying the underlying transaction
    pub fn id(&self) -> TransactionHash {
        self.transaction.hash()
    }
}

/// A transaction the notary has accepted and the ledger has recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedTransaction {
    pub id: TransactionHash,
    pub transaction: LedgerTransaction,
}

/// The node-level services a flow runs against.
///
/// Everything behind this trait is an external collaborator: network
/// transport, the multi-party signing protocol and notary consensus are all
/// opaque calls from the flow's point of view. Flows never retry them; a
/// failure aborts the in-flight sequence and is surfaced to the caller.
pub trait NodeServices {
    /// The identity this node signs with
    fn our_identity(&self) -> PartyIdentity;

    /// Resolve a well-known party by legal name
    fn resolve_party(&self, name: &str) -> Result<PartyIdentity, FlowError>;

    /// The notary trusted to order transactions and prevent double-spends
    fn notary(&self) -> Result<PartyIdentity, FlowError>;

    /// Current time, used to anchor proposal validity windows
    fn now(&self) -> DateTime<Utc>;

    /// Sign a freshly built transaction with our own key
    fn sign_initial(&self, transaction: LedgerTransaction) -> SignedTransaction {
        SignedTransaction::new(transaction, *self.our_identity().owning_key())
    }

    /// Gather the given counterparties' signatures. Each counterparty runs
    /// its own acceptance checks and may refuse or time out.
    fn collect_signatures(
        &self,
        signed: SignedTransaction,
        counterparties: &[PartyIdentity],
    ) -> Result<SignedTransaction, FlowError>;

    /// Submit a fully signed transaction to the notary and record it.
    /// Consensus failure (a conflicting spend) is terminal.
    fn finalize(&self, signed: SignedTransaction) -> Result<CommittedTransaction, FlowError>;

    /// The ledger's unspent states, optionally filtered by owner
    fn unspent_states(&self, owner: Option<&PartyIdentity>) -> Vec<StateAndRef>;
}
