//! In-memory node services for testing purposes.
//!
//! `MockNode` plays every external collaborator at once: the identity
//! directory, each counterparty's signing responder, the notary and the
//! vault. The notary role keeps a spent-set so conflicting spends fail at
//! finalization exactly like the real consensus service, with no network and
//! no real cryptography.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use log::debug;

use crate::flows::{check_issue_proposal, check_move_proposal};
use crate::services::{CommittedTransaction, NodeServices, SignedTransaction};
use thoughts_contract::contract;
use thoughts_core::command::CommandData;
use thoughts_core::error::FlowError;
use thoughts_core::identity::PartyIdentity;
use thoughts_core::state::ThoughtState;
use thoughts_core::transaction::{StateAndRef, StateRef, TransactionHash};

/// Mock implementation of the NodeServices trait for testing purposes
pub struct MockNode {
    /// The identity this node signs with
    identity: PartyIdentity,
    /// The notary, if one is reachable on the network map
    notary: Option<PartyIdentity>,
    /// Well-known parties by legal name
    directory: HashMap<String, PartyIdentity>,
    /// Shared ledger state, guarded for interior mutability
    ledger: Mutex<MockLedger>,
    /// Fixed clock used to anchor validity windows
    now: DateTime<Utc>,
}

#[derive(Default)]
struct MockLedger {
    /// Unspent states by the reference that consumes them
    unspent: HashMap<StateRef, ThoughtState>,
    /// References the notary has already attested a spend of
    spent: HashSet<StateRef>,
    /// Committed transactions by hash
    committed: HashMap<TransactionHash, CommittedTransaction>,
}

impl MockNode {
    /// Create a node with the given legal name and a default notary
    pub fn new(name: &str) -> Self {
        let identity = PartyIdentity::new(name);
        let notary = PartyIdentity::new("Turicum Notary Service");

        let mut directory = HashMap::new();
        directory.insert(identity.name.clone(), identity.clone());
        directory.insert(notary.name.clone(), notary.clone());

        Self {
            identity,
            notary: Some(notary),
            directory,
            ledger: Mutex::new(MockLedger::default()),
            now: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    /// Drop the notary from the network map
    pub fn without_notary(mut self) -> Self {
        self.notary = None;
        self
    }

    /// Register a well-known counterparty and return its identity
    pub fn register_party(&mut self, name: &str) -> PartyIdentity {
        let party = PartyIdentity::new(name);
        self.directory.insert(name.to_string(), party.clone());
        party
    }

    /// Advance or rewind the node's clock
    pub fn set_now(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    /// Seed the vault with an unspent state
    pub fn add_unspent(&self, reference: StateRef, state: ThoughtState) {
        let mut ledger = self.ledger.lock().expect("ledger lock poisoned");
        ledger.unspent.insert(reference, state);
    }

    /// Whether the notary has attested a spend of the given reference
    pub fn is_spent(&self, reference: &StateRef) -> bool {
        let ledger = self.ledger.lock().expect("ledger lock poisoned");
        ledger.spent.contains(reference)
    }

    /// Look up a committed transaction by hash
    pub fn committed(&self, id: &TransactionHash) -> Option<CommittedTransaction> {
        let ledger = self.ledger.lock().expect("ledger lock poisoned");
        ledger.committed.get(id).cloned()
    }
}

impl NodeServices for MockNode {
    fn our_identity(&self) -> PartyIdentity {
        self.identity.clone()
    }

    fn resolve_party(&self, name: &str) -> Result<PartyIdentity, FlowError> {
        self.directory
            .get(name)
            .cloned()
            .ok_or_else(|| FlowError::PartyNotFound(name.to_string()))
    }

    fn notary(&self) -> Result<PartyIdentity, FlowError> {
        self.notary.clone().ok_or(FlowError::NotaryNotFound)
    }

    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn collect_signatures(
        &self,
        signed: SignedTransaction,
        counterparties: &[PartyIdentity],
    ) -> Result<SignedTransaction, FlowError> {
        // Each counterparty runs the acceptance check for the command kind
        // before countersigning.
        let data = match signed.transaction.commands.as_slice() {
            [command] => command.data,
            _ => {
                return Err(FlowError::SignatureRefused(
                    "expected a single command".to_string(),
                ))
            }
        };

        let mut signed = signed;
        for counterparty in counterparties {
            match data {
                CommandData::Issue => check_issue_proposal(&signed.transaction, counterparty)?,
                CommandData::Move => check_move_proposal(&signed.transaction, counterparty)?,
                _ => {
                    return Err(FlowError::SignatureRefused(
                        "unrecognized command".to_string(),
                    ))
                }
            }
            signed = signed.with_signature(*counterparty.owning_key());
        }

        Ok(signed)
    }

    fn finalize(&self, signed: SignedTransaction) -> Result<CommittedTransaction, FlowError> {
        // The notary re-runs contract verification and requires every key
        // the commands name to have actually signed.
        contract::verify(&signed.transaction)?;
        for command in &signed.transaction.commands {
            for key in &command.signers {
                if !signed.is_signed_by(key) {
                    return Err(FlowError::SignatureRefused(format!(
                        "missing signature for {}",
                        key
                    )));
                }
            }
        }

        let mut ledger = self.ledger.lock().expect("ledger lock poisoned");

        for input in &signed.transaction.inputs {
            if ledger.spent.contains(&input.reference) {
                return Err(FlowError::DoubleSpend {
                    reference: input.reference,
                });
            }
            if !ledger.unspent.contains_key(&input.reference) {
                return Err(FlowError::InputNotFound {
                    reference: input.reference,
                });
            }
        }

        let id = signed.transaction.hash();
        for input in &signed.transaction.inputs {
            ledger.unspent.remove(&input.reference);
            ledger.spent.insert(input.reference);
        }
        for (index, output) in signed.transaction.outputs.iter().enumerate() {
            ledger
                .unspent
                .insert(StateRef::new(id, index as u32), output.clone());
        }

        debug!("notarized transaction {}", hex::encode(&id[0..6]));

        let committed = CommittedTransaction {
            id,
            transaction: signed.transaction,
        };
        ledger.committed.insert(id, committed.clone());
        Ok(committed)
    }

    fn unspent_states(&self, owner: Option<&PartyIdentity>) -> Vec<StateAndRef> {
        let ledger = self.ledger.lock().expect("ledger lock poisoned");
        let mut states: Vec<StateAndRef> = ledger
            .unspent
            .iter()
            .filter(|(_, state)| owner.map_or(true, |owner| &state.owner == owner))
            .map(|(reference, state)| StateAndRef::new(*reference, state.clone()))
            .collect();
        states.sort_by_key(|entry| entry.reference);
        states
    }
}
