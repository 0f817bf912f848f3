use crate::command::Command;
use crate::identity::PartyIdentity;
use crate::state::ThoughtState;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Transaction hash type (32-byte array)
pub type TransactionHash = [u8; 32];

/// Pointer to a specific output of a previously committed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateRef {
    /// Hash of the transaction that produced the state
    pub txhash: TransactionHash,

    /// Index of the state in that transaction's outputs
    pub index: u32,
}

impl StateRef {
    pub fn new(txhash: TransactionHash, index: u32) -> Self {
        Self { txhash, index }
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = hex::encode(&self.txhash[0..6]);
        write!(f, "ref:{}:{}", prefix, self.index)
    }
}

/// An unspent state together with the reference a transaction consumes it by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAndRef {
    pub reference: StateRef,
    pub state: ThoughtState,
}

impl StateAndRef {
    pub fn new(reference: StateRef, state: ThoughtState) -> Self {
        Self { reference, state }
    }
}

/// Validity window within which a transaction is considered timely.
///
/// Half-open: `[from_time, until_time)`, either bound may be absent. The
/// contract only requires an upper bound on issuances; wall-clock freshness
/// is enforced by the notary at finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from_time: Option<DateTime<Utc>>,
    pub until_time: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Window covering `[start, start + duration)`
    pub fn from_start_and_duration(start: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            from_time: Some(start),
            until_time: Some(start + duration),
        }
    }

    /// Window with only an upper bound
    pub fn until_only(until: DateTime<Utc>) -> Self {
        Self {
            from_time: None,
            until_time: Some(until),
        }
    }

    /// Whether the given instant falls inside the window
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        if let Some(from) = self.from_time {
            if instant < from {
                return false;
            }
        }
        if let Some(until) = self.until_time {
            if instant >= until {
                return false;
            }
        }
        true
    }
}

/// Inputs and outputs that belong to one logical asset line.
///
/// The key is the shared `without_owner` projection of every state in the
/// group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateGroup {
    pub key: ThoughtState,
    pub inputs: Vec<StateAndRef>,
    pub outputs: Vec<ThoughtState>,
}

impl StateGroup {
    fn empty(key: ThoughtState) -> Self {
        Self {
            key,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }
}

/// A fully assembled transaction as handed to the contract for verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// The consensus authority the proposal is bound to. The contract never
    /// reads it; the notary enforces double-spend prevention and time-window
    /// attestation at finalization.
    pub notary: PartyIdentity,

    /// States consumed by this transaction, with their prior identities
    pub inputs: Vec<StateAndRef>,

    /// States produced by this transaction
    pub outputs: Vec<ThoughtState>,

    /// Commands attached to this transaction; the contract requires exactly one
    pub commands: Vec<Command>,

    /// Optional validity window; required with an upper bound for issuances
    pub time_window: Option<TimeWindow>,
}

impl LedgerTransaction {
    /// Compute the transaction's hash over its serialized form
    pub fn hash(&self) -> TransactionHash {
        let bytes =
            bincode::serialize(self).expect("transaction serialization is infallible");
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        hasher.finalize().into()
    }

    /// Partition inputs and outputs into groups keyed by `without_owner`
    /// equality, preserving first-appearance order. States that differ only
    /// by current holder land in one group.
    pub fn group_states(&self) -> Vec<StateGroup> {
        let mut groups: Vec<StateGroup> = Vec::new();

        for input in &self.inputs {
            let key = input.state.without_owner();
            match groups.iter_mut().find(|group| group.key == key) {
                Some(group) => group.inputs.push(input.clone()),
                None => {
                    let mut group = StateGroup::empty(key);
                    group.inputs.push(input.clone());
                    groups.push(group);
                }
            }
        }

        for output in &self.outputs {
            let key = output.without_owner();
            match groups.iter_mut().find(|group| group.key == key) {
                Some(group) => group.outputs.push(output.clone()),
                None => {
                    let mut group = StateGroup::empty(key);
                    group.outputs.push(output.clone());
                    groups.push(group);
                }
            }
        }

        groups
    }
}
