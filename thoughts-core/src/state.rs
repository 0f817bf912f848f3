use crate::identity::PartyIdentity;
use serde::{Deserialize, Serialize};

/// One unit of the tracked asset at a point in ledger history.
///
/// A thought is created by an Issue command and retargeted to a new owner by
/// each Move command; the ledger destroys the old record and creates a new
/// one, so every instance is an immutable value. The issuer never changes for
/// the lifetime of the asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThoughtState {
    /// Opaque payload; must be non-empty for issuance to be valid
    pub thought: String,

    /// The party that created the asset
    pub issuer: PartyIdentity,

    /// The current holder
    pub owner: PartyIdentity,
}

impl ThoughtState {
    pub fn new(thought: impl Into<String>, issuer: PartyIdentity, owner: PartyIdentity) -> Self {
        Self {
            thought: thought.into(),
            issuer,
            owner,
        }
    }

    /// The parties that must receive this state
    pub fn participants(&self) -> Vec<&PartyIdentity> {
        vec![&self.owner, &self.issuer]
    }

    /// Copy of this state with the owner projected away.
    ///
    /// States along one issue-move-move chain differ only by owner, so this
    /// projection is the grouping key that keeps unrelated asset lines in a
    /// batched transaction from interfering with each other.
    pub fn without_owner(&self) -> Self {
        Self {
            owner: PartyIdentity::anonymous(),
            ..self.clone()
        }
    }

    /// Copy of this state retargeted to a new owner
    pub fn with_owner(&self, new_owner: PartyIdentity) -> Self {
        Self {
            owner: new_owner,
            ..self.clone()
        }
    }
}
