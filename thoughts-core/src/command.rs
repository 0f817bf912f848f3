use crate::identity::PartyKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The operations the thought contract recognizes.
///
/// Marked non-exhaustive so the contract crate keeps a real rejection arm for
/// command kinds it does not recognize.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandData {
    /// Create a brand-new asset with zero inputs and one output
    Issue,
    /// Retarget an existing asset to a new owner
    Move,
}

/// A command together with the keys that authorized it.
///
/// The signer set is attached by the orchestration layer once each required
/// party has signed; the contract only checks membership against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub data: CommandData,
    pub signers: BTreeSet<PartyKey>,
}

impl Command {
    /// Create a command authorized by a single key
    pub fn new(data: CommandData, signer: PartyKey) -> Self {
        Self {
            data,
            signers: BTreeSet::from([signer]),
        }
    }

    /// Create a command authorized by several keys
    pub fn with_signers(data: CommandData, signers: impl IntoIterator<Item = PartyKey>) -> Self {
        Self {
            data,
            signers: signers.into_iter().collect(),
        }
    }

    /// Whether the given key is in the command's signer set
    pub fn signed_by(&self, key: &PartyKey) -> bool {
        self.signers.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_by() {
        let owner = PartyKey::derive(&[b"owner"]);
        let stranger = PartyKey::derive(&[b"stranger"]);

        let command = Command::new(CommandData::Move, owner);
        assert!(command.signed_by(&owner));
        assert!(!command.signed_by(&stranger));
    }

    #[test]
    fn test_with_signers_deduplicates() {
        let key = PartyKey::derive(&[b"issuer"]);
        let command = Command::with_signers(CommandData::Issue, [key, key]);
        assert_eq!(command.signers.len(), 1);
    }
}
