use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::ops::Deref;

// PartyKey identifies the key a party authorizes transactions with.
// It is a 32 byte long opaque identifier, resembling a public key. The
// contract layer only ever performs set-membership checks against these
// keys; real signature verification happens outside this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyKey([u8; 32]);

impl fmt::Display for PartyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format as a hex string with a prefix of the first 6 bytes
        let prefix = hex::encode(&self.0[0..6]);
        write!(f, "key:{}", prefix)
    }
}

impl Ord for PartyKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for PartyKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for PartyKey {
    fn default() -> Self {
        PartyKey([0; 32])
    }
}

impl Deref for PartyKey {
    type Target = [u8; 32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartyKey {
    pub fn new(key: [u8; 32]) -> Self {
        PartyKey(key)
    }

    /// Get a reference to the internal bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Derive a key deterministically from the given seeds
    pub fn derive(seeds: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();

        // Domain separator
        hasher.update(b"THOUGHTS_Party");

        for seed in seeds {
            hasher.update(seed);
        }

        PartyKey(hasher.finalize().into())
    }

    /// The all-zero key carried by the anonymous placeholder identity.
    /// Never derivable from any seed, so it is distinct from all real keys.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

/// A resolved network party: a legal name plus the key that authorizes
/// transactions on its behalf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyIdentity {
    pub name: String,
    pub key: PartyKey,
}

impl PartyIdentity {
    /// Create a party whose key is derived from its legal name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            key: PartyKey::derive(&[name.as_bytes()]),
        }
    }

    /// Create a party with an externally supplied key
    pub fn with_key(name: &str, key: PartyKey) -> Self {
        Self {
            name: name.to_string(),
            key,
        }
    }

    /// The placeholder identity used to project a state's owner away when
    /// grouping. Carries the null key, so it never equals a real party.
    pub fn anonymous() -> Self {
        Self {
            name: String::new(),
            key: PartyKey::default(),
        }
    }

    /// Whether this is the placeholder identity rather than a real party
    pub fn is_anonymous(&self) -> bool {
        self.key.is_null()
    }

    /// The key this party authorizes transactions with
    pub fn owning_key(&self) -> &PartyKey {
        &self.key
    }
}

impl fmt::Display for PartyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_anonymous() {
            write!(f, "<anonymous>")
        } else {
            write!(f, "{}", self.name)
        }
    }
}
