use crate::transaction::StateRef;
use thiserror::Error;

/// Rejection reasons produced by contract verification.
///
/// Every failure path of the contract maps to one of these values; the
/// verifier is total and never panics on malformed transactions. A single
/// violation in any state group rejects the whole transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// The transaction must carry exactly one command
    #[error("expected exactly one command, found {found}")]
    CommandArity { found: usize },

    /// The command kind is not one this contract governs
    #[error("command not recognized by this contract")]
    UnknownCommand,

    /// A move must consume exactly one input in its group
    #[error("a move must consume exactly one input state, found {found}")]
    InputArity { found: usize },

    /// An issuance must produce exactly one output in its group
    #[error("an issuance must produce exactly one output state, found {found}")]
    OutputArity { found: usize },

    /// A move must neither destroy nor duplicate the asset
    #[error("the state is not propagated: a move must produce exactly one output, found {found}")]
    Propagation { found: usize },

    /// A required authorization key is absent from the signer set
    #[error("the transaction is not signed by the {role}")]
    MissingAuthorization { role: &'static str },

    /// Issuances must declare a bounded validity window
    #[error("issuances must be timestamped with a bounded validity window")]
    MissingTimeWindow,

    /// Issued thoughts must carry a non-empty payload
    #[error("the output state does not contain a thought")]
    EmptyPayload,

    /// An issuance must not also consume a prior state of the same line
    #[error("cannot reissue an existing state: issuance group has {inputs} inputs")]
    Reissuance { inputs: usize },
}

/// Failures while assembling a transaction proposal.
///
/// Reported immediately; the builder never assembles a partial proposal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A required party is the anonymous placeholder rather than a resolved
    /// identity
    #[error("the {role} identity is unresolved")]
    UnresolvedIdentity { role: &'static str },
}

/// Failures raised by the flow orchestration layer
#[derive(Error, Debug)]
pub enum FlowError {
    /// The trusted notary could not be found on the network map
    #[error("could not find the trusted notary node")]
    NotaryNotFound,

    /// A well-known party could not be resolved by name
    #[error("could not resolve party '{0}'")]
    PartyNotFound(String),

    /// A counterparty declined to countersign the proposal
    #[error("counterparty refused to sign: {0}")]
    SignatureRefused(String),

    /// A counterparty did not respond within the proposal's validity window
    #[error("timed out waiting for a counterparty signature")]
    SignatureTimeout,

    /// The notary attested a conflicting spend of an input. Terminal: a
    /// losing transaction is permanently invalid and is never retried.
    #[error("notary rejected {reference}: input already consumed")]
    DoubleSpend { reference: StateRef },

    /// An input does not exist among the ledger's unspent states
    #[error("no unspent state found for {reference}")]
    InputNotFound { reference: StateRef },

    /// Local contract verification rejected the proposal
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// The proposal could not be assembled
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Anyhow error wrapper for error context
    #[error(transparent)]
    Context(#[from] anyhow::Error),
}
