//! Assembly of issuance and move proposals.
//!
//! The builder produces syntactically well-formed transactions the contract
//! is expected to accept. It refuses unresolved identities immediately but
//! deliberately does not pre-check payload contents; that is the contract's
//! job. Callers set the validity time window before submission.

use log::debug;

use crate::contract;
use thoughts_core::command::{Command, CommandData};
use thoughts_core::error::{BuildError, ContractError};
use thoughts_core::identity::PartyIdentity;
use thoughts_core::state::ThoughtState;
use thoughts_core::transaction::{LedgerTransaction, StateAndRef, TimeWindow};

/// Incrementally assembles a transaction proposal bound to a notary
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    notary: PartyIdentity,
    inputs: Vec<StateAndRef>,
    outputs: Vec<ThoughtState>,
    commands: Vec<Command>,
    time_window: Option<TimeWindow>,
}

impl TransactionBuilder {
    /// Create an empty builder bound to the given notary
    pub fn new(notary: PartyIdentity) -> Result<Self, BuildError> {
        if notary.is_anonymous() {
            return Err(BuildError::UnresolvedIdentity { role: "notary" });
        }
        Ok(Self {
            notary,
            inputs: Vec::new(),
            outputs: Vec::new(),
            commands: Vec::new(),
            time_window: None,
        })
    }

    /// Assemble an issuance proposal: one new thought as the sole output,
    /// with an Issue command authorized by the issuer's key.
    pub fn generate_issue(
        thought: &str,
        issuer: &PartyIdentity,
        owner: &PartyIdentity,
        notary: &PartyIdentity,
    ) -> Result<Self, BuildError> {
        if issuer.is_anonymous() {
            return Err(BuildError::UnresolvedIdentity { role: "issuer" });
        }
        if owner.is_anonymous() {
            return Err(BuildError::UnresolvedIdentity { role: "owner" });
        }

        let mut builder = Self::new(notary.clone())?;
        let state = ThoughtState::new(thought, issuer.clone(), owner.clone());
        builder.outputs.push(state);
        builder
            .commands
            .push(Command::new(CommandData::Issue, *issuer.owning_key()));

        debug!("assembled issue proposal: issuer {}, owner {}", issuer, owner);
        Ok(builder)
    }

    /// Add a move of an existing state to a new owner.
    ///
    /// The output is a copy of the input's state retargeted to `new_owner`;
    /// the Move command is authorized by the key of the *current* owner of
    /// the input being consumed, not the new owner.
    pub fn generate_move(
        &mut self,
        input: StateAndRef,
        new_owner: &PartyIdentity,
    ) -> Result<(), BuildError> {
        if new_owner.is_anonymous() {
            return Err(BuildError::UnresolvedIdentity { role: "new owner" });
        }

        let current_owner_key = *input.state.owner.owning_key();
        let output = input.state.with_owner(new_owner.clone());

        debug!(
            "assembled move of {}: {} -> {}",
            input.reference, input.state.owner, new_owner
        );

        self.inputs.push(input);
        self.outputs.push(output);
        self.commands
            .push(Command::new(CommandData::Move, current_owner_key));
        Ok(())
    }

    /// Set the validity window. Builders leave it unset; the orchestration
    /// layer binds it just before submission.
    pub fn set_time_window(&mut self, window: TimeWindow) {
        self.time_window = Some(window);
    }

    /// Materialize the current contents as a transaction
    pub fn build(&self) -> LedgerTransaction {
        LedgerTransaction {
            notary: self.notary.clone(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            commands: self.commands.clone(),
            time_window: self.time_window,
        }
    }

    /// Run contract verification against the current contents
    pub fn verify(&self) -> Result<(), ContractError> {
        contract::verify(&self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use thoughts_core::transaction::StateRef;

    fn party(name: &str) -> PartyIdentity {
        PartyIdentity::new(name)
    }

    fn window() -> TimeWindow {
        TimeWindow::from_start_and_duration(Utc::now(), Duration::seconds(10))
    }

    #[test]
    fn issue_rejects_unresolved_identities() {
        let bank = party("Bank");
        let anon = PartyIdentity::anonymous();

        assert_eq!(
            TransactionBuilder::generate_issue("x", &anon, &bank, &bank).unwrap_err(),
            BuildError::UnresolvedIdentity { role: "issuer" }
        );
        assert_eq!(
            TransactionBuilder::generate_issue("x", &bank, &anon, &bank).unwrap_err(),
            BuildError::UnresolvedIdentity { role: "owner" }
        );
        assert_eq!(
            TransactionBuilder::generate_issue("x", &bank, &bank, &anon).unwrap_err(),
            BuildError::UnresolvedIdentity { role: "notary" }
        );
    }

    #[test]
    fn issue_leaves_time_window_unset() {
        let bank = party("Bank");
        let builder =
            TransactionBuilder::generate_issue("a thought", &bank, &bank, &party("Notary"))
                .unwrap();
        assert!(builder.build().time_window.is_none());
    }

    #[test]
    fn issue_does_not_precheck_the_payload() {
        let bank = party("Bank");

        // Building an empty thought succeeds; the contract rejects it.
        let mut builder =
            TransactionBuilder::generate_issue("", &bank, &bank, &party("Notary")).unwrap();
        builder.set_time_window(window());
        assert_eq!(builder.verify(), Err(ContractError::EmptyPayload));
    }

    #[test]
    fn timed_issue_verifies() {
        let bank = party("Bank");
        let mut builder =
            TransactionBuilder::generate_issue("a thought", &bank, &bank, &party("Notary"))
                .unwrap();
        builder.set_time_window(window());
        assert_eq!(builder.verify(), Ok(()));

        let tx = builder.build();
        assert_eq!(tx.outputs.len(), 1);
        assert!(tx.inputs.is_empty());
        assert!(tx.commands[0].signed_by(bank.owning_key()));
    }

    #[test]
    fn move_is_signed_by_the_current_owner() {
        let bank = party("Bank");
        let alice = party("Alice");

        let state = ThoughtState::new("held by bank", bank.clone(), bank.clone());
        let input = StateAndRef::new(StateRef::new([1; 32], 0), state);

        let mut builder = TransactionBuilder::new(party("Notary")).unwrap();
        builder.generate_move(input, &alice).unwrap();

        let tx = builder.build();
        assert!(tx.commands[0].signed_by(bank.owning_key()));
        assert!(!tx.commands[0].signed_by(alice.owning_key()));
        assert_eq!(tx.outputs[0].owner, alice);
        assert_eq!(tx.outputs[0].issuer, bank);
        assert_eq!(contract::verify(&tx), Ok(()));
    }

    #[test]
    fn move_rejects_an_unresolved_new_owner() {
        let bank = party("Bank");
        let state = ThoughtState::new("x", bank.clone(), bank);
        let input = StateAndRef::new(StateRef::new([1; 32], 0), state);

        let mut builder = TransactionBuilder::new(party("Notary")).unwrap();
        assert_eq!(
            builder
                .generate_move(input, &PartyIdentity::anonymous())
                .unwrap_err(),
            BuildError::UnresolvedIdentity { role: "new owner" }
        );
    }
}
