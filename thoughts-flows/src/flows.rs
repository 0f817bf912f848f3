//! Issue and move flows.
//!
//! Both flows follow the same shape: build the proposal, bind a ten-second
//! validity window, verify locally, sign, gather the counterparty's
//! signature and finalize with the notary.

use chrono::Duration;
use log::{debug, info};

use crate::services::{CommittedTransaction, NodeServices};
use thoughts_contract::TransactionBuilder;
use thoughts_core::error::FlowError;
use thoughts_core::identity::PartyIdentity;
use thoughts_core::transaction::{LedgerTransaction, StateAndRef, TimeWindow};

/// How long a proposal stays valid once submitted for signing, in seconds
pub const PROPOSAL_VALIDITY_SECS: i64 = 10;

fn proposal_window(services: &impl NodeServices) -> TimeWindow {
    TimeWindow::from_start_and_duration(
        services.now(),
        Duration::seconds(PROPOSAL_VALIDITY_SECS),
    )
}

/// Issue a new thought owned by this node and countersigned by its issuer
pub fn issue_thought(
    services: &impl NodeServices,
    thought: &str,
    issuer: &PartyIdentity,
) -> Result<CommittedTransaction, FlowError> {
    let notary = services.notary()?;
    let me = services.our_identity();

    let mut builder = TransactionBuilder::generate_issue(thought, issuer, &me, &notary)?;
    builder.set_time_window(proposal_window(services));
    builder.verify()?;

    let signed = services.sign_initial(builder.build());
    let id = signed.id();
    debug!(
        "issue proposal {} awaiting countersignature from {}",
        hex::encode(&id[0..6]),
        issuer
    );

    let fully_signed = services.collect_signatures(signed, std::slice::from_ref(issuer))?;
    let committed = services.finalize(fully_signed)?;
    info!(
        "issued thought in transaction {}",
        hex::encode(&committed.id[0..6])
    );
    Ok(committed)
}

/// Move an existing thought to a new owner
pub fn move_thought(
    services: &impl NodeServices,
    input: StateAndRef,
    new_owner: &PartyIdentity,
) -> Result<CommittedTransaction, FlowError> {
    let notary = services.notary()?;

    let mut builder = TransactionBuilder::new(notary)?;
    builder.generate_move(input, new_owner)?;
    builder.set_time_window(proposal_window(services));
    builder.verify()?;

    let signed = services.sign_initial(builder.build());
    let id = signed.id();
    debug!(
        "move proposal {} awaiting countersignature from {}",
        hex::encode(&id[0..6]),
        new_owner
    );

    let fully_signed = services.collect_signatures(signed, std::slice::from_ref(new_owner))?;
    let committed = services.finalize(fully_signed)?;
    info!(
        "moved thought to {} in transaction {}",
        new_owner,
        hex::encode(&committed.id[0..6])
    );
    Ok(committed)
}

/// Acceptance check an issuance counterparty runs before countersigning:
/// a single output that names the countersigning node as issuer.
pub fn check_issue_proposal(
    tx: &LedgerTransaction,
    our_identity: &PartyIdentity,
) -> Result<(), FlowError> {
    let output = match tx.outputs.as_slice() {
        [output] => output,
        _ => {
            return Err(FlowError::SignatureRefused(
                "expected a single output state".to_string(),
            ))
        }
    };
    if output.issuer.owning_key() != our_identity.owning_key() {
        return Err(FlowError::SignatureRefused(
            "the issuer must be the countersigning node".to_string(),
        ));
    }
    Ok(())
}

/// Acceptance check a move counterparty (the incoming owner) runs before
/// countersigning: a single output retargeted to the countersigning node.
pub fn check_move_proposal(
    tx: &LedgerTransaction,
    our_identity: &PartyIdentity,
) -> Result<(), FlowError> {
    let output = match tx.outputs.as_slice() {
        [output] => output,
        _ => {
            return Err(FlowError::SignatureRefused(
                "expected a single output state".to_string(),
            ))
        }
    };
    if output.owner.owning_key() != our_identity.owning_key() {
        return Err(FlowError::SignatureRefused(
            "the new owner must be the countersigning node".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockNode;
    use chrono::Duration;
    use thoughts_contract::contract;
    use thoughts_core::error::{ContractError, FlowError};
    use thoughts_core::state::ThoughtState;

    const THOUGHT: &str = "TESTING IS A PARALLEL UNIVERSE";

    fn node_with_bank() -> (MockNode, PartyIdentity) {
        let mut node = MockNode::new("BCS Learning");
        let bank = node.register_party("Bank of Bloemfontein");
        (node, bank)
    }

    #[test]
    fn issue_flow_commits_and_records_the_state() {
        let (node, bank) = node_with_bank();

        let committed = issue_thought(&node, THOUGHT, &bank).unwrap();
        assert_eq!(committed.transaction.outputs.len(), 1);

        let me = node.our_identity();
        let unspent = node.unspent_states(Some(&me));
        assert_eq!(unspent.len(), 1);
        assert_eq!(unspent[0].state.thought, THOUGHT);
        assert_eq!(unspent[0].state.issuer, bank);
        assert_eq!(unspent[0].state.owner, me);
    }

    #[test]
    fn issue_flow_binds_the_ten_second_window() {
        let (node, bank) = node_with_bank();

        let committed = issue_thought(&node, THOUGHT, &bank).unwrap();
        let window = committed.transaction.time_window.unwrap();
        assert_eq!(window.from_time, Some(node.now()));
        assert_eq!(
            window.until_time,
            Some(node.now() + Duration::seconds(PROPOSAL_VALIDITY_SECS))
        );
    }

    #[test]
    fn empty_thought_is_rejected_by_verification_not_the_builder() {
        let (node, bank) = node_with_bank();

        let err = issue_thought(&node, "", &bank).unwrap_err();
        assert!(matches!(
            err,
            FlowError::Contract(ContractError::EmptyPayload)
        ));
        assert!(node.unspent_states(None).is_empty());
    }

    #[test]
    fn issue_then_move_transfers_ownership() {
        let (mut node, bank) = node_with_bank();
        let alice = node.register_party("Alice");

        issue_thought(&node, THOUGHT, &bank).unwrap();

        let me = node.our_identity();
        let held = node.unspent_states(Some(&me));
        let committed = move_thought(&node, held[0].clone(), &alice).unwrap();

        assert!(node.unspent_states(Some(&me)).is_empty());
        let alices = node.unspent_states(Some(&alice));
        assert_eq!(alices.len(), 1);
        assert_eq!(alices[0].state.owner, alice);
        assert_eq!(alices[0].state.issuer, bank);
        assert_eq!(alices[0].reference.txhash, committed.id);
    }

    #[test]
    fn double_spend_passes_locally_but_is_rejected_by_the_notary() {
        let (mut node, bank) = node_with_bank();
        let alice = node.register_party("Alice");
        let bob = node.register_party("Bob");

        issue_thought(&node, THOUGHT, &bank).unwrap();
        let held = node.unspent_states(Some(&node.our_identity()));
        let input = held[0].clone();

        move_thought(&node, input.clone(), &alice).unwrap();

        // The conflicting move is valid by local rules alone.
        let mut builder = TransactionBuilder::new(node.notary().unwrap()).unwrap();
        builder.generate_move(input.clone(), &bob).unwrap();
        builder.set_time_window(TimeWindow::from_start_and_duration(
            node.now(),
            Duration::seconds(PROPOSAL_VALIDITY_SECS),
        ));
        assert_eq!(contract::verify(&builder.build()), Ok(()));

        // The notary has already attested a conflicting spend.
        let err = move_thought(&node, input.clone(), &bob).unwrap_err();
        assert!(matches!(
            err,
            FlowError::DoubleSpend { reference } if reference == input.reference
        ));
    }

    #[test]
    fn counterparty_refuses_a_foreign_issuer() {
        let (node, bank) = node_with_bank();
        let someone_else = PartyIdentity::new("Someone Else");

        let builder = TransactionBuilder::generate_issue(
            THOUGHT,
            &bank,
            &node.our_identity(),
            &node.notary().unwrap(),
        )
        .unwrap();

        let err = check_issue_proposal(&builder.build(), &someone_else).unwrap_err();
        assert!(matches!(err, FlowError::SignatureRefused(_)));
    }

    #[test]
    fn move_counterparty_refuses_when_not_the_new_owner() {
        let bank = PartyIdentity::new("Bank");
        let alice = PartyIdentity::new("Alice");
        let bob = PartyIdentity::new("Bob");

        let state = ThoughtState::new(THOUGHT, bank.clone(), bank);
        let input = thoughts_core::transaction::StateAndRef::new(
            thoughts_core::transaction::StateRef::new([1; 32], 0),
            state,
        );

        let mut builder = TransactionBuilder::new(PartyIdentity::new("Notary")).unwrap();
        builder.generate_move(input, &alice).unwrap();
        let tx = builder.build();

        assert!(check_move_proposal(&tx, &alice).is_ok());
        assert!(matches!(
            check_move_proposal(&tx, &bob).unwrap_err(),
            FlowError::SignatureRefused(_)
        ));
    }

    #[test]
    fn issue_flow_fails_without_a_notary() {
        let mut node = MockNode::new("BCS Learning").without_notary();
        let bank = node.register_party("Bank");

        let err = issue_thought(&node, THOUGHT, &bank).unwrap_err();
        assert!(matches!(err, FlowError::NotaryNotFound));
    }

    #[test]
    fn unknown_parties_do_not_resolve() {
        let (node, _) = node_with_bank();
        let err = node.resolve_party("Nobody In Particular").unwrap_err();
        assert!(matches!(err, FlowError::PartyNotFound(_)));
    }
}
