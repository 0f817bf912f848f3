//! Transaction verification.
//!
//! A transaction is valid if every state group satisfies the rules of the
//! single command it carries. Verification is pure: it reads only the
//! transaction it is handed, never recovers from a violation, and surfaces
//! every failure as a [`ContractError`] value.

use thoughts_core::command::{Command, CommandData};
use thoughts_core::error::ContractError;
use thoughts_core::transaction::{LedgerTransaction, StateGroup, TimeWindow};

/// Verify a proposed transaction against the thought contract rules.
///
/// Inputs and outputs are partitioned by the `without_owner` projection
/// first, so unrelated asset lines in a batched transaction are judged
/// independently; any one failing group rejects the whole transaction.
pub fn verify(tx: &LedgerTransaction) -> Result<(), ContractError> {
    let command = single_command(tx)?;

    for group in tx.group_states() {
        match command.data {
            CommandData::Move => verify_move(&group, command)?,
            CommandData::Issue => verify_issue(tx.time_window.as_ref(), &group, command)?,
            _ => return Err(ContractError::UnknownCommand),
        }
    }

    Ok(())
}

fn single_command(tx: &LedgerTransaction) -> Result<&Command, ContractError> {
    match tx.commands.as_slice() {
        [command] => Ok(command),
        other => Err(ContractError::CommandArity { found: other.len() }),
    }
}

/// A move retargets exactly one state to a new owner, authorized by the
/// current owner of the input being consumed.
fn verify_move(group: &StateGroup, command: &Command) -> Result<(), ContractError> {
    let input = match group.inputs.as_slice() {
        [input] => input,
        other => return Err(ContractError::InputArity { found: other.len() }),
    };

    if !command.signed_by(input.state.owner.owning_key()) {
        return Err(ContractError::MissingAuthorization { role: "owner" });
    }

    if group.outputs.len() != 1 {
        return Err(ContractError::Propagation {
            found: group.outputs.len(),
        });
    }

    Ok(())
}

/// An issuance creates exactly one new state out of nothing, authorized by
/// its declared issuer and bounded by a validity window.
fn verify_issue(
    time_window: Option<&TimeWindow>,
    group: &StateGroup,
    command: &Command,
) -> Result<(), ContractError> {
    match time_window {
        Some(window) if window.until_time.is_some() => {}
        _ => return Err(ContractError::MissingTimeWindow),
    }

    let output = match group.outputs.as_slice() {
        [output] => output,
        other => return Err(ContractError::OutputArity { found: other.len() }),
    };

    if !command.signed_by(output.issuer.owning_key()) {
        return Err(ContractError::MissingAuthorization { role: "issuer" });
    }

    if output.thought.is_empty() {
        return Err(ContractError::EmptyPayload);
    }

    if !group.inputs.is_empty() {
        return Err(ContractError::Reissuance {
            inputs: group.inputs.len(),
        });
    }

    Ok(())
}
