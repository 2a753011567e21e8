use ethers::abi::RawLog;
use ethers::prelude::*;
use tracing::{debug, trace};

use crate::block_chain::contracts::{ApprovalEvent, QuizCreatedEvent, TransferEvent};
use crate::error::QuizTokenError;

/// Events the service knows how to decode, one variant per schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KnownEvent {
    QuizCreated(QuizCreatedEvent),
    Approval(ApprovalEvent),
    Transfer(TransferEvent),
}

fn raw_log(log: &Log) -> RawLog {
    RawLog::from((log.topics.clone(), log.data.to_vec()))
}

/// Decodes `log` as `E` if its first topic carries `E`'s signature.
/// Unrelated or malformed logs give `None`.
pub fn decode_as<E: EthEvent>(log: &Log) -> Option<E> {
    if log.topics.first() != Some(&E::signature()) {
        return None;
    }
    match E::decode_log(&raw_log(log)) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!(event = %E::name(), error = %e, "skipping malformed log");
            None
        }
    }
}

pub fn decode_log(log: &Log) -> Option<KnownEvent> {
    decode_as::<QuizCreatedEvent>(log)
        .map(KnownEvent::QuizCreated)
        .or_else(|| decode_as::<ApprovalEvent>(log).map(KnownEvent::Approval))
        .or_else(|| decode_as::<TransferEvent>(log).map(KnownEvent::Transfer))
}

/// First log in `logs` that decodes as `E`.
pub fn find_event<E: EthEvent>(logs: &[Log]) -> Option<E> {
    logs.iter().find_map(|log| {
        trace!(address = ?log.address, topics = log.topics.len(), "scanning log");
        decode_as::<E>(log)
    })
}

/// Recovers the id assigned by the factory from a mined `createQuiz` receipt.
pub fn quiz_id_from_receipt(receipt: &TransactionReceipt) -> Result<U256, QuizTokenError> {
    find_event::<QuizCreatedEvent>(&receipt.logs)
        .map(|event| event.quiz_id)
        .ok_or(QuizTokenError::EventNotFound(receipt.logs.len()))
}
