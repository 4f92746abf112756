use banx_common::{
    abi::ReaderError, crypto::Hash, rpc::RpcError, utils::AmountError,
};
use thiserror::Error;

use crate::booking::BookingError;

#[derive(Debug, Error)]
pub enum ServiceError {
    // Raised locally, before any network call
    #[error("No wallet connected")]
    NoWalletConnected,
    // Provider unreachable, malformed request or response
    #[error("Network or provider error: {}", _0)]
    Network(RpcError),
    // Reverted transaction or failing read against current chain state
    #[error("Contract execution error: {}", _0)]
    ContractExecution(RpcError),
    #[error("Transaction {} reverted", _0)]
    Reverted(Hash),
    #[error("Invalid contract response: {}", _0)]
    Decode(#[from] ReaderError),
    #[error("Invalid amount: {}", _0)]
    Amount(#[from] AmountError),
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error("A {} for id {} is already in flight", _0, _1)]
    AlreadyInFlight(&'static str, u64),
    // The write is final on chain, only the follow-up read failed
    #[error("Transaction {} confirmed but refreshing its state failed: {}", hash, source)]
    RefreshFailed {
        hash: Hash,
        source: Box<ServiceError>,
    },
}

impl ServiceError {
    pub fn is_contract_execution(&self) -> bool {
        matches!(self, Self::ContractExecution(_) | Self::Reverted(_))
    }

    // Hash of a transaction that was confirmed despite the error
    pub fn confirmed_hash(&self) -> Option<&Hash> {
        match self {
            Self::RefreshFailed { hash, .. } => Some(hash),
            _ => None,
        }
    }
}

impl From<RpcError> for ServiceError {
    fn from(err: RpcError) -> Self {
        if err.is_execution_error() {
            Self::ContractExecution(err)
        } else {
            Self::Network(err)
        }
    }
}
