//! Contract client.
//!
//! `DappBanx` is the statically declared surface of the marketplace
//! contract: one typed method per contract method. `ContractHandle` is the
//! network implementation, produced by `ContractFactory` from the resolved
//! signer. Errors from the provider are passed through untouched.

mod handle;
mod methods;

use async_trait::async_trait;
use banx_common::{
    api::{RawApartment, RawBooking, RawReview, TransactionReceipt},
    crypto::{Address, Hash},
    U256,
};

use crate::error::ServiceError;

pub use handle::*;
pub use methods::*;

#[async_trait]
pub trait DappBanx: Send + Sync {
    // Whether writes can be signed by an authorized wallet account
    fn is_wallet_bound(&self) -> bool;

    async fn get_apartments(&self) -> Result<Vec<RawApartment>, ServiceError>;

    async fn get_apartment(&self, id: u64) -> Result<RawApartment, ServiceError>;

    async fn get_bookings(&self, aid: u64) -> Result<Vec<RawBooking>, ServiceError>;

    async fn get_unavailable_dates(&self, aid: u64) -> Result<Vec<U256>, ServiceError>;

    async fn get_qualified_reviewers(&self, aid: u64) -> Result<Vec<Address>, ServiceError>;

    async fn get_reviews(&self, aid: u64) -> Result<Vec<RawReview>, ServiceError>;

    async fn security_fee(&self) -> Result<U256, ServiceError>;

    // Write methods return the hash of the submitted, not yet confirmed, transaction

    async fn create_apartment(&self, apartment: &ApartmentCall) -> Result<Hash, ServiceError>;

    async fn update_apartment(
        &self,
        id: u64,
        apartment: &ApartmentCall,
    ) -> Result<Hash, ServiceError>;

    async fn delete_apartment(&self, id: u64) -> Result<Hash, ServiceError>;

    // `value` is the payment attached to the call, in base units
    async fn book_apartment(
        &self,
        aid: u64,
        timestamps: &[u64],
        value: U256,
    ) -> Result<Hash, ServiceError>;

    async fn check_in_apartment(&self, aid: u64, booking_id: u64) -> Result<Hash, ServiceError>;

    async fn refund_booking(&self, aid: u64, booking_id: u64) -> Result<Hash, ServiceError>;

    async fn claim_funds(&self, aid: u64, booking_id: u64) -> Result<Hash, ServiceError>;

    async fn add_review(&self, aid: u64, comment: &str) -> Result<Hash, ServiceError>;

    // Wait until the transaction is mined. A reverted transaction is an error.
    // Dropping the future abandons the wait, not the transaction.
    async fn confirm(&self, hash: &Hash) -> Result<TransactionReceipt, ServiceError>;
}

// Source of bound contract handles for the facade
#[async_trait]
pub trait ContractConnector: Send + Sync {
    type Contract: DappBanx;

    async fn connect(&self) -> Result<Self::Contract, ServiceError>;

    // Handle for a write, with the wallet accounts queried again
    async fn connect_for_write(&self) -> Result<Self::Contract, ServiceError> {
        self.connect().await
    }
}
