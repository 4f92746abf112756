//! Operation facade.
//!
//! Reads resolve a contract handle, call the matching contract method and
//! normalize the result. Writes follow one protocol: require a wallet-bound
//! signer, convert decimal amounts to base units, submit, wait for the
//! receipt, then refresh the affected collection and publish it to the
//! application state. A refresh failing after confirmation is reported as
//! `RefreshFailed`, carrying the hash of the final transaction.
//!
//! Concurrent writes are not serialized by this layer. Ordering and
//! conflicts between them are left to the network and the contract. The
//! only protection is a best-effort guard rejecting a second submission of
//! the same operation on the same entity while the first one is pending.
//! Failures are never retried.

use banx_common::{
    api::{Apartment, Booking, Review, TransactionReceipt},
    crypto::{Address, Hash},
    normalize::{
        narrow, normalize_apartment, normalize_apartments, normalize_bookings, normalize_dates,
        normalize_reviews,
    },
    utils::{from_base_units, to_base_units},
    U256,
};
use chrono::NaiveDate;
use dashmap::DashSet;
use log::{debug, error, info, trace};
use std::sync::Arc;

use crate::{
    booking::{booking_amount, booking_timestamps, FeePolicy},
    contract::{ApartmentParams, BookingRequest, ContractConnector, ContractMethod, DappBanx},
    error::ServiceError,
    state::{StateStore, StateUpdate},
};

// Operation, apartment id, entity id
type InFlightKey = (ContractMethod, u64, u64);

// Releases its key when the operation ends, whatever the outcome
struct InFlightGuard<'a> {
    set: &'a DashSet<InFlightKey>,
    key: InFlightKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.key);
    }
}

// A refresh failing after confirmation must not hide that the write is final
fn refreshed(hash: Hash, result: Result<(), ServiceError>) -> Result<(), ServiceError> {
    result.map_err(|e| ServiceError::RefreshFailed {
        hash,
        source: Box::new(e),
    })
}

fn report<T>(method: ContractMethod, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
    if let Err(e) = &result {
        error!("Error while executing {}: {}", method, e);
    }
    result
}

pub struct MarketplaceService<C: ContractConnector, S: StateStore> {
    connector: C,
    state: Arc<S>,
    fee_policy: FeePolicy,
    in_flight: DashSet<InFlightKey>,
}

impl<C: ContractConnector, S: StateStore> MarketplaceService<C, S> {
    pub fn new(connector: C, state: Arc<S>) -> Self {
        Self {
            connector,
            state,
            fee_policy: FeePolicy::default(),
            in_flight: DashSet::new(),
        }
    }

    pub fn with_fee_policy(mut self, fee_policy: FeePolicy) -> Self {
        self.fee_policy = fee_policy;
        self
    }

    pub fn get_connector(&self) -> &C {
        &self.connector
    }

    pub fn get_state(&self) -> &Arc<S> {
        &self.state
    }

    pub fn get_fee_policy(&self) -> FeePolicy {
        self.fee_policy
    }

    fn begin(
        &self,
        method: ContractMethod,
        aid: u64,
        id: u64,
    ) -> Result<InFlightGuard<'_>, ServiceError> {
        let key = (method, aid, id);
        if !self.in_flight.insert(key) {
            debug!("{} for {} rejected, already in flight", method, id);
            return Err(ServiceError::AlreadyInFlight(method.into(), id));
        }

        Ok(InFlightGuard {
            set: &self.in_flight,
            key,
        })
    }

    // Handle able to sign writes, checked before anything is sent to the contract.
    // Wallet accounts are queried again so authorizations made since the
    // last resolution are picked up, and revoked accounts are dropped.
    async fn wallet_contract(&self) -> Result<C::Contract, ServiceError> {
        let contract = self.connector.connect_for_write().await?;
        if !contract.is_wallet_bound() {
            return Err(ServiceError::NoWalletConnected);
        }
        Ok(contract)
    }

    async fn confirm(contract: &C::Contract, hash: Hash) -> Result<TransactionReceipt, ServiceError> {
        let receipt = contract.confirm(&hash).await?;
        if log::log_enabled!(log::Level::Info) {
            info!(
                "Transaction {} confirmed in block {}",
                hash,
                receipt.block_number.unwrap_or_default()
            );
        }
        Ok(receipt)
    }

    async fn refresh_bookings(&self, contract: &C::Contract, aid: u64) -> Result<(), ServiceError> {
        let bookings = normalize_bookings(contract.get_bookings(aid).await?);
        self.state
            .publish(StateUpdate::Bookings { aid, bookings })
            .await;
        Ok(())
    }

    async fn refresh_timestamps(
        &self,
        contract: &C::Contract,
        aid: u64,
    ) -> Result<(), ServiceError> {
        let dates = normalize_dates(contract.get_unavailable_dates(aid).await?);
        self.state
            .publish(StateUpdate::Timestamps { aid, dates })
            .await;
        Ok(())
    }

    async fn refresh_reviews(&self, contract: &C::Contract, aid: u64) -> Result<(), ServiceError> {
        let reviews = normalize_reviews(contract.get_reviews(aid).await?);
        self.state
            .publish(StateUpdate::Reviews { aid, reviews })
            .await;
        Ok(())
    }

    async fn fee_percent(&self, contract: &C::Contract) -> Result<u64, ServiceError> {
        match self.fee_policy {
            FeePolicy::Fixed(percent) => Ok(percent),
            FeePolicy::Contract => Ok(narrow(contract.security_fee().await?)),
        }
    }

    async fn quote_with(
        &self,
        contract: &C::Contract,
        aid: u64,
        nights: u64,
    ) -> Result<U256, ServiceError> {
        let price = contract.get_apartment(aid).await?.price;
        let fee_percent = self.fee_percent(contract).await?;
        Ok(booking_amount(price, nights, fee_percent)?)
    }

    async fn book_with(
        &self,
        contract: &C::Contract,
        aid: u64,
        timestamps: &[u64],
        value: U256,
    ) -> Result<TransactionReceipt, ServiceError> {
        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Booking {} nights of apartment {} for {}",
                timestamps.len(),
                aid,
                from_base_units(value)
            );
        }

        let hash = contract.book_apartment(aid, timestamps, value).await?;
        let receipt = Self::confirm(contract, hash).await?;
        refreshed(hash, self.refresh_timestamps(contract, aid).await)?;
        Ok(receipt)
    }

    // Reads

    pub async fn get_my_apartments(&self) -> Result<Vec<Apartment>, ServiceError> {
        trace!("get my apartments");
        let contract = self.connector.connect().await?;
        Ok(normalize_apartments(contract.get_apartments().await?))
    }

    pub async fn get_apartment(&self, id: u64) -> Result<Apartment, ServiceError> {
        trace!("get apartment {}", id);
        let contract = self.connector.connect().await?;
        Ok(normalize_apartment(contract.get_apartment(id).await?))
    }

    pub async fn get_bookings(&self, aid: u64) -> Result<Vec<Booking>, ServiceError> {
        trace!("get bookings of {}", aid);
        let contract = self.connector.connect().await?;
        Ok(normalize_bookings(contract.get_bookings(aid).await?))
    }

    pub async fn get_booked_dates(&self, aid: u64) -> Result<Vec<u64>, ServiceError> {
        trace!("get booked dates of {}", aid);
        let contract = self.connector.connect().await?;
        Ok(normalize_dates(contract.get_unavailable_dates(aid).await?))
    }

    pub async fn get_qualified_reviewers(&self, aid: u64) -> Result<Vec<Address>, ServiceError> {
        trace!("get qualified reviewers of {}", aid);
        let contract = self.connector.connect().await?;
        contract.get_qualified_reviewers(aid).await
    }

    pub async fn get_reviews(&self, aid: u64) -> Result<Vec<Review>, ServiceError> {
        trace!("get reviews of {}", aid);
        let contract = self.connector.connect().await?;
        Ok(normalize_reviews(contract.get_reviews(aid).await?))
    }

    // Percentage configured in the contract
    pub async fn get_security_fee(&self) -> Result<u64, ServiceError> {
        trace!("get security fee");
        let contract = self.connector.connect().await?;
        Ok(narrow(contract.security_fee().await?))
    }

    // Decimal payment for `nights` nights of `aid` under the fee policy
    pub async fn quote_booking(&self, aid: u64, nights: u64) -> Result<String, ServiceError> {
        let contract = self.connector.connect().await?;
        let amount = self.quote_with(&contract, aid, nights).await?;
        Ok(from_base_units(amount))
    }

    // Writes

    pub async fn create_apartment(
        &self,
        params: &ApartmentParams,
    ) -> Result<TransactionReceipt, ServiceError> {
        let method = ContractMethod::CreateApartment;
        report(
            method,
            async {
                let contract = self.wallet_contract().await?;
                let call = params.to_call()?;
                let hash = contract.create_apartment(&call).await?;
                Self::confirm(&contract, hash).await
            }
            .await,
        )
    }

    pub async fn update_apartment(
        &self,
        id: u64,
        params: &ApartmentParams,
    ) -> Result<TransactionReceipt, ServiceError> {
        let method = ContractMethod::UpdateApartment;
        report(
            method,
            async {
                let _guard = self.begin(method, id, id)?;
                let contract = self.wallet_contract().await?;
                let call = params.to_call()?;
                let hash = contract.update_apartment(id, &call).await?;
                Self::confirm(&contract, hash).await
            }
            .await,
        )
    }

    pub async fn delete_apartment(&self, id: u64) -> Result<TransactionReceipt, ServiceError> {
        let method = ContractMethod::DeleteApartment;
        report(
            method,
            async {
                let _guard = self.begin(method, id, id)?;
                let contract = self.wallet_contract().await?;
                let hash = contract.delete_apartment(id).await?;
                Self::confirm(&contract, hash).await
            }
            .await,
        )
    }

    pub async fn book_apartment(
        &self,
        request: &BookingRequest,
    ) -> Result<TransactionReceipt, ServiceError> {
        let method = ContractMethod::BookApartment;
        report(
            method,
            async {
                let _guard = self.begin(method, request.aid, request.aid)?;
                let contract = self.wallet_contract().await?;
                let value = to_base_units(&request.amount)?;
                self.book_with(&contract, request.aid, &request.timestamps, value)
                    .await
            }
            .await,
        )
    }

    // Book every night from check-in to check-out, paying the quoted amount
    pub async fn book_nights(
        &self,
        aid: u64,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<TransactionReceipt, ServiceError> {
        let method = ContractMethod::BookApartment;
        report(
            method,
            async {
                let _guard = self.begin(method, aid, aid)?;
                let contract = self.wallet_contract().await?;
                let timestamps = booking_timestamps(check_in, check_out)?;
                let value = self
                    .quote_with(&contract, aid, timestamps.len() as u64)
                    .await?;
                self.book_with(&contract, aid, &timestamps, value).await
            }
            .await,
        )
    }

    pub async fn check_in_apartment(
        &self,
        aid: u64,
        booking_id: u64,
    ) -> Result<TransactionReceipt, ServiceError> {
        let method = ContractMethod::CheckInApartment;
        report(
            method,
            async {
                let _guard = self.begin(method, aid, booking_id)?;
                let contract = self.wallet_contract().await?;
                let hash = contract.check_in_apartment(aid, booking_id).await?;
                let receipt = Self::confirm(&contract, hash).await?;
                refreshed(hash, self.refresh_bookings(&contract, aid).await)?;
                Ok(receipt)
            }
            .await,
        )
    }

    pub async fn refund_booking(
        &self,
        aid: u64,
        booking_id: u64,
    ) -> Result<TransactionReceipt, ServiceError> {
        let method = ContractMethod::RefundBooking;
        report(
            method,
            async {
                let _guard = self.begin(method, aid, booking_id)?;
                let contract = self.wallet_contract().await?;
                let hash = contract.refund_booking(aid, booking_id).await?;
                let receipt = Self::confirm(&contract, hash).await?;
                refreshed(hash, self.refresh_bookings(&contract, aid).await)?;
                Ok(receipt)
            }
            .await,
        )
    }

    pub async fn claim_funds(
        &self,
        aid: u64,
        booking_id: u64,
    ) -> Result<TransactionReceipt, ServiceError> {
        let method = ContractMethod::ClaimFunds;
        report(
            method,
            async {
                let _guard = self.begin(method, aid, booking_id)?;
                let contract = self.wallet_contract().await?;
                let hash = contract.claim_funds(aid, booking_id).await?;
                let receipt = Self::confirm(&contract, hash).await?;
                refreshed(hash, self.refresh_bookings(&contract, aid).await)?;
                Ok(receipt)
            }
            .await,
        )
    }

    pub async fn add_review(
        &self,
        aid: u64,
        comment: &str,
    ) -> Result<TransactionReceipt, ServiceError> {
        let method = ContractMethod::AddReview;
        report(
            method,
            async {
                let _guard = self.begin(method, aid, aid)?;
                let contract = self.wallet_contract().await?;
                let hash = contract.add_review(aid, comment).await?;
                let receipt = Self::confirm(&contract, hash).await?;
                refreshed(hash, self.refresh_reviews(&contract, aid).await)?;
                Ok(receipt)
            }
            .await,
        )
    }
}
