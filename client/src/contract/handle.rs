use async_trait::async_trait;
use banx_common::{
    abi::{decode, ReaderError, Token},
    api::{
        records_from_token, CallRequest, RawApartment, RawBooking, RawReview, TransactionReceipt,
        TransactionRequest,
    },
    crypto::{Address, Hash},
    U256,
};
use log::{debug, trace};
use std::{sync::Arc, time::Duration};
use tokio::time::sleep;

use super::{ApartmentCall, ContractConnector, ContractMethod, DappBanx};
use crate::{
    connectivity::{ConnectivityResolver, Signer},
    error::ServiceError,
};

// Callable handle over the deployed contract for one signer
pub struct ContractHandle {
    address: Address,
    signer: Signer,
    poll_interval: Duration,
}

impl ContractHandle {
    pub fn new(address: Address, signer: Signer, poll_interval: Duration) -> Self {
        Self {
            address,
            signer,
            poll_interval,
        }
    }

    pub fn get_address(&self) -> &Address {
        &self.address
    }

    pub fn get_signer(&self) -> &Signer {
        &self.signer
    }

    async fn read(&self, method: ContractMethod, args: &[Token]) -> Result<Token, ServiceError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("read {} on {}", method, self.address);
        }

        let request = CallRequest {
            from: Some(self.signer.address()),
            to: self.address,
            data: method.encode_call(args).into(),
        };
        let data = self.signer.provider().call(&request).await?;

        // Every read method returns a single value
        decode(&method.outputs(), &data)?
            .pop()
            .ok_or(ServiceError::Decode(ReaderError::UnexpectedToken("return value")))
    }

    async fn write(
        &self,
        method: ContractMethod,
        args: &[Token],
        value: Option<U256>,
    ) -> Result<Hash, ServiceError> {
        let request = TransactionRequest {
            from: self.signer.address(),
            to: self.address,
            data: method.encode_call(args).into(),
            value,
        };
        let hash = self.signer.provider().send_transaction(&request).await?;

        if log::log_enabled!(log::Level::Debug) {
            debug!("{} submitted as {}", method, hash);
        }
        Ok(hash)
    }
}

fn expect_uint(token: Token) -> Result<U256, ReaderError> {
    token
        .into_uint()
        .ok_or(ReaderError::UnexpectedToken("uint256"))
}

fn expect_address(token: Token) -> Result<Address, ReaderError> {
    token
        .into_address()
        .ok_or(ReaderError::UnexpectedToken("address"))
}

#[async_trait]
impl DappBanx for ContractHandle {
    fn is_wallet_bound(&self) -> bool {
        self.signer.is_wallet()
    }

    async fn get_apartments(&self) -> Result<Vec<RawApartment>, ServiceError> {
        let token = self.read(ContractMethod::GetApartments, &[]).await?;
        Ok(records_from_token(token, RawApartment::from_token)?)
    }

    async fn get_apartment(&self, id: u64) -> Result<RawApartment, ServiceError> {
        let token = self
            .read(ContractMethod::GetApartment, &[Token::from(id)])
            .await?;
        Ok(RawApartment::from_token(token)?)
    }

    async fn get_bookings(&self, aid: u64) -> Result<Vec<RawBooking>, ServiceError> {
        let token = self
            .read(ContractMethod::GetBookings, &[Token::from(aid)])
            .await?;
        Ok(records_from_token(token, RawBooking::from_token)?)
    }

    async fn get_unavailable_dates(&self, aid: u64) -> Result<Vec<U256>, ServiceError> {
        let token = self
            .read(ContractMethod::GetUnavailableDates, &[Token::from(aid)])
            .await?;
        Ok(records_from_token(token, expect_uint)?)
    }

    async fn get_qualified_reviewers(&self, aid: u64) -> Result<Vec<Address>, ServiceError> {
        let token = self
            .read(ContractMethod::GetQualifiedReviewers, &[Token::from(aid)])
            .await?;
        Ok(records_from_token(token, expect_address)?)
    }

    async fn get_reviews(&self, aid: u64) -> Result<Vec<RawReview>, ServiceError> {
        let token = self
            .read(ContractMethod::GetReviews, &[Token::from(aid)])
            .await?;
        Ok(records_from_token(token, RawReview::from_token)?)
    }

    async fn security_fee(&self) -> Result<U256, ServiceError> {
        let token = self.read(ContractMethod::SecurityFee, &[]).await?;
        Ok(expect_uint(token)?)
    }

    async fn create_apartment(&self, apartment: &ApartmentCall) -> Result<Hash, ServiceError> {
        self.write(ContractMethod::CreateApartment, &apartment.to_tokens(), None)
            .await
    }

    async fn update_apartment(
        &self,
        id: u64,
        apartment: &ApartmentCall,
    ) -> Result<Hash, ServiceError> {
        let mut args = vec![Token::from(id)];
        args.extend(apartment.to_tokens());
        self.write(ContractMethod::UpdateApartment, &args, None)
            .await
    }

    async fn delete_apartment(&self, id: u64) -> Result<Hash, ServiceError> {
        self.write(ContractMethod::DeleteApartment, &[Token::from(id)], None)
            .await
    }

    async fn book_apartment(
        &self,
        aid: u64,
        timestamps: &[u64],
        value: U256,
    ) -> Result<Hash, ServiceError> {
        let nights = timestamps.iter().copied().map(Token::from).collect();
        self.write(
            ContractMethod::BookApartment,
            &[Token::from(aid), Token::Array(nights)],
            Some(value),
        )
        .await
    }

    async fn check_in_apartment(&self, aid: u64, booking_id: u64) -> Result<Hash, ServiceError> {
        self.write(
            ContractMethod::CheckInApartment,
            &[Token::from(aid), Token::from(booking_id)],
            None,
        )
        .await
    }

    async fn refund_booking(&self, aid: u64, booking_id: u64) -> Result<Hash, ServiceError> {
        self.write(
            ContractMethod::RefundBooking,
            &[Token::from(aid), Token::from(booking_id)],
            None,
        )
        .await
    }

    async fn claim_funds(&self, aid: u64, booking_id: u64) -> Result<Hash, ServiceError> {
        self.write(
            ContractMethod::ClaimFunds,
            &[Token::from(aid), Token::from(booking_id)],
            None,
        )
        .await
    }

    async fn add_review(&self, aid: u64, comment: &str) -> Result<Hash, ServiceError> {
        self.write(
            ContractMethod::AddReview,
            &[Token::from(aid), Token::from(comment)],
            None,
        )
        .await
    }

    async fn confirm(&self, hash: &Hash) -> Result<TransactionReceipt, ServiceError> {
        loop {
            match self.signer.provider().get_transaction_receipt(hash).await? {
                Some(receipt) if receipt.is_success() => {
                    if log::log_enabled!(log::Level::Debug) {
                        debug!("Transaction {} confirmed", hash);
                    }
                    return Ok(receipt);
                }
                Some(_) => return Err(ServiceError::Reverted(*hash)),
                None => {
                    trace!("Transaction {} still pending", hash);
                    sleep(self.poll_interval).await;
                }
            }
        }
    }
}

// Binds the configured contract address to the signer of the session
pub struct ContractFactory {
    resolver: Arc<ConnectivityResolver>,
    address: Address,
    poll_interval: Duration,
}

impl ContractFactory {
    pub fn new(
        resolver: Arc<ConnectivityResolver>,
        address: Address,
        poll_interval: Duration,
    ) -> Self {
        Self {
            resolver,
            address,
            poll_interval,
        }
    }

    pub fn get_resolver(&self) -> &Arc<ConnectivityResolver> {
        &self.resolver
    }

    pub fn bind(&self, signer: Signer) -> ContractHandle {
        ContractHandle::new(self.address, signer, self.poll_interval)
    }
}

#[async_trait]
impl ContractConnector for ContractFactory {
    type Contract = ContractHandle;

    async fn connect(&self) -> Result<ContractHandle, ServiceError> {
        let signer = self.resolver.resolve().await?;
        Ok(self.bind(signer))
    }

    // Cached session state may be stale once the user authorizes or revokes an account
    async fn connect_for_write(&self) -> Result<ContractHandle, ServiceError> {
        let signer = if self.resolver.has_wallet() {
            self.resolver.refresh().await?
        } else {
            self.resolver.resolve().await?
        };
        Ok(self.bind(signer))
    }
}
