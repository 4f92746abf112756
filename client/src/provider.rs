//! Node and wallet access.
//!
//! `Provider` is what any node offers (calls, submissions, receipts).
//! `WalletProvider` is the account side of an injected wallet: which
//! accounts are authorized and asking the user to authorize one.

use async_trait::async_trait;
use banx_common::{
    api::{BlockTag, CallRequest, HexBytes, TransactionReceipt, TransactionRequest},
    crypto::{Address, Hash},
    rpc::{JsonRpcClient, RpcError},
};
use log::trace;
use std::{sync::Arc, time::Duration};

#[async_trait]
pub trait Provider: Send + Sync {
    // eth_call against the latest block
    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, RpcError>;

    // eth_sendTransaction, signed by the node or wallet holding `from`
    async fn send_transaction(&self, request: &TransactionRequest) -> Result<Hash, RpcError>;

    // None while the transaction is still pending
    async fn get_transaction_receipt(
        &self,
        hash: &Hash,
    ) -> Result<Option<TransactionReceipt>, RpcError>;
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    // Accounts already authorized, without prompting
    async fn accounts(&self) -> Result<Vec<Address>, RpcError>;

    // Ask the wallet to authorize accounts
    async fn request_accounts(&self) -> Result<Vec<Address>, RpcError>;
}

// Provider backed by a JSON-RPC endpoint
#[derive(Clone)]
pub struct HttpProvider {
    client: Arc<JsonRpcClient>,
}

impl HttpProvider {
    pub fn new(target: &str) -> Result<Self, RpcError> {
        Ok(Self {
            client: Arc::new(JsonRpcClient::new(target)?),
        })
    }

    pub fn with_timeout(target: &str, timeout: Duration) -> Result<Self, RpcError> {
        Ok(Self {
            client: Arc::new(JsonRpcClient::with(target, timeout)?),
        })
    }

    pub fn get_client(&self) -> &JsonRpcClient {
        &self.client
    }
}

#[async_trait]
impl Provider for HttpProvider {
    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, RpcError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("eth_call to {}", request.to);
        }
        let data: HexBytes = self
            .client
            .call_with("eth_call", &(request, BlockTag::Latest))
            .await?;
        Ok(data.0)
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<Hash, RpcError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("eth_sendTransaction from {} to {}", request.from, request.to);
        }
        self.client
            .call_with("eth_sendTransaction", &[request])
            .await
    }

    async fn get_transaction_receipt(
        &self,
        hash: &Hash,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("eth_getTransactionReceipt {}", hash);
        }
        self.client
            .call_optional("eth_getTransactionReceipt", &[hash])
            .await
    }
}

#[async_trait]
impl WalletProvider for HttpProvider {
    async fn accounts(&self) -> Result<Vec<Address>, RpcError> {
        trace!("eth_accounts");
        self.client.call_with("eth_accounts", &[(); 0]).await
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, RpcError> {
        trace!("eth_requestAccounts");
        self.client.call_with("eth_requestAccounts", &[(); 0]).await
    }
}
