use async_trait::async_trait;
use banx_client::{
    connectivity::{ConnectivityResolver, InjectedWallet},
    contract::{ContractConnector, ContractFactory, ContractMethod, DappBanx},
    error::ServiceError,
    provider::{Provider, WalletProvider},
    service::MarketplaceService,
    state::AppState,
};
use banx_common::{
    abi::{encode, Token},
    api::{CallRequest, RawApartment, TransactionReceipt, TransactionRequest},
    crypto::{Address, Hash},
    rpc::RpcError,
    U256,
};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use serde_json::json;
use tokio::sync::Mutex;

const CONTRACT: Address = Address::new([0xcc; 20]);
const ACCOUNT: Address = Address::new([0xaa; 20]);

// Node answering eth_call with a fixed payload
struct MockNode {
    response: Result<Vec<u8>, i64>,
    calls: Mutex<Vec<CallRequest>>,
    sent: Mutex<Vec<TransactionRequest>>,
    // Receipt polls answered with "pending" before the receipt shows up
    pending_polls: usize,
    polls: AtomicUsize,
    status: u64,
    // Accounts the wallet currently authorizes
    accounts: Mutex<Vec<Address>>,
}

impl MockNode {
    fn new(response: Vec<u8>) -> Self {
        Self {
            response: Ok(response),
            calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            pending_polls: 0,
            polls: AtomicUsize::new(0),
            status: 1,
            accounts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Provider for MockNode {
    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, RpcError> {
        self.calls.lock().await.push(request.clone());
        match &self.response {
            Ok(data) => Ok(data.clone()),
            Err(code) => Err(RpcError::Server {
                code: *code,
                message: "execution reverted: Apartment not found".into(),
                data: Some(json!("0x08c379a0")),
            }),
        }
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<Hash, RpcError> {
        self.sent.lock().await.push(request.clone());
        Ok(Hash::new([7; 32]))
    }

    async fn get_transaction_receipt(
        &self,
        hash: &Hash,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        let poll = self.polls.fetch_add(1, Ordering::SeqCst);
        if poll < self.pending_polls {
            return Ok(None);
        }

        Ok(Some(TransactionReceipt {
            transaction_hash: *hash,
            block_number: Some(U256::from(9u64)),
            from: None,
            to: Some(CONTRACT),
            gas_used: None,
            status: Some(U256::from(self.status)),
        }))
    }
}

#[async_trait]
impl WalletProvider for MockNode {
    async fn accounts(&self) -> Result<Vec<Address>, RpcError> {
        Ok(self.accounts.lock().await.clone())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, RpcError> {
        Ok(self.accounts.lock().await.clone())
    }
}

fn raw_apartment(id: u64, images: &str) -> RawApartment {
    RawApartment {
        id: U256::from(id),
        name: "Harbour flat".into(),
        description: "Two rooms near the harbour".into(),
        location: "Piran".into(),
        email: "flat@example.org".into(),
        images: images.into(),
        rooms: U256::from(2u64),
        price: U256::exp10(17) * 15,
        owner: ACCOUNT,
        booked: false,
        deleted: false,
        timestamp: U256::from(1_700_000_000u64),
    }
}

fn read_only_factory(node: Arc<MockNode>) -> ContractFactory {
    let resolver = ConnectivityResolver::new(None, node);
    ContractFactory::new(Arc::new(resolver), CONTRACT, Duration::from_millis(1))
}

fn wallet_factory(node: Arc<MockNode>) -> ContractFactory {
    let fallback = Arc::new(MockNode::new(Vec::new()));
    let resolver = ConnectivityResolver::new(Some(InjectedWallet::new(node)), fallback);
    ContractFactory::new(Arc::new(resolver), CONTRACT, Duration::from_millis(1))
}

#[tokio::test]
async fn test_get_apartment_through_the_wire() {
    let payload = encode(&[raw_apartment(7, "x.png,y.png").into_token()]);
    let node = Arc::new(MockNode::new(payload));
    let service = MarketplaceService::new(read_only_factory(node.clone()), Arc::new(AppState::new()));

    let apartment = service.get_apartment(7).await.unwrap();
    assert_eq!(apartment.id, 7);
    assert_eq!(apartment.images, vec!["x.png", "y.png"]);
    assert_eq!(apartment.price, "1.5");
    assert_eq!(apartment.location, "Piran");

    let calls = node.calls.lock().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].to, CONTRACT);
    // Read-only signer still sets a sender
    assert!(calls[0].from.is_some());
    assert_eq!(
        calls[0].data.as_slice(),
        ContractMethod::GetApartment
            .encode_call(&[Token::from(7u64)])
            .as_slice()
    );
}

#[tokio::test]
async fn test_list_reads_decode_arrays() {
    let payload = encode(&[Token::Array(vec![
        raw_apartment(1, "a.png").into_token(),
        raw_apartment(2, "").into_token(),
    ])]);
    let node = Arc::new(MockNode::new(payload));
    let contract = read_only_factory(node).connect().await.unwrap();

    let apartments = contract.get_apartments().await.unwrap();
    assert_eq!(apartments.len(), 2);
    assert_eq!(apartments[1].images, "");
    assert!(!contract.is_wallet_bound());
}

#[tokio::test]
async fn test_garbage_response_is_a_decode_error() {
    let node = Arc::new(MockNode::new(vec![0u8; 7]));
    let contract = read_only_factory(node).connect().await.unwrap();

    let err = contract.security_fee().await.unwrap_err();
    assert!(matches!(err, ServiceError::Decode(_)));
}

#[tokio::test]
async fn test_reverted_read_is_an_execution_error() {
    let mut node = MockNode::new(Vec::new());
    node.response = Err(3);
    let contract = read_only_factory(Arc::new(node)).connect().await.unwrap();

    let err = contract.get_apartment(99).await.unwrap_err();
    match err {
        ServiceError::ContractExecution(RpcError::Server { code, data, .. }) => {
            assert_eq!(code, 3);
            assert_eq!(data, Some(json!("0x08c379a0")));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_booking_submits_value_and_waits_for_receipt() {
    let mut node = MockNode::new(encode(&[Token::Array(Vec::new())]));
    node.accounts = Mutex::new(vec![ACCOUNT]);
    node.pending_polls = 2;
    let node = Arc::new(node);

    let contract = wallet_factory(node.clone()).connect().await.unwrap();
    assert!(contract.is_wallet_bound());

    let value = U256::exp10(18) * 3;
    let hash = contract
        .book_apartment(4, &[1_000, 2_000], value)
        .await
        .unwrap();
    let receipt = contract.confirm(&hash).await.unwrap();
    assert_eq!(receipt.transaction_hash, hash);
    assert_eq!(node.polls.load(Ordering::SeqCst), 3);

    let sent = node.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, ACCOUNT);
    assert_eq!(sent[0].value, Some(value));
    let expected = ContractMethod::BookApartment.encode_call(&[
        Token::from(4u64),
        Token::Array(vec![Token::from(1_000u64), Token::from(2_000u64)]),
    ]);
    assert_eq!(sent[0].data.as_slice(), expected.as_slice());
}

#[tokio::test]
async fn test_reverted_receipt() {
    let mut node = MockNode::new(Vec::new());
    node.accounts = Mutex::new(vec![ACCOUNT]);
    node.status = 0;
    let node = Arc::new(node);

    let contract = wallet_factory(node.clone()).connect().await.unwrap();
    let hash = contract.delete_apartment(1).await.unwrap();
    let err = contract.confirm(&hash).await.unwrap_err();
    assert!(matches!(err, ServiceError::Reverted(h) if h == hash));
    // No value attached to plain writes
    assert_eq!(node.sent.lock().await[0].value, None);
}

#[tokio::test]
async fn test_wallet_without_accounts_cannot_write() {
    let node = Arc::new(MockNode::new(Vec::new()));
    let factory = wallet_factory(node.clone());
    let service = MarketplaceService::new(factory, Arc::new(AppState::new()));

    let err = service.claim_funds(1, 1).await.unwrap_err();
    assert!(matches!(err, ServiceError::NoWalletConnected));
    assert!(node.sent.lock().await.is_empty());
    assert!(node.calls.lock().await.is_empty());
}

#[tokio::test]
async fn test_write_picks_up_newly_authorized_account() {
    let node = Arc::new(MockNode::new(Vec::new()));
    let service = MarketplaceService::new(wallet_factory(node.clone()), Arc::new(AppState::new()));

    let err = service.delete_apartment(1).await.unwrap_err();
    assert!(matches!(err, ServiceError::NoWalletConnected));

    // User authorizes an account in the wallet
    node.accounts.lock().await.push(ACCOUNT);
    let receipt = service.delete_apartment(1).await.unwrap();
    assert_eq!(receipt.transaction_hash, Hash::new([7; 32]));

    let sent = node.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, ACCOUNT);
}

#[tokio::test]
async fn test_write_rejected_after_account_revoked() {
    let mut node = MockNode::new(Vec::new());
    node.accounts = Mutex::new(vec![ACCOUNT]);
    let node = Arc::new(node);
    let factory = wallet_factory(node.clone());
    let resolver = factory.get_resolver().clone();
    let service = MarketplaceService::new(factory, Arc::new(AppState::new()));

    service.delete_apartment(1).await.unwrap();
    assert!(resolver.get_state().await.is_wallet_bound());

    node.accounts.lock().await.clear();
    let err = service.delete_apartment(1).await.unwrap_err();
    assert!(matches!(err, ServiceError::NoWalletConnected));
    assert!(!resolver.get_state().await.is_wallet_bound());
    assert_eq!(node.sent.lock().await.len(), 1);
}
