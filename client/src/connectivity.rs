//! Connectivity resolver.
//!
//! Decides whether calls go through an injected wallet or through a
//! read-only fallback endpoint with a throwaway key. The outcome is cached
//! for the session as a small state machine:
//!
//! ```text
//!              refresh / accounts_changed / connect_wallet
//! Unresolved ────────────────┬───────────────────────────────▶ WalletBound
//!                            └───────────────────────────────▶ FallbackBound
//! ```
//!
//! Any transition can be replayed: a wallet reporting a new account set
//! moves the resolver to the matching state.

use banx_common::{
    crypto::{Address, KeyPair},
    rpc::RpcError,
};
use log::{debug, info, trace};
use std::{fmt, sync::Arc};
use tokio::sync::RwLock;

use crate::provider::{Provider, WalletProvider};

// A browser-style wallet: account authorization plus the transport it signs through
#[derive(Clone)]
pub struct InjectedWallet {
    accounts: Arc<dyn WalletProvider>,
    transport: Arc<dyn Provider>,
}

impl InjectedWallet {
    pub fn new<P: WalletProvider + Provider + 'static>(provider: Arc<P>) -> Self {
        Self {
            accounts: provider.clone(),
            transport: provider,
        }
    }

    pub fn from_parts(accounts: Arc<dyn WalletProvider>, transport: Arc<dyn Provider>) -> Self {
        Self {
            accounts,
            transport,
        }
    }
}

// Credential used to submit calls
#[derive(Clone)]
pub enum Signer {
    // Account authorized in the injected wallet
    Wallet {
        account: Address,
        provider: Arc<dyn Provider>,
    },
    // Random key bound to the fallback endpoint, reads only in practice
    ReadOnly {
        keypair: Arc<KeyPair>,
        provider: Arc<dyn Provider>,
    },
}

impl Signer {
    pub fn address(&self) -> Address {
        match self {
            Self::Wallet { account, .. } => *account,
            Self::ReadOnly { keypair, .. } => keypair.get_address(),
        }
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        match self {
            Self::Wallet { provider, .. } | Self::ReadOnly { provider, .. } => provider,
        }
    }

    pub fn is_wallet(&self) -> bool {
        matches!(self, Self::Wallet { .. })
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wallet { account, .. } => write!(f, "Signer::Wallet({})", account),
            Self::ReadOnly { keypair, .. } => {
                write!(f, "Signer::ReadOnly({})", keypair.get_address())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConnectionState {
    Unresolved,
    WalletBound { account: Address },
    FallbackBound { keypair: Arc<KeyPair> },
}

impl ConnectionState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    pub fn is_wallet_bound(&self) -> bool {
        matches!(self, Self::WalletBound { .. })
    }
}

pub struct ConnectivityResolver {
    wallet: Option<InjectedWallet>,
    fallback: Arc<dyn Provider>,
    state: RwLock<ConnectionState>,
}

impl ConnectivityResolver {
    pub fn new(wallet: Option<InjectedWallet>, fallback: Arc<dyn Provider>) -> Self {
        Self {
            wallet,
            fallback,
            state: RwLock::new(ConnectionState::Unresolved),
        }
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    pub async fn get_state(&self) -> ConnectionState {
        self.state.read().await.clone()
    }

    // Signer for the current session, resolving it on first use
    pub async fn resolve(&self) -> Result<Signer, RpcError> {
        {
            let state = self.state.read().await;
            if let Some(signer) = self.signer_for(&state) {
                return Ok(signer);
            }
        }

        self.refresh().await
    }

    // Query the wallet again and move to the matching state
    pub async fn refresh(&self) -> Result<Signer, RpcError> {
        trace!("refresh connectivity");
        let accounts = match self.wallet.as_ref() {
            Some(wallet) => wallet.accounts.accounts().await?,
            None => Vec::new(),
        };
        Ok(self.accounts_changed(accounts).await)
    }

    // Ask the wallet to authorize an account, then bind to it
    pub async fn connect_wallet(&self) -> Result<Signer, RpcError> {
        let accounts = match self.wallet.as_ref() {
            Some(wallet) => wallet.accounts.request_accounts().await?,
            None => {
                debug!("No injected wallet available, staying on the fallback endpoint");
                Vec::new()
            }
        };
        Ok(self.accounts_changed(accounts).await)
    }

    // Wallet reported a new set of accounts
    pub async fn accounts_changed(&self, accounts: Vec<Address>) -> Signer {
        let mut state = self.state.write().await;

        let next = match (self.wallet.as_ref(), accounts.first()) {
            (Some(_), Some(account)) => ConnectionState::WalletBound { account: *account },
            _ => match &*state {
                // Keep the same throwaway key for the whole session
                ConnectionState::FallbackBound { keypair } => ConnectionState::FallbackBound {
                    keypair: keypair.clone(),
                },
                _ => ConnectionState::FallbackBound {
                    keypair: Arc::new(KeyPair::new()),
                },
            },
        };

        match &next {
            ConnectionState::WalletBound { account } => {
                if log::log_enabled!(log::Level::Info) {
                    info!("Wallet connected with account {}", account);
                }
            }
            ConnectionState::FallbackBound { keypair } => {
                if !matches!(&*state, ConnectionState::FallbackBound { .. }) {
                    info!(
                        "No wallet account available, using read-only signer {}",
                        keypair.get_address()
                    );
                }
            }
            ConnectionState::Unresolved => {}
        }

        *state = next;
        // state was just resolved above
        self.signer_for(&state)
            .unwrap_or_else(|| self.read_only(Arc::new(KeyPair::new())))
    }

    // Forget the cached state, next resolve() queries the wallet again
    pub async fn invalidate(&self) {
        *self.state.write().await = ConnectionState::Unresolved;
    }

    fn signer_for(&self, state: &ConnectionState) -> Option<Signer> {
        match state {
            ConnectionState::Unresolved => None,
            ConnectionState::WalletBound { account } => {
                let wallet = self.wallet.as_ref()?;
                Some(Signer::Wallet {
                    account: *account,
                    provider: wallet.transport.clone(),
                })
            }
            ConnectionState::FallbackBound { keypair } => Some(self.read_only(keypair.clone())),
        }
    }

    fn read_only(&self, keypair: Arc<KeyPair>) -> Signer {
        Signer::ReadOnly {
            keypair,
            provider: self.fallback.clone(),
        }
    }
}
