//! HTTP client for the ledger service
//!
//! All network I/O of the application goes through [`LedgerApi`]. The
//! production implementation is [`RemoteLedgerClient`]; tests substitute their
//! own implementation of the trait.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::infrastructure::ledger::error::{LedgerError, LedgerResult};
use crate::infrastructure::ledger::types::{
    error_field, Block, CoinbaseReceipt, CoinbaseRequest, ItemHash, MineReceipt, SignedToken,
    Transaction, WalletAddress, WalletInfo,
};

/// Where the ledger service lives and how to talk to it
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// `None` waits for the service indefinitely
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Operations offered by the ledger service
///
/// One method per endpoint; every method resolves to a [`LedgerResult`] so
/// transport and logical failures are handled the same way by callers.
#[async_trait::async_trait]
pub trait LedgerApi: Send + Sync + 'static {
    /// `GET /block/last/{n}`
    async fn latest_blocks(&self, count: u32) -> LedgerResult<Vec<Block>>;

    /// `GET /transaction/pool`
    async fn transaction_pool(&self) -> LedgerResult<Vec<Transaction>>;

    /// `GET /item/history/{itemHash}`
    async fn item_history(&self, item_hash: &str) -> LedgerResult<Vec<Transaction>>;

    /// `GET /my-wallet/address`
    async fn my_wallet_address(&self) -> LedgerResult<WalletAddress>;

    /// `GET /wallet/info/{address}`
    async fn wallet_info(&self, address: &str) -> LedgerResult<WalletInfo>;

    /// `POST /block/mine` with the selected pool transactions
    async fn mine_block(&self, transactions: &[Transaction]) -> LedgerResult<MineReceipt>;

    /// `GET /item/calculate-hash/{itemID}`
    async fn calculate_item_hash(&self, item_id: &str) -> LedgerResult<ItemHash>;

    /// `GET /token/sign/{token}`
    async fn sign_token(&self, token: &str) -> LedgerResult<SignedToken>;

    /// `POST /transaction/coinbase`
    async fn create_coinbase(&self, request: &CoinbaseRequest) -> LedgerResult<CoinbaseReceipt>;
}

/// reqwest-backed ledger client
#[derive(Debug, Clone)]
pub struct RemoteLedgerClient {
    http: Client,
    base: Url,
}

impl RemoteLedgerClient {
    pub fn new(config: ClientConfig) -> LedgerResult<Self> {
        let base = parse_base_url(&config.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        // No cookie store: credentials are never forwarded to the service.
        let mut builder = Client::builder()
            .default_headers(headers)
            .referer(false)
            .redirect(reqwest::redirect::Policy::limited(10));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| LedgerError::Transport(format!("failed to create HTTP client: {err}")))?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// Issue a read request and decode the JSON body.
    ///
    /// A non-success status fails with [`LedgerError::Status`]; the server's
    /// `error` message, when present, is kept as detail.
    pub async fn fetch_collection<T: DeserializeOwned>(&self, segments: &[&str]) -> LedgerResult<T> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET");
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        let body = read_json(response).await;

        if !status.is_success() {
            let detail = body.as_ref().ok().and_then(error_field);
            warn!(%url, status = status.as_u16(), ?detail, "fetch failed");
            return Err(LedgerError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let body = body?;
        if let Some(message) = error_field(&body) {
            return Err(LedgerError::Rejected(message));
        }
        Ok(serde_json::from_value(body)?)
    }

    /// Issue a JSON write request and decode the JSON body.
    ///
    /// The body is read whatever the status: a body carrying an `error` field
    /// becomes [`LedgerError::Rejected`].
    pub async fn submit<P, T>(&self, segments: &[&str], payload: &P) -> LedgerResult<T>
    where
        P: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        debug!(%url, "POST");
        let response = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(payload)?)
            .send()
            .await?;
        let status = response.status();
        let body = read_json(response).await;

        match body {
            Ok(body) => {
                if let Some(message) = error_field(&body) {
                    warn!(%url, status = status.as_u16(), %message, "submission rejected");
                    return Err(LedgerError::Rejected(message));
                }
                if !status.is_success() {
                    return Err(LedgerError::Status {
                        status: status.as_u16(),
                        detail: None,
                    });
                }
                Ok(serde_json::from_value(body)?)
            }
            Err(_) if !status.is_success() => Err(LedgerError::Status {
                status: status.as_u16(),
                detail: None,
            }),
            Err(err) => Err(err),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> LedgerResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| LedgerError::InvalidInput(format!("{} cannot be a base", self.base)))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl LedgerApi for RemoteLedgerClient {
    async fn latest_blocks(&self, count: u32) -> LedgerResult<Vec<Block>> {
        let count = count.to_string();
        let blocks: Option<Vec<Block>> = self.fetch_collection(&["block", "last", &count]).await?;
        Ok(blocks.unwrap_or_default())
    }

    async fn transaction_pool(&self) -> LedgerResult<Vec<Transaction>> {
        let pool: Option<Vec<Transaction>> = self.fetch_collection(&["transaction", "pool"]).await?;
        Ok(pool.unwrap_or_default())
    }

    async fn item_history(&self, item_hash: &str) -> LedgerResult<Vec<Transaction>> {
        let item_hash = required("item hash", item_hash)?;
        let history: Option<Vec<Transaction>> = self
            .fetch_collection(&["item", "history", item_hash])
            .await?;
        Ok(history.unwrap_or_default())
    }

    async fn my_wallet_address(&self) -> LedgerResult<WalletAddress> {
        self.fetch_collection(&["my-wallet", "address"]).await
    }

    async fn wallet_info(&self, address: &str) -> LedgerResult<WalletInfo> {
        let address = required("wallet address", address)?;
        self.fetch_collection(&["wallet", "info", address]).await
    }

    async fn mine_block(&self, transactions: &[Transaction]) -> LedgerResult<MineReceipt> {
        self.submit(&["block", "mine"], transactions).await
    }

    async fn calculate_item_hash(&self, item_id: &str) -> LedgerResult<ItemHash> {
        let item_id = required("item id", item_id)?;
        self.fetch_collection(&["item", "calculate-hash", item_id])
            .await
    }

    async fn sign_token(&self, token: &str) -> LedgerResult<SignedToken> {
        let token = required("token", token)?;
        self.fetch_collection(&["token", "sign", token]).await
    }

    async fn create_coinbase(&self, request: &CoinbaseRequest) -> LedgerResult<CoinbaseReceipt> {
        self.submit(&["transaction", "coinbase"], request).await
    }
}

/// Accept `host:port` as well as full URLs
pub fn normalize_base_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

fn parse_base_url(endpoint: &str) -> LedgerResult<Url> {
    let normalized = normalize_base_url(endpoint);
    Url::parse(&normalized)
        .map_err(|err| LedgerError::InvalidInput(format!("bad service url {normalized}: {err}")))
}

fn required<'a>(what: &str, value: &'a str) -> LedgerResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LedgerError::InvalidInput(format!("{what} is required")));
    }
    Ok(value)
}

async fn read_json(response: Response) -> LedgerResult<Value> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
