//! Wire types for the ledger service JSON API
//!
//! Only the fields the client consumes are named. Everything else a
//! transaction carries is kept in `extra` so the object can be sent back to
//! the service (mine request) exactly as it was received.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// A mined block as listed by `/block/last/{n}` and `/wallet/info/{address}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub height: u64,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub block_hash: String,
    /// Numeric or string depending on the service version; shown verbatim
    #[serde(default)]
    pub difficulty: Value,
    /// Unix seconds on the block endpoints, display-ready on wallet info
    #[serde(default)]
    pub timestamp: Value,
}

/// A transaction as listed by the pool, item history and wallet endpoints
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(rename = "txID", default)]
    pub tx_id: String,
    #[serde(rename = "itemHash", default)]
    pub item_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Number>,
    #[serde(default)]
    pub timestamp: Value,
    #[serde(
        rename = "sellerHash",
        alias = "from",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub seller_hash: Option<String>,
    #[serde(
        rename = "buyerHash",
        alias = "to",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub buyer_hash: Option<String>,
    /// Fields the client does not read (UTXOID, signature, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `/my-wallet/address`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletAddress {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub public_key_hash: String,
    #[serde(default)]
    pub public_key: String,
}

/// `/wallet/info/{address}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WalletInfo {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mined_blocks: Vec<Block>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub coinbase_txs: Vec<Transaction>,
}

/// Body of `POST /transaction/coinbase`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinbaseRequest {
    pub item_hash: String,
    pub amount: u64,
}

/// Success body of `POST /transaction/coinbase`
///
/// Every field is optional: an absent field renders as the placeholder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoinbaseReceipt {
    #[serde(rename = "buyerHash", default)]
    pub buyer_hash: Option<String>,
    #[serde(rename = "sellerHash", default)]
    pub seller_hash: Option<String>,
    #[serde(rename = "itemHash", default)]
    pub item_hash: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(rename = "txID", default)]
    pub tx_id: Option<String>,
    #[serde(default)]
    pub amount: Option<Value>,
}

/// `/item/calculate-hash/{itemID}`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemHash {
    #[serde(default)]
    pub item_hash: String,
}

/// `/token/sign/{token}`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignedToken {
    #[serde(default)]
    pub signed_token: String,
}

/// Confirmation returned by `POST /block/mine`; its shape is not relied upon
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MineReceipt(pub Value);

impl Transaction {
    pub fn seller(&self) -> &str {
        self.seller_hash.as_deref().unwrap_or_default()
    }

    pub fn buyer(&self) -> &str {
        self.buyer_hash.as_deref().unwrap_or_default()
    }

    pub fn amount_display(&self) -> String {
        self.amount
            .as_ref()
            .map(Number::to_string)
            .unwrap_or_default()
    }
}

impl Block {
    pub fn difficulty_display(&self) -> String {
        scalar_display(&self.difficulty)
    }
}

impl MineReceipt {
    /// Pick the fields worth showing from whatever the service returned
    pub fn summary(&self) -> String {
        match &self.0 {
            Value::Object(map) => {
                let hash = map
                    .get("block_hash")
                    .or_else(|| map.get("hash"))
                    .map(scalar_display);
                let height = map.get("height").map(scalar_display);
                match (height, hash) {
                    (Some(height), Some(hash)) => format!("block {height} ({hash})"),
                    (None, Some(hash)) => hash,
                    _ => self.0.to_string(),
                }
            }
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Render a JSON scalar the way a template literal would: strings unquoted
pub fn scalar_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Extract the logical error message from a response body, if any
pub fn error_field(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// The service serializes empty lists as `null`
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
