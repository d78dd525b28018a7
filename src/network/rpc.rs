//! Node JSON-RPC Access
//!
//! [`NodeRpc`] is the seam between the gateway and a remote node.
//! [`JsonRpcClient`] implements it over HTTP JSON-RPC 2.0.

use async_trait::async_trait;
use ethers_core::types::U256;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{ErrorCode, OnyxError, OnyxResult};
use crate::log_debug;
use crate::types::{Address, TxHash};

use super::config::NetworkConfig;

/// Parameters for `eth_estimateGas`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

impl CallRequest {
    fn to_json(&self) -> Value {
        json!({
            "from": self.from.to_checksum(),
            "to": self.to.to_checksum(),
            "value": format!("{:#x}", self.value),
        })
    }
}

/// The parts of a transaction receipt the wallet cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub hash: TxHash,
    pub block_number: Option<u64>,
    /// `false` when the transaction was mined but reverted
    pub success: bool,
}

/// Remote node operations used by the gateway
#[async_trait]
pub trait NodeRpc: Send + Sync {
    /// Latest balance in base units
    async fn get_balance(&self, address: &Address) -> OnyxResult<U256>;

    /// Pending transaction count, used as the next nonce
    async fn get_transaction_count(&self, address: &Address) -> OnyxResult<u64>;

    async fn gas_price(&self) -> OnyxResult<U256>;

    async fn estimate_gas(&self, call: &CallRequest) -> OnyxResult<U256>;

    async fn send_raw_transaction(&self, raw: &[u8]) -> OnyxResult<TxHash>;

    /// `None` while the transaction is not yet mined
    async fn get_receipt(&self, hash: &TxHash) -> OnyxResult<Option<TxReceipt>>;
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: String,
    block_number: Option<String>,
    status: Option<String>,
}

/// HTTP JSON-RPC client
pub struct JsonRpcClient {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(config: &NetworkConfig) -> OnyxResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("OnyxCore/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: config.rpc_url.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> OnyxResult<T> {
        self.call_optional(method, params)
            .await?
            .ok_or_else(|| OnyxError::network_error(format!("{} returned no result", method)))
    }

    async fn call_optional<T: DeserializeOwned>(&self, method: &str, params: Value) -> OnyxResult<Option<T>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        log_debug!("rpc", "Request", method = method, id = id);

        let response = self
            .client
            .post(&self.url)
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OnyxError::network_error(format!("{} failed with HTTP {}", method, status)));
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| malformed(method, e))?;

        if let Some(error) = body.error {
            return Err(OnyxError::network_error(error.message).with_details(format!("rpc code {}", error.code)));
        }
        Ok(body.result)
    }
}

#[async_trait]
impl NodeRpc for JsonRpcClient {
    async fn get_balance(&self, address: &Address) -> OnyxResult<U256> {
        let method = "eth_getBalance";
        let raw: String = self.call(method, json!([address.to_checksum(), "latest"])).await?;
        parse_quantity(&raw).map_err(|e| malformed(method, e))
    }

    async fn get_transaction_count(&self, address: &Address) -> OnyxResult<u64> {
        let method = "eth_getTransactionCount";
        let raw: String = self.call(method, json!([address.to_checksum(), "pending"])).await?;
        let count = parse_quantity(&raw).map_err(|e| malformed(method, e))?;
        if count > U256::from(u64::MAX) {
            return Err(malformed(method, "nonce out of range"));
        }
        Ok(count.as_u64())
    }

    async fn gas_price(&self) -> OnyxResult<U256> {
        let method = "eth_gasPrice";
        let raw: String = self.call(method, json!([])).await?;
        parse_quantity(&raw).map_err(|e| malformed(method, e))
    }

    async fn estimate_gas(&self, call: &CallRequest) -> OnyxResult<U256> {
        let method = "eth_estimateGas";
        let raw: String = self.call(method, json!([call.to_json()])).await?;
        parse_quantity(&raw).map_err(|e| malformed(method, e))
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> OnyxResult<TxHash> {
        let method = "eth_sendRawTransaction";
        let hash: String = self
            .call(method, json!([format!("0x{}", hex::encode(raw))]))
            .await?;
        hash.parse().map_err(|e: OnyxError| malformed(method, e))
    }

    async fn get_receipt(&self, hash: &TxHash) -> OnyxResult<Option<TxReceipt>> {
        let method = "eth_getTransactionReceipt";
        let raw: Option<RawReceipt> = self.call_optional(method, json!([hash.to_string()])).await?;
        raw.map(TxReceipt::try_from)
            .transpose()
            .map_err(|e| malformed(method, e))
    }
}

/// Undecodable node answers are network failures; the cause goes in details
fn malformed(method: &str, cause: impl std::fmt::Display) -> OnyxError {
    OnyxError::network_error(format!("Malformed {} response", method)).with_details(cause.to_string())
}

impl TryFrom<RawReceipt> for TxReceipt {
    type Error = OnyxError;

    fn try_from(raw: RawReceipt) -> Result<Self, Self::Error> {
        let block_number = match raw.block_number {
            Some(n) => Some(parse_quantity(&n)?.low_u64()),
            None => None,
        };
        // Receipts without a status field predate status codes; treat as success
        let success = match raw.status.as_deref() {
            Some(status) => !parse_quantity(status)?.is_zero(),
            None => true,
        };
        Ok(Self {
            hash: raw.transaction_hash.parse()?,
            block_number,
            success,
        })
    }
}

/// Parse a JSON-RPC hex quantity ("0x1a")
pub fn parse_quantity(raw: &str) -> OnyxResult<U256> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| OnyxError::new(ErrorCode::HexError, format!("Quantity missing 0x prefix: {}", raw)))?;
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| OnyxError::new(ErrorCode::HexError, format!("Invalid quantity {}: {}", raw, e)))
}
