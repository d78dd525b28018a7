//! Network Gateway
//!
//! Balance queries and the full send pipeline: validate, check funds, sign,
//! broadcast, wait for the receipt, then record locally.

use ethers_core::types::U256;
use std::fmt;

use crate::account::{AccountStore, KeyValueStore};
use crate::error::{ErrorCode, OnyxError, OnyxResult};
use crate::types::{TransactionRecord, TxHash};
use crate::tx::{sign_transfer, TransferRequest};
use crate::wallet::{format_native_amount, parse_address, require_positive_amount};
use crate::{log_error, log_info, log_warn};

use super::config::NetworkConfig;
use super::rpc::{CallRequest, JsonRpcClient, NodeRpc, TxReceipt};

/// Display value when the balance cannot be fetched
pub const BALANCE_FALLBACK: &str = "0";

/// Balance lookup result that keeps "unknown" apart from a real zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceReading {
    Known(U256),
    Unknown { reason: String },
}

impl BalanceReading {
    pub fn wei(&self) -> Option<U256> {
        match self {
            BalanceReading::Known(wei) => Some(*wei),
            BalanceReading::Unknown { .. } => None,
        }
    }

    /// "0.0000"-style string, or [`BALANCE_FALLBACK`] when unknown
    pub fn display(&self) -> String {
        match self {
            BalanceReading::Known(wei) => format_native_amount(*wei),
            BalanceReading::Unknown { .. } => BALANCE_FALLBACK.to_string(),
        }
    }
}

impl fmt::Display for BalanceReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// A confirmed outgoing transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTransaction {
    pub hash: TxHash,
    pub record: TransactionRecord,
    /// `false` when the transfer is on chain but the local ledger write failed
    pub recorded: bool,
}

pub struct NetworkGateway<R: NodeRpc> {
    rpc: R,
    config: NetworkConfig,
}

impl NetworkGateway<JsonRpcClient> {
    /// Gateway backed by the HTTP client for `config`
    pub fn connect(config: NetworkConfig) -> OnyxResult<Self> {
        let rpc = JsonRpcClient::new(&config)?;
        log_info!("gateway", "Connected", endpoint = config.rpc_url, chain_id = config.chain_id);
        Ok(Self::new(rpc, config))
    }
}

impl<R: NodeRpc> NetworkGateway<R> {
    pub fn new(rpc: R, config: NetworkConfig) -> Self {
        Self { rpc, config }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    /// Balance of `address`, never failing
    pub async fn balance(&self, address: &str) -> BalanceReading {
        let parsed = match parse_address(address) {
            Ok(parsed) => parsed,
            Err(e) => return BalanceReading::Unknown { reason: e.message },
        };
        match self.rpc.get_balance(&parsed).await {
            Ok(wei) => BalanceReading::Known(wei),
            Err(e) => {
                log_warn!("gateway", "Balance lookup failed", address = parsed, error = e);
                BalanceReading::Unknown { reason: e.to_string() }
            }
        }
    }

    /// Display balance of `address`; "0" when it cannot be fetched
    pub async fn get_balance(&self, address: &str) -> String {
        self.balance(address).await.display()
    }

    /// Send `amount` (whole units, e.g. "0.05") from the stored account to `to`.
    ///
    /// Returns only after the transaction is mined successfully. A failed
    /// ledger write afterwards shows as `recorded == false`. Dropping the future after broadcast does not cancel the
    /// transfer; it just skips the ledger entry.
    pub async fn send_transaction<S: KeyValueStore>(
        &self,
        store: &mut AccountStore<S>,
        to: &str,
        amount: &str,
    ) -> OnyxResult<SentTransaction> {
        let recipient = parse_address(to)?;
        let value = require_positive_amount(amount)?;
        let from = store.require_account()?.address();

        let balance = self.rpc.get_balance(&from).await?;
        let gas_price = self.rpc.gas_price().await?;
        let gas_limit = self
            .rpc
            .estimate_gas(&CallRequest { from, to: recipient, value })
            .await?;

        let required = gas_price
            .checked_mul(gas_limit)
            .and_then(|fee| fee.checked_add(value))
            .ok_or_else(|| OnyxError::invalid_amount("Amount too large"))?;
        if required > balance {
            return Err(OnyxError::invalid_amount("Insufficient funds").with_details(format!(
                "Required: {}, Available: {}",
                format_native_amount(required),
                format_native_amount(balance)
            )));
        }

        let nonce = self.rpc.get_transaction_count(&from).await?;
        let request = TransferRequest {
            to: recipient,
            value,
            nonce,
            gas_limit,
            gas_price,
            chain_id: self.config.chain_id,
        };
        let signed = {
            let secret = store.require_account()?.signing_key()?;
            sign_transfer(&secret, &request).await?
        };

        let hash = self.rpc.send_raw_transaction(&signed.raw).await?;
        if hash != signed.hash {
            log_warn!("gateway", "Node returned unexpected hash", hash = hash, expected = signed.hash);
        }
        log_info!("gateway", "Transaction broadcast", hash = hash, nonce = nonce);

        let receipt = self.await_confirmation(&hash).await?;
        if !receipt.success {
            return Err(OnyxError::new(ErrorCode::TransactionFailed, "Transaction reverted")
                .with_details(hash.to_string()));
        }

        let record = TransactionRecord::sent(hash, from, recipient, format_native_amount(value));
        log_info!("gateway", "Transaction confirmed", hash = hash, value = record.value);

        // Already on chain, so a ledger failure still reports success
        let recorded = match store.record_transaction(record.clone()) {
            Ok(()) => true,
            Err(e) => {
                log_error!("gateway", "Confirmed transaction could not be recorded", hash = hash, error = e);
                false
            }
        };

        Ok(SentTransaction { hash, record, recorded })
    }

    /// Poll for the receipt of `hash` until it arrives or the confirmation
    /// timeout elapses. Lookup errors count as "not yet".
    pub async fn await_confirmation(&self, hash: &TxHash) -> OnyxResult<TxReceipt> {
        let poll = async {
            loop {
                match self.rpc.get_receipt(hash).await {
                    Ok(Some(receipt)) => return receipt,
                    Ok(None) => {}
                    Err(e) => log_warn!("gateway", "Receipt lookup failed", hash = hash, error = e),
                }
                tokio::time::sleep(self.config.poll_interval).await;
            }
        };

        tokio::time::timeout(self.config.confirmation_timeout, poll)
            .await
            .map_err(|_| {
                OnyxError::new(ErrorCode::ConfirmationTimeout, "Transaction not confirmed in time")
                    .with_details(hash.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::types::Address;

    /// Node whose receipts come back after `pending_polls` empty answers
    struct ScriptedRpc {
        balance: Option<U256>,
        pending_polls: usize,
        status_ok: bool,
        polls: AtomicUsize,
    }

    impl ScriptedRpc {
        fn new(balance: Option<U256>) -> Self {
            Self {
                balance,
                pending_polls: 0,
                status_ok: true,
                polls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl NodeRpc for ScriptedRpc {
        async fn get_balance(&self, _address: &Address) -> OnyxResult<U256> {
            self.balance.ok_or_else(|| OnyxError::network_error("node unreachable"))
        }

        async fn get_transaction_count(&self, _address: &Address) -> OnyxResult<u64> {
            Ok(0)
        }

        async fn gas_price(&self) -> OnyxResult<U256> {
            Ok(U256::from(1))
        }

        async fn estimate_gas(&self, _call: &CallRequest) -> OnyxResult<U256> {
            Ok(U256::from(21_000))
        }

        async fn send_raw_transaction(&self, _raw: &[u8]) -> OnyxResult<TxHash> {
            Ok(TxHash::from_bytes([1; 32]))
        }

        async fn get_receipt(&self, hash: &TxHash) -> OnyxResult<Option<TxReceipt>> {
            let seen = self.polls.fetch_add(1, Ordering::SeqCst);
            if self.pending_polls == usize::MAX || seen < self.pending_polls {
                return Ok(None);
            }
            Ok(Some(TxReceipt {
                hash: *hash,
                block_number: Some(1),
                success: self.status_ok,
            }))
        }
    }

    fn fast_config() -> NetworkConfig {
        let mut config = NetworkConfig::new("http://127.0.0.1:8545", 31337);
        config.poll_interval = Duration::from_millis(5);
        config.confirmation_timeout = Duration::from_millis(200);
        config
    }

    const ADDR: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[tokio::test]
    async fn test_balance_zero_vs_unknown() {
        let gateway = NetworkGateway::new(ScriptedRpc::new(Some(U256::zero())), fast_config());
        assert_eq!(gateway.get_balance(ADDR).await, "0.0000");

        let gateway = NetworkGateway::new(ScriptedRpc::new(None), fast_config());
        assert_eq!(gateway.get_balance(ADDR).await, BALANCE_FALLBACK);
        assert!(gateway.balance(ADDR).await.wei().is_none());
        assert!(matches!(gateway.balance("0x1234").await, BalanceReading::Unknown { .. }));
    }

    #[tokio::test]
    async fn test_confirmation_polls_until_mined() {
        let mut rpc = ScriptedRpc::new(Some(U256::zero()));
        rpc.pending_polls = 3;
        let gateway = NetworkGateway::new(rpc, fast_config());

        let hash = TxHash::from_bytes([1; 32]);
        let receipt = gateway.await_confirmation(&hash).await.unwrap();
        assert!(receipt.success);
        assert_eq!(gateway.rpc().polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_confirmation_timeout_carries_hash() {
        let mut rpc = ScriptedRpc::new(Some(U256::zero()));
        rpc.pending_polls = usize::MAX;
        let gateway = NetworkGateway::new(rpc, fast_config());

        let hash = TxHash::from_bytes([1; 32]);
        let err = gateway.await_confirmation(&hash).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfirmationTimeout);
        assert_eq!(err.details.as_deref(), Some(hash.to_string().as_str()));
    }

    #[tokio::test]
    async fn test_reverted_transfer_is_not_recorded() {
        use crate::account::{Account, MemoryStore};

        let mut rpc = ScriptedRpc::new(Some(U256::exp10(18)));
        rpc.status_ok = false;
        let gateway = NetworkGateway::new(rpc, fast_config());

        let mut store = AccountStore::open(MemoryStore::new()).unwrap();
        store
            .save(Account::from_phrase("test test test test test test test test test test test junk").unwrap())
            .unwrap();

        let err = gateway.send_transaction(&mut store, ADDR, "0.01").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TransactionFailed);
        assert!(store.ledger().is_empty());
    }
}
