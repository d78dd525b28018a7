//! Transfer Signer
//!
//! Builds and signs legacy (EIP-155) native transfers.
//!
//! SECURITY: the caller owns the private key buffer and zeroizes it.

use ethers_core::types::transaction::eip2718::TypedTransaction;
use ethers_core::types::{TransactionRequest, U256};
use ethers_signers::{LocalWallet, Signer};

use crate::error::{OnyxError, OnyxResult};
use crate::types::{Address, TxHash};
use crate::utils::crypto::keccak256;

/// Fully specified native transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub to: Address,
    pub value: U256,
    pub nonce: u64,
    pub gas_limit: U256,
    pub gas_price: U256,
    pub chain_id: u64,
}

/// RLP-encoded signed transaction ready for `eth_sendRawTransaction`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    pub raw: Vec<u8>,
    pub hash: TxHash,
    pub from: Address,
}

pub async fn sign_transfer(secret: &[u8; 32], request: &TransferRequest) -> OnyxResult<SignedTransfer> {
    let wallet = LocalWallet::from_bytes(secret)?.with_chain_id(request.chain_id);

    let tx: TypedTransaction = TransactionRequest::new()
        .to(ethers_core::types::Address::from(request.to))
        .value(request.value)
        .gas(request.gas_limit)
        .gas_price(request.gas_price)
        .chain_id(request.chain_id)
        .nonce(request.nonce)
        .into();

    let signature = wallet.sign_transaction(&tx).await?;
    let raw = tx.rlp_signed(&signature).to_vec();

    let from = Address::from_slice(wallet.address().as_bytes())
        .map_err(|e| OnyxError::signing_failed(e.message))?;

    Ok(SignedTransfer {
        hash: TxHash::from_bytes(keccak256(&raw)),
        raw,
        from,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::types::Transaction;
    use ethers_core::utils::rlp;

    const HARDHAT_KEY: [u8; 32] = [
        0xac, 0x09, 0x74, 0xbe, 0xc3, 0x9a, 0x17, 0xe3, 0x6b, 0xa4, 0xa6, 0xb4, 0xd2, 0x38, 0xff, 0x94,
        0x4b, 0xac, 0xb4, 0x78, 0xcb, 0xed, 0x5e, 0xfc, 0xae, 0x78, 0x4d, 0x7b, 0xf4, 0xf2, 0xff, 0x80,
    ];

    fn request() -> TransferRequest {
        TransferRequest {
            to: Address::from_bytes([0x22; 20]),
            value: U256::exp10(15),
            nonce: 7,
            gas_limit: U256::from(21_000),
            gas_price: U256::from(4_000_000_000u64),
            chain_id: 11_155_111,
        }
    }

    #[tokio::test]
    async fn test_signed_transfer_decodes() {
        let signed = sign_transfer(&HARDHAT_KEY, &request()).await.unwrap();
        assert_eq!(signed.from.to_string(), "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

        let decoded: Transaction = rlp::decode(&signed.raw).unwrap();
        assert_eq!(decoded.nonce, U256::from(7));
        assert_eq!(decoded.value, U256::exp10(15));
        assert_eq!(decoded.to, Some(ethers_core::types::Address::from([0x22; 20])));
        assert_eq!(decoded.hash.as_bytes(), signed.hash.as_bytes());
        assert_eq!(decoded.recover_from().unwrap().as_bytes(), signed.from.as_bytes());
    }

    #[tokio::test]
    async fn test_chain_id_is_bound() {
        let signed = sign_transfer(&HARDHAT_KEY, &request()).await.unwrap();
        let decoded: Transaction = rlp::decode(&signed.raw).unwrap();
        // EIP-155: v = chain_id * 2 + 35 + parity
        let v = decoded.v.as_u64();
        assert!(v == 11_155_111 * 2 + 35 || v == 11_155_111 * 2 + 36);
    }

    #[tokio::test]
    async fn test_invalid_key_fails() {
        let err = sign_transfer(&[0u8; 32], &request()).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::SigningFailed);
    }
}
