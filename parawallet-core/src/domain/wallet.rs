//! Wallet snapshot and transfer types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Block explorer used for transaction links unless configured otherwise
pub const DEFAULT_EXPLORER_TX_URL: &str = "https://sepolia.etherscan.io/tx/";

/// Point-in-time read of the custodial wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub address: String,
    pub balance_eth: Decimal,
}

/// Funds transfer as entered in the send form
///
/// Both fields are sent exactly as typed. Address format and amount range are
/// the backend's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub to: String,
    pub amount: String,
}

impl TransferRequest {
    pub fn new(to: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            amount: amount.into(),
        }
    }
}

/// Accepted transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    pub transaction_hash: String,
}

impl TransferResult {
    /// Explorer link for this transaction
    pub fn explorer_url(&self, explorer_tx_url: &str) -> String {
        format!("{}{}", explorer_tx_url, self.transaction_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explorer_url() {
        let result = TransferResult {
            transaction_hash: "0x123abc".to_string(),
        };
        assert_eq!(
            result.explorer_url(DEFAULT_EXPLORER_TX_URL),
            "https://sepolia.etherscan.io/tx/0x123abc"
        );
    }

    #[test]
    fn test_transfer_request_body_is_verbatim() {
        let req = TransferRequest::new(" 0xDEF", "0.010");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"to": " 0xDEF", "amount": "0.010"}));
    }
}
