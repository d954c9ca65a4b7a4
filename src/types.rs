use std::fmt;

use bitcoin::{Amount, SignedAmount};
use serde::Deserialize;

/// `listunspent` が返す1件分のUTXO
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UnspentOutput {
    pub txid: String,
    pub vout: u32,
    pub address: String,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub amount: Amount,
    #[serde(default)]
    pub confirmations: u32,
    pub spendable: bool,
    // Bitcoin Core はこのフィールドを返さない
    #[serde(default)]
    pub generated: bool,
}

impl UnspentOutput {
    pub fn is_spendable(&self) -> bool {
        self.spendable && !self.generated
    }
}

/// 手数料とダスト閾値
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FeePolicy {
    pub fee: Amount,
    pub dust_threshold: Amount,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlanWarning {
    BelowDustThreshold,
    BelowFee,
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanWarning::BelowDustThreshold => write!(f, "出力額がダスト閾値を下回っています"),
            PlanWarning::BelowFee => write!(f, "出力額が手数料を下回っています"),
        }
    }
}

/// 1トランザクション分の統合計画
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionPlan {
    pub address: String,
    pub inputs: Vec<UnspentOutput>,
    pub total_amount: Amount,
    pub net_amount: SignedAmount,
    pub warning: Option<PlanWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressPlan {
    pub address: String,
    pub transactions: Vec<TransactionPlan>,
}

/// アドレスの出現順を保持した計画一覧
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationPlan {
    pub addresses: Vec<AddressPlan>,
}

impl ConsolidationPlan {
    pub fn transaction_count(&self) -> usize {
        self.addresses.iter().map(|a| a.transactions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_zen_listunspent_entry() {
        let json = r#"{
            "txid": "9f3c1b2a",
            "vout": 1,
            "generated": false,
            "address": "znTestAddr",
            "scriptPubKey": "76a914",
            "amount": 0.00000066,
            "confirmations": 12,
            "spendable": true
        }"#;
        let utxo: UnspentOutput = serde_json::from_str(json).unwrap();
        assert_eq!(utxo.amount, Amount::from_sat(66));
        assert_eq!(utxo.confirmations, 12);
        assert!(utxo.is_spendable());
    }

    #[test]
    fn generated_defaults_to_false() {
        let json = r#"{"txid": "aa", "vout": 0, "address": "bc1q", "amount": 1.5, "spendable": true}"#;
        let utxo: UnspentOutput = serde_json::from_str(json).unwrap();
        assert!(!utxo.generated);
        assert_eq!(utxo.amount, Amount::from_sat(150_000_000));
    }

    #[test]
    fn generated_or_unspendable_outputs_are_excluded() {
        let mut utxo = UnspentOutput {
            txid: "aa".to_string(),
            vout: 0,
            address: "A".to_string(),
            amount: Amount::from_sat(1),
            confirmations: 1,
            spendable: true,
            generated: true,
        };
        assert!(!utxo.is_spendable());
        utxo.generated = false;
        utxo.spendable = false;
        assert!(!utxo.is_spendable());
    }
}
