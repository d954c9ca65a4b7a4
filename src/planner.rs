use std::collections::HashMap;

use bitcoin::{Amount, SignedAmount};

use crate::{
    error::AppError,
    types::{AddressPlan, ConsolidationPlan, FeePolicy, PlanWarning, TransactionPlan, UnspentOutput},
};

/// 多くのノード実装が受け付ける入力数の上限
pub const MAX_INPUTS_CAP: usize = 600;

/// UTXOを宛先アドレスへ統合するトランザクション計画を作成する。
///
/// 使用可能なUTXOのみを対象に金額の昇順で並べ、アドレスごと (初出順) に
/// `max_inputs` 件ずつのバッチへ分割する。副作用はない。
pub fn plan(
    utxos: &[UnspentOutput],
    policy: &FeePolicy,
    max_inputs: usize,
) -> Result<ConsolidationPlan, AppError> {
    let limit = max_inputs.clamp(1, MAX_INPUTS_CAP);

    let mut spendable: Vec<&UnspentOutput> = utxos.iter().filter(|u| u.is_spendable()).collect();
    log::debug!(
        "使用可能なUTXO: {} 件 (除外: {} 件)",
        spendable.len(),
        utxos.len() - spendable.len()
    );

    // 安定ソートなので同額のUTXOは入力順を保つ
    spendable.sort_by_key(|u| u.amount);

    let groups = group_by_address(spendable);

    let mut result = ConsolidationPlan::default();
    for (address, group) in groups {
        let mut transactions = Vec::new();
        for batch in group.chunks(limit) {
            transactions.push(summarize(address, batch, policy)?);
        }
        log::debug!(
            "アドレス {}: UTXO {} 件を {} 件のトランザクションに分割しました。",
            address,
            group.len(),
            transactions.len()
        );
        result.addresses.push(AddressPlan {
            address: address.to_string(),
            transactions,
        });
    }

    Ok(result)
}

fn group_by_address(sorted: Vec<&UnspentOutput>) -> Vec<(&str, Vec<&UnspentOutput>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&UnspentOutput>)> = Vec::new();

    for utxo in sorted {
        let address = utxo.address.as_str();
        match index.get(address) {
            Some(&i) => groups[i].1.push(utxo),
            None => {
                index.insert(address, groups.len());
                groups.push((address, vec![utxo]));
            }
        }
    }
    groups
}

fn summarize(
    address: &str,
    batch: &[&UnspentOutput],
    policy: &FeePolicy,
) -> Result<TransactionPlan, AppError> {
    let overflow = || AppError::AmountOverflow {
        address: address.to_string(),
    };

    let total_amount = batch
        .iter()
        .try_fold(Amount::ZERO, |acc, u| acc.checked_add(u.amount))
        .ok_or_else(overflow)?;

    let fee = to_signed(policy.fee, address)?;
    let dust_threshold = to_signed(policy.dust_threshold, address)?;
    let net_amount = to_signed(total_amount, address)?
        .checked_sub(fee)
        .ok_or_else(overflow)?;

    let warning = if net_amount < dust_threshold {
        Some(PlanWarning::BelowDustThreshold)
    } else if net_amount < fee {
        Some(PlanWarning::BelowFee)
    } else {
        None
    };

    Ok(TransactionPlan {
        address: address.to_string(),
        inputs: batch.iter().map(|u| (*u).clone()).collect(),
        total_amount,
        net_amount,
        warning,
    })
}

fn to_signed(amount: Amount, address: &str) -> Result<SignedAmount, AppError> {
    amount.to_signed().map_err(|_| AppError::AmountOverflow {
        address: address.to_string(),
    })
}
