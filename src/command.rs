use bitcoin::{Amount, Denomination, SignedAmount};

use crate::types::{ConsolidationPlan, TransactionPlan};

const WARNING_PREFIX: &str = "#Error: Transaction output below dust threshold or smaller than fee";

// z_sendmany 実行後、ステータス確認までの待機秒数
const STATUS_CHECK_DELAY_SECS: u32 = 5;

/// 生成するコマンドに埋め込むパラメータ
#[derive(Debug, Clone)]
pub struct CommandContext<'a> {
    pub cli_command: &'a str,
    pub destination_address: &'a str,
    pub min_conf: u32,
    pub fee: Amount,
}

pub fn format_coins(amount: SignedAmount) -> String {
    amount.to_string_in(Denomination::Bitcoin)
}

/// 1トランザクション分のシェルコマンドを生成する。
///
/// 警告がある場合は同じ行の先頭に `#Error: ...` を付けるため、
/// コマンド全体がシェルのコメントとなり実行されない。
pub fn format_send_command(tx: &TransactionPlan, ctx: &CommandContext<'_>) -> String {
    let warning = if tx.warning.is_some() { WARNING_PREFIX } else { "" };
    let cli = ctx.cli_command;
    let fee = ctx.fee.to_string_in(Denomination::Bitcoin);

    format!(
        concat!(
            "{warning}OPID=$({cli} z_sendmany \"{from}\" '[{{\"address\": \"{dest}\", \"amount\": {amount}}}]' {min_conf} {fee}); ",
            "sleep {delay} && {cli} z_getoperationstatus '[\"'$OPID'\"]'; ",
            "echo -e \"\\n\\nPlease verify that the output contains \\\"status\\\": \\\"success\\\".\\n\\n",
            "If this is not the case, please run this tool again and retry with the same address or a different address.\\n\" ",
            "&& read -p \"Press enter to continue.\""
        ),
        warning = warning,
        cli = cli,
        from = tx.address,
        dest = ctx.destination_address,
        amount = format_coins(tx.net_amount),
        min_conf = ctx.min_conf,
        fee = fee,
        delay = STATUS_CHECK_DELAY_SECS,
    )
}

/// 計画全体をアドレスごとのコメント見出し付きスクリプトとして出力する
pub fn render_script(plan: &ConsolidationPlan, ctx: &CommandContext<'_>) -> String {
    let mut out = String::new();
    for address_plan in &plan.addresses {
        out.push_str("#\n");
        out.push_str(&format!("#Commands for address: {}\n", address_plan.address));
        for (i, tx) in address_plan.transactions.iter().enumerate() {
            log::debug!(
                "{} #{}: 入力 {} 件, 合計 {}, 送金額 {}",
                address_plan.address,
                i + 1,
                tx.inputs.len(),
                tx.total_amount.to_string_in(Denomination::Bitcoin),
                format_coins(tx.net_amount)
            );
            if let Some(warning) = tx.warning {
                log::warn!(
                    "アドレス {} のトランザクション {}: {} (出力額 {})",
                    address_plan.address,
                    i + 1,
                    warning,
                    format_coins(tx.net_amount)
                );
            }
            out.push_str(&format!("#Transaction {}:\n", i + 1));
            out.push_str(&format_send_command(tx, ctx));
            out.push('\n');
        }
    }
    out
}
