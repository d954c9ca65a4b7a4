use clap::Parser;

mod cli;
mod command;
mod config;
mod error;
mod planner;
mod rpc;
mod source;
mod types;

use cli::CliArgs;
use command::CommandContext;
use config::Settings;
use error::AppError;

fn main() -> Result<(), AppError> {
    let args = CliArgs::parse();

    // RUST_LOG が指定されていればそちらを優先する
    let default_filter = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let settings = Settings::from_args(args)?;
    if settings.debug {
        log::debug!("解決済みの設定: {:?}", settings);
    }

    let utxos = source::fetch_unspent(&settings)?;
    log::info!("{} 件のUTXOを取得しました。", utxos.len());

    let plan = planner::plan(&utxos, &settings.policy, settings.max_inputs)?;
    if plan.is_empty() {
        log::warn!("統合対象となる使用可能なUTXOがありません。");
        return Ok(());
    }
    log::info!(
        "{} 件のアドレスに対して {} 件のトランザクションを計画しました。",
        plan.addresses.len(),
        plan.transaction_count()
    );

    let ctx = CommandContext {
        cli_command: &settings.cli_command,
        destination_address: &settings.destination_address,
        min_conf: settings.min_conf,
        fee: settings.policy.fee,
    };
    print!("{}", command::render_script(&plan, &ctx));

    log::info!("処理が正常に完了しました。");
    Ok(())
}
