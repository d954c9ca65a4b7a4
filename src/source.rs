use std::fs;
use std::path::Path;

use crate::{
    config::{Settings, UtxoSource},
    error::AppError,
    rpc::{MAX_CONF, RpcClient},
    types::UnspentOutput,
};

/// 設定されたソースからUTXO一覧を一度だけ取得する
pub fn fetch_unspent(settings: &Settings) -> Result<Vec<UnspentOutput>, AppError> {
    match &settings.source {
        UtxoSource::Rpc { endpoint, timeout } => {
            log::info!("RPCサーバー {} に接続します。", endpoint.url);
            let client = RpcClient::new(endpoint.clone(), *timeout)?;
            client.list_unspent(settings.min_conf, &settings.from_addresses)
        }
        UtxoSource::File(path) => {
            let all = load_unspent_file(path)?;
            let total = all.len();
            let (selected, unconfirmed) =
                filter_like_listunspent(all, settings.min_conf, &settings.from_addresses);
            if unconfirmed > 0 {
                // confirmations を含まないダンプでは全件が 0 承認として扱われる
                log::warn!(
                    "{} 件のUTXOが最小承認数 {} を満たさないため除外されました。",
                    unconfirmed,
                    settings.min_conf
                );
            }
            log::info!(
                "{:?} から {} 件のUTXOを読み込みました ({} 件が条件に一致)。",
                path,
                total,
                selected.len()
            );
            Ok(selected)
        }
    }
}

pub fn load_unspent_file(path: &Path) -> Result<Vec<UnspentOutput>, AppError> {
    let content = fs::read_to_string(path).map_err(|e| {
        log::error!("UTXOファイルの読み込みに失敗しました: {:?}", path);
        AppError::Io(e)
    })?;

    serde_json::from_str(&content).map_err(|e| {
        log::error!("UTXOファイルのJSONパースに失敗しました。");
        AppError::JsonParse {
            file_path: path.to_path_buf(),
            source: e,
        }
    })
}

/// ノード側で行われる承認数とアドレスの絞り込みを再現する。
/// 承認数の条件で除外した件数も返す。
fn filter_like_listunspent(
    utxos: Vec<UnspentOutput>,
    min_conf: u32,
    addresses: &[String],
) -> (Vec<UnspentOutput>, usize) {
    let (selected, unconfirmed): (Vec<_>, Vec<_>) = utxos
        .into_iter()
        .filter(|u| addresses.is_empty() || addresses.contains(&u.address))
        .partition(|u| u.confirmations >= min_conf && u.confirmations <= MAX_CONF);
    (selected, unconfirmed.len())
}
