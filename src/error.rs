use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSONパースエラー ファイル: {file_path:?}, 詳細: {source}")]
    JsonParse {
        file_path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("入力検証エラー: {0}")]
    InputValidation(String),

    #[error("金額の解析に失敗しました ({input}): {source}")]
    AmountParse {
        input: String,
        #[source]
        source: bitcoin::amount::ParseAmountError,
    },

    #[error("金額の計算でオーバーフローが発生しました (アドレス {address})")]
    AmountOverflow { address: String },

    #[error("HTTP通信エラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPCサーバーがHTTPステータス {status} を返しました")]
    RpcHttp { status: u16 },

    #[error("RPCエラー (コード {code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("RPCレスポンスの解析に失敗しました ({method}): {source}")]
    RpcResponse {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}
