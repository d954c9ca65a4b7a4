use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::{cli::RpcEndpoint, error::AppError, types::UnspentOutput};

/// listunspent に渡す最大承認数
pub const MAX_CONF: u32 = 9_999_999;

#[derive(Deserialize, Debug)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize, Debug)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

pub struct RpcClient {
    endpoint: RpcEndpoint,
    client: reqwest::blocking::Client,
}

impl RpcClient {
    pub fn new(endpoint: RpcEndpoint, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(RpcClient { endpoint, client })
    }

    pub fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, AppError> {
        let request_body = json!({
            "jsonrpc": "1.0",
            "id": env!("CARGO_PKG_NAME"),
            "method": method,
            "params": params,
        });
        log::debug!("RPC呼び出し: {} {}", method, request_body["params"]);

        let mut request = self.client.post(self.endpoint.url.clone()).json(&request_body);
        if let Some((username, password)) = self.endpoint.basic_auth() {
            request = request.basic_auth(username, password);
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        log::debug!("RPCレスポンス: ステータス {}, {} バイト", status, body.len());

        map_response(method, status, &body)
    }

    pub fn list_unspent(
        &self,
        min_conf: u32,
        addresses: &[String],
    ) -> Result<Vec<UnspentOutput>, AppError> {
        log::info!(
            "listunspent を呼び出します (最小承認数 {}, アドレス {} 件)。",
            min_conf,
            addresses.len()
        );
        self.call("listunspent", list_unspent_params(min_conf, addresses))
    }
}

fn list_unspent_params(min_conf: u32, addresses: &[String]) -> Value {
    json!([min_conf, MAX_CONF, addresses])
}

// ノードはRPCエラー時にもHTTP 500でJSONを返すため、先に本文を解釈する
fn map_response<T: DeserializeOwned>(
    method: &str,
    status: StatusCode,
    body: &str,
) -> Result<T, AppError> {
    match decode_response(method, body) {
        Err(AppError::RpcResponse { .. }) if !status.is_success() => Err(AppError::RpcHttp {
            status: status.as_u16(),
        }),
        other => other,
    }
}

fn decode_response<T: DeserializeOwned>(method: &str, body: &str) -> Result<T, AppError> {
    let to_response_error = |source| AppError::RpcResponse {
        method: method.to_string(),
        source,
    };

    let response: RpcResponse = serde_json::from_str(body).map_err(to_response_error)?;
    if let Some(error) = response.error {
        return Err(AppError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    serde_json::from_value(response.result).map_err(to_response_error)
}
