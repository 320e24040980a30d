//! 共享 HTTP 客户端构造与响应检查

use std::time::Duration;

use reqwest::{Client, Response};

use crate::core::ProviderError;

const USER_AGENT: &str = concat!("forkcast/", env!("CARGO_PKG_VERSION"));

/// 构造 reqwest Client；timeout_secs 为 0 时不设超时
pub fn build_client(timeout_secs: u64) -> Client {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }
    builder.build().unwrap_or_default()
}

/// 非 2xx 时读出响应体作为错误详情
pub(crate) async fn ensure_success(
    provider: &'static str,
    resp: Response,
) -> Result<Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!(provider, status = %status, "provider refused request");
    Err(ProviderError::Status {
        provider,
        code: status.as_u16(),
        detail: body.chars().take(300).collect(),
    })
}

/// 取出已配置且非空的 Key，否则返回 MissingCredentials
pub(crate) fn require_key<'a>(
    provider: &'static str,
    key: &'a Option<String>,
) -> Result<&'a str, ProviderError> {
    match key.as_deref().map(str::trim) {
        Some(k) if !k.is_empty() => Ok(k),
        _ => Err(ProviderError::MissingCredentials(provider)),
    }
}
