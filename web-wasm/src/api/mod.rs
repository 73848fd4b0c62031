//! バックエンドAPI連携

mod fetch;

pub use fetch::FetchTransport;

use narrato_common::{ApiConfig, DEFAULT_BASE_URL};

/// ビルド時に `NARRATO_API_URL` で上書き可能
pub fn api_config() -> ApiConfig {
    ApiConfig::new(option_env!("NARRATO_API_URL").unwrap_or(DEFAULT_BASE_URL))
}
