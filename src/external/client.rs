use std::time::Duration;

use crate::config::HttpClientConfig;

/// Builds the HTTP client shared by every provider.
///
/// One client is created at startup and handed to providers through
/// `ProviderContext`, so connections are pooled across channels.
///
/// # Features
/// - **Timeouts**: total and connect timeouts from `[http]`
/// - **Compression**: gzip, deflate, brotli and zstd responses
/// - **HTTP/2**: adaptive window sizing and keep-alive
/// - **TLS**: Rustls, no OpenSSL dependency
/// - **User-Agent**: `notifier-rs/<version>` unless overridden
pub fn build_http_client(config: &HttpClientConfig) -> Result<reqwest::Client, reqwest::Error> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(default_user_agent);

    reqwest::Client::builder()
        // Timeouts
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        // Connection pooling
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(Duration::from_secs(90))
        // HTTP/2 settings
        .http2_adaptive_window(true)
        .http2_keep_alive_interval(Duration::from_secs(10))
        .http2_keep_alive_timeout(Duration::from_secs(20))
        // Compression
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .zstd(true)
        .user_agent(user_agent)
        .build()
}

fn default_user_agent() -> String {
    format!("notifier-rs/{}", crate::pkg_version())
}
