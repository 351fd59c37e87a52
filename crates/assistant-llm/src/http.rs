use assistant_core::{AssistantConfig, ProxyAuth};
use reqwest::{Client, Proxy};

use crate::provider::Result;

/// HTTP client honoring the configured proxies.
pub fn build_http_client(config: &AssistantConfig) -> Result<Client> {
    let mut builder = Client::builder();
    if !config.http_proxy.is_empty() {
        let proxy = Proxy::http(&config.http_proxy)?;
        builder = builder.proxy(apply_proxy_auth(proxy, config.http_proxy_auth.as_ref()));
    }
    if !config.https_proxy.is_empty() {
        let proxy = Proxy::https(&config.https_proxy)?;
        builder = builder.proxy(apply_proxy_auth(proxy, config.https_proxy_auth.as_ref()));
    }
    Ok(builder.build()?)
}

fn apply_proxy_auth(proxy: Proxy, auth: Option<&ProxyAuth>) -> Proxy {
    match auth {
        Some(auth) => proxy.basic_auth(&auth.username, &auth.password),
        None => proxy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_without_proxies() {
        assert!(build_http_client(&AssistantConfig::default()).is_ok());
    }

    #[test]
    fn builds_with_authenticated_proxy() {
        let config = AssistantConfig {
            https_proxy: "http://proxy.local:3128".into(),
            https_proxy_auth: Some(ProxyAuth {
                username: "u".into(),
                password: "p".into(),
            }),
            ..Default::default()
        };
        assert!(build_http_client(&config).is_ok());
    }

    #[test]
    fn rejects_malformed_proxy_url() {
        let config = AssistantConfig {
            http_proxy: "not a url".into(),
            ..Default::default()
        };
        assert!(build_http_client(&config).is_err());
    }
}
