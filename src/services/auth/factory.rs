/// Factory: build `IdentityResolver` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{
    IdentityResolver, ResolverConfig,
    store::{TokenStore, UserStore},
};

pub fn build_identity_resolver(
    config: &Config,
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
) -> Arc<IdentityResolver> {
    let resolver_config = ResolverConfig::new(config.auth_token_source)
        .with_header_name(config.auth_token_header.clone())
        .with_cookie_name(config.auth_token_cookie.clone());

    tracing::info!(
        source = %resolver_config.source(),
        header = %resolver_config.header_name(),
        cookie = resolver_config.cookie_name(),
        "identity resolver configured"
    );

    Arc::new(IdentityResolver::new(resolver_config, users, tokens))
}
