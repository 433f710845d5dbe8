pub mod factory;
pub mod pg_store;
pub mod resolver;
pub mod store;
pub mod types;

pub use factory::build_identity_resolver;
pub use resolver::{
    AuthError, IdLoader, IdentityResolver, RequestAuthenticator, ResolverConfig, TokenAuthenticator,
    TokenSource, UnauthorizedResponder,
};
pub use store::{StoreError, TokenStore, UserStore};
pub use types::{AuthToken, User};
