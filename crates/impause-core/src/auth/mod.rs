//! Account sign-in against the impause auth service.

mod claims;
mod client;
mod session;
mod token;

pub use claims::{is_token_expired, is_token_expired_at, Claims};
pub use client::{AuthClient, AuthResponse, UserProfile};
pub use session::{AuthSession, AuthStatus, ListenerId};
pub use token::{KeyringTokenStore, MemoryTokenStore, TokenStore, AUTH_TOKEN_KEY};
