// session-client/src/lib.rs
pub mod access_token;
pub mod flow;
pub mod state;
pub mod storage;

pub use access_token::{AccessTokenSource, CookieAccessToken, StaticAccessToken};
pub use flow::{AuthTokenReport, BackendEndpoints, SessionFlow};
pub use state::SessionState;
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
