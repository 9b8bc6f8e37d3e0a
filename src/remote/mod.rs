pub mod auth_api;
pub mod data_api;
pub mod session_store;
pub mod supabase;

#[cfg(test)]
pub mod fake;

pub use auth_api::{AuthApi, AuthEvent, AuthSession, AuthUser, UserChange};
pub use data_api::{DataApi, Filter, Row};
pub use session_store::SessionStore;
