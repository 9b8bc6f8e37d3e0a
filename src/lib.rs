// src/lib.rs

// Declaração dos nossos módulos
pub mod common;
pub mod config;
pub mod models;
pub mod permissions;
pub mod remote;
pub mod services;
pub mod shell;
pub mod validation;

pub use common::error::AppError;
pub use config::{AppConfig, AppState};
pub use services::session::{SessionContext, SessionState};
