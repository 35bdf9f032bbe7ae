//src/lib.rs

// Núcleo de controle dos workers de disparo e de status das campanhas.

pub mod common;
pub mod config;
pub mod db;
pub mod handlers;
pub mod models;
pub mod services;
pub mod supervisor;

pub use crate::common::error::AppError;
pub use crate::config::{init_logging, AppConfig, AppState};
