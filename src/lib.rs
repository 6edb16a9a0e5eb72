//! # movieflix
//!
//! Client library for the MovieFlix catalog service. The remote HTTP API owns
//! persistence, authentication and business rules; this crate keeps the
//! client-side session, mirrors the signed-in user's favorites, and decides
//! which screens a session may reach.
//!
//! The `movieflix` binary in `src/main.rs` drives the same operations from
//! the command line.

pub mod admin;
pub mod app;
pub mod config;
pub mod error;
pub mod gate;
pub mod net;
pub mod state;

pub use app::App;
pub use config::ClientConfig;
pub use error::ClientError;
