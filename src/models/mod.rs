//! Configuration and session models shared by every handler.

pub mod auth;
pub mod config;
