//! Autochrone API server library.
//!
//! Exposes configuration, state, error handling, token authority and routes
//! so integration tests and the binary entrypoint can both access them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
