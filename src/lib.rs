//! HoverBoard: a portfolio showcase with username-based public profiles.
//!
//! Two halves share this crate. The server half is an Axum REST API over
//! Postgres: registration, login, bearer sessions, the one-time username
//! claim, public profiles, and project CRUD. The client half
//! ([`client`]) is the session state machine that drives a UI against
//! either that API or a hosted identity service, behind one
//! [`client::gateway::AuthGateway`] interface.

pub mod client;
pub mod config;
pub mod db;
pub mod routes;
pub mod services;
pub mod state;
