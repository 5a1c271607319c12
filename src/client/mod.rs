//! Client-side auth core.
//!
//! ARCHITECTURE
//! ============
//! Two identity providers are supported: a hosted identity service and the
//! custom REST backend in this crate. Both sit behind a single
//! `AuthGateway` trait, and one `SessionStore` state machine drives the UI
//! regardless of which provider is plugged in.

pub mod gateway;
pub mod guard;
pub mod hosted;
pub mod rest;
pub mod storage;
pub mod store;
