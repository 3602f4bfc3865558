//! Valuya core library.
//!
//! This library provides the wire types, errors and the remote service interface
//! shared by the guard middleware and the HTTP client.

pub mod errors;
pub mod service;
pub mod types;
