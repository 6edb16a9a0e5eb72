//! Networking modules for the catalog HTTP API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` defines the collaborator traits, `http` implements them over
//! `reqwest`, and `types` defines the wire schema.

pub mod api;
pub mod http;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
