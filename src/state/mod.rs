//! Client-side state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `storage` is the durable key/value layer, `session` keeps the signed-in
//! identity on top of it, `favorites` mirrors the user's favorites list and
//! `catalog` holds the last movie listing fetched from the server.

pub mod catalog;
pub mod favorites;
pub mod session;
pub mod storage;
