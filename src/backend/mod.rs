//! Collaborator boundaries: document store, search engine, lock service.
//!
//! The engine core only talks to the outside world through the traits in
//! [`traits`]. [`memory`] provides in-process implementations used by tests,
//! demos, and single-node deployments.

pub mod memory;
pub mod traits;
