//! marginalia-core — the anchor model behind the review host.
//!
//! A reviewer attaches a comment to a `(line, character)` span at creation
//! time; the document may change arbitrarily afterwards. This crate owns
//! everything with invariants around that problem: the stored comment types
//! ([`types`]), the persisted JSON documents and their bootstrap ([`schema`]),
//! durable CRUD with refresh events ([`store`]), span-to-comment resolution
//! ([`resolve`]), decoration computation for the active document ([`render`]),
//! and the point-selection click dispatcher ([`dispatch`]).
//!
//! Stored coordinates are 1-based (the line numbers a reviewer reads);
//! document coordinates are 0-based. The conversion happens exactly once, at
//! the document-query boundary — see [`types::Position`].

pub mod dispatch;
pub mod error;
pub mod render;
pub mod resolve;
pub mod schema;
pub mod store;
pub mod types;
