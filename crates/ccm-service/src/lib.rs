// SPDX-License-Identifier: BUSL-1.1
//! # ccm-service — Document Service API
//!
//! The orchestration layer over the registry and blob store. A request
//! flows: identity (already authenticated by the excluded web layer) →
//! authorization gate for mutations → version history engine → registry
//! persist → cache refresh. Reads go through the in-process cache and
//! fall back to the registry on miss.
//!
//! ## Authorization
//!
//! Updates and deletes require the configured mutation role (by default
//! `"Data Protection Officer"`). The gate is consulted fresh on every
//! mutating call — decisions are never cached, and any gate failure is a
//! denial. See [`gate`].
//!
//! ## Atomicity
//!
//! Every mutation either fully applies (record persisted, cache
//! refreshed) or fully fails. Blob bytes are written *before* the
//! registry persist; if the persist then fails, the orphaned blob is
//! acceptable collateral — unreferenced, reclaimable — but the document
//! never appears updated.

pub mod cache;
pub mod config;
pub mod error;
pub mod gate;
pub mod service;

pub use cache::RecordCache;
pub use config::{RetentionPolicy, ServiceConfig};
pub use error::ServiceError;
pub use gate::{authorize, Decision, GateError, RoleGate, StaticRoleGate};
pub use service::{CreateDocument, DocumentService, FileContent, UpdateDocument};
