//! Core business logic for the HRM leave service.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Domain types, validation rules, the ledger and the request state machine live
//! here, together with the storage traits and an in-process store.
//!
//! # Modules
//!
//! - `leave` - Leave balances, requests, and the coordinator that ties them together

pub mod leave;
