//! kvconf Core
//!
//! Core types shared by the kvconf store client, config service and feeder.
//!
//! This crate contains:
//! - Domain types: the store keys and the profile triple written to the store
//! - DTOs: the record served over HTTP

pub mod domain;
pub mod dto;

/// Value substituted for any store-backed field whose read failed
pub const SENTINEL: &str = "ERROR";
