//! # Portico Core
//!
//! Core types for the Portico server framework.
//!
//! This crate provides the foundational pieces shared by the router and the
//! server:
//!
//! - [`Contract`] / [`Operation`] - the in-memory model of an API description
//! - [`ParamType`] / [`PathArgs`] - declared parameter types and per-request
//!   coerced values
//! - [`RequestContext`] / [`RequestId`] - per-request metadata
//! - [`ContractError`] / [`CoercionError`] - the startup and per-request
//!   error taxonomy

#![doc(html_root_url = "https://docs.rs/portico-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod contract;
mod context;
mod error;
mod params;

pub use context::{RequestContext, RequestId};
pub use contract::{Contract, Operation, ParamSpec};
pub use error::{CoercionError, ContractError};
pub use params::{ParamType, ParamValue, PathArgs};
