//! The hello-api service: contract, handlers, and wiring.
//!
//! The binary in `main.rs` is a thin shell over this crate so integration
//! tests can start the exact service the binary runs.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod handlers;

use portico::prelude::{Contract, ContractError};

/// The API contract embedded at build time.
///
/// `--contract` on the binary substitutes a file at runtime; everything else
/// uses this copy.
pub const CONTRACT_BYTES: &[u8] = include_bytes!("../contract/hello-api.json");

/// Loads the embedded contract.
///
/// # Errors
///
/// Returns [`ContractError`] if the embedded description is invalid, which
/// would be a packaging defect.
pub fn contract() -> Result<Contract, ContractError> {
    Contract::from_slice(CONTRACT_BYTES)
}
