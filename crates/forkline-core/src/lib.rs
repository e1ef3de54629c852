//! # forkline-core
//! Foundation types, cryptography and error taxonomy for the Forkline protocol.

pub mod canonical;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod types;
