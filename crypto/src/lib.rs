//! crypto

#![deny(rust_2018_idioms)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![deny(missing_docs)]

/// Re-export the secp256k1 crate so dependents agree on its version
pub use secp256k1;

/// Hash functions
pub mod hash;
/// Signature creation and verification
pub mod signature;
