#![deny(rust_2018_idioms)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![deny(unused_must_use)]

/// Module containing the chain data types: hashes, output pointers, addresses, inputs and
/// outputs
pub mod chain;

/// Module containing error definitions
pub mod error;

/// Module containing the value transfer transaction
pub mod transaction;

/// Unspent outputs pool and the diffs that are applied to it
pub mod utxo_pool;
