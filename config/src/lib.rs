//! # Ledger configuration
//!
//! Configuration is loaded by the [loaders] as a __partial__ config and then merged over the
//! [defaults] with [`Config::from_partial`](config::Config::from_partial).

#![deny(rust_2018_idioms)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![deny(missing_docs)]

/// Total and partial configuration objects
pub mod config;
/// Default values of the configuration params
pub mod defaults;
/// Configuration loaders
pub mod loaders;
