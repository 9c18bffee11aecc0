//! node

#![deny(rust_2018_idioms)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![deny(missing_docs)]

/// Ledger state owner: validates and commits the transactions of every epoch
pub mod handler;

/// Policies used to pick the transactions committed in an epoch
pub mod selection;

pub use handler::TxHandler;
pub use selection::{EpochReport, EpochSelector};
