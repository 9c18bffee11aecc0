//! # Default values
//!
//! This module contains the default values for the ledger configuration params.
use ledger_data_structures::chain::{FeeOrder, SelectionStrategy};

/// Trait defining all the configuration params that have a suitable
/// default value.
pub trait Defaults {
    /// Default log level
    fn log_level(&self) -> log::LevelFilter {
        log::LevelFilter::Info
    }

    /// Commit transactions in the order they are submitted
    fn selection_strategy(&self) -> SelectionStrategy {
        SelectionStrategy::OrderPreserving
    }

    /// Highest fee first when the fee-greedy strategy is used
    fn selection_fee_order(&self) -> FeeOrder {
        FeeOrder::Descending
    }
}

/// Standard defaults
pub struct Standard;

impl Defaults for Standard {}
