//! # Config
//!
//! This module contains the `Config` struct, which holds all the
//! configuration params of the ledger. The `Config` struct in this
//! module is __total__, that is, it contains all the required fields
//! needed by the rest of the application unlike the partial
//! [Config](partial::Config) which is __partial__, meaning all fields
//! are optional and they may not appear in configuration file in which
//! case a default value will be used.
//!
//! All the [loaders](crate::loaders) will always return a partial
//! configuration but you shouldn't use that one directly but the one
//! in this module and use the method: `Config::from_partial`, to
//! obtain a total config object from a partial one.
//!
//! ```
//! use ledger_config::config::{partial, Config};
//!
//! let config = Config::from_partial(&partial::Config::default());
//! assert_eq!(config, Config::default());
//! ```

use ledger_data_structures::chain::{FeeOrder, SelectionStrategy};

use crate::defaults::{Defaults, Standard};

/// Module containing the partial configuration struct that is
/// returned by the loaders.
pub mod partial;

/// The total configuration object that contains all other, more
/// specific, configuration objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// How transactions are picked in every epoch
    pub selection: Selection,

    /// Logging-related configuration
    pub log: Log,
}

/// Transaction selection configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Selection policy
    pub strategy: SelectionStrategy,

    /// Direction of the fee sort, only used by the fee-greedy strategy
    pub fee_order: FeeOrder,
}

/// Logging-specific configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Log {
    /// Level for the log messages
    pub level: log::LevelFilter,
}

impl Config {
    /// Build a total config by taking every param missing in `config` from the defaults
    pub fn from_partial(config: &partial::Config) -> Self {
        let defaults = Standard;

        Config {
            selection: Selection::from_partial(&config.selection, &defaults),
            log: Log::from_partial(&config.log, &defaults),
        }
    }

    /// Inverse of `from_partial`: a partial config with every param set
    pub fn to_partial(&self) -> partial::Config {
        partial::Config {
            selection: self.selection.to_partial(),
            log: self.log.to_partial(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::from_partial(&partial::Config::default())
    }
}

impl Selection {
    /// Merge the partial selection config over `defaults`
    pub fn from_partial(config: &partial::Selection, defaults: &dyn Defaults) -> Self {
        Selection {
            strategy: config
                .strategy
                .unwrap_or_else(|| defaults.selection_strategy()),
            fee_order: config
                .fee_order
                .unwrap_or_else(|| defaults.selection_fee_order()),
        }
    }

    /// Partial selection config with every param set
    pub fn to_partial(&self) -> partial::Selection {
        partial::Selection {
            strategy: Some(self.strategy),
            fee_order: Some(self.fee_order),
        }
    }
}

impl Log {
    /// Merge the partial log config over `defaults`
    pub fn from_partial(config: &partial::Log, defaults: &dyn Defaults) -> Self {
        Log {
            level: config.level.unwrap_or_else(|| defaults.log_level()),
        }
    }

    /// Partial log config with every param set
    pub fn to_partial(&self) -> partial::Log {
        partial::Log {
            level: Some(self.level),
        }
    }
}
