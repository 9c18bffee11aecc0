//! # Partial Config
//!
//! This module contains the __partial__ `Config` struct. All loaders
//! in `loaders` module will transform the loaded configuration into
//! an instance of this struct. The reason why it is called
//! __partial__ is because params are optional and won't be
//! present (they are `None`) if they do not appear in the source,
//! later, the `config` module will use this partial config object and
//! the defaults to produce a __total__ (no `Option` fields)
//! configuration object.
use serde::{Deserialize, Serialize};

use ledger_data_structures::chain::{FeeOrder, SelectionStrategy};

/// The partial configuration object that contains all other, more
/// specific, configuration objects.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Transaction selection configuration
    #[serde(default)]
    pub selection: Selection,

    /// Logging-related configuration
    #[serde(default)]
    pub log: Log,
}

/// Transaction selection partial configuration.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Selection {
    /// Selection policy: `order_preserving` or `fee_greedy`
    pub strategy: Option<SelectionStrategy>,

    /// Fee sort direction: `descending` or `ascending`
    pub fee_order: Option<FeeOrder>,
}

/// Logging-specific partial configuration.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Log {
    /// Level for the log messages, e.g. `info` or `debug`
    pub level: Option<log::LevelFilter>,
}
