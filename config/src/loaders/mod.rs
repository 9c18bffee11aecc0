//! Loaders of configuration. Every loader returns a
//! [partial Config](crate::config::partial::Config).

pub mod toml;
