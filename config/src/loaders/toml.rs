//! Load the configuration from a file or a `String` written in [Toml format](https://en.wikipedia.org/wiki/TOML)

use std::{fs::File, io, io::Read, path::Path, result};

use thiserror::Error;

use crate::config::partial::Config;

/// Error type denoting the different errors this module can fail with.
/// Parsing the configuration from Toml might fail with a
/// `toml::de::Error`, but loading that configuration from a file
/// might also fail with a `std::io::Error`.
#[derive(Debug, Error)]
pub enum Error {
    /// Indicates there was an error when trying to load configuration from a file.
    #[error("Could not read the configuration file: {0}")]
    IOError(#[from] io::Error),
    /// Indicates there was an error when trying to build a
    /// `ledger_config::config::partial::Config` instance out of the Toml string given.
    #[error("Could not parse the configuration: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Just like `std::result::Result` but with the error param fixed to
/// `Error` type in this module.
pub type Result<T> = result::Result<T, Error>;

/// Load configuration from a file written in Toml format.
pub fn from_file<P: AsRef<Path>>(filename: P) -> Result<Config> {
    let mut contents = String::new();
    read_file_contents(filename.as_ref(), &mut contents)?;
    from_str(&contents)
}

#[cfg(not(test))]
fn read_file_contents(filename: &Path, contents: &mut String) -> io::Result<usize> {
    let mut file = File::open(filename)?;
    file.read_to_string(contents)
}

#[cfg(test)]
fn read_file_contents(_filename: &Path, _contents: &mut String) -> io::Result<usize> {
    Ok(0)
}

/// Load configuration from a string written in Toml format.
pub fn from_str(contents: &str) -> Result<Config> {
    Ok(toml::from_str(contents)?)
}
