use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use ledger_crypto::{
    hash::{SHA256_LENGTH, Sha256, calculate_sha256},
    secp256k1,
};

/// Something that has a content hash
pub trait Hashable {
    /// Compute the hash of `self`
    fn hash(&self) -> Hash;
}

/// Possible errors when parsing a [`Hash`] from a hex string
#[derive(Debug, Error, PartialEq)]
pub enum HashParseError {
    /// The string is not valid hexadecimal
    #[error("Failed to parse hex: {0}")]
    Hex(#[from] hex::FromHexError),
    /// The decoded bytes do not have the length of a SHA-256 digest
    #[error("Invalid hash length: expected 32 bytes but got {0}")]
    InvalidLength(usize),
}

/// Possible errors when parsing an [`OutputPointer`]
#[derive(Debug, Error, PartialEq)]
pub enum OutputPointerParseError {
    /// The string has no `:` separating hash and index
    #[error("Output pointer is missing the ':' separator")]
    MissingColon,
    /// The transaction hash part is invalid
    #[error("Invalid transaction hash: {0}")]
    Hash(#[from] HashParseError),
    /// The output index part is not a valid `u32`
    #[error("Invalid output index: {0}")]
    InvalidIndex(#[from] std::num::ParseIntError),
}

/// Hash
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Hash {
    /// SHA-256 Hash
    SHA256(SHA256),
}

/// Array of 32 bytes
pub type SHA256 = [u8; SHA256_LENGTH];

impl Hash {
    /// Hash of `bytes`
    pub fn digest(bytes: &[u8]) -> Self {
        Hash::from(calculate_sha256(bytes))
    }
}

impl Default for Hash {
    fn default() -> Self {
        Hash::SHA256([0; 32])
    }
}

impl From<Sha256> for Hash {
    fn from(x: Sha256) -> Self {
        Hash::SHA256(x.0)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        match self {
            Hash::SHA256(x) => x,
        }
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hash::SHA256(x) => f.write_str(&hex::encode(x)),
        }
    }
}

impl FromStr for Hash {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let sha: SHA256 = bytes
            .as_slice()
            .try_into()
            .map_err(|_| HashParseError::InvalidLength(bytes.len()))?;

        Ok(Hash::SHA256(sha))
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;

        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifier of one spendable output: the hash of the transaction that created it and the
/// position of the output inside that transaction.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OutputPointer {
    /// Hash of the transaction that created the output
    pub transaction_id: Hash,
    /// Index of the output, the first one is 0
    pub output_index: u32,
}

impl OutputPointer {
    /// Create a new pointer to output `output_index` of transaction `transaction_id`
    pub fn new(transaction_id: Hash, output_index: u32) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }
}

impl fmt::Display for OutputPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}

impl FromStr for OutputPointer {
    type Err = OutputPointerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hash, index) = s
            .split_once(':')
            .ok_or(OutputPointerParseError::MissingColon)?;

        Ok(OutputPointer {
            transaction_id: hash.parse()?,
            output_index: index.parse()?,
        })
    }
}

// Serialized as a "<hash>:<index>" string so it can be used as a map key in JSON
impl Serialize for OutputPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OutputPointer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;

        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Recipient of an output: the serialized public key whose owner is allowed to spend it.
///
/// The bytes are opaque to the ledger, they are only handed to the signature verifier. An
/// empty address is the "null" address and makes an output unusable.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Address(#[serde(with = "hex")] Vec<u8>);

impl Address {
    /// Wrap raw address bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw address bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether this is the null address
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<secp256k1::PublicKey> for Address {
    fn from(public_key: secp256k1::PublicKey) -> Self {
        Self(public_key.serialize().to_vec())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// Value transfer output transaction data structure
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueTransferOutput {
    /// Owner of the output
    pub address: Address,
    /// Transferred value, must not be negative
    pub value: f64,
}

impl ValueTransferOutput {
    /// Create an output paying `value` to `address`
    pub fn new(address: Address, value: f64) -> Self {
        Self { address, value }
    }
}

/// Input data structure: a claim on an unspent output together with the signature that
/// authorizes it
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Input {
    output_pointer: OutputPointer,
    #[serde(with = "hex")]
    signature: Vec<u8>,
}

impl Input {
    /// Create a new unsigned input
    pub fn new(output_pointer: OutputPointer) -> Self {
        Self {
            output_pointer,
            signature: vec![],
        }
    }

    /// Create a new input with its signature
    pub fn with_signature(output_pointer: OutputPointer, signature: Vec<u8>) -> Self {
        Self {
            output_pointer,
            signature,
        }
    }

    /// Return the [`OutputPointer`](OutputPointer) of an input.
    pub fn output_pointer(&self) -> &OutputPointer {
        &self.output_pointer
    }

    /// Signature bytes, empty if the input is unsigned
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub(crate) fn set_signature(&mut self, signature: Vec<u8>) {
        self.signature = signature;
    }
}

/// Policy used to pick, from a batch of candidate transactions, the ones committed in an epoch
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Commit candidates in the order they were submitted
    #[default]
    OrderPreserving,
    /// Commit candidates sorted by the fee they pay
    FeeGreedy,
}

/// Direction in which the fee-greedy strategy walks the candidates
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeOrder {
    /// Highest fee first
    #[default]
    Descending,
    /// Lowest fee first
    Ascending,
}
