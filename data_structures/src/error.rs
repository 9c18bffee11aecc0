//! Error type definitions for the data structure module.

use std::fmt;

use thiserror::Error;

use crate::chain::{Hash, OutputPointer};

/// Rule of the transaction validity predicate that a [`TransactionError`] violates.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValidationRule {
    /// Every output has a non-negative value and a non-null address
    WellFormedOutputs,
    /// No output is claimed twice by the same transaction
    NoDoubleClaim,
    /// Every claimed output exists in the unspent outputs pool
    ReferentialIntegrity,
    /// Every input is signed by the owner of the claimed output
    Authorization,
    /// Inputs are worth at least as much as outputs
    Conservation,
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationRule::WellFormedOutputs => "well-formed outputs",
            ValidationRule::NoDoubleClaim => "no double claim",
            ValidationRule::ReferentialIntegrity => "referential integrity",
            ValidationRule::Authorization => "authorization",
            ValidationRule::Conservation => "conservation",
        };

        f.write_str(name)
    }
}

/// The error type for operations on a [`Transaction`](crate::transaction::Transaction)
#[derive(Debug, PartialEq, Clone, Error)]
pub enum TransactionError {
    /// An output has a negative or non-finite value
    #[error("Output #{output_index} has an invalid value: {value}")]
    InvalidOutputValue { output_index: usize, value: f64 },
    /// An output has no recipient
    #[error("Output #{output_index} has a null address")]
    NullAddress { output_index: usize },
    /// The same output is claimed by two inputs
    #[error("Output {output} is claimed more than once")]
    DuplicatedInput { output: OutputPointer },
    /// The claimed output was never part of the unspent outputs pool
    #[error("Output {output} not found")]
    OutputNotFound { output: OutputPointer },
    /// The claimed output existed but was already spent
    #[error("Output {output} was already spent")]
    OutputAlreadySpent { output: OutputPointer },
    /// The input signature does not verify against the owner of the claimed output
    #[error("Signature #{index} of output {output} could not be verified")]
    VerifyTransactionSignatureFail { index: usize, output: OutputPointer },
    /// Outputs are worth more than the inputs
    #[error("Sum of outputs ({outputs_value}) is greater than sum of inputs ({inputs_value})")]
    NegativeFee { inputs_value: f64, outputs_value: f64 },
    /// A transaction with the same hash was already committed
    #[error("Transaction {hash} was already committed")]
    DuplicatedTransaction { hash: Hash },
    /// The transaction hash was already assigned
    #[error("Transaction {hash} was already finalized")]
    AlreadyFinalized { hash: Hash },
    /// The transaction hash was read before it was assigned
    #[error("Transaction is not finalized yet")]
    NotFinalized,
    /// There is no input at the given position
    #[error("Input index {index} is out of range, the transaction has {inputs_n} inputs")]
    InputIndexOutOfRange { index: usize, inputs_n: usize },
}

impl TransactionError {
    /// The validity rule violated by this error, `None` for usage errors that are not about
    /// validity
    pub fn rule(&self) -> Option<ValidationRule> {
        match self {
            TransactionError::InvalidOutputValue { .. } | TransactionError::NullAddress { .. } => {
                Some(ValidationRule::WellFormedOutputs)
            }
            TransactionError::DuplicatedInput { .. } => Some(ValidationRule::NoDoubleClaim),
            TransactionError::OutputNotFound { .. }
            | TransactionError::OutputAlreadySpent { .. } => {
                Some(ValidationRule::ReferentialIntegrity)
            }
            TransactionError::VerifyTransactionSignatureFail { .. } => {
                Some(ValidationRule::Authorization)
            }
            TransactionError::NegativeFee { .. } => Some(ValidationRule::Conservation),
            TransactionError::DuplicatedTransaction { .. }
            | TransactionError::AlreadyFinalized { .. }
            | TransactionError::NotFinalized
            | TransactionError::InputIndexOutOfRange { .. } => None,
        }
    }
}
