use std::{cmp::Ordering, collections::HashSet};

use ledger_crypto::signature::{PublicKey, Signature, verify};
use ledger_data_structures::{
    chain::{Address, Hash, Input, OutputPointer, ValueTransferOutput},
    error::TransactionError,
    transaction::Transaction,
    utxo_pool::UtxoDiff,
};

/// Checks that an input signature authorizes spending an output owned by `address`.
///
/// Implementations must be pure: the same arguments always give the same answer.
pub trait SignatureVerifier {
    /// Whether `signature` is a valid signature of `payload` made by the owner of `address`
    fn verify(&self, address: &Address, payload: &[u8], signature: &[u8]) -> bool;
}

impl<V: SignatureVerifier + ?Sized> SignatureVerifier for &V {
    fn verify(&self, address: &Address, payload: &[u8], signature: &[u8]) -> bool {
        (**self).verify(address, payload, signature)
    }
}

/// ECDSA over secp256k1. The address is a serialized public key and the signature is DER
/// encoded.
#[derive(Clone, Copy, Debug, Default)]
pub struct Secp256k1Verifier;

impl SignatureVerifier for Secp256k1Verifier {
    fn verify(&self, address: &Address, payload: &[u8], signature: &[u8]) -> bool {
        let public_key = match PublicKey::from_slice(address.as_bytes()) {
            Ok(public_key) => public_key,
            Err(e) => {
                log::trace!("Address {} is not a valid public key: {}", address, e);
                return false;
            }
        };
        let signature = match Signature::from_der(signature) {
            Ok(signature) => signature,
            Err(e) => {
                log::trace!("Malformed signature: {}", e);
                return false;
            }
        };

        verify(&public_key, payload, &signature).is_ok()
    }
}

/// Look up the output pointed by an input.
///
/// When the output is missing, the error tells apart outputs that were already spent from
/// outputs that never existed.
pub fn get_unspent_output<'a>(
    utxo_diff: &'a UtxoDiff<'_>,
    output_pointer: &OutputPointer,
) -> Result<&'a ValueTransferOutput, TransactionError> {
    utxo_diff.get(output_pointer).ok_or_else(|| {
        if utxo_diff.was_spent(output_pointer) {
            TransactionError::OutputAlreadySpent {
                output: output_pointer.clone(),
            }
        } else {
            TransactionError::OutputNotFound {
                output: output_pointer.clone(),
            }
        }
    })
}

/// Calculate the sum of the values of the outputs pointed by the
/// inputs of a transaction. If an input pointed-output is not
/// found in `utxo_diff`, then an error is returned instead indicating
/// it.
pub fn transaction_inputs_sum(
    inputs: &[Input],
    utxo_diff: &UtxoDiff<'_>,
) -> Result<f64, TransactionError> {
    let mut total_value = 0.0;
    for input in inputs {
        total_value += get_unspent_output(utxo_diff, input.output_pointer())?.value;
    }

    Ok(total_value)
}

/// Calculate the sum of the values of the outputs of a transaction.
pub fn transaction_outputs_sum(outputs: &[ValueTransferOutput]) -> f64 {
    outputs.iter().map(|vt_output| vt_output.value).sum()
}

// Sums that cannot be compared (NaN) do not conserve value either
fn fee_from_sums(inputs_value: f64, outputs_value: f64) -> Result<f64, TransactionError> {
    match inputs_value.partial_cmp(&outputs_value) {
        Some(Ordering::Greater | Ordering::Equal) => Ok(inputs_value - outputs_value),
        Some(Ordering::Less) | None => Err(TransactionError::NegativeFee {
            inputs_value,
            outputs_value,
        }),
    }
}

/// Returns the fee of a value transfer transaction.
///
/// The fee is the difference between the inputs and the outputs
/// of the transaction, negative if the outputs are worth more. The
/// `utxo_diff` parameter is used to find the outputs pointed by the
/// inputs, which contain their actual value. Nothing else is checked,
/// so the result is only meaningful for a transaction that validated
/// against the same state.
pub fn transaction_fee(tx: &Transaction, utxo_diff: &UtxoDiff<'_>) -> Result<f64, TransactionError> {
    let in_value = transaction_inputs_sum(tx.inputs(), utxo_diff)?;
    let out_value = transaction_outputs_sum(tx.outputs());

    Ok(in_value - out_value)
}

/// Every output must have a finite, non-negative value and a non-null address
pub fn validate_outputs(outputs: &[ValueTransferOutput]) -> Result<(), TransactionError> {
    for (output_index, output) in outputs.iter().enumerate() {
        if !output.value.is_finite() || output.value < 0.0 {
            return Err(TransactionError::InvalidOutputValue {
                output_index,
                value: output.value,
            });
        }
        if output.address.is_empty() {
            return Err(TransactionError::NullAddress { output_index });
        }
    }

    Ok(())
}

/// Validate the inputs of a transaction, one by one: the output they claim is not claimed by an
/// earlier input, it is unspent, and the input signature is made by its owner.
///
/// Returns the sum of the values of the claimed outputs.
pub fn validate_inputs<V: SignatureVerifier>(
    tx: &Transaction,
    utxo_diff: &UtxoDiff<'_>,
    verifier: &V,
) -> Result<f64, TransactionError> {
    let inputs_n = tx.inputs().len();
    let mut claimed = HashSet::with_capacity(inputs_n);
    let mut inputs_value = 0.0;
    let outputs_hash = tx.outputs_hash();

    for (index, input) in tx.inputs().iter().enumerate() {
        let output_pointer = input.output_pointer();

        if !claimed.insert(output_pointer) {
            return Err(TransactionError::DuplicatedInput {
                output: output_pointer.clone(),
            });
        }

        let output = get_unspent_output(utxo_diff, output_pointer)?;

        let payload = tx
            .data_to_sign_with(&outputs_hash, index)
            .ok_or(TransactionError::InputIndexOutOfRange { index, inputs_n })?;
        if !verifier.verify(&output.address, payload.as_ref(), input.signature()) {
            return Err(TransactionError::VerifyTransactionSignatureFail {
                index,
                output: output_pointer.clone(),
            });
        }
        log::trace!("Input #{} spending {} is authorized", index, output_pointer);

        inputs_value += output.value;
    }

    Ok(inputs_value)
}

/// Function to validate a value transfer transaction against the state described by
/// `utxo_diff`.
///
/// Checks the outputs first, then each input in order and finally that the inputs are worth
/// at least as much as the outputs. The first violation found is returned. On success,
/// returns the fee paid by the transaction.
pub fn validate_transaction<V: SignatureVerifier>(
    tx: &Transaction,
    utxo_diff: &UtxoDiff<'_>,
    verifier: &V,
) -> Result<f64, TransactionError> {
    validate_outputs(tx.outputs())?;
    log::trace!("Outputs are well formed");

    let inputs_value = validate_inputs(tx, utxo_diff, verifier)?;
    let outputs_value = transaction_outputs_sum(tx.outputs());
    let fee = fee_from_sums(inputs_value, outputs_value)?;
    log::trace!("Value is conserved, fee: {}", fee);

    Ok(fee)
}

/// Boolean view of [`validate_transaction`]
pub fn is_valid_transaction<V: SignatureVerifier>(
    tx: &Transaction,
    utxo_diff: &UtxoDiff<'_>,
    verifier: &V,
) -> bool {
    match validate_transaction(tx, utxo_diff, verifier) {
        Ok(_) => true,
        Err(e) => {
            log::debug!("Invalid transaction: {}", e);
            false
        }
    }
}

/// Check that every output claimed by `inputs` is still unspent.
///
/// Used to detect conflicts with transactions committed after `inputs` were validated.
pub fn validate_inputs_unspent(
    inputs: &[Input],
    utxo_diff: &UtxoDiff<'_>,
) -> Result<(), TransactionError> {
    for input in inputs {
        get_unspent_output(utxo_diff, input.output_pointer())?;
    }

    Ok(())
}

/// Check that none of the `outputs_n` outputs of the transaction with hash `tx_hash` was ever
/// created, which would mean that the same transaction is already committed.
pub fn validate_new_outputs(
    tx_hash: Hash,
    outputs_n: usize,
    utxo_diff: &UtxoDiff<'_>,
) -> Result<(), TransactionError> {
    for output_index in 0..outputs_n {
        let output_pointer = OutputPointer::new(tx_hash, output_index as u32);
        if utxo_diff.contains_key(&output_pointer) || utxo_diff.was_spent(&output_pointer) {
            return Err(TransactionError::DuplicatedTransaction { hash: tx_hash });
        }
    }

    Ok(())
}

/// Record in `utxo_diff` that `inputs` are spent and that `outputs` are created by the
/// transaction with hash `tx_hash`.
pub fn update_utxo_diff(
    utxo_diff: &mut UtxoDiff<'_>,
    inputs: &[Input],
    outputs: &[ValueTransferOutput],
    tx_hash: Hash,
) {
    for input in inputs {
        // Obtain the OuputPointer of each input and remove it from the utxo_diff
        let output_pointer = input.output_pointer();

        utxo_diff.remove_utxo(output_pointer.clone());
    }

    for (index, output) in outputs.iter().enumerate() {
        // Add the new outputs to the utxo_diff
        let output_pointer = OutputPointer {
            transaction_id: tx_hash,
            output_index: index as u32,
        };

        utxo_diff.insert_utxo(output_pointer, output.clone());
    }
}
