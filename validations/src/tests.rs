use ledger_crypto::{
    secp256k1::SecretKey,
    signature::{public_key_from_secret, sign},
};
use ledger_data_structures::{
    chain::*, error::TransactionError, transaction::Transaction, utxo_pool::*,
};

use crate::validations::*;

const MY_SECRET: [u8; 32] = [0xcd; 32];
const OTHER_SECRET: [u8; 32] = [0x43; 32];

fn secret_key(bytes: [u8; 32]) -> SecretKey {
    SecretKey::from_slice(&bytes).expect("32 bytes, within curve order")
}

fn address_of(bytes: [u8; 32]) -> Address {
    Address::from(public_key_from_secret(&secret_key(bytes)))
}

fn my_address() -> Address {
    address_of(MY_SECRET)
}

// Sign every input of `tx` with the same key
fn sign_with(mut tx: Transaction, secret: [u8; 32]) -> Transaction {
    let secret_key = secret_key(secret);
    for index in 0..tx.inputs().len() {
        let data = tx.data_to_sign(index).unwrap();
        let signature = sign(secret_key, data.as_ref()).unwrap();
        tx.set_signature(index, signature.serialize_der().to_vec())
            .unwrap();
    }

    tx
}

fn sign_t(tx: Transaction) -> Transaction {
    sign_with(tx, MY_SECRET)
}

fn pointer(n: u8) -> OutputPointer {
    OutputPointer::new(Hash::SHA256([n; 32]), 0)
}

// Pool with one output of each value, all owned by `my_address()`, keyed by `pointer(i)`
fn pool_with_values(values: &[f64]) -> UnspentOutputsPool {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            (
                pointer(i as u8),
                ValueTransferOutput::new(my_address(), *value),
            )
        })
        .collect()
}

fn spend(pointers: &[OutputPointer], values: &[f64]) -> Transaction {
    let inputs = pointers.iter().cloned().map(Input::new).collect();
    let outputs = values
        .iter()
        .map(|value| ValueTransferOutput::new(address_of(OTHER_SECRET), *value))
        .collect();

    Transaction::new(inputs, outputs)
}

fn validate(tx: &Transaction, pool: &UnspentOutputsPool) -> Result<f64, TransactionError> {
    validate_transaction(tx, &UtxoDiff::new(pool), &Secp256k1Verifier)
}

struct AcceptAll;

impl SignatureVerifier for AcceptAll {
    fn verify(&self, _address: &Address, _payload: &[u8], _signature: &[u8]) -> bool {
        true
    }
}

#[test]
fn vtt_valid() {
    let pool = pool_with_values(&[10.0]);
    let tx = sign_t(spend(&[pointer(0)], &[9.0]));

    assert_eq!(validate(&tx, &pool), Ok(1.0));
    assert!(is_valid_transaction(
        &tx,
        &UtxoDiff::new(&pool),
        &Secp256k1Verifier
    ));
}

#[test]
fn vtt_zero_fee_is_valid() {
    let pool = pool_with_values(&[10.0]);
    let tx = sign_t(spend(&[pointer(0)], &[4.0, 6.0]));

    assert_eq!(validate(&tx, &pool), Ok(0.0));
}

#[test]
fn vtt_zero_value_output_is_valid() {
    let pool = pool_with_values(&[10.0]);
    let tx = sign_t(spend(&[pointer(0)], &[0.0, 10.0]));

    assert_eq!(validate(&tx, &pool), Ok(0.0));
}

#[test]
fn vtt_no_inputs_no_outputs() {
    let pool = UnspentOutputsPool::default();
    let tx = Transaction::default();

    assert_eq!(validate(&tx, &pool), Ok(0.0));
}

#[test]
fn vtt_no_inputs_positive_output() {
    let pool = UnspentOutputsPool::default();
    let tx = spend(&[], &[1.0]);

    assert_eq!(
        validate(&tx, &pool),
        Err(TransactionError::NegativeFee {
            inputs_value: 0.0,
            outputs_value: 1.0,
        })
    );
}

#[test]
fn vtt_negative_output() {
    let pool = pool_with_values(&[10.0]);
    let tx = sign_t(spend(&[pointer(0)], &[11.0, -2.0]));

    assert_eq!(
        validate(&tx, &pool),
        Err(TransactionError::InvalidOutputValue {
            output_index: 1,
            value: -2.0,
        })
    );
}

#[test]
fn vtt_nan_output() {
    let pool = pool_with_values(&[10.0]);
    let tx = sign_t(spend(&[pointer(0)], &[f64::NAN]));

    let x = validate(&tx, &pool).unwrap_err();
    assert!(matches!(
        x,
        TransactionError::InvalidOutputValue { output_index: 0, value } if value.is_nan()
    ));
}

#[test]
fn vtt_infinite_output() {
    let pool = pool_with_values(&[f64::INFINITY]);
    let tx = sign_t(spend(&[pointer(0)], &[f64::INFINITY]));

    assert_eq!(
        validate(&tx, &pool),
        Err(TransactionError::InvalidOutputValue {
            output_index: 0,
            value: f64::INFINITY,
        })
    );
}

#[test]
fn vtt_null_address() {
    let pool = pool_with_values(&[10.0]);
    let inputs = vec![Input::new(pointer(0))];
    let outputs = vec![ValueTransferOutput::new(Address::default(), 1.0)];
    let tx = sign_t(Transaction::new(inputs, outputs));

    let x = validate(&tx, &pool);
    assert_eq!(x, Err(TransactionError::NullAddress { output_index: 0 }));
    assert_eq!(
        x.unwrap_err().rule(),
        Some(ledger_data_structures::error::ValidationRule::WellFormedOutputs)
    );
}

#[test]
fn vtt_duplicated_input() {
    let pool = pool_with_values(&[10.0]);
    let tx = sign_t(spend(&[pointer(0), pointer(0)], &[15.0]));

    assert_eq!(
        validate(&tx, &pool),
        Err(TransactionError::DuplicatedInput { output: pointer(0) })
    );
}

#[test]
fn vtt_input_not_in_utxo() {
    let pool = pool_with_values(&[10.0]);
    let tx = sign_t(spend(&[pointer(7)], &[1.0]));

    assert_eq!(
        validate(&tx, &pool),
        Err(TransactionError::OutputNotFound { output: pointer(7) })
    );
}

#[test]
fn vtt_input_already_spent() {
    let pool = pool_with_values(&[10.0]);
    let mut spent = SpentOutputsPool::default();
    spent.insert(pointer(7), ValueTransferOutput::new(my_address(), 3.0));
    let tx = sign_t(spend(&[pointer(7)], &[1.0]));

    let utxo_diff = UtxoDiff::with_spent_outputs(&pool, &spent);
    assert_eq!(
        validate_transaction(&tx, &utxo_diff, &Secp256k1Verifier),
        Err(TransactionError::OutputAlreadySpent { output: pointer(7) })
    );
}

#[test]
fn vtt_input_spent_in_diff() {
    let pool = pool_with_values(&[10.0]);
    let mut utxo_diff = UtxoDiff::new(&pool);
    utxo_diff.remove_utxo(pointer(0));
    let tx = sign_t(spend(&[pointer(0)], &[1.0]));

    assert_eq!(
        validate_transaction(&tx, &utxo_diff, &Secp256k1Verifier),
        Err(TransactionError::OutputAlreadySpent { output: pointer(0) })
    );
}

#[test]
fn vtt_one_input_but_no_signature() {
    let pool = pool_with_values(&[10.0]);
    let tx = spend(&[pointer(0)], &[1.0]);

    assert_eq!(
        validate(&tx, &pool),
        Err(TransactionError::VerifyTransactionSignatureFail {
            index: 0,
            output: pointer(0),
        })
    );
}

#[test]
fn vtt_signed_by_other_key() {
    let pool = pool_with_values(&[10.0]);
    let tx = sign_with(spend(&[pointer(0)], &[1.0]), OTHER_SECRET);

    assert_eq!(
        validate(&tx, &pool),
        Err(TransactionError::VerifyTransactionSignatureFail {
            index: 0,
            output: pointer(0),
        })
    );
}

#[test]
fn vtt_signature_of_other_input() {
    let pool = pool_with_values(&[10.0, 5.0]);
    let mut tx = sign_t(spend(&[pointer(0), pointer(1)], &[12.0]));
    // Swap the signatures of both inputs
    let sig_0 = tx.inputs()[0].signature().to_vec();
    let sig_1 = tx.inputs()[1].signature().to_vec();
    tx.set_signature(0, sig_1).unwrap();
    tx.set_signature(1, sig_0).unwrap();

    assert_eq!(
        validate(&tx, &pool),
        Err(TransactionError::VerifyTransactionSignatureFail {
            index: 0,
            output: pointer(0),
        })
    );
}

#[test]
fn vtt_outputs_changed_after_signing() {
    let pool = pool_with_values(&[10.0]);
    let signed = sign_t(spend(&[pointer(0)], &[1.0]));
    let mut outputs = signed.outputs().to_vec();
    outputs[0].value = 9.5;
    let tampered = Transaction::new(signed.inputs().to_vec(), outputs);

    assert_eq!(
        validate(&tampered, &pool),
        Err(TransactionError::VerifyTransactionSignatureFail {
            index: 0,
            output: pointer(0),
        })
    );
}

#[test]
fn vtt_malformed_address_in_pool() {
    let pool: UnspentOutputsPool = vec![(
        pointer(0),
        ValueTransferOutput::new(Address::from_bytes(vec![1, 2, 3]), 10.0),
    )]
    .into_iter()
    .collect();
    let tx = sign_t(spend(&[pointer(0)], &[1.0]));

    assert_eq!(
        validate(&tx, &pool),
        Err(TransactionError::VerifyTransactionSignatureFail {
            index: 0,
            output: pointer(0),
        })
    );
    // Any verifier decides by itself what an address means
    assert_eq!(
        validate_transaction(&tx, &UtxoDiff::new(&pool), &AcceptAll),
        Ok(9.0)
    );
}

#[test]
fn vtt_two_inputs_negative_fee() {
    let pool = pool_with_values(&[10.0, 5.0]);
    let tx = sign_t(spend(&[pointer(0), pointer(1)], &[10.0, 5.5]));

    let x = validate(&tx, &pool);
    assert_eq!(
        x,
        Err(TransactionError::NegativeFee {
            inputs_value: 15.0,
            outputs_value: 15.5,
        })
    );
}

#[test]
fn vtt_nan_input_value() {
    let pool = pool_with_values(&[f64::NAN]);
    let tx = sign_t(spend(&[pointer(0)], &[1.0]));

    let x = validate(&tx, &pool);
    assert!(
        matches!(x, Err(TransactionError::NegativeFee { inputs_value, outputs_value })
            if inputs_value.is_nan() && outputs_value == 1.0),
        "{:?}",
        x
    );
}

#[test]
fn vtt_infinite_inputs_cancel_out() {
    let pool = pool_with_values(&[f64::INFINITY, f64::NEG_INFINITY]);
    let tx = sign_t(spend(&[pointer(0), pointer(1)], &[]));

    assert!(matches!(
        validate(&tx, &pool),
        Err(TransactionError::NegativeFee { .. })
    ));
}

#[test]
fn vtt_first_violation_is_reported() {
    let pool = pool_with_values(&[10.0]);
    // Unsigned, unknown input, negative output and negative fee all at once
    let tx = spend(&[pointer(0), pointer(0), pointer(9)], &[-1.0, 100.0]);
    assert_eq!(
        validate(&tx, &pool),
        Err(TransactionError::InvalidOutputValue {
            output_index: 0,
            value: -1.0,
        })
    );

    // Without the bad output, the duplicated claim comes before the unknown output
    let tx = spend(&[pointer(0), pointer(0), pointer(9)], &[100.0]);
    assert_eq!(
        validate_transaction(&tx, &UtxoDiff::new(&pool), &AcceptAll),
        Err(TransactionError::DuplicatedInput { output: pointer(0) })
    );

    // Inputs are checked in order: the missing output of input 0 comes before the signature
    // of input 1
    let tx = spend(&[pointer(9), pointer(0)], &[1.0]);
    assert_eq!(
        validate(&tx, &pool),
        Err(TransactionError::OutputNotFound { output: pointer(9) })
    );
}

#[test]
fn validation_is_idempotent() {
    let pool = pool_with_values(&[10.0, 5.0]);
    let valid = sign_t(spend(&[pointer(0)], &[9.0]));
    let invalid = sign_t(spend(&[pointer(1)], &[9.0]));

    for tx in [&valid, &invalid] {
        let first = validate(tx, &pool);
        let second = validate(tx, &pool);
        assert_eq!(first, second);
    }
    assert_eq!(pool, pool_with_values(&[10.0, 5.0]));
}

#[test]
fn fee_of_valid_transaction() {
    let pool = pool_with_values(&[10.0, 5.0]);
    let tx = sign_t(spend(&[pointer(0), pointer(1)], &[3.0, 4.0]));
    let utxo_diff = UtxoDiff::new(&pool);

    assert_eq!(transaction_fee(&tx, &utxo_diff), Ok(8.0));
    assert_eq!(validate(&tx, &pool), Ok(8.0));
}

#[test]
fn fee_of_transaction_spending_more_than_its_inputs() {
    let pool = pool_with_values(&[10.0]);
    let tx = sign_t(spend(&[pointer(0)], &[12.5]));

    assert_eq!(transaction_fee(&tx, &UtxoDiff::new(&pool)), Ok(-2.5));
    assert!(validate(&tx, &pool).is_err());
}

#[test]
fn fee_of_transaction_with_missing_input() {
    let pool = pool_with_values(&[10.0]);
    let tx = spend(&[pointer(3)], &[3.0]);

    assert_eq!(
        transaction_fee(&tx, &UtxoDiff::new(&pool)),
        Err(TransactionError::OutputNotFound { output: pointer(3) })
    );
}

#[test]
fn update_utxo_diff_spends_and_creates() {
    let pool = pool_with_values(&[10.0]);
    let mut tx = sign_t(spend(&[pointer(0)], &[4.0, 5.0]));
    let tx_hash = tx.finalize().unwrap();

    let mut utxo_diff = UtxoDiff::new(&pool);
    update_utxo_diff(&mut utxo_diff, tx.inputs(), tx.outputs(), tx_hash);

    assert!(utxo_diff.get(&pointer(0)).is_none());
    assert_eq!(
        validate_inputs_unspent(tx.inputs(), &utxo_diff),
        Err(TransactionError::OutputAlreadySpent { output: pointer(0) })
    );
    for (output_pointer, output) in tx.new_output_pointers().unwrap().iter().zip(tx.outputs()) {
        assert_eq!(utxo_diff.get(output_pointer), Some(output));
    }

    let mut new_pool = pool.clone();
    utxo_diff.take_diff().apply(&mut new_pool);
    assert_eq!(new_pool.len(), 2);
    assert_eq!(new_pool.total_value(), 9.0);
}

#[test]
fn new_outputs_of_committed_transaction() {
    let pool = pool_with_values(&[10.0]);
    let mut tx = sign_t(spend(&[pointer(0)], &[4.0, 5.0]));
    let tx_hash = Hashable::hash(&tx);
    let mut utxo_diff = UtxoDiff::new(&pool);

    assert_eq!(validate_new_outputs(tx_hash, 2, &utxo_diff), Ok(()));

    tx.finalize().unwrap();
    update_utxo_diff(&mut utxo_diff, tx.inputs(), tx.outputs(), tx_hash);
    assert_eq!(
        validate_new_outputs(tx_hash, 2, &utxo_diff),
        Err(TransactionError::DuplicatedTransaction { hash: tx_hash })
    );

    // Still detected once every output is spent again
    update_utxo_diff(
        &mut utxo_diff,
        &[
            Input::new(OutputPointer::new(tx_hash, 0)),
            Input::new(OutputPointer::new(tx_hash, 1)),
        ],
        &[],
        Hash::default(),
    );
    assert_eq!(
        validate_new_outputs(tx_hash, 2, &utxo_diff),
        Err(TransactionError::DuplicatedTransaction { hash: tx_hash })
    );
}

#[test]
fn chained_spend_through_diff() {
    let pool = pool_with_values(&[10.0]);
    let mut first = sign_t(spend(&[pointer(0)], &[9.0]));
    let first_hash = first.finalize().unwrap();
    let mut utxo_diff = UtxoDiff::new(&pool);
    update_utxo_diff(&mut utxo_diff, first.inputs(), first.outputs(), first_hash);

    // The new output is owned by OTHER_SECRET
    let second = sign_with(
        spend(&[OutputPointer::new(first_hash, 0)], &[8.0]),
        OTHER_SECRET,
    );

    assert_eq!(
        validate_transaction(&second, &utxo_diff, &Secp256k1Verifier),
        Ok(1.0)
    );
    // Against the original pool the output does not exist
    assert_eq!(
        validate(&second, &pool),
        Err(TransactionError::OutputNotFound {
            output: OutputPointer::new(first_hash, 0)
        })
    );
}

#[test]
fn secp256k1_verifier_rejects_garbage() {
    let payload = [0xab; 32];
    let signature = sign(secret_key(MY_SECRET), &payload).unwrap();
    let der = signature.serialize_der().to_vec();

    assert!(Secp256k1Verifier.verify(&my_address(), &payload, &der));
    assert!(!Secp256k1Verifier.verify(&address_of(OTHER_SECRET), &payload, &der));
    assert!(!Secp256k1Verifier.verify(&my_address(), &[0xac; 32], &der));
    assert!(!Secp256k1Verifier.verify(&my_address(), &payload, &der[1..]));
    assert!(!Secp256k1Verifier.verify(&Address::default(), &payload, &der));
    // Payloads are always 32 byte digests
    assert!(!Secp256k1Verifier.verify(&my_address(), &payload[1..], &der));
}

#[test]
fn der_signature_vector() {
    let payload = [0xab; 32];
    let signature = sign(secret_key(MY_SECRET), &payload).unwrap();

    assert_eq!(
        hex::encode(&*signature.serialize_der()),
        "304402203dc4fa74655c21b7ffc0740e29bfd88647e8dfe2b68c507cf96264e4e7439c1f02207aa61261b18eebdfdb704ca7bab4c7bcf7961ae0ade5309f6f1398e21aec0f9f"
    );
}
