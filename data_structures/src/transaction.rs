use serde::{Deserialize, Serialize};

use crate::{
    chain::{Hash, Hashable, Input, OutputPointer, ValueTransferOutput},
    error::TransactionError,
};

/// Value transfer transaction: spends some unspent outputs and creates new ones.
///
/// The hash of a transaction is not known until it is finalized. Finalization happens once,
/// when the transaction is committed to the ledger, and the new outputs are then identified by
/// `(hash, output index)`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transaction {
    inputs: Vec<Input>,
    outputs: Vec<ValueTransferOutput>,
    #[serde(skip)]
    hash: Option<Hash>,
}

impl Transaction {
    /// Creates a new, not finalized, transaction
    pub fn new(inputs: Vec<Input>, outputs: Vec<ValueTransferOutput>) -> Self {
        Transaction {
            inputs,
            outputs,
            hash: None,
        }
    }

    /// Inputs, in order
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Outputs, in order
    pub fn outputs(&self) -> &[ValueTransferOutput] {
        &self.outputs
    }

    /// Output pointers claimed by the inputs, in order
    pub fn output_pointers(&self) -> impl Iterator<Item = &OutputPointer> {
        self.inputs.iter().map(Input::output_pointer)
    }

    /// Sum of the values of the outputs
    pub fn outputs_sum(&self) -> f64 {
        self.outputs.iter().map(|output| output.value).sum()
    }

    /// Digest that the input at `index` must sign.
    ///
    /// It covers the output claimed by that input and every output of the transaction, but no
    /// signature, so signing one input never changes what the other inputs sign.
    /// Returns `None` if there is no input at `index`.
    pub fn data_to_sign(&self, index: usize) -> Option<Hash> {
        self.data_to_sign_with(&self.outputs_hash(), index)
    }

    /// Digest of the outputs, shared by the payloads of every input
    pub fn outputs_hash(&self) -> Hash {
        let mut data = vec![];
        encode_outputs(&mut data, &self.outputs);

        Hash::digest(&data)
    }

    /// Same as [`data_to_sign`](Self::data_to_sign), reusing an `outputs_hash` computed
    /// once for all the inputs
    pub fn data_to_sign_with(&self, outputs_hash: &Hash, index: usize) -> Option<Hash> {
        let input = self.inputs.get(index)?;

        let mut data = Vec::with_capacity(68);
        encode_output_pointer(&mut data, input.output_pointer());
        data.extend_from_slice(outputs_hash.as_ref());

        Some(Hash::digest(&data))
    }

    /// Attach `signature` to the input at `index`.
    ///
    /// Signatures take part in the transaction hash, so they cannot change after
    /// finalization.
    pub fn set_signature(
        &mut self,
        index: usize,
        signature: Vec<u8>,
    ) -> Result<(), TransactionError> {
        if let Some(hash) = self.hash {
            return Err(TransactionError::AlreadyFinalized { hash });
        }
        let inputs_n = self.inputs.len();
        let input = self
            .inputs
            .get_mut(index)
            .ok_or(TransactionError::InputIndexOutOfRange { index, inputs_n })?;
        input.set_signature(signature);

        Ok(())
    }

    /// Assign the content hash. Can only be done once.
    pub fn finalize(&mut self) -> Result<Hash, TransactionError> {
        if let Some(hash) = self.hash {
            return Err(TransactionError::AlreadyFinalized { hash });
        }
        let hash = Hashable::hash(self);
        self.hash = Some(hash);

        Ok(hash)
    }

    /// Whether `finalize` was already called
    pub fn is_finalized(&self) -> bool {
        self.hash.is_some()
    }

    /// The hash assigned by `finalize`
    pub fn hash(&self) -> Result<Hash, TransactionError> {
        self.hash.ok_or(TransactionError::NotFinalized)
    }

    /// Pointers to the outputs created by this transaction. Requires the transaction to be
    /// finalized.
    pub fn new_output_pointers(&self) -> Result<Vec<OutputPointer>, TransactionError> {
        let hash = self.hash()?;

        Ok((0..self.outputs.len())
            .map(|index| OutputPointer::new(hash, index as u32))
            .collect())
    }
}

/// Content hash, computed from the inputs (signatures included) and the outputs. This is the
/// value `finalize` assigns.
impl Hashable for Transaction {
    fn hash(&self) -> Hash {
        let mut data = vec![];
        data.extend_from_slice(&(self.inputs.len() as u32).to_be_bytes());
        for input in &self.inputs {
            encode_output_pointer(&mut data, input.output_pointer());
            encode_bytes(&mut data, input.signature());
        }
        encode_outputs(&mut data, &self.outputs);

        Hash::digest(&data)
    }
}

fn encode_bytes(data: &mut Vec<u8>, bytes: &[u8]) {
    data.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    data.extend_from_slice(bytes);
}

fn encode_output_pointer(data: &mut Vec<u8>, output_pointer: &OutputPointer) {
    data.extend_from_slice(output_pointer.transaction_id.as_ref());
    data.extend_from_slice(&output_pointer.output_index.to_be_bytes());
}

fn encode_outputs(data: &mut Vec<u8>, outputs: &[ValueTransferOutput]) {
    data.extend_from_slice(&(outputs.len() as u32).to_be_bytes());
    for output in outputs {
        data.extend_from_slice(&output.value.to_be_bytes());
        encode_bytes(data, output.address.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Address;

    fn example_transaction() -> Transaction {
        let inputs = vec![
            Input::new(OutputPointer::new(Hash::SHA256([1; 32]), 0)),
            Input::new(OutputPointer::new(Hash::SHA256([2; 32]), 3)),
        ];
        let outputs = vec![
            ValueTransferOutput::new(Address::from_bytes(vec![0xaa]), 4.0),
            ValueTransferOutput::new(Address::from_bytes(vec![0xbb]), 1.5),
        ];

        Transaction::new(inputs, outputs)
    }

    #[test]
    fn hash_is_not_available_before_finalize() {
        let tx = example_transaction();

        assert!(!tx.is_finalized());
        assert_eq!(tx.hash(), Err(TransactionError::NotFinalized));
        assert_eq!(
            tx.new_output_pointers(),
            Err(TransactionError::NotFinalized)
        );
    }

    #[test]
    fn finalize_twice() {
        let mut tx = example_transaction();
        let hash = tx.finalize().unwrap();

        assert!(tx.is_finalized());
        assert_eq!(tx.hash(), Ok(hash));
        assert_eq!(
            tx.finalize(),
            Err(TransactionError::AlreadyFinalized { hash })
        );
        // The hash did not change
        assert_eq!(tx.hash(), Ok(hash));
    }

    #[test]
    fn finalize_assigns_content_hash() {
        let mut tx = example_transaction();
        let content_hash = Hashable::hash(&tx);

        assert_eq!(tx.finalize(), Ok(content_hash));
        assert_eq!(
            tx.new_output_pointers().unwrap(),
            vec![
                OutputPointer::new(content_hash, 0),
                OutputPointer::new(content_hash, 1)
            ]
        );
    }

    #[test]
    fn signatures_change_hash_but_not_data_to_sign() {
        let mut tx = example_transaction();
        let hash_before = Hashable::hash(&tx);
        let data_0 = tx.data_to_sign(0).unwrap();
        let data_1 = tx.data_to_sign(1).unwrap();

        tx.set_signature(0, vec![1, 2, 3]).unwrap();

        assert_ne!(Hashable::hash(&tx), hash_before);
        assert_eq!(tx.data_to_sign(0), Some(data_0));
        assert_eq!(tx.data_to_sign(1), Some(data_1));
        // Every input signs a different payload
        assert_ne!(data_0, data_1);
        assert_eq!(tx.data_to_sign(2), None);
    }

    #[test]
    fn data_to_sign_covers_outputs() {
        let tx = example_transaction();
        let mut outputs = tx.outputs().to_vec();
        outputs[1].value = 1.0;
        let other = Transaction::new(tx.inputs().to_vec(), outputs);

        assert_ne!(tx.data_to_sign(0), other.data_to_sign(0));
    }

    #[test]
    fn data_to_sign_with_shared_outputs_hash() {
        let tx = example_transaction();
        let outputs_hash = tx.outputs_hash();

        for index in 0..3 {
            assert_eq!(
                tx.data_to_sign_with(&outputs_hash, index),
                tx.data_to_sign(index)
            );
        }
        assert_ne!(outputs_hash, Transaction::default().outputs_hash());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let json = r#"{"inputs": [], "outputs": [], "hash": "00"}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());

        let json = r#"{"inputs": [], "output": []}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());

        let json = r#"{"inputs": [], "outputs": []}"#;
        assert_eq!(
            serde_json::from_str::<Transaction>(json).unwrap(),
            Transaction::default()
        );
    }

    #[test]
    fn set_signature_errors() {
        let mut tx = example_transaction();

        assert_eq!(
            tx.set_signature(2, vec![]),
            Err(TransactionError::InputIndexOutOfRange {
                index: 2,
                inputs_n: 2
            })
        );

        let hash = tx.finalize().unwrap();
        assert_eq!(
            tx.set_signature(0, vec![1]),
            Err(TransactionError::AlreadyFinalized { hash })
        );
    }

    #[test]
    fn outputs_sum() {
        assert_eq!(example_transaction().outputs_sum(), 5.5);
        assert_eq!(Transaction::default().outputs_sum(), 0.0);
    }

    #[test]
    fn deserialized_transaction_is_not_finalized() {
        let mut tx = example_transaction();
        tx.finalize().unwrap();

        let json = serde_json::to_string(&tx).unwrap();
        let tx2: Transaction = serde_json::from_str(&json).unwrap();

        assert!(!tx2.is_finalized());
        assert_eq!(tx2.inputs(), tx.inputs());
        assert_eq!(tx2.outputs(), tx.outputs());
    }
}
