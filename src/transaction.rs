use crate::{KeyPair, PublicKey, Sha256, Signature};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// A double SHA-256 hash of the transaction data, excluding the input signatures.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct TransactionId(Sha256);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub fn new(data: Sha256) -> Self {
        Self(data)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// The index of the transaction output.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Failed to encode transaction data: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("Input index: {index} is out of range for a transaction with {input_count} inputs")]
    InputIndexOutOfRange { index: usize, input_count: usize },
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransactionInput {
    // 32 bytes. A pointer to the transaction containing the UTXO to be spent.
    utxo_id: TransactionId,
    // 4 bytes. The number of UTXO to be spent, the first one is 0.
    output_index: OutputIndex,
    // Authorizes the spend. It is made over the signable payload of this input's position,
    // so it can't be moved to another input or another transaction.
    signature: Option<Signature>,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.utxo_id, self.output_index)
    }
}

impl TransactionInput {
    pub fn new(utxo_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            utxo_id,
            output_index,
            signature: None,
        }
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn utxo_id(&self) -> &TransactionId {
        &self.utxo_id
    }

    pub fn output_index(&self) -> &OutputIndex {
        &self.output_index
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutput {
    amount: i64,
    // Only the owner of this key can spend the output.
    public_key: PublicKey,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.amount, self.public_key)
    }
}

impl TransactionOutput {
    pub fn new(amount: i64, public_key: PublicKey) -> Self {
        Self { amount, public_key }
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

/// Transaction content with the input signatures left out.
#[derive(Serialize)]
struct UnsignedContent<'a> {
    inputs: Vec<(&'a TransactionId, &'a OutputIndex)>,
    outputs: &'a [TransactionOutput],
}

impl<'a> UnsignedContent<'a> {
    fn new(inputs: &'a [TransactionInput], outputs: &'a [TransactionOutput]) -> Self {
        Self {
            inputs: inputs
                .iter()
                .map(|input| (&input.utxo_id, &input.output_index))
                .collect(),
            outputs,
        }
    }
}

#[derive(Serialize)]
struct SignablePayload<'a> {
    content: UnsignedContent<'a>,
    input_index: u32,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Result<Self, EncodingError> {
        let id = Self::hash_transaction_data(&inputs, &outputs)?;
        Ok(Self {
            id,
            inputs,
            outputs,
        })
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &Vec<TransactionInput> {
        &self.inputs
    }

    pub fn outputs(&self) -> &Vec<TransactionOutput> {
        &self.outputs
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Sum of the output amounts, or None if it doesn't fit in an i64.
    pub fn output_value(&self) -> Option<i64> {
        self.outputs
            .iter()
            .try_fold(0i64, |total, output| total.checked_add(output.amount))
    }

    /// Returns the bytes the owner of the UTXO spent by the input at `index` must sign.
    ///
    /// The payload is the transaction content with all signatures blanked out, followed by the
    /// input's position. Binding the position means a signature authorizes exactly one input
    /// slot, and blanking the signatures means inputs can be signed in any order.
    pub fn signable_payload(&self, index: usize) -> Result<Vec<u8>, EncodingError> {
        if index >= self.inputs.len() {
            return Err(EncodingError::InputIndexOutOfRange {
                index,
                input_count: self.inputs.len(),
            });
        }
        let payload = SignablePayload {
            content: UnsignedContent::new(&self.inputs, &self.outputs),
            input_index: index as u32,
        };
        Ok(bincode::serialize(&payload)?)
    }

    /// Signs the input at `index`. The transaction id doesn't change.
    pub fn sign_input(&mut self, index: usize, key_pair: &KeyPair) -> Result<(), EncodingError> {
        let payload = self.signable_payload(index)?;
        self.inputs[index].signature = Some(key_pair.sign(&payload));
        Ok(())
    }

    fn hash_transaction_data(
        inputs: &[TransactionInput],
        outputs: &[TransactionOutput],
    ) -> Result<TransactionId, EncodingError> {
        let data = bincode::serialize(&UnsignedContent::new(inputs, outputs))?;
        Ok(TransactionId(Sha256::double_digest(&data)))
    }
}
