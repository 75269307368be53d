use crate::{TransactionOutput, Utxo};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum UtxoPoolError {
    #[error("Unknown UTXO: {0}")]
    UnknownUtxo(Utxo),
}

/// A pool of confirmed and unspent transaction outputs.
///
/// Cloning the pool produces an independent copy, so a snapshot can be handed to a validator
/// without the validator's changes leaking back to the caller.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct UtxoPool {
    // Unspent transaction outputs, indexed by their transaction ID and their index in the
    // transaction.
    utxos: HashMap<Utxo, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    pub fn contains(&self, utxo: &Utxo) -> bool {
        self.utxos.contains_key(utxo)
    }

    pub fn get(&self, utxo: &Utxo) -> Result<&TransactionOutput, UtxoPoolError> {
        self.utxos
            .get(utxo)
            .ok_or(UtxoPoolError::UnknownUtxo(*utxo))
    }

    /// Adds the output, replacing any output previously stored under the same UTXO.
    pub fn insert(&mut self, utxo: Utxo, output: TransactionOutput) {
        self.utxos.insert(utxo, output);
    }

    pub fn remove(&mut self, utxo: &Utxo) -> Result<TransactionOutput, UtxoPoolError> {
        self.utxos
            .remove(utxo)
            .ok_or(UtxoPoolError::UnknownUtxo(*utxo))
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Utxo, &TransactionOutput)> {
        self.utxos.iter()
    }

    /// All UTXOs currently in the pool, in sorted order.
    pub fn utxos(&self) -> Vec<Utxo> {
        let mut utxos = self.utxos.keys().copied().collect::<Vec<Utxo>>();
        utxos.sort();
        utxos
    }

    /// Total amount held by the pool, or None if it doesn't fit in an i64.
    pub fn total_value(&self) -> Option<i64> {
        self.utxos
            .values()
            .try_fold(0i64, |total, output| total.checked_add(output.amount()))
    }
}

impl FromIterator<(Utxo, TransactionOutput)> for UtxoPool {
    fn from_iter<T: IntoIterator<Item = (Utxo, TransactionOutput)>>(iter: T) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}
