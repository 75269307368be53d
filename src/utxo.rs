use crate::{OutputIndex, TransactionId, TransactionInput};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifies an unspent transaction output by the transaction that created it and the output's
/// position in that transaction.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct Utxo {
    transaction_id: TransactionId,
    output_index: OutputIndex,
}

impl Utxo {
    pub fn new(transaction_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }

    /// The UTXO that the input spends.
    pub fn from_input(input: &TransactionInput) -> Self {
        Self::new(*input.utxo_id(), *input.output_index())
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn output_index(&self) -> &OutputIndex {
        &self.output_index
    }
}

impl Display for Utxo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}
