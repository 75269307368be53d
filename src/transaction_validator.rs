use crate::{
    verify_signature, EncodingError, OutputIndex, Transaction, Utxo, UtxoPool, UtxoPoolError,
};
use log::{debug, error, info};
use std::collections::HashSet;
use thiserror::Error;

/// Decides which output amounts are acceptable.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OutputValuePolicy {
    // Zero and negative amounts are invalid.
    StrictlyPositive,
    // Zero amounts are allowed, negative amounts are invalid.
    NonNegative,
}

impl OutputValuePolicy {
    pub fn allows(&self, amount: i64) -> bool {
        match self {
            OutputValuePolicy::StrictlyPositive => amount > 0,
            OutputValuePolicy::NonNegative => amount >= 0,
        }
    }
}

impl Default for OutputValuePolicy {
    fn default() -> Self {
        OutputValuePolicy::StrictlyPositive
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidatorParams {
    pub output_value_policy: OutputValuePolicy,
}

/// The reason a transaction was rejected.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Input: {index} spends an unknown UTXO: {utxo}")]
    MissingUtxo { index: usize, utxo: Utxo },
    #[error("Input: {index} spends UTXO: {utxo} which is already spent by an earlier input")]
    DoubleSpend { index: usize, utxo: Utxo },
    #[error("Input: {index} is not signed")]
    MissingSignature { index: usize },
    #[error("Input: {index} has an invalid signature for UTXO: {utxo}")]
    InvalidSignature { index: usize, utxo: Utxo },
    #[error("Output: {index} has an invalid amount: {amount}")]
    InvalidOutputValue { index: usize, amount: i64 },
    #[error("Outputs total: {output_value} exceeds inputs total: {input_value}")]
    InsufficientInputValue { input_value: i64, output_value: i64 },
    #[error("Transaction amounts overflow")]
    ValueOverflow,
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    UtxoPool(#[from] UtxoPoolError),
}

/// Settles batches of transactions against the pool of unspent outputs.
///
/// The validator owns its pool. Every accepted transaction is applied to the pool immediately,
/// so validity of a transaction depends on the transactions accepted before it, in this batch
/// or in any previous one.
pub struct TransactionValidator {
    pool: UtxoPool,
    params: ValidatorParams,
}

impl TransactionValidator {
    /// Creates a validator over a copy of the given pool. The caller's pool is never modified.
    pub fn new(pool: &UtxoPool) -> Self {
        Self::with_params(pool, ValidatorParams::default())
    }

    pub fn with_params(pool: &UtxoPool, params: ValidatorParams) -> Self {
        Self {
            pool: pool.clone(),
            params,
        }
    }

    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }

    pub fn is_valid(&self, transaction: &Transaction) -> bool {
        self.validate(transaction).is_ok()
    }

    /// Checks the transaction against the current pool and returns its fee if it's valid.
    ///
    /// A transaction is valid if:
    ///   - every UTXO it spends is in the pool,
    ///   - no UTXO is spent by more than one of its inputs,
    ///   - every input is signed by the owner of the UTXO it spends,
    ///   - every output amount is allowed by the output value policy,
    ///   - the inputs total is at least the outputs total. The difference is the fee.
    pub fn validate(&self, transaction: &Transaction) -> Result<i64, TransactionError> {
        let mut spent = HashSet::new();
        let mut input_value = 0i64;
        for (index, input) in transaction.inputs().iter().enumerate() {
            let utxo = Utxo::from_input(input);
            if !self.pool.contains(&utxo) {
                return Err(TransactionError::MissingUtxo { index, utxo });
            }
            if !spent.insert(utxo) {
                return Err(TransactionError::DoubleSpend { index, utxo });
            }
            let spent_output = self.pool.get(&utxo)?;
            let signature = input
                .signature()
                .ok_or(TransactionError::MissingSignature { index })?;
            let payload = transaction.signable_payload(index)?;
            if !verify_signature(spent_output.public_key(), &payload, signature) {
                return Err(TransactionError::InvalidSignature { index, utxo });
            }
            input_value = input_value
                .checked_add(spent_output.amount())
                .ok_or(TransactionError::ValueOverflow)?;
        }

        for (index, output) in transaction.outputs().iter().enumerate() {
            if !self.params.output_value_policy.allows(output.amount()) {
                return Err(TransactionError::InvalidOutputValue {
                    index,
                    amount: output.amount(),
                });
            }
        }
        let output_value = transaction
            .output_value()
            .ok_or(TransactionError::ValueOverflow)?;

        if input_value < output_value {
            return Err(TransactionError::InsufficientInputValue {
                input_value,
                output_value,
            });
        }
        Ok(input_value - output_value)
    }

    /// Accepts transactions in the given order, each one validated against the pool as updated
    /// by the transactions accepted before it. A rejected transaction is not reconsidered.
    ///
    /// Returns the accepted transactions in the order of acceptance.
    pub fn handle_batch<I>(&mut self, transactions: I) -> Vec<Transaction>
    where
        I: IntoIterator<Item = Transaction>,
    {
        let mut submitted = 0;
        let accepted = transactions
            .into_iter()
            .fold(Vec::new(), |mut accepted, transaction| {
                submitted += 1;
                match self.validate(&transaction) {
                    Ok(fee) => match self.commit(&transaction) {
                        Ok(()) => {
                            debug!("Accepted transaction: {} with fee: {}", transaction.id(), fee);
                            accepted.push(transaction);
                        }
                        Err(e) => {
                            error!(
                                "Failed to commit validated transaction: {}: {}",
                                transaction.id(),
                                e
                            );
                        }
                    },
                    Err(e) => {
                        debug!("Rejected transaction: {}: {}", transaction.id(), e);
                    }
                }
                accepted
            });
        info!(
            "Accepted {} of {} transactions, {} UTXOs in the pool",
            accepted.len(),
            submitted,
            self.pool.len()
        );
        accepted
    }

    /// Spends the inputs of the transaction and adds its outputs to the pool.
    fn commit(&mut self, transaction: &Transaction) -> Result<(), UtxoPoolError> {
        // Check all inputs up front so that a failure leaves the pool untouched.
        for input in transaction.inputs() {
            self.pool.get(&Utxo::from_input(input))?;
        }
        for input in transaction.inputs() {
            self.pool.remove(&Utxo::from_input(input))?;
        }
        for (index, output) in transaction.outputs().iter().enumerate() {
            let utxo = Utxo::new(*transaction.id(), OutputIndex::new(index as u32));
            self.pool.insert(utxo, output.clone());
        }
        Ok(())
    }
}
