pub mod hash;
pub mod public_key;
pub mod transaction;
pub mod transaction_validator;
pub mod utxo;
pub mod utxo_pool;

pub use self::{
    hash::*, public_key::*, transaction::*, transaction_validator::*, utxo::*, utxo_pool::*,
};
