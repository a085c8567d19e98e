// Ledger module - outputs, balances and signed transfer transactions

mod codec;
mod model;
mod transaction;

pub use codec::{CodecError, TransactionCodec};
pub use model::{
    sum_color, Balances, Color, InclusionState, MessageId, ModelError, NodeInfo, Output,
    OutputId, TransactionId,
};
pub use transaction::{
    Transaction, TransactionBuilder, TransactionEssence, TransactionError, TransferOutput,
    UnlockBlock,
};
