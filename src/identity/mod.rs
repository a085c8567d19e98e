// Identity module - seeds, ed25519 keys and ledger addresses

mod address;
mod keypair;
mod seed;
mod signer;

pub use address::*;
pub use keypair::*;
pub use seed::*;
pub use signer::*;
