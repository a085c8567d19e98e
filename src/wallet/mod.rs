// Wallet module - seed-derived addresses and spends against a remote ledger

mod seed_wallet;

pub use seed_wallet::{Wallet, WalletError, WalletFacade, GAP_LIMIT};
