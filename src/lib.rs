//! Load generator for a ledger node's public API.
//!
//! Spams faucet requests and data messages from parallel workers, and drives
//! deliberate double spends by funding one address and spending it from two
//! wallets at once.

pub mod client;
pub mod identity;
pub mod ledger;
pub mod logging;
pub mod spam;
pub mod wallet;
