// Spam module - load generators against a remote ledger node
// Funding waiter and conflict orchestration, faucet/data loops, and the dispatcher

mod config;
mod conflict;
mod dispatcher;
mod error;
mod funding;
mod requests;

pub use config::{parse_duration, SpamConfig};
pub use conflict::{ConflictReport, ConflictSpammer, SpendAttempt};
pub use dispatcher::{Dispatcher, Mode};
pub use error::SpamError;
pub use funding::{FundingOutcome, FundingStatus, FundingTarget, FundingWaiter};
pub use requests::{DataSpammer, RequestSpammer};
