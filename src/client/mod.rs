// Client module - the remote ledger node API
// HTTP implementation for real nodes, mock implementation for tests

mod http;
mod mock;
pub mod pow;
mod traits;

pub use http::{ClientConfig, HttpLedgerClient};
pub use mock::{MockLedgerClient, OutputsPoll};
pub use pow::PowError;
pub use traits::{ClientError, LedgerClient};
