// Faucet proof of work: find a nonce whose hash has enough leading zero bits

use crate::identity::Address;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Highest target a search over `u64` nonces can be expected to meet
pub const MAX_POW_TARGET: u32 = 64;

/// Nonces tried between two checks of the cancel flag
const CANCEL_CHECK_INTERVAL: u64 = 4096;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PowError {
    #[error("target of {0} bits exceeds the maximum of {MAX_POW_TARGET}")]
    TargetTooHigh(u32),

    #[error("search cancelled")]
    Cancelled,

    #[error("nonce space exhausted")]
    Exhausted,
}

/// Bytes a faucet request commits to: the address and the pledge identity
pub fn faucet_payload(address: &Address, pledge_id: &str) -> Vec<u8> {
    let mut payload = address.to_bytes();
    payload.extend_from_slice(pledge_id.as_bytes());
    payload
}

/// Number of leading zero bits in `digest`
pub fn leading_zero_bits(digest: &[u8]) -> u32 {
    let mut bits = 0;
    for byte in digest {
        if *byte == 0 {
            bits += 8;
            continue;
        }
        bits += byte.leading_zeros();
        break;
    }
    bits
}

/// Check whether `nonce` satisfies `target` for `payload`
pub fn meets_target(payload: &[u8], nonce: u64, target: u32) -> bool {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hasher.update(nonce.to_le_bytes());
    leading_zero_bits(&hasher.finalize()) >= target
}

/// Search nonces from zero until one meets `target`.
///
/// CPU bound; callers on the async runtime should use [`solve_cancellable`] on a
/// blocking thread.
pub fn solve(payload: &[u8], target: u32) -> Result<u64, PowError> {
    solve_cancellable(payload, target, &AtomicBool::new(false))
}

/// Like [`solve`], but gives up with [`PowError::Cancelled`] once `cancel` is set
pub fn solve_cancellable(
    payload: &[u8],
    target: u32,
    cancel: &AtomicBool,
) -> Result<u64, PowError> {
    if target > MAX_POW_TARGET {
        return Err(PowError::TargetTooHigh(target));
    }

    let mut prefix = Sha256::new();
    prefix.update(payload);

    for nonce in 0..=u64::MAX {
        if nonce % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
            return Err(PowError::Cancelled);
        }
        let mut hasher = prefix.clone();
        hasher.update(nonce.to_le_bytes());
        if leading_zero_bits(&hasher.finalize()) >= target {
            return Ok(nonce);
        }
    }

    Err(PowError::Exhausted)
}

/// Sets its flag when dropped, stopping a search whose caller went away
pub(crate) struct CancelOnDrop(pub(crate) std::sync::Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}
