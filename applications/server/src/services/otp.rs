/// One-time codes for account verification and password reset
///
/// Codes live in the code store under `verify:<userId>` or `forgot:<userId>`
/// until they are consumed, overwritten by a newer code, or burnt after
/// `MAX_FAILED_ATTEMPTS` wrong guesses.
use crate::{error::Result, services::CacheStore};
use freetunes_core::{TunesError, UserId};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Wrong submissions a code survives; the next one deletes it
pub const MAX_FAILED_ATTEMPTS: u32 = 5;

const MISMATCH: &str = "Verification failed, OTP code does not match";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    Verify,
    Forgot,
}

impl OtpPurpose {
    pub fn cache_key(self, user_id: &UserId) -> String {
        match self {
            Self::Verify => format!("verify:{user_id}"),
            Self::Forgot => format!("forgot:{user_id}"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PendingCode {
    code: String,
    failures: u32,
}

/// Random six-digit code, zero padded
pub fn generate() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{code:06}")
}

/// Generate a code and store it, replacing any earlier one
pub async fn issue(codes: &dyn CacheStore, purpose: OtpPurpose, user_id: &UserId) -> Result<String> {
    let code = generate();
    let pending = PendingCode {
        code: code.clone(),
        failures: 0,
    };
    let value = serde_json::to_string(&pending).map_err(TunesError::from)?;

    codes.set(&purpose.cache_key(user_id), value).await?;
    Ok(code)
}

/// Check a submitted code
///
/// The stored code is taken out of the store before comparing, so concurrent
/// guesses cannot share one attempt. A wrong guess puts it back with one more
/// failure until the limit is reached. A missing or different code is an
/// invariant violation.
pub async fn consume(
    codes: &dyn CacheStore,
    purpose: OtpPurpose,
    user_id: &UserId,
    submitted: &str,
) -> Result<()> {
    let key = purpose.cache_key(user_id);
    let Some(raw) = codes.take(&key).await? else {
        return Err(TunesError::invariant(MISMATCH).into());
    };
    let Ok(mut pending) = serde_json::from_str::<PendingCode>(&raw) else {
        return Err(TunesError::invariant(MISMATCH).into());
    };

    if pending.code == submitted {
        return Ok(());
    }

    pending.failures += 1;
    if pending.failures < MAX_FAILED_ATTEMPTS {
        let value = serde_json::to_string(&pending).map_err(TunesError::from)?;
        codes.set(&key, value).await?;
    } else {
        tracing::warn!(user = %user_id, ?purpose, "One-time code burnt after repeated failures");
    }

    Err(TunesError::invariant(MISMATCH).into())
}
