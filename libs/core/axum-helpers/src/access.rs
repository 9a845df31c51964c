//! Explicit authorization: an ordered chain of capability checks evaluated
//! against the resolved caller.
//!
//! ```ignore
//! authorize(&caller, &[Capability::AccessAccount(user_id)])?;
//! authorize(&caller, &[Capability::StaffOnly])?;
//! ```

use crate::auth::JwtClaims;
use crate::errors::AppError;
use async_trait::async_trait;
use thiserror::Error;

/// What authorization needs to know about a caller
pub trait Principal {
    fn principal_id(&self) -> i32;

    /// Admins and super admins
    fn is_staff(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The caller is the account owner, or staff
    AccessAccount(i32),
    StaffOnly,
}

impl Capability {
    pub fn check<P: Principal>(&self, caller: &P) -> Result<(), Denied> {
        match *self {
            Capability::AccessAccount(owner) => {
                if caller.principal_id() == owner || caller.is_staff() {
                    Ok(())
                } else {
                    Err(Denied(format!("Access to account {owner} denied")))
                }
            }
            Capability::StaffOnly => {
                if caller.is_staff() {
                    Ok(())
                } else {
                    Err(Denied("Access restricted to staff".to_string()))
                }
            }
        }
    }
}

/// First failed check of a chain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Denied(pub String);

impl From<Denied> for AppError {
    fn from(denied: Denied) -> Self {
        AppError::Forbidden(denied.0)
    }
}

/// Evaluates `chain` in order, stopping at the first denial.
pub fn authorize<P: Principal>(caller: &P, chain: &[Capability]) -> Result<(), Denied> {
    chain.iter().try_for_each(|capability| {
        capability.check(caller).inspect_err(|denied| {
            tracing::info!(
                caller = caller.principal_id(),
                capability = ?capability,
                reason = %denied,
                "Authorization denied"
            );
        })
    })
}

/// Turns verified token claims into the caller the capability chain runs against
///
/// Implemented by the service owning user accounts and handed to routers in
/// other domains, which stay unaware of how callers are stored.
#[async_trait]
pub trait CallerResolver: Send + Sync + 'static {
    type Caller: Principal + Send + Sync;

    /// Fails with 401 when the token's subject no longer exists.
    async fn resolve(&self, claims: &JwtClaims) -> Result<Self::Caller, AppError>;
}
