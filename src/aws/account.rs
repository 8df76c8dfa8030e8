//! AWS account validation and identity

use crate::aws::context::AwsContext;
use anyhow::{Context, Result};
use tracing::info;

/// Strongly-typed AWS account ID (12-digit string)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(String);

impl AccountId {
    /// The account ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fetch the current AWS account ID via STS GetCallerIdentity.
///
/// This requires no special permissions and always succeeds if credentials
/// are valid, so both commands call it up front: a failure here is the
/// fatal "no usable credentials" case, as opposed to the per-service
/// failures that discovery absorbs.
pub async fn get_current_account_id(ctx: &AwsContext) -> Result<AccountId> {
    let sts = ctx.sts_client();
    let identity = sts
        .get_caller_identity()
        .send()
        .await
        .context("Failed to get AWS caller identity - check credentials")?;

    let account = identity
        .account()
        .context("No account ID returned from STS GetCallerIdentity")?;

    info!(account_id = %account, "AWS account validated");

    Ok(AccountId(account.to_string()))
}
