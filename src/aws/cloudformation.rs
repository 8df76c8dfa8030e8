//! CloudFormation stack listing and deletion

use crate::aws::context::AwsContext;
use crate::aws::error::{classify_sdk_error, AwsError};
use crate::serverless::{StackRemoval, StackTarget};
use anyhow::{Context, Result};
use aws_sdk_cloudformation::types::{Stack, StackStatus, StackSummary};
use aws_sdk_cloudformation::Client;
use tracing::{debug, info};

/// CloudFormation client for listing and deleting stacks
pub struct CloudFormationClient {
    client: Client,
}

impl CloudFormationClient {
    /// Create a CloudFormation client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.cloudformation_client(),
        }
    }

    /// List every stack summary in the region, following pagination.
    ///
    /// Stacks already in `DELETE_COMPLETE` are dropped here; everything else
    /// is returned for the caller to filter.
    pub async fn list_active_stacks(&self) -> Result<Vec<StackSummary>> {
        let mut summaries = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut request = self.client.list_stacks();
            if let Some(token) = &next_token {
                request = request.next_token(token);
            }

            let response = request.send().await.context("Failed to list stacks")?;

            for summary in response.stack_summaries() {
                if summary.stack_status() == Some(&StackStatus::DeleteComplete) {
                    continue;
                }
                summaries.push(summary.clone());
            }

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(count = summaries.len(), "Listed CloudFormation stacks");
        Ok(summaries)
    }

    /// Fetch the full description of a single stack (description, tags).
    pub async fn describe_stack(&self, stack_name: &str) -> Result<Option<Stack>> {
        let response = self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
            .with_context(|| format!("Failed to describe stack {stack_name}"))?;

        Ok(response.stacks().first().cloned())
    }

    /// Request stack deletion.
    ///
    /// Returns once the delete request is accepted; CloudFormation performs
    /// the actual teardown asynchronously and this client does not wait for
    /// `DELETE_COMPLETE`.
    pub async fn delete_stack(&self, stack_name: &str) -> Result<(), AwsError> {
        info!(stack = %stack_name, "Initiating CloudFormation stack deletion");

        self.client
            .delete_stack()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(())
    }
}

/// Direct CloudFormation deletion as the fallback stack-removal path.
impl StackRemoval for CloudFormationClient {
    async fn remove(&self, target: &StackTarget) -> Result<(), AwsError> {
        self.delete_stack(&target.stack_name).await
    }
}
