//! Lambda function listing and deletion

use crate::aws::context::AwsContext;
use crate::aws::error::{classify_sdk_error, AwsError};
use anyhow::{Context, Result};
use aws_sdk_lambda::types::FunctionConfiguration;
use aws_sdk_lambda::Client;
use tracing::{debug, info};

/// Lambda client for listing and deleting functions
pub struct LambdaClient {
    client: Client,
}

impl LambdaClient {
    /// Create a Lambda client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.lambda_client(),
        }
    }

    /// List every function configuration in the region, following pagination.
    pub async fn list_functions(&self) -> Result<Vec<FunctionConfiguration>> {
        let mut functions = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut request = self.client.list_functions();
            if let Some(m) = &marker {
                request = request.marker(m);
            }

            let response = request.send().await.context("Failed to list functions")?;
            functions.extend(response.functions().iter().cloned());

            match response.next_marker() {
                Some(m) => marker = Some(m.to_string()),
                None => break,
            }
        }

        debug!(count = functions.len(), "Listed Lambda functions");
        Ok(functions)
    }

    /// Delete a function by name.
    pub async fn delete_function(&self, function_name: &str) -> Result<(), AwsError> {
        info!(function = %function_name, "Deleting Lambda function");

        self.client
            .delete_function()
            .function_name(function_name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(())
    }
}
