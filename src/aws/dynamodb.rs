//! DynamoDB table listing, description, and deletion

use crate::aws::context::AwsContext;
use crate::aws::error::{classify_sdk_error, AwsError};
use anyhow::{Context, Result};
use aws_sdk_dynamodb::types::TableDescription;
use aws_sdk_dynamodb::Client;
use tracing::{debug, info};

/// DynamoDB client for listing and deleting tables
pub struct DynamoDbClient {
    client: Client,
}

impl DynamoDbClient {
    /// Create a DynamoDB client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.dynamodb_client(),
        }
    }

    /// List every table name in the region, following pagination.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut start_table: Option<String> = None;

        loop {
            let mut request = self.client.list_tables();
            if let Some(name) = &start_table {
                request = request.exclusive_start_table_name(name);
            }

            let response = request.send().await.context("Failed to list tables")?;
            names.extend(response.table_names().iter().cloned());

            match response.last_evaluated_table_name() {
                Some(name) => start_table = Some(name.to_string()),
                None => break,
            }
        }

        debug!(count = names.len(), "Listed DynamoDB tables");
        Ok(names)
    }

    /// Fetch the description of a single table (status, size, item count).
    pub async fn describe_table(&self, table_name: &str) -> Result<Option<TableDescription>> {
        let response = self
            .client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .with_context(|| format!("Failed to describe table {table_name}"))?;

        Ok(response.table().cloned())
    }

    /// Delete a table by name.
    pub async fn delete_table(&self, table_name: &str) -> Result<(), AwsError> {
        info!(table = %table_name, "Deleting DynamoDB table");

        self.client
            .delete_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(())
    }
}
