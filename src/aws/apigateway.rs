//! API Gateway REST API listing and deletion

use crate::aws::context::AwsContext;
use crate::aws::error::{classify_sdk_error, AwsError};
use anyhow::{Context, Result};
use aws_sdk_apigateway::types::RestApi;
use aws_sdk_apigateway::Client;
use tracing::{debug, info};

/// API Gateway client for listing and deleting REST APIs
pub struct ApiGatewayClient {
    client: Client,
}

impl ApiGatewayClient {
    /// Create an API Gateway client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.apigateway_client(),
        }
    }

    /// List every REST API in the region, following pagination.
    pub async fn list_rest_apis(&self) -> Result<Vec<RestApi>> {
        let mut apis = Vec::new();
        let mut position: Option<String> = None;

        loop {
            let mut request = self.client.get_rest_apis();
            if let Some(p) = &position {
                request = request.position(p);
            }

            let response = request.send().await.context("Failed to list REST APIs")?;
            apis.extend(response.items().iter().cloned());

            match response.position() {
                Some(p) => position = Some(p.to_string()),
                None => break,
            }
        }

        debug!(count = apis.len(), "Listed API Gateway REST APIs");
        Ok(apis)
    }

    /// Delete a REST API by id.
    pub async fn delete_rest_api(&self, api_id: &str) -> Result<(), AwsError> {
        info!(api = %api_id, "Deleting API Gateway REST API");

        self.client
            .delete_rest_api()
            .rest_api_id(api_id)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(())
    }
}
