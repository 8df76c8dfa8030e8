//! Cleanup of operator-selected resources from a discovery report
//!
//! The cleaner never decides what to delete: it takes the report plus a
//! literal list of identifiers, matches each one exactly against the report
//! buckets, and dispatches to the per-type deletion routine. One resource at
//! a time, strictly in the order given, so the console transcript maps each
//! line to exactly one resource and a crash leaves a clearly bounded set of
//! completed deletions.

use crate::aws::error::AwsError;
use crate::aws::{
    ApiGatewayClient, AwsContext, CloudFormationClient, DynamoDbClient, LambdaClient, S3Client,
};
use crate::report::{OrphanReport, ResourceKind};
use crate::serverless::{remove_with_fallback, ServerlessCli, StackRemoval, StackTarget};
use tracing::{info, warn};

/// Per-target result of a cleanup run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// The resource was deleted, or the delete call found it already absent
    Deleted,
    /// The identifier matched nothing in the report; no AWS call was made
    SkippedNotFound,
    /// The delete call failed; processing continued with the next target
    Failed,
}

impl OutcomeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeStatus::Deleted => "deleted",
            OutcomeStatus::SkippedNotFound => "skipped-not-found",
            OutcomeStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one attempted identifier, surfaced to the operator
#[derive(Debug, Clone)]
pub struct CleanupOutcome {
    pub resource_id: String,
    /// The resolved type; `None` when the id matched nothing in the report
    pub kind: Option<ResourceKind>,
    pub status: OutcomeStatus,
    pub error: Option<String>,
}

/// The per-type deletion capability the cleaner dispatches to.
///
/// Split out from the cleaner so the matching and outcome logic can be
/// exercised against a recording double instead of a live account.
#[allow(async_fn_in_trait)]
pub trait ResourceDeleter {
    async fn delete_stack(&self, stack_name: &str) -> Result<(), AwsError>;
    async fn delete_function(&self, function_name: &str) -> Result<(), AwsError>;
    async fn delete_bucket(&self, bucket_name: &str) -> Result<(), AwsError>;
    async fn delete_rest_api(&self, api_id: &str) -> Result<(), AwsError>;
    async fn delete_table(&self, table_name: &str) -> Result<(), AwsError>;
}

/// Deletes a specific, operator-approved subset of reported resources
pub struct Cleaner<D> {
    deleter: D,
}

impl<D: ResourceDeleter> Cleaner<D> {
    pub fn new(deleter: D) -> Self {
        Self { deleter }
    }

    /// Process every target id in order, one at a time.
    ///
    /// A target matching several buckets produces one outcome per match. A
    /// failing delete never aborts the remaining targets.
    pub async fn run(&self, report: &OrphanReport, targets: &[String]) -> Vec<CleanupOutcome> {
        let mut outcomes = Vec::new();

        for target in targets {
            let kinds = report.matching_kinds(target);

            if kinds.is_empty() {
                info!(resource = %target, "Not present in report, skipping");
                outcomes.push(CleanupOutcome {
                    resource_id: target.clone(),
                    kind: None,
                    status: OutcomeStatus::SkippedNotFound,
                    error: None,
                });
                continue;
            }

            for kind in kinds {
                outcomes.push(self.delete_one(kind, target).await);
            }
        }

        outcomes
    }

    async fn delete_one(&self, kind: ResourceKind, id: &str) -> CleanupOutcome {
        let result = match kind {
            ResourceKind::Stack => self.deleter.delete_stack(id).await,
            ResourceKind::Function => self.deleter.delete_function(id).await,
            ResourceKind::Bucket => self.deleter.delete_bucket(id).await,
            ResourceKind::Api => self.deleter.delete_rest_api(id).await,
            ResourceKind::Table => self.deleter.delete_table(id).await,
        };

        match result {
            Ok(()) => {
                info!(kind = %kind, resource = %id, "Deleted");
                CleanupOutcome {
                    resource_id: id.to_string(),
                    kind: Some(kind),
                    status: OutcomeStatus::Deleted,
                    error: None,
                }
            }
            // The end state (resource absent) is achieved, so not-found from
            // the delete call counts as deleted.
            Err(e) if e.is_not_found() => {
                info!(kind = %kind, resource = %id, "Already absent, counting as deleted");
                CleanupOutcome {
                    resource_id: id.to_string(),
                    kind: Some(kind),
                    status: OutcomeStatus::Deleted,
                    error: None,
                }
            }
            Err(e) => {
                warn!(kind = %kind, resource = %id, error = %e, "Deletion failed");
                CleanupOutcome {
                    resource_id: id.to_string(),
                    kind: Some(kind),
                    status: OutcomeStatus::Failed,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Production deleter backed by the AWS service clients.
///
/// Stack removal tries the Serverless CLI first and falls back to a direct
/// CloudFormation delete; everything else is a single delete call.
pub struct AwsDeleter<R = ServerlessCli> {
    cloudformation: CloudFormationClient,
    lambda: LambdaClient,
    s3: S3Client,
    apigateway: ApiGatewayClient,
    dynamodb: DynamoDbClient,
    serverless: R,
}

impl AwsDeleter<ServerlessCli> {
    /// Create a deleter from a pre-loaded AWS context, using the real
    /// Serverless CLI for the primary stack-removal path.
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            cloudformation: CloudFormationClient::from_context(ctx),
            lambda: LambdaClient::from_context(ctx),
            s3: S3Client::from_context(ctx),
            apigateway: ApiGatewayClient::from_context(ctx),
            dynamodb: DynamoDbClient::from_context(ctx),
            serverless: ServerlessCli::new(),
        }
    }
}

impl<R: StackRemoval> ResourceDeleter for AwsDeleter<R> {
    async fn delete_stack(&self, stack_name: &str) -> Result<(), AwsError> {
        let target = StackTarget::from_stack_name(stack_name);
        remove_with_fallback(&self.serverless, &self.cloudformation, &target).await
    }

    async fn delete_function(&self, function_name: &str) -> Result<(), AwsError> {
        self.lambda.delete_function(function_name).await
    }

    async fn delete_bucket(&self, bucket_name: &str) -> Result<(), AwsError> {
        self.s3.empty_and_delete_bucket(bucket_name).await
    }

    async fn delete_rest_api(&self, api_id: &str) -> Result<(), AwsError> {
        self.apigateway.delete_rest_api(api_id).await
    }

    async fn delete_table(&self, table_name: &str) -> Result<(), AwsError> {
        self.dynamodb.delete_table(table_name).await
    }
}
