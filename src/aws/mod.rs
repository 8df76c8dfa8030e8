//! AWS service clients

pub mod account;
pub mod apigateway;
pub mod cloudformation;
pub mod context;
pub mod dynamodb;
pub mod error;
pub mod lambda;
pub mod s3;

pub use account::{get_current_account_id, AccountId};
pub use apigateway::ApiGatewayClient;
pub use cloudformation::CloudFormationClient;
pub use context::AwsContext;
pub use dynamodb::DynamoDbClient;
pub use error::{classify_aws_error, classify_sdk_error, AwsError};
pub use lambda::LambdaClient;
pub use s3::S3Client;
