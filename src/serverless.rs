//! Serverless framework stack removal
//!
//! Stack deletion prefers the Serverless framework's own `remove` command,
//! because it tears down framework-managed side resources that a plain
//! CloudFormation delete leaves behind. The CLI may not be installed or may
//! fail, so removal is expressed as a small capability trait with two
//! implementations: the shell-out here and the direct CloudFormation delete
//! in `aws::cloudformation`, combined by `remove_with_fallback`.

use crate::aws::error::AwsError;
use tokio::process::Command;
use tracing::{info, warn};

/// A stack to remove, with the service/stage inferred from its name.
///
/// Serverless framework stacks are conventionally named `<service>-<stage>`,
/// where the service name itself may contain hyphens; the stage is the last
/// hyphen-separated segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackTarget {
    pub stack_name: String,
    pub service: String,
    pub stage: String,
}

impl StackTarget {
    /// Infer service and stage from a stack name.
    ///
    /// Names without a hyphen get the whole name as service and `dev` as the
    /// stage, the framework's default.
    pub fn from_stack_name(stack_name: &str) -> Self {
        match stack_name.rsplit_once('-') {
            Some((service, stage)) if !service.is_empty() && !stage.is_empty() => Self {
                stack_name: stack_name.to_string(),
                service: service.to_string(),
                stage: stage.to_string(),
            },
            _ => Self {
                stack_name: stack_name.to_string(),
                service: stack_name.to_string(),
                stage: "dev".to_string(),
            },
        }
    }
}

/// Capability to remove a Serverless-framework stack.
#[allow(async_fn_in_trait)]
pub trait StackRemoval {
    async fn remove(&self, target: &StackTarget) -> Result<(), AwsError>;
}

/// Stack removal by shelling out to the Serverless framework CLI.
pub struct ServerlessCli {
    program: String,
}

impl ServerlessCli {
    pub fn new() -> Self {
        Self {
            program: "serverless".to_string(),
        }
    }
}

impl Default for ServerlessCli {
    fn default() -> Self {
        Self::new()
    }
}

impl StackRemoval for ServerlessCli {
    async fn remove(&self, target: &StackTarget) -> Result<(), AwsError> {
        info!(
            stack = %target.stack_name,
            service = %target.service,
            stage = %target.stage,
            "Removing stack via serverless CLI"
        );

        let output = Command::new(&self.program)
            .args(["remove", "--stack", &target.stack_name, "--stage", &target.stage])
            .output()
            .await
            .map_err(|e| AwsError::RemovalCommand {
                message: format!("failed to run {}: {e}", self.program),
            })?;

        if output.status.success() {
            info!(stack = %target.stack_name, "Serverless CLI removed stack");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(AwsError::RemovalCommand {
                message: format!(
                    "{} remove exited with {}: {}",
                    self.program,
                    output.status,
                    stderr.trim()
                ),
            })
        }
    }
}

/// Try `primary` once; if it fails, try `fallback` exactly once.
///
/// The primary's error is logged, not returned: the outcome the operator
/// sees is whichever the fallback produces.
pub async fn remove_with_fallback<P, F>(
    primary: &P,
    fallback: &F,
    target: &StackTarget,
) -> Result<(), AwsError>
where
    P: StackRemoval,
    F: StackRemoval,
{
    match primary.remove(target).await {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!(
                stack = %target.stack_name,
                error = %e,
                "Serverless removal failed, falling back to direct CloudFormation delete"
            );
            fallback.remove(target).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedRemoval {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FixedRemoval {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl StackRemoval for FixedRemoval {
        async fn remove(&self, _target: &StackTarget) -> Result<(), AwsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AwsError::RemovalCommand {
                    message: "simulated failure".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn infers_service_and_stage_from_stack_name() {
        let target = StackTarget::from_stack_name("serverless-myapp-dev");
        assert_eq!(target.service, "serverless-myapp");
        assert_eq!(target.stage, "dev");
        assert_eq!(target.stack_name, "serverless-myapp-dev");
    }

    #[test]
    fn stack_name_without_hyphen_defaults_stage() {
        let target = StackTarget::from_stack_name("myservice");
        assert_eq!(target.service, "myservice");
        assert_eq!(target.stage, "dev");
    }

    #[test]
    fn trailing_hyphen_defaults_stage() {
        let target = StackTarget::from_stack_name("myservice-");
        assert_eq!(target.service, "myservice-");
        assert_eq!(target.stage, "dev");
    }

    #[tokio::test]
    async fn fallback_not_used_when_primary_succeeds() {
        let primary = FixedRemoval::ok();
        let fallback = FixedRemoval::ok();
        let target = StackTarget::from_stack_name("serverless-app-dev");

        remove_with_fallback(&primary, &fallback, &target)
            .await
            .unwrap();

        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn fallback_fires_exactly_once_when_primary_fails() {
        let primary = FixedRemoval::failing();
        let fallback = FixedRemoval::ok();
        let target = StackTarget::from_stack_name("serverless-app-dev");

        remove_with_fallback(&primary, &fallback, &target)
            .await
            .unwrap();

        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn fallback_error_is_surfaced() {
        let primary = FixedRemoval::failing();
        let fallback = FixedRemoval::failing();
        let target = StackTarget::from_stack_name("serverless-app-dev");

        let err = remove_with_fallback(&primary, &fallback, &target)
            .await
            .unwrap_err();

        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
        assert!(err.to_string().contains("simulated failure"));
    }

    #[tokio::test]
    async fn missing_cli_binary_reports_command_error() {
        let cli = ServerlessCli {
            program: "serverless-cli-that-does-not-exist".to_string(),
        };
        let target = StackTarget::from_stack_name("serverless-app-dev");

        let err = cli.remove(&target).await.unwrap_err();
        assert!(matches!(err, AwsError::RemovalCommand { .. }));
    }
}
