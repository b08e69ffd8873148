//! Delete command: remove one remote resource

use colored::Colorize;
use keeper_core::{ResourceKind, SyncStatus};

use crate::context::Context;
use crate::error::{CliError, Result};

/// Delete `name` of `kind` from the cluster.
///
/// A resource that is already gone is a warning, not a failure.
pub fn run_delete(
    ctx: &Context,
    environment: &str,
    kind: ResourceKind,
    name: &str,
    purge_local: bool,
) -> Result<bool> {
    if name.trim().is_empty() {
        return Err(CliError::user("resource name must not be empty"));
    }
    let engine = ctx.engine(environment, kind, false)?;
    let result = engine.delete(name, purge_local);

    match result.status {
        SyncStatus::Deleted => {
            println!("{} Deleted {} '{}'", "OK".green().bold(), kind, name);
            if purge_local {
                println!("   {} local file removed", "-".dimmed());
            }
        }
        SyncStatus::Absent => {
            println!(
                "{} {} '{}' does not exist in '{}'; nothing to delete",
                "WARNING".yellow().bold(),
                kind,
                name,
                environment
            );
        }
        _ => {
            println!(
                "{} Could not delete {} '{}': {}",
                "FAILED".red().bold(),
                kind,
                name,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    Ok(!result.is_failure())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Connector;
    use keeper_core::{Environment, KeeperConfig, RemoteGateway};
    use keeper_test_utils::{MemoryGateway, TestWorkspace, body};
    use serde_json::json;

    fn context(ws: &TestWorkspace, gateway: MemoryGateway) -> Context {
        let path = ws.write_config("environments:\n  qa:\n    host: localhost\n    port: 9200\n");
        let config = KeeperConfig::from_yaml(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let connector: Connector = Box::new(move |_env: &Environment, _kind: ResourceKind| {
            Ok(Box::new(gateway.clone()) as Box<dyn RemoteGateway>)
        });
        Context::new(path, config, connector)
    }

    #[test]
    fn delete_absent_resource_succeeds() {
        let ws = TestWorkspace::new();
        let ctx = context(&ws, MemoryGateway::new(ResourceKind::IsmPolicy));

        assert!(run_delete(&ctx, "qa", ResourceKind::IsmPolicy, "ghost", false).unwrap());
    }

    #[test]
    fn delete_with_purge_removes_local_file() {
        let ws = TestWorkspace::new();
        let gateway = MemoryGateway::new(ResourceKind::IsmPolicy)
            .with_resource("hot-warm", body(json!({"states": []})));
        ws.write_local("qa", ResourceKind::IsmPolicy, "hot-warm", "states: []\n");
        let ctx = context(&ws, gateway.clone());

        assert!(run_delete(&ctx, "qa", ResourceKind::IsmPolicy, "hot-warm", true).unwrap());
        assert!(gateway.names().is_empty());
        ws.assert_local_missing("qa", ResourceKind::IsmPolicy, "hot-warm");
    }

    #[test]
    fn delete_connection_failure_is_unsuccessful() {
        let ws = TestWorkspace::new();
        let gateway = MemoryGateway::new(ResourceKind::Template)
            .with_resource("logs", body(json!({"index_patterns": ["logs-*"]})))
            .failing_on("logs");
        let ctx = context(&ws, gateway);

        assert!(!run_delete(&ctx, "qa", ResourceKind::Template, "logs", false).unwrap());
    }
}
