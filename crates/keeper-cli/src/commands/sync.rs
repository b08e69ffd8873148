//! Save and publish command implementations

use colored::Colorize;
use keeper_core::{NamePattern, SyncEngine, SyncReport};

use super::each_kind;
use crate::cli::{OutputFormat, Selection, kinds};
use crate::context::{Context, parse_pattern};
use crate::error::{CliError, Result};
use crate::output::{render_data, report_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Save,
    Publish,
}

impl Direction {
    fn past_tense(self) -> &'static str {
        match self {
            Self::Save => "Saved",
            Self::Publish => "Published",
        }
    }
}

/// Pull selected remote resources into local files.
///
/// Returns `false` if any item failed.
pub fn run_save(
    ctx: &Context,
    selection: &Selection,
    dry_run: bool,
    format: OutputFormat,
) -> Result<bool> {
    run(ctx, selection, dry_run, format, Direction::Save)
}

/// Push selected local files to the cluster.
///
/// Returns `false` if any item failed.
pub fn run_publish(
    ctx: &Context,
    selection: &Selection,
    dry_run: bool,
    format: OutputFormat,
) -> Result<bool> {
    run(ctx, selection, dry_run, format, Direction::Publish)
}

fn run(
    ctx: &Context,
    selection: &Selection,
    dry_run: bool,
    format: OutputFormat,
    direction: Direction,
) -> Result<bool> {
    let pattern = parse_pattern(selection.pattern.as_deref())?;
    let (report, error) = collect(ctx, selection, pattern.as_ref(), dry_run, format, direction);

    // Kinds that finished before an error still get their results shown.
    if error.is_none() || !report.is_empty() {
        match render_data(&report, format)? {
            Some(data) => println!("{}", data.trim_end()),
            None => print!("{}", report_table(&report, direction.past_tense(), dry_run)),
        }
    }
    match error {
        Some(e) => Err(e),
        None => Ok(!report.has_failures()),
    }
}

/// Results of every kind that ran, plus the error that stopped or skipped
/// a kind, if any.
fn collect(
    ctx: &Context,
    selection: &Selection,
    pattern: Option<&NamePattern>,
    dry_run: bool,
    format: OutputFormat,
    direction: Direction,
) -> (SyncReport, Option<CliError>) {
    let mut report = SyncReport::default();
    let error = each_kind(kinds(selection.kind), |kind| {
        let engine: SyncEngine = ctx.engine(&selection.environment, kind, dry_run)?;
        if format == OutputFormat::Table {
            let (verb, place) = match direction {
                Direction::Save => ("Saving", engine.store().dir().to_string()),
                Direction::Publish => ("Publishing", selection.environment.clone()),
            };
            println!(
                "{} {} {} {}...",
                "=>".blue().bold(),
                verb,
                kind.dir_name(),
                format!("({})", place).dimmed()
            );
        }
        let batch = match direction {
            Direction::Save => engine.save(pattern)?,
            Direction::Publish => engine.publish(pattern)?,
        };
        report = std::mem::take(&mut report).merge(batch);
        Ok(())
    });
    (report, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::KindArg;
    use crate::context::Connector;
    use keeper_core::{Environment, KeeperConfig, RemoteGateway, ResourceKind, SyncStatus};
    use keeper_test_utils::{MemoryGateway, TestWorkspace, body};
    use serde_json::json;

    fn context(ws: &TestWorkspace, gateway: MemoryGateway) -> Context {
        let path = ws.write_config("environments:\n  qa:\n    host: localhost\n    port: 9200\n");
        let config = KeeperConfig::from_yaml(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let connector: Connector = Box::new(move |_env: &Environment, kind: ResourceKind| {
            assert_eq!(kind, ResourceKind::Template);
            Ok(Box::new(gateway.clone()) as Box<dyn RemoteGateway>)
        });
        Context::new(path, config, connector)
    }

    /// Context whose connector hands out one gateway per kind.
    fn context_per_kind(ws: &TestWorkspace, templates: MemoryGateway, policies: MemoryGateway) -> Context {
        let path = ws.write_config("environments:\n  qa:\n    host: localhost\n    port: 9200\n");
        let config = KeeperConfig::from_yaml(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let connector: Connector = Box::new(move |_env: &Environment, kind: ResourceKind| {
            let gateway = match kind {
                ResourceKind::Template => templates.clone(),
                ResourceKind::IsmPolicy => policies.clone(),
            };
            Ok(Box::new(gateway) as Box<dyn RemoteGateway>)
        });
        Context::new(path, config, connector)
    }

    fn all_kinds() -> Selection {
        Selection {
            kind: None,
            ..selection()
        }
    }

    fn selection() -> Selection {
        Selection {
            environment: "qa".into(),
            kind: Some(KindArg::Templates),
            pattern: None,
        }
    }

    #[test]
    fn save_then_publish_round_trip() {
        let ws = TestWorkspace::new();
        let gateway = MemoryGateway::new(ResourceKind::Template)
            .with_resource("logs", body(json!({"index_patterns": ["logs-*"]})));
        let ctx = context(&ws, gateway.clone());

        assert!(run_save(&ctx, &selection(), false, OutputFormat::Json).unwrap());
        ws.assert_local_exists("qa", ResourceKind::Template, "logs");

        assert!(run_publish(&ctx, &selection(), false, OutputFormat::Json).unwrap());
        assert_eq!(gateway.put_count(), 0);
    }

    #[test]
    fn failed_item_makes_command_unsuccessful() {
        let ws = TestWorkspace::new();
        let gateway = MemoryGateway::new(ResourceKind::Template)
            .with_resource("logs", body(json!({"index_patterns": ["logs-*"]})))
            .failing_on("logs");
        let ctx = context(&ws, gateway);

        assert!(!run_save(&ctx, &selection(), false, OutputFormat::Table).unwrap());
    }

    #[test]
    fn unknown_environment_is_fatal() {
        let ws = TestWorkspace::new();
        let ctx = context(&ws, MemoryGateway::new(ResourceKind::Template));
        let selection = Selection {
            environment: "staging".into(),
            ..selection()
        };

        let err = run_save(&ctx, &selection, false, OutputFormat::Table).unwrap_err();
        assert!(err.to_string().contains("staging"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let ws = TestWorkspace::new();
        let ctx = context(&ws, MemoryGateway::new(ResourceKind::Template));
        let selection = Selection {
            pattern: Some("[unclosed".into()),
            ..selection()
        };

        assert!(run_publish(&ctx, &selection, false, OutputFormat::Table).is_err());
    }

    #[test]
    fn finished_kind_is_reported_when_a_later_kind_is_fatal() {
        let ws = TestWorkspace::new();
        let templates = MemoryGateway::new(ResourceKind::Template)
            .with_resource("logs", body(json!({"index_patterns": ["logs-*"]})));
        let policies = MemoryGateway::new(ResourceKind::IsmPolicy).failing_listing();
        let ctx = context_per_kind(&ws, templates, policies);

        let (report, error) =
            collect(&ctx, &all_kinds(), None, false, OutputFormat::Json, Direction::Save);

        assert!(error.unwrap().to_string().contains("<listing>"));
        assert_eq!(report.len(), 1);
        assert_eq!(report.get("logs").unwrap().status, SyncStatus::Created);
        ws.assert_local_exists("qa", ResourceKind::Template, "logs");
        assert!(run_save(&ctx, &all_kinds(), false, OutputFormat::Json).is_err());
    }

    #[test]
    fn rejected_kind_does_not_stop_the_next_kind() {
        let ws = TestWorkspace::new();
        let templates = MemoryGateway::new(ResourceKind::Template).rejecting_listing(400);
        let policies = MemoryGateway::new(ResourceKind::IsmPolicy)
            .with_resource("hot-warm", body(json!({"states": []})));
        let ctx = context_per_kind(&ws, templates, policies);

        let (report, error) =
            collect(&ctx, &all_kinds(), None, false, OutputFormat::Json, Direction::Save);

        assert!(error.unwrap().to_string().contains("API error (400)"));
        assert_eq!(report.get("hot-warm").unwrap().status, SyncStatus::Created);
        ws.assert_local_exists("qa", ResourceKind::IsmPolicy, "hot-warm");
    }

    #[test]
    fn fatal_first_kind_skips_the_rest() {
        let ws = TestWorkspace::new();
        let templates = MemoryGateway::new(ResourceKind::Template).failing_listing();
        let policies = MemoryGateway::new(ResourceKind::IsmPolicy)
            .with_resource("hot-warm", body(json!({"states": []})));
        let ctx = context_per_kind(&ws, templates, policies.clone());

        let (report, error) =
            collect(&ctx, &all_kinds(), None, false, OutputFormat::Json, Direction::Publish);

        assert!(error.is_some());
        assert!(report.is_empty());
        assert!(policies.gets().is_empty());
    }
}
