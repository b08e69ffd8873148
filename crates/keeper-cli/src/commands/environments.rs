//! Environments command: show the configured connection profiles

use colored::Colorize;
use keeper_core::Environment;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::context::Context;
use crate::error::Result;
use crate::output::render_data;

#[derive(Debug, Serialize)]
struct EnvironmentRow {
    name: String,
    url: String,
    auth: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    proxy: Option<String>,
}

impl From<&Environment> for EnvironmentRow {
    fn from(env: &Environment) -> Self {
        let auth = if env.aws_auth.is_some() {
            "aws-sigv4"
        } else if env.basic_auth.is_some() {
            "basic"
        } else {
            "none"
        };
        Self {
            name: env.name.clone(),
            url: env.base_url(),
            auth,
            proxy: env
                .proxy
                .as_ref()
                .map(|p| format!("socks5h://{}:{}", p.host, p.port)),
        }
    }
}

/// Print every configured environment. Never contacts a cluster.
pub fn run_environments(ctx: &Context, format: OutputFormat) -> Result<bool> {
    let rows: Vec<EnvironmentRow> = ctx.config().environments.values().map(Into::into).collect();

    if let Some(data) = render_data(&rows, format)? {
        print!("{}", data);
        if format == OutputFormat::Json {
            println!();
        }
        return Ok(true);
    }

    println!(
        "{} {}",
        "Configuration:".bold(),
        ctx.config_path().display().to_string().cyan()
    );
    if rows.is_empty() {
        println!("   {}", "No environments configured.".dimmed());
        return Ok(true);
    }

    let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for row in &rows {
        print!(
            "   {}  {}  {}",
            format!("{:<width$}", row.name).green().bold(),
            row.url,
            format!("[{}]", row.auth).dimmed()
        );
        if let Some(proxy) = &row.proxy {
            print!("  {} {}", "via".dimmed(), proxy);
        }
        println!();
    }
    Ok(true)
}
