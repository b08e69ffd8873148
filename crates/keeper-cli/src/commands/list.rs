//! List command: where each resource lives and whether copies differ

use super::each_kind;
use crate::cli::{OutputFormat, Selection, kinds};
use crate::context::{Context, parse_pattern};
use crate::error::Result;
use crate::output::{list_table, render_data};

/// List selected resources of every requested kind.
///
/// Succeeds once every listing succeeded, even if individual comparisons
/// could not be made.
pub fn run_list(ctx: &Context, selection: &Selection, format: OutputFormat) -> Result<bool> {
    let pattern = parse_pattern(selection.pattern.as_deref())?;

    let mut entries = Vec::new();
    let error = each_kind(kinds(selection.kind), |kind| {
        let engine = ctx.engine(&selection.environment, kind, false)?;
        entries.extend(engine.list(pattern.as_ref())?);
        Ok(())
    });

    if error.is_none() || !entries.is_empty() {
        match render_data(&entries, format)? {
            Some(data) => println!("{}", data.trim_end()),
            None => print!("{}", list_table(&entries)),
        }
    }
    match error {
        Some(e) => Err(e),
        None => Ok(true),
    }
}
