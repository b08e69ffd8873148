//! Command implementations for search-keeper CLI

pub mod delete;
pub mod environments;
pub mod list;
pub mod sync;

pub use delete::run_delete;
pub use environments::run_environments;
pub use list::run_list;
pub use sync::{run_publish, run_save};

use keeper_core::ResourceKind;

use crate::error::{CliError, Result};

/// Run `step` once per kind, in order.
///
/// A fatal error stops the loop. Any other error skips only its own kind.
/// Returns the first error seen, after the loop has ended.
pub(crate) fn each_kind<F>(kinds: Vec<ResourceKind>, mut step: F) -> Option<CliError>
where
    F: FnMut(ResourceKind) -> Result<()>,
{
    let mut first = None;
    for kind in kinds {
        if let Err(e) = step(kind) {
            let fatal = e.is_fatal();
            tracing::error!(%kind, error = %e, fatal, "kind not processed");
            first.get_or_insert(e);
            if fatal {
                break;
            }
        }
    }
    first
}
