//! Command execution helpers
//!
//! Every command runs through [`execute_command`] so timing, logging and the
//! error mapping stay identical across the command surface.

use std::future::Future;
use std::time::Instant;

use syncbridge_domain::Result as DomainResult;

use crate::commands::{CommandError, CommandResult};
use crate::utils::logging::{error_label, log_command_execution};

/// Run a command body, log its outcome and map domain errors to
/// [`CommandError`].
///
/// # Example
///
/// ```rust,ignore
/// pub async fn list_systems(ctx: &AppContext) -> CommandResult<Vec<IntegratedSystem>> {
///     execute_command("systems::list_systems", || ctx.registry.list_all()).await
/// }
/// ```
pub async fn execute_command<F, Fut, T>(command_name: &str, command_fn: F) -> CommandResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();

    let result = command_fn().await;

    let error_type = result.as_ref().err().map(error_label);
    log_command_execution(command_name, start.elapsed(), error_type);

    result.map_err(CommandError::from)
}
