//! Connection management commands

use syncbridge_domain::{ConnectionConfig, ConnectionTestReport};

use super::CommandResult;
use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Connect a system, optionally overriding stored config keys.
///
/// `Ok(false)` means the remote system refused; the system is now `error`.
/// Configuration faults and timeouts come back as errors.
pub async fn connect_system(
    ctx: &AppContext,
    system_id: &str,
    config_override: Option<ConnectionConfig>,
) -> CommandResult<bool> {
    execute_command("connections::connect_system", || {
        ctx.connections.connect(system_id, config_override)
    })
    .await
}

/// Disconnect a system. `Ok(false)` if the adapter failed to release its
/// session; the system is then left in `error`.
pub async fn disconnect_system(ctx: &AppContext, system_id: &str) -> CommandResult<bool> {
    execute_command("connections::disconnect_system", || ctx.connections.disconnect(system_id))
        .await
}

/// Probe connectivity. Remote failures are reported, not raised.
pub async fn test_connection(
    ctx: &AppContext,
    system_id: &str,
) -> CommandResult<ConnectionTestReport> {
    execute_command("connections::test_connection", || ctx.connections.test_connection(system_id))
        .await
}
