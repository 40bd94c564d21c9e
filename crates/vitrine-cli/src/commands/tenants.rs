//! Tenant selection commands.

use vitrine_api_models::Tenant;

use crate::cli::{TenantCommand, TenantUseArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_item, render_list};

pub(crate) fn handle_tenant_command(ctx: &AppContext, command: TenantCommand) -> CliResult<()> {
    match command {
        TenantCommand::Ls => render_list(&ctx.context.tenants().available_tenants(), ctx.output),
        TenantCommand::Current => match ctx.context.tenants().current_tenant() {
            Some(tenant) => render_item(&tenant, ctx.output),
            None => Err(CliError::validation(
                "no tenant selected (run `vitrine tenant use <id>`)",
            )),
        },
        TenantCommand::Use(args) => handle_tenant_use(ctx, args),
    }
}

fn handle_tenant_use(ctx: &AppContext, args: TenantUseArgs) -> CliResult<()> {
    let id = args.id.trim();
    if id.is_empty() {
        return Err(CliError::validation("tenant id must not be empty"));
    }
    let tenants = ctx.context.tenants();
    let tenant = tenants
        .available_tenants()
        .into_iter()
        .find(|tenant| tenant.id == id)
        .unwrap_or_else(|| {
            let name = args.name.unwrap_or_else(|| format!("Tenant {id}"));
            Tenant::new(id, name)
        });
    println!("Switched to tenant {} ({})", tenant.name, tenant.id);
    tenants.set_current_tenant(tenant);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::app_context;
    use httpmock::MockServer;
    use vitrine_test_support::fixtures::{tenant_a, tenant_b};

    fn use_args(id: &str, name: Option<&str>) -> TenantUseArgs {
        TenantUseArgs {
            id: id.to_string(),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn use_prefers_known_tenant_record() {
        let server = MockServer::start();
        let ctx = app_context(&server);
        ctx.context
            .tenants()
            .set_available_tenants(vec![tenant_a(), tenant_b()]);

        handle_tenant_command(&ctx, TenantCommand::Use(use_args("2", Some("ignored"))))
            .expect("switch succeeds");

        assert_eq!(ctx.context.tenants().current_tenant(), Some(tenant_b()));
    }

    #[test]
    fn use_accepts_unknown_tenant_ids() {
        let server = MockServer::start();
        let ctx = app_context(&server);

        handle_tenant_command(&ctx, TenantCommand::Use(use_args(" t9 ", None)))
            .expect("switch succeeds");

        assert_eq!(
            ctx.context.tenants().current_tenant(),
            Some(Tenant::new("t9", "Tenant t9"))
        );
    }

    #[test]
    fn current_without_selection_is_a_validation_error() {
        let server = MockServer::start();
        let ctx = app_context(&server);

        let err = handle_tenant_command(&ctx, TenantCommand::Current).expect_err("no tenant");
        assert_eq!(err.exit_code(), 2);
        assert!(handle_tenant_command(&ctx, TenantCommand::Use(use_args("  ", None))).is_err());
        assert!(handle_tenant_command(&ctx, TenantCommand::Ls).is_ok());
    }
}
