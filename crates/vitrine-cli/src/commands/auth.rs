//! Session commands: login, logout, whoami and register.

use anyhow::anyhow;
use vitrine_api_models::{LoginCredentials, RegisterRequest, Validate};
use vitrine_client::jwt;

use crate::cli::{LoginArgs, RegisterArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_item;

fn resolve_password(password: Option<String>) -> CliResult<String> {
    match password {
        Some(password) => Ok(password),
        None => rpassword::prompt_password("Password: ")
            .map_err(|err| CliError::failure(anyhow!("failed to read password: {err}"))),
    }
}

pub(crate) async fn handle_login(ctx: &AppContext, args: LoginArgs) -> CliResult<()> {
    let credentials = LoginCredentials {
        email: args.email.trim().to_string(),
        password: resolve_password(args.password)?,
    };
    credentials.validate()?;

    let session = ctx.context.session();
    let user = session.login(&ctx.services.auth, &credentials).await?;
    if let Some(tenant) = session.token().as_deref().and_then(jwt::tenant_from_token) {
        ctx.context.tenants().set_available_tenants(vec![tenant]);
    }

    println!("Logged in as {} <{}>", user.name, user.email);
    if let Some(tenant) = ctx.context.tenants().current_tenant() {
        println!("Current tenant: {} ({})", tenant.name, tenant.id);
    }
    Ok(())
}

pub(crate) async fn handle_logout(ctx: &AppContext) -> CliResult<()> {
    let session = ctx.context.session();
    if session.is_authenticated()
        && let Err(err) = ctx.services.auth.logout().await
    {
        tracing::warn!(error = %err, "server-side logout failed; clearing local session anyway");
    }
    session.logout();
    println!("Logged out");
    Ok(())
}

pub(crate) async fn handle_whoami(ctx: &AppContext) -> CliResult<()> {
    let session = ctx.context.session();
    if session.token().is_none() {
        return Err(CliError::validation(
            "not logged in (run `vitrine login` first)",
        ));
    }
    let user = ctx.services.auth.me().await?;
    session.set_user(user.clone());
    render_item(&user, ctx.output)
}

pub(crate) async fn handle_register(ctx: &AppContext, args: RegisterArgs) -> CliResult<()> {
    let request = RegisterRequest {
        name: args.name.trim().to_string(),
        email: args.email.trim().to_string(),
        password: resolve_password(args.password)?,
    };
    request.validate()?;

    let user = ctx.services.auth.register(&request).await?;
    render_item(&user, ctx.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::app_context;
    use httpmock::prelude::*;
    use serde_json::json;
    use vitrine_client::SessionEvent;
    use vitrine_test_support::fixtures::{login_response_json, sample_user, user_json};
    use vitrine_test_support::tokens::user_token;

    fn login_args(email: &str, password: &str) -> LoginArgs {
        LoginArgs {
            email: email.to_string(),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn login_stores_session_and_defaults_tenant() {
        let server = MockServer::start_async().await;
        let token = user_token("t7", 4_102_444_800);
        let body = login_response_json(&token);
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/login");
                then.status(200).json_body(body);
            })
            .await;
        let ctx = app_context(&server);

        handle_login(&ctx, login_args("ana@example.com", "secret-123"))
            .await
            .expect("login succeeds");

        assert!(ctx.context.session().is_authenticated());
        assert_eq!(ctx.context.session().token(), Some(token));
        assert_eq!(
            ctx.context.tenants().current_tenant_id().as_deref(),
            Some("t7")
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn invalid_credentials_fail_before_any_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/login");
                then.status(200);
            })
            .await;
        let ctx = app_context(&server);

        let err = handle_login(&ctx, login_args("not-an-email", "123"))
            .await
            .expect_err("validation fails");

        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("email"));
        assert!(err.display_message().contains("password"));
        mock.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn rejected_login_is_a_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/login");
                then.status(401)
                    .json_body(json!({"statusCode": 401, "message": "Invalid credentials"}));
            })
            .await;
        let ctx = app_context(&server);

        let err = handle_login(&ctx, login_args("ana@example.com", "wrong-pass"))
            .await
            .expect_err("login rejected");

        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("Invalid credentials"));
        assert!(!ctx.context.session().is_authenticated());
    }

    #[tokio::test]
    async fn whoami_refreshes_stored_user() {
        let server = MockServer::start_async().await;
        let token = user_token("t7", 4_102_444_800);
        let login_body = login_response_json(&token);
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/login");
                then.status(200).json_body(login_body);
            })
            .await;
        let mut renamed = user_json();
        renamed["name"] = json!("Ana S.");
        let me = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/auth/me")
                    .header("authorization", format!("Bearer {token}"));
                then.status(200).json_body(renamed);
            })
            .await;
        let ctx = app_context(&server);
        handle_login(&ctx, login_args("ana@example.com", "secret-123"))
            .await
            .expect("login succeeds");

        handle_whoami(&ctx).await.expect("whoami succeeds");

        let user = ctx.context.session().user().expect("user stored");
        assert_eq!(user.name, "Ana S.");
        assert_eq!(user.id, sample_user().id);
        me.assert_async().await;
    }

    #[tokio::test]
    async fn whoami_with_stale_token_tears_session_down() {
        let server = MockServer::start_async().await;
        let login_body = login_response_json("stale-token");
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/login");
                then.status(200).json_body(login_body);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/auth/me");
                then.status(401);
            })
            .await;
        let ctx = app_context(&server);
        handle_login(&ctx, login_args("ana@example.com", "secret-123"))
            .await
            .expect("login succeeds");
        let mut events = ctx.context.signals().subscribe();

        let err = handle_whoami(&ctx).await.expect_err("401");

        assert_eq!(err.exit_code(), 3);
        assert!(!ctx.context.session().is_authenticated());
        assert_eq!(
            events.try_recv().expect("event published"),
            SessionEvent::unauthenticated()
        );
    }

    #[tokio::test]
    async fn logout_clears_session_even_if_server_fails() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/login");
                then.status(200).json_body(login_response_json("token-1"));
            })
            .await;
        let logout = server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/logout");
                then.status(500);
            })
            .await;
        let ctx = app_context(&server);
        handle_login(&ctx, login_args("ana@example.com", "secret-123"))
            .await
            .expect("login succeeds");

        handle_logout(&ctx).await.expect("logout succeeds");
        handle_logout(&ctx).await.expect("second logout is a no-op");

        assert!(!ctx.context.session().is_authenticated());
        logout.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn register_validates_then_posts() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/register");
                then.status(201).json_body(user_json());
            })
            .await;
        let ctx = app_context(&server);

        let err = handle_register(
            &ctx,
            RegisterArgs {
                name: "An".into(),
                email: "ana@example.com".into(),
                password: Some("secret-123".into()),
            },
        )
        .await
        .expect_err("name too short");
        assert_eq!(err.exit_code(), 2);

        handle_register(
            &ctx,
            RegisterArgs {
                name: "Ana Souza".into(),
                email: "ana@example.com".into(),
                password: Some("secret-123".into()),
            },
        )
        .await
        .expect("register succeeds");
        mock.assert_calls_async(1).await;
    }
}
