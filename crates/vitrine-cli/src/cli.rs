//! Argument parsing, startup wiring and command dispatch.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use url::Url;
use uuid::Uuid;
use vitrine_client::config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, parse_api_url};
use vitrine_client::{SessionEvent, SessionStatus};
use vitrine_telemetry::{LogFormat, LoggingConfig, init_logging};

use crate::client::{AppContext, CliResult};
use crate::commands::auth::{handle_login, handle_logout, handle_register, handle_whoami};
use crate::commands::catalog::{
    handle_banner_command, handle_category_command, handle_product_command,
    handle_shelf_command,
};
use crate::commands::tenants::handle_tenant_command;

/// Parses CLI arguments, executes the requested command and reports the
/// outcome. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    install_logging();

    let command_name = command_label(&cli.command);
    let notify_session_loss = reports_session_loss(&cli.command);
    let trace_id = Uuid::new_v4().to_string();
    let ctx = match AppContext::from_cli(&cli, &trace_id) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    if ctx.context.reconcile(Utc::now()) == SessionStatus::Expired {
        eprintln!("stored session has expired; run `vitrine login` to sign in again");
    }
    let mut session_events = ctx.context.signals().subscribe();

    let result = dispatch(cli.command, &ctx).await;

    if notify_session_loss {
        while let Ok(event) = session_events.try_recv() {
            if let SessionEvent::Unauthenticated { redirect_to } = event {
                eprintln!(
                    "session rejected by the server; run `vitrine login` to sign in again ({redirect_to})"
                );
            }
        }
    }

    match result {
        Ok(()) => {
            tracing::debug!(command = command_name, trace_id = %trace_id, "command completed");
            0
        }
        Err(err) => {
            let exit_code = err.exit_code();
            tracing::debug!(command = command_name, trace_id = %trace_id, exit_code, "command failed");
            eprintln!("error: {}", err.display_message());
            exit_code
        }
    }
}

fn install_logging() {
    let format = std::env::var("VITRINE_LOG_FORMAT")
        .ok()
        .and_then(|value| value.parse::<LogFormat>().ok())
        .unwrap_or_else(LogFormat::infer);
    let config = LoggingConfig {
        format,
        ..LoggingConfig::default()
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("warning: {err}");
    }
}

pub(crate) async fn dispatch(command: Command, ctx: &AppContext) -> CliResult<()> {
    match command {
        Command::Login(args) => handle_login(ctx, args).await,
        Command::Logout => handle_logout(ctx).await,
        Command::Whoami => handle_whoami(ctx).await,
        Command::Register(args) => handle_register(ctx, args).await,
        Command::Tenant(command) => handle_tenant_command(ctx, command),
        Command::Products(command) => handle_product_command(ctx, command).await,
        Command::Categories(command) => handle_category_command(ctx, command).await,
        Command::Shelves(command) => handle_shelf_command(ctx, command).await,
        Command::Banners(command) => handle_banner_command(ctx, command).await,
    }
}

pub(crate) const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Login(_) => "login",
        Command::Logout => "logout",
        Command::Whoami => "whoami",
        Command::Register(_) => "register",
        Command::Tenant(_) => "tenant",
        Command::Products(_) => "products",
        Command::Categories(_) => "categories",
        Command::Shelves(_) => "shelves",
        Command::Banners(_) => "banners",
    }
}

/// Whether a server-side session teardown during `command` deserves a
/// re-login notice. Login and logout end without a session either way.
pub(crate) const fn reports_session_loss(command: &Command) -> bool {
    !matches!(command, Command::Login(_) | Command::Logout)
}

fn parse_url(input: &str) -> Result<Url, String> {
    parse_api_url(input).map_err(|err| err.to_string())
}

fn parse_query_pair(input: &str) -> Result<(String, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| "expected format key=value".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("query key must not be empty".to_string());
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[derive(Parser)]
#[command(
    name = "vitrine",
    about = "Administrative CLI for the Vitrine catalog dashboard"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "VITRINE_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(
        long,
        global = true,
        env = "VITRINE_HTTP_TIMEOUT_SECS",
        value_parser = clap::value_parser!(u64).range(1..),
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long,
        global = true,
        env = "VITRINE_STATE_DIR",
        help = "Directory holding the persisted session and tenant selection"
    )]
    pub(crate) state_dir: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Sign in and store the session.
    Login(LoginArgs),
    /// Sign out and clear the stored session.
    Logout,
    /// Show the signed-in user as reported by the server.
    Whoami,
    /// Create a user account.
    Register(RegisterArgs),
    /// Inspect or change the selected tenant.
    #[command(subcommand)]
    Tenant(TenantCommand),
    /// Manage products.
    #[command(subcommand)]
    Products(ProductCommand),
    /// Manage categories.
    #[command(subcommand)]
    Categories(CategoryCommand),
    /// Manage shelves.
    #[command(subcommand)]
    Shelves(ShelfCommand),
    /// Manage banners.
    #[command(subcommand)]
    Banners(BannerCommand),
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, env = "VITRINE_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct RegisterArgs {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long)]
    pub(crate) password: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum TenantCommand {
    /// List tenants available to the signed-in user.
    Ls,
    /// Show the selected tenant.
    Current,
    /// Select the tenant attached to subsequent requests.
    Use(TenantUseArgs),
}

#[derive(Args)]
pub(crate) struct TenantUseArgs {
    #[arg(help = "Tenant identifier")]
    pub(crate) id: String,
    #[arg(long, help = "Display name when the tenant is not in the available list")]
    pub(crate) name: Option<String>,
}

#[derive(Args, Default)]
pub(crate) struct ListArgs {
    #[arg(
        long = "query",
        value_parser = parse_query_pair,
        help = "Extra query parameter as key=value (repeatable)"
    )]
    pub(crate) query: Vec<(String, String)>,
}

#[derive(Args)]
pub(crate) struct IdArg {
    #[arg(help = "Resource identifier")]
    pub(crate) id: i64,
}

#[derive(Args)]
pub(crate) struct SearchArgs {
    #[arg(help = "Search term")]
    pub(crate) term: String,
}

#[derive(Subcommand)]
pub(crate) enum ProductCommand {
    /// List products.
    Ls(ListArgs),
    /// Show one product.
    Get(IdArg),
    /// Search products by term.
    Search(SearchArgs),
    /// List the products of a category.
    ByCategory(IdArg),
    /// Create a product.
    Create(ProductFields),
    /// Replace a product's fields.
    Update(ProductUpdateArgs),
    /// Delete a product.
    Rm(IdArg),
}

#[derive(Args)]
pub(crate) struct ProductFields {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) description: String,
    #[arg(long)]
    pub(crate) price: f64,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub(crate) stock: i64,
    #[arg(long)]
    pub(crate) image_url: Option<String>,
}

#[derive(Args)]
pub(crate) struct ProductUpdateArgs {
    #[arg(help = "Product identifier")]
    pub(crate) id: i64,
    #[command(flatten)]
    pub(crate) fields: ProductFields,
}

#[derive(Subcommand)]
pub(crate) enum CategoryCommand {
    /// List categories.
    Ls(ListArgs),
    /// Show one category.
    Get(IdArg),
    /// Search categories by term.
    Search(SearchArgs),
    /// Create a category.
    Create(CategoryFields),
    /// Replace a category's fields.
    Update(CategoryUpdateArgs),
    /// Delete a category.
    Rm(IdArg),
}

#[derive(Args)]
pub(crate) struct CategoryFields {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) inactive: bool,
    #[arg(long = "product", help = "Product identifier to assign (repeatable)")]
    pub(crate) products: Vec<i64>,
}

#[derive(Args)]
pub(crate) struct CategoryUpdateArgs {
    #[arg(help = "Category identifier")]
    pub(crate) id: i64,
    #[command(flatten)]
    pub(crate) fields: CategoryFields,
}

#[derive(Subcommand)]
pub(crate) enum ShelfCommand {
    /// List shelves.
    Ls(ListArgs),
    /// Show one shelf.
    Get(IdArg),
    /// Search shelves by term.
    Search(SearchArgs),
    /// Create a shelf.
    Create(ShelfFields),
    /// Replace a shelf's fields.
    Update(ShelfUpdateArgs),
    /// Delete a shelf.
    Rm(IdArg),
}

#[derive(Args)]
pub(crate) struct ShelfFields {
    #[arg(long)]
    pub(crate) title: String,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub(crate) position: i64,
    #[arg(long)]
    pub(crate) inactive: bool,
    #[arg(long = "product", help = "Product identifier to place on the shelf (repeatable)")]
    pub(crate) products: Vec<i64>,
}

#[derive(Args)]
pub(crate) struct ShelfUpdateArgs {
    #[arg(help = "Shelf identifier")]
    pub(crate) id: i64,
    #[command(flatten)]
    pub(crate) fields: ShelfFields,
}

#[derive(Subcommand)]
pub(crate) enum BannerCommand {
    /// List banners.
    Ls(ListArgs),
    /// Show one banner.
    Get(IdArg),
    /// Search banners by term.
    Search(SearchArgs),
    /// Create a banner.
    Create(BannerFields),
    /// Replace a banner's fields.
    Update(BannerUpdateArgs),
    /// Delete a banner.
    Rm(IdArg),
}

#[derive(Args)]
pub(crate) struct BannerFields {
    #[arg(long)]
    pub(crate) title: String,
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) position: i64,
    #[arg(long)]
    pub(crate) inactive: bool,
    #[arg(long, help = "Image file to upload")]
    pub(crate) image: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct BannerUpdateArgs {
    #[arg(help = "Banner identifier")]
    pub(crate) id: i64,
    #[command(flatten)]
    pub(crate) fields: BannerFields,
    #[arg(long, conflicts_with = "image", help = "Remove the current image")]
    pub(crate) clear_image: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}
