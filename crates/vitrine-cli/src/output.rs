//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use serde::Serialize;
use vitrine_api_models::{Banner, Category, Product, Shelf, Tenant, User};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Row-oriented view of an entity for table output.
pub(crate) trait TableRow {
    const HEADER: &'static str;

    fn row(&self) -> String;
}

impl TableRow for Product {
    const HEADER: &'static str = "ID     ACTIVE  PRICE       STOCK  NAME";

    fn row(&self) -> String {
        format!(
            "{:<6} {:<7} {:>10.2} {:>6}  {}",
            self.id,
            yes_no(self.is_active),
            self.price,
            self.stock,
            self.name
        )
    }
}

impl TableRow for Category {
    const HEADER: &'static str = "ID     ACTIVE  PRODUCTS  NAME";

    fn row(&self) -> String {
        format!(
            "{:<6} {:<7} {:>8}  {}",
            self.id,
            yes_no(self.is_active),
            self.products.len(),
            self.name
        )
    }
}

impl TableRow for Shelf {
    const HEADER: &'static str = "ID     ACTIVE  POS  PRODUCTS  TITLE";

    fn row(&self) -> String {
        format!(
            "{:<6} {:<7} {:>3}  {:>8}  {}",
            self.id,
            yes_no(self.is_active),
            self.position,
            self.products.len(),
            self.title
        )
    }
}

impl TableRow for Banner {
    const HEADER: &'static str = "ID     ACTIVE  POS  TITLE / IMAGE";

    fn row(&self) -> String {
        let image = if self.image_url.is_empty() {
            "<no image>"
        } else {
            self.image_url.as_str()
        };
        format!(
            "{:<6} {:<7} {:>3}  {} ({image})",
            self.id,
            yes_no(self.is_active),
            self.position,
            self.title
        )
    }
}

impl TableRow for Tenant {
    const HEADER: &'static str = "ID                                    NAME";

    fn row(&self) -> String {
        format!("{:<37} {}", self.id, self.name)
    }
}

impl TableRow for User {
    const HEADER: &'static str = "ID                    ROLE      EMAIL / NAME";

    fn row(&self) -> String {
        format!("{:<21} {:<9} {} ({})", self.id, self.role, self.email, self.name)
    }
}

const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_list<T: Serialize + TableRow>(items: &[T], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(items)?,
        OutputFormat::Table => {
            println!("{}", T::HEADER);
            for item in items {
                println!("{}", item.row());
            }
            if items.is_empty() {
                println!("(none)");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_item<T: Serialize + TableRow>(item: &T, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(item)?,
        OutputFormat::Table => {
            println!("{}", T::HEADER);
            println!("{}", item.row());
        }
    }
    Ok(())
}
