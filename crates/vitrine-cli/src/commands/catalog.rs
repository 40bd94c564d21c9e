//! Catalog commands: products, categories, shelves and banners.

use std::path::Path;

use anyhow::anyhow;
use bytes::Bytes;
use serde::Serialize;
use vitrine_api_models::{
    BannerFormData, CategoryFormData, ProductFormData, ShelfFormData, Validate,
};
use vitrine_client::services::{BannerImage, banner_form};
use vitrine_client::{Payload, RequestOptions, Resource, ResourceService};

use crate::cli::{
    BannerCommand, BannerFields, CategoryCommand, CategoryFields, ListArgs, OutputFormat,
    ProductCommand, ProductFields, ShelfCommand, ShelfFields,
};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{TableRow, print_json, render_item, render_list};

fn list_options(args: ListArgs) -> RequestOptions {
    args.query
        .into_iter()
        .fold(RequestOptions::new(), |options, (key, value)| {
            options.query(key, value)
        })
}

fn json_payload<B: Serialize + Validate>(form: &B) -> CliResult<Payload> {
    form.validate()?;
    Ok(Payload::json(form)?)
}

async fn delete_entity<T>(ctx: &AppContext, service: &ResourceService<T>, id: i64) -> CliResult<()>
where
    T: Resource,
{
    let answer = service.delete(id).await?;
    if ctx.output == OutputFormat::Json && !answer.is_null() {
        return print_json(&answer);
    }
    println!("Deleted {} {id}", T::PATH.trim_start_matches('/'));
    Ok(())
}

async fn show_entity<T>(ctx: &AppContext, service: &ResourceService<T>, id: i64) -> CliResult<()>
where
    T: Resource + Serialize + TableRow,
{
    render_item(&service.get(id).await?, ctx.output)
}

fn product_form(fields: ProductFields) -> ProductFormData {
    ProductFormData {
        name: fields.name.trim().to_string(),
        description: fields.description.trim().to_string(),
        price: fields.price,
        stock: fields.stock,
        image_url: fields.image_url.filter(|url| !url.trim().is_empty()),
    }
}

fn category_form(fields: CategoryFields) -> CategoryFormData {
    CategoryFormData {
        name: fields.name.trim().to_string(),
        is_active: !fields.inactive,
        products_ids: fields.products,
    }
}

fn shelf_form(fields: ShelfFields) -> ShelfFormData {
    ShelfFormData {
        title: fields.title.trim().to_string(),
        position: fields.position,
        is_active: !fields.inactive,
        products_ids: fields.products,
    }
}

pub(crate) async fn handle_product_command(
    ctx: &AppContext,
    command: ProductCommand,
) -> CliResult<()> {
    let products = &ctx.services.products;
    match command {
        ProductCommand::Ls(args) => {
            render_list(&products.list(list_options(args)).await?, ctx.output)
        }
        ProductCommand::Get(args) => show_entity(ctx, products, args.id).await,
        ProductCommand::Search(args) => {
            render_list(&products.search(&args.term).await?, ctx.output)
        }
        ProductCommand::ByCategory(args) => {
            render_list(&products.by_category(args.id).await?, ctx.output)
        }
        ProductCommand::Create(fields) => {
            let payload = json_payload(&product_form(fields))?;
            render_item(&products.create(payload).await?, ctx.output)
        }
        ProductCommand::Update(args) => {
            let payload = json_payload(&product_form(args.fields))?;
            render_item(&products.update(args.id, payload).await?, ctx.output)
        }
        ProductCommand::Rm(args) => delete_entity(ctx, products, args.id).await,
    }
}

pub(crate) async fn handle_category_command(
    ctx: &AppContext,
    command: CategoryCommand,
) -> CliResult<()> {
    let categories = &ctx.services.categories;
    match command {
        CategoryCommand::Ls(args) => {
            render_list(&categories.list(list_options(args)).await?, ctx.output)
        }
        CategoryCommand::Get(args) => show_entity(ctx, categories, args.id).await,
        CategoryCommand::Search(args) => {
            render_list(&categories.search(&args.term).await?, ctx.output)
        }
        CategoryCommand::Create(fields) => {
            let payload = json_payload(&category_form(fields))?;
            render_item(&categories.create(payload).await?, ctx.output)
        }
        CategoryCommand::Update(args) => {
            let payload = json_payload(&category_form(args.fields))?;
            render_item(&categories.update(args.id, payload).await?, ctx.output)
        }
        CategoryCommand::Rm(args) => delete_entity(ctx, categories, args.id).await,
    }
}

pub(crate) async fn handle_shelf_command(ctx: &AppContext, command: ShelfCommand) -> CliResult<()> {
    let shelves = &ctx.services.shelves;
    match command {
        ShelfCommand::Ls(args) => render_list(&shelves.list(list_options(args)).await?, ctx.output),
        ShelfCommand::Get(args) => show_entity(ctx, shelves, args.id).await,
        ShelfCommand::Search(args) => render_list(&shelves.search(&args.term).await?, ctx.output),
        ShelfCommand::Create(fields) => {
            let payload = json_payload(&shelf_form(fields))?;
            render_item(&shelves.create(payload).await?, ctx.output)
        }
        ShelfCommand::Update(args) => {
            let payload = json_payload(&shelf_form(args.fields))?;
            render_item(&shelves.update(args.id, payload).await?, ctx.output)
        }
        ShelfCommand::Rm(args) => delete_entity(ctx, shelves, args.id).await,
    }
}

fn image_content_type(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime.to_string())
}

fn read_image(path: &Path) -> CliResult<BannerImage> {
    let bytes = std::fs::read(path).map_err(|err| {
        CliError::failure(anyhow!(
            "failed to read image file '{}': {err}",
            path.display()
        ))
    })?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image")
        .to_string();
    Ok(BannerImage::Upload {
        file_name,
        content_type: image_content_type(path),
        bytes: Bytes::from(bytes),
    })
}

/// Multipart payload for a banner submission. The form is validated before
/// the image file is read.
fn banner_payload(fields: BannerFields, clear_image: bool) -> CliResult<Payload> {
    let form = BannerFormData {
        title: fields.title.trim().to_string(),
        position: fields.position,
        is_active: !fields.inactive,
    };
    form.validate()?;
    let image = match (fields.image, clear_image) {
        (Some(path), _) => read_image(&path)?,
        (None, true) => BannerImage::Clear,
        (None, false) => BannerImage::Keep,
    };
    Ok(Payload::from(banner_form(&form, image)))
}

pub(crate) async fn handle_banner_command(
    ctx: &AppContext,
    command: BannerCommand,
) -> CliResult<()> {
    let banners = &ctx.services.banners;
    match command {
        BannerCommand::Ls(args) => render_list(&banners.list(list_options(args)).await?, ctx.output),
        BannerCommand::Get(args) => show_entity(ctx, banners, args.id).await,
        BannerCommand::Search(args) => render_list(&banners.search(&args.term).await?, ctx.output),
        BannerCommand::Create(fields) => {
            let payload = banner_payload(fields, false)?;
            render_item(&banners.create(payload).await?, ctx.output)
        }
        BannerCommand::Update(args) => {
            let payload = banner_payload(args.fields, args.clear_image)?;
            render_item(&banners.update(args.id, payload).await?, ctx.output)
        }
        BannerCommand::Rm(args) => delete_entity(ctx, banners, args.id).await,
    }
}
