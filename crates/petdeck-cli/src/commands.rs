use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;

use petdeck_catalog::{AssetService, Catalog};
use petdeck_server::{PetdeckServer, ServerConfig};
use petdeck_types::Bucket;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        Command::Types => Ctx::new(&config, cli.user, cli.format)?.types(),
        Command::Upload(args) => Ctx::new(&config, cli.user, cli.format)?.upload(args),
        Command::Delete(args) => Ctx::new(&config, cli.user, cli.format)?.delete(args),
        Command::CreateType(args) => Ctx::new(&config, cli.user, cli.format)?.create_type(args),
        Command::DeleteType(args) => Ctx::new(&config, cli.user, cli.format)?.delete_type(args),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => {
            let mut config = ServerConfig::default();
            config.apply_env();
            config
        }
    };
    if let Some(root) = &cli.root {
        config.assets.root = root.clone();
    }
    Ok(config)
}

fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind.parse().with_context(|| format!("invalid bind address {bind:?}"))?;
    }
    if args.desktop {
        config.desktop_mode = true;
    }
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(PetdeckServer::new(config).serve())?;
    Ok(())
}

/// Guess an upload content type from a file extension.
fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

struct Ctx {
    service: AssetService,
    bucket: Bucket,
    format: OutputFormat,
}

impl Ctx {
    /// Offline commands act on the member's bucket, or the offline bucket.
    fn new(config: &ServerConfig, user: Option<i64>, format: OutputFormat) -> anyhow::Result<Self> {
        let bucket = match user {
            Some(id) => Bucket::for_member(id)?,
            None => Bucket::offline(),
        };
        Ok(Self {
            service: config.build_service()?,
            bucket,
            format,
        })
    }

    fn emit(&self, value: serde_json::Value, text: impl FnOnce()) {
        match self.format {
            OutputFormat::Json => println!("{value}"),
            OutputFormat::Text => text(),
        }
    }

    fn types(&self) -> anyhow::Result<()> {
        let catalog = self.service.list_types(&self.bucket)?;
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&*catalog)?),
            OutputFormat::Text => print_catalog(&self.bucket, &catalog),
        }
        Ok(())
    }

    fn upload(&self, args: UploadArgs) -> anyhow::Result<()> {
        let data = std::fs::read(&args.file)
            .with_context(|| format!("reading {}", args.file.display()))?;
        let content_type = args
            .content_type
            .as_deref()
            .unwrap_or_else(|| guess_content_type(&args.file));
        let url = self
            .service
            .upload_image(&self.bucket, &args.pet_type, args.level, content_type, &data)?;
        self.emit(json!({ "success": true, "url": url }), || {
            println!("{} Uploaded level {} of {}", "✓".green().bold(), args.level, args.pet_type.yellow());
            println!("  URL: {}", url.cyan());
        });
        Ok(())
    }

    fn delete(&self, args: LevelArgs) -> anyhow::Result<()> {
        let deleted = self
            .service
            .delete_image(&self.bucket, &args.pet_type, args.level)?;
        self.emit(json!({ "success": true, "deleted": deleted }), || {
            if deleted {
                println!("{} Deleted level {} of {}", "✓".green().bold(), args.level, args.pet_type.yellow());
            } else {
                println!("Level {} of {} already deleted.", args.level, args.pet_type.yellow());
            }
        });
        Ok(())
    }

    fn create_type(&self, args: CreateTypeArgs) -> anyhow::Result<()> {
        let stages = (!args.stages.is_empty()).then_some(args.stages.as_slice());
        let id = self
            .service
            .create_type(&self.bucket, &args.id, args.name.as_deref(), stages)?;
        self.emit(json!({ "success": true, "id": id }), || {
            println!("{} Created pet type {}", "✓".green().bold(), id.to_string().yellow());
        });
        Ok(())
    }

    fn delete_type(&self, args: TypeArgs) -> anyhow::Result<()> {
        self.service.delete_type(&self.bucket, &args.pet_type)?;
        self.emit(json!({ "success": true }), || {
            println!("{} Deleted pet type {}", "✓".green().bold(), args.pet_type.yellow());
        });
        Ok(())
    }
}

fn print_catalog(bucket: &Bucket, catalog: &Catalog) {
    println!("Bucket {}: {} pet types", bucket.to_string().bold(), catalog.types.len());
    for entry in &catalog.types {
        println!(
            "\n{} {} ({} images)",
            entry.id.to_string().yellow().bold(),
            entry.name.dimmed(),
            entry.image_count
        );
        for (level, url) in &entry.images.0 {
            let stage = entry
                .stage_names
                .get(usize::from(level.get()) - 1)
                .map(String::as_str)
                .unwrap_or("");
            println!("  {:>2}  {}  {}", level.get(), url.cyan(), stage);
        }
    }
}
