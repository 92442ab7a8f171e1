use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use capi_import::{Config, ProviderContext, ProviderType, images};

#[derive(Parser)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Rewrite upstream provider releases into release assets.
    Import {
        /// Import settings. The builtin provider list is used when omitted.
        #[clap(long)]
        config: Option<PathBuf>,
        /// Directory holding `<provider>/<version>/` release mirrors.
        #[clap(long)]
        mirror: PathBuf,
        /// Root the configured output and catalog paths are relative to.
        #[clap(long, default_value = ".")]
        root: PathBuf,
        /// Only import the provider with this name.
        #[clap(long)]
        provider: Option<String>,
    },
    /// Print the substitution key of a container image.
    ImageKey {
        #[clap(long)]
        name: String,
        #[clap(long, value_parser = parse_provider_type)]
        r#type: ProviderType,
        image: String,
    },
}

fn parse_provider_type(s: &str) -> Result<ProviderType, String> {
    serde_yaml::from_str(s).map_err(|_| {
        format!("unknown provider type `{s}`, expected one of core, controlplane, bootstrap, infrastructure")
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match args.command {
        Command::Import {
            config,
            mirror,
            root,
            provider,
        } => {
            let config = match config {
                Some(path) => Config::load(&path)
                    .await
                    .with_context(|| format!("failed to load config {}", path.display()))?,
                None => Config::builtin().clone(),
            };

            let outcomes =
                capi_import::import_providers(&config, &mirror, &root, provider.as_deref())
                    .await?;
            tracing::info!(providers = outcomes.len(), "done");
        }
        Command::ImageKey {
            name,
            r#type,
            image,
        } => {
            let ctx = ProviderContext::new(name, r#type, "");
            println!("{}", images::image_key(&ctx, &image));
        }
    }

    Ok(())
}
