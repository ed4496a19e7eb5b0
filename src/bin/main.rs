//! Asset resolver CLI
//!
//! Composes local packs, an optional bridged external loader and the vanilla
//! asset bundle into one resolver, then inspects or extracts assets with it.

use clap::{Parser, Subcommand};
use minecraft_asset_resolver::{
    create_multiloader, ArchiveLoader, AssetCache, AssetResolver, BridgeLoader, DirectoryLoader,
    MemoLoader, ModelDumpRenderer, Multiloader, RemoteAssetSource, RendererOptions,
    RenderingEngine, ResourceLoader, ResourceLocation,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mc-asset-resolver")]
#[command(author, version, about = "Resolve Minecraft assets from layered sources", long_about = None)]
struct Cli {
    /// Local resource roots or pack ZIP/jar files, highest priority first
    #[arg(short, long = "pack")]
    packs: Vec<PathBuf>,

    /// External loader command, spoken to over stdin/stdout (JSON lines)
    #[arg(long)]
    bridge: Option<String>,

    /// minecraft-assets branch or tag for the vanilla fallback
    #[arg(long, default_value = "master")]
    assets_version: String,

    /// Game version inside the asset bundle (e.g. "1.19.1"); enables the
    /// vanilla fallback source
    #[arg(long)]
    game_version: Option<String>,

    /// Cache directory for remote fetches
    #[arg(long, default_value = ".mc-asset-cache")]
    cache_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the raw or compiled model JSON for a resource location
    Json {
        /// Resource location (e.g. "minecraft:block/stone" or "mymod:wand")
        location: String,

        /// Fold the model's inheritance chain before printing
        #[arg(long)]
        compiled: bool,

        /// Print the blockstate definition instead of the model
        #[arg(long)]
        blockstate: bool,
    },

    /// Extract a texture to a file
    Texture {
        /// Resource location (e.g. "minecraft:block/stone")
        location: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the browsable URL for a raw vanilla asset key
    Url {
        /// Asset key (e.g. "minecraft/item/stick.png")
        asset_key: String,
    },

    /// Write the compiled model of a target into an output directory
    Dump {
        /// Resource location (e.g. "minecraft:campfire")
        location: String,

        /// Output directory
        #[arg(short, long, default_value = "out")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    // buildURL needs only the remote source, not a composed loader
    if let Commands::Url { asset_key } = &cli.command {
        let source = vanilla_source(&cli)?
            .ok_or("the url command needs --game-version to pick an asset bundle")?;
        println!("{}", source.build_url(asset_key)?);
        return Ok(());
    }

    let loader = MemoLoader::new(compose_loaders(&cli)?);

    match &cli.command {
        Commands::Json {
            location,
            compiled,
            blockstate,
        } => {
            let location = ResourceLocation::parse(location)?;
            let resolver = AssetResolver::new(loader);

            let outcome = if *blockstate {
                resolver.loader().load_json(&location.blockstate_path())
            } else if *compiled {
                resolver
                    .compiled_model(&location)
                    .and_then(|model| Ok(serde_json::to_string_pretty(&model)?))
            } else {
                resolver.loader().load_json(&location.model_path())
            };

            let closed = resolver.into_loader().close();
            println!("{}", outcome?);
            closed?;
        }

        Commands::Texture { location, output } => {
            let location = ResourceLocation::parse(location)?;
            let resolver = AssetResolver::new(loader);

            let outcome = resolver.texture(&location);
            let closed = resolver.into_loader().close();

            let bytes = outcome?;
            fs::write(output, &bytes)?;
            println!("Wrote {} bytes to {:?}", bytes.len(), output);
            closed?;
        }

        Commands::Dump { location, out_dir } => {
            let location = ResourceLocation::parse(location)?;
            let mut renderer =
                ModelDumpRenderer::new(loader, RendererOptions::new(out_dir.clone()));

            let outcome = renderer.render_to_file(&location.namespace, Some(&location.path));
            renderer.destroy_renderer();
            let closed = renderer.into_loader().close();

            println!("Dumped {} to {:?}", location, outcome?);
            closed?;
        }

        Commands::Url { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Builds the composed loader: local packs first (in flag order), then the
/// bridged external loader, then the cached vanilla bundle.
fn compose_loaders(cli: &Cli) -> Result<Multiloader, Box<dyn std::error::Error>> {
    let mut loaders: Vec<Box<dyn ResourceLoader>> = Vec::new();

    for pack in &cli.packs {
        if pack.is_dir() {
            loaders.push(Box::new(DirectoryLoader::new(pack)));
        } else {
            loaders.push(Box::new(ArchiveLoader::open(pack)?));
        }
    }

    if let Some(command) = &cli.bridge {
        loaders.push(Box::new(BridgeLoader::spawn_shell(command)?));
    }

    if let Some(source) = vanilla_source(cli)? {
        loaders.push(Box::new(source));
    }

    if loaders.is_empty() {
        return Err("no sources configured; pass --pack, --bridge or --game-version".into());
    }

    Ok(create_multiloader(loaders))
}

fn vanilla_source(cli: &Cli) -> Result<Option<RemoteAssetSource>, Box<dyn std::error::Error>> {
    match &cli.game_version {
        Some(game_version) => {
            let cache = AssetCache::new(&cli.cache_dir);
            let source = RemoteAssetSource::fetch_all(&cli.assets_version, game_version, cache)?;
            Ok(Some(source))
        }
        None => Ok(None),
    }
}
