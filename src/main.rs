use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::WrapErr};

use plex_playlist_sync::{
    config::Config,
    logging::init_tracing,
    services::{
        membership::PathMembership,
        plex::{PlexPlaylistResolver, client::PlexHttpAdapter},
        sync::{PlaylistSync, PlaylistSyncOptions, refresh_remote_library},
    },
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "PLEX_PLAYLIST_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter directive, e.g. `info` or `plex_playlist_sync=debug`
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// Export spans to this OTLP/gRPC endpoint
    #[arg(long, global = true, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Parse `OLD=NEW` into a pair of paths.
fn parse_move(s: &str) -> Result<(PathBuf, PathBuf), String> {
    match s.split_once('=') {
        Some((old, new)) if !old.is_empty() && !new.is_empty() => {
            Ok((PathBuf::from(old), PathBuf::from(new)))
        }
        _ => Err(format!("`{}` is not of the form OLD=NEW", s)),
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the audio playlists of the configured Plex library
    Playlists,
    /// Print the local paths of a Plex playlist
    Query {
        /// Name of the Plex playlist
        name: String,
    },
    /// Read paths from stdin and print those that belong to a Plex playlist
    Filter {
        /// Name of the Plex playlist
        name: String,
    },
    /// Apply moved and removed files to the playlists in the playlist directory
    Rewrite {
        /// A moved file, as OLD=NEW
        #[arg(long = "moved", value_parser = parse_move)]
        moved: Vec<(PathBuf, PathBuf)>,

        /// A removed file
        #[arg(long = "removed")]
        removed: Vec<PathBuf>,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

fn plex_resolver(config: &Config) -> Result<PlexPlaylistResolver<PlexHttpAdapter>> {
    let client = PlexHttpAdapter::from_config(&config.plex)?;
    let (remote_root, local_root) = config.translation_roots();
    Ok(PlexPlaylistResolver::new(client, remote_root, local_root))
}

async fn list_playlists(config: &Config) -> Result<()> {
    let resolver = plex_resolver(config)?;
    let section_key = match &config.plex.library_name {
        Some(library_name) => Some(resolver.library_section_key(library_name).await?),
        None => None,
    };

    for playlist in resolver.list_playlists(section_key.as_deref()).await? {
        match playlist.leaf_count {
            Some(count) => println!("{} ({} tracks)", playlist.title, count),
            None => println!("{}", playlist.title),
        }
    }
    Ok(())
}

async fn rewrite(config: &Config, moved: Vec<(PathBuf, PathBuf)>, removed: Vec<PathBuf>) {
    let mut options = PlaylistSyncOptions::from_config(config);
    // An explicit run applies changes regardless of the auto setting.
    options.auto = true;

    let mut sync = PlaylistSync::new(options);
    for (source, destination) in moved {
        sync.on_item_moved(source, destination);
    }
    for path in removed {
        sync.on_item_removed(path);
    }
    let summary = sync.on_run_end();

    println!(
        "Updated {} of {} playlists ({} changed, {} removed, {} failed)",
        summary.playlists_updated,
        summary.playlists_checked,
        summary.changes,
        summary.deletions,
        summary.failures.len()
    );

    if !config.playlist.refresh_library || summary.playlists_updated == 0 {
        return;
    }
    let Some(library_name) = &config.plex.library_name else {
        tracing::warn!("refresh_library is set but no plex.library_name is configured");
        return;
    };
    match plex_resolver(config) {
        Ok(resolver) => refresh_remote_library(&resolver, library_name).await,
        Err(e) => tracing::warn!("Skipping Plex library refresh: {:#}", e),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(
        "plex-playlist-sync",
        args.otlp_endpoint.as_deref(),
        &args.log_level,
    )?;

    if let Commands::Config(config_commands) = &args.command {
        match config_commands {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                tracing::info!("Default config at {}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        }
        return Ok(());
    }

    tracing::debug!("Loading configuration");
    let config = {
        if let Some(config) = &args.config {
            Config::from_file(config)
        } else {
            Config::load()
        }
    }
    .wrap_err("Failed to load plex-playlist-sync config")?;

    match args.command {
        Commands::Playlists => {
            // Remote failures are reported, never fatal.
            if let Err(e) = list_playlists(&config).await {
                tracing::error!("Failed to list Plex playlists: {:#}", e);
            }
        }
        Commands::Query { name } => {
            let membership = PathMembership::from_config(&config, &name).await;
            for path in membership.paths().iter() {
                println!("{}", path.display());
            }
        }
        Commands::Filter { name } => {
            let membership = PathMembership::from_config(&config, &name).await;
            membership
                .filter_paths(std::io::stdin().lock(), std::io::stdout().lock())
                .wrap_err("Failed to filter paths from stdin")?;
        }
        Commands::Rewrite { moved, removed } => rewrite(&config, moved, removed).await,
        Commands::Config(_) => unreachable!("handled before config is loaded"),
    }

    if let Some(provider) = tracer_provider {
        provider
            .shutdown()
            .wrap_err("Failed to flush OpenTelemetry spans")?;
    }

    Ok(())
}
