use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use postfs::config::Config;
use postfs::fs::{PathCodec, PostFileSystem};
use postfs::fuse::{MountOptions, PostBackend};
use postfs::storage::{DatabasePool, PostOperations};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "postfs", version, about = "Mount WordPress posts as a flat directory")]
struct Cli {
    /// Configuration file (defaults to ./postfs.toml when present)
    #[arg(long, short, global = true, env = "POSTFS_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mount the posts table and serve it until Ctrl-C
    Mount {
        /// Directory to mount at (overrides fuse.mount_point)
        mountpoint: Option<PathBuf>,

        #[arg(long)]
        allow_other: bool,

        #[arg(long)]
        read_only: bool,
    },
    /// Detach a mount left behind by a crashed process
    Unmount {
        /// Mounted directory (defaults to fuse.mount_point)
        mountpoint: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "postfs=debug,info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.json_logs);

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Command::Mount { mountpoint, allow_other, read_only } => {
            if let Some(mountpoint) = mountpoint {
                config.fuse.mount_point = mountpoint.display().to_string();
            }
            config.fuse.allow_other |= allow_other;
            config.fuse.read_only |= read_only;
            run_mount(config)
        }
        Command::Unmount { mountpoint } => match mountpoint {
            Some(mountpoint) => postfs::fuse::unmount(mountpoint),
            None => postfs::fuse::unmount(&config.fuse.mount_point),
        },
    }
}

fn run_mount(config: Config) -> Result<()> {
    tracing::info!("Starting postfs - WordPress posts as files");

    // FUSE callbacks block_on this runtime from fuser's session thread;
    // main must not be inside it.
    let runtime = Arc::new(
        tokio::runtime::Builder::new_multi_thread()
            .thread_name("postfs-fuse")
            .enable_all()
            .build()
            .context("Failed to build tokio runtime")?,
    );

    let pool = runtime.block_on(async {
        let pool = DatabasePool::new(&config.database).await?;
        let version = pool.check_version().await?;
        tracing::info!(version = %version, "Connected to database");
        anyhow::Ok(pool)
    })?;

    let store =
        PostOperations::new(&pool, &config.database.table_prefix, config.posts.defaults())?;
    let fs = PostFileSystem::new(Arc::new(store), PathCodec::new(config.cache.max_entries));
    let backend = Arc::new(PostBackend::new(fs, &config.posts));

    let options = MountOptions {
        allow_other: config.fuse.allow_other,
        read_only: config.fuse.read_only,
        ..Default::default()
    };

    let session =
        postfs::fuse::mount(backend, &config.fuse.mount_point, options, Arc::clone(&runtime))?;

    tracing::info!(mountpoint = %config.fuse.mount_point, "Press Ctrl-C to unmount");
    runtime.block_on(tokio::signal::ctrl_c()).context("Failed to listen for Ctrl-C")?;

    tracing::info!("Shutting down");
    drop(session);
    runtime.block_on(pool.close());

    Ok(())
}
