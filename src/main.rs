use clap::{Parser, Subcommand};
use kreate_server::{config, imaging, server};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    if env!("KREATE_RELEASE_BUILD") == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("KREATE_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once; clap reads the version a single time
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "kreate-server")]
#[command(about = "HTTP service for single-shot image edits")]
#[command(long_about = "\
HTTP service for single-shot image edits

Each endpoint takes one multipart upload (field `image`) plus a few form
fields and answers with a PNG:

  POST /remove-background   image
  POST /crop-image          image, x, y, width, height, circular
  POST /sharpen-image       image, intensity (0-1)
  POST /black-and-white     image, intensity (0-1)
  POST /adjust-hue          image, hue_shift (degrees)
  POST /adjust-contrast     image, factor
  POST /adjust-saturation   image, factor
  POST /invert-colors       image

Errors come back as JSON: {\"error\": \"...\"}.

Run 'kreate-server gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Address to bind, overriding [server] host
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overriding [server] port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Load and validate the config, then print the resolved values
    CheckConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { host, port } => {
            let mut config = config::load_config(cli.config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            init_logging(&config.logging);
            init_thread_pool(&config.processing);
            info!(version = version_string(), "starting kreate-server");

            let state = server::AppState {
                segmenter: imaging::load_segmenter(&config.segmentation)?,
                max_upload_bytes: config.server.max_upload_bytes,
            };

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(server::serve(&config.bind_address(), state))?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::CheckConfig => {
            let config = config::load_config(cli.config.as_deref())?;
            print!("{}", config::to_toml_string(&config)?);
            eprintln!("==> Config is valid");
        }
    }

    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `[logging] level` when set.
fn init_logging(logging: &config::LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
