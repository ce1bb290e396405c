// Logging module, powered by tracing-subscriber
//
// Library crates log through the `log` facade. A compatibility bridge
// (`tracing_log::LogTracer`) routes those calls through the tracing
// subscriber installed here.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use sessiongate_configs::LoggingSettings;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact text format: timestamp LEVEL target - message
    Compact,
    /// JSON Lines format for structured logging
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Build the `EnvFilter` from the base level, hardcoded noisy-crate
/// overrides, and optional per-target overrides from config.
fn build_env_filter(
    level: &str,
    target_levels: &HashMap<String, String>,
) -> anyhow::Result<EnvFilter> {
    let mut directives = vec![level.to_string()];

    // Suppress noisy third-party crates
    let noisy: &[(&str, &str)] = &[
        ("actix_server", "warn"),
        ("actix_web", "warn"),
        ("actix_http", "warn"),
        ("h2", "warn"),
        ("redis", "warn"),
        ("mio", "warn"),
    ];
    for (target, lvl) in noisy {
        directives.push(format!("{}={}", target, lvl));
    }

    // The access log is the point of the Logger middleware
    directives.push("actix_web::middleware::logger=info".to_string());

    // Per-target overrides from config.toml
    let mut targets: Vec<_> = target_levels.iter().collect();
    targets.sort();
    for (target, lvl) in targets {
        directives.push(format!("{}={}", target, lvl));
    }

    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| anyhow::anyhow!("Invalid tracing filter '{}': {}", filter_str, e))
}

fn fmt_layer<W>(format: LogFormat, writer: W, ansi: bool, filter: EnvFilter) -> BoxedLayer
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_thread_names(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_ansi(ansi)
            .with_writer(writer)
            .with_target(true)
            .with_thread_names(true)
            .with_filter(filter)
            .boxed(),
    }
}

/// Initialize logging based on configuration.
///
/// Sets up `tracing-subscriber` with:
///  - a console layer on stdout (when `log_to_console` is true)
///  - a file layer writing `server.log` under `logs_path` (when `log_to_file` is true)
///  - the `tracing_log::LogTracer` bridge so that all `log::*` calls are captured
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    let format = LogFormat::parse(&settings.format);
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if settings.log_to_console {
        layers.push(fmt_layer(
            format,
            std::io::stdout,
            true,
            build_env_filter(&settings.level, &settings.targets)?,
        ));
    }

    let file_path = Path::new(&settings.logs_path).join("server.log");
    if settings.log_to_file {
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let log_file = OpenOptions::new().create(true).append(true).open(&file_path)?;
        layers.push(fmt_layer(
            format,
            Mutex::new(log_file),
            false,
            build_env_filter(&settings.level, &settings.targets)?,
        ));
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    // Bridge `log` crate → tracing; ok() in case try_init already did
    tracing_log::LogTracer::init().ok();

    tracing::trace!(
        "Logging initialized: level={}, console={}, file={}",
        settings.level,
        settings.log_to_console,
        if settings.log_to_file {
            file_path.display().to_string()
        } else {
            "off".to_string()
        }
    );

    Ok(())
}
