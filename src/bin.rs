//! Binary entry point for `persona-relay`.
//!
//! Parses the command line, installs the tracing subscriber, loads the
//! configuration and hands over to [`persona_relay::start`].

use clap::Parser;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use persona_relay::base::{config::Config, types::Void};
use tracing::info;
use tracing_subscriber::{Layer, filter::LevelFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Persona-relay: relays triggered chat messages to an LLM under a switchable persona.
///
/// Settings come from a TOML file or `PERSONA_RELAY_*` environment variables.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file path. Defaults to `.hidden/config.toml` when present.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Log verbosity: none is INFO, `-v` is DEBUG, `-vv` and up is TRACE.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Skip the OTLP span exporter and log to stdout only.
    #[arg(long)]
    no_otlp: bool,
    /// Load and validate the configuration, then exit without connecting.
    #[arg(long)]
    check_config: bool,
}

impl Args {
    fn level_filter(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Install the stdout layer and, unless disabled, the OTLP layer.
fn init_tracing(args: &Args) -> Void {
    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    let otel = if args.no_otlp {
        None
    } else {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("persona-relay");

        Some(tracing_opentelemetry::layer().with_tracer(tracer).boxed())
    };

    tracing_subscriber::registry()
        .with(otel)
        .with(args.level_filter())
        .with(stdout)
        .try_init()?;

    Ok(())
}

#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    init_tracing(&args)?;

    let config = Config::load(args.config.as_deref())?;

    if args.check_config {
        info!("Configuration is valid (bot name: {}, model: {}).", config.bot_name, config.openai_model);
        return Ok(());
    }

    persona_relay::start(config).await
}

// Tests.
