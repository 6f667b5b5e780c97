mod api;
mod bootstrap;
mod cli;
mod state;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command, ConfigCommand};
use gw_domain::config::ConfigSeverity;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let (config, _path) = cli::load_config()?;
            init_tracing(config.observability.otlp_endpoint.as_deref());
            run_server(Arc::new(config)).await
        }
        Command::Doctor => {
            let (config, path) = cli::load_config()?;
            let passed = cli::doctor::run(&config, &path).await?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Config { command: ConfigCommand::Validate } => {
            let (config, path) = cli::load_config()?;
            if !cli::config::validate(&config, &path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Config { command: ConfigCommand::Show } => {
            let (config, _path) = cli::load_config()?;
            cli::config::show(&config)
        }
        Command::Version => {
            println!("voice-ai-gateway {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Initializes structured JSON logging, optionally layering an
/// OpenTelemetry OTLP exporter on top when `otlp_endpoint` is set.
/// Grounded on `sa_gateway::main::init_tracing` for the fmt+filter setup
/// and on the OTLP exporter/layer wiring shown in `querymt-utils::telemetry`.
fn init_tracing(otlp_endpoint: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,gateway=debug"));
    let fmt_layer = tracing_subscriber::fmt::layer().json();

    match otlp_endpoint {
        Some(endpoint) => match build_otlp_layer(endpoint) {
            Ok(otel_layer) => {
                let subscriber = Registry::default().with(filter).with(fmt_layer).with(otel_layer);
                tracing::subscriber::set_global_default(subscriber).expect("setting global tracing subscriber");
            }
            Err(err) => {
                let subscriber = Registry::default().with(filter).with(fmt_layer);
                tracing::subscriber::set_global_default(subscriber).expect("setting global tracing subscriber");
                tracing::warn!(error = %err, endpoint, "failed to initialize OTLP exporter, continuing without it");
            }
        },
        None => {
            let subscriber = Registry::default().with(filter).with(fmt_layer);
            tracing::subscriber::set_global_default(subscriber).expect("setting global tracing subscriber");
        }
    }
}

fn build_otlp_layer(
    endpoint: &str,
) -> anyhow::Result<Box<dyn tracing_subscriber::Layer<Registry> + Send + Sync>> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .context("building OTLP span exporter")?;

    let provider = SdkTracerProvider::builder().with_batch_exporter(exporter).build();
    let tracer = provider.tracer("voice-ai-gateway");
    tracing::info!(endpoint, "OTLP trace export enabled");
    Ok(Box::new(tracing_opentelemetry::layer().with_tracer(tracer)))
}

/// Starts the gateway: validates config, composes every component in
/// spec §9 order, installs the Prometheus recorder, builds the axum
/// router, and serves until a shutdown signal arrives.
async fn run_server(config: Arc<gw_domain::config::Config>) -> anyhow::Result<()> {
    tracing::info!("voice-ai-gateway starting");

    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues.iter().filter(|i| i.severity == ConfigSeverity::Error).count()
        );
    }

    let metrics_addr = format!("0.0.0.0:{}", config.observability.metrics_port);
    match metrics_addr.parse() {
        Ok(addr) => match metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
        {
            Ok(()) => tracing::info!(%metrics_addr, "prometheus metrics exporter listening"),
            Err(err) => tracing::warn!(error = %err, "failed to install prometheus exporter"),
        },
        Err(err) => tracing::warn!(error = %err, %metrics_addr, "invalid metrics listen address"),
    }

    let shutdown = CancellationToken::new();
    let state = bootstrap::build(config.clone(), shutdown.clone()).await.context("composing gateway components")?;

    let cors_layer = api::build_cors_layer(&config.server.cors);

    let max_concurrent = std::env::var("GW_MAX_CONCURRENT_REQUESTS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(256);

    let governor_layer = if config.server.rate_limit.enabled {
        use tower_governor::governor::GovernorConfigBuilder;
        use tower_governor::GovernorLayer;

        let gov_config = GovernorConfigBuilder::default()
            .per_second(config.server.rate_limit.per_second)
            .burst_size(config.server.rate_limit.burst_size)
            .finish()
            .expect("server.rate_limit.per_second and burst_size must be > 0");

        tracing::info!(
            per_second = config.server.rate_limit.per_second,
            burst_size = config.server.rate_limit.burst_size,
            "per-IP rate limiting enabled"
        );
        Some(GovernorLayer { config: std::sync::Arc::new(gov_config) })
    } else {
        tracing::info!("per-IP rate limiting disabled");
        None
    };

    let router = api::router(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_concurrent));
    let app = if let Some(gov) = governor_layer {
        router.layer(gov)
    } else {
        router
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("binding to {addr}"))?;
    tracing::info!(%addr, "voice-ai-gateway listening");

    let shutdown_signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
            shutdown_signal.cancel();
        })
        .await
        .context("axum server error")?;

    Ok(())
}
