use clap::Parser;
use miette::{IntoDiagnostic, Result};
use procura::application::Marketplace;
use procura::config::{CatalogArgs, Cli, Command, ServeArgs};
use procura::infrastructure::session::SessionSigner;
use procura::interfaces::csv::catalog_writer::CatalogWriter;
use procura::interfaces::csv::import::import_catalog;
use procura::interfaces::http::{AppState, build_router};
use std::fs::File;
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Catalog(args) => catalog(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let market = Marketplace::new(
        args.storage.stores().into_diagnostic()?,
        args.gateway().into_diagnostic()?,
        args.session_signer().into_diagnostic()?,
        args.marketplace_config(),
    );

    if let Some(path) = &args.seed_catalog {
        let file = File::open(path).into_diagnostic()?;
        import_catalog(&market, &args.seed_supplier, file)
            .await
            .into_diagnostic()?;
    }

    let router = build_router(AppState::new(market));
    let listener = TcpListener::bind(args.bind).await.into_diagnostic()?;
    info!(addr = %args.bind, "procura listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;
    Ok(())
}

async fn catalog(args: CatalogArgs) -> Result<()> {
    // Nobody signs in during an import; payments are never touched.
    let market = Marketplace::new(
        args.storage.stores().into_diagnostic()?,
        Arc::new(procura::infrastructure::sandbox::SandboxGateway::default()),
        SessionSigner::ephemeral(),
        Default::default(),
    );

    let file = File::open(&args.input).into_diagnostic()?;
    import_catalog(&market, &args.supplier, file)
        .await
        .into_diagnostic()?;

    let products = market.catalog_snapshot().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = CatalogWriter::new(stdout.lock());
    writer.write_catalog(products).into_diagnostic()?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}

/// Logs go to stderr so `catalog` output on stdout stays clean CSV.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}
