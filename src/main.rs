use rmcp::{ServiceExt, transport::stdio};
use rustdoc_registry::{Config, DocSite, RegistryServer, worker};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load(std::env::args().nth(1))?;
    rustdoc_registry::tracing::init(config.log_format);

    tracing::info!("Starting rustdoc-registry MCP server");

    // Start loading before the browser attaches; early implementor batches queue
    let site = DocSite::shared();
    let cancel = CancellationToken::new();
    let loader = config.site_root.clone().map(|root| {
        tracing::info!("Loading doc site from {}", root.display());
        worker::spawn_site_loader(site.clone(), root, config.concurrency, cancel.clone())
    });

    let server = RegistryServer::attach(site, config.concurrency).await;
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    // Wait for the service to complete
    service.waiting().await?;

    cancel.cancel();
    if let Some(loader) = loader
        && let Err(e) = loader.await
    {
        tracing::warn!("Site loader task failed: {}", e);
    }

    Ok(())
}
