//! MCP server implementation.

use crate::implementors::SharedBrowser;
use crate::site::SharedSite;
use crate::tools::{
    GetDescriptionRequest, ListDescriptionsRequest, ListImplementorsRequest, LoadSiteRequest,
    handle_get_description, handle_list_crates, handle_list_descriptions,
    handle_list_implementors, handle_list_traits, handle_load_site,
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
};

/// MCP server exposing the description index and the type browser.
#[derive(Clone)]
pub struct RegistryServer {
    /// Shared registries, also written by the background loader
    site: SharedSite,

    /// Reader attached to the implementor registry
    browser: SharedBrowser,

    /// Files read at once by `load_site`
    concurrency: usize,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for RegistryServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryServer")
            .field("browser", &self.browser)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

#[tool_router]
impl RegistryServer {
    /// Create the server and attach its type browser to the implementor registry.
    ///
    /// Any implementor batches registered before this point are replayed into
    /// the browser; later ones reach it directly.
    pub async fn attach(site: SharedSite, concurrency: usize) -> Self {
        let browser = SharedBrowser::new();
        {
            let mut site = site.write().await;
            if site.implementors.attach(Box::new(browser.clone())).is_some() {
                tracing::warn!("Replaced an existing implementor reader");
            }
        }
        tracing::debug!("Type browser attached");

        Self {
            site,
            browser,
            concurrency,
            tool_router: Self::tool_router(),
        }
    }

    pub fn site(&self) -> &SharedSite {
        &self.site
    }

    pub fn browser(&self) -> &SharedBrowser {
        &self.browser
    }

    #[tool(
        description = "Load a rustdoc output directory (usually target/doc). Registers every search.desc description shard and trait.impl implementor file found. Loading is additive."
    )]
    async fn load_site(
        &self,
        Parameters(request): Parameters<LoadSiteRequest>,
    ) -> std::result::Result<String, String> {
        handle_load_site(&self.site, request, self.concurrency).await
    }

    #[tool(
        description = "List crates with loaded search descriptions, plus the state of the trait implementor registry."
    )]
    async fn list_crates(&self) -> std::result::Result<String, String> {
        let site = self.site.read().await;
        let browser = self.browser.read();
        Ok(handle_list_crates(&site, &browser))
    }

    #[tool(
        description = "Get the search description of one item by its global index in a crate's search index. Descriptions are decoded lazily from the loaded shards."
    )]
    async fn get_description(
        &self,
        Parameters(request): Parameters<GetDescriptionRequest>,
    ) -> std::result::Result<String, String> {
        let site = self.site.read().await;
        handle_get_description(&site.shards, &request)
    }

    #[tool(
        description = "List a range of item descriptions for a crate, in search index order."
    )]
    async fn list_descriptions(
        &self,
        Parameters(request): Parameters<ListDescriptionsRequest>,
    ) -> std::result::Result<String, String> {
        let site = self.site.read().await;
        handle_list_descriptions(&site.shards, &request)
    }

    #[tool(
        description = "List the types implementing a trait, grouped by crate. Accepts a full path like 'core::ops::deref::Deref' or a bare name like 'Deref'."
    )]
    async fn list_implementors(
        &self,
        Parameters(request): Parameters<ListImplementorsRequest>,
    ) -> std::result::Result<String, String> {
        let browser = self.browser.read();
        handle_list_implementors(&browser, &request)
    }

    #[tool(description = "List every trait that has registered implementors.")]
    async fn list_traits(&self) -> std::result::Result<String, String> {
        let browser = self.browser.read();
        Ok(handle_list_traits(&browser))
    }
}

#[tool_handler]
impl ServerHandler for RegistryServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "rustdoc-registry: serves the search descriptions and trait implementor \
                 listings of a generated rustdoc site. If no site was configured at startup, \
                 use load_site with the rustdoc output directory (usually target/doc).",
            )
    }
}
