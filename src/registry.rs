use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    access::PageId,
    error::{LoadError, PageRenderError, RegistryError},
};

/// PageContent
///
/// What a page produced for one render cycle. Pages in this portal are embedded
/// analytics dashboards, so the content is a heading plus the embed target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageContent {
    pub title: String,
    pub embed_url: Option<String>,
}

/// RenderHandler
///
/// Opaque unit of work behind a page. The navigator only calls it once the
/// session's role has been checked against the page.
#[async_trait]
pub trait RenderHandler: Send + Sync {
    async fn render(&self) -> Result<PageContent, PageRenderError>;
}

pub type HandlerRef = Arc<dyn RenderHandler>;

/// DashboardPage
///
/// The stock handler: a titled dashboard embedded from an external BI service.
#[derive(Debug, Clone)]
pub struct DashboardPage {
    pub title: String,
    pub embed_url: Option<String>,
}

impl DashboardPage {
    pub fn new(title: impl Into<String>, embed_url: Option<String>) -> Self {
        Self {
            title: title.into(),
            embed_url,
        }
    }
}

#[async_trait]
impl RenderHandler for DashboardPage {
    async fn render(&self) -> Result<PageContent, PageRenderError> {
        if let Some(url) = &self.embed_url {
            // Browsers refuse mixed-content iframes; a plain http embed renders blank.
            if !url.starts_with("https://") {
                return Err(PageRenderError::Failed(format!(
                    "dashboard '{}' has an invalid embed address",
                    self.title
                )));
            }
        }
        Ok(PageContent {
            title: self.title.clone(),
            embed_url: self.embed_url.clone(),
        })
    }
}

/// PageEntry
///
/// One registered page: stable id, display label and its handler.
#[derive(Clone)]
pub struct PageEntry {
    pub id: PageId,
    pub label: String,
    pub handler: HandlerRef,
}

impl fmt::Debug for PageEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageEntry")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// PageRegistry
///
/// Every page the process knows about, in registration order. Read-only once
/// built, so it can be shared across sessions without locking.
#[derive(Debug, Default)]
pub struct PageRegistry {
    entries: Vec<PageEntry>,
    index: HashMap<PageId, usize>,
}

impl PageRegistry {
    pub fn builder() -> PageRegistryBuilder {
        PageRegistryBuilder::default()
    }

    pub fn get(&self, id: &PageId) -> Option<&PageEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, id: &PageId) -> bool {
        self.index.contains_key(id)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PageEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &PageId> {
        self.entries.iter().map(|entry| &entry.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// PageRegistryBuilder
///
/// Explicit registration step. The first invalid registration is remembered and
/// reported by [`PageRegistryBuilder::build`].
#[derive(Default)]
pub struct PageRegistryBuilder {
    registry: PageRegistry,
    error: Option<RegistryError>,
}

impl PageRegistryBuilder {
    pub fn page(
        mut self,
        id: impl Into<PageId>,
        label: impl Into<String>,
        handler: impl RenderHandler + 'static,
    ) -> Self {
        self.push(id.into(), label.into(), Arc::new(handler));
        self
    }

    pub fn page_ref(mut self, id: impl Into<PageId>, label: impl Into<String>, handler: HandlerRef) -> Self {
        self.push(id.into(), label.into(), handler);
        self
    }

    fn push(&mut self, id: PageId, label: String, handler: HandlerRef) {
        if self.error.is_some() {
            return;
        }
        if id.is_empty() {
            self.error = Some(RegistryError::EmptyId);
            return;
        }
        if self.registry.index.contains_key(&id) {
            self.error = Some(RegistryError::DuplicatePage(id));
            return;
        }
        self.registry
            .index
            .insert(id.clone(), self.registry.entries.len());
        self.registry.entries.push(PageEntry { id, label, handler });
    }

    pub fn build(self) -> Result<PageRegistry, RegistryError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.registry),
        }
    }
}

/// PageLoader
///
/// Supplies the registry once at startup. The navigator never calls it again.
pub trait PageLoader: Send + Sync {
    fn load(&self) -> Result<PageRegistry, LoadError>;
}

/// CatalogEntry
///
/// One line of a JSON page catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub label: String,
    pub title: String,
    #[serde(default)]
    pub embed_url: Option<String>,
}

/// CatalogPageLoader
///
/// Builds the registry from the built-in dashboard catalog, or from a JSON file
/// (`PAGES_FILE`) listing [`CatalogEntry`] values in menu order.
#[derive(Debug, Clone, Default)]
pub struct CatalogPageLoader {
    path: Option<String>,
}

impl CatalogPageLoader {
    pub fn built_in() -> Self {
        Self { path: None }
    }

    pub fn from_file(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn built_in_catalog() -> Vec<CatalogEntry> {
        let page = |id: &str, title: &str, embed_url: Option<&str>| CatalogEntry {
            id: id.to_string(),
            label: id.to_string(),
            title: title.to_string(),
            embed_url: embed_url.map(str::to_string),
        };

        vec![
            page("Dashboard", "Dashboard", None),
            page("Comercial", "Dashboard - Comercial", None),
            page(
                "Carros",
                "Dashboard - Carros",
                Some("https://app.powerbi.com/view?r=eyJrIjoiOTlkMDY4NGMtNTRhMi00ZGNmLTg4MWMtYTFhYTc0YmU4NmNiIiwidCI6ImNjNDUwYmIwLTAxODktNDU0YS1hNWNhLWRjMjQ1ZWFiMzRkZCJ9"),
            ),
            page("Yamaha", "Dashboard - Yamaha", None),
            page("Gsv", "Dashboard - Pós-venda", None),
            page("Adm", "Dashboard - Administrativo", None),
            page(
                "Venda",
                "Dashboard - Vendedor",
                Some("https://app.powerbi.com/view?r=eyJrIjoiMjVmNmI0YTMtZjFmNC00YTMyLWIzMGEtMTVkMzYyNzM4ZDQ2IiwidCI6ImMxOTIyMjIwLTgwMjYtNGNhNi04MmU0LWY5MDI0M2YxNTI0MiJ9"),
            ),
        ]
    }

    fn catalog(&self) -> Result<Vec<CatalogEntry>, LoadError> {
        let Some(path) = &self.path else {
            return Ok(Self::built_in_catalog());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| LoadError::Parse {
            path: path.clone(),
            source,
        })
    }
}

impl PageLoader for CatalogPageLoader {
    fn load(&self) -> Result<PageRegistry, LoadError> {
        let registry = self
            .catalog()?
            .into_iter()
            .fold(PageRegistry::builder(), |builder, entry| {
                builder.page(
                    entry.id,
                    entry.label,
                    DashboardPage::new(entry.title, entry.embed_url),
                )
            })
            .build()?;

        tracing::info!(pages = registry.len(), "page registry loaded");
        Ok(registry)
    }
}
