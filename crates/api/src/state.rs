use std::sync::Arc;

use illustra_db::store::CatalogStore;

use crate::cache::ResponseCache;
use crate::config::ServerConfig;
use crate::storage::ObjectStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Catalog persistence (Postgres in production, in-memory in tests).
    pub store: Arc<dyn CatalogStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Cache of serialized public responses.
    pub cache: Arc<ResponseCache>,
    /// Where uploaded image files live.
    pub storage: Arc<dyn ObjectStorage>,
}
