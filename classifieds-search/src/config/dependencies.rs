//! Dependency initialization and wiring for the reconciliation scripts.

use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

use classifieds_search_repository::{OpenSearchProvider, SearchService};

use crate::catalog::{PostSource, PostgresPostSource};
use crate::config::Settings;
use crate::errors::{CatalogError, ReconcileError};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Search engine URL, for reports.
    pub elasticsearch_url: String,
    /// Search service over the configured indices.
    pub service: SearchService,
    /// Source of truth for posts.
    pub catalog: Box<dyn PostSource>,
}

impl Dependencies {
    /// Connect to the search engine and the relational store.
    ///
    /// Fails fast: an engine that doesn't answer a ping, or a database that
    /// refuses the connection, ends the run. There is no retry.
    pub async fn connect(settings: &Settings) -> Result<Self, ReconcileError> {
        info!(
            elasticsearch_url = %settings.elasticsearch_url,
            posts_index = %settings.posts_index,
            history_index = %settings.history_index,
            "Initializing dependencies"
        );

        let service = Self::connect_search(settings).await?;
        info!("Search engine connection established");

        let database_url = settings.require_database_url()?;
        let pool = PgPoolOptions::new()
            .max_connections(settings.database_max_connections)
            .connect(database_url)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to connect to PostgreSQL");
                CatalogError::from(e)
            })?;
        info!("PostgreSQL connection established");

        Ok(Self {
            elasticsearch_url: settings.elasticsearch_url.clone(),
            service,
            catalog: Box::new(PostgresPostSource::new(pool)),
        })
    }

    /// Build the search service and check the engine answers.
    async fn connect_search(settings: &Settings) -> Result<SearchService, ReconcileError> {
        let url = settings.elasticsearch_url.as_str();

        let provider = OpenSearchProvider::new(url)
            .await
            .map_err(|e| ReconcileError::unreachable(url, e))?;

        let service = SearchService::with_config(
            Box::new(provider),
            settings.index_config(),
            settings.service_config(),
        );

        if let Err(e) = service.ping().await {
            error!(
                elasticsearch_url = %url,
                error = %e,
                "Search engine unreachable, check that it is running and ELASTICSEARCH_URL is correct"
            );
            return Err(ReconcileError::unreachable(url, e));
        }

        Ok(service)
    }
}
