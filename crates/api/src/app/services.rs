use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use cafeops_forecast::{load_predictor, Predictor, RestockEngine};
use cafeops_infra::{
    config::AppConfig,
    event_store::{InMemoryMetricsStore, MetricsStore, PostgresMetricsStore},
    metrics::{EventSink, MetricsRecorder, MetricsWriter, WriterConfig},
    read_model::{CafeCatalog, CatalogSeed},
    restock::BroadcastNotifier,
};

/// Store handle shared by the writer (inserts) and the export routes (scans).
pub type SharedStore = Arc<dyn MetricsStore>;

/// Everything the HTTP handlers need.
pub struct AppServices {
    pub store: SharedStore,
    pub writer: Arc<MetricsWriter<SharedStore>>,
    pub recorder: MetricsRecorder,
    pub catalog: Arc<CafeCatalog>,
    pub engine: RestockEngine,
    pub notifier: Arc<BroadcastNotifier>,
}

impl AppServices {
    pub fn new(
        store: SharedStore,
        writer_config: WriterConfig,
        catalog: Arc<CafeCatalog>,
        predictor: Option<Arc<dyn Predictor>>,
    ) -> Self {
        let writer = Arc::new(MetricsWriter::new(Arc::clone(&store), writer_config));
        let sink: Arc<dyn EventSink> = writer.clone();
        Self {
            store,
            writer,
            recorder: MetricsRecorder::new(sink),
            catalog,
            engine: RestockEngine::new(predictor),
            notifier: Arc::new(BroadcastNotifier::default()),
        }
    }

    /// In-memory wiring for tests/dev; the writer is not started.
    pub fn in_memory(catalog: CafeCatalog, predictor: Option<Arc<dyn Predictor>>) -> Self {
        Self::new(
            Arc::new(InMemoryMetricsStore::new()),
            WriterConfig::default(),
            Arc::new(catalog),
            predictor,
        )
    }
}

/// Build services from configuration (Postgres when `DATABASE_URL` is set).
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: SharedStore = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await
                .context("failed to connect to postgres")?;
            let store = PostgresMetricsStore::new(pool);
            store.ensure_schema().await.context("failed to create metric_events table")?;
            info!("metrics store: postgres");
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set; metrics are kept in memory");
            Arc::new(InMemoryMetricsStore::new())
        }
    };

    let catalog = match &config.catalog_seed_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read catalog seed {path}"))?;
            let seed: CatalogSeed =
                serde_json::from_str(&raw).with_context(|| format!("invalid catalog seed {path}"))?;
            CafeCatalog::from_seed(seed)
        }
        None => CafeCatalog::new(),
    };

    let predictor = load_predictor(config.predictor.as_deref()).context("invalid PREDICTOR setting")?;
    if predictor.is_none() {
        info!("no forecasting model configured; restock decisions use the synthetic ramp");
    }

    Ok(AppServices::new(store, config.writer, Arc::new(catalog), predictor))
}
