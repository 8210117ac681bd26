use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use lectern::application::ports::{GenerationClient, JobStateStore, TextSplitter};
use lectern::application::services::{
    ExamGenerationPipeline, ExamGenerationService, ExamGenerationWorker, ExamPreviewService,
};
use lectern::infrastructure::llm::{MockGenerationClient, create_generation_client};
use lectern::infrastructure::observability::{TracingConfig, init_tracing};
use lectern::infrastructure::persistence::{
    InMemoryJobStateStore, PgJobStateStore, create_pool, run_migrations,
};
use lectern::infrastructure::text_processing::ParagraphChunker;
use lectern::presentation::{AppState, Environment, ScaffoldConfig, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".to_string())
        .try_into()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let settings = Settings::load(environment).context("Failed to load settings")?;
    let scaffold = ScaffoldConfig::default();

    init_tracing(TracingConfig::from_env(), settings.server.port);

    let (generation_client, job_state_store): (Arc<dyn GenerationClient>, Arc<dyn JobStateStore>) =
        if scaffold.enabled {
            tracing::warn!(
                delay_ms = scaffold.mock_response_delay_ms,
                "Scaffold mode: in-memory store and canned generation responses"
            );
            (
                Arc::new(MockGenerationClient::new(scaffold.mock_response_delay_ms)),
                Arc::new(InMemoryJobStateStore::new()),
            )
        } else {
            let pool = create_pool(&settings.database.url, settings.database.max_connections)
                .await
                .context("Failed to connect to PostgreSQL")?;
            run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;
            let client = create_generation_client(&settings.llm)
                .context("Failed to create generation client")?;
            tracing::info!(
                provider = %settings.llm.provider,
                model = %settings.llm.model,
                "Generation client configured"
            );
            (Arc::new(client), Arc::new(PgJobStateStore::new(pool)))
        };

    let text_splitter: Arc<dyn TextSplitter> =
        Arc::new(ParagraphChunker::new(settings.generation.chunk_max_chars));

    let pipeline = Arc::new(ExamGenerationPipeline::new(
        Arc::clone(&generation_client),
        Arc::clone(&job_state_store),
        text_splitter,
    ));

    let (sender, receiver) = mpsc::channel(settings.generation.queue_capacity.max(1));
    let worker = ExamGenerationWorker::new(
        receiver,
        pipeline,
        settings.generation.max_concurrent_jobs,
    );
    tokio::spawn(worker.run());

    let state = AppState {
        generation_service: Arc::new(ExamGenerationService::new(
            Arc::clone(&job_state_store),
            sender,
        )),
        preview_service: Arc::new(ExamPreviewService::new(generation_client)),
        job_state_store,
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
