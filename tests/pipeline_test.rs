mod helpers;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use helpers::{
    FailingSplitter, OWNER_EMAIL, ScriptedGenerationClient, chunk_position, three_chunk_content,
    valid_response,
};
use lectern::application::ports::{
    GenerationClient, GenerationClientError, JobStateStore, RepositoryError,
};
use lectern::application::services::{
    ExamGenerationPipeline, ExamGenerationService, ExamGenerationWorker, GenerationMessage,
    GenerationSummary, JobInfrastructureError, StartGenerationError,
};
use lectern::domain::{
    ExamType, FileId, GenerationRequest, GenerationStatus, QuestionRecord, SourceFile,
};
use lectern::infrastructure::persistence::InMemoryJobStateStore;
use lectern::infrastructure::text_processing::ParagraphChunker;

async fn seeded_store(content: &str) -> (Arc<InMemoryJobStateStore>, FileId) {
    let store = Arc::new(InMemoryJobStateStore::new());
    let file = SourceFile::new(
        "Biology".to_string(),
        content.to_string(),
        OWNER_EMAIL.to_string(),
    );
    let id = file.id;
    store.insert(file).await;
    (store, id)
}

fn pipeline(
    client: Arc<dyn GenerationClient>,
    store: Arc<InMemoryJobStateStore>,
) -> ExamGenerationPipeline {
    ExamGenerationPipeline::new(client, store, Arc::new(ParagraphChunker::new(20)))
}

async fn started_message(
    store: &InMemoryJobStateStore,
    file_id: FileId,
    exam_types: Vec<ExamType>,
) -> GenerationMessage {
    store.begin_generation(file_id).await.unwrap();
    GenerationMessage {
        file_id,
        content: store.get(file_id).await.unwrap().content,
        exam_types,
    }
}

#[tokio::test]
async fn given_provider_failure_on_one_cell_when_running_then_job_completes_without_that_cell() {
    let (store, file_id) = seeded_store(&three_chunk_content()).await;
    let client = Arc::new(ScriptedGenerationClient::new(|request| {
        let chunk = chunk_position(request);
        if request.exam_type == ExamType::Solutions && chunk == 2 {
            return Err(GenerationClientError::ApiRequestFailed(
                "upstream 500".to_string(),
            ));
        }
        Ok(valid_response(request.exam_type, chunk))
    }));
    let msg = started_message(
        &store,
        file_id,
        vec![ExamType::Mcq, ExamType::Solutions],
    )
    .await;

    let summary = pipeline(client.clone(), store.clone())
        .run(&msg)
        .await
        .unwrap();

    let file = store.get(file_id).await.unwrap();
    let job = file.generation();
    assert_eq!(job.status, GenerationStatus::Completed);
    assert_eq!(job.total_chunks, 3);
    assert_eq!(job.chunks_processed, 3);
    assert!(job.error.is_none());
    assert!(job.completed_at.is_some());

    assert_eq!(file.exams.mcqs.len(), 3);
    let problems: Vec<&str> = file
        .exams
        .solutions
        .iter()
        .map(|s| s.problem.as_str())
        .collect();
    assert_eq!(problems, vec!["Problem from chunk 1", "Problem from chunk 3"]);

    assert_eq!(summary.failed_cells, 1);
    assert_eq!(summary.questions_appended, 5);
    assert_eq!(client.requests().len(), 6);
}

#[tokio::test]
async fn given_two_exam_types_when_running_then_cells_run_chunk_by_chunk_in_request_order() {
    let (store, file_id) = seeded_store(&three_chunk_content()).await;
    let client = Arc::new(ScriptedGenerationClient::one_per_cell());
    let msg = started_message(
        &store,
        file_id,
        vec![ExamType::FillBlanks, ExamType::Mcq],
    )
    .await;

    pipeline(client.clone(), store).run(&msg).await.unwrap();

    let order: Vec<(usize, ExamType)> = client
        .requests()
        .iter()
        .map(|r| (chunk_position(r), r.exam_type))
        .collect();
    assert_eq!(
        order,
        vec![
            (1, ExamType::FillBlanks),
            (1, ExamType::Mcq),
            (2, ExamType::FillBlanks),
            (2, ExamType::Mcq),
            (3, ExamType::FillBlanks),
            (3, ExamType::Mcq),
        ]
    );
}

/// Reads the stored job each time it is called, so tests can see what a
/// polling client would have seen mid-run.
struct ObservingClient {
    store: Arc<InMemoryJobStateStore>,
    file_id: FileId,
    seen: tokio::sync::Mutex<Vec<(usize, usize)>>,
}

#[async_trait]
impl GenerationClient for ObservingClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationClientError> {
        let file = self.store.get(self.file_id).await.unwrap();
        self.seen
            .lock()
            .await
            .push((file.generation().chunks_processed, file.exams.total()));
        Ok(valid_response(request.exam_type, chunk_position(request)))
    }
}

#[tokio::test]
async fn given_running_job_when_observed_between_cells_then_results_and_progress_are_already_persisted()
 {
    let (store, file_id) = seeded_store(&three_chunk_content()).await;
    let client = Arc::new(ObservingClient {
        store: store.clone(),
        file_id,
        seen: tokio::sync::Mutex::new(Vec::new()),
    });
    let msg = started_message(&store, file_id, vec![ExamType::Mcq, ExamType::Solutions]).await;

    pipeline(client.clone(), store).run(&msg).await.unwrap();

    let seen = client.seen.lock().await.clone();
    assert_eq!(
        seen,
        vec![(0, 0), (0, 1), (1, 2), (1, 3), (2, 4), (2, 5)]
    );
}

#[tokio::test]
async fn given_malformed_and_empty_outputs_when_running_then_cells_are_skipped_and_job_completes() {
    let (store, file_id) = seeded_store(&three_chunk_content()).await;
    let client = Arc::new(ScriptedGenerationClient::new(|request| {
        match chunk_position(request) {
            1 => Ok("I could not produce JSON, sorry".to_string()),
            2 => Ok("{}".to_string()),
            n => Ok(valid_response(request.exam_type, n)),
        }
    }));
    let msg = started_message(&store, file_id, vec![ExamType::FillBlanks]).await;

    let summary = pipeline(client, store.clone()).run(&msg).await.unwrap();

    let file = store.get(file_id).await.unwrap();
    assert_eq!(file.generation().status, GenerationStatus::Completed);
    assert_eq!(file.exams.fill_blanks.len(), 1);
    assert_eq!(summary.failed_cells, 1);
}

#[tokio::test]
async fn given_splitter_failure_when_running_then_job_is_marked_failed_with_error() {
    let (store, file_id) = seeded_store("content").await;
    let client: Arc<dyn GenerationClient> = Arc::new(ScriptedGenerationClient::one_per_cell());
    let msg = started_message(&store, file_id, vec![ExamType::Mcq]).await;
    let pipeline = ExamGenerationPipeline::new(client, store.clone(), Arc::new(FailingSplitter));

    let result = pipeline.run(&msg).await;

    assert!(result.is_err());
    let job = store.get(file_id).await.unwrap().generation();
    assert_eq!(job.status, GenerationStatus::Failed);
    assert!(job.error.unwrap().contains("tokenizer exploded"));
    assert!(job.completed_at.is_some());
    assert_eq!(job.chunks_processed, 0);
}

#[tokio::test]
async fn given_previous_run_results_when_restarting_then_progress_resets_and_questions_accumulate() {
    let (store, file_id) = seeded_store(&three_chunk_content()).await;
    let client = Arc::new(ScriptedGenerationClient::one_per_cell());

    let first = started_message(&store, file_id, vec![ExamType::Mcq]).await;
    pipeline(client.clone(), store.clone()).run(&first).await.unwrap();

    store.begin_generation(file_id).await.unwrap();
    let restarted = store.get(file_id).await.unwrap();
    assert_eq!(restarted.generation().status, GenerationStatus::Processing);
    assert_eq!(restarted.generation().chunks_processed, 0);
    assert_eq!(restarted.exams.mcqs.len(), 3);

    pipeline(client, store.clone()).run(&first).await.unwrap();
    assert_eq!(store.get(file_id).await.unwrap().exams.mcqs.len(), 6);
}

#[tokio::test]
async fn given_start_request_when_worker_is_running_then_job_finishes_in_background() {
    let (store, file_id) = seeded_store(&three_chunk_content()).await;
    let client: Arc<dyn GenerationClient> = Arc::new(ScriptedGenerationClient::one_per_cell());
    let (sender, receiver) = mpsc::channel(8);
    let worker = ExamGenerationWorker::new(
        receiver,
        Arc::new(pipeline(client, store.clone())),
        2,
    );
    tokio::spawn(worker.run());
    let service = ExamGenerationService::new(store.clone(), sender);

    service
        .start(OWNER_EMAIL, file_id, vec![ExamType::Solutions])
        .await
        .unwrap();

    let job = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let job = store.get(file_id).await.unwrap().generation();
            if job.status.is_terminal() {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("job did not finish");

    assert_eq!(job.status, GenerationStatus::Completed);
    assert_eq!(job.chunks_processed, 3);
}

#[tokio::test]
async fn given_invalid_start_requests_when_starting_then_rejected_before_any_state_change() {
    let (store, file_id) = seeded_store("   ").await;
    let (sender, _receiver) = mpsc::channel(1);
    let service = ExamGenerationService::new(store.clone(), sender);

    let no_types = service.start(OWNER_EMAIL, file_id, vec![]).await;
    let other_owner = service
        .start("someone@else.com", file_id, vec![ExamType::Mcq])
        .await;
    let empty = service.start(OWNER_EMAIL, file_id, vec![ExamType::Mcq]).await;

    assert!(matches!(no_types, Err(StartGenerationError::NoExamTypes)));
    assert!(matches!(other_owner, Err(StartGenerationError::FileNotFound(_))));
    assert!(matches!(empty, Err(StartGenerationError::EmptyContent(_))));
    assert!(store.get(file_id).await.unwrap().exam_generation.is_none());
}

#[tokio::test]
async fn given_closed_queue_when_starting_then_rejected_without_touching_job_state() {
    let (store, file_id) = seeded_store(&three_chunk_content()).await;
    let (sender, receiver) = mpsc::channel(1);
    drop(receiver);
    let service = ExamGenerationService::new(store.clone(), sender);

    let result = service.start(OWNER_EMAIL, file_id, vec![ExamType::Mcq]).await;

    assert!(matches!(result, Err(StartGenerationError::QueueClosed)));
    assert!(!service.is_accepting());
    assert!(store.get(file_id).await.unwrap().exam_generation.is_none());
}

/// Never answers within a test's lifetime, keeping every job slot busy.
struct StalledClient;

#[async_trait]
impl GenerationClient for StalledClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationClientError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(valid_response(request.exam_type, 1))
    }
}

#[tokio::test]
async fn given_saturated_worker_when_starting_more_jobs_then_start_returns_promptly_and_rejects_overflow()
 {
    let store = Arc::new(InMemoryJobStateStore::new());
    let (sender, receiver) = mpsc::channel(1);
    let worker = ExamGenerationWorker::new(
        receiver,
        Arc::new(pipeline(Arc::new(StalledClient), store.clone())),
        1,
    );
    tokio::spawn(worker.run());
    let service = ExamGenerationService::new(store.clone(), sender);

    let mut outcomes = Vec::new();
    for _ in 0..4 {
        let file = SourceFile::new(
            "Busy".to_string(),
            three_chunk_content(),
            OWNER_EMAIL.to_string(),
        );
        let file_id = file.id;
        store.insert(file).await;

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            service.start(OWNER_EMAIL, file_id, vec![ExamType::Mcq]),
        )
        .await
        .expect("start blocked on a busy worker");
        outcomes.push((file_id, result));
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let rejected: Vec<FileId> = outcomes
        .iter()
        .filter(|(_, r)| matches!(r, Err(StartGenerationError::QueueFull)))
        .map(|(id, _)| *id)
        .collect();
    assert!(!rejected.is_empty());
    for id in rejected {
        assert!(store.get(id).await.unwrap().exam_generation.is_none());
    }
    for (id, result) in &outcomes {
        if result.is_ok() {
            let job = store.get(*id).await.unwrap().generation();
            assert_eq!(job.status, GenerationStatus::Processing);
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum BrokenWrite {
    Append,
    Progress,
}

/// Delegates to an in-memory store but loses its connection on one kind of write.
struct UnreachableStore {
    inner: Arc<InMemoryJobStateStore>,
    broken: BrokenWrite,
    failures_recorded: std::sync::Mutex<Vec<String>>,
}

impl UnreachableStore {
    fn connection_lost() -> RepositoryError {
        RepositoryError::ConnectionFailed("connection reset by peer".to_string())
    }
}

#[async_trait]
impl JobStateStore for UnreachableStore {
    async fn find_file(
        &self,
        id: FileId,
        owner_email: &str,
    ) -> Result<Option<SourceFile>, RepositoryError> {
        self.inner.find_file(id, owner_email).await
    }

    async fn begin_generation(&self, id: FileId) -> Result<(), RepositoryError> {
        self.inner.begin_generation(id).await
    }

    async fn set_total_chunks(&self, id: FileId, total_chunks: usize) -> Result<(), RepositoryError> {
        self.inner.set_total_chunks(id, total_chunks).await
    }

    async fn append_questions(
        &self,
        id: FileId,
        exam_type: ExamType,
        records: &[QuestionRecord],
    ) -> Result<(), RepositoryError> {
        if self.broken == BrokenWrite::Append {
            return Err(Self::connection_lost());
        }
        self.inner.append_questions(id, exam_type, records).await
    }

    async fn set_chunks_processed(
        &self,
        id: FileId,
        chunks_processed: usize,
    ) -> Result<(), RepositoryError> {
        if self.broken == BrokenWrite::Progress {
            return Err(Self::connection_lost());
        }
        self.inner.set_chunks_processed(id, chunks_processed).await
    }

    async fn complete_generation(&self, id: FileId) -> Result<(), RepositoryError> {
        self.inner.complete_generation(id).await
    }

    async fn fail_generation(&self, id: FileId, error_message: &str) -> Result<(), RepositoryError> {
        self.failures_recorded
            .lock()
            .unwrap()
            .push(error_message.to_string());
        self.inner.fail_generation(id, error_message).await
    }
}

async fn run_against_unreachable_store(
    broken: BrokenWrite,
) -> (
    Result<GenerationSummary, JobInfrastructureError>,
    Arc<UnreachableStore>,
    Arc<ScriptedGenerationClient>,
    FileId,
) {
    let (inner, file_id) = seeded_store(&three_chunk_content()).await;
    let msg = started_message(&inner, file_id, vec![ExamType::Mcq, ExamType::Solutions]).await;
    let store = Arc::new(UnreachableStore {
        inner,
        broken,
        failures_recorded: std::sync::Mutex::new(Vec::new()),
    });
    let client = Arc::new(ScriptedGenerationClient::one_per_cell());
    let pipeline = ExamGenerationPipeline::new(
        client.clone(),
        store.clone(),
        Arc::new(ParagraphChunker::new(20)),
    );

    let result = pipeline.run(&msg).await;
    (result, store, client, file_id)
}

#[tokio::test]
async fn given_store_lost_while_appending_when_running_then_job_fails_and_no_further_cells_run() {
    let (result, store, client, file_id) = run_against_unreachable_store(BrokenWrite::Append).await;

    assert!(matches!(
        result,
        Err(JobInfrastructureError::Repository(RepositoryError::ConnectionFailed(_)))
    ));
    assert_eq!(client.requests().len(), 1);
    let failures = store.failures_recorded.lock().unwrap().clone();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("connection reset by peer"));
    let job = store.inner.get(file_id).await.unwrap().generation();
    assert_eq!(job.status, GenerationStatus::Failed);
    assert!(job.completed_at.is_some());
}

#[tokio::test]
async fn given_store_lost_while_recording_progress_then_job_fails_after_first_chunk() {
    let (result, store, client, file_id) =
        run_against_unreachable_store(BrokenWrite::Progress).await;

    assert!(matches!(result, Err(JobInfrastructureError::Repository(_))));
    let attempted: Vec<usize> = client.requests().iter().map(chunk_position).collect();
    assert_eq!(attempted, vec![1, 1]);
    let failures = store.failures_recorded.lock().unwrap().clone();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("connection reset by peer"));
    let file = store.inner.get(file_id).await.unwrap();
    assert_eq!(file.generation().status, GenerationStatus::Failed);
    assert_eq!(file.generation().chunks_processed, 0);
    assert_eq!(file.exams.total(), 2);
}
