use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tracing::Instrument;

use super::{ExamGenerationPipeline, GenerationMessage};

/// Consumes queued jobs and runs each one detached, at most
/// `max_concurrent_jobs` at a time. The job record is the only channel back
/// to whoever started the job.
pub struct ExamGenerationWorker {
    receiver: mpsc::Receiver<GenerationMessage>,
    pipeline: Arc<ExamGenerationPipeline>,
    job_slots: Arc<Semaphore>,
}

impl ExamGenerationWorker {
    pub fn new(
        receiver: mpsc::Receiver<GenerationMessage>,
        pipeline: Arc<ExamGenerationPipeline>,
        max_concurrent_jobs: usize,
    ) -> Self {
        Self {
            receiver,
            pipeline,
            job_slots: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Exam generation worker started");
        while let Some(msg) = self.receiver.recv().await {
            let permit = match Arc::clone(&self.job_slots).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(error = %e, "Job slots closed");
                    break;
                }
            };

            let span = tracing::info_span!(
                "exam_generation_job",
                file_id = %msg.file_id,
                exam_types = ?msg.exam_types,
            );
            let pipeline = Arc::clone(&self.pipeline);

            tokio::spawn(
                async move {
                    let _permit = permit;
                    // Failures are already recorded on the job by the pipeline.
                    let _ = pipeline.run(&msg).await;
                }
                .instrument(span),
            );
        }
        tracing::info!("Exam generation worker stopped: channel closed");
    }
}
