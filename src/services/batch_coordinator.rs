use std::{collections::BTreeMap, sync::Arc, time::Instant};

use futures::{stream::FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::{
    models::domain::{BatchEntry, BatchFailure, BatchReport, GenerationRequest},
    services::chain_orchestrator::ChainOrchestrator,
};

/// Fans a batch out over the orchestrator, at most `concurrency_limit` topics at a time.
/// Each topic runs in its own task, so a panic is contained to that topic's entry.
#[derive(Clone)]
pub struct BatchCoordinator {
    orchestrator: Arc<ChainOrchestrator>,
}

impl BatchCoordinator {
    pub fn new(orchestrator: Arc<ChainOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn run_batch(
        &self,
        requests: Vec<GenerationRequest>,
        concurrency_limit: usize,
    ) -> BatchReport {
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(concurrency_limit.max(1)));
        log::info!(
            "Starting batch of {} request(s) with concurrency limit {}",
            requests.len(),
            concurrency_limit.max(1)
        );

        let mut pending = FuturesUnordered::new();
        for request in requests {
            let topic = request.topic.clone();
            let username = request.username.clone();
            let orchestrator = self.orchestrator.clone();
            let semaphore = semaphore.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| format!("concurrency gate closed: {}", e))?;
                Ok::<_, String>(orchestrator.generate(request).await)
            });

            pending.push(async move { (topic, username, handle.await) });
        }

        let mut results = BTreeMap::new();
        while let Some((topic, username, joined)) = pending.next().await {
            let entry = match joined {
                Ok(Ok(result)) => BatchEntry::Completed(result),
                Ok(Err(message)) => BatchEntry::Aborted(BatchFailure {
                    topic: topic.clone(),
                    username,
                    message,
                }),
                Err(join_error) => {
                    log::error!("Generation task for '{}' aborted: {}", topic, join_error);
                    BatchEntry::Aborted(BatchFailure {
                        topic: topic.clone(),
                        username,
                        message: format!("generation task aborted: {}", join_error),
                    })
                }
            };
            results.insert(topic, entry);
        }

        let report = BatchReport::new(results, started.elapsed().as_secs_f64());
        log::info!(
            "Batch {} finished: {} succeeded, {} partial, {} failed in {:.2}s",
            report.batch_id,
            report.summary.succeeded,
            report.summary.partial,
            report.summary.failed,
            report.total_processing_time
        );
        report
    }
}
