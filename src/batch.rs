//! Batch episode creation.
//!
//! One invocation spawns one tokio task per selected entry. The tasks share
//! nothing except the backend handle and the event channel, so a failing or
//! slow request never holds up, cancels or alters another one. Each task
//! reports its own [`CreationTask`] back; the UI routes it by entry id.

use crate::api::EpisodeBackend;
use crate::events::{AppEvent, EventSender};
use crate::selection::SelectedEntry;
use crate::types::{BatchId, CreationStatus, CreationTask};
use log::{debug, info, warn};
use std::sync::Arc;

/// Summary of what one invocation dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchInvocation {
    pub id: BatchId,
    pub dispatched: usize,
}

pub struct BatchEpisodeCreator {
    backend: Arc<dyn EpisodeBackend>,
    next_batch: u64,
}

impl BatchEpisodeCreator {
    pub fn new(backend: Arc<dyn EpisodeBackend>) -> Self {
        Self {
            backend,
            next_batch: 1,
        }
    }

    /// Dispatch one creation request per selected entry and return at once.
    ///
    /// Requests are spawned in selection order and then run concurrently;
    /// completions arrive as [`AppEvent::CreationFinished`] in any order.
    /// An empty selection dispatches nothing.
    pub fn create_all(
        &mut self,
        podcast_id: u64,
        selection: &[SelectedEntry],
        events: &EventSender,
    ) -> BatchInvocation {
        let id = BatchId(self.next_batch);
        self.next_batch += 1;

        if selection.is_empty() {
            debug!("Batch {} has no selected entries", id);
            return BatchInvocation { id, dispatched: 0 };
        }

        info!(
            "Batch {}: creating {} episode(s) in podcast {}",
            id,
            selection.len(),
            podcast_id
        );

        for selected in selection {
            let task = CreationTask::new(id, selected.entry_id.clone(), selected.url.clone());
            let backend = Arc::clone(&self.backend);
            let events = events.clone();

            tokio::spawn(async move {
                let finished = run_task(backend.as_ref(), podcast_id, task).await;
                // The receiver is gone only when the app is shutting down.
                let _ = events.send(AppEvent::CreationFinished(finished));
            });
        }

        BatchInvocation {
            id,
            dispatched: selection.len(),
        }
    }
}

async fn run_task(backend: &dyn EpisodeBackend, podcast_id: u64, task: CreationTask) -> CreationTask {
    debug!(
        "Batch {}: requesting episode for {} ({})",
        task.batch, task.entry_id, task.url
    );

    let outcome = backend.create_episode(podcast_id, &task.url).await;
    let task = task.resolve(outcome);

    match &task.status {
        CreationStatus::Succeeded => {
            info!("Batch {}: episode created for {}", task.batch, task.entry_id)
        }
        CreationStatus::Failed(e) => warn!(
            "Batch {}: episode creation for {} failed: {}",
            task.batch, task.entry_id, e
        ),
        CreationStatus::Pending => {}
    }

    task
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CreationError;
    use crate::types::EntryId;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Backend that fails for URLs listed in `failing` and delays by `delays`.
    #[derive(Default)]
    struct FakeBackend {
        failing: Vec<String>,
        delays: HashMap<String, u64>,
        requests: Mutex<Vec<(u64, String)>>,
    }

    #[async_trait]
    impl EpisodeBackend for FakeBackend {
        async fn create_episode(
            &self,
            podcast_id: u64,
            source_url: &str,
        ) -> Result<(), CreationError> {
            self.requests
                .lock()
                .unwrap()
                .push((podcast_id, source_url.to_string()));
            if let Some(ms) = self.delays.get(source_url) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            if self.failing.iter().any(|u| u == source_url) {
                Err(CreationError::Status {
                    status: 400,
                    payload: "Input data is invalid".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn selected(id: &str, url: &str) -> SelectedEntry {
        SelectedEntry {
            entry_id: EntryId::new(id),
            url: url.to_string(),
        }
    }

    async fn collect(rx: &mut crate::events::EventReceiver, n: usize) -> Vec<CreationTask> {
        let mut tasks = Vec::new();
        while tasks.len() < n {
            match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
                Ok(Some(AppEvent::CreationFinished(task))) => tasks.push(task),
                other => panic!("unexpected event: {:?}", other),
            }
        }
        tasks
    }

    #[tokio::test]
    async fn test_empty_selection_dispatches_nothing() {
        let backend = Arc::new(FakeBackend::default());
        let mut creator = BatchEpisodeCreator::new(backend.clone());
        let (tx, _rx) = crate::events::channel();

        let invocation = creator.create_all(1, &[], &tx);
        assert_eq!(invocation.dispatched, 0);
        assert!(backend.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_affect_siblings() {
        let backend = Arc::new(FakeBackend {
            failing: vec!["ua".to_string()],
            ..FakeBackend::default()
        });
        let mut creator = BatchEpisodeCreator::new(backend.clone());
        let (tx, mut rx) = crate::events::channel();

        let selection = vec![selected("a", "ua"), selected("b", "ub"), selected("c", "uc")];
        let invocation = creator.create_all(42, &selection, &tx);
        assert_eq!(invocation.dispatched, 3);

        let tasks = collect(&mut rx, 3).await;
        let by_id: HashMap<String, CreationTask> = tasks
            .into_iter()
            .map(|t| (t.entry_id.to_string(), t))
            .collect();

        assert!(matches!(by_id["a"].status, CreationStatus::Failed(_)));
        assert_eq!(by_id["b"].status, CreationStatus::Succeeded);
        assert_eq!(by_id["c"].status, CreationStatus::Succeeded);
        assert!(by_id.values().all(|t| t.batch == invocation.id));

        let mut requests = backend.requests.lock().unwrap().clone();
        requests.sort();
        assert_eq!(
            requests,
            vec![
                (42, "ua".to_string()),
                (42, "ub".to_string()),
                (42, "uc".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_slow_entry_does_not_block_others() {
        let backend = Arc::new(FakeBackend {
            delays: HashMap::from([("slow".to_string(), 300)]),
            ..FakeBackend::default()
        });
        let mut creator = BatchEpisodeCreator::new(backend);
        let (tx, mut rx) = crate::events::channel();

        creator.create_all(1, &[selected("1", "slow"), selected("2", "fast")], &tx);

        let tasks = collect(&mut rx, 2).await;
        assert_eq!(tasks[0].entry_id, EntryId::new("2"));
        assert_eq!(tasks[1].entry_id, EntryId::new("1"));
    }

    #[tokio::test]
    async fn test_each_invocation_gets_new_tasks() {
        let backend = Arc::new(FakeBackend::default());
        let mut creator = BatchEpisodeCreator::new(backend.clone());
        let (tx, mut rx) = crate::events::channel();

        let first = creator.create_all(1, &[selected("1", "u1")], &tx);
        let second = creator.create_all(1, &[selected("1", "u1")], &tx);
        assert_ne!(first.id, second.id);

        let tasks = collect(&mut rx, 2).await;
        assert_eq!(tasks.len(), 2);
        assert_eq!(backend.requests.lock().unwrap().len(), 2);
    }
}
