use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::models::PipelineRun;

/// In-memory run store shared between the HTTP surface and the background
/// tasks executing pipelines
///
/// The mutex serializes concurrent inserts and updates; it is held only for
/// the duration of a single read or mutation, never across a generation
/// call. Callers get cloned snapshots, so a record can only be changed
/// through this registry.
#[derive(Debug, Default)]
pub struct RunRegistry {
    runs: Mutex<HashMap<Uuid, PipelineRun>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, PipelineRun>> {
        self.runs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, run: PipelineRun) {
        self.lock().insert(run.id, run);
    }

    pub fn get(&self, id: Uuid) -> Option<PipelineRun> {
        self.lock().get(&id).cloned()
    }

    /// All runs, oldest first
    pub fn list(&self) -> Vec<PipelineRun> {
        let mut runs: Vec<PipelineRun> = self.lock().values().cloned().collect();
        runs.sort_by_key(|run| run.created_at);
        runs
    }

    /// Mutate one run under the lock and return its updated snapshot
    pub fn update<F>(&self, id: Uuid, f: F) -> Option<PipelineRun>
    where
        F: FnOnce(&mut PipelineRun),
    {
        let mut runs = self.lock();
        let run = runs.get_mut(&id)?;
        f(run);
        Some(run.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PipelineRequest, RunStatus};

    fn run(topic: &str) -> PipelineRun {
        PipelineRun::new(PipelineRequest::new(topic, "guidelines").unwrap(), None)
    }

    #[test]
    fn test_insert_and_get_snapshot() {
        let registry = RunRegistry::new();
        let run = run("a topic");
        let id = run.id;
        registry.insert(run);

        let snapshot = registry.get(id).expect("stored run");
        assert_eq!(snapshot.id, id);
        assert_eq!(snapshot.status, RunStatus::Pending);

        assert!(registry.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_update_mutates_in_place() {
        let registry = RunRegistry::new();
        let run = run("a topic");
        let id = run.id;
        registry.insert(run);

        let updated = registry.update(id, |r| r.mark_running()).expect("updated");
        assert_eq!(updated.status, RunStatus::Running);
        assert_eq!(registry.get(id).unwrap().status, RunStatus::Running);

        assert!(registry.update(Uuid::new_v4(), |_| {}).is_none());
    }

    #[test]
    fn test_list_is_oldest_first() {
        let registry = RunRegistry::new();
        let first = run("first");
        let mut second = run("second");
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        let first_id = first.id;
        registry.insert(second);
        registry.insert(first);

        let runs = registry.list();
        assert_eq!(runs.len(), 2);
        // created_at ordering, not insertion ordering
        assert_eq!(runs[0].id, first_id);
    }
}
