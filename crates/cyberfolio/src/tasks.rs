//! Owned background tasks.
//!
//! Every timer or fetch the app starts belongs to a [`TaskScope`]. Dropping
//! the scope aborts what is still running, so closing an overlay tears down
//! its timers without any explicit unsubscribe step.

use std::future::Future;

use tokio::task::JoinHandle;
use tracing::trace;

/// A set of spawned tasks that are aborted together.
#[derive(Debug, Default)]
pub struct TaskScope {
    name: &'static str,
    handles: Vec<JoinHandle<()>>,
}

impl TaskScope {
    /// Create an empty scope. `name` shows up in trace logs.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handles: Vec::new(),
        }
    }

    /// Spawn `task` on the current runtime, owned by this scope.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handles.retain(|handle| !handle.is_finished());
        self.handles.push(tokio::spawn(task));
    }

    /// Number of tasks that have not finished yet.
    #[must_use]
    pub fn running(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Abort every task in the scope.
    pub fn abort_all(&mut self) {
        if !self.handles.is_empty() {
            trace!(scope = self.name, tasks = self.handles.len(), "Aborting tasks");
        }
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_new_scope_is_empty() {
        let scope = TaskScope::new("test");
        assert_eq!(scope.running(), 0);
    }

    #[tokio::test]
    async fn test_drop_aborts_pending_timer() {
        let fired = Arc::new(AtomicBool::new(false));
        let mut scope = TaskScope::new("overlay");

        let flag = Arc::clone(&fired);
        scope.spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
        });
        assert_eq!(scope.running(), 1);

        drop(scope);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_tasks_run_while_scope_lives() {
        let fired = Arc::new(AtomicBool::new(false));
        let mut scope = TaskScope::new("app");

        let flag = Arc::clone(&fired);
        scope.spawn(async move {
            flag.store(true, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(fired.load(Ordering::SeqCst));
        assert_eq!(scope.running(), 0);
    }

    #[tokio::test]
    async fn test_abort_all_empties_scope() {
        let mut scope = TaskScope::new("test");
        scope.spawn(std::future::pending());
        scope.spawn(std::future::pending());
        assert_eq!(scope.running(), 2);

        scope.abort_all();
        assert_eq!(scope.running(), 0);
    }
}
