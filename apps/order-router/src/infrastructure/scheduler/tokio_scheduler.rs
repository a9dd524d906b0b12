//! Tokio Order Scheduler
//!
//! One-shot jobs armed as tokio timers and mirrored in a [`JobStore`]. A job
//! is written to the store before its timer is armed and removed from the
//! store before its order executes, so a job fires at most once: when a
//! cancel and a firing timer race, whichever removes the stored job first
//! wins.
//!
//! On startup [`TokioOrderScheduler::restore`] re-arms every stored job;
//! overdue jobs fire immediately.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task::AbortHandle;

use crate::application::ports::{
    JobStore, ORDER_JOB_GROUP, OrderExecutor, SchedulerError, SchedulerPort, StoredJob,
    job_key_for,
};
use crate::domain::shared::{JobKey, OrderId};
use crate::observability::record_scheduled_job;

struct Timer {
    generation: u64,
    handle: AbortHandle,
}

struct Inner<J, E> {
    store: Arc<J>,
    executor: Arc<E>,
    timers: Mutex<HashMap<JobKey, Timer>>,
    next_generation: AtomicU64,
    shut_down: AtomicBool,
}

impl<J, E> Inner<J, E> {
    fn lock_timers(&self) -> MutexGuard<'_, HashMap<JobKey, Timer>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

impl<J, E> Inner<J, E>
where
    J: JobStore + 'static,
    E: OrderExecutor + 'static,
{
    /// Arm (or re-arm) the timer for a stored job.
    ///
    /// The timer map stays locked until the new timer is registered, so a job
    /// that is already due cannot observe a stale generation.
    fn arm(inner: &Arc<Self>, job: StoredJob) {
        let delay = (job.trigger_time - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        let generation = inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let key = job.job_key.clone();
        let weak: Weak<Self> = Arc::downgrade(inner);

        let mut timers = inner.lock_timers();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.fire(job, generation).await;
            }
        });

        let timer = Timer {
            generation,
            handle: task.abort_handle(),
        };
        if let Some(previous) = timers.insert(key, timer) {
            previous.handle.abort();
        }
    }

    async fn fire(&self, job: StoredJob, generation: u64) {
        {
            let mut timers = self.lock_timers();
            match timers.get(&job.job_key) {
                Some(timer) if timer.generation == generation => {
                    timers.remove(&job.job_key);
                }
                _ => return,
            }
        }

        match self.store.remove(&job.job_key).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(job_key = %job.job_key, "Job no longer stored, not firing");
                return;
            }
            Err(err) => {
                tracing::error!(
                    job_key = %job.job_key,
                    error = %err,
                    "Failed to remove fired job from store"
                );
            }
        }

        record_scheduled_job("fired");
        tracing::info!(
            job_key = %job.job_key,
            order_id = %job.order_id,
            trigger_time = %job.trigger_time,
            "Scheduled job fired"
        );

        match self.executor.execute_scheduled(&job.order_id).await {
            Ok(status) => {
                tracing::info!(order_id = %job.order_id, status = %status, "Scheduled order executed");
            }
            Err(err) => {
                tracing::error!(order_id = %job.order_id, error = %err, "Scheduled order execution failed");
            }
        }
    }
}

impl<J, E> Drop for Inner<J, E> {
    fn drop(&mut self) {
        for (_, timer) in self.lock_timers().drain() {
            timer.handle.abort();
        }
    }
}

/// Scheduler port backed by tokio timers and a durable job store.
pub struct TokioOrderScheduler<J, E>
where
    J: JobStore + 'static,
    E: OrderExecutor + 'static,
{
    inner: Arc<Inner<J, E>>,
}

impl<J, E> TokioOrderScheduler<J, E>
where
    J: JobStore + 'static,
    E: OrderExecutor + 'static,
{
    /// Create a scheduler. Stored jobs are not armed until [`Self::restore`].
    pub fn new(store: Arc<J>, executor: Arc<E>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                executor,
                timers: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    /// Re-arm every stored job. Returns the number of jobs armed.
    pub async fn restore(&self) -> Result<usize, SchedulerError> {
        if self.inner.is_shut_down() {
            return Err(SchedulerError::ShutDown);
        }

        let now = Utc::now();
        let mut restored = 0;
        for job in self.inner.store.list().await? {
            if job.group != ORDER_JOB_GROUP {
                tracing::warn!(job_key = %job.job_key, group = %job.group, "Skipping job from unknown group");
                continue;
            }
            if job.trigger_time <= now {
                tracing::info!(job_key = %job.job_key, trigger_time = %job.trigger_time, "Overdue job fires now");
            }
            Inner::arm(&self.inner, job);
            record_scheduled_job("restored");
            restored += 1;
        }

        tracing::info!(jobs = restored, "Scheduler restored");
        Ok(restored)
    }

    /// Stop accepting jobs and disarm every timer. Stored jobs are kept and
    /// fire after the next [`Self::restore`].
    pub fn shutdown(&self) {
        self.inner.shut_down.store(true, Ordering::SeqCst);
        let mut timers = self.inner.lock_timers();
        let disarmed = timers.len();
        for (_, timer) in timers.drain() {
            timer.handle.abort();
        }
        tracing::info!(disarmed, "Scheduler shut down");
    }

    /// Number of armed timers.
    pub fn armed_jobs(&self) -> usize {
        self.inner.lock_timers().len()
    }
}

impl<J, E> Clone for TokioOrderScheduler<J, E>
where
    J: JobStore + 'static,
    E: OrderExecutor + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl<J, E> SchedulerPort for TokioOrderScheduler<J, E>
where
    J: JobStore + 'static,
    E: OrderExecutor + 'static,
{
    #[tracing::instrument(skip(self), fields(order_id = %order_id))]
    async fn schedule_once(
        &self,
        order_id: &OrderId,
        trigger_time: DateTime<Utc>,
    ) -> Result<JobKey, SchedulerError> {
        if self.inner.is_shut_down() {
            return Err(SchedulerError::ShutDown);
        }

        let job_key = job_key_for(order_id);
        let job = StoredJob {
            job_key: job_key.clone(),
            group: ORDER_JOB_GROUP.to_string(),
            order_id: order_id.clone(),
            trigger_time,
        };
        self.inner.store.put(job.clone()).await?;
        Inner::arm(&self.inner, job);

        record_scheduled_job("scheduled");
        tracing::debug!(job_key = %job_key, trigger_time = %trigger_time, "Job armed");
        Ok(job_key)
    }

    async fn cancel(&self, job_key: &JobKey) -> Result<bool, SchedulerError> {
        let was_armed = self
            .inner
            .lock_timers()
            .remove(job_key)
            .map(|timer| timer.handle.abort())
            .is_some();
        let was_stored = self.inner.store.remove(job_key).await?;

        let removed = was_armed || was_stored;
        if removed {
            record_scheduled_job("cancelled");
        }
        tracing::debug!(job_key = %job_key, removed, "Job cancelled");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ExecutionError;
    use crate::domain::order_execution::OrderStatus;
    use crate::infrastructure::persistence::InMemoryJobStore;
    use tokio::sync::mpsc;

    struct ChannelExecutor {
        fired: mpsc::UnboundedSender<OrderId>,
    }

    #[async_trait]
    impl OrderExecutor for ChannelExecutor {
        async fn execute_scheduled(&self, order_id: &OrderId) -> Result<OrderStatus, ExecutionError> {
            let _ = self.fired.send(order_id.clone());
            Ok(OrderStatus::Placed)
        }
    }

    type Scheduler = TokioOrderScheduler<InMemoryJobStore, ChannelExecutor>;

    fn scheduler(
        store: Arc<InMemoryJobStore>,
    ) -> (Scheduler, mpsc::UnboundedReceiver<OrderId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = TokioOrderScheduler::new(store, Arc::new(ChannelExecutor { fired: tx }));
        (scheduler, rx)
    }

    fn in_secs(secs: i64) -> DateTime<Utc> {
        Utc::now() + chrono::Duration::seconds(secs)
    }

    async fn next_fire(rx: &mut mpsc::UnboundedReceiver<OrderId>) -> Option<OrderId> {
        tokio::time::timeout(Duration::from_secs(300), rx.recv())
            .await
            .ok()
            .flatten()
    }

    #[tokio::test(start_paused = true)]
    async fn fires_at_trigger_time() {
        let store = Arc::new(InMemoryJobStore::new());
        let (scheduler, mut rx) = scheduler(Arc::clone(&store));

        let key = scheduler
            .schedule_once(&OrderId::new("o-1"), in_secs(60))
            .await
            .unwrap();
        assert_eq!(key.as_str(), "execOrder-o-1");
        assert_eq!(store.list().await.unwrap().len(), 1);

        assert_eq!(next_fire(&mut rx).await, Some(OrderId::new("o-1")));
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(scheduler.armed_jobs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_firing() {
        let store = Arc::new(InMemoryJobStore::new());
        let (scheduler, mut rx) = scheduler(Arc::clone(&store));

        let key = scheduler
            .schedule_once(&OrderId::new("o-2"), in_secs(60))
            .await
            .unwrap();
        assert!(scheduler.cancel(&key).await.unwrap());
        assert!(!scheduler.cancel(&key).await.unwrap());

        assert_eq!(next_fire(&mut rx).await, None);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_previous_job() {
        let store = Arc::new(InMemoryJobStore::new());
        let (scheduler, mut rx) = scheduler(Arc::clone(&store));
        let order = OrderId::new("o-3");

        scheduler.schedule_once(&order, in_secs(30)).await.unwrap();
        scheduler.schedule_once(&order, in_secs(90)).await.unwrap();
        assert_eq!(scheduler.armed_jobs(), 1);

        assert_eq!(next_fire(&mut rx).await, Some(order));
        assert_eq!(next_fire(&mut rx).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn restore_fires_overdue_jobs() {
        let store = Arc::new(InMemoryJobStore::new());
        store
            .put(StoredJob {
                job_key: job_key_for(&OrderId::new("late")),
                group: ORDER_JOB_GROUP.to_string(),
                order_id: OrderId::new("late"),
                trigger_time: in_secs(-600),
            })
            .await
            .unwrap();
        store
            .put(StoredJob {
                job_key: JobKey::new("report-1"),
                group: "reports".to_string(),
                order_id: OrderId::new("unrelated"),
                trigger_time: in_secs(-600),
            })
            .await
            .unwrap();

        let (scheduler, mut rx) = scheduler(Arc::clone(&store));
        assert_eq!(scheduler.restore().await.unwrap(), 1);

        assert_eq!(next_fire(&mut rx).await, Some(OrderId::new("late")));
        assert_eq!(next_fire(&mut rx).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_keeps_stored_jobs() {
        let store = Arc::new(InMemoryJobStore::new());
        let (scheduler, mut rx) = scheduler(Arc::clone(&store));

        scheduler
            .schedule_once(&OrderId::new("o-4"), in_secs(60))
            .await
            .unwrap();
        scheduler.shutdown();

        let err = scheduler
            .schedule_once(&OrderId::new("o-5"), in_secs(60))
            .await
            .unwrap_err();
        assert_eq!(err, SchedulerError::ShutDown);
        assert_eq!(scheduler.restore().await.unwrap_err(), SchedulerError::ShutDown);

        assert_eq!(next_fire(&mut rx).await, None);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
