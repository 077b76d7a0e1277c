//! Walk-in queue service
//!
//! Every mutation holds the queue lock until positions and estimates have been
//! rewritten, so readers never see a rank computed from a stale queue.

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;
use validator::Validate;

use super::wait_time::WaitTimeService;
use crate::{
    clock::Clock,
    error::{AppError, AppResult, Rejection},
    models::{JoinQueue, NewQueueEntry, QueueEntry, QueueStatus},
    repository::Store,
    scheduling::Simulation,
};

#[derive(Clone)]
pub struct QueueService {
    store: Arc<dyn Store>,
    wait_time: WaitTimeService,
    clock: Arc<dyn Clock>,
    lock: Arc<Mutex<()>>,
}

impl QueueService {
    pub fn new(store: Arc<dyn Store>, wait_time: WaitTimeService, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            wait_time,
            clock,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Add a walk-in customer at the tail of the queue
    pub async fn join(&self, request: JoinQueue) -> AppResult<QueueEntry> {
        request.validate()?;
        if let Some(barber_id) = request.barber_id {
            let barbers = self.store.active_barbers().await?;
            if !barbers.iter().any(|b| b.id == barber_id) {
                return Err(Rejection::Validation(format!(
                    "Barber {} is not on shift",
                    barber_id
                ))
                .into());
            }
        }

        let _guard = self.lock.lock().await;
        let mut entry = self
            .store
            .insert_queue_entry(NewQueueEntry {
                customer_name: request.customer_name.trim().to_string(),
                customer_phone: request.customer_phone,
                barber_id: request.barber_id,
                crea_date: self.clock.now(),
            })
            .await?;

        tracing::info!(entry_id = %entry.id, position = ?entry.position, "Walk-in joined the queue");

        if let Some(simulation) = self.recompute_after_mutation().await {
            if let Some(estimate) = simulation.estimates.iter().find(|e| e.id == entry.id) {
                entry.position = Some(estimate.position);
                entry.estimated_wait_minutes = Some(estimate.estimated_wait_minutes);
            }
        }
        Ok(entry)
    }

    /// Customer leaves before being served
    pub async fn leave(&self, id: Uuid) -> AppResult<()> {
        self.update_status(id, QueueStatus::Cancelled).await?;
        Ok(())
    }

    pub async fn update_status(&self, id: Uuid, status: QueueStatus) -> AppResult<QueueEntry> {
        let _guard = self.lock.lock().await;

        let current = self
            .store
            .get_queue_entry(id)
            .await?
            .ok_or(Rejection::QueueEntryNotFound(id))?;
        if !current.status.can_transition_to(status) {
            return Err(Rejection::InvalidStatusTransition {
                from: current.status.to_string(),
                to: status.to_string(),
            }
            .into());
        }

        let updated = self
            .store
            .transition_queue_entry(id, current.status, status, self.clock.now())
            .await?
            .ok_or_else(|| {
                AppError::ConcurrentModification(format!("Queue entry {} changed status", id))
            })?;

        tracing::info!(
            entry_id = %id,
            from = %current.status,
            to = %status,
            "Queue entry status changed"
        );

        self.recompute_after_mutation().await;
        Ok(updated)
    }

    /// Rewrite position and estimate of every waiting entry
    pub async fn recompute_positions(&self) -> AppResult<Simulation> {
        let _guard = self.lock.lock().await;
        self.recompute_locked().await
    }

    /// Waiting entries by position, then those in service
    pub async fn list(&self) -> AppResult<Vec<QueueEntry>> {
        let mut entries = self.store.active_queue().await?;
        entries.sort_by_key(|e| (e.status != QueueStatus::Waiting, e.position, e.join_seq));
        Ok(entries)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<QueueEntry> {
        self.store
            .get_queue_entry(id)
            .await?
            .ok_or_else(|| Rejection::QueueEntryNotFound(id).into())
    }

    // Caller holds `lock`
    async fn recompute_locked(&self) -> AppResult<Simulation> {
        let simulation = self.wait_time.simulate().await?;
        self.store
            .apply_queue_estimates(simulation.estimates.clone())
            .await?;
        tracing::debug!(
            waiting = simulation.queue_length(),
            current_wait_minutes = simulation.current_wait_minutes,
            "Queue positions recomputed"
        );
        Ok(simulation)
    }

    // The mutation is already committed; a failed recompute leaves estimates
    // stale until the next one succeeds.
    async fn recompute_after_mutation(&self) -> Option<Simulation> {
        match self.recompute_locked().await {
            Ok(simulation) => Some(simulation),
            Err(e) => {
                tracing::warn!("Queue recomputation failed: {}", e);
                None
            }
        }
    }
}
