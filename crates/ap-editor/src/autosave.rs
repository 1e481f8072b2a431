//! Autosave Scheduler — debounces edits into a single draft write.
//!
//! Each prompt owns one slot: the latest pending text, at most one timer,
//! and an in-flight flag. A timer that elapses while a save is running
//! queues its text behind that save instead of racing it.

use crate::reconciler::Reconciler;
use ap_core::config::AutosaveConfig;
use ap_core::prompt::ResourceId;
use ap_core::status::AutosaveStatus;
use ap_store::StoreError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct Slot {
    pending: Option<String>,
    timer: Option<JoinHandle<()>>,
    /// Bumped whenever the timer is cancelled or replaced; stale timers
    /// compare against it and bail out.
    generation: u64,
    in_flight: bool,
    /// A timer elapsed during the in-flight save.
    fire_when_done: bool,
    status: watch::Sender<AutosaveStatus>,
    status_epoch: u64,
}

impl Slot {
    fn new() -> Self {
        let (status, _) = watch::channel(AutosaveStatus::Idle);
        Self {
            pending: None,
            timer: None,
            generation: 0,
            in_flight: false,
            fire_when_done: false,
            status,
            status_epoch: 0,
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation += 1;
    }

    fn set_status(&mut self, status: AutosaveStatus) {
        self.status_epoch += 1;
        self.status.send_replace(status);
    }

    fn begin_save(&mut self) {
        self.in_flight = true;
        self.set_status(AutosaveStatus::Saving);
    }
}

enum FlushStep {
    Done,
    Save(String),
    Wait(watch::Receiver<AutosaveStatus>),
}

struct Inner {
    reconciler: Arc<Reconciler>,
    config: AutosaveConfig,
    slots: Mutex<HashMap<ResourceId, Slot>>,
}

impl Inner {
    fn slots(&self) -> MutexGuard<'_, HashMap<ResourceId, Slot>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn on_timer(inner: &Arc<Inner>, id: &ResourceId, generation: u64) {
        let text = {
            let mut slots = inner.slots();
            let Some(slot) = slots.get_mut(id) else {
                return;
            };
            if slot.generation != generation {
                return;
            }
            slot.timer = None;
            if slot.in_flight {
                slot.fire_when_done = true;
                return;
            }
            let Some(text) = slot.pending.take() else {
                return;
            };
            slot.begin_save();
            text
        };

        let inner = Arc::clone(inner);
        let id = id.clone();
        tokio::spawn(async move {
            let _ = Inner::save_loop(&inner, &id, text).await;
        });
    }

    /// Write `text`, then any text queued while it was being written.
    /// Returns the result of the last write.
    async fn save_loop(
        inner: &Arc<Inner>,
        id: &ResourceId,
        mut text: String,
    ) -> Result<(), StoreError> {
        loop {
            let result = inner.reconciler.commit_draft(id, &text).await;
            match inner.finish_save(id, &text, &result) {
                Some(next) => text = next,
                None => return result,
            }
        }
    }

    /// Record the outcome of a write. Returns the next queued text, if any.
    /// Text that failed to persist goes back to pending unless a newer edit
    /// replaced it, so a later flush retries it.
    fn finish_save(
        self: &Arc<Self>,
        id: &ResourceId,
        text: &str,
        result: &Result<(), StoreError>,
    ) -> Option<String> {
        let mut slots = self.slots();
        let slot = slots.entry(id.clone()).or_insert_with(Slot::new);

        let window = match result {
            Ok(()) => {
                slot.set_status(AutosaveStatus::Saved);
                self.config.saved_display()
            }
            Err(e) => {
                tracing::warn!("Autosave failed for {id}: {e}");
                slot.set_status(AutosaveStatus::Error {
                    message: e.to_string(),
                });
                self.config.error_display()
            }
        };

        if slot.fire_when_done {
            slot.fire_when_done = false;
            if let Some(next) = slot.pending.take() {
                slot.set_status(AutosaveStatus::Saving);
                return Some(next);
            }
        }

        slot.in_flight = false;
        if result.is_err() && slot.pending.is_none() {
            slot.pending = Some(text.to_string());
        }
        self.schedule_reset(id.clone(), slot.status_epoch, window);
        None
    }

    fn schedule_reset(self: &Arc<Self>, id: ResourceId, epoch: u64, after: Duration) {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let mut slots = inner.slots();
            if let Some(slot) = slots.get_mut(&id) {
                if slot.status_epoch == epoch {
                    slot.set_status(AutosaveStatus::Idle);
                }
            }
        });
    }
}

/// Debounced, per-prompt draft persistence.
#[derive(Clone)]
pub struct AutosaveScheduler {
    inner: Arc<Inner>,
}

impl AutosaveScheduler {
    pub fn new(reconciler: Arc<Reconciler>, config: AutosaveConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                reconciler,
                config,
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Record the latest editor text and restart the quiet-period timer.
    ///
    /// Text identical to the authoritative content cancels any pending
    /// write instead, so no draft is created for unchanged content.
    pub fn notify_edit(&self, id: &ResourceId, authoritative: &str, text: &str) {
        let mut slots = self.inner.slots();
        let slot = slots.entry(id.clone()).or_insert_with(Slot::new);
        slot.cancel_timer();

        if text == authoritative {
            slot.pending = None;
            slot.fire_when_done = false;
            tracing::trace!("Edit for {id} matches server content, nothing to save");
            return;
        }

        slot.pending = Some(text.to_string());
        let generation = slot.generation;
        let inner = Arc::clone(&self.inner);
        let timer_id = id.clone();
        let delay = self.inner.config.debounce();
        slot.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            Inner::on_timer(&inner, &timer_id, generation);
        }));
    }

    /// Drop the pending write for `id` without persisting it.
    /// A write already in flight is left to finish.
    pub fn cancel(&self, id: &ResourceId) {
        let mut slots = self.inner.slots();
        if let Some(slot) = slots.get_mut(id) {
            slot.cancel_timer();
            slot.pending = None;
            slot.fire_when_done = false;
        }
    }

    /// Persist pending text now and wait until nothing is queued for `id`.
    pub async fn flush(&self, id: &ResourceId) -> Result<(), StoreError> {
        loop {
            match self.flush_step(id) {
                FlushStep::Done => return Ok(()),
                FlushStep::Save(text) => return Inner::save_loop(&self.inner, id, text).await,
                FlushStep::Wait(mut rx) => {
                    let _ = rx.wait_for(|s| *s != AutosaveStatus::Saving).await;
                }
            }
        }
    }

    fn flush_step(&self, id: &ResourceId) -> FlushStep {
        let mut slots = self.inner.slots();
        let Some(slot) = slots.get_mut(id) else {
            return FlushStep::Done;
        };
        slot.cancel_timer();

        if slot.in_flight {
            if slot.pending.is_some() {
                slot.fire_when_done = true;
            }
            return FlushStep::Wait(slot.status.subscribe());
        }

        match slot.pending.take() {
            Some(text) => {
                slot.begin_save();
                FlushStep::Save(text)
            }
            None => FlushStep::Done,
        }
    }

    pub fn status(&self, id: &ResourceId) -> AutosaveStatus {
        self.inner
            .slots()
            .get(id)
            .map(|slot| slot.status.borrow().clone())
            .unwrap_or_default()
    }

    /// Status channel for `id`, for front ends that display save progress.
    pub fn subscribe(&self, id: &ResourceId) -> watch::Receiver<AutosaveStatus> {
        self.inner
            .slots()
            .entry(id.clone())
            .or_insert_with(Slot::new)
            .status
            .subscribe()
    }

    #[cfg(test)]
    pub(crate) fn has_pending(&self, id: &ResourceId) -> bool {
        self.inner
            .slots()
            .get(id)
            .map(|slot| slot.pending.is_some())
            .unwrap_or(false)
    }
}
