//! Test doubles for the draft store and providers.

use ap_core::prompt::{PromptRecord, PromptVersion, ResourceId};
use ap_providers::{ChangeDescriber, PromptSource, ProviderError, ProviderResult, VersionCreator};
use ap_store::{DraftStore, MemoryDraftStore, StoreError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Memory store that records writes, can be slowed down and can fail.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryDraftStore,
    pub writes: Mutex<Vec<(ResourceId, String)>>,
    pub removes: AtomicUsize,
    pub write_delay: Option<Duration>,
    pub fail_writes: AtomicBool,
    active: AtomicUsize,
    pub max_concurrent: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            write_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn written(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

#[async_trait]
impl DraftStore for RecordingStore {
    async fn get(&self, id: &ResourceId) -> Option<String> {
        self.inner.get(id).await
    }

    async fn set(&self, id: &ResourceId, text: &str) -> Result<(), StoreError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(now, Ordering::SeqCst);
        self.writes
            .lock()
            .unwrap()
            .push((id.clone(), text.to_string()));

        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::StorageUnavailable("quota exceeded".into()))
        } else {
            self.inner.set(id, text).await
        };
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn remove(&self, id: &ResourceId) -> Result<(), StoreError> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(id).await
    }
}

/// Describer that either answers, fails, or never answers.
pub enum FakeDescriber {
    Answer(String),
    Fail,
    Hang,
}

#[async_trait]
impl ChangeDescriber for FakeDescriber {
    async fn describe_change(&self, _old: &str, _new: &str) -> ProviderResult<String> {
        match self {
            FakeDescriber::Answer(text) => Ok(text.clone()),
            FakeDescriber::Fail => Err(ProviderError::Http("connection refused".into())),
            FakeDescriber::Hang => std::future::pending().await,
        }
    }
}

/// Version creator that records calls and optionally fails. With a linked
/// source, a created version becomes that source's latest content.
#[derive(Default)]
pub struct FakeCreator {
    pub calls: Mutex<Vec<(ResourceId, String, String)>>,
    pub fail: bool,
    publish_to: Option<Arc<FakeSource>>,
}

impl FakeCreator {
    pub fn publishing_to(source: Arc<FakeSource>) -> Self {
        Self {
            publish_to: Some(source),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn last_description(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|c| c.2.clone())
    }
}

#[async_trait]
impl VersionCreator for FakeCreator {
    async fn create_version(
        &self,
        id: &ResourceId,
        template: &str,
        change_description: &str,
    ) -> ProviderResult<PromptVersion> {
        self.calls.lock().unwrap().push((
            id.clone(),
            template.to_string(),
            change_description.to_string(),
        ));
        if self.fail {
            return Err(ProviderError::Api {
                status: 500,
                body: "version store down".into(),
            });
        }
        if let Some(source) = &self.publish_to {
            source.set_content(template);
        }
        Ok(PromptVersion {
            id: Some("v-next".into()),
            prompt_id: Some(id.to_string()),
            commit: Some("c0ffee".into()),
            template: template.to_string(),
            change_description: change_description.to_string(),
        })
    }
}

/// Prompt source serving a mutable record, or failing when empty.
#[derive(Default)]
pub struct FakeSource {
    pub record: Mutex<Option<PromptRecord>>,
}

impl FakeSource {
    pub fn serving(content: &str, version: u64) -> Self {
        Self {
            record: Mutex::new(Some(PromptRecord {
                id: "r".into(),
                name: "support".into(),
                content: content.into(),
                version,
            })),
        }
    }

    pub fn set_content(&self, content: &str) {
        if let Some(record) = self.record.lock().unwrap().as_mut() {
            record.content = content.into();
            record.version += 1;
        }
    }
}

#[async_trait]
impl PromptSource for FakeSource {
    async fn fetch_prompt(&self, _id: &ResourceId) -> ProviderResult<PromptRecord> {
        self.record
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ProviderError::Http("unreachable".into()))
    }
}
