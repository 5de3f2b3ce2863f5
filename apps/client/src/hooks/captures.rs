//! Quick capture hook.

use std::sync::Arc;

use uuid::Uuid;

use lumi_core::api::CreateCaptureRequest;
use lumi_core::{CaptureType, CoreError, QuickCapture};

use super::HookState;
use crate::error::Result;
use crate::store::RemoteStore;

pub struct CaptureHook {
    store: Arc<dyn RemoteStore>,
    state: HookState<Vec<QuickCapture>>,
}

impl CaptureHook {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            state: HookState::default(),
        }
    }

    pub fn state(&self) -> &HookState<Vec<QuickCapture>> {
        &self.state
    }

    /// Newest first.
    pub fn captures(&self) -> &[QuickCapture] {
        &self.state.items
    }

    pub async fn load(&mut self) -> Result<()> {
        self.state.begin();
        match self.store.list_captures().await {
            Ok(captures) => {
                self.state.items = captures;
                self.state.finish();
                Ok(())
            }
            Err(e) => Err(self.state.fail("load captures", e)),
        }
    }

    pub async fn add(&mut self, content: &str, capture_type: CaptureType) -> Result<QuickCapture> {
        let content = content.trim();
        if content.is_empty() {
            return Err(self.state.fail("add capture", CoreError::EmptyContent.into()));
        }

        self.state.error = None;
        let request = CreateCaptureRequest {
            content: content.to_string(),
            capture_type,
        };
        match self.store.create_capture(&request).await {
            Ok(capture) => {
                self.state.items.insert(0, capture.clone());
                Ok(capture)
            }
            Err(e) => Err(self.state.fail("add capture", e)),
        }
    }

    pub async fn delete(&mut self, capture_id: Uuid) -> Result<()> {
        self.state.error = None;
        match self.store.delete_capture(capture_id).await {
            Ok(_) => {
                self.state.items.retain(|c| c.id != capture_id);
                Ok(())
            }
            Err(e) => Err(self.state.fail("delete capture", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn captures_are_listed_newest_first() {
        let store = MemoryStore::new(Uuid::new_v4());
        let mut hook = CaptureHook::new(Arc::new(store));
        hook.add("buy milk", CaptureType::Text).await.unwrap();
        hook.add("  call back Sam  ", CaptureType::Text).await.unwrap();

        assert_eq!(hook.captures()[0].content, "call back Sam");

        hook.load().await.unwrap();
        assert_eq!(hook.captures().len(), 2);
        assert!(hook.captures()[0].timestamp >= hook.captures()[1].timestamp);
    }

    #[tokio::test]
    async fn blank_capture_is_rejected() {
        let store = MemoryStore::new(Uuid::new_v4());
        let mut hook = CaptureHook::new(Arc::new(store));
        assert!(hook.add(" \n ", CaptureType::Text).await.is_err());
        assert_eq!(hook.state().error.as_deref(), Some("Empty content"));
    }

    #[tokio::test]
    async fn delete_removes_locally_after_remote() {
        let store = MemoryStore::new(Uuid::new_v4());
        let mut hook = CaptureHook::new(Arc::new(store));
        let capture = hook.add("idea", CaptureType::Text).await.unwrap();
        hook.delete(capture.id).await.unwrap();
        assert!(hook.captures().is_empty());
    }
}
