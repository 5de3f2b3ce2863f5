//! Community feed hook.

use std::sync::Arc;

use uuid::Uuid;

use lumi_core::api::CreatePostRequest;
use lumi_core::{CommunityPost, CoreError};

use super::HookState;
use crate::error::Result;
use crate::store::RemoteStore;

/// Name and avatar attached to posts from this client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub avatar: String,
}

pub struct CommunityHook {
    store: Arc<dyn RemoteStore>,
    profile: Profile,
    state: HookState<Vec<CommunityPost>>,
}

impl CommunityHook {
    pub fn new(store: Arc<dyn RemoteStore>, profile: Profile) -> Self {
        Self {
            store,
            profile,
            state: HookState::default(),
        }
    }

    pub fn state(&self) -> &HookState<Vec<CommunityPost>> {
        &self.state
    }

    pub fn posts(&self) -> &[CommunityPost] {
        &self.state.items
    }

    pub async fn load(&mut self) -> Result<()> {
        self.state.begin();
        match self.store.list_posts(None).await {
            Ok(posts) => {
                self.state.items = posts;
                self.state.finish();
                Ok(())
            }
            Err(e) => Err(self.state.fail("load posts", e)),
        }
    }

    pub async fn post(&mut self, content: &str) -> Result<CommunityPost> {
        let content = content.trim();
        if content.is_empty() {
            return Err(self.state.fail("create post", CoreError::EmptyContent.into()));
        }

        self.state.error = None;
        let request = CreatePostRequest {
            user_name: self.profile.name.clone(),
            user_avatar: self.profile.avatar.clone(),
            content: content.to_string(),
        };
        match self.store.create_post(&request).await {
            Ok(post) => {
                self.state.items.insert(0, post.clone());
                Ok(post)
            }
            Err(e) => Err(self.state.fail("create post", e)),
        }
    }

    pub async fn like(&mut self, post_id: Uuid) -> Result<CommunityPost> {
        self.state.error = None;
        match self.store.like_post(post_id).await {
            Ok(post) => {
                if let Some(slot) = self.state.items.iter_mut().find(|p| p.id == post.id) {
                    *slot = post.clone();
                }
                Ok(post)
            }
            Err(e) => Err(self.state.fail("like post", e)),
        }
    }
}
