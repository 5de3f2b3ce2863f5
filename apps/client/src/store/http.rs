//! HTTP client for the LUMI backend.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};
use uuid::Uuid;

use lumi_core::api::{
    ConnectionResponse, CreateAchievementsRequest, CreateCaptureRequest, CreatePostRequest,
    CreateTaskRequest, DeleteResponse, ErrorBody, StatsEventRequest, StatsEventResponse,
    StatsSnapshot, UpdateAchievementRequest, UpdateTaskRequest, USER_ID_HEADER,
};
use lumi_core::{AchievementProgress, CommunityPost, QuickCapture, Task};

use super::{RemoteStore, STATS_FEED_BUFFER};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

// === API Response Types ===

#[derive(Debug, Deserialize)]
struct TaskListResponse {
    tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
struct AchievementListResponse {
    rows: Vec<AchievementProgress>,
}

#[derive(Debug, Deserialize)]
struct CaptureListResponse {
    captures: Vec<QuickCapture>,
}

#[derive(Debug, Deserialize)]
struct PostListResponse {
    posts: Vec<CommunityPost>,
}

/// Inner state shared across clones.
struct HttpStoreInner {
    client: Client,
    backend_url: String,
    user_id: Uuid,
}

/// Backend-backed store for one user.
///
/// Cheap to clone; every request carries the user id header.
#[derive(Clone)]
pub struct HttpStore {
    inner: Arc<HttpStoreInner>,
}

impl HttpStore {
    pub fn new(backend_url: impl Into<String>, user_id: Uuid) -> Self {
        let backend_url: String = backend_url.into();
        Self {
            inner: Arc::new(HttpStoreInner {
                client: Client::new(),
                backend_url: backend_url.trim_end_matches('/').to_string(),
                user_id,
            }),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.backend_url.clone(), config.user_id)
    }

    pub fn user_id(&self) -> Uuid {
        self.inner.user_id
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner
            .client
            .request(method, format!("{}{}", self.inner.backend_url, path))
            .header(USER_ID_HEADER, self.inner.user_id.to_string())
    }

    /// WebSocket URL of the stats feed.
    fn stats_feed_url(&self) -> String {
        let base = &self.inner.backend_url;
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.clone()
        };
        format!("{}/ws/stats", ws_base)
    }

    /// Upgrade request for the stats feed, identified like every other call.
    fn stats_feed_request(&self) -> Result<Request> {
        let mut request = self
            .stats_feed_url()
            .into_client_request()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        let user_id = HeaderValue::from_str(&self.inner.user_id.to_string())
            .map_err(|e| ClientError::Config(e.to_string()))?;
        request.headers_mut().insert(USER_ID_HEADER, user_id);
        Ok(request)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let resp = builder.send().await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(error_message(resp).await));
        }
        if !status.is_success() {
            let message = error_message(resp).await;
            return Err(ClientError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}

/// Prefer the `message` of a JSON error body, fall back to the raw text.
async fn error_message(resp: Response) -> String {
    let text = resp.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text)
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn check_connection(&self) -> Result<bool> {
        let response: ConnectionResponse = self.send(self.request(Method::GET, "/api/connection")).await?;
        Ok(response.connected)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let response: TaskListResponse = self.send(self.request(Method::GET, "/api/tasks")).await?;
        Ok(response.tasks)
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task> {
        self.send(self.request(Method::POST, "/api/tasks").json(request))
            .await
    }

    async fn set_task_completed(&self, task_id: Uuid, completed: bool) -> Result<Task> {
        let path = format!("/api/tasks/{}", task_id);
        self.send(
            self.request(Method::PATCH, &path)
                .json(&UpdateTaskRequest { completed }),
        )
        .await
    }

    async fn advance_task_step(&self, task_id: Uuid) -> Result<Task> {
        let path = format!("/api/tasks/{}/step", task_id);
        self.send(self.request(Method::POST, &path)).await
    }

    async fn delete_task(&self, task_id: Uuid) -> Result<bool> {
        let path = format!("/api/tasks/{}", task_id);
        let response: DeleteResponse = self.send(self.request(Method::DELETE, &path)).await?;
        Ok(response.deleted)
    }

    async fn get_stats(&self) -> Result<StatsSnapshot> {
        self.send(self.request(Method::GET, "/api/stats")).await
    }

    async fn record_stats_event(&self, request: StatsEventRequest) -> Result<StatsEventResponse> {
        self.send(self.request(Method::POST, "/api/stats/events").json(&request))
            .await
    }

    async fn subscribe_stats(&self) -> Result<mpsc::Receiver<StatsSnapshot>> {
        let request = self.stats_feed_request()?;
        let url = request.uri().to_string();
        let (mut stream, _) = connect_async(request)
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        debug!(url = %url, "Stats feed connected");

        let (tx, rx) = mpsc::channel(STATS_FEED_BUFFER);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = stream.next() => match frame {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<StatsSnapshot>(&text) {
                                Ok(snapshot) => {
                                    if tx.send(snapshot).await.is_err() {
                                        break;
                                    }
                                }
                                Err(e) => warn!(error = %e, "Unreadable stats frame"),
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => {
                            warn!(error = %e, "Stats feed error");
                            break;
                        }
                        Some(Ok(_)) => {}
                    },
                    _ = tx.closed() => break,
                }
            }
            let _ = stream.close(None).await;
            debug!("Stats feed closed");
        });

        Ok(rx)
    }

    async fn list_achievements(&self) -> Result<Vec<AchievementProgress>> {
        let response: AchievementListResponse =
            self.send(self.request(Method::GET, "/api/achievements")).await?;
        Ok(response.rows)
    }

    async fn create_achievements(&self, achievement_ids: &[String]) -> Result<Vec<AchievementProgress>> {
        let request = CreateAchievementsRequest {
            achievement_ids: achievement_ids.to_vec(),
        };
        let response: AchievementListResponse = self
            .send(self.request(Method::POST, "/api/achievements").json(&request))
            .await?;
        Ok(response.rows)
    }

    async fn update_achievement(&self, achievement_id: &str, progress: i32) -> Result<AchievementProgress> {
        let path = format!("/api/achievements/{}", achievement_id);
        self.send(
            self.request(Method::PUT, &path)
                .json(&UpdateAchievementRequest { progress }),
        )
        .await
    }

    async fn list_captures(&self) -> Result<Vec<QuickCapture>> {
        let response: CaptureListResponse = self.send(self.request(Method::GET, "/api/captures")).await?;
        Ok(response.captures)
    }

    async fn create_capture(&self, request: &CreateCaptureRequest) -> Result<QuickCapture> {
        self.send(self.request(Method::POST, "/api/captures").json(request))
            .await
    }

    async fn delete_capture(&self, capture_id: Uuid) -> Result<bool> {
        let path = format!("/api/captures/{}", capture_id);
        let response: DeleteResponse = self.send(self.request(Method::DELETE, &path)).await?;
        Ok(response.deleted)
    }

    async fn list_posts(&self, limit: Option<i64>) -> Result<Vec<CommunityPost>> {
        let mut builder = self.request(Method::GET, "/api/community/posts");
        if let Some(limit) = limit {
            builder = builder.query(&[("limit", limit)]);
        }
        let response: PostListResponse = self.send(builder).await?;
        Ok(response.posts)
    }

    async fn create_post(&self, request: &CreatePostRequest) -> Result<CommunityPost> {
        self.send(self.request(Method::POST, "/api/community/posts").json(request))
            .await
    }

    async fn like_post(&self, post_id: Uuid) -> Result<CommunityPost> {
        let path = format!("/api/community/posts/{}/like", post_id);
        self.send(self.request(Method::POST, &path)).await
    }
}
