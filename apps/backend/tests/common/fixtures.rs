//! Test fixtures and factory functions for request bodies.

use serde_json::json;
use uuid::Uuid;

/// Create a task request body.
pub fn create_task_request(title: &str, priority: Option<&str>) -> serde_json::Value {
    match priority {
        Some(p) => json!({ "title": title, "priority": p }),
        None => json!({ "title": title }),
    }
}

/// Create a task request body with steps.
pub fn create_task_with_steps(title: &str, steps: &[&str]) -> serde_json::Value {
    json!({ "title": title, "priority": "medium", "steps": steps })
}

/// Create a completion update body.
pub fn update_task_request(completed: bool) -> serde_json::Value {
    json!({ "completed": completed })
}

/// Create a stats event body.
pub fn stats_event_request(trigger: &str, event_id: Option<Uuid>) -> serde_json::Value {
    match event_id {
        Some(id) => json!({ "trigger": trigger, "event_id": id }),
        None => json!({ "trigger": trigger }),
    }
}

/// Create an achievement rows body.
pub fn create_achievements_request(ids: &[&str]) -> serde_json::Value {
    json!({ "achievement_ids": ids })
}

/// Create an achievement progress body.
pub fn update_achievement_request(progress: i32) -> serde_json::Value {
    json!({ "progress": progress })
}

/// Create a capture body.
pub fn create_capture_request(content: &str, capture_type: &str) -> serde_json::Value {
    json!({ "content": content, "type": capture_type })
}

/// Create a community post body.
pub fn create_post_request(content: &str) -> serde_json::Value {
    json!({
        "user_name": "Test User",
        "user_avatar": "🙂",
        "content": content
    })
}
