//! Task endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

use super::error::ApiError;
use super::extract::{ApiJson, ApiQuery};
use super::routes::AppState;
use super::types::{MessageResponse, TaskListResponse, TaskResponse};
use crate::account::Actor;
use crate::task::{Capabilities, TaskInput, TaskQuery, TaskSummary, TaskView};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/:id", put(update_task).delete(delete_task))
}

/// List the tasks visible to the caller.
///
/// The summary counts the whole visible list; `search`/`status`/`sort` only
/// shape the returned `tasks`.
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiQuery(query): ApiQuery<TaskQuery>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let visible = state.tasks.list_tasks(&actor).await?;
    let summary = TaskSummary::from_tasks(&visible, Utc::now().date_naive());
    let tasks = query
        .apply(&visible)
        .into_iter()
        .map(|task| TaskView::new(&actor, task))
        .collect();

    Ok(Json(TaskListResponse {
        tasks,
        summary,
        capabilities: Capabilities::for_actor(&actor),
    }))
}

pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let input = TaskInput::from_json(&body)?;
    let task = state.tasks.create_task(&actor, &input).await?;
    tracing::info!(task_id = %task.id, actor = %actor.email, "Created task");

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse::new(
            "Task created successfully",
            TaskView::new(&actor, task),
        )),
    ))
}

pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.tasks.update_from_json(&actor, &id, &body).await?;
    tracing::info!(task_id = %task.id, actor = %actor.email, "Updated task");

    Ok(Json(TaskResponse::new(
        "Task updated successfully",
        TaskView::new(&actor, task),
    )))
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.tasks.delete_task(&actor, &id).await?;
    tracing::info!(task_id = %id, actor = %actor.email, "Deleted task");

    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Registration, Role};
    use crate::api::routes::test_state;
    use crate::task::{Assignee, SortOrder};
    use serde_json::json;

    async fn actor(state: &Arc<AppState>, email: &str, role: &str) -> Actor {
        let account = state
            .accounts
            .register(Registration {
                name: None,
                email: Some(email.to_string()),
                password: Some("secret1".to_string()),
                role: Some(role.to_string()),
            })
            .await
            .unwrap();
        Actor::from(&account)
    }

    async fn create(state: &Arc<AppState>, manager: &Actor, body: Value) -> TaskView {
        let (status, Json(resp)) = create_task(
            State(state.clone()),
            Extension(manager.clone()),
            ApiJson(body),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        resp.task
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let state = test_state();
        let boss = actor(&state, "boss@x.com", "manager").await;
        let alice = actor(&state, "alice@x.com", "employee").await;

        let view = create(
            &state,
            &boss,
            json!({"title": "Write report", "assignedTo": "alice@x.com", "priority": "High"}),
        )
        .await;
        assert_eq!(
            view.task.assigned_to,
            Assignee::Employee("alice@x.com".to_string())
        );
        assert!(view.can_edit);
        create(&state, &boss, json!({"title": "Unassigned chore"})).await;

        let Json(list) = list_tasks(
            State(state.clone()),
            Extension(alice.clone()),
            ApiQuery(TaskQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(list.tasks.len(), 1);
        assert_eq!(list.summary.total, 1);
        assert!(list.tasks[0].can_toggle_completion);
        assert!(!list.tasks[0].can_edit);
        assert!(!list.capabilities.can_create_tasks);

        let Json(list) = list_tasks(
            State(state),
            Extension(boss),
            ApiQuery(TaskQuery {
                sort: SortOrder::CreatedAsc,
                ..TaskQuery::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(list.summary.total, 2);
        assert_eq!(list.tasks[0].task.title, "Write report");
    }

    #[tokio::test]
    async fn test_employee_create_is_forbidden() {
        let state = test_state();
        let alice = actor(&state, "alice@x.com", "employee").await;
        let err = create_task(
            State(state),
            Extension(alice),
            ApiJson(json!({"title": "Sneaky"})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.kind, "Unauthorized");
    }

    #[tokio::test]
    async fn test_create_validation_is_bad_request() {
        let state = test_state();
        let boss = actor(&state, "boss@x.com", "manager").await;
        for (body, kind) in [
            (json!({"title": "  "}), "InvalidTitle"),
            (json!({"title": "x", "priority": "Urgent"}), "InvalidPriority"),
            (json!({"title": "x", "assignedTo": "ghost@x.com"}), "UnknownAssignee"),
            (json!({"title": "x", "dueDate": "soon"}), "InvalidDueDate"),
            (json!({"title": "x", "completed": true}), "UnknownField"),
        ] {
            let err = create_task(State(state.clone()), Extension(boss.clone()), ApiJson(body))
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.kind, kind);
        }
    }

    #[tokio::test]
    async fn test_employee_update_rules() {
        let state = test_state();
        let boss = actor(&state, "boss@x.com", "manager").await;
        let alice = actor(&state, "alice@x.com", "employee").await;
        let bob = actor(&state, "bob@x.com", "employee").await;
        let view = create(
            &state,
            &boss,
            json!({"title": "Report", "assignedTo": "alice@x.com"}),
        )
        .await;
        let id = view.task.id.to_string();

        let Json(resp) = update_task(
            State(state.clone()),
            Extension(alice.clone()),
            Path(id.clone()),
            ApiJson(json!({"completed": true})),
        )
        .await
        .unwrap();
        assert!(resp.task.task.completed);

        let err = update_task(
            State(state.clone()),
            Extension(alice),
            Path(id.clone()),
            ApiJson(json!({"completed": false, "title": "Renamed"})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.kind, "FieldRestrictionViolation");

        let err = update_task(
            State(state),
            Extension(bob),
            Path(id),
            ApiJson(json!({"completed": false})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, "Unauthorized");
    }

    #[tokio::test]
    async fn test_update_authorizes_before_type_checks() {
        let state = test_state();
        let boss = actor(&state, "boss@x.com", "manager").await;
        let alice = actor(&state, "alice@x.com", "employee").await;
        let bob = actor(&state, "bob@x.com", "employee").await;
        let view = create(
            &state,
            &boss,
            json!({"title": "Report", "assignedTo": "alice@x.com"}),
        )
        .await;
        let id = view.task.id.to_string();

        for (who, body, kind) in [
            (&alice, json!({"completed": true, "title": 5}), "FieldRestrictionViolation"),
            (&alice, json!({"completed": true, "createdBy": "x"}), "FieldRestrictionViolation"),
            (&bob, json!({"completed": "yes"}), "Unauthorized"),
            (&bob, json!({"title": 7}), "Unauthorized"),
        ] {
            let err = update_task(
                State(state.clone()),
                Extension(who.clone()),
                Path(id.clone()),
                ApiJson(body),
            )
            .await
            .unwrap_err();
            assert_eq!(err.status, StatusCode::FORBIDDEN);
            assert_eq!(err.kind, kind);
        }
    }

    #[tokio::test]
    async fn test_delete() {
        let state = test_state();
        let boss = actor(&state, "boss@x.com", "manager").await;
        let alice = actor(&state, "alice@x.com", "employee").await;
        let view = create(&state, &boss, json!({"title": "Old"})).await;
        let id = view.task.id.to_string();

        let err = delete_task(State(state.clone()), Extension(alice), Path(id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        delete_task(State(state.clone()), Extension(boss.clone()), Path(id.clone()))
            .await
            .unwrap();
        let err = delete_task(State(state), Extension(boss), Path(id))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_role_cannot_list() {
        let state = test_state();
        let stranger = Actor::new(uuid::Uuid::new_v4(), "s@x.com", Role::Unknown);
        let err = list_tasks(
            State(state),
            Extension(stranger),
            ApiQuery(TaskQuery::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }
}
