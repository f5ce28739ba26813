use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub birthday: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(rename = "_page")]
    pub page: Option<usize>,
    #[serde(rename = "_limit")]
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub email: String,
}

/// Users in insertion order.
pub type Db = Arc<RwLock<Vec<User>>>;

pub struct NotFound;

impl IntoResponse for NotFound {
    fn into_response(self) -> Response {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "User not found" })),
        )
            .into_response()
    }
}

pub fn app() -> Router {
    app_with(Vec::new())
}

pub fn app_with(users: Vec<User>) -> Router {
    let db: Db = Arc::new(RwLock::new(users));
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/filter", get(filter_users))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(db)
}

/// `count` demo users named `User 1..=count`.
pub fn seed_users(count: usize) -> Vec<User> {
    (1..=count)
        .map(|i| User {
            id: Uuid::new_v4(),
            name: format!("User {i}"),
            email: format!("user{i}@example.com"),
            birthday: Some(format!("1990-01-{:02}", (i - 1) % 28 + 1)),
            password: None,
        })
        .collect()
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

/// json-server style listing: paged when `_page` or `_limit` is given, with
/// the total in `X-Total-Count`.
async fn list_users(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let users = db.read().await;
    let total = users.len();
    let page: Vec<User> = match (params.page, params.limit) {
        (None, None) => users.to_vec(),
        (page, limit) => {
            let page = page.unwrap_or(1).max(1);
            let limit = limit.unwrap_or(10).max(1);
            users
                .iter()
                .skip((page - 1) * limit)
                .take(limit)
                .cloned()
                .collect()
        }
    };
    ([("x-total-count", total.to_string())], Json(page))
}

/// Every user whose email contains `email`, case-insensitive. Paging
/// parameters are ignored.
async fn filter_users(
    State(db): State<Db>,
    Query(params): Query<FilterParams>,
) -> Json<serde_json::Value> {
    let needle = params.email.to_lowercase();
    let users = db.read().await;
    let matches: Vec<User> = users
        .iter()
        .filter(|u| u.email.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    let total = matches.len();
    tracing::debug!(email = %params.email, total, "filter");
    Json(json!({
        "data": matches,
        "pagination": { "_page": 1, "_limit": total, "_totalRows": total }
    }))
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<CreateUser>,
) -> (StatusCode, Json<User>) {
    let user = User {
        id: Uuid::new_v4(),
        name: input.name,
        email: input.email,
        birthday: input.birthday,
        password: input.password,
    };
    db.write().await.push(user.clone());
    tracing::info!(id = %user.id, "created user");
    (StatusCode::CREATED, Json(user))
}

async fn get_user(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<User>, NotFound> {
    let users = db.read().await;
    users
        .iter()
        .find(|u| u.id == id)
        .cloned()
        .map(Json)
        .ok_or(NotFound)
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUser>,
) -> Result<Json<User>, NotFound> {
    let mut users = db.write().await;
    let user = users.iter_mut().find(|u| u.id == id).ok_or(NotFound)?;
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(email) = input.email {
        user.email = email;
    }
    if let Some(birthday) = input.birthday {
        user.birthday = Some(birthday);
    }
    if let Some(password) = input.password {
        user.password = Some(password);
    }
    Ok(Json(user.clone()))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<StatusCode, NotFound> {
    let mut users = db.write().await;
    let index = users.iter().position(|u| u.id == id).ok_or(NotFound)?;
    users.remove(index);
    tracing::info!(%id, "deleted user");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serializes_without_absent_fields() {
        let user = User {
            id: Uuid::nil(),
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            birthday: None,
            password: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["name"], "Ann");
        assert!(json.get("birthday").is_none());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn create_user_defaults_missing_fields() {
        let input: CreateUser = serde_json::from_str(r#"{"email":"a@b.c"}"#).unwrap();
        assert_eq!(input.name, "");
        assert_eq!(input.email, "a@b.c");
        assert!(input.birthday.is_none());
    }

    #[test]
    fn create_user_rejects_wrong_types() {
        let result: Result<CreateUser, _> = serde_json::from_str(r#"{"name":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_user_all_fields_optional() {
        let input: UpdateUser = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.name.is_none());
        assert!(input.email.is_none());
    }

    #[test]
    fn seed_users_are_numbered() {
        let users = seed_users(30);
        assert_eq!(users.len(), 30);
        assert_eq!(users[0].name, "User 1");
        assert_eq!(users[29].email, "user30@example.com");
        assert_eq!(users[28].birthday.as_deref(), Some("1990-01-01"));
    }
}
