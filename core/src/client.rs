//! Stateless HTTP request builder and response parser for the users API.
//!
//! # Design
//! `UsersClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The host executes the HTTP round-trip, keeping the core deterministic and
//! free of I/O dependencies.
//!
//! Responses are decoded in one place (`decode_body`): the body is parsed
//! as JSON when non-empty, then the status is checked. A malformed body is a
//! `Parse` error regardless of status.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::paging;
use crate::types::{PageQuery, PageResult, UserFields, UserId, UserRecord};

/// Synchronous, stateless client for the users API.
#[derive(Debug, Clone)]
pub struct UsersClient {
    base_url: String,
}

impl UsersClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_get_user(&self, id: &UserId) -> HttpRequest {
        self.request(HttpMethod::Get, self.user_path(id), None)
    }

    pub fn build_create_user(&self, fields: &UserFields) -> Result<HttpRequest, ApiError> {
        let body = encode_body(fields)?;
        Ok(self.request(HttpMethod::Post, format!("{}/users", self.base_url), Some(body)))
    }

    pub fn build_update_user(
        &self,
        id: &UserId,
        fields: &UserFields,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode_body(fields)?;
        Ok(self.request(HttpMethod::Put, self.user_path(id), Some(body)))
    }

    pub fn build_delete_user(&self, id: &UserId) -> HttpRequest {
        self.request(HttpMethod::Delete, self.user_path(id), None)
    }

    /// `GET /users` with arbitrary query parameters, values percent-encoded
    /// and sent in the given order.
    pub fn build_list_users_raw(&self, params: &[(&str, &str)]) -> HttpRequest {
        let path = with_query(format!("{}/users", self.base_url), params);
        self.request(HttpMethod::Get, path, None)
    }

    /// Page request: the filter endpoint when a search term is present
    /// (paging parameters are not sent), the listing endpoint otherwise.
    pub fn build_list_users_paged(&self, query: &PageQuery) -> HttpRequest {
        let path = match query.q.as_deref() {
            Some(q) => with_query(format!("{}/users/filter", self.base_url), &[("email", q)]),
            None => {
                let page = query.page.to_string();
                let limit = query.limit.to_string();
                with_query(
                    format!("{}/users", self.base_url),
                    &[("_page", page.as_str()), ("_limit", limit.as_str())],
                )
            }
        };
        tracing::debug!(page = query.page, limit = query.limit, q = ?query.q, %path, "built page request");
        self.request(HttpMethod::Get, path, None)
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<UserRecord, ApiError> {
        decode_record(&response)
    }

    /// The stored record, or `None` when a 2xx response has no body.
    pub fn parse_create_user(
        &self,
        response: HttpResponse,
    ) -> Result<Option<UserRecord>, ApiError> {
        decode_body(&response)?.map(from_value).transpose()
    }

    /// The stored record, or `None` for a bodiless 2xx such as 204.
    pub fn parse_update_user(
        &self,
        response: HttpResponse,
    ) -> Result<Option<UserRecord>, ApiError> {
        decode_body(&response)?.map(from_value).transpose()
    }

    /// Any 2xx counts as deleted, whatever the body.
    pub fn parse_delete_user(&self, response: HttpResponse) -> Result<(), ApiError> {
        decode_body(&response).map(|_| ())
    }

    /// Decoded body of a raw listing call; `Value::Null` for an empty body.
    pub fn parse_list_users_raw(&self, response: HttpResponse) -> Result<Value, ApiError> {
        Ok(decode_body(&response)?.unwrap_or(Value::Null))
    }

    pub fn parse_list_users_paged(
        &self,
        query: &PageQuery,
        response: HttpResponse,
    ) -> Result<PageResult, ApiError> {
        let body = decode_body(&response)?;
        paging::normalize(query, body, response.header(paging::TOTAL_COUNT_HEADER))
    }

    fn user_path(&self, id: &UserId) -> String {
        format!("{}/users/{}", self.base_url, urlencoding::encode(id.as_str()))
    }

    fn request(&self, method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
        let headers = if body.is_some() {
            vec![("content-type".to_string(), "application/json".to_string())]
        } else {
            Vec::new()
        };
        HttpRequest {
            method,
            path,
            headers,
            body,
        }
    }
}

fn encode_body(fields: &UserFields) -> Result<String, ApiError> {
    serde_json::to_string(fields).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn with_query(mut path: String, params: &[(&str, &str)]) -> String {
    for (i, (key, value)) in params.iter().enumerate() {
        path.push(if i == 0 { '?' } else { '&' });
        path.push_str(&urlencoding::encode(key));
        path.push('=');
        path.push_str(&urlencoding::encode(value));
    }
    path
}

/// Parse the body (if any) and map non-2xx statuses to `ApiError::Http`.
pub(crate) fn decode_body(response: &HttpResponse) -> Result<Option<Value>, ApiError> {
    let data = if response.body.trim().is_empty() {
        None
    } else {
        Some(
            serde_json::from_str::<Value>(&response.body)
                .map_err(|e| ApiError::Parse(e.to_string()))?,
        )
    };
    if !response.is_success() {
        return Err(ApiError::http(response.status, data, response.status_text()));
    }
    Ok(data)
}

fn decode_record(response: &HttpResponse) -> Result<UserRecord, ApiError> {
    match decode_body(response)? {
        Some(value) => from_value(value),
        None => Err(ApiError::Parse("expected a user record, got an empty body".to_string())),
    }
}

pub(crate) fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> UsersClient {
        UsersClient::new("http://localhost:3001/api")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_get_user_produces_correct_request() {
        let req = client().build_get_user(&UserId::new("12"));
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3001/api/users/12");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn user_id_is_percent_encoded_in_path() {
        let req = client().build_delete_user(&UserId::new("a b/c"));
        assert_eq!(req.path, "http://localhost:3001/api/users/a%20b%2Fc");
    }

    #[test]
    fn build_create_user_produces_correct_request() {
        let fields = UserFields {
            name: Some("Ann".to_string()),
            email: Some("ann@example.com".to_string()),
            birthday: Some("1990-04-01".to_string()),
            password: Some("hunter2".to_string()),
        };
        let req = client().build_create_user(&fields).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3001/api/users");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "Ann",
                "email": "ann@example.com",
                "birthday": "1990-04-01",
                "password": "hunter2"
            })
        );
    }

    #[test]
    fn build_update_user_produces_correct_request() {
        let fields = UserFields {
            email: Some("new@example.com".to_string()),
            ..UserFields::default()
        };
        let req = client().build_update_user(&UserId::new("3"), &fields).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3001/api/users/3");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({ "email": "new@example.com" }));
    }

    #[test]
    fn build_list_paged_uses_listing_endpoint_without_search() {
        let req = client().build_list_users_paged(&PageQuery::new(2, 10, None));
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3001/api/users?_page=2&_limit=10");
    }

    #[test]
    fn build_list_paged_uses_filter_endpoint_with_search() {
        let query = PageQuery::new(3, 5, Some("ann+1@example.com".to_string()));
        let req = client().build_list_users_paged(&query);
        assert_eq!(
            req.path,
            "http://localhost:3001/api/users/filter?email=ann%2B1%40example.com"
        );
        assert!(!req.path.contains("_page"));
    }

    #[test]
    fn build_list_raw_keeps_parameter_order() {
        let req = client().build_list_users_raw(&[("_sort", "name"), ("_order", "desc")]);
        assert_eq!(req.path, "http://localhost:3001/api/users?_sort=name&_order=desc");
        let req = client().build_list_users_raw(&[]);
        assert_eq!(req.path, "http://localhost:3001/api/users");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = UsersClient::new("http://localhost:3001/api/");
        let req = client.build_get_user(&UserId::new("1"));
        assert_eq!(req.path, "http://localhost:3001/api/users/1");
    }

    #[test]
    fn parse_get_user_success() {
        let user = client()
            .parse_get_user(response(200, r#"{"id":1,"name":"Ann","email":"ann@example.com"}"#))
            .unwrap();
        assert_eq!(user.id, Some(UserId::new("1")));
        assert_eq!(user.name.as_deref(), Some("Ann"));
    }

    #[test]
    fn parse_get_user_not_found_carries_server_body() {
        let err = client()
            .parse_get_user(response(404, r#"{"message":"User not found"}"#))
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message(), "User not found");
    }

    #[test]
    fn error_status_with_empty_body_uses_status_text() {
        let err = client().parse_update_user(response(500, "")).unwrap_err();
        match err {
            ApiError::Http { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, json!({ "message": "Internal Server Error" }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_parse_error_even_on_error_status() {
        let err = client().parse_create_user(response(500, "<html>oops</html>")).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn parse_get_user_with_empty_body_is_parse_error() {
        let err = client().parse_get_user(response(200, "")).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn bodiless_save_responses_are_success() {
        assert_eq!(client().parse_create_user(response(201, "")).unwrap(), None);
        assert_eq!(client().parse_update_user(response(204, "")).unwrap(), None);
        let user = client()
            .parse_update_user(response(200, r#"{"id":"3","name":"Ann"}"#))
            .unwrap()
            .unwrap();
        assert_eq!(user.name.as_deref(), Some("Ann"));
    }

    #[test]
    fn parse_delete_user_accepts_any_2xx_body() {
        assert!(client().parse_delete_user(response(204, "")).is_ok());
        assert!(client().parse_delete_user(response(200, "{}")).is_ok());
    }

    #[test]
    fn parse_delete_user_not_found() {
        let err = client().parse_delete_user(response(404, "")).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message(), "Not Found");
    }

    #[test]
    fn parse_list_raw_returns_null_for_empty_body() {
        let value = client().parse_list_users_raw(response(200, "")).unwrap();
        assert!(value.is_null());
        let value = client().parse_list_users_raw(response(200, "[1,2]")).unwrap();
        assert_eq!(value, json!([1, 2]));
    }
}
