//! Sans-IO client core for the users management API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The host executes the HTTP
//! round-trip, which keeps the core deterministic and testable.
//!
//! # Design
//! - `UsersClient` is stateless; it holds only the configured `base_url`.
//! - Each operation is split into `build_*` (produces a request) and
//!   `parse_*` (consumes a response), so the I/O boundary is explicit.
//! - `paging` reconciles the different page response shapes into a single
//!   `PageResult` with at most `limit` items.
//! - `ListController` owns list, delete, modal and notification state and
//!   speaks to the host in ticketed `Effect`s, so stale responses can be
//!   recognized and dropped.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod http;
pub mod paging;
pub mod types;
pub mod view;

pub use client::UsersClient;
pub use config::Config;
pub use controller::{
    DeleteState, Effect, ListController, ListStatus, Modal, Notice, NoticeKind, Outcome, Ticket,
};
pub use error::ApiError;
pub use form::{EditTarget, FormStatus, UserForm};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use paging::ResponseShape;
pub use types::{PageQuery, PageResult, UserFields, UserId, UserRecord};
pub use view::{Pager, UserRow};
