//! List controller: paging, search, delete confirmation, the edit modal and
//! the notification slot.
//!
//! # Design
//! The controller never performs I/O. Every operation that needs the network
//! returns an `Effect`: a request tagged with a `Ticket`. The host executes
//! the request and hands the outcome back through `complete`. Tickets come
//! from a single counter and each pending operation remembers the ticket it
//! is waiting for, so a completion whose ticket has been superseded (a newer
//! page fetch, a closed modal) is dropped instead of overwriting newer state.
//! Nothing is cancelled; stale results are only ignored.

use std::time::{Duration, Instant};

use crate::client::UsersClient;
use crate::error::ApiError;
use crate::form::UserForm;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{PageQuery, UserId, UserRecord};
use crate::view::{self, Pager, UserRow};

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// Identifies one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

/// A request the host must execute, then report back via
/// [`ListController::complete`] with the same ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    pub ticket: Ticket,
    pub request: HttpRequest,
}

/// What the host observed: a response, or a transport failure mapped to
/// `ApiError::Network`.
pub type Outcome = Result<HttpResponse, ApiError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ListStatus {
    Loading,
    Loaded,
    Failed(ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteState {
    Idle,
    Confirming(UserId),
    Deleting(UserId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Closed,
    Editing(UserForm),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub issued_at: Instant,
}

impl Notice {
    pub fn expires_at(&self) -> Instant {
        self.issued_at + NOTICE_TTL
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now < self.expires_at()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormCall {
    Load,
    Save,
}

#[derive(Debug)]
pub struct ListController {
    client: UsersClient,
    page: u32,
    limit: u32,
    search: String,
    items: Vec<UserRecord>,
    total: u64,
    status: ListStatus,
    delete: DeleteState,
    modal: Modal,
    notice: Option<Notice>,
    next_ticket: u64,
    list_ticket: Option<Ticket>,
    delete_ticket: Option<Ticket>,
    form_ticket: Option<(Ticket, FormCall)>,
}

impl ListController {
    /// Starts on page 1 in `Loading`; call [`refresh`](Self::refresh) to
    /// issue the first fetch.
    pub fn new(client: UsersClient, limit: u32) -> Self {
        Self {
            client,
            page: 1,
            limit: limit.max(1),
            search: String::new(),
            items: Vec::new(),
            total: 0,
            status: ListStatus::Loading,
            delete: DeleteState::Idle,
            modal: Modal::Closed,
            notice: None,
            next_ticket: 0,
            list_ticket: None,
            delete_ticket: None,
            form_ticket: None,
        }
    }

    /// Start from an arbitrary page and search instead of page 1.
    pub fn from_query(client: UsersClient, query: PageQuery) -> Self {
        let mut controller = Self::new(client, query.limit);
        controller.page = query.page;
        controller.search = query.q.unwrap_or_default();
        controller
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn query(&self) -> PageQuery {
        PageQuery::new(self.page, self.limit, Some(self.search.clone()))
    }

    pub fn items(&self) -> &[UserRecord] {
        &self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn status(&self) -> &ListStatus {
        &self.status
    }

    pub fn delete_state(&self) -> &DeleteState {
        &self.delete
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn form(&self) -> Option<&UserForm> {
        match &self.modal {
            Modal::Editing(form) => Some(form),
            Modal::Closed => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut UserForm> {
        match &mut self.modal {
            Modal::Editing(form) => Some(form),
            Modal::Closed => None,
        }
    }

    /// False while a delete is in flight.
    pub fn can_delete(&self) -> bool {
        !matches!(self.delete, DeleteState::Deleting(_))
    }

    pub fn total_pages(&self) -> u32 {
        view::total_pages(self.total, self.limit)
    }

    pub fn pager(&self) -> Pager {
        Pager::new(self.page, self.limit, self.total)
    }

    pub fn footer(&self) -> String {
        view::footer(self.page, self.limit, self.total)
    }

    pub fn rows(&self) -> Vec<UserRow> {
        view::rows(self.page, self.limit, &self.items)
    }

    // -----------------------------------------------------------------------
    // Paging and search
    // -----------------------------------------------------------------------

    /// Re-query the current page.
    pub fn refresh(&mut self) -> Effect {
        self.status = ListStatus::Loading;
        self.fetch()
    }

    pub fn set_page(&mut self, page: u32) -> Option<Effect> {
        let page = page.max(1);
        if page == self.page {
            return None;
        }
        self.page = page;
        Some(self.refresh())
    }

    pub fn first_page(&mut self) -> Option<Effect> {
        self.set_page(1)
    }

    pub fn prev_page(&mut self) -> Option<Effect> {
        self.set_page(self.page.saturating_sub(1))
    }

    pub fn next_page(&mut self) -> Option<Effect> {
        self.set_page(self.total_pages().min(self.page.saturating_add(1)))
    }

    pub fn last_page(&mut self) -> Option<Effect> {
        self.set_page(self.total_pages())
    }

    /// Change the page size and go back to page 1.
    pub fn set_limit(&mut self, limit: u32) -> Option<Effect> {
        let limit = limit.max(1);
        if limit == self.limit && self.page == 1 {
            return None;
        }
        self.limit = limit;
        self.page = 1;
        Some(self.refresh())
    }

    /// Change the email search and go back to page 1.
    pub fn set_search(&mut self, search: impl Into<String>) -> Option<Effect> {
        let search = search.into();
        if search == self.search && self.page == 1 {
            return None;
        }
        self.search = search;
        self.page = 1;
        Some(self.refresh())
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Ask for confirmation before deleting `id`. Ignored while another
    /// delete is in flight.
    pub fn request_delete(&mut self, id: UserId) {
        if !self.can_delete() {
            tracing::debug!(%id, "delete already in flight, ignoring request");
            return;
        }
        self.delete = DeleteState::Confirming(id);
    }

    pub fn cancel_delete(&mut self) {
        if matches!(self.delete, DeleteState::Confirming(_)) {
            self.delete = DeleteState::Idle;
        }
    }

    pub fn confirm_delete(&mut self) -> Option<Effect> {
        let DeleteState::Confirming(id) = &self.delete else {
            return None;
        };
        let id = id.clone();
        let request = self.client.build_delete_user(&id);
        let ticket = self.issue();
        tracing::info!(%id, "deleting user");
        self.delete = DeleteState::Deleting(id);
        self.delete_ticket = Some(ticket);
        Some(Effect { ticket, request })
    }

    // -----------------------------------------------------------------------
    // Create / edit modal
    // -----------------------------------------------------------------------

    pub fn open_create(&mut self) {
        self.form_ticket = None;
        self.modal = Modal::Editing(UserForm::create());
    }

    /// Open the modal for `id` and fetch its current values.
    pub fn open_edit(&mut self, id: UserId) -> Effect {
        let form = UserForm::edit(id.clone());
        let request = self.client.build_get_user(&id);
        let ticket = self.issue();
        self.modal = Modal::Editing(form);
        self.form_ticket = Some((ticket, FormCall::Load));
        Effect { ticket, request }
    }

    /// Close without saving. A pending load or save completes unseen.
    pub fn close_modal(&mut self) {
        self.modal = Modal::Closed;
        self.form_ticket = None;
    }

    pub fn submit_form(&mut self) -> Option<Effect> {
        let Modal::Editing(form) = &mut self.modal else {
            return None;
        };
        let request = form.begin_save(&self.client)?;
        let ticket = self.issue();
        self.form_ticket = Some((ticket, FormCall::Save));
        Some(Effect { ticket, request })
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    /// The latest notice, expired or not.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn notice_at(&self, now: Instant) -> Option<&Notice> {
        self.notice.as_ref().filter(|n| n.is_visible_at(now))
    }

    pub fn expire_notice(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| !n.is_visible_at(now)) {
            self.notice = None;
        }
    }

    fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notice = Some(Notice {
            kind,
            message: message.into(),
            issued_at: Instant::now(),
        });
    }

    // -----------------------------------------------------------------------
    // Completions
    // -----------------------------------------------------------------------

    /// Feed back the outcome of an `Effect`. May return a follow-up request
    /// (a re-query after a delete or save, or after clamping the page).
    pub fn complete(&mut self, ticket: Ticket, outcome: Outcome) -> Option<Effect> {
        if self.list_ticket == Some(ticket) {
            self.list_ticket = None;
            return self.finish_fetch(outcome);
        }
        if self.delete_ticket == Some(ticket) {
            self.delete_ticket = None;
            return self.finish_delete(outcome);
        }
        if let Some((pending, call)) = self.form_ticket {
            if pending == ticket {
                self.form_ticket = None;
                return match call {
                    FormCall::Load => {
                        self.finish_load(outcome);
                        None
                    }
                    FormCall::Save => self.finish_save(outcome),
                };
            }
        }
        tracing::debug!(?ticket, "discarding stale completion");
        None
    }

    fn issue(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    /// Issue a fetch for the current query without touching `status`, so the
    /// rows on screen stay visible until the new page arrives.
    fn fetch(&mut self) -> Effect {
        let request = self.client.build_list_users_paged(&self.query());
        let ticket = self.issue();
        self.list_ticket = Some(ticket);
        Effect { ticket, request }
    }

    fn finish_fetch(&mut self, outcome: Outcome) -> Option<Effect> {
        let query = self.query();
        match outcome.and_then(|resp| self.client.parse_list_users_paged(&query, resp)) {
            Ok(page) => {
                self.items = page.items;
                self.total = page.total;
                self.status = ListStatus::Loaded;
                let last = self.total_pages();
                if self.page > last {
                    tracing::info!(from = self.page, to = last, "page out of range, clamping");
                    self.page = last;
                    return Some(self.refresh());
                }
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load users");
                self.status = ListStatus::Failed(err);
                None
            }
        }
    }

    fn finish_delete(&mut self, outcome: Outcome) -> Option<Effect> {
        let DeleteState::Deleting(id) = std::mem::replace(&mut self.delete, DeleteState::Idle)
        else {
            return None;
        };
        match outcome.and_then(|resp| self.client.parse_delete_user(resp)) {
            Ok(()) => {
                let before = self.items.len();
                self.items.retain(|user| user.id.as_ref() != Some(&id));
                if self.items.len() < before {
                    self.total = self.total.saturating_sub(1);
                }
                self.notify(NoticeKind::Success, "User deleted");
                Some(self.fetch())
            }
            Err(err) => {
                tracing::warn!(%id, error = %err, "delete failed");
                self.notify(NoticeKind::Failure, format!("Delete failed: {}", err.message()));
                None
            }
        }
    }

    fn finish_load(&mut self, outcome: Outcome) {
        let loaded = outcome.and_then(|resp| self.client.parse_get_user(resp));
        if let Modal::Editing(form) = &mut self.modal {
            form.apply_loaded(loaded);
        }
    }

    fn finish_save(&mut self, outcome: Outcome) -> Option<Effect> {
        let Modal::Editing(form) = std::mem::replace(&mut self.modal, Modal::Closed) else {
            return None;
        };
        let (noun, verb) = if form.is_new() {
            ("created", "create")
        } else {
            ("updated", "update")
        };
        match outcome.and_then(|resp| form.parse_save(&self.client, resp)) {
            Ok(_) => {
                self.notify(NoticeKind::Success, format!("User {noun}"));
                self.page = 1;
                Some(self.refresh())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to {verb} user");
                self.notify(
                    NoticeKind::Failure,
                    format!("Failed to {verb} user: {}", err.message()),
                );
                None
            }
        }
    }
}
