//! Create/edit form state.
//!
//! A form edits either a new user or an existing one. Editing starts in
//! `Loading` until the record arrives; saving is a create or an update
//! depending on the target. The form does not validate its fields.

use crate::client::UsersClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{UserFields, UserId, UserRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    New,
    Existing(UserId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Loading,
    Ready,
    Saving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    target: EditTarget,
    fields: UserFields,
    status: FormStatus,
    error: Option<String>,
}

impl UserForm {
    /// Empty form for a new user.
    pub fn create() -> Self {
        Self {
            target: EditTarget::New,
            fields: UserFields {
                name: Some(String::new()),
                email: Some(String::new()),
                ..UserFields::default()
            },
            status: FormStatus::Ready,
            error: None,
        }
    }

    /// Form for an existing user; waits for the record to load.
    pub fn edit(id: UserId) -> Self {
        Self {
            target: EditTarget::Existing(id),
            fields: UserFields::default(),
            status: FormStatus::Loading,
            error: None,
        }
    }

    pub fn target(&self) -> &EditTarget {
        &self.target
    }

    pub fn is_new(&self) -> bool {
        self.target == EditTarget::New
    }

    pub fn fields(&self) -> &UserFields {
        &self.fields
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    /// Inline alert shown inside the form.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.fields.name = Some(name.into());
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.fields.email = Some(email.into());
    }

    pub fn set_birthday(&mut self, birthday: impl Into<String>) {
        self.fields.birthday = Some(birthday.into());
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.fields.password = Some(password.into());
    }

    /// Fill the form from a loaded record. The stored password is not
    /// copied; it is only sent again if the user types a new one.
    pub(crate) fn apply_loaded(&mut self, loaded: Result<UserRecord, ApiError>) {
        self.status = FormStatus::Ready;
        match loaded {
            Ok(record) => {
                self.fields = UserFields {
                    name: Some(record.name.unwrap_or_default()),
                    email: Some(record.email.unwrap_or_default()),
                    birthday: record.birthday,
                    password: None,
                };
                self.error = None;
            }
            Err(err) => self.error = Some(err.message()),
        }
    }

    /// Request saving the current fields, or `None` while loading or saving.
    pub(crate) fn begin_save(&mut self, client: &UsersClient) -> Option<HttpRequest> {
        if self.status != FormStatus::Ready {
            return None;
        }
        let built = match &self.target {
            EditTarget::New => client.build_create_user(&self.fields),
            EditTarget::Existing(id) => client.build_update_user(id, &self.fields),
        };
        match built {
            Ok(request) => {
                self.status = FormStatus::Saving;
                self.error = None;
                Some(request)
            }
            Err(err) => {
                self.error = Some(err.message());
                None
            }
        }
    }

    pub(crate) fn parse_save(
        &self,
        client: &UsersClient,
        response: HttpResponse,
    ) -> Result<Option<UserRecord>, ApiError> {
        match self.target {
            EditTarget::New => client.parse_create_user(response),
            EditTarget::Existing(_) => client.parse_update_user(response),
        }
    }
}
