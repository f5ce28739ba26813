//! Presentation helpers shared by every host: pager window, footer text and
//! table rows. Pure functions of the list state, no I/O.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::types::{UserId, UserRecord};

/// Page sizes a host offers in its "entries per page" selector.
pub const PAGE_SIZES: [u32; 4] = [5, 10, 25, 50];

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Most page-number buttons shown at once.
pub const MAX_PAGE_BUTTONS: u32 = 7;

const PLACEHOLDER: &str = "-";

/// Number of pages for `total` items; never less than 1.
pub fn total_pages(total: u64, limit: u32) -> u32 {
    let limit = u64::from(limit.max(1));
    total.div_ceil(limit).clamp(1, u64::from(u32::MAX)) as u32
}

/// Page numbers to show: up to `MAX_PAGE_BUTTONS`, centered on `page` and
/// shifted to stay inside `1..=total_pages`.
pub fn page_window(page: u32, total_pages: u32) -> Vec<u32> {
    let total_pages = total_pages.max(1);
    let page = page.min(total_pages);
    let mut start = page.saturating_sub(MAX_PAGE_BUTTONS / 2).max(1);
    let end = total_pages.min(start.saturating_add(MAX_PAGE_BUTTONS - 1));
    if end - start + 1 < MAX_PAGE_BUTTONS {
        start = end.saturating_sub(MAX_PAGE_BUTTONS - 1).max(1);
    }
    (start..=end).collect()
}

/// Pagination controls for the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    pub pages: Vec<u32>,
    pub current: u32,
    pub total_pages: u32,
    pub first_enabled: bool,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub last_enabled: bool,
}

impl Pager {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = total_pages(total, limit);
        let at_start = page <= 1;
        let at_end = page >= total_pages;
        Self {
            pages: page_window(page, total_pages),
            current: page,
            total_pages,
            first_enabled: !at_start,
            prev_enabled: !at_start,
            next_enabled: !at_end,
            last_enabled: !at_end,
        }
    }
}

/// "Showing {from} to {to} of {total} entries".
pub fn footer(page: u32, limit: u32, total: u64) -> String {
    let page = u64::from(page.max(1));
    let limit = u64::from(limit.max(1));
    let from = if total == 0 { 0 } else { (page - 1) * limit + 1 };
    let to = (page * limit).min(total);
    format!("Showing {from} to {to} of {total} entries")
}

/// One table row, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub number: u64,
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub birthday: String,
}

/// Rows are numbered continuously across pages.
pub fn rows(page: u32, limit: u32, items: &[UserRecord]) -> Vec<UserRow> {
    let offset = u64::from(page.max(1) - 1) * u64::from(limit);
    items
        .iter()
        .enumerate()
        .map(|(idx, user)| UserRow {
            number: offset + idx as u64 + 1,
            id: user.id.clone(),
            name: or_placeholder(user.name.as_deref()),
            email: or_placeholder(user.email.as_deref()),
            birthday: format_birthday(user.birthday.as_deref()),
        })
        .collect()
}

fn or_placeholder(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// `YYYY-MM-DD` for anything that parses as a date or timestamp, the raw
/// value otherwise, `-` when missing.
pub fn format_birthday(value: Option<&str>) -> String {
    let Some(raw) = value.filter(|v| !v.is_empty()) else {
        return PLACEHOLDER.to_string();
    };
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()));
    match date {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => raw.to_string(),
    }
}
