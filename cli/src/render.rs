//! Plain-text rendering of the list view and single records.

use std::io::{self, Write};

use users_core::view::{format_birthday, Pager, UserRow};
use users_core::{ListController, ListStatus, Notice, NoticeKind, UserRecord};

const HEADERS: [&str; 5] = ["#", "Name", "Email", "Birthday", "Id"];

pub fn list(out: &mut impl Write, controller: &ListController) -> io::Result<()> {
    match controller.status() {
        ListStatus::Loading => return writeln!(out, "Loading users…"),
        ListStatus::Failed(err) => return writeln!(out, "Error: {}", err.message()),
        ListStatus::Loaded => {}
    }

    writeln!(out, "Users  (Total: {})", controller.total())?;
    if !controller.search().is_empty() {
        writeln!(out, "Search: {}", controller.search())?;
    }
    writeln!(out)?;

    let rows = controller.rows();
    if rows.is_empty() {
        writeln!(out, "No users found")?;
    } else {
        table(out, &rows)?;
    }
    writeln!(out)?;
    writeln!(out, "{}", controller.footer())?;
    writeln!(out, "{}", pager(&controller.pager()))
}

fn table(out: &mut impl Write, rows: &[UserRow]) -> io::Result<()> {
    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|r| {
            [
                r.number.to_string(),
                r.name.clone(),
                r.email.clone(),
                r.birthday.clone(),
                r.id.as_ref().map(ToString::to_string).unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cols: &[&str]| -> String {
        cols.iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(&HEADERS[..]))?;
    for row in &cells {
        let cols: Vec<&str> = row.iter().map(String::as_str).collect();
        writeln!(out, "{}", line(cols.as_slice()))?;
    }
    Ok(())
}

/// `<< < 1 [2] 3 > >>`; disabled controls are blanked.
pub fn pager(pager: &Pager) -> String {
    let control = |label: &str, enabled: bool| {
        if enabled {
            label.to_string()
        } else {
            " ".repeat(label.len())
        }
    };
    let mut parts = vec![
        control("<<", pager.first_enabled),
        control("<", pager.prev_enabled),
    ];
    parts.extend(pager.pages.iter().map(|&p| {
        if p == pager.current {
            format!("[{p}]")
        } else {
            p.to_string()
        }
    }));
    parts.push(control(">", pager.next_enabled));
    parts.push(control(">>", pager.last_enabled));
    parts.join(" ")
}

pub fn record(out: &mut impl Write, user: &UserRecord) -> io::Result<()> {
    let field = |v: Option<&str>| match v {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => "-".to_string(),
    };
    let id = user.id.as_ref().map(|id| id.as_str());
    writeln!(out, "Id:       {}", field(id))?;
    writeln!(out, "Name:     {}", field(user.name.as_deref()))?;
    writeln!(out, "Email:    {}", field(user.email.as_deref()))?;
    writeln!(out, "Birthday: {}", format_birthday(user.birthday.as_deref()))
}

pub fn notice(out: &mut impl Write, notice: &Notice) -> io::Result<()> {
    let tag = match notice.kind {
        NoticeKind::Success => "ok",
        NoticeKind::Failure => "error",
    };
    writeln!(out, "[{tag}] {}", notice.message)
}
