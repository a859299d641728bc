//! Plain-text rendering of table pages.

use std::fmt::Write;

use crate::table::{Page, PageWindow};

pub const NO_RECORDS: &str = "No records found";

/// Column-aligned table for one page, followed by the pager line.
pub fn format_page<R>(
    page: &Page<'_, R>,
    headers: &[&str],
    cells: impl Fn(&R) -> Vec<String>,
) -> String {
    if page.is_empty() {
        return format!("{NO_RECORDS}\n");
    }

    let rows: Vec<Vec<String>> = page.rows.iter().map(|r| cells(*r)).collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    push_line(&mut out, headers.iter().map(|h| h.to_string()), &widths);
    let rule: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    out.push_str(&"-".repeat(rule));
    out.push('\n');
    for row in rows {
        push_line(&mut out, row.into_iter(), &widths);
    }

    let _ = writeln!(
        out,
        "{}  (page {} of {}{}{})",
        showing(page.window),
        page.current_page,
        page.total_pages,
        if page.has_prev { ", --page for previous" } else { "" },
        if page.has_next { ", more on next page" } else { "" },
    );
    out
}

/// "Showing a–b of n".
pub fn showing(window: PageWindow) -> String {
    format!("Showing {}–{} of {}", window.start, window.end, window.total)
}

fn push_line(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Cuts long free text for single-line listings.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}
