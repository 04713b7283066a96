//! HTML rendering of the exam list

use crate::dashboard::view::{BadgeStyle, ExamRow, ListView, TABLE_HEADERS};

/// Render the list area for a view
pub fn render_list(view: &ListView) -> String {
    match view {
        ListView::Table(rows) => {
            let mut html: String = TABLE_HEADERS
                .iter()
                .map(|title| format!("<div class=\"table__header\">{title}</div>"))
                .collect();

            for row in rows {
                html.push_str(&render_row(row));
            }
            html
        }
        other => format!(
            "<p class=\"muted\">{}</p>",
            other.placeholder().unwrap_or_default()
        ),
    }
}

fn render_row(row: &ExamRow) -> String {
    format!(
        concat!(
            "<div class=\"table__row\">",
            "<div><p class=\"strong\">{name}</p><p class=\"muted\">{id}</p></div>",
            "<div><p class=\"muted\">{file}</p></div>",
            "<div><span class=\"badge {badge_class}\">{badge}</span></div>",
            "<div class=\"muted\">{created}</div>",
            "</div>"
        ),
        name = escape_html(&row.patient_name),
        id = escape_html(&row.id_label),
        file = escape_html(&row.file_name),
        badge_class = row.badge.style.css_class(),
        badge = escape_html(&row.badge.label),
        created = escape_html(&row.created_at),
    )
}

/// Render the list as a plain-text table for terminals
pub fn render_text(view: &ListView) -> String {
    let rows = match view {
        ListView::Table(rows) => rows,
        other => return other.placeholder().unwrap_or_default().to_string(),
    };

    let mut out = format!(
        "{:<28} {:<24} {:<18} {}\n",
        TABLE_HEADERS[0], TABLE_HEADERS[1], TABLE_HEADERS[2], TABLE_HEADERS[3]
    );
    for row in rows {
        let marker = match row.badge.style {
            BadgeStyle::Pending => "…",
            BadgeStyle::Ready => "✓",
        };
        out.push_str(&format!(
            "{:<28} {:<24} {:<18} {}\n",
            format!("{} ({})", row.patient_name, row.id_label),
            row.file_name,
            format!("{marker} {}", row.badge.label),
            row.created_at
        ));
    }
    out
}

/// Escape text for inclusion in HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
