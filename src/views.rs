//! Server-rendered HTML pages
//!
//! Every dynamic value goes through `html_escape` before it is written.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::service::{Dashboard, StudentView, TeacherView};

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{} - Instant Birthdays</title>
</head>
<body>
{}
</body>
</html>"#,
        encode_text(title),
        body
    )
}

/// GET / body: Instant Login link plus an optional error banner
pub fn login_page(authorize_url: &str, error: Option<&str>) -> String {
    let banner = error
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(|message| format!("  <p class=\"error\">{}</p>\n", encode_text(message)))
        .unwrap_or_default();

    let body = format!(
        r#"  <h1>Instant Birthdays</h1>
{}  <p>See which of your students have a birthday coming up.</p>
  <a href="{}">Log in with Clever</a>"#,
        banner,
        encode_double_quoted_attribute(authorize_url)
    );

    layout("Login", &body)
}

/// GET /app body for either role
pub fn dashboard_page(dashboard: &Dashboard) -> String {
    let content = match dashboard {
        Dashboard::Student(view) => student_section(view),
        Dashboard::Teacher(view) => teacher_section(view),
    };

    let body = format!(
        r#"  <h1>Hello, {}!</h1>
{}
  <p><a href="/logout">Log out</a></p>"#,
        encode_text(dashboard.display_name()),
        content
    );

    layout("Birthdays", &body)
}

fn student_section(view: &StudentView) -> String {
    format!("  <p>Your birthday is {}.</p>", view.birthday)
}

fn teacher_section(view: &TeacherView) -> String {
    let today = if view.birthdays_today.is_empty() {
        format!("  <p>No birthdays today ({}).</p>", view.today)
    } else {
        format!(
            "  <p>Birthdays today ({}): {}</p>",
            view.today,
            encode_text(&view.birthdays_today)
        )
    };

    let rows = view
        .groups
        .iter()
        .map(|(date, entries)| {
            let names = entries
                .iter()
                .map(|entry| encode_text(&entry.name).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            format!("    <tr><td>{date}</td><td>{names}</td></tr>")
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"{}
  <p>Next birthday: {}</p>
  <table>
    <tr><th>Date</th><th>Students</th></tr>
{}
  </table>"#,
        today,
        encode_text(&view.next_birthday.to_string()),
        rows
    )
}
