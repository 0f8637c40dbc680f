//! HTML rendering for the web UI.
//!
//! Pages are assembled with `format!` against a shared layout. User text is
//! escaped before interpolation.

use crate::workouts::types::Workout;

/// Escape text for interpolation into HTML.
fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Shared page layout.
fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - TrainLog</title>
<style>
  body {{ font-family: sans-serif; max-width: 40rem; margin: 2rem auto; padding: 0 1rem; color: #222; }}
  h1 {{ font-size: 1.4rem; }}
  table {{ border-collapse: collapse; width: 100%; }}
  th, td {{ text-align: left; padding: 0.4rem 0.6rem; border-bottom: 1px solid #ddd; }}
  a {{ color: #0366d6; }}
  input[type=text] {{ padding: 0.3rem; }}
</style>
</head>
<body>
<h1>{title}</h1>
{body}
</body>
</html>
"#
    )
}

/// Render the home page with the most recent workouts.
pub fn home(workouts: &[Workout]) -> String {
    let list = if workouts.is_empty() {
        "<p>No workouts logged yet.</p>".to_string()
    } else {
        let rows: String = workouts
            .iter()
            .map(|w| {
                format!(
                    "<tr><td>{}</td><td>{}</td></tr>\n",
                    escape(&w.name),
                    w.date_display()
                )
            })
            .collect();

        format!("<table>\n<tr><th>Workout</th><th>Date</th></tr>\n{rows}</table>")
    };

    layout(
        "Recent workouts",
        &format!("{list}\n<p><a href=\"/workouts/add\">Add a workout</a></p>"),
    )
}

/// Render the add-workout form.
pub fn add_workout() -> String {
    layout(
        "Add workout",
        r#"<form method="post" action="/workouts/add">
  <label for="name">Name</label>
  <input type="text" id="name" name="name">
  <button type="submit">Save</button>
</form>
<p><a href="/">Back to recent workouts</a></p>"#,
    )
}

/// Render the generic failure page for storage errors.
pub fn server_error() -> String {
    layout(
        "Something went wrong",
        "<p>The workout log is unavailable. Try again shortly.</p>",
    )
}
