//! HTML templates for web interface
//!
//! Simple inline HTML templates without a template engine.

use feline::{
    engine::LineRecord,
    session::{Draft, Page, ReviewMethod, Session},
};

/// Common CSS styles for all pages
const COMMON_STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
        max-width: 1000px;
        margin: 40px auto;
        padding: 0 20px;
        background: #f5f5f5;
    }
    .container {
        background: white;
        padding: 30px;
        border-radius: 8px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }
    h1 {
        color: #333;
        border-bottom: 2px solid #b5651d;
        padding-bottom: 10px;
    }
    .form-group {
        margin: 15px 0;
    }
    label {
        display: block;
        font-weight: bold;
        margin-bottom: 5px;
        color: #333;
    }
    input[type="text"],
    input[type="password"],
    textarea {
        width: 100%;
        padding: 10px;
        border: 1px solid #ddd;
        border-radius: 4px;
        font-size: 14px;
        box-sizing: border-box;
    }
    textarea {
        font-family: monospace;
        resize: vertical;
    }
    button {
        background: #b5651d;
        color: white;
        padding: 10px 20px;
        border: none;
        border-radius: 4px;
        cursor: pointer;
        font-size: 14px;
        font-weight: bold;
    }
    button:hover {
        background: #8f4e15;
    }
    .logout-btn {
        background: #999;
        float: right;
    }
    table {
        width: 100%;
        border-collapse: collapse;
        margin: 20px 0;
    }
    th, td {
        text-align: left;
        padding: 12px;
        border-bottom: 1px solid #ddd;
        vertical-align: top;
    }
    th {
        background: #f0f0f0;
    }
    .error {
        color: #d9534f;
        background: #f2dede;
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
        white-space: pre-wrap;
    }
    .option {
        margin: 10px 0;
        padding: 8px;
        background: #f9f9f9;
        border-radius: 4px;
    }
    .muted {
        color: #666;
    }
    .star {
        background: none;
        color: #b5651d;
        font-size: 20px;
        padding: 0 6px;
    }
"#;

/// Posts star toggles and note edits back to the server.
const REVIEWER_SCRIPT: &str = r#"
    async function post(url, body) {
        const res = await fetch(url, {
            method: "POST",
            headers: { "Content-Type": "application/json" },
            body: JSON.stringify(body),
        });
        if (!res.ok) { alert(await res.text()); }
        return res.ok;
    }
    async function toggleStar(button) {
        const starred = button.dataset.starred !== "true";
        if (await post("/feline/starline", { line: Number(button.dataset.line), starred })) {
            button.dataset.starred = String(starred);
            button.textContent = starred ? "★" : "☆";
        }
    }
    function saveNotes(area) {
        post("/feline/linenotes", { line: Number(area.dataset.line), text: area.value });
    }
"#;

/// Saves the builder draft before the form is submitted.
const BUILDER_SCRIPT: &str = r#"
    function draft() {
        return {
            title: document.getElementById("title").value,
            text: document.getElementById("text").value,
        };
    }
    function saveDraft() {
        return fetch("/feline/updatebuilder", {
            method: "POST",
            headers: { "Content-Type": "application/json" },
            body: JSON.stringify(draft()),
        });
    }
    async function submitDraft(form) {
        const res = await saveDraft();
        if (res.ok) { form.submit(); } else { alert(await res.text()); }
        return false;
    }
"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Feline - {title}</title>
    <style>{COMMON_STYLES}</style>
</head>
<body>
    <div class="container">
{body}
    </div>
</body>
</html>"#,
        title = html_escape(title),
    )
}

const LOGOUT_FORM: &str = r#"<form method="POST" action="/feline/logout" style="display: inline;">
            <button type="submit" class="logout-btn">Logout</button>
        </form>"#;

/// Render the login page
pub fn login_page(error: Option<&str>) -> String {
    let error_html = error.map_or(String::new(), |e| {
        format!(r#"<div class="error">{}</div>"#, html_escape(e))
    });

    layout(
        "Login",
        &format!(
            r#"        <h1>Feline</h1>
        {error_html}
        <form method="POST" action="/feline/login">
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" required autofocus>
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password" required>
            </div>
            <button type="submit">Login</button>
        </form>"#
        ),
    )
}

/// Render the home page
pub fn home_page(name: &str, reviewing: bool) -> String {
    let resume = if reviewing {
        r#"<p><a href="/session">Resume your review</a></p>"#
    } else {
        ""
    };

    layout(
        "Home",
        &format!(
            r#"        <h1>Hello, {name} {LOGOUT_FORM}</h1>
        {resume}
        <form method="POST" action="/feline/startsession">
            <button type="submit">Start a review</button>
        </form>
        <p><a href="/builder">Write a new line-set</a></p>"#,
            name = html_escape(name),
        ),
    )
}

/// Render whichever page the session is on
pub fn session_page(session: &Session) -> String {
    match session.page() {
        Page::Unset => unset_page(session),
        Page::FileSelect { files } => file_select_page(files),
        Page::Settings { options } => settings_page(session.selected_file(), options),
        Page::LineReviewer {
            lines,
            review_method,
        } => line_reviewer_page(session.selected_file(), lines, *review_method),
        Page::SessionFinished => session_finished_page(),
    }
}

fn unset_page(session: &Session) -> String {
    layout(
        "Session",
        &format!(
            r#"        <h1>No review in progress</h1>
        <p class="muted">{name}, pick a line-set to begin.</p>
        <form method="POST" action="/feline/startsession">
            <button type="submit">Start a review</button>
        </form>"#,
            name = html_escape(session.username()),
        ),
    )
}

fn file_select_page(files: &[String]) -> String {
    let options = if files.is_empty() {
        r#"<p class="muted">No line-sets yet.</p>"#.to_string()
    } else {
        files
            .iter()
            .enumerate()
            .map(|(i, file)| {
                format!(
                    r#"<div class="option"><label><input type="radio" name="file" value="{i}" required> {}</label></div>"#,
                    html_escape(file)
                )
            })
            .collect()
    };

    layout(
        "Choose a line-set",
        &format!(
            r#"        <h1>Choose a line-set</h1>
        <form method="POST" action="/feline/fileselect">
            {options}
            <button type="submit">Continue</button>
        </form>
        <p><a href="/builder?returnTo=session">Write a new line-set</a></p>"#
        ),
    )
}

fn settings_page(file: Option<&str>, options: &[ReviewMethod]) -> String {
    let methods: String = options
        .iter()
        .enumerate()
        .map(|(i, method)| {
            let checked = if i == 0 { " checked" } else { "" };
            format!(
                r#"<div class="option"><label><input type="radio" name="reviewtype" value="{}"{checked}> {}</label><div class="muted">{}</div></div>"#,
                method.code(),
                html_escape(method.title()),
                html_escape(method.description()),
            )
        })
        .collect();

    layout(
        "Settings",
        &format!(
            r#"        <h1>Review settings</h1>
        <p>Line-set: <strong>{file}</strong></p>
        <form method="POST" action="/feline/settings">
            {methods}
            <button type="submit">Start reviewing</button>
        </form>
        <p><a href="/builder?returnTo=session">Write a new line-set</a></p>"#,
            file = html_escape(file.unwrap_or("")),
        ),
    )
}

fn line_row(line: &LineRecord) -> String {
    let star = if line.starred { "\u{2605}" } else { "\u{2606}" };
    format!(
        r#"<tr>
                <td><button class="star" data-line="{id}" data-starred="{starred}" onclick="toggleStar(this)">{star}</button></td>
                <td class="muted">{cue}</td>
                <td>{text}</td>
                <td><textarea data-line="{id}" rows="2" onchange="saveNotes(this)">{notes}</textarea></td>
            </tr>"#,
        id = line.id,
        starred = line.starred,
        cue = html_escape(&line.cue),
        text = html_escape(&line.line),
        notes = html_escape(&line.notes),
    )
}

fn line_reviewer_page(file: Option<&str>, lines: &[LineRecord], method: ReviewMethod) -> String {
    let rows: String = lines.iter().map(line_row).collect();

    layout(
        "Review",
        &format!(
            r#"        <h1>{file}</h1>
        <p class="muted">{method}</p>
        <div id="lines" data-method="{code}">
        <table>
            <tr><th></th><th>Cue</th><th>Line</th><th>Notes</th></tr>
            {rows}
        </table>
        </div>
        <form method="POST" action="/feline/finishsession">
            <button type="submit">Finish session</button>
        </form>
        <script>{REVIEWER_SCRIPT}</script>"#,
            file = html_escape(file.unwrap_or("")),
            method = html_escape(method.title()),
            code = method.code(),
        ),
    )
}

fn session_finished_page() -> String {
    layout(
        "Finished",
        r#"        <h1>Session finished</h1>
        <p>Nice work.</p>
        <form method="POST" action="/feline/startsession">
            <button type="submit">Review another line-set</button>
        </form>
        <p><a href="/">Home</a></p>"#,
    )
}

/// Render the builder page for a draft
pub fn builder_page(draft: &Draft) -> String {
    let error_html = draft.error.as_deref().map_or(String::new(), |e| {
        format!(
            r#"<div class="error">Error in format. {}</div>"#,
            html_escape(e)
        )
    });

    layout(
        "Builder",
        &format!(
            r#"        <h1>New line-set</h1>
        {error_html}
        <form method="POST" action="/feline/finishbuilder" onsubmit="return submitDraft(this)">
            <div class="form-group">
                <label for="title">Title:</label>
                <input type="text" id="title" value="{title}" onchange="saveDraft()" required>
            </div>
            <div class="form-group">
                <label for="text">Lines:</label>
                <textarea id="text" rows="20" onchange="saveDraft()">{text}</textarea>
                <small class="muted">Alternate cue and line, one per row.</small>
            </div>
            <button type="submit">Save line-set</button>
        </form>
        <p><a href="{back}">Cancel</a></p>
        <script>{BUILDER_SCRIPT}</script>"#,
            title = html_escape(&draft.title),
            text = html_escape(&draft.text),
            back = draft.return_to.path(),
        ),
    )
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
