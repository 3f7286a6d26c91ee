//! HTML templates for the dashboard pages
//!
//! Plain string-building functions, no template engine. Every value that
//! originates from the backend or from user input goes through
//! [`html_escape`] before it is interpolated.

use smsdesk_client::{RequestLog, SelectionState, Sender, UserAccount, ALL_SENDER_FIELDS};

/// Display labels for the requestable sender fields
pub fn field_label(field: &str) -> &'static str {
    match field {
        "sender_name" => "Sender name",
        "mobile_provider" => "Mobile provider",
        "phone_number" => "Phone number",
        "full_name" => "Full name",
        "date" => "Date",
        _ => "Unknown field",
    }
}

/// Minimal HTML escaping for interpolated values
pub fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLE: &str = r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
       background: #f5f6f8; color: #2d2d2d; font-size: 14px; }
header { background: #fff; border-bottom: 1px solid #e0e0e0; padding: 0.75rem 1.25rem;
         display: flex; justify-content: space-between; align-items: center; }
header h1 { font-size: 1.1rem; }
nav a { margin-left: 1rem; color: #2563eb; text-decoration: none; }
nav a:hover { text-decoration: underline; }
main { max-width: 1100px; margin: 1.5rem auto; padding: 0 1rem; }
.card { background: #fff; border: 1px solid #e0e0e0; border-radius: 8px;
        padding: 1rem; margin-bottom: 1.25rem; }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 0.5rem 0.75rem; border-top: 1px solid #eee; text-align: left; }
th { background: #fafafa; font-weight: 600; }
td.center, th.center { text-align: center; }
.reached { color: #16a34a; font-weight: 700; }
.unreached { color: #dc2626; }
.muted { color: #9ca3af; }
.error { background: #fee2e2; border: 1px solid #fca5a5; color: #991b1b;
         padding: 0.6rem 0.8rem; border-radius: 6px; margin-bottom: 1rem; }
.notice { background: #dcfce7; border: 1px solid #86efac; color: #166534;
          padding: 0.6rem 0.8rem; border-radius: 6px; margin-bottom: 1rem; }
button, .btn { background: #2563eb; color: #fff; border: 0; border-radius: 6px;
               padding: 0.5rem 1rem; cursor: pointer; font-size: 14px; }
button:hover, .btn:hover { background: #1d4ed8; }
input[type=date], input[type=text], input[type=password] {
    border: 1px solid #d1d5db; border-radius: 6px; padding: 0.4rem 0.6rem; }
label.inline { margin-right: 1rem; }
#bell { position: relative; cursor: pointer; background: none; color: #2d2d2d;
        border: 0; font-size: 1.1rem; padding: 0.25rem 0.5rem; }
#bell-count { position: absolute; top: -4px; right: -4px; background: #dc2626;
              color: #fff; border-radius: 999px; font-size: 0.65rem;
              min-width: 16px; height: 16px; line-height: 16px; text-align: center; }
#bell-panel { position: absolute; right: 1rem; top: 3rem; width: 300px; background: #fff;
              border: 1px solid #e0e0e0; border-radius: 8px; box-shadow: 0 4px 12px rgba(0,0,0,.08);
              max-height: 320px; overflow-y: auto; z-index: 50; }
#bell-panel .item { padding: 0.5rem 0.75rem; border-top: 1px solid #f0f0f0; }
#bell-panel .item.unread { font-weight: 600; }
.hidden { display: none; }
"#;

/// The bell widget script: poll the snapshot endpoint on a fixed interval,
/// acknowledge the displayed unread entries when the panel is collapsed.
fn bell_script(poll_interval_secs: u64) -> String {
    format!(
        r#"
const bell = document.getElementById('bell');
const panel = document.getElementById('bell-panel');
const count = document.getElementById('bell-count');
let unreadIds = [];

async function refreshBell() {{
  try {{
    const res = await fetch('/api/bell');
    if (!res.ok) return;
    const data = await res.json();
    unreadIds = data.notifications.filter(n => !n.is_read).map(n => n.notification_id);
    count.textContent = data.unread_count;
    count.classList.toggle('hidden', data.unread_count === 0);
    panel.innerHTML = '<div class="item"><strong>Notifications</strong></div>' +
      (data.notifications.length === 0
        ? '<div class="item muted">No replies yet</div>'
        : data.notifications.map(n =>
            `<div class="item ${{n.is_read ? '' : 'unread'}}">${{n.status}} — ${{n.request_id}}<br><span class="muted">${{n.thai_date}}</span></div>`
          ).join(''));
  }} catch (e) {{
    console.error('bell refresh failed', e);
  }}
}}

bell.addEventListener('click', async () => {{
  const closing = !panel.classList.contains('hidden');
  panel.classList.toggle('hidden');
  if (closing) {{
    try {{
      await fetch('/api/bell/read', {{
        method: 'POST',
        headers: {{ 'Content-Type': 'application/json' }},
        body: JSON.stringify({{ ids: unreadIds }})
      }});
    }} catch (e) {{}}
    refreshBell();
  }}
}});

refreshBell();
setInterval(refreshBell, {poll_ms});
"#,
        poll_ms = poll_interval_secs * 1000
    )
}

/// Shared page frame; the bell and nav only render for logged-in pages
pub fn base(
    title: &str,
    user: Option<&UserAccount>,
    content: &str,
    poll_interval_secs: u64,
) -> String {
    let (nav, script) = match user {
        Some(account) => (
            format!(
                r#"<nav>
  <button id="bell" title="Notifications">&#128276;<span id="bell-count" class="hidden">0</span></button>
  <a href="/">Dashboard</a>
  <a href="/history">History</a>
  <a href="/logout">Log out ({name})</a>
</nav>
<div id="bell-panel" class="hidden"></div>"#,
                name = html_escape(&account.name)
            ),
            format!("<script>{}</script>", bell_script(poll_interval_secs)),
        ),
        None => (String::new(), String::new()),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} — smsdesk</title>
<style>{STYLE}</style>
</head>
<body>
<header><h1>smsdesk</h1>{nav}</header>
<main>{content}</main>
{script}
</body>
</html>"#,
        title = html_escape(title),
    )
}

/// Login form, with an optional inline failure message
pub fn login_page(error: Option<&str>) -> String {
    let banner = error
        .map(|msg| format!(r#"<div class="error">{}</div>"#, html_escape(msg)))
        .unwrap_or_default();
    let content = format!(
        r#"{banner}
<div class="card" style="max-width: 380px; margin: 3rem auto;">
  <h2 style="margin-bottom: 1rem;">Log in</h2>
  <form method="post" action="/login">
    <p style="margin-bottom: 0.75rem;">
      <input type="text" name="email" placeholder="Email" style="width: 100%;" required>
    </p>
    <p style="margin-bottom: 0.75rem;">
      <input type="password" name="password" placeholder="Password" style="width: 100%;" required>
    </p>
    <button type="submit" style="width: 100%;">Sign in</button>
  </form>
</div>"#
    );
    base("Login", None, &content, 0)
}

fn date_picker(start: &str, end: &str, today: &str) -> String {
    format!(
        r#"<form method="get" action="">
  <label class="inline">Start date:
    <input type="date" name="start" value="{start}" max="{today}"></label>
  <label class="inline">End date:
    <input type="date" name="end" value="{end}" max="{today}"></label>
  <button type="submit">Apply</button>
</form>"#,
        start = html_escape(start),
        end = html_escape(end),
        today = html_escape(today),
    )
}

/// Dashboard: date range, field checkboxes, sender table, submit
///
/// Row checkboxes are named by index (`row_0`, `row_1`, ...) against the
/// list rendered here; the submit handler re-fetches the same range and
/// rejects indices that no longer fit. Checkbox state follows `selection`,
/// so a re-render after a rejected submission keeps what the user had
/// ticked.
#[allow(clippy::too_many_arguments)]
pub fn dashboard_page(
    user: &UserAccount,
    senders: &[Sender],
    selection: &SelectionState,
    start: &str,
    end: &str,
    today: &str,
    error: Option<&str>,
    notice: Option<&str>,
    poll_interval_secs: u64,
) -> String {
    let banner = error
        .map(|m| format!(r#"<div class="error">{}</div>"#, html_escape(m)))
        .unwrap_or_default();
    let notice = notice
        .map(|m| format!(r#"<div class="notice">{}</div>"#, html_escape(m)))
        .unwrap_or_default();

    let field_boxes: String = ALL_SENDER_FIELDS
        .iter()
        .map(|field| {
            let checked = if selection.is_field_selected(field) {
                " checked"
            } else {
                ""
            };
            format!(
                r#"<label class="inline"><input type="checkbox" name="field_{field}"{checked}> {label}</label>"#,
                label = field_label(field),
            )
        })
        .collect();

    let header_cells: String = ALL_SENDER_FIELDS
        .iter()
        .map(|field| format!("<th>{}</th>", field_label(field)))
        .collect();

    let rows: String = senders
        .iter()
        .enumerate()
        .map(|(i, sender)| {
            let checked = if selection.is_row_selected(i) {
                " checked"
            } else {
                ""
            };
            format!(
                r#"<tr>
  <td class="center"><input type="checkbox" name="row_{i}"{checked}></td>
  <td>{sender_name}</td><td>{provider}</td><td>{phone}</td><td>{full_name}</td><td>{date}</td>
</tr>"#,
                sender_name = html_escape(&sender.sender_name),
                provider = html_escape(&sender.mobile_provider),
                phone = html_escape(&sender.phone_number),
                full_name = html_escape(&sender.full_name),
                date = html_escape(&sender.date),
            )
        })
        .collect();

    let table_body = if senders.is_empty() {
        r#"<tr><td colspan="6" class="muted center">No senders in the selected range</td></tr>"#
            .to_string()
    } else {
        rows
    };

    let content = format!(
        r#"{banner}{notice}
<div class="card">{picker}</div>
<form method="post" action="/submit">
  <input type="hidden" name="start" value="{start}">
  <input type="hidden" name="end" value="{end}">
  <div class="card">
    <strong>Fields to request:</strong><br><br>
    {field_boxes}
  </div>
  <div class="card">
    <table>
      <thead><tr><th class="center">Select</th>{header_cells}</tr></thead>
      <tbody>{table_body}</tbody>
    </table>
  </div>
  <p style="text-align: right;"><button type="submit">Submit request</button></p>
</form>"#,
        picker = date_picker(start, end, today),
        start = html_escape(start),
        end = html_escape(end),
    );
    base("Dashboard", Some(user), &content, poll_interval_secs)
}

/// Request history with per-stage checklist columns and download links
pub fn history_page(
    user: &UserAccount,
    logs: &[RequestLog],
    start: &str,
    end: &str,
    today: &str,
    error: Option<&str>,
    poll_interval_secs: u64,
) -> String {
    let banner = error
        .map(|m| format!(r#"<div class="error">{}</div>"#, html_escape(m)))
        .unwrap_or_default();

    let stage_headers: String = smsdesk_client::StatusStage::ORDER
        .iter()
        .map(|stage| format!(r#"<th class="center">{}</th>"#, stage.label()))
        .collect();

    let rows: String = logs
        .iter()
        .map(|log| {
            let stage_cells: String = log
                .status
                .checklist()
                .iter()
                .map(|(_, reached)| {
                    if *reached {
                        r#"<td class="center reached">&#10003;</td>"#.to_string()
                    } else {
                        r#"<td class="center unreached">&#10007;</td>"#.to_string()
                    }
                })
                .collect();

            let mut sent_links = Vec::new();
            if let Some(id) = &log.pdf_sent_data_id {
                sent_links.push(format!(
                    r#"<a href="/download/{id}?kind=pdf">Data PDF</a>"#,
                    id = html_escape(id)
                ));
            }
            if let Some(id) = &log.pdf_sent_suspension_id {
                sent_links.push(format!(
                    r#"<a href="/download/{id}?kind=pdf">Suspension PDF</a>"#,
                    id = html_escape(id)
                ));
            }
            let sent_cell = if sent_links.is_empty() {
                r#"<span class="muted">-</span>"#.to_string()
            } else {
                sent_links.join("<br>")
            };
            let reply_cell = match &log.reply_file_id {
                Some(id) => format!(
                    r#"<a href="/download/{id}?kind=data">Excel/CSV</a>"#,
                    id = html_escape(id)
                ),
                None => r#"<span class="muted">-</span>"#.to_string(),
            };

            format!(
                r#"<tr>
  <td>{date}</td><td>{id}</td>{stage_cells}
  <td class="center">{sent_cell}</td><td class="center">{reply_cell}</td>
</tr>"#,
                date = html_escape(&log.thai_date),
                id = html_escape(&log.request_id),
            )
        })
        .collect();

    let table_body = if logs.is_empty() {
        r#"<tr><td colspan="8" class="muted center">No requests in the selected range</td></tr>"#
            .to_string()
    } else {
        rows
    };

    let content = format!(
        r#"{banner}
<h2 style="margin-bottom: 1rem;">Request history</h2>
<div class="card">{picker}</div>
<div class="card">
  <table>
    <thead><tr><th>Date</th><th>Request ID</th>{stage_headers}
      <th class="center">Sent files</th><th class="center">Reply file</th></tr></thead>
    <tbody>{table_body}</tbody>
  </table>
</div>"#,
        picker = date_picker(start, end, today),
    );
    base("History", Some(user), &content, poll_interval_secs)
}

/// Confirmation page after a request was accepted by the backend
pub fn submitted_page(
    user: &UserAccount,
    request_id: &str,
    poll_interval_secs: u64,
) -> String {
    let content = format!(
        r#"<div class="card">
  <div class="notice">Request submitted.</div>
  <p>Request ID: <strong>{id}</strong></p>
  <p style="margin-top: 1rem;"><a class="btn" href="/history">View history</a>
     <a class="btn" href="/">Back to dashboard</a></p>
</div>"#,
        id = html_escape(request_id),
    );
    base("Request submitted", Some(user), &content, poll_interval_secs)
}

/// Standalone error page for failures outside a form context
pub fn error_page(user: Option<&UserAccount>, message: &str, poll_interval_secs: u64) -> String {
    let content = format!(
        r#"<div class="card">
  <div class="error">{msg}</div>
  <p><a href="/">Back to dashboard</a></p>
</div>"#,
        msg = html_escape(message),
    );
    base("Error", user, &content, poll_interval_secs)
}
