//! Feed renderer
//!
//! Renders feeds to HTML: idea cards for the live feed container and the full
//! board page around them.

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;

use crate::app::{Feed, FeedItem};
use crate::domain::entities::FilterMode;

const EMPTY_STATE: &str = r#"<div class="loading">
    <span class="empty-icon">💡</span>
    <span>No ideas yet. Be the first!</span>
</div>
"#;

/// The character counter turns amber, then red, this close to the limit
const CHAR_WARN_MARGIN: usize = 50;
const CHAR_DANGER_MARGIN: usize = 20;

/// Render the feed container contents: cards, or the empty-state placeholder
pub fn render_feed_html(feed: &Feed) -> String {
    if feed.items.is_empty() {
        return EMPTY_STATE.to_string();
    }

    let mut buf = String::new();
    for item in &feed.items {
        buf.push_str(&render_card(item));
    }
    buf
}

/// Payload of one live `feed` event: the re-rendered container plus the
/// collection-wide counter. Sent as JSON, so the HTML never reaches the SSE
/// framing as raw line breaks.
#[derive(Debug, Serialize)]
pub struct FeedUpdate {
    pub total_ideas: usize,
    pub html: String,
}

impl FeedUpdate {
    pub fn new(feed: &Feed) -> Self {
        Self {
            total_ideas: feed.total_ideas,
            html: render_feed_html(feed),
        }
    }
}

fn render_card(item: &FeedItem) -> String {
    let idea = &item.idea;
    let id = encode_double_quoted_attribute(idea.id.as_str());
    let class = if idea.is_new {
        "idea-card new"
    } else {
        "idea-card"
    };

    format!(
        r#"<div class="{class}" data-id="{id}" data-timestamp="{timestamp}">
    <div class="idea-header">
        <div class="idea-author">
            <div class="author-avatar">{initial}</div>
            <span class="author-name">{author}</span>
        </div>
        <span class="idea-time">🕒 {time}</span>
    </div>
    <div class="idea-text">{text}</div>
    <div class="idea-actions">
        <button class="like-btn" data-id="{id}" data-type="likes">👍 {likes}</button>
        <button class="dislike-btn" data-id="{id}" data-type="dislikes">👎 {dislikes}</button>
    </div>
</div>
"#,
        timestamp = idea.created_at,
        initial = encode_text(&author_initial(&idea.author)),
        author = multiline_html(&idea.author),
        time = encode_text(&item.relative_time),
        text = multiline_html(&idea.text),
        likes = idea.like_count,
        dislikes = idea.dislike_count,
    )
}

/// Upper-cased first visible character of the author's name, for the avatar.
/// Records written by other clients are not trimmed, so leading whitespace and
/// control characters are skipped.
pub fn author_initial(author: &str) -> String {
    author
        .chars()
        .find(|c| !c.is_whitespace() && !c.is_control())
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "A".to_string())
}

/// Escape user text and turn line breaks into `<br>`. Carriage returns never
/// survive, so the output is safe to send as SSE data.
fn multiline_html(s: &str) -> String {
    let normalized = s.replace("\r\n", "\n").replace('\r', "\n");
    encode_text(&normalized).replace('\n', "<br>")
}

/// Render the whole board page
pub fn render_page(feed: &Feed, online: usize, max_text_len: usize) -> String {
    let mut filters = String::new();
    for mode in [FilterMode::Newest, FilterMode::Top, FilterMode::Today] {
        let active = if mode == feed.mode { " active" } else { "" };
        filters.push_str(&format!(
            r#"<a class="filter-btn{active}" href="/?filter={mode}" data-filter="{mode}">{label}</a>"#,
            label = filter_label(mode),
        ));
    }

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Idea Board</title>
<style>
.notification {{ position: fixed; bottom: 20px; left: 50%; transform: translateX(-50%) translateY(100px); padding: 12px 24px; border-radius: 50px; background: rgba(0, 0, 0, 0.8); color: white; transition: transform 0.3s ease; z-index: 9999; }}
.notification.show {{ transform: translateX(-50%) translateY(0); }}
.notification.success {{ border: 1px solid #4ade80; }}
.notification.error {{ border: 1px solid #f87171; }}
</style>
</head>
<body>
<header>
    <h1>Idea Board</h1>
    <div class="stats">
        <span>Online: <b id="onlineCount">{online}</b></span>
        <span>Ideas: <b id="totalIdeas">{total}</b></span>
    </div>
</header>
<form id="ideaForm">
    <input id="nameInput" name="name" maxlength="30" placeholder="Your name (optional)">
    <textarea id="ideaInput" name="text" maxlength="{max_text_len}" placeholder="Share your idea..."></textarea>
    <span><b id="charCount">0</b>/{max_text_len}</span>
    <button id="submitBtn" type="submit">Post</button>
</form>
<nav class="filters">{filters}</nav>
<main id="ideasFeed">
{feed_html}</main>
<script>
const filter = "{mode}";
const feedEl = document.getElementById("ideasFeed");
const totalEl = document.getElementById("totalIdeas");
const form = document.getElementById("ideaForm");
const ideaInput = document.getElementById("ideaInput");
const charCount = document.getElementById("charCount");
const session = crypto.randomUUID();
const notify = (message, type) => {{
    const el = document.createElement("div");
    el.className = "notification " + type;
    el.textContent = message;
    document.body.appendChild(el);
    setTimeout(() => el.classList.add("show"), 10);
    setTimeout(() => {{
        el.classList.remove("show");
        setTimeout(() => el.remove(), 300);
    }}, 3000);
}};
new EventSource("/ideas/stream?filter=" + filter).addEventListener("feed", (e) => {{
    const update = JSON.parse(e.data);
    feedEl.innerHTML = update.html;
    totalEl.textContent = update.total_ideas;
}});
const beat = () => fetch("/presence", {{
    method: "POST",
    headers: {{ "Content-Type": "application/json" }},
    body: JSON.stringify({{ session_id: session }}),
}}).then((r) => r.json()).then((d) => {{
    document.getElementById("onlineCount").textContent = d.online;
}}).catch(() => {{}});
beat();
setInterval(beat, 10000);
ideaInput.addEventListener("input", () => {{
    const length = ideaInput.value.length;
    charCount.textContent = length;
    charCount.style.color = length > {danger_at} ? "#f87171" : length > {warn_at} ? "#fbbf24" : "";
}});
ideaInput.addEventListener("keydown", (e) => {{
    if (e.key === "Enter" && !e.shiftKey) {{
        e.preventDefault();
        form.requestSubmit();
    }}
}});
form.addEventListener("submit", async (e) => {{
    e.preventDefault();
    const name = document.getElementById("nameInput");
    try {{
        const res = await fetch("/ideas", {{
            method: "POST",
            headers: {{ "Content-Type": "application/json" }},
            body: JSON.stringify({{ name: name.value, text: ideaInput.value }}),
        }});
        const body = await res.json();
        if (res.ok) {{
            ideaInput.value = "";
            name.value = "";
            charCount.textContent = 0;
            charCount.style.color = "";
            notify(body.message, "success");
        }} else {{
            notify(body.details || body.error, "error");
        }}
    }} catch (err) {{
        notify("Could not reach the board", "error");
    }}
}});
feedEl.addEventListener("click", (e) => {{
    const btn = e.target.closest("button");
    if (btn && btn.dataset.id) fetch("/ideas/" + btn.dataset.id + "/" + btn.dataset.type, {{ method: "POST" }});
}});
</script>
</body>
</html>
"##,
        total = feed.total_ideas,
        mode = feed.mode,
        warn_at = max_text_len.saturating_sub(CHAR_WARN_MARGIN),
        danger_at = max_text_len.saturating_sub(CHAR_DANGER_MARGIN),
        feed_html = render_feed_html(feed),
    )
}

fn filter_label(mode: FilterMode) -> &'static str {
    match mode {
        FilterMode::Newest => "Newest",
        FilterMode::Top => "Top",
        FilterMode::Today => "Today",
    }
}
