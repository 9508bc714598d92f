// PromptReel Pages
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Server-rendered HTML. Every piece of user text goes through `escape_html`.

use serde::Deserialize;
use std::fmt::Write as _;

use crate::storage::{GeneratedImage, GeneratedVideo, Page};

pub const GALLERY_PER_PAGE: u32 = 12;
pub const RECENT_VIDEOS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

impl NoticeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Error => "error",
        }
    }
}

/// One-shot message carried on a redirect as `?notice=&level=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Error,
        }
    }

    /// `path?notice=...&level=...`
    pub fn redirect_target(&self, path: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("notice", &self.message)
            .append_pair("level", self.level.as_str())
            .finish();
        format!("{}?{}", path, query)
    }
}

/// Query string accepted by every page.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub notice: Option<String>,
    pub level: Option<NoticeLevel>,
}

impl PageQuery {
    pub fn notice(&self) -> Option<Notice> {
        let message = self.notice.as_deref().map(str::trim).filter(|m| !m.is_empty())?;
        Some(Notice {
            message: message.to_string(),
            level: self.level.unwrap_or(NoticeLevel::Success),
        })
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body{font-family:system-ui,sans-serif;background:#0f0f1a;color:#eee;margin:0}\
nav{display:flex;gap:1.5rem;padding:1rem 2rem;background:#1a1a2e}nav a{color:#a5b4fc;text-decoration:none}\
main{max-width:1100px;margin:0 auto;padding:2rem}\
.notice{padding:.75rem 1rem;border-radius:8px;margin-bottom:1rem}\
.notice.success{background:#14532d}.notice.error{background:#7f1d1d}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(240px,1fr));gap:1rem}\
.card{background:#1a1a2e;border-radius:10px;padding:.75rem}.card video,.card img{width:100%;border-radius:6px}\
.card p{font-size:.9rem;word-break:break-word}\
textarea{width:100%;min-height:90px;border-radius:8px;padding:.5rem}\
button{background:#6366f1;color:#fff;border:0;border-radius:6px;padding:.5rem 1rem;cursor:pointer}\
.fav.on{background:#f59e0b}.pager{display:flex;gap:1rem;margin-top:1.5rem}";

const FAVORITE_SCRIPT: &str = "document.querySelectorAll('button.fav').forEach(b=>b.addEventListener('click',async()=>{\
const r=await fetch(b.dataset.url,{method:'POST'});if(!r.ok)return;const j=await r.json();\
b.classList.toggle('on',j.is_favorite);b.textContent=j.is_favorite?'\\u2605 Favorite':'\\u2606 Favorite';}));";

fn layout(title: &str, notice: Option<&Notice>, body: &str) -> String {
    let notice_html = notice
        .map(|n| {
            format!(
                r#"<div class="notice {}">{}</div>"#,
                n.level.as_str(),
                escape_html(&n.message)
            )
        })
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | PromptReel</title>
<style>{STYLE}</style>
</head>
<body>
<nav><a href="/"><strong>PromptReel</strong></a><a href="/gallery/videos">Videos</a><a href="/gallery/images">Images</a></nav>
<main>
{notice_html}
{body}
</main>
<script>{FAVORITE_SCRIPT}</script>
</body>
</html>"#,
        title = escape_html(title),
    )
}

fn favorite_button(url: &str, on: bool) -> String {
    format!(
        r#"<button class="fav{}" data-url="{}">{} Favorite</button>"#,
        if on { " on" } else { "" },
        escape_html(url),
        if on { "\u{2605}" } else { "\u{2606}" }
    )
}

fn video_card(v: &GeneratedVideo) -> String {
    format!(
        r#"<div class="card">
<video controls preload="metadata" src="/media/videos/{file}"></video>
<p>{prompt}</p>
<small>{created} &middot; {len}s &middot; made in {gen}s</small>
{fav}
</div>"#,
        file = escape_html(&v.video_filename),
        prompt = escape_html(&v.prompt),
        created = escape_html(&v.created_at),
        len = v.video_length,
        gen = v.generation_time,
        fav = favorite_button(&format!("/api/videos/{}/favorite", v.id), v.is_favorite),
    )
}

fn image_card(i: &GeneratedImage) -> String {
    format!(
        r#"<div class="card">
<img loading="lazy" src="/media/images/{file}" alt="{prompt}">
<p>{prompt}</p>
<small>{created} &middot; made in {gen}s</small>
{fav}
</div>"#,
        file = escape_html(&i.image_filename),
        prompt = escape_html(&i.prompt),
        created = escape_html(&i.created_at),
        gen = i.generation_time,
        fav = favorite_button(&format!("/api/images/{}/favorite", i.id), i.is_favorite),
    )
}

fn pager<T>(page: &Page<T>, base: &str) -> String {
    let mut out = String::from(r#"<div class="pager">"#);
    if let Some(prev) = page.prev_num() {
        let _ = write!(out, r#"<a href="{}?page={}">&larr; Newer</a>"#, base, prev);
    }
    let _ = write!(out, "<span>Page {} of {}</span>", page.page, page.total_pages.max(1));
    if let Some(next) = page.next_num() {
        let _ = write!(out, r#"<a href="{}?page={}">Older &rarr;</a>"#, base, next);
    }
    out.push_str("</div>");
    out
}

pub fn index_page(recent: &[GeneratedVideo], notice: Option<&Notice>) -> String {
    let mut body = String::from(
        r#"<h1>Turn a prompt into a video</h1>
<form method="post" action="/generate">
<textarea name="prompt" maxlength="500" placeholder="A golden retriever surfing a wave at sunset" required></textarea>
<p><button type="submit">Generate video</button></p>
</form>
<form method="post" action="/images/generate">
<input type="text" name="prompt" maxlength="500" placeholder="Just one image">
<button type="submit">Generate image</button>
</form>
<h2>Recent videos</h2>"#,
    );
    if recent.is_empty() {
        body.push_str("<p>No videos yet. Be the first!</p>");
    } else {
        body.push_str(r#"<div class="grid">"#);
        for v in recent {
            body.push_str(&video_card(v));
        }
        body.push_str("</div>");
    }
    layout("Create", notice, &body)
}

pub fn videos_gallery(page: &Page<GeneratedVideo>, notice: Option<&Notice>) -> String {
    let mut body = format!("<h1>Video gallery</h1><p>{} videos</p>", page.total);
    body.push_str(r#"<div class="grid">"#);
    for v in &page.items {
        body.push_str(&video_card(v));
    }
    body.push_str("</div>");
    body.push_str(&pager(page, "/gallery/videos"));
    layout("Videos", notice, &body)
}

pub fn images_gallery(page: &Page<GeneratedImage>, notice: Option<&Notice>) -> String {
    let mut body = format!("<h1>Image gallery</h1><p>{} images</p>", page.total);
    body.push_str(r#"<div class="grid">"#);
    for i in &page.items {
        body.push_str(&image_card(i));
    }
    body.push_str("</div>");
    body.push_str(&pager(page, "/gallery/images"));
    layout("Images", notice, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: i64, prompt: &str) -> GeneratedVideo {
        GeneratedVideo {
            id,
            prompt: prompt.to_string(),
            video_filename: format!("video_{id}.mp4"),
            created_at: "2026-10-18T12:00:00.000000Z".to_string(),
            is_favorite: id % 2 == 0,
            generation_time: 30,
            video_length: 10,
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b onclick="x">Tom & 'Jerry'</b>"#),
            "&lt;b onclick=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn prompts_are_escaped_in_cards() {
        let html = index_page(&[video(1, "<img src=x onerror=alert(1)>")], None);
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(html.contains("/media/videos/video_1.mp4"));
    }

    #[test]
    fn notice_renders_once_with_level() {
        let n = Notice::error("Bad <prompt>");
        let html = index_page(&[], Some(&n));
        assert!(html.contains(r#"<div class="notice error">Bad &lt;prompt&gt;</div>"#));
        assert!(html.contains("No videos yet"));
    }

    #[test]
    fn redirect_target_round_trips_through_query() {
        let target = Notice::success("Video generated successfully!").redirect_target("/");
        assert_eq!(target, "/?notice=Video+generated+successfully%21&level=success");
    }

    #[test]
    fn blank_notice_is_ignored() {
        let q = PageQuery {
            page: None,
            notice: Some("   ".into()),
            level: Some(NoticeLevel::Error),
        };
        assert!(q.notice().is_none());
    }

    #[test]
    fn gallery_pager_links() {
        let page = Page::new(vec![video(2, "a"), video(1, "b")], 2, 2, 5);
        let html = videos_gallery(&page, None);
        assert!(html.contains(r#"href="/gallery/videos?page=1""#));
        assert!(html.contains(r#"href="/gallery/videos?page=3""#));
        assert!(html.contains("Page 2 of 3"));
        assert!(html.contains("fav on"));
    }
}
