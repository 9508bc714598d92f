// PromptReel Stored Rows
// Copyright (c) 2026 Xing_The_Creator | PromptReel

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single still produced by the image flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GeneratedImage {
    pub id: i64,
    pub prompt: String,
    pub image_filename: String,
    /// RFC 3339, UTC.
    pub created_at: String,
    pub is_favorite: bool,
    /// Wall-clock seconds spent generating.
    pub generation_time: i64,
}

/// A finished MP4 produced by the video flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GeneratedVideo {
    pub id: i64,
    pub prompt: String,
    pub video_filename: String,
    pub created_at: String,
    pub is_favorite: bool,
    pub generation_time: i64,
    /// Playback length in seconds.
    pub video_length: i64,
}

/// One page of a newest-first listing. Pages are 1-based.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total.div_ceil(per_page as u64) as u32;
        Self {
            items,
            page,
            per_page,
            total,
            total_pages,
            has_prev: page > 1,
            has_next: page < total_pages,
        }
    }

    pub fn prev_num(&self) -> Option<u32> {
        self.has_prev.then(|| self.page - 1)
    }

    pub fn next_num(&self) -> Option<u32> {
        self.has_next.then(|| self.page + 1)
    }
}

/// Clamp a requested page and page size, returning `(page, per_page, offset)`.
pub fn page_window(page: u32, per_page: u32) -> (u32, u32, i64) {
    let page = page.max(1);
    let per_page = per_page.max(1);
    (page, per_page, (page as i64 - 1) * per_page as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_math() {
        let p: Page<()> = Page::new(Vec::new(), 1, 12, 25);
        assert_eq!(p.total_pages, 3);
        assert!(!p.has_prev && p.has_next);
        assert_eq!(p.next_num(), Some(2));
        assert_eq!(p.prev_num(), None);

        let last: Page<()> = Page::new(Vec::new(), 3, 12, 25);
        assert!(last.has_prev && !last.has_next);

        let empty: Page<()> = Page::new(Vec::new(), 1, 12, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
    }

    #[test]
    fn window_clamps_page_zero() {
        assert_eq!(page_window(0, 12), (1, 12, 0));
        assert_eq!(page_window(3, 12), (3, 12, 24));
        assert_eq!(page_window(2, 0), (2, 1, 1));
    }

    #[test]
    fn rows_serialize_with_column_names() {
        let v = GeneratedVideo {
            id: 1,
            prompt: "p".into(),
            video_filename: "video_x.mp4".into(),
            created_at: "2026-01-01T00:00:00+00:00".into(),
            is_favorite: false,
            generation_time: 12,
            video_length: 10,
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["video_filename"], "video_x.mp4");
        assert_eq!(json["video_length"], 10);
        assert_eq!(json["is_favorite"], false);
    }
}
