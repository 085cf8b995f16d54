use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
}

impl MediaItem {
    pub fn image(url: impl Into<String>) -> Self {
        Self { kind: MediaKind::Image, url: url.into() }
    }

    pub fn video(url: impl Into<String>) -> Self {
        Self { kind: MediaKind::Video, url: url.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Interleave images and videos one by one, starting with an image when
/// there is one, and finish with whichever list is left over.
pub fn auto_arrange(images: &[String], videos: &[String]) -> Vec<MediaItem> {
    let mut merged = Vec::with_capacity(images.len() + videos.len());
    let mut imgs = images.iter();
    let mut vids = videos.iter();
    let mut turn = if images.is_empty() { MediaKind::Video } else { MediaKind::Image };

    loop {
        let next = match turn {
            MediaKind::Image => imgs.next().map(MediaItem::image).or_else(|| vids.next().map(MediaItem::video)),
            MediaKind::Video => vids.next().map(MediaItem::video).or_else(|| imgs.next().map(MediaItem::image)),
        };
        match next {
            Some(item) => merged.push(item),
            None => break,
        }
        turn = match turn {
            MediaKind::Image => MediaKind::Video,
            MediaKind::Video => MediaKind::Image,
        };
    }

    merged
}

/// Display order of a product's media.
///
/// In auto-arrange mode the order is always rebuilt with [`auto_arrange`].
/// In manual mode the user's order is kept; items that disappeared from the
/// source lists are dropped and new ones are appended, matched by URL.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaOrder {
    auto_arrange: bool,
    items: Vec<MediaItem>,
}

impl Default for MediaOrder {
    fn default() -> Self {
        Self { auto_arrange: true, items: Vec::new() }
    }
}

impl MediaOrder {
    pub fn auto() -> Self {
        Self::default()
    }

    pub fn manual(items: Vec<MediaItem>) -> Self {
        Self { auto_arrange: false, items }
    }

    pub fn is_auto(&self) -> bool {
        self.auto_arrange
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<MediaItem> {
        self.items
    }

    pub fn set_auto_arrange(&mut self, enabled: bool, images: &[String], videos: &[String]) {
        self.auto_arrange = enabled;
        self.sync(images, videos);
    }

    /// Reconcile with the current image and video lists.
    pub fn sync(&mut self, images: &[String], videos: &[String]) {
        if self.auto_arrange {
            self.items = auto_arrange(images, videos);
            return;
        }

        let current: Vec<MediaItem> = images
            .iter()
            .map(MediaItem::image)
            .chain(videos.iter().map(MediaItem::video))
            .collect();

        let mut seen = HashSet::new();
        let mut next: Vec<MediaItem> = self
            .items
            .iter()
            .filter(|item| current.contains(item))
            .filter(|item| seen.insert(item.url.clone()))
            .cloned()
            .collect();

        for item in current {
            if seen.insert(item.url.clone()) {
                next.push(item);
            }
        }

        self.items = next;
    }

    /// Drag-and-drop: take the item at `from` and insert it at `to`.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() || to >= self.items.len() {
            return false;
        }
        let dragged = self.items.remove(from);
        self.items.insert(to, dragged);
        true
    }

    /// Swap with the neighbour on the given side; no-op at the edges.
    pub fn shift(&mut self, idx: usize, direction: Direction) -> bool {
        let target = match direction {
            Direction::Left => idx.checked_sub(1),
            Direction::Right => Some(idx + 1),
        };
        match target {
            Some(target) if idx < self.items.len() && target < self.items.len() => {
                self.items.swap(idx, target);
                true
            }
            _ => false,
        }
    }

    pub fn remove_at(&mut self, idx: usize) -> Option<MediaItem> {
        if idx < self.items.len() {
            Some(self.items.remove(idx))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(items: &[MediaItem]) -> Vec<&str> {
        items.iter().map(|m| m.url.as_str()).collect()
    }

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn auto_arrange_interleaves() {
        let merged = auto_arrange(&s(&["i1", "i2"]), &s(&["v1"]));
        assert_eq!(urls(&merged), vec!["i1", "v1", "i2"]);
        assert_eq!(merged[1].kind, MediaKind::Video);
    }

    #[test]
    fn auto_arrange_with_only_videos() {
        let merged = auto_arrange(&[], &s(&["v1", "v2"]));
        assert_eq!(urls(&merged), vec!["v1", "v2"]);
    }

    #[test]
    fn auto_arrange_drains_the_longer_list() {
        let merged = auto_arrange(&s(&["i1"]), &s(&["v1", "v2", "v3"]));
        assert_eq!(urls(&merged), vec!["i1", "v1", "v2", "v3"]);
    }

    #[test]
    fn manual_mode_keeps_user_order_and_appends() {
        let images = s(&["i1", "i2"]);
        let videos = s(&["v1"]);
        let mut order = MediaOrder::manual(vec![]);
        order.sync(&images, &videos);
        assert_eq!(urls(order.items()), vec!["i1", "i2", "v1"]);

        assert!(order.move_item(2, 0));
        assert_eq!(urls(order.items()), vec!["v1", "i1", "i2"]);

        let images = s(&["i1", "i2", "i3"]);
        order.sync(&images, &videos);
        assert_eq!(urls(order.items()), vec!["v1", "i1", "i2", "i3"]);

        let images = s(&["i2", "i3"]);
        order.sync(&images, &videos);
        assert_eq!(urls(order.items()), vec!["v1", "i2", "i3"]);
    }

    #[test]
    fn shift_is_a_noop_at_edges() {
        let mut order = MediaOrder::manual(vec![MediaItem::image("a"), MediaItem::video("b")]);
        assert!(!order.shift(0, Direction::Left));
        assert!(!order.shift(1, Direction::Right));
        assert!(order.shift(0, Direction::Right));
        assert_eq!(urls(order.items()), vec!["b", "a"]);
    }

    #[test]
    fn toggling_auto_rebuilds() {
        let images = s(&["i1", "i2"]);
        let videos = s(&["v1"]);
        let mut order = MediaOrder::manual(vec![]);
        order.sync(&images, &videos);
        order.set_auto_arrange(true, &images, &videos);
        assert_eq!(urls(order.items()), vec!["i1", "v1", "i2"]);
    }

    #[test]
    fn media_item_wire_format() {
        let json = serde_json::to_value(MediaItem::video("v")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "video", "url": "v"}));
    }
}
