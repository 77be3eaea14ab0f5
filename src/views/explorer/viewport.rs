use compact_str::CompactString;
use std::ops::Range;

use crate::kernel::services::ports::ExplorerConfig;
use crate::models::Flattened;

/// Vertical connector drawn alongside the visible part of an expanded folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guideline {
    pub path: CompactString,
    pub depth: u16,
    pub start_row: usize,
    pub end_row: usize,
    pub top: u64,
    pub height: u64,
}

/// Fixed-row-height window over the flattened rows. Heights are in pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerViewport {
    row_height: u32,
    overscan: usize,
    height: u32,
    scroll_top: u64,
    row_count: usize,
}

impl Default for ExplorerViewport {
    fn default() -> Self {
        Self::new(22, 8)
    }
}

impl ExplorerViewport {
    pub fn new(row_height: u32, overscan: usize) -> Self {
        Self {
            row_height: row_height.max(1),
            overscan,
            height: 0,
            scroll_top: 0,
            row_count: 0,
        }
    }

    pub fn from_config(config: &ExplorerConfig) -> Self {
        Self::new(config.row_height, config.overscan)
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn total_height(&self) -> u64 {
        self.row_count as u64 * u64::from(self.row_height)
    }

    pub fn row_top(&self, index: usize) -> u64 {
        index as u64 * u64::from(self.row_height)
    }

    pub fn set_row_count(&mut self, count: usize) -> bool {
        let prev = (self.row_count, self.scroll_top);
        self.row_count = count;
        self.clamp_scroll();
        prev != (self.row_count, self.scroll_top)
    }

    pub fn set_height(&mut self, height: u32) -> bool {
        if self.height == height {
            return false;
        }
        self.height = height;
        self.clamp_scroll();
        true
    }

    pub fn scroll_to(&mut self, top: u64) -> bool {
        let prev = self.scroll_top;
        self.scroll_top = top;
        self.clamp_scroll();
        self.scroll_top != prev
    }

    pub fn scroll_by(&mut self, delta: i64) -> bool {
        let top = if delta >= 0 {
            self.scroll_top.saturating_add(delta.unsigned_abs())
        } else {
            self.scroll_top.saturating_sub(delta.unsigned_abs())
        };
        self.scroll_to(top)
    }

    pub fn first_visible(&self) -> usize {
        (self.scroll_top / u64::from(self.row_height)) as usize
    }

    /// Rows needed to cover the viewport height, counting a partial last row.
    pub fn rows_per_page(&self) -> usize {
        self.height.div_ceil(self.row_height) as usize
    }

    /// Indices the renderer should materialize, overscan included.
    pub fn visible_range(&self) -> Range<usize> {
        let first = self.first_visible();
        let start = first.saturating_sub(self.overscan).min(self.row_count);
        let end = first
            .saturating_add(self.rows_per_page())
            .saturating_add(self.overscan)
            .min(self.row_count);
        start..end.max(start)
    }

    /// Row under a y offset measured from the top of the viewport.
    pub fn row_at(&self, y: u32) -> Option<usize> {
        if y >= self.height {
            return None;
        }
        let index = ((self.scroll_top + u64::from(y)) / u64::from(self.row_height)) as usize;
        (index < self.row_count).then_some(index)
    }

    /// Scrolls the minimum distance that brings `index` fully into view.
    pub fn keep_row_visible(&mut self, index: usize) -> bool {
        if index >= self.row_count {
            return false;
        }
        let top = self.row_top(index);
        let bottom = top + u64::from(self.row_height);
        let view_bottom = self.scroll_top + u64::from(self.height);

        if top < self.scroll_top {
            return self.scroll_to(top);
        }
        if bottom > view_bottom {
            return self.scroll_to(bottom.saturating_sub(u64::from(self.height)));
        }
        false
    }

    /// Fills `visible_start_offset` of every expanded subtree from the current
    /// scroll position.
    pub fn apply_visible_offsets(&self, rows: &mut Flattened) {
        let first = self.first_visible();
        for metrics in rows.expanded.values_mut() {
            metrics.visible_start_offset = first
                .saturating_sub(metrics.row_index + 1)
                .min(metrics.visible_rows);
        }
    }

    pub fn guidelines(&self, rows: &Flattened) -> Vec<Guideline> {
        let window = self.visible_range();
        let mut out: Vec<Guideline> = rows
            .expanded
            .iter()
            .filter(|(_, m)| m.visible_rows > 0)
            .filter_map(|(path, m)| {
                let start = (m.row_index + 1).max(window.start);
                let end = (m.row_index + 1 + m.visible_rows).min(window.end);
                (start < end).then(|| Guideline {
                    path: path.clone(),
                    depth: m.depth,
                    start_row: start,
                    end_row: end,
                    top: self.row_top(start),
                    height: (end - start) as u64 * u64::from(self.row_height),
                })
            })
            .collect();
        out.sort_by(|a, b| a.depth.cmp(&b.depth).then(a.start_row.cmp(&b.start_row)));
        out
    }

    fn clamp_scroll(&mut self) {
        let max_scroll = self.total_height().saturating_sub(u64::from(self.height));
        self.scroll_top = self.scroll_top.min(max_scroll);
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/views/explorer/viewport.rs"]
mod tests;
