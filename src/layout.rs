use ratatui::layout::Rect;

pub const MIN_LEFT_WIDTH: u16 = 26;
pub const MIN_RIGHT_WIDTH: u16 = 20;
pub const COUNTDOWN_HEIGHT: u16 = 3;
/// Borders, the separator and three status lines below the life grid.
pub const LIFE_PANEL_CHROME: u16 = 6;
pub const DAY_CELL_WIDTH: u16 = 3;
pub const WEEK_DAYS: u16 = 7;
pub const MONTH_ROWS: u16 = 6;

/// Geometry of one frame. Rebuilt from the terminal size on every render
/// and every input event; hit-testing and drawing read the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutInfo {
    pub left: Rect,
    pub right_top: Rect,
    pub right_bottom: Rect,
    pub life_grid: Rect,
    pub life_cols: u16,
    pub life_rows: u16,
    pub months_per_cell: usize,
    pub cell_count: usize,
    pub focus_cell: usize,
    pub month_grid: Rect,
}

impl LayoutInfo {
    pub fn compute(width: u16, height: u16, total_months: usize, focused_month: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        let two_thirds = (u32::from(width) * 2 / 3) as u16;
        let mut left_w = MIN_LEFT_WIDTH.max(two_thirds);
        let mut right_w = MIN_RIGHT_WIDTH.max(width.saturating_sub(left_w));
        if left_w.saturating_add(right_w) > width {
            left_w = width.saturating_sub(right_w);
        }
        right_w = right_w.min(width - left_w);

        let left = Rect::new(0, 0, left_w, height);
        let right_top_h = height.saturating_sub(COUNTDOWN_HEIGHT).max(1);
        let right_top = Rect::new(left_w, 0, right_w, right_top_h);
        let right_bottom = Rect::new(left_w, right_top_h, right_w, COUNTDOWN_HEIGHT);

        let life_cols = left_w.saturating_sub(2).max(1);
        let life_rows = height.saturating_sub(LIFE_PANEL_CHROME).max(1);
        // Grid dimensions stay at least 1x1 for the division below; the
        // rectangle itself is clipped to what the left panel can show.
        let left_inner = Rect::new(
            left.x + 1,
            left.y + 1,
            left_w.saturating_sub(2),
            height.saturating_sub(2),
        );
        let life_grid =
            Rect::new(left.x + 1, left.y + 1, life_cols, life_rows).intersection(left_inner);

        let capacity = usize::from(life_cols) * usize::from(life_rows);
        let total = total_months.max(1);
        let months_per_cell = total.div_ceil(capacity).max(1);
        let cell_count = total.div_ceil(months_per_cell);

        // Header row sits between the top border and the first week.
        let month_grid = Rect::new(
            right_top.x + 1,
            right_top.y + 2,
            (DAY_CELL_WIDTH * WEEK_DAYS).min(right_w.saturating_sub(2)),
            MONTH_ROWS.min(right_top_h.saturating_sub(3)),
        );

        LayoutInfo {
            left,
            right_top,
            right_bottom,
            life_grid,
            life_cols,
            life_rows,
            months_per_cell,
            cell_count,
            focus_cell: focused_month / months_per_cell,
            month_grid,
        }
    }

    /// Row-major index of the life-grid cell under the pointer.
    pub fn life_cell_at(&self, x: u16, y: u16) -> Option<usize> {
        if !hit(self.life_grid, x, y) {
            return None;
        }
        let col = usize::from(x - self.life_grid.x);
        let row = usize::from(y - self.life_grid.y);
        let cell = row * usize::from(self.life_cols) + col;
        (cell < self.cell_count).then_some(cell)
    }

    /// (row, column) of the month-grid slot under the pointer.
    pub fn month_slot_at(&self, x: u16, y: u16) -> Option<(u16, u16)> {
        if !hit(self.month_grid, x, y) {
            return None;
        }
        let col = (x - self.month_grid.x) / DAY_CELL_WIDTH;
        let row = y - self.month_grid.y;
        Some((row, col))
    }

    /// Month index range covered by a life-grid cell.
    pub fn cell_months(&self, cell: usize, total_months: usize) -> std::ops::Range<usize> {
        let start = cell * self.months_per_cell;
        start.min(total_months)..(start + self.months_per_cell).min(total_months)
    }
}

fn hit(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x
        && u32::from(x) < u32::from(rect.x) + u32::from(rect.width)
        && y >= rect.y
        && u32::from(y) < u32::from(rect.y) + u32::from(rect.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_invariants_hold_for_any_size() {
        let sizes = [0u16, 1, 2, 7, 26, 45, 46, 80, 200, 1000];
        let totals = [1usize, 12, 961, 100_000];
        for &w in &sizes {
            for &h in &sizes {
                for &total in &totals {
                    let layout = LayoutInfo::compute(w, h, total, total - 1);
                    assert!(layout.life_cols >= 1);
                    assert!(layout.life_rows >= 1);
                    assert!(layout.months_per_cell >= 1);
                    assert!(layout.cell_count * layout.months_per_cell >= total);
                    assert!(layout.left.width + layout.right_top.width <= w.max(1));
                    assert!(layout.focus_cell < layout.cell_count);
                }
            }
        }
    }

    #[test]
    fn panels_split_two_thirds() {
        let layout = LayoutInfo::compute(90, 24, 961, 0);
        assert_eq!(layout.left.width, 60);
        assert_eq!(layout.right_top.width, 30);
        assert_eq!(layout.right_top.x, 60);
        assert_eq!(layout.right_top.height, 21);
        assert_eq!(layout.right_bottom.y, 21);
        assert_eq!(layout.right_bottom.height, COUNTDOWN_HEIGHT);
        assert_eq!((layout.life_cols, layout.life_rows), (58, 18));
        assert_eq!(layout.months_per_cell, 1);
        assert_eq!(layout.cell_count, 961);
    }

    #[test]
    fn narrow_terminal_keeps_minimum_panels_within_width() {
        let layout = LayoutInfo::compute(50, 24, 961, 0);
        assert_eq!(layout.left.width, 30);
        assert_eq!(layout.right_top.width, 20);

        let tiny = LayoutInfo::compute(30, 10, 961, 0);
        assert_eq!(tiny.right_top.width, 20);
        assert_eq!(tiny.left.width, 10);
    }

    #[test]
    fn small_grid_aggregates_months() {
        let layout = LayoutInfo::compute(60, 24, 961, 293);
        assert_eq!((layout.life_cols, layout.life_rows), (38, 18));
        assert_eq!(layout.months_per_cell, 2);
        assert_eq!(layout.cell_count, 481);
        assert_eq!(layout.focus_cell, 146);
        assert_eq!(layout.cell_months(480, 961), 960..961);
    }

    #[test]
    fn life_hit_test_is_row_major() {
        let layout = LayoutInfo::compute(60, 24, 961, 0);
        assert_eq!(layout.life_cell_at(1, 1), Some(0));
        assert_eq!(layout.life_cell_at(4, 1), Some(3));
        assert_eq!(layout.life_cell_at(1, 2), Some(38));
        assert_eq!(layout.life_cell_at(0, 1), None);
        // Last row is only partly populated: 481 cells in a 38-wide grid.
        assert_eq!(layout.life_cell_at(1 + 37, 1 + 12), None);
    }

    #[test]
    fn month_grid_is_clipped_to_its_panel() {
        let wide = LayoutInfo::compute(90, 24, 961, 0);
        assert_eq!(wide.month_grid, Rect::new(61, 2, 21, 6));
        assert_eq!(wide.month_slot_at(64, 7), Some((5, 1)));
        assert_eq!(wide.month_slot_at(82, 2), None);

        let narrow = LayoutInfo::compute(60, 24, 961, 0);
        assert_eq!(narrow.month_grid.width, 18);
        assert_eq!(narrow.month_slot_at(41 + 18, 2), None);

        let short = LayoutInfo::compute(90, 6, 961, 0);
        assert_eq!(short.life_grid.height, 1);
        assert_eq!(short.month_grid.height, 0);
        assert_eq!(short.month_slot_at(61, 2), None);
    }

    #[test]
    fn collapsed_left_panel_has_no_life_hit_box() {
        let layout = LayoutInfo::compute(20, 24, 961, 0);
        assert_eq!(layout.left.width, 0);
        assert_eq!(layout.life_cols, 1);
        assert_eq!(layout.life_grid.width, 0);
        assert_eq!(layout.life_cell_at(1, 4), None);
        // The month grid underneath is still reachable.
        assert_eq!(layout.month_slot_at(1, 4), Some((2, 0)));
    }
}
