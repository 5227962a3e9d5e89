use crate::calendar::{Calendar, Panel};
use crate::dates::{date_ordinal, first_weekday_offset, month_name, ordinal};
use crate::layout::{LayoutInfo, DAY_CELL_WIDTH, MONTH_ROWS, WEEK_DAYS};
use crate::model::{DiaryStatus, MonthInfo};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use ratatui::prelude::{Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use std::fmt;

const PAST_COLOR: Color = Color::Rgb(90, 140, 220);
const WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Per-frame values that do not live in the calendar itself.
pub struct Scene<'a> {
    pub today: NaiveDate,
    pub now: NaiveDateTime,
    pub death: NaiveDate,
    pub death_label: &'a str,
    pub preview: &'a [String],
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CellKind {
    Current,
    Full,
    Past,
    Future,
}

impl CellKind {
    pub fn of(months: &[MonthInfo]) -> Self {
        let has_past = months.iter().any(|m| m.is_past);
        if months.iter().any(|m| m.is_current) {
            CellKind::Current
        } else if has_past && months.iter().all(|m| m.has_full_diary) {
            CellKind::Full
        } else if has_past {
            CellKind::Past
        } else {
            CellKind::Future
        }
    }

    fn color(self) -> Color {
        match self {
            CellKind::Current => Color::Yellow,
            CellKind::Full => Color::Green,
            CellKind::Past => PAST_COLOR,
            CellKind::Future => Color::DarkGray,
        }
    }
}

/// Highlight for the focused life cell or selected day.
pub fn focus_style(style: Style, focused: bool, panel_active: bool) -> Style {
    match (focused, panel_active) {
        (false, _) => style,
        (true, true) => style.add_modifier(Modifier::BOLD | Modifier::REVERSED),
        (true, false) => style.add_modifier(Modifier::UNDERLINED | Modifier::DIM),
    }
}

pub fn day_style(is_today: bool, is_future: bool, has_note: bool) -> Style {
    let mut style = Style::default();
    if is_today {
        style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    }
    if is_future {
        style = style.fg(Color::DarkGray);
    } else if has_note {
        style = style.fg(Color::Green);
    }
    style
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Time left until the midnight that ends `death`, floored at zero.
    pub fn until(death: NaiveDate, now: NaiveDateTime) -> Self {
        let target = death.succ_opt().unwrap_or(death).and_time(NaiveTime::MIN);
        let total = (target - now).num_seconds().max(0);
        Countdown {
            days: total / 86_400,
            hours: total % 86_400 / 3_600,
            minutes: total % 3_600 / 60,
            seconds: total % 60,
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

pub fn draw<S: DiaryStatus>(f: &mut Frame<'_>, calendar: &Calendar<S>, scene: &Scene<'_>) {
    let area = f.size();
    let layout = calendar.layout(area.width, area.height);
    draw_life_panel(f, calendar, &layout, area);
    draw_month_panel(f, calendar, &layout, scene, area);
    draw_countdown(f, &layout, scene, area);
}

fn panel_block(title: String, active: bool) -> Block<'static> {
    Block::default()
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if active {
            Color::LightYellow
        } else {
            Color::DarkGray
        }))
}

fn separator(f: &mut Frame<'_>, x: u16, y: u16, width: u16, clip: Rect) {
    let rect = Rect::new(x, y, width, 1).intersection(clip);
    if rect.area() == 0 {
        return;
    }
    let line = Paragraph::new("─".repeat(usize::from(rect.width)))
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(line, rect);
}

fn draw_life_panel<S: DiaryStatus>(
    f: &mut Frame<'_>,
    calendar: &Calendar<S>,
    layout: &LayoutInfo,
    area: Rect,
) {
    let left = layout.left.intersection(area);
    if left.area() == 0 {
        return;
    }
    let nav = calendar.nav();
    let active = nav.active_panel == Panel::Life;
    let block = panel_block("Life Calendar".into(), active);
    let inner = block.inner(left);
    f.render_widget(block, left);

    let months = calendar.months().months();
    let cols = usize::from(layout.life_cols);
    let rows = (0..usize::from(layout.life_rows))
        .map(|r| {
            let spans: Vec<Span<'static>> = (0..cols)
                .map(|c| {
                    let cell = r * cols + c;
                    if cell >= layout.cell_count {
                        return Span::raw(" ");
                    }
                    let kind = CellKind::of(&months[layout.cell_months(cell, months.len())]);
                    let style = Style::default().fg(kind.color());
                    Span::styled("#", focus_style(style, cell == layout.focus_cell, active))
                })
                .collect();
            Line::from(spans)
        })
        .collect::<Vec<_>>();
    let grid = layout.life_grid.intersection(inner);
    if grid.area() > 0 {
        f.render_widget(Paragraph::new(rows), grid);
    }

    let status_y = layout.life_grid.bottom();
    separator(f, inner.x, status_y, inner.width, inner);

    let focused = calendar.focused();
    let info = format!(
        "{} {}  {}",
        month_name(focused.month),
        focused.year,
        if focused.has_full_diary {
            "Full month diary"
        } else {
            "Month incomplete"
        }
    );
    let legend = Line::from(vec![
        Span::styled("#", Style::default().fg(PAST_COLOR)),
        Span::styled(" Past  ", Style::default().fg(Color::Gray)),
        Span::styled("#", Style::default().fg(Color::Green)),
        Span::styled(" Full  ", Style::default().fg(Color::Gray)),
        Span::styled("#", Style::default().fg(Color::Yellow)),
        Span::styled(" Current  ", Style::default().fg(Color::Gray)),
        Span::styled("#", Style::default().fg(Color::DarkGray)),
        Span::styled(" Future", Style::default().fg(Color::Gray)),
    ]);
    let status = vec![
        Line::from(Span::styled(info, Style::default().fg(Color::White))),
        Line::from(Span::styled(
            nav.status_message.clone(),
            Style::default().fg(Color::LightRed),
        )),
        legend,
    ];
    let status_area = Rect::new(inner.x, status_y.saturating_add(1), inner.width, 3).intersection(inner);
    if status_area.area() > 0 {
        f.render_widget(Paragraph::new(status), status_area);
    }
}

fn draw_month_panel<S: DiaryStatus>(
    f: &mut Frame<'_>,
    calendar: &Calendar<S>,
    layout: &LayoutInfo,
    scene: &Scene<'_>,
    area: Rect,
) {
    let panel = layout.right_top.intersection(area);
    if panel.area() == 0 {
        return;
    }
    let nav = calendar.nav();
    let active = nav.active_panel == Panel::Month;
    let m = *calendar.focused();
    let block = panel_block(format!("{} {}", month_name(m.month), m.year), active);
    let inner = block.inner(panel);
    f.render_widget(block, panel);

    let header: Vec<Span<'static>> = WEEKDAYS
        .iter()
        .map(|d| Span::styled(format!("{} ", d), Style::default().fg(Color::Gray)))
        .collect();
    let header_area = Rect::new(inner.x, inner.y, inner.width, 1).intersection(inner);
    if header_area.area() > 0 {
        f.render_widget(Paragraph::new(Line::from(header)), header_area);
    }

    let today = date_ordinal(scene.today);
    let first_wd = i64::from(first_weekday_offset(m.year, m.month));
    let days = i64::from(m.days());
    let diary = calendar.diary();
    let weeks = (0..i64::from(MONTH_ROWS))
        .map(|row| {
            let spans: Vec<Span<'static>> = (0..i64::from(WEEK_DAYS))
                .map(|col| {
                    let day = row * 7 + col - first_wd + 1;
                    if day < 1 || day > days {
                        return Span::raw(" ".repeat(usize::from(DAY_CELL_WIDTH)));
                    }
                    let day = day as u32;
                    let is_today = m.contains(scene.today) && day == scene.today.day();
                    let is_future = ordinal(m.year, m.month, day) > today;
                    let has_note = !is_future && diary.exists(m.year, m.month, day);
                    let style = focus_style(
                        day_style(is_today, is_future, has_note),
                        day == nav.selected_day,
                        active,
                    );
                    Span::styled(format!("{:>2} ", day), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect::<Vec<_>>();
    let grid = layout.month_grid.intersection(inner);
    if grid.area() > 0 {
        f.render_widget(Paragraph::new(weeks), grid);
    }

    let sep_y = layout.month_grid.bottom();
    separator(f, inner.x, sep_y, inner.width, inner);

    let preview_top = sep_y.saturating_add(1);
    let preview_area = Rect::new(
        inner.x,
        preview_top,
        inner.width,
        inner.bottom().saturating_sub(preview_top),
    )
    .intersection(inner);
    if preview_area.area() == 0 {
        return;
    }
    let preview: Vec<Line<'static>> = if scene.preview.is_empty() {
        vec![Line::from(Span::styled(
            "No note yet.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        scene.preview.iter().map(|l| Line::from(l.clone())).collect()
    };
    f.render_widget(Paragraph::new(preview), preview_area);
}

fn draw_countdown(f: &mut Frame<'_>, layout: &LayoutInfo, scene: &Scene<'_>, area: Rect) {
    let panel = layout.right_bottom.intersection(area);
    if panel.area() == 0 {
        return;
    }
    let block = panel_block(format!("Countdown to {}", scene.death_label), false);
    let text = Paragraph::new(Span::styled(
        Countdown::until(scene.death, scene.now).to_string(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ))
    .block(block);
    f.render_widget(text, panel);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{DayActivation, Input, Key};
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;

    struct NoOp;

    impl DayActivation for NoOp {
        fn on_day_activated(&mut self, _: i32, _: u32, _: u32) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(is_past: bool, is_current: bool, full: bool) -> MonthInfo {
        MonthInfo {
            year: 2024,
            month: 1,
            is_past,
            is_current,
            is_future: !is_past && !is_current,
            has_full_diary: full,
        }
    }

    fn notes_on_fifth(_: i32, _: u32, d: u32) -> bool {
        d == 5
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf.get(x, y).symbol()).collect()
    }

    fn render(width: u16, height: u16, calendar: &Calendar<fn(i32, u32, u32) -> bool>) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let scene = Scene {
            today: date(2024, 6, 15),
            now: date(2024, 6, 15).and_hms_opt(12, 0, 0).unwrap(),
            death: date(2080, 1, 1),
            death_label: "2080-01-01",
            preview: &[],
        };
        terminal.draw(|f| draw(f, calendar, &scene)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn calendar() -> Calendar<fn(i32, u32, u32) -> bool> {
        Calendar::new(
            date(2000, 1, 1),
            date(2080, 1, 1),
            date(2024, 6, 15),
            notes_on_fifth as fn(i32, u32, u32) -> bool,
        )
        .unwrap()
    }

    #[test]
    fn cell_kind_prefers_current_then_full_then_past() {
        assert_eq!(CellKind::of(&[month(true, false, true), month(false, true, false)]), CellKind::Current);
        assert_eq!(CellKind::of(&[month(true, false, true), month(true, false, true)]), CellKind::Full);
        assert_eq!(CellKind::of(&[month(true, false, true), month(true, false, false)]), CellKind::Past);
        assert_eq!(CellKind::of(&[month(true, false, false), month(false, false, false)]), CellKind::Past);
        assert_eq!(CellKind::of(&[month(false, false, false)]), CellKind::Future);
    }

    #[test]
    fn focus_style_depends_on_active_panel() {
        let base = Style::default();
        assert_eq!(focus_style(base, false, true), base);
        let active = focus_style(base, true, true);
        assert!(active.add_modifier.contains(Modifier::REVERSED | Modifier::BOLD));
        let inactive = focus_style(base, true, false);
        assert!(inactive.add_modifier.contains(Modifier::UNDERLINED | Modifier::DIM));
    }

    #[test]
    fn day_style_marks_today_future_and_notes() {
        assert_eq!(day_style(false, true, false).fg, Some(Color::DarkGray));
        assert_eq!(day_style(false, false, true).fg, Some(Color::Green));
        let today = day_style(true, false, false);
        assert_eq!(today.fg, Some(Color::Yellow));
        assert!(today.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn countdown_runs_to_midnight_after_death_and_stops_at_zero() {
        let now = date(2080, 1, 1).and_hms_opt(22, 58, 30).unwrap();
        let left = Countdown::until(date(2080, 1, 1), now);
        assert_eq!(left.to_string(), "0d 01:01:30");
        let later = date(2080, 1, 3).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(Countdown::until(date(2080, 1, 1), later).to_string(), "0d 00:00:00");
        let day_before = date(2079, 12, 30).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(Countdown::until(date(2080, 1, 1), day_before).days, 3);
    }

    #[test]
    fn draws_all_three_panels() {
        let buf = render(90, 24, &calendar());
        assert!(row_text(&buf, 0).contains("Life Calendar"));
        assert!(row_text(&buf, 0).contains("Jun 2024"));
        assert!(row_text(&buf, 1).contains("Su Mo Tu We Th Fr Sa"));
        assert!(row_text(&buf, 21).contains("Countdown to 2080-01-01"));
        assert!(row_text(&buf, 22).contains("d "));
        assert!(row_text(&buf, 20).contains("Jun 2024  Month incomplete"));
        assert!((0..24).any(|y| row_text(&buf, y).contains("No note yet.")));
    }

    #[test]
    fn focused_cell_and_selected_day_use_shared_geometry() {
        let cal = calendar();
        let buf = render(90, 24, &cal);
        let layout = cal.layout(90, 24);
        let cols = layout.life_cols;
        let focus = layout.focus_cell as u16;
        let cell = buf.get(layout.life_grid.x + focus % cols, layout.life_grid.y + focus / cols);
        assert_eq!(cell.symbol(), "#");
        assert_eq!(cell.fg, Color::Yellow);
        assert!(cell.modifier.contains(Modifier::REVERSED));

        // The 15th sits at row 2, column 6 of June 2024.
        let grid = layout.month_grid;
        let day = buf.get(grid.x + 18, grid.y + 2);
        assert_eq!(day.symbol(), "1");
        assert!(day.modifier.contains(Modifier::UNDERLINED));
        // The 5th (row 1, column 3) has a note.
        assert_eq!(buf.get(grid.x + 3 * 3 + 1, grid.y + 1).fg, Color::Green);
    }

    #[test]
    fn toggled_panel_moves_highlight() {
        let mut cal = calendar();
        cal.handle_event(Input::Key(Key::TogglePanel), 90, 24, date(2024, 6, 15), &mut NoOp);
        let buf = render(90, 24, &cal);
        let grid = cal.layout(90, 24).month_grid;
        assert!(buf.get(grid.x + 18, grid.y + 2).modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn degenerate_sizes_do_not_panic() {
        let cal = calendar();
        for (w, h) in [(1, 1), (5, 3), (26, 6), (46, 7), (300, 2)] {
            render(w, h, &cal);
        }
    }
}
