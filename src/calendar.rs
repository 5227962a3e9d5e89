use crate::dates::{date_ordinal, days_in_month, first_weekday_offset, ordinal};
use crate::layout::LayoutInfo;
use crate::model::{CalendarError, DiaryStatus, MonthIndex, MonthInfo};
use anyhow::Result;
use chrono::{Datelike, NaiveDate};

pub const FUTURE_DATE_MESSAGE: &str = "Cannot create a diary entry in the future.";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Panel {
    Life,
    Month,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    Move(Direction),
    First,
    Last,
    Confirm,
    TogglePanel,
    Quit,
    Other,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Toolkit-independent input fed to [`Calendar::handle_event`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Input {
    Resize {
        width: u16,
        height: u16,
    },
    Key(Key),
    Pointer {
        button: PointerButton,
        released: bool,
        x: u16,
        y: u16,
    },
    Tick,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored,
    Consumed,
    Quit,
}

/// Called when the user confirms a past or present day. Blocks until the
/// caller's diary workflow is done.
pub trait DayActivation {
    fn on_day_activated(&mut self, year: i32, month: u32, day: u32) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub focused_month: usize,
    pub selected_day: u32,
    pub active_panel: Panel,
    pub status_message: String,
}

pub struct Calendar<S> {
    months: MonthIndex,
    diary: S,
    nav: NavigationState,
}

impl<S: DiaryStatus> Calendar<S> {
    pub fn new(
        birth: NaiveDate,
        death: NaiveDate,
        today: NaiveDate,
        diary: S,
    ) -> Result<Self, CalendarError> {
        let months = MonthIndex::build(birth, death, today)?;
        let focused_month = months.current_index().unwrap_or(0);
        let mut calendar = Calendar {
            months,
            diary,
            nav: NavigationState {
                focused_month,
                selected_day: today.day(),
                active_panel: Panel::Life,
                status_message: String::new(),
            },
        };
        calendar.clamp_selected_day();
        calendar.refresh_diary_status(today);
        Ok(calendar)
    }

    pub fn months(&self) -> &MonthIndex {
        &self.months
    }

    pub fn diary(&self) -> &S {
        &self.diary
    }

    pub fn nav(&self) -> &NavigationState {
        &self.nav
    }

    pub fn focused(&self) -> &MonthInfo {
        &self.months.months()[self.nav.focused_month]
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        let m = self.focused();
        NaiveDate::from_ymd_opt(m.year, m.month, self.nav.selected_day)
    }

    pub fn layout(&self, width: u16, height: u16) -> LayoutInfo {
        LayoutInfo::compute(width, height, self.months.len(), self.nav.focused_month)
    }

    pub fn refresh_diary_status(&mut self, today: NaiveDate) {
        self.months.refresh_diary_status(&self.diary, today);
    }

    /// Applies one input. `width`/`height` are the terminal size the event
    /// was observed against; `today` is fixed for the whole event.
    pub fn handle_event(
        &mut self,
        input: Input,
        width: u16,
        height: u16,
        today: NaiveDate,
        activation: &mut dyn DayActivation,
    ) -> EventOutcome {
        let layout = self.layout(width, height);
        match input {
            Input::Resize { .. } | Input::Tick => EventOutcome::Consumed,
            Input::Pointer {
                button,
                released,
                x,
                y,
            } => {
                if button == PointerButton::Left
                    && released
                    && self.handle_pointer(&layout, x, y, today, activation)
                {
                    EventOutcome::Consumed
                } else {
                    EventOutcome::Ignored
                }
            }
            Input::Key(Key::Quit) => EventOutcome::Quit,
            Input::Key(Key::TogglePanel) => {
                self.nav.active_panel = match self.nav.active_panel {
                    Panel::Life => Panel::Month,
                    Panel::Month => Panel::Life,
                };
                EventOutcome::Consumed
            }
            Input::Key(Key::Confirm) => {
                self.activate(today, activation);
                EventOutcome::Consumed
            }
            Input::Key(Key::Other) => EventOutcome::Ignored,
            Input::Key(key) => match self.nav.active_panel {
                Panel::Life => self.handle_life_key(key, &layout, today),
                Panel::Month => self.handle_month_key(key),
            },
        }
    }

    fn handle_life_key(&mut self, key: Key, layout: &LayoutInfo, today: NaiveDate) -> EventOutcome {
        let cols = layout.life_cols as isize;
        match key {
            Key::Move(Direction::Left) => self.move_month(-1, today),
            Key::Move(Direction::Right) => self.move_month(1, today),
            Key::Move(Direction::Up) => self.move_month(-cols, today),
            Key::Move(Direction::Down) => self.move_month(cols, today),
            Key::First => self.set_focused_month(0, today),
            Key::Last => self.set_focused_month(self.months.len().saturating_sub(1), today),
            _ => return EventOutcome::Ignored,
        }
        EventOutcome::Consumed
    }

    fn handle_month_key(&mut self, key: Key) -> EventOutcome {
        let day = self.nav.selected_day;
        match key {
            Key::Move(Direction::Left) => self.nav.selected_day = day.saturating_sub(1).max(1),
            Key::Move(Direction::Right) => self.nav.selected_day = day + 1,
            Key::Move(Direction::Up) => self.nav.selected_day = day.saturating_sub(7).max(1),
            Key::Move(Direction::Down) => self.nav.selected_day = day + 7,
            Key::First => self.nav.selected_day = 1,
            Key::Last => self.nav.selected_day = self.focused().days(),
            _ => return EventOutcome::Ignored,
        }
        self.clamp_selected_day();
        EventOutcome::Consumed
    }

    /// Returns whether the release landed on a life cell or a day.
    fn handle_pointer(
        &mut self,
        layout: &LayoutInfo,
        x: u16,
        y: u16,
        today: NaiveDate,
        activation: &mut dyn DayActivation,
    ) -> bool {
        if let Some(cell) = layout.life_cell_at(x, y) {
            self.set_focused_month(cell * layout.months_per_cell, today);
            self.nav.active_panel = Panel::Life;
            return true;
        }
        let Some((row, col)) = layout.month_slot_at(x, y) else {
            return false;
        };
        let m = *self.focused();
        let slot = i64::from(row) * 7 + i64::from(col);
        let day = slot - i64::from(first_weekday_offset(m.year, m.month)) + 1;
        if !(1..=i64::from(m.days())).contains(&day) {
            return false;
        }
        self.nav.selected_day = day as u32;
        self.nav.active_panel = Panel::Month;
        self.activate(today, activation);
        true
    }

    fn move_month(&mut self, delta: isize, today: NaiveDate) {
        let target = (self.nav.focused_month as isize).saturating_add(delta).max(0);
        self.set_focused_month(target as usize, today);
    }

    fn set_focused_month(&mut self, idx: usize, today: NaiveDate) {
        if self.months.is_empty() {
            return;
        }
        let idx = idx.min(self.months.len() - 1);
        if idx == self.nav.focused_month {
            return;
        }
        self.nav.focused_month = idx;
        if self.focused().contains(today) {
            self.nav.selected_day = today.day();
        }
        self.clamp_selected_day();
    }

    fn clamp_selected_day(&mut self) {
        let m = self.focused();
        let days = days_in_month(m.year, m.month);
        self.nav.selected_day = self.nav.selected_day.clamp(1, days);
    }

    /// Opens the selected day unless it lies after `today`. Diary status is
    /// refreshed once the callback returns, whatever its result.
    fn activate(&mut self, today: NaiveDate, activation: &mut dyn DayActivation) {
        let m = *self.focused();
        let day = self.nav.selected_day;
        if ordinal(m.year, m.month, day) > date_ordinal(today) {
            tracing::debug!(year = m.year, month = m.month, day, "rejected future activation");
            self.nav.status_message = FUTURE_DATE_MESSAGE.to_string();
            return;
        }
        self.nav.status_message.clear();
        let result = activation.on_day_activated(m.year, m.month, day);
        self.refresh_diary_status(today);
        if let Err(err) = result {
            tracing::warn!(year = m.year, month = m.month, day, error = %err, "diary activation failed");
            self.nav.status_message = format!("Could not open diary: {err:#}");
        }
    }
}
