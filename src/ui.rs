use crate::calendar::{
    Calendar, DayActivation, Direction, EventOutcome, Input, Key, PointerButton,
};
use crate::config::Config;
use crate::dates;
use crate::diary::DiaryStore;
use crate::render::{self, Scene};
use anyhow::Result;
use chrono::{Datelike, Local};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, stdout, Stdout};
use std::time::{Duration, Instant};

const TICK_RATE: Duration = Duration::from_secs(1);
const PREVIEW_LINES: usize = 100;

type Term = Terminal<CrosstermBackend<Stdout>>;

pub fn run(config: Config) -> Result<()> {
    let store = DiaryStore::from_config(&config);
    store.ensure_template(config.template_fallback.as_deref());
    let mut calendar = Calendar::new(config.birth, config.death, dates::today(), store.clone())?;
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut calendar, &config, &store);
    teardown_terminal(&mut terminal)?;
    result
}

fn event_loop(
    terminal: &mut Term,
    calendar: &mut Calendar<DiaryStore>,
    config: &Config,
    store: &DiaryStore,
) -> Result<()> {
    let mut last_tick = Instant::now();
    loop {
        let today = dates::today();
        let preview = calendar
            .selected_date()
            .map(|d| store.preview_lines(d.year(), d.month(), d.day(), PREVIEW_LINES))
            .unwrap_or_default();
        let scene = Scene {
            today,
            now: Local::now().naive_local(),
            death: config.death,
            death_label: &config.death_label,
            preview: &preview,
        };
        terminal.draw(|f| render::draw(f, &*calendar, &scene))?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        let input = if event::poll(timeout)? {
            match translate(event::read()?) {
                Some(input) => input,
                None => continue,
            }
        } else {
            last_tick = Instant::now();
            Input::Tick
        };

        let size = terminal.size()?;
        let (width, height) = match input {
            Input::Resize { width, height } => (width, height),
            _ => (size.width, size.height),
        };
        let mut launcher = EditorLauncher {
            terminal: &mut *terminal,
            store,
            editor: &config.editor,
        };
        if calendar.handle_event(input, width, height, today, &mut launcher) == EventOutcome::Quit {
            break;
        }
    }
    Ok(())
}

/// Maps crossterm events onto calendar input; `None` for events with no meaning here.
pub fn translate(event: Event) -> Option<Input> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(Input::Key(translate_key(key))),
        Event::Mouse(mouse) => translate_mouse(mouse),
        Event::Resize(width, height) => Some(Input::Resize { width, height }),
        _ => None,
    }
}

fn translate_key(key: KeyEvent) -> Key {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => Key::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => Key::Move(Direction::Right),
        KeyCode::Up | KeyCode::Char('k') => Key::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Key::Move(Direction::Down),
        KeyCode::Home | KeyCode::Char('g') => Key::First,
        KeyCode::End | KeyCode::Char('G') => Key::Last,
        KeyCode::Enter => Key::Confirm,
        KeyCode::Tab => Key::TogglePanel,
        KeyCode::Esc | KeyCode::Char('q') => Key::Quit,
        _ => Key::Other,
    }
}

fn translate_mouse(mouse: MouseEvent) -> Option<Input> {
    let (button, released) = match mouse.kind {
        MouseEventKind::Down(b) => (b, false),
        MouseEventKind::Up(b) => (b, true),
        _ => return None,
    };
    let button = match button {
        MouseButton::Left => PointerButton::Left,
        MouseButton::Right => PointerButton::Right,
        MouseButton::Middle => PointerButton::Middle,
    };
    Some(Input::Pointer {
        button,
        released,
        x: mouse.column,
        y: mouse.row,
    })
}

/// Hands the terminal to the editor for the duration of an activation.
struct EditorLauncher<'a> {
    terminal: &'a mut Term,
    store: &'a DiaryStore,
    editor: &'a str,
}

impl DayActivation for EditorLauncher<'_> {
    fn on_day_activated(&mut self, year: i32, month: u32, day: u32) -> Result<()> {
        let _suspended = Suspended::enter(&mut *self.terminal)?;
        self.store.open(year, month, day, self.editor)?;
        Ok(())
    }
}

/// Terminal operations needed to hand the screen to another program.
trait Screen {
    fn release_raw(&mut self) -> io::Result<()>;
    fn leave(&mut self) -> io::Result<()>;
    fn resume(&mut self) -> io::Result<()>;
}

impl Screen for Term {
    fn release_raw(&mut self) -> io::Result<()> {
        disable_raw_mode()
    }

    fn leave(&mut self) -> io::Result<()> {
        execute!(self.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        self.show_cursor()
    }

    fn resume(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        execute!(self.backend_mut(), EnterAlternateScreen, EnableMouseCapture)?;
        self.clear()
    }
}

/// Restores the TUI when dropped, including on early returns.
struct Suspended<'a, S: Screen> {
    screen: &'a mut S,
}

impl<'a, S: Screen> Suspended<'a, S> {
    fn enter(screen: &'a mut S) -> io::Result<Self> {
        screen.release_raw()?;
        // Armed before leaving the alternate screen so a failure there
        // still puts the terminal back.
        let mut guard = Suspended { screen };
        guard.screen.leave()?;
        Ok(guard)
    }
}

impl<S: Screen> Drop for Suspended<'_, S> {
    fn drop(&mut self) {
        if let Err(err) = self.screen.resume() {
            tracing::warn!(error = %err, "could not restore terminal after editor");
        }
    }
}

fn setup_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
