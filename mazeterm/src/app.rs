//! The terminal application: grid rendering, keyboard editing, trace replay.

use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};

use maze_core::{Cell, MazeGrid};
use maze_paths::{SearchEvent, search};

/// Interior width of a rendered cell, in terminal columns.
const CELL_W: u16 = 5;
/// Vertical pitch of a rendered cell (one interior row plus the separator).
const CELL_H: u16 = 2;
/// Screen row where the lattice starts (below status and help lines).
const TOP: u16 = 2;

const TICK_MIN: Duration = Duration::from_millis(100);
const TICK_MAX: Duration = Duration::from_millis(1000);
const TICK_STEP: Duration = Duration::from_millis(100);

/// How a cell is currently shown, mirroring the search trace.
#[derive(Copy, Clone, PartialEq, Eq)]
enum CellView {
    /// On the frontier (discovered, not yet finalized).
    Open,
    /// Finalized.
    Closed,
    /// The most recently finalized cell.
    Current,
    /// On the found path.
    Path,
}

impl CellView {
    fn bg(self) -> Color {
        match self {
            CellView::Open => Color::DarkCyan,
            CellView::Closed => Color::DarkGrey,
            CellView::Current => Color::DarkYellow,
            CellView::Path => Color::DarkMagenta,
        }
    }
}

/// Application state: the grid being edited plus the replay in progress.
pub struct App {
    grid: MazeGrid,
    cursor: Cell,
    tick: Duration,
    status: String,
    view: HashMap<Cell, CellView>,
    current: Option<Cell>,
    replay: VecDeque<SearchEvent>,
}

impl App {
    /// Create an app over a fresh grid.
    pub fn new(rows: i32, cols: i32) -> Result<Self, maze_core::GridError> {
        let grid = MazeGrid::new(rows, cols)?;
        Ok(Self {
            grid,
            cursor: Cell::ZERO,
            tick: Duration::from_millis(300),
            status: String::from("Ready. Shift+arrows toggle walls, Enter runs the search."),
            view: HashMap::new(),
            current: None,
            replay: VecDeque::new(),
        })
    }

    /// Main loop: draw, then either advance the replay on a timer tick or
    /// block on the next key press.
    pub fn event_loop(&mut self, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            self.draw(out)?;

            if !self.replay.is_empty() {
                if event::poll(self.tick)? {
                    // Any key aborts the animation; remaining trace events
                    // are discarded and the grid is untouched.
                    if let Event::Key(_) = event::read()? {
                        self.replay.clear();
                        self.status = String::from("Animation cancelled.");
                    }
                } else {
                    self.advance_replay();
                }
                continue;
            }

            if let Event::Key(KeyEvent {
                code, modifiers, ..
            }) = event::read()?
            {
                if !self.handle_key(code, modifiers) {
                    return Ok(());
                }
            }
        }
    }

    /// Returns `false` when the app should quit.
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let shift = modifiers.contains(KeyModifiers::SHIFT);
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Up => self.arrow(-1, 0, shift),
            KeyCode::Right => self.arrow(0, 1, shift),
            KeyCode::Down => self.arrow(1, 0, shift),
            KeyCode::Left => self.arrow(0, -1, shift),
            KeyCode::Char('s') => match self.grid.set_start(self.cursor) {
                Ok(()) => self.status = format!("Start set to cell {}", self.label(self.cursor)),
                Err(e) => self.status = e.to_string(),
            },
            KeyCode::Char('g') => match self.grid.set_goal(self.cursor) {
                Ok(()) => self.status = format!("Goal set to cell {}", self.label(self.cursor)),
                Err(e) => self.status = e.to_string(),
            },
            KeyCode::Enter => self.run_search(),
            KeyCode::Char('r') => self.reset(),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.tick = (self.tick.saturating_sub(TICK_STEP)).max(TICK_MIN);
                self.status = format!("Speed: {} ms per step", self.tick.as_millis());
            }
            KeyCode::Char('-') => {
                self.tick = (self.tick + TICK_STEP).min(TICK_MAX);
                self.status = format!("Speed: {} ms per step", self.tick.as_millis());
            }
            _ => {}
        }
        true
    }

    /// Arrow key: move the cursor, or with shift toggle the wall between the
    /// cursor cell and the neighbour in that direction.
    fn arrow(&mut self, drow: i32, dcol: i32, shift: bool) {
        let target = self.cursor.shift(drow, dcol);
        if shift {
            match self.grid.toggle_wall(self.cursor, target) {
                Ok(true) => {
                    self.status = format!(
                        "Added wall between {} and {}",
                        self.label(self.cursor),
                        self.label(target)
                    );
                }
                Ok(false) => {
                    self.status = format!(
                        "Removed wall between {} and {}",
                        self.label(self.cursor),
                        self.label(target)
                    );
                }
                Err(e) => self.status = e.to_string(),
            }
        } else if self.grid.contains(target) {
            self.cursor = target;
        }
    }

    /// 1-based row-major cell number, as shown in the grid.
    fn label(&self, cell: Cell) -> String {
        match self.grid.number_of(cell) {
            Some(n) => n.to_string(),
            None => cell.to_string(),
        }
    }

    /// Run the search synchronously, then queue its trace for replay.
    fn run_search(&mut self) {
        self.view.clear();
        self.current = None;
        match search(&self.grid) {
            Ok(report) => {
                log::debug!(
                    "search finished: {} events, path: {:?}",
                    report.trace.len(),
                    report.path().map(|p| p.len())
                );
                self.replay = report.trace.into();
                self.status = String::from("Running search...");
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    /// Apply the next trace event to the view.
    fn advance_replay(&mut self) {
        let Some(ev) = self.replay.pop_front() else {
            return;
        };
        match ev {
            SearchEvent::Discovered { cell, .. } => {
                self.view.entry(cell).or_insert(CellView::Open);
            }
            SearchEvent::Finalized { cell, f, .. } => {
                if let Some(prev) = self.current.take() {
                    self.view.insert(prev, CellView::Closed);
                }
                self.view.insert(cell, CellView::Current);
                self.current = Some(cell);
                self.status = format!("Exploring ({}, {}) - f={}", cell.row, cell.col, f);
            }
            SearchEvent::PathFound { path } => {
                let steps = path.len() - 1;
                for cell in path {
                    self.view.insert(cell, CellView::Path);
                }
                self.current = None;
                self.status = format!("Path found! Length: {steps} steps");
            }
            SearchEvent::NoPathFound => {
                self.current = None;
                self.status = String::from("No path found!");
            }
        }
    }

    /// Clear walls and any previous run's visualization.
    fn reset(&mut self) {
        self.grid.clear_walls();
        self.view.clear();
        self.current = None;
        self.status = String::from("Maze reset. Ready.");
    }

    fn draw(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(
            out,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Reset),
            SetBackgroundColor(Color::Reset),
        )?;
        write!(out, "{}", self.status)?;
        queue!(out, cursor::MoveTo(0, 1), SetForegroundColor(Color::DarkGrey))?;
        write!(
            out,
            "arrows: move  shift+arrows: wall  s/g: start/goal  enter: run  r: reset  +/-: speed  q: quit"
        )?;
        queue!(out, SetForegroundColor(Color::Reset))?;

        for row in 0..=self.grid.rows() {
            self.draw_separator_row(out, row)?;
            if row < self.grid.rows() {
                self.draw_cell_row(out, row)?;
            }
        }

        out.flush()
    }

    /// The horizontal lattice line above grid row `row` (below the last row
    /// when `row == rows`). Wall segments are drawn bold blue.
    fn draw_separator_row(&self, out: &mut impl Write, row: i32) -> io::Result<()> {
        let y = TOP + row as u16 * CELL_H;
        queue!(out, cursor::MoveTo(0, y))?;
        for col in 0..self.grid.cols() {
            let walled = row > 0
                && row < self.grid.rows()
                && self
                    .grid
                    .is_blocked(Cell::new(row - 1, col), Cell::new(row, col))
                    .unwrap_or(false);
            write!(out, "+")?;
            if walled {
                queue!(out, SetForegroundColor(Color::Blue), SetAttribute(Attribute::Bold))?;
            }
            for _ in 0..CELL_W {
                write!(out, "-")?;
            }
            if walled {
                queue!(out, SetAttribute(Attribute::Reset), SetForegroundColor(Color::Reset))?;
            }
        }
        write!(out, "+")?;
        Ok(())
    }

    /// One interior row: vertical separators and the numbered cells.
    fn draw_cell_row(&self, out: &mut impl Write, row: i32) -> io::Result<()> {
        let y = TOP + row as u16 * CELL_H + 1;
        queue!(out, cursor::MoveTo(0, y))?;
        for col in 0..=self.grid.cols() {
            let walled = col > 0
                && col < self.grid.cols()
                && self
                    .grid
                    .is_blocked(Cell::new(row, col - 1), Cell::new(row, col))
                    .unwrap_or(false);
            if walled {
                queue!(out, SetForegroundColor(Color::Blue), SetAttribute(Attribute::Bold))?;
                write!(out, "|")?;
                queue!(out, SetAttribute(Attribute::Reset), SetForegroundColor(Color::Reset))?;
            } else {
                write!(out, "|")?;
            }
            if col < self.grid.cols() {
                self.draw_cell(out, Cell::new(row, col))?;
            }
        }
        Ok(())
    }

    fn draw_cell(&self, out: &mut impl Write, cell: Cell) -> io::Result<()> {
        // Endpoints take precedence over trace states, as in the visual
        // convention of the status colors: green start, red goal.
        let bg = if cell == self.grid.start() {
            Some(Color::DarkGreen)
        } else if cell == self.grid.goal() {
            Some(Color::DarkRed)
        } else {
            self.view.get(&cell).map(|v| v.bg())
        };

        if let Some(bg) = bg {
            queue!(out, SetBackgroundColor(bg))?;
        }
        if cell == self.cursor {
            queue!(out, SetAttribute(Attribute::Reverse))?;
        }
        let num = self.grid.number_of(cell).unwrap_or(0);
        write!(out, "{num:^width$}", width = CELL_W as usize)?;
        if cell == self.cursor {
            queue!(out, SetAttribute(Attribute::Reset))?;
        }
        if bg.is_some() {
            queue!(out, SetBackgroundColor(Color::Reset))?;
        }
        Ok(())
    }
}

/// Set up the terminal, run the app, and always restore the terminal.
pub fn run(rows: i32, cols: i32) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(rows, cols)?;

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::Clear(ClearType::All)
    )?;

    let res = app.event_loop(&mut stdout);

    let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    res
}
