//! Terminal surfaces the registry can paint on

use std::io::{self, Stdout};

use crossterm::cursor;
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::{Backend, CrosstermBackend, TestBackend};
use ratatui::style::Style;
use ratatui::Terminal;

/// An owned terminal. Acquired before the registry starts, released exactly
/// once when it stops.
pub trait Surface: Send + 'static {
    type Backend: Backend;

    fn terminal(&mut self) -> &mut Terminal<Self::Backend>;

    /// Give the terminal back to the user.
    fn release(&mut self) -> io::Result<()>;
}

/// Full-screen display on the process's stdout.
pub struct CrosstermSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl CrosstermSurface {
    /// Switch to raw mode and the alternate screen with the cursor hidden.
    pub fn acquire() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        match Self::enter() {
            Ok(surface) => Ok(surface),
            Err(e) => {
                let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
                let _ = terminal::disable_raw_mode();
                Err(e)
            }
        }
    }

    fn enter() -> io::Result<Self> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Surface for CrosstermSurface {
    type Backend = CrosstermBackend<Stdout>;

    fn terminal(&mut self) -> &mut Terminal<Self::Backend> {
        &mut self.terminal
    }

    fn release(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        self.terminal.show_cursor()
    }
}

/// In-memory surface of a fixed size, for tests and non-interactive runs.
pub struct HeadlessSurface {
    terminal: Terminal<TestBackend>,
    released: bool,
}

impl HeadlessSurface {
    pub fn new(width: u16, height: u16) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new(TestBackend::new(width, height))?,
            released: false,
        })
    }

    /// Text of every screen row as last drawn, trailing blanks trimmed.
    pub fn lines(&self) -> Vec<String> {
        let buffer = self.terminal.backend().buffer();
        let area = buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                let row: String = (area.left()..area.right())
                    .filter_map(|x| buffer.cell((x, y)))
                    .map(|cell| cell.symbol())
                    .collect();
                row.trim_end().to_string()
            })
            .collect()
    }

    pub fn style_at(&self, x: u16, y: u16) -> Option<Style> {
        self.terminal
            .backend()
            .buffer()
            .cell((x, y))
            .map(|cell| cell.style())
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Surface for HeadlessSurface {
    type Backend = TestBackend;

    fn terminal(&mut self) -> &mut Terminal<Self::Backend> {
        &mut self.terminal
    }

    fn release(&mut self) -> io::Result<()> {
        self.released = true;
        Ok(())
    }
}
