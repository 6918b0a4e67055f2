//! App: terminal init, main loop, tick and key handling.

use crate::Args;
use crate::game::Game;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

pub struct App {
    frame_interval: Duration,
    theme: Theme,
    state: Game,
    /// Redraw hint from the last tick; drawing is skipped while nothing
    /// changed.
    dirty: bool,
}

impl App {
    pub fn new(args: &Args, theme: Theme) -> Self {
        let rate = if args.frame_rate > 0.0 {
            args.frame_rate
        } else {
            60.0
        };
        Self {
            frame_interval: Duration::from_secs_f64(1.0 / rate),
            theme,
            state: Game::new(Instant::now()),
            dirty: true,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            if self.dirty {
                terminal.draw(|f| crate::ui::draw(f, &self.state, &self.theme))?;
                self.dirty = false;
            }

            // Collect every key edge that arrives within this frame's budget.
            let frame_start = Instant::now();
            while event::poll(self.frame_interval.saturating_sub(frame_start.elapsed()))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        match key_to_action(key) {
                            Action::Quit => return Ok(()),
                            action => self.state.apply_action(action),
                        }
                    }
                    Event::Resize(_, _) => self.dirty = true,
                    _ => {}
                }
            }

            if self.state.tick(Instant::now()) {
                self.dirty = true;
            }
        }
    }
}
