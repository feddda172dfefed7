use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Context;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame, Terminal,
};

use crate::error::Result;
use crate::player::Player;
use crate::settings::Settings;
use crate::shell::{Effect, Interpreter, PlayRequest, Response};
use crate::ui::components::{Input, NowPlaying, Spinner};
use crate::ui::theme::Theme;

/// Scrollback kept in memory
const MAX_ROWS: usize = 2000;
const SCROLL_STEP: usize = 5;

/// One row of scrollback
enum Row {
    Title(String),
    /// A submitted line with the prompt it was typed at
    Command {
        path: String,
        symbol: String,
        line: String,
    },
    Output(String),
}

/// Work handed to the interpreter
enum Job {
    Line(String),
    NextEpisode,
}

/// Everything drawn on screen
struct View {
    theme: Theme,
    settings: Settings,
    rows: Vec<Row>,
    input: Input,
    /// Navigation path as of the last finished command
    path: String,
    now_playing: Option<PlayRequest>,
    show_player: bool,
    /// Rows scrolled up from the bottom
    scroll: usize,
}

impl View {
    fn push(&mut self, row: Row) {
        self.rows.push(row);
        if self.rows.len() > MAX_ROWS {
            let excess = self.rows.len() - MAX_ROWS;
            self.rows.drain(..excess);
        }
    }

    fn prompt_spans(&self, path: &str, symbol: &str) -> Vec<Span<'static>> {
        vec![
            Span::styled(path.to_string(), self.theme.path()),
            Span::styled(format!("{} ", symbol), self.theme.prompt()),
        ]
    }

    fn row_line(&self, row: &Row) -> Line<'static> {
        match row {
            Row::Title(title) => Line::from(Span::styled(title.clone(), self.theme.title())),
            Row::Command { path, symbol, line } => {
                let mut spans = self.prompt_spans(path, symbol);
                let (verb, args) = line.split_at(line.find(char::is_whitespace).unwrap_or(line.len()));
                spans.push(Span::styled(verb.to_string(), self.theme.command()));
                spans.push(Span::styled(args.to_string(), self.theme.args()));
                Line::from(spans)
            }
            Row::Output(text) if text.starts_with("Error:") => {
                Line::from(Span::styled(text.clone(), self.theme.error()))
            }
            Row::Output(text) => Line::from(Span::styled(text.clone(), self.theme.normal())),
        }
    }

    fn render(&self, frame: &mut Frame, spinner: Option<&Spinner>) {
        let area = frame.area();
        frame.render_widget(Block::default().style(self.theme.base()), area);

        let panel = if self.show_player {
            self.now_playing.as_ref()
        } else {
            None
        };

        let constraints = match panel {
            Some(_) => vec![Constraint::Min(1), Constraint::Length(NowPlaying::HEIGHT)],
            None => vec![Constraint::Min(1)],
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let mut lines: Vec<Line> = self.rows.iter().map(|row| self.row_line(row)).collect();
        lines.push(match spinner {
            Some(spinner) => spinner.line(&self.theme),
            None => self.input.line(
                self.prompt_spans(&self.path, self.settings.prompt_symbol()),
                &self.theme,
            ),
        });

        // Keep the prompt on screen unless scrolled back
        let console = chunks[0];
        let max_offset = lines.len().saturating_sub(console.height as usize);
        let offset = max_offset - self.scroll.min(max_offset);

        frame.render_widget(
            Paragraph::new(lines)
                .style(self.theme.base())
                .scroll((offset as u16, 0)),
            console,
        );

        if let Some(request) = panel {
            NowPlaying::render(frame, chunks[1], request, &self.theme);
        }
    }
}

/// Full-screen console
pub struct App {
    interpreter: Interpreter,
    player: Player,
    view: View,
    should_quit: bool,
}

impl App {
    pub fn new(interpreter: Interpreter, player: Player) -> Self {
        let settings = interpreter.settings();
        let mut view = View {
            theme: Theme::from_settings(&settings),
            settings,
            rows: Vec::new(),
            input: Input::new(),
            path: interpreter.path(),
            now_playing: None,
            show_player: true,
            scroll: 0,
        };

        view.push(Row::Title(view.settings.title().to_string()));
        view.push(Row::Output("Type 'help' for available commands.".to_string()));
        if !player.is_available() {
            view.push(Row::Output(format!(
                "Warning: '{}' was not found in PATH. Set another opener with 'ratflix config --set player_command=<cmd>'.",
                player.command()
            )));
        }
        view.push(Row::Output(String::new()));

        Self {
            interpreter,
            player,
            view,
            should_quit: false,
        }
    }

    /// Run the console until `exit` or Ctrl-C
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|f| self.view.render(f, None))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    // Only handle key press events, not release
                    if key.kind == KeyEventKind::Press {
                        if let Some(job) = self.handle_key(key) {
                            self.run_job(job, terminal).await?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Job> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') if ctrl => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('n') if ctrl => Some(Job::NextEpisode),
            KeyCode::Char('l') if ctrl => Some(Job::Line("clear".to_string())),
            KeyCode::PageUp => {
                self.view.scroll = (self.view.scroll + SCROLL_STEP).min(self.view.rows.len());
                None
            }
            KeyCode::PageDown => {
                self.view.scroll = self.view.scroll.saturating_sub(SCROLL_STEP);
                None
            }
            _ => {
                let line = self.view.input.handle_key(key)?;
                self.view.scroll = 0;
                self.view.push(Row::Command {
                    path: self.view.path.clone(),
                    symbol: self.view.settings.prompt_symbol().to_string(),
                    line: line.clone(),
                });

                if line.trim().eq_ignore_ascii_case("exit") {
                    self.should_quit = true;
                    return None;
                }
                (!line.trim().is_empty()).then_some(Job::Line(line))
            }
        }
    }

    /// Run one command, animating the spinner until it finishes
    async fn run_job(
        &mut self,
        job: Job,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> Result<()> {
        let label = match &job {
            Job::Line(line) => line.trim().to_string(),
            Job::NextEpisode => "next episode".to_string(),
        };
        let spinner = Spinner::new(label);

        let response = {
            let view = &self.view;
            let interpreter = &mut self.interpreter;
            let command = async move {
                match job {
                    Job::Line(line) => interpreter.interpret(&line).await,
                    Job::NextEpisode => interpreter.next().await,
                }
            };
            tokio::pin!(command);

            let mut ticker = tokio::time::interval(Duration::from_millis(80));
            loop {
                tokio::select! {
                    response = &mut command => break response,
                    _ = ticker.tick() => {
                        terminal.draw(|f| view.render(f, Some(&spinner)))?;
                    }
                }
            }
        };

        // Keys pressed while busy are dropped
        while event::poll(Duration::ZERO)? {
            event::read()?;
        }

        self.apply(response);
        Ok(())
    }

    fn apply(&mut self, response: Response) {
        let Response { lines, effect } = response;

        if effect == Some(Effect::Clear) {
            self.view.rows.clear();
            self.view.scroll = 0;
            for line in lines {
                self.view.push(Row::Title(line));
            }
        } else {
            for line in lines {
                self.view.push(Row::Output(line));
            }
        }

        match effect {
            Some(Effect::Play(request)) => {
                if let Err(e) = self.player.open(&request) {
                    tracing::warn!("Failed to open {}: {}", request.url, e);
                    self.view.push(Row::Output(format!("Error: {}", e)));
                }
                self.view.now_playing = Some(request);
                self.view.show_player = true;
            }
            Some(Effect::TogglePlayer) => self.view.show_player = !self.view.show_player,
            Some(Effect::ApplySettings(settings)) => {
                self.view.theme = Theme::from_settings(&settings);
                self.view.settings = settings;
            }
            Some(Effect::Clear) | None => {}
        }

        self.view.path = self.interpreter.path();
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TmdbClient;
    use crate::config::{PlayerConfig, ShellConfig};
    use crate::store::Store;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        let tmdb = TmdbClient::with_base_url("test_key", "http://127.0.0.1:9", Duration::from_secs(1));
        let interpreter = Interpreter::new(
            tmdb,
            Store::open_in_memory().unwrap(),
            &ShellConfig::default(),
        );
        let player = Player::new(PlayerConfig {
            command: "ratflix-no-such-opener".to_string(),
            args: Vec::new(),
        });
        App::new(interpreter, player)
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|f| app.view.render(f, None)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn request() -> PlayRequest {
        PlayRequest {
            url: "https://vidsrc.xyz/embed/movie?tmdb=603".to_string(),
            title: "The Matrix".to_string(),
            provider: "VidSrc",
        }
    }

    #[test]
    fn test_initial_screen_shows_title_and_prompt() {
        let app = app();
        let content = screen(&app);
        assert!(content.contains("ratflix"));
        assert!(content.contains("/> "));
        assert!(content.contains("Warning: 'ratflix-no-such-opener'"));
    }

    #[test]
    fn test_enter_submits_and_echoes() {
        let mut app = app();
        for c in "pwd".chars() {
            assert!(app.handle_key(key(KeyCode::Char(c))).is_none());
        }

        match app.handle_key(key(KeyCode::Enter)) {
            Some(Job::Line(line)) => assert_eq!(line, "pwd"),
            _ => panic!("expected a line job"),
        }
        assert!(matches!(app.view.rows.last(), Some(Row::Command { line, .. }) if line == "pwd"));
    }

    #[test]
    fn test_exit_and_ctrl_keys() {
        let mut app = app();
        assert!(matches!(
            app.handle_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL)),
            Some(Job::NextEpisode)
        ));

        for c in "exit".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert!(app.should_quit);
    }

    #[test]
    fn test_play_effect_shows_panel() {
        let mut app = app();
        app.apply(Response {
            lines: vec!["Playing: The Matrix".to_string(), String::new()],
            effect: Some(Effect::Play(request())),
        });

        assert_eq!(app.view.now_playing, Some(request()));
        // The opener is missing, so the failure is reported inline
        assert!(matches!(app.view.rows.last(), Some(Row::Output(line)) if line.starts_with("Error: ")));
        assert!(screen(&app).contains("Now playing"));

        app.apply(Response {
            lines: vec!["Video player visibility toggled".to_string(), String::new()],
            effect: Some(Effect::TogglePlayer),
        });
        assert!(!app.view.show_player);
        assert!(!screen(&app).contains("Now playing"));
    }

    #[test]
    fn test_clear_effect_resets_scrollback() {
        let mut app = app();
        app.apply(Response {
            lines: vec!["ratflix".to_string()],
            effect: Some(Effect::Clear),
        });

        assert_eq!(app.view.rows.len(), 1);
        assert!(matches!(&app.view.rows[0], Row::Title(title) if title == "ratflix"));
    }

    #[test]
    fn test_apply_settings_changes_prompt() {
        let mut app = app();
        let store = Store::open_in_memory().unwrap();
        let settings = crate::settings::SettingsStore::new(&store)
            .set(crate::settings::PROMPT_SYMBOL, "$")
            .unwrap();

        app.apply(Response {
            lines: vec![],
            effect: Some(Effect::ApplySettings(settings)),
        });
        assert!(screen(&app).contains("$ "));
    }
}
