//! Interactive Dispatch Loop
//!
//! The renderer's main loop: a stdin pump task feeds protocol lines into
//! a bounded queue (blocking when full - messages are never dropped), and
//! a single state-owning loop multiplexes that queue with keyboard events
//! and an adaptive animation tick. Every outbound event a transform
//! produces is written and flushed before the next input is processed.
//!
//! Protocol replies go to stdout, which the agent owns; the screen is
//! painted on `/dev/tty`, so the two never interleave. Logs go to stderr.

use std::fs::File;
use std::io::Write as _;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Clear, Paragraph};
use ratatui::Terminal;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

use limelight_core::{codec, recover_id, RendererEvent, UiMessage};

use crate::animation::{ACTIVE_TICK, IDLE_TICK};
use crate::state::{transform, Input, RenderState};
use crate::theme::Theme;
use crate::views::KeyInput;

/// Bounded queue between the stdin pump and the state owner.
const QUEUE_CAPACITY: usize = 64;

/// Why the loop ended.
#[derive(Clone, Debug, PartialEq)]
enum Exit {
    /// The agent sent `quit`.
    Quit(Option<String>),
    /// Stdin reached end-of-input.
    EndOfInput { interaction_open: bool },
    /// The user asked to leave (Ctrl-C).
    UserInterrupt,
}

/// The interactive renderer application.
pub struct App {
    theme: Theme,
    state: RenderState,
}

impl App {
    /// Create an app rendering with `theme`.
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            state: RenderState::new(),
        }
    }

    /// Run the dispatch loop until a terminal condition, restoring the
    /// terminal before returning.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let tty = File::options().read(true).write(true).open("/dev/tty")?;
        enable_raw_mode()?;
        let mut guard = TerminalGuard::new(tty.try_clone()?);
        execute!(guard.tty, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(tty))?;
        terminal.hide_cursor()?;

        let (msg_tx, mut msg_rx) = mpsc::channel::<String>(QUEUE_CAPACITY);
        tokio::spawn(async move {
            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if msg_tx.send(line).await.is_err() {
                    break;
                }
            }
        });

        let mut stdout = std::io::stdout();
        let mut keys = EventStream::new();
        let mut tick_period = IDLE_TICK;
        let mut ticker = tokio::time::interval(tick_period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let exit = loop {
            let input = tokio::select! {
                line = msg_rx.recv() => match line {
                    Some(line) => match self.decode_line(&line, &mut stdout)? {
                        Some(msg) => Input::Message(msg),
                        None => continue,
                    },
                    None => {
                        break Exit::EndOfInput {
                            interaction_open: self.state.modal.is_some(),
                        };
                    }
                },
                event = keys.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if key.code == KeyCode::Char('c')
                            && key.modifiers.contains(KeyModifiers::CONTROL)
                        {
                            break Exit::UserInterrupt;
                        }
                        match map_key(key.code) {
                            Some(key) => Input::Key(key),
                            None => continue,
                        }
                    }
                    Some(Ok(Event::Resize(..))) => {
                        self.draw(&mut terminal)?;
                        continue;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(_)) | None => {
                        // A closed event stream completes instantly on every poll.
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        continue;
                    }
                },
                _ = ticker.tick() => Input::Tick,
            };

            let (state, events) = transform(std::mem::take(&mut self.state), input);
            self.state = state;
            write_events(&mut stdout, &events)?;

            if let Some(quit) = &self.state.quit {
                break Exit::Quit(quit.message.clone());
            }

            self.draw(&mut terminal)?;

            let desired = if self.state.has_active_animation() {
                ACTIVE_TICK
            } else {
                IDLE_TICK
            };
            if desired != tick_period {
                tick_period = desired;
                ticker = tokio::time::interval(tick_period);
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            }
        };

        drop(terminal);
        drop(guard);

        match exit {
            Exit::Quit(Some(message)) => eprintln!("{message}"),
            Exit::Quit(None) | Exit::UserInterrupt => {}
            Exit::EndOfInput { interaction_open } => {
                if interaction_open {
                    eprintln!("limelight: session ended - lost connection to the agent");
                }
            }
        }
        Ok(())
    }

    /// Decode one protocol line; undecodable lines degrade to an error
    /// event (id-tagged when recoverable) and never stop the loop.
    fn decode_line(
        &mut self,
        line: &str,
        stdout: &mut std::io::Stdout,
    ) -> anyhow::Result<Option<UiMessage>> {
        if line.trim().is_empty() {
            return Ok(None);
        }
        match codec::decode_line::<UiMessage>(line) {
            Ok(msg) => Ok(Some(msg)),
            Err(e) => {
                tracing::warn!(error = %e, "undecodable message");
                let event = RendererEvent::error(recover_id(line), e.to_string());
                write_events(stdout, std::slice::from_ref(&event))?;
                Ok(None)
            }
        }
    }

    fn draw<B: ratatui::backend::Backend>(
        &self,
        terminal: &mut Terminal<B>,
    ) -> anyhow::Result<()> {
        terminal.draw(|frame| paint(frame, &self.state, &self.theme))?;
        Ok(())
    }
}

/// Write outbound events to the agent, one line each, flushed before the
/// loop touches the next input.
fn write_events(stdout: &mut std::io::Stdout, events: &[RendererEvent]) -> anyhow::Result<()> {
    for event in events {
        match codec::encode_line(event) {
            Ok(line) => {
                stdout.write_all(line.as_bytes())?;
                stdout.write_all(b"\n")?;
            }
            Err(e) => tracing::error!(error = %e, "failed to encode outbound event"),
        }
    }
    if !events.is_empty() {
        stdout.flush()?;
    }
    Ok(())
}

/// Map a terminal key to the view vocabulary.
fn map_key(code: KeyCode) -> Option<KeyInput> {
    match code {
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Esc => Some(KeyInput::Esc),
        KeyCode::Tab => Some(KeyInput::Tab),
        KeyCode::BackTab => Some(KeyInput::BackTab),
        KeyCode::Up => Some(KeyInput::Up),
        KeyCode::Down => Some(KeyInput::Down),
        KeyCode::Left => Some(KeyInput::Left),
        KeyCode::Right => Some(KeyInput::Right),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        _ => None,
    }
}

/// Paint the current state: scrollback bottom-anchored across the frame,
/// the open modal centered on top with its reveal animation deciding how
/// many rows are visible.
fn paint(frame: &mut ratatui::Frame<'_>, state: &RenderState, theme: &Theme) {
    let area = frame.area();
    if area.width == 0 || area.height == 0 {
        return;
    }

    let background = Style::default().bg(theme.colors.background);
    frame.render_widget(Paragraph::new("").style(background), area);

    let mut scrollback = Vec::new();
    for (i, block) in state.blocks.iter().enumerate() {
        if i > 0 {
            scrollback.push(Line::from(String::new()));
        }
        scrollback.extend(block.render_lines(theme, area.width));
    }
    let visible = area.height as usize;
    let skip = scrollback.len().saturating_sub(visible);
    let tail: Vec<Line<'static>> = scrollback.into_iter().skip(skip).collect();
    frame.render_widget(Paragraph::new(tail).style(background), area);

    if let Some(modal) = &state.modal {
        let lines = modal.view.render_lines(theme, modal_width(area.width));
        let total = lines.len();
        let revealed = ((modal.reveal.value() * total as f64).ceil() as usize).min(total);
        if revealed == 0 {
            return;
        }
        let width = lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|s| unicode_width::UnicodeWidthStr::width(s.content.as_ref()))
                    .sum::<usize>()
            })
            .max()
            .unwrap_or(0) as u16;
        let height = revealed as u16;
        let rect = Rect {
            x: area.width.saturating_sub(width) / 2,
            y: area.height.saturating_sub(height) / 2,
            width: width.min(area.width),
            height: height.min(area.height),
        };
        let shown: Vec<Line<'static>> = lines.into_iter().take(revealed).collect();
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(shown).style(Style::default().bg(theme.colors.overlay)),
            rect,
        );
    }
}

/// Modal fragments use most of the frame, capped for readability.
fn modal_width(frame_width: u16) -> u16 {
    frame_width.saturating_sub(8).clamp(24, 64)
}

/// Restores the terminal no matter how the loop ends.
struct TerminalGuard {
    tty: File,
}

impl TerminalGuard {
    fn new(tty: File) -> Self {
        Self { tty }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(self.tty, LeaveAlternateScreen, crossterm::cursor::Show);
        let _ = disable_raw_mode();
    }
}
