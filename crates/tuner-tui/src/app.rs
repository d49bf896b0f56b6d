//! App: component-based event loop.
//!
//! - `App` owns the panes, the overlays and `AppState`.
//! - Terminal input arrives from a blocking reader task over an mpsc channel.
//! - The `SyncController` is polled in the same `select!`, so reconciled
//!   state and key presses are handled on one task.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Commands leave through the fire-and-forget `CommandSender`.

use std::io;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tuner_proto::command::Command;
use tuner_proto::dispatch::CommandSender;
use tuner_proto::sync::{Render, Step, SyncController};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{
        picker::{centered, Picker},
        radio_form::RadioForm,
        radio_list::RadioList,
        receiver_list::ReceiverList,
        server_list::ServerList,
    },
    focus::FocusRing,
    theme::{C_ACCENT, C_PRIMARY},
    widgets::{
        pane_chrome::pane_chrome,
        status_bar::{draw_keys_bar, draw_status_bar},
    },
};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

pub struct App {
    state: AppState,
    controller: SyncController,
    commands: CommandSender,
    focus: FocusRing,
    receivers: ReceiverList,
    servers: ServerList,
    radios: RadioList,
    picker: Option<Picker>,
    form: Option<RadioForm>,
    confirm: Option<(String, Command)>,
    should_quit: bool,
}

impl App {
    pub fn new(controller: SyncController, commands: CommandSender, volume_step: i32) -> Self {
        Self {
            state: AppState::new(volume_step),
            controller,
            commands,
            focus: FocusRing::default(),
            receivers: ReceiverList::new(),
            servers: ServerList::new(),
            radios: RadioList::new(),
            picker: None,
            form: None,
            confirm: None,
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        self.controller.start();
        self.state.render(self.controller.state());

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        debug!("run(): terminal ready, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut Term) -> anyhow::Result<()> {
        // ── Background task: keyboard events ──────────────────────────────────
        let (tx, mut rx) = mpsc::channel::<Event>(256);
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(ev).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        loop {
            terminal.draw(|f| self.draw(f))?;
            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(ev) = rx.recv() => {
                    if let Event::Key(key) = ev {
                        if key.kind == KeyEventKind::Press {
                            for action in self.handle_key(key) {
                                self.dispatch(action);
                            }
                        }
                    }
                }

                step = self.controller.next() => match step {
                    Step::Render => self.state.render(self.controller.state()),
                    Step::Shutdown => self.should_quit = true,
                    Step::Pull => {}
                },
            }
        }
        Ok(())
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return vec![Action::Quit];
        }

        // Overlays capture all keys while open.
        if let Some((_, command)) = &self.confirm {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    vec![Action::Send(command.clone()), Action::CancelConfirm]
                }
                _ => vec![Action::CancelConfirm],
            };
        }
        if let Some(form) = &mut self.form {
            return form.handle_key(key);
        }
        if let Some(picker) = &mut self.picker {
            return picker.handle_key(key, &self.state);
        }

        match key.code {
            KeyCode::Char('q') => return vec![Action::Quit],
            KeyCode::Tab => return vec![Action::FocusNext],
            KeyCode::BackTab => return vec![Action::FocusPrev],
            KeyCode::Char('1') => return vec![Action::FocusPane(ComponentId::Receivers)],
            KeyCode::Char('2') => return vec![Action::FocusPane(ComponentId::Servers)],
            KeyCode::Char('3') => return vec![Action::FocusPane(ComponentId::Radios)],
            KeyCode::F(5) | KeyCode::Char('R') => return vec![Action::Refresh],
            _ => {}
        }

        match self.focus.focused() {
            ComponentId::Receivers => self.receivers.handle_key(key, &self.state),
            ComponentId::Servers => self.servers.handle_key(key, &self.state),
            ComponentId::Radios => self.radios.handle_key(key, &self.state),
        }
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::FocusNext => self.focus.advance(),
            Action::FocusPrev => self.focus.retreat(),
            Action::FocusPane(id) => self.focus.focus(id),
            Action::OpenPicker(target) => self.picker = Some(Picker::new(target, &self.state)),
            Action::ClosePicker => self.picker = None,
            Action::OpenRadioForm(id, radio) => self.form = Some(RadioForm::new(id, &radio)),
            Action::CloseRadioForm => self.form = None,
            Action::Confirm(prompt, command) => self.confirm = Some((prompt, command)),
            Action::CancelConfirm => self.confirm = None,
            Action::Send(command) => {
                info!("→ {}", command);
                self.commands.send(command);
            }
            Action::Refresh => {
                info!("manual pull");
                self.controller.request_pull();
            }
            Action::Quit => self.should_quit = true,
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let [body, status_row, keys_row] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let [left, right] =
            Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
                .areas(body);
        let [top_right, bottom_right] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(right);

        let focus = &self.focus;
        let state = &self.state;
        self.receivers.draw(frame, left, focus.is_focused(self.receivers.id()), state);
        self.servers.draw(frame, top_right, focus.is_focused(self.servers.id()), state);
        self.radios.draw(frame, bottom_right, focus.is_focused(self.radios.id()), state);

        draw_status_bar(frame, status_row, &self.state);
        let hints = match self.focus.focused() {
            ComponentId::Receivers => self.receivers.key_hints(),
            ComponentId::Servers => self.servers.key_hints(),
            ComponentId::Radios => self.radios.key_hints(),
        };
        draw_keys_bar(frame, keys_row, hints);

        let picker_alive = match &mut self.picker {
            Some(picker) => picker.draw(frame, body, &self.state),
            None => true,
        };
        if !picker_alive {
            debug!("picker target vanished, closing");
            self.picker = None;
        }
        if let Some(form) = &self.form {
            form.draw(frame, body);
        }
        if let Some((prompt, _)) = &self.confirm {
            draw_confirm(frame, body, prompt);
        }
    }
}

fn draw_confirm(frame: &mut Frame, area: Rect, prompt: &str) {
    let popup = centered(area, 48, 3);
    let block = pane_chrome("Confirm", None, true, None);
    let line = Line::from(vec![
        Span::styled(prompt, Style::default().fg(C_PRIMARY)),
        Span::styled(
            "  y/n",
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(line).block(block), popup);
}
