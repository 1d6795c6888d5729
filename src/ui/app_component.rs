use crate::constants::UI_LOG_LINES;
use crate::logger::Logger;
use crate::ui::components::{PanelWidget, StatusBar};
use crate::ui::core::{Action, Component};
use crate::ui::shell::Shell;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};

/// Columns moved per resize key press
const RESIZE_STEP: i16 = 2;

/// Top-level component: routes terminal input into the shell and draws it.
pub struct AppComponent {
    shell: Shell,
    logger: Logger,
    should_quit: bool,
}

impl AppComponent {
    pub fn new(shell: Shell, logger: Logger) -> Self {
        Self {
            shell,
            logger,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Advance host frames and tasks
    pub async fn tick(&self) {
        let frames = self.shell.tick().await;
        if frames > 0 {
            log::trace!("ran {} frame callbacks", frames);
        }
    }
}

impl Component for AppComponent {
    fn handle_key_events(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('p') => Action::TogglePanel,
            KeyCode::Char('r') => Action::ToggleResizable,
            KeyCode::Char('<') => Action::ResizePanel(-RESIZE_STEP),
            KeyCode::Char('>') => Action::ResizePanel(RESIZE_STEP),
            KeyCode::Char('b') => Action::BackdropClick,
            KeyCode::Char('d') => Action::FlipDarkPreference,
            KeyCode::Char('o') => Action::FlipOnline,
            _ => Action::None,
        }
    }

    fn handle_mouse_events(&mut self, mouse: MouseEvent) -> Action {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => Action::PointerDown(mouse.column),
            MouseEventKind::Drag(MouseButton::Left) => Action::PointerMove(mouse.column),
            MouseEventKind::Up(MouseButton::Left) => Action::PointerUp(mouse.column),
            _ => Action::None,
        }
    }

    fn update(&mut self, action: Action) -> Action {
        if !self.shell.apply(action) {
            self.should_quit = true;
        }
        Action::None
    }

    fn render(&mut self, f: &mut Frame, rect: Rect) {
        let status = self.shell.status();
        let status_height = 3 + UI_LOG_LINES as u16;
        let chunks = Layout::vertical([Constraint::Min(0), Constraint::Length(status_height)]).split(rect);

        PanelWidget::render(f, chunks[0], &status);

        let logs: Vec<String> = self.logger.get_logs().into_iter().take(UI_LOG_LINES).collect();
        StatusBar::render(f, chunks[1], &status, &logs);
    }
}
