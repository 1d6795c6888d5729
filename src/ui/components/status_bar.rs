//! Status bar component

use crate::constants::UI_HELP;
use crate::ui::shell::ShellStatus;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Status bar component
pub struct StatusBar;

impl StatusBar {
    /// Summary line: theme, dark flag, connectivity and panel state
    pub fn summary(status: &ShellStatus) -> String {
        let panel = match &status.panel {
            Some(panel) => format!(
                "panel {:?}/{:?} {}w{}",
                panel.state,
                panel.mode,
                panel.width,
                if panel.resizable { " resizable" } else { "" }
            ),
            None => match &status.panel_error {
                Some(error) => format!("panel unavailable: {}", error),
                None => "panel pending".to_string(),
            },
        };
        format!(
            "theme {} • {} • {} • {} cols • {}",
            status.theme,
            if status.dark { "dark" } else { "light" },
            if status.online { "online" } else { "offline" },
            status.viewport,
            panel
        )
    }

    /// Render the status bar with the most recent log lines
    pub fn render(f: &mut Frame, area: Rect, status: &ShellStatus, logs: &[String]) {
        let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)]).split(area);

        let status_color = if !status.online {
            Color::Red
        } else if status.dark {
            Color::Cyan
        } else {
            Color::Gray
        };

        f.render_widget(
            Paragraph::new(Self::summary(status)).style(Style::default().fg(status_color)),
            chunks[0],
        );
        f.render_widget(
            Paragraph::new(UI_HELP).style(Style::default().fg(Color::DarkGray)),
            chunks[1],
        );

        let lines: Vec<Line> = logs
            .iter()
            .map(|log| Line::from(Span::styled(log.as_str(), Style::default().fg(Color::DarkGray))))
            .collect();
        f.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::TOP).title("Logs")),
            chunks[2],
        );
    }
}
