//! Panel and main view drawing.
//!
//! Splits the content area around the panel the way its classes describe it:
//! a side column when opened or in a breakpoint, a thin strip when collapsed,
//! and a dimmed main view while the backdrop is shown.

use crate::components::panel::{BreakpointMode, PanelState, Side};
use crate::constants::{UI_PANEL_TITLE, UI_TITLE};
use crate::ui::shell::{PanelStatus, ShellStatus};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{block::BorderType, Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub struct PanelWidget;

impl PanelWidget {
    /// Main view and panel areas for `status` inside `area`.
    ///
    /// In the normal mode the panel overlays the main view; in the breakpoint
    /// modes it takes its columns from it.
    pub fn split(area: Rect, status: &ShellStatus) -> (Rect, Option<Rect>) {
        let Some(panel) = &status.panel else {
            return (area, None);
        };
        let Some(width) = panel.visible_width() else {
            return (area, None);
        };
        let width = width.min(area.width);
        let constraints = match panel.side {
            Side::Left => [Constraint::Length(width), Constraint::Min(0)],
            Side::Right => [Constraint::Min(0), Constraint::Length(width)],
        };
        let chunks = Layout::horizontal(constraints).split(area);
        let (panel_area, rest) = match panel.side {
            Side::Left => (chunks[0], chunks[1]),
            Side::Right => (chunks[1], chunks[0]),
        };
        match panel.mode {
            BreakpointMode::Normal => (area, Some(panel_area)),
            BreakpointMode::Visible | BreakpointMode::Collapsed => (rest, Some(panel_area)),
        }
    }

    pub fn render(f: &mut Frame, area: Rect, status: &ShellStatus) {
        let (main_area, panel_area) = Self::split(area, status);
        Self::render_main(f, main_area, status);
        if let (Some(panel_area), Some(panel)) = (panel_area, &status.panel) {
            Self::render_panel(f, panel_area, panel);
        }
    }

    fn render_main(f: &mut Frame, area: Rect, status: &ShellStatus) {
        let mut lines = vec![
            Line::from(format!("{} {} ({})", status.name, status.version, status.id)),
            Line::from(format!("language {} • {}", status.language, if status.rtl { "rtl" } else { "ltr" })),
            Line::from(format!("modules: {}", status.modules.join(", "))),
            Line::from(format!("document: {}", status.document_classes.join(" "))),
        ];
        if !status.initialized {
            lines.push(Line::from("waiting for initialization..."));
        }

        let style = if status.backdrop_visible {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(UI_TITLE);
        f.render_widget(Paragraph::new(lines).style(style).block(block).wrap(Wrap { trim: true }), area);
    }

    fn render_panel(f: &mut Frame, area: Rect, panel: &PanelStatus) {
        f.render_widget(Clear, area);

        let border_color = match panel.state {
            PanelState::Opening | PanelState::Closing => Color::Yellow,
            _ if panel.swiping => Color::Magenta,
            _ => Color::Blue,
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if panel.resizable { BorderType::Double } else { BorderType::Plain })
            .border_style(Style::default().fg(border_color))
            .title(UI_PANEL_TITLE);

        let content = if panel.mode == BreakpointMode::Collapsed {
            Vec::new()
        } else {
            panel.classes.iter().map(|class| Line::from(class.as_str())).collect()
        };
        f.render_widget(Paragraph::new(content).block(block), area);
    }
}
