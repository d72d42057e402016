//! Bottom bar: trigger control, latest notice, fetch health.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::dashboard::{Health, Notice, NoticeLevel, TriggerControl};

pub struct StatusBar<'a> {
    control: &'a TriggerControl,
    notice: Option<&'a Notice>,
    health: &'a Health,
}

impl<'a> StatusBar<'a> {
    pub fn new(control: &'a TriggerControl, notice: Option<&'a Notice>, health: &'a Health) -> Self {
        Self {
            control,
            notice,
            health,
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let button_style = if self.control.is_enabled() {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray).bg(Color::DarkGray)
        };

        let health = if self.health.consecutive_failures == 0 {
            Span::styled(
                format!("refreshes: {}", self.health.refreshes),
                Style::default().fg(Color::Green),
            )
        } else {
            Span::styled(
                format!("backend unreachable ({} failed)", self.health.consecutive_failures),
                Style::default().fg(Color::Red),
            )
        };

        let mut lines = vec![Line::from(vec![
            Span::styled(format!(" [t] {} ", self.control.label()), button_style),
            Span::raw("  [r] refresh  [q] quit  "),
            health,
        ])];

        if let Some(notice) = self.notice {
            let color = match notice.level {
                NoticeLevel::Info => Color::Cyan,
                NoticeLevel::Error => Color::Red,
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} ", notice.at.format("%H:%M:%S")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(notice.text.clone(), Style::default().fg(color)),
            ]));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::TOP))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::TRIGGER_BUSY_LABEL;
    use crate::widgets::buffer_lines;
    use chrono::Local;

    #[test]
    fn test_busy_control_and_notice() {
        let mut control = TriggerControl::default();
        control.try_begin();
        let notice = Notice {
            level: NoticeLevel::Info,
            text: "Manual trade cycle complete! Executed 2 trades.".to_string(),
            at: Local::now(),
        };
        let health = Health::default();

        let area = Rect::new(0, 0, 100, 3);
        let mut buf = Buffer::empty(area);
        StatusBar::new(&control, Some(&notice), &health).render(area, &mut buf);
        let rows = buffer_lines(&buf);
        assert!(rows[1].contains(TRIGGER_BUSY_LABEL));
        assert!(rows[2].contains("Executed 2 trades."));
    }

    #[test]
    fn test_failures_are_shown() {
        let health = Health {
            refreshes: 4,
            consecutive_failures: 2,
            last_error: Some("refused".to_string()),
        };
        let area = Rect::new(0, 0, 100, 3);
        let mut buf = Buffer::empty(area);
        StatusBar::new(&TriggerControl::default(), None, &health).render(area, &mut buf);
        assert!(buffer_lines(&buf)[1].contains("backend unreachable (2 failed)"));
    }
}
