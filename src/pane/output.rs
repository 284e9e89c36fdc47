use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Text};
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::effect::Effect;
use crate::log_ring::LogRing;
use crate::message::Message;
use crate::pane::{Pane, pane_block};
use crate::ui::{Component, Keybinding};

/// Scrollable view of the [`LogRing`].
///
/// Any new output jumps back to the newest line; scrolling only holds until
/// the log changes.
pub struct OutputPane {
    ring: LogRing,
    text: String,
    line_count: usize,
    scroll: usize,
    viewport: usize,
}

impl OutputPane {
    pub fn new(ring: LogRing) -> Self {
        Self {
            ring,
            text: String::new(),
            line_count: 0,
            scroll: 0,
            viewport: 0,
        }
    }

    /// Pick up new lines. Returns whether anything changed.
    pub fn sync(&mut self) -> bool {
        let snapshot = self.ring.snapshot();
        if snapshot == self.text {
            return false;
        }
        self.line_count = snapshot.lines().count();
        self.text = snapshot;
        self.scroll = self.max_scroll();
        true
    }

    pub const fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = usize::min(self.scroll + 1, self.max_scroll());
    }

    const fn max_scroll(&self) -> usize {
        self.line_count.saturating_sub(self.viewport)
    }

    fn set_viewport(&mut self, height: usize) {
        if height == self.viewport {
            return;
        }
        let at_bottom = self.scroll >= self.max_scroll();
        self.viewport = height;
        self.scroll = if at_bottom {
            self.max_scroll()
        } else {
            self.scroll.min(self.max_scroll())
        };
    }
}

impl Component for OutputPane {
    type Output = Effect;

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = pane_block(" Output ".to_string(), false, theme);
        self.set_viewport(usize::from(block.inner(area).height));
        self.sync();

        let scroll = u16::try_from(self.scroll).unwrap_or(u16::MAX);
        let lines: Vec<Line> = self
            .text
            .lines()
            .map(|line| Line::styled(line, line_style(line, theme)))
            .collect();
        let paragraph = Paragraph::new(Text::from(lines))
            .block(block)
            .scroll((scroll, 0));
        frame.render_widget(paragraph, area);
    }
}

fn line_style(line: &str, theme: &Theme) -> Style {
    let level = line.trim_start();
    let color = if level.starts_with("ERROR") {
        theme.error()
    } else if level.starts_with("WARN") {
        theme.warning()
    } else {
        theme.muted()
    };
    Style::default().fg(color)
}

impl Pane for OutputPane {
    fn update(&mut self, message: &Message) -> Effect {
        if matches!(message, Message::Tick) {
            self.sync();
        }
        Effect::none()
    }

    fn set_focused(&mut self, _focused: bool) {}

    fn keybindings(&self) -> Vec<Keybinding> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pane_with_lines(lines: usize, viewport: usize) -> (OutputPane, LogRing) {
        let ring = LogRing::new(100);
        for i in 0..lines {
            ring.write(format!("line {i}"));
        }
        let mut pane = OutputPane::new(ring.clone());
        pane.set_viewport(viewport);
        pane.sync();
        (pane, ring)
    }

    #[test]
    fn test_sync_reports_changes_only() {
        let (mut pane, ring) = pane_with_lines(3, 10);
        assert!(!pane.sync());

        ring.write("line 3");
        assert!(pane.sync());
        assert!(!pane.sync());
    }

    #[test]
    fn test_follows_newest_line() {
        let (mut pane, ring) = pane_with_lines(20, 5);
        assert_eq!(pane.scroll, 15);

        ring.write("line 20");
        pane.sync();
        assert_eq!(pane.scroll, 16);
    }

    #[test]
    fn test_new_output_scrolls_back_to_newest_line() {
        let (mut pane, ring) = pane_with_lines(20, 5);
        pane.scroll_up();
        pane.scroll_up();
        assert_eq!(pane.scroll, 13);

        // Nothing new: the scrolled position holds.
        assert!(!pane.sync());
        assert_eq!(pane.scroll, 13);

        ring.write("line 20");
        assert!(pane.sync());
        assert_eq!(pane.scroll, 16);
    }

    #[test]
    fn test_scroll_stays_in_bounds() {
        let (mut pane, _ring) = pane_with_lines(3, 5);
        pane.scroll_up();
        pane.scroll_down();
        assert_eq!(pane.scroll, 0);
    }
}
