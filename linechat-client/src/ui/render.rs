//! Chat screen painting and the periodic render task
//!
//! Layout for a `w x h` area:
//!
//! ```text
//! row 0        ╔══════╗
//! rows 1..h-6  ║ log  ║   newest entry on row h-6
//! row h-5      ╚══════╝
//! rows h-4..   compose rows, w-1 bytes each
//! ```

use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use linechat_utils::{LinechatError, Result};

use crate::chat::{InputBuffer, Message, MessageLog, SharedInput, SharedLog};

use super::borders::{frame_style, input_style, message_style, padding_style, FRAME_SET};
use super::terminal::Terminal;

/// Number of rows below the frame used for the compose line
pub const INPUT_ROWS: u16 = 4;

/// Smallest area the frame fits in
pub const MIN_HEIGHT: u16 = INPUT_ROWS + 2;
pub const MIN_WIDTH: u16 = 3;

/// Full-screen chat view: bordered log plus compose rows
pub struct ChatView<'a> {
    log: &'a MessageLog,
    input: &'a InputBuffer,
}

impl<'a> ChatView<'a> {
    pub fn new(log: &'a MessageLog, input: &'a InputBuffer) -> Self {
        Self { log, input }
    }
}

impl Widget for ChatView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < MIN_HEIGHT || area.width < MIN_WIDTH {
            return;
        }

        let mut canvas = Canvas { area, buf };
        let (w, h) = (area.width, area.height);
        let bottom = h - INPUT_ROWS - 1;

        canvas.border_row(0, FRAME_SET.top_left, FRAME_SET.horizontal_top, FRAME_SET.top_right);

        for (i, y) in (1..bottom).rev().enumerate() {
            if let Some(message) = self.log.get(i) {
                canvas.log_line(y, message);
            }
        }

        let style = frame_style();
        for y in 1..bottom {
            canvas.put(0, y, FRAME_SET.vertical_left, style);
            canvas.put(w - 1, y, FRAME_SET.vertical_right, style);
        }

        canvas.border_row(
            bottom,
            FRAME_SET.bottom_left,
            FRAME_SET.horizontal_bottom,
            FRAME_SET.bottom_right,
        );

        let width = usize::from(w - 1);
        let style = input_style();
        for (row, line) in self.input.display_rows(width, usize::from(INPUT_ROWS)).iter().enumerate() {
            let y = bottom + 1 + row as u16;
            let line: String = line.chars().map(|c| if c.is_control() { ' ' } else { c }).collect();
            canvas.put_str(0, y, &line, w - 1, style);
        }
    }
}

/// Buffer writer with coordinates relative to the widget area
struct Canvas<'b> {
    area: Rect,
    buf: &'b mut Buffer,
}

impl Canvas<'_> {
    fn put(&mut self, x: u16, y: u16, symbol: &str, style: Style) {
        if let Some(cell) = self.buf.cell_mut((self.area.x + x, self.area.y + y)) {
            cell.set_symbol(symbol).set_style(style);
        }
    }

    fn put_char(&mut self, x: u16, y: u16, ch: char, style: Style) {
        if let Some(cell) = self.buf.cell_mut((self.area.x + x, self.area.y + y)) {
            cell.set_char(ch).set_style(style);
        }
    }

    /// Paint `text` from `x`, at most `max_width` columns; returns the column after it
    ///
    /// Wide characters take two columns and are dropped whole if they would
    /// cross the limit.
    fn put_str(&mut self, x: u16, y: u16, text: &str, max_width: u16, style: Style) -> u16 {
        let (end, _) = self.buf.set_stringn(
            self.area.x + x,
            self.area.y + y,
            text,
            usize::from(max_width),
            style,
        );
        end - self.area.x
    }

    fn border_row(&mut self, y: u16, left: &str, fill: &str, right: &str) {
        let style = frame_style();
        let right_x = self.area.width - 1;

        self.put(0, y, left, style);
        for x in 1..right_x {
            self.put(x, y, fill, style);
        }
        self.put(right_x, y, right, style);
    }

    /// Text from column 1, clipped at the right edge, blank-padded to it
    ///
    /// Control characters are left out so they never reach the terminal.
    fn log_line(&mut self, y: u16, message: &Message) {
        let right = self.area.width - 1;
        let text: String = message.content().chars().filter(|c| !c.is_control()).collect();
        let mut x = self.put_str(1, y, &text, right - 1, message_style(message));

        let padding = padding_style();
        while x < right {
            self.put_char(x, y, ' ', padding);
            x += 1;
        }
    }
}

/// State the render task reads each tick
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub log: SharedLog,
    pub input: SharedInput,
}

/// Handle on the background render task
///
/// Dropping the handle stops the task; the terminal is restored when the
/// task releases it.
pub struct Renderer {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<Terminal>,
}

impl Renderer {
    /// Start repainting `state` every `interval`
    ///
    /// A failed draw is reported on `fatal` and ends the loop.
    pub fn spawn(
        terminal: Terminal,
        state: RenderState,
        interval: Duration,
        fatal: mpsc::Sender<LinechatError>,
    ) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(render_loop(terminal, state, interval, stop_rx, fatal));

        Self {
            stop: Some(stop_tx),
            task,
        }
    }

    /// Stop the loop and restore the terminal
    pub async fn stop(mut self) -> Result<()> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }

        let mut terminal = (&mut self.task)
            .await
            .map_err(|e| LinechatError::internal(format!("Render task failed: {}", e)))?;
        terminal.close()
    }
}

async fn render_loop(
    mut terminal: Terminal,
    state: RenderState,
    interval: Duration,
    mut stop: oneshot::Receiver<()>,
    fatal: mpsc::Sender<LinechatError>,
) -> Terminal {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = ticker.tick() => {
                // Copy out so no lock is held during terminal I/O
                let log = state.log.snapshot();
                let input = state.input.with(InputBuffer::clone);

                let drawn = terminal.draw(|frame| {
                    frame.render_widget(ChatView::new(&log, &input), frame.area());
                });
                if let Err(e) = drawn {
                    tracing::error!("Failed to draw: {}", e);
                    // Only the first fatal error is kept
                    let _ = fatal.try_send(e);
                    break;
                }
            }
        }
    }

    tracing::debug!("Render loop stopped");
    terminal
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn render(log: &MessageLog, input: &InputBuffer, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        ChatView::new(log, input).render(area, &mut buf);
        buf
    }

    fn symbol(buf: &Buffer, x: u16, y: u16) -> &str {
        buf.cell((x, y)).map(|c| c.symbol()).unwrap_or("")
    }

    fn fg(buf: &Buffer, x: u16, y: u16) -> Option<Color> {
        buf.cell((x, y)).map(|c| c.fg)
    }

    fn row_text(buf: &Buffer, y: u16, from: u16, to: u16) -> String {
        (from..to).map(|x| symbol(buf, x, y)).collect()
    }

    #[test]
    fn test_frame_corners() {
        let buf = render(&MessageLog::new(), &InputBuffer::new(), 80, 24);

        assert_eq!(symbol(&buf, 0, 0), "╔");
        assert_eq!(symbol(&buf, 40, 0), "═");
        assert_eq!(symbol(&buf, 79, 0), "╗");
        assert_eq!(symbol(&buf, 0, 19), "╚");
        assert_eq!(symbol(&buf, 79, 19), "╝");
        assert_eq!(fg(&buf, 0, 0), Some(Color::Blue));
    }

    #[test]
    fn test_edges_on_log_rows() {
        let buf = render(&MessageLog::new(), &InputBuffer::new(), 80, 24);

        for y in 1..19 {
            assert_eq!(symbol(&buf, 0, y), "║");
            assert_eq!(symbol(&buf, 79, y), "║");
        }
    }

    #[test]
    fn test_newest_entry_above_bottom_border() {
        let mut log = MessageLog::new();
        log.append("older");
        log.append("alice: hello");

        let buf = render(&log, &InputBuffer::new(), 80, 24);

        assert_eq!(row_text(&buf, 18, 1, 13), "alice: hello");
        assert_eq!(row_text(&buf, 17, 1, 6), "older");
        assert_eq!(fg(&buf, 1, 18), Some(Color::Cyan));
        assert_eq!(fg(&buf, 1, 17), Some(Color::White));
    }

    #[test]
    fn test_greeting_is_green() {
        let mut log = MessageLog::new();
        log.append("server: > Welcome!");

        let buf = render(&log, &InputBuffer::new(), 80, 24);
        assert_eq!(fg(&buf, 1, 18), Some(Color::Green));
    }

    #[test]
    fn test_log_line_padded_to_edge() {
        let mut log = MessageLog::new();
        log.append("hi");

        let buf = render(&log, &InputBuffer::new(), 20, 10);

        assert_eq!(row_text(&buf, 4, 1, 19), format!("hi{}", " ".repeat(16)));
        assert_eq!(symbol(&buf, 19, 4), "║");
    }

    #[test]
    fn test_long_line_clipped_at_edge() {
        let mut log = MessageLog::new();
        log.append(&"x".repeat(50));

        let buf = render(&log, &InputBuffer::new(), 20, 10);

        assert_eq!(row_text(&buf, 4, 1, 19), "x".repeat(18));
        assert_eq!(symbol(&buf, 19, 4), "║");
    }

    #[test]
    fn test_trailing_newline_not_painted() {
        let mut log = MessageLog::new();
        log.append("server: hello\n");

        let buf = render(&log, &InputBuffer::new(), 80, 24);

        assert_eq!(row_text(&buf, 18, 1, 15), "server: hello ");
        assert_eq!(symbol(&buf, 14, 18), " ");
        assert_eq!(symbol(&buf, 79, 18), "║");
        // Stored text is untouched
        assert_eq!(log.newest().content(), "server: hello\n");
    }

    #[test]
    fn test_embedded_control_chars_skipped() {
        let mut log = MessageLog::new();
        log.append("a\rb\x1b[2Jc\td");

        let buf = render(&log, &InputBuffer::new(), 20, 10);

        assert_eq!(row_text(&buf, 4, 1, 19), format!("ab[2Jcd{}", " ".repeat(11)));
        assert_eq!(symbol(&buf, 19, 4), "║");
    }

    #[test]
    fn test_wide_chars_take_two_columns() {
        let mut log = MessageLog::new();
        log.append("日本x");

        let buf = render(&log, &InputBuffer::new(), 20, 10);

        assert_eq!(symbol(&buf, 1, 4), "日");
        assert_eq!(symbol(&buf, 3, 4), "本");
        assert_eq!(symbol(&buf, 5, 4), "x");
        assert_eq!(symbol(&buf, 6, 4), " ");
        assert_eq!(symbol(&buf, 19, 4), "║");
    }

    #[test]
    fn test_wide_char_at_edge_is_dropped() {
        let mut log = MessageLog::new();
        // Five columns of text inside a 6-wide frame leave one free column
        log.append("abc日");

        let buf = render(&log, &InputBuffer::new(), 6, 10);

        assert_eq!(row_text(&buf, 4, 1, 5), "abc ");
        assert_eq!(symbol(&buf, 5, 4), "║");
    }

    #[test]
    fn test_input_rows_at_bottom() {
        let mut input = InputBuffer::new();
        for ch in "abcdefghij".chars() {
            input.insert(ch).unwrap();
        }

        let buf = render(&MessageLog::new(), &input, 5, 10);

        // Four rows of w-1 = 4 bytes starting at column 0
        assert_eq!(row_text(&buf, 6, 0, 4), "abcd");
        assert_eq!(row_text(&buf, 7, 0, 4), "efgh");
        assert_eq!(row_text(&buf, 8, 0, 4), "ij  ");
        assert_eq!(row_text(&buf, 9, 0, 4), "    ");
        assert_eq!(fg(&buf, 0, 6), Some(Color::White));
    }

    #[test]
    fn test_minimum_size_renders_frame_only() {
        let mut log = MessageLog::new();
        log.append("hidden");

        let buf = render(&log, &InputBuffer::new(), MIN_WIDTH, MIN_HEIGHT);

        assert_eq!(symbol(&buf, 0, 0), "╔");
        assert_eq!(symbol(&buf, 0, 1), "╚");
        assert_eq!(symbol(&buf, 2, 1), "╝");
    }

    #[test]
    fn test_too_small_renders_nothing() {
        let log = MessageLog::new();
        let input = InputBuffer::new();

        let short = render(&log, &input, 80, MIN_HEIGHT - 1);
        assert_eq!(symbol(&short, 0, 0), " ");

        let narrow = render(&log, &input, MIN_WIDTH - 1, 24);
        assert_eq!(symbol(&narrow, 0, 0), " ");
    }

    #[test]
    fn test_offset_area() {
        let area = Rect::new(2, 3, 20, 10);
        let mut buf = Buffer::empty(Rect::new(0, 0, 30, 20));
        ChatView::new(&MessageLog::new(), &InputBuffer::new()).render(area, &mut buf);

        assert_eq!(symbol(&buf, 2, 3), "╔");
        assert_eq!(symbol(&buf, 21, 3), "╗");
        assert_eq!(symbol(&buf, 0, 0), " ");
    }

    #[test]
    fn test_more_rows_than_log_entries() {
        let mut log = MessageLog::new();
        log.append("newest");

        // 60 log rows but only 50 entries; must not panic
        let buf = render(&log, &InputBuffer::new(), 40, 66);
        assert_eq!(row_text(&buf, 60, 1, 7), "newest");
    }
}
