use crate::{Coords, TermInt};
use std::{io::{self, Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, read, poll};

/// One character cell on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Glyph {
    pub const BLANK: Glyph = Glyph { ch: ' ', fg: Color::Reset, bg: Color::Reset };

    pub fn new(ch: char, fg: Color, bg: Color) -> Self {
        Glyph { ch, fg, bg }
    }

    pub fn plain(ch: char) -> Self {
        Glyph { ch, ..Glyph::BLANK }
    }
}

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<Glyph>,
    // Area the board was drawn in, messages are centered on it
    field: Coords,
    current_msg: Option<Message>,
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let stdout = stdout();
        let screen = vec![Glyph::BLANK; width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, field: (width, height), current_msg: None })
    }

    pub fn setup(&mut self) -> io::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
    }

    pub fn restore(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, style::ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }

    pub fn read_event_blocking(&self) -> io::Result<Event> {
        read()
    }

    /// Waits up to `timeout` for the next event.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<Option<Event>> {
        if poll(timeout)? {
            read().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Frames a `width` x `height` area at the top left corner with `title`
    /// centred on the top edge.
    pub fn draw_borders(&mut self, (width, height): Coords, title: &str) -> io::Result<()> {
        self.field = (width, height);
        let end_x = width - 1;
        let end_y = height - 1;

        for x in 0..width {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.print_at((x, 0), Glyph::plain(ch))?;
            self.print_at((x, end_y), Glyph::plain(ch))?;
        }

        for y in 1..end_y {
            self.print_at((0, y), Glyph::plain('|'))?;
            self.print_at((end_x, y), Glyph::plain('|'))?;
        }

        let title_x = (width / 2).saturating_sub(title.len() as TermInt / 2);
        self.print_text((title_x, 0), title)?;
        self.flush()
    }

    pub fn show_message(&mut self, lines: &[&str]) -> io::Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.field.0 / 2, self.field.1 / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message::new(msg_width, msg_height, top_left));
        self.flush()
    }

    pub fn hide_message(&mut self) -> io::Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };
        let top_left = msg.top_left();

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height() {
            for x_diff in 0..msg.width() {
                let pos = (top_left.0 + x_diff, top_left.1 + y_diff);
                if let Some(idx) = self.index(pos) {
                    let glyph = self.screen[idx];
                    self.queue_glyph(pos, glyph)?;
                }
            }
        }

        self.flush()
    }

    /// Draws `glyph` unless the screen already shows it.
    pub fn print_at(&mut self, pos: Coords, glyph: Glyph) -> io::Result<()> {
        let idx = match self.index(pos) {
            Some(idx) => idx,
            None => return Ok(()),
        };

        if self.screen[idx] != glyph {
            self.queue_glyph(pos, glyph)?;
            self.screen[idx] = glyph;
        }
        Ok(())
    }

    pub fn print_text(&mut self, pos: Coords, text: &str) -> io::Result<()> {
        for (i, ch) in text.chars().enumerate() {
            self.print_at((pos.0 + i as TermInt, pos.1), Glyph::plain(ch))?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> io::Result<()> {
        execute!(self.stdout, style::ResetColor, terminal::Clear(ClearType::All))?;
        self.screen = vec![Glyph::BLANK; self.width as usize * self.height as usize];
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, pos: Coords) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }

    fn queue_glyph(&mut self, pos: Coords, glyph: Glyph) -> io::Result<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(pos.0, pos.1),
            style::SetForegroundColor(glyph.fg),
            style::SetBackgroundColor(glyph.bg),
            style::Print(glyph.ch)
        )
    }

    fn print_at_no_save(&mut self, pos: Coords, ch: char) -> io::Result<()> {
        // To be used for printing messages, where we don't wanna overwrite our
        // local buffer to restore it when the message is hidden
        if self.index(pos).is_none() {
            return Ok(());
        }
        self.queue_glyph(pos, Glyph::plain(ch))
    }
}

impl Message {
    pub fn new(width: TermInt, height: TermInt, top_left: Coords) -> Self {
        Message { width, height, top_left }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn top_left(&self) -> Coords {
        self.top_left
    }
}
