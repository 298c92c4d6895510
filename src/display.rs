//! Terminal output: the send confirmation and the framed update dump.

use std::io::{self, Write};

use crossterm::style::{Color, Stylize};
use tracing::info;

use crate::error::{Error, Result};
use crate::messenger::InboundUpdate;

pub const SUCCESS_TEXT: &str = "Message sent!";

const SUCCESS_COLOR: Color = Color::AnsiValue(205);
const BORDER_COLOR: Color = Color::AnsiValue(63);

/// Blank columns between the border and the text.
const PAD_X: usize = 2;
/// Blank rows between the border and the text.
const PAD_Y: usize = 1;
/// Blank space around the border on every side.
const MARGIN: usize = 1;

/// One-line confirmation printed after a successful send.
pub fn success_line() -> String {
    SUCCESS_TEXT.with(SUCCESS_COLOR).to_string()
}

/// Wrap `text` in a padded box with a colored border.
pub fn frame(text: &str) -> String {
    layout(text, |border| border.with(BORDER_COLOR).to_string())
}

/// Same box as [`frame`], without escape codes.
pub fn frame_plain(text: &str) -> String {
    layout(text, str::to_string)
}

fn layout<F>(text: &str, paint: F) -> String
where
    F: Fn(&str) -> String,
{
    let lines: Vec<&str> = text.lines().collect();
    let content_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let inner_width = content_width + 2 * PAD_X;

    let margin = " ".repeat(MARGIN);
    let side = paint("│");
    let blank_row = format!("{margin}{side}{}{side}{margin}", " ".repeat(inner_width));

    let mut rows = Vec::with_capacity(lines.len() + 2 * (PAD_Y + MARGIN) + 2);
    rows.extend(std::iter::repeat(String::new()).take(MARGIN));
    rows.push(format!(
        "{margin}{}{margin}",
        paint(&format!("┌{}┐", "─".repeat(inner_width)))
    ));
    rows.extend(std::iter::repeat(blank_row.clone()).take(PAD_Y));
    for line in &lines {
        let fill = content_width - line.chars().count();
        rows.push(format!(
            "{margin}{side}{pad}{line}{}{pad}{side}{margin}",
            " ".repeat(fill),
            pad = " ".repeat(PAD_X),
        ));
    }
    rows.extend(std::iter::repeat(blank_row).take(PAD_Y));
    rows.push(format!(
        "{margin}{}{margin}",
        paint(&format!("└{}┘", "─".repeat(inner_width)))
    ));
    rows.extend(std::iter::repeat(String::new()).take(MARGIN));

    rows.join("\n")
}

/// Pretty-print the message carried by `update` inside a [`frame`].
///
/// Returns `Ok(None)` when the update carries no message, and
/// [`Error::Render`] when the message is not a non-empty object.
pub fn render_update(update: &InboundUpdate) -> Result<Option<String>> {
    let Some(message) = &update.message else {
        info!(update_id = update.id, "Received update does not contain a message");
        return Ok(None);
    };

    match message.as_object() {
        Some(fields) if !fields.is_empty() => {}
        _ => {
            return Err(Error::Render(format!(
                "update {} carries a malformed message: {}",
                update.id, message
            )))
        }
    }

    let pretty = serde_json::to_string_pretty(message)?;
    Ok(Some(frame(&pretty)))
}

/// Write `text` and a newline to the terminal sink.
pub fn show<W: Write>(sink: &mut W, text: &str) -> io::Result<()> {
    writeln!(sink, "{}", text)?;
    sink.flush()
}
