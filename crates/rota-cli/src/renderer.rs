//! Terminal rendering module for rich markdown output
//!
//! Planner output is markdown: headers, tables and bullet lists. With rich
//! output enabled, headers are colored, tables are laid out by termimad and
//! everything else is styled inline. Plain mode prints the markdown as is.

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

/// A run of consecutive markdown lines rendered the same way.
#[derive(Debug, PartialEq, Eq)]
enum Block<'a> {
    Header(&'a str),
    Table(Vec<&'a str>),
    Text(&'a str),
}

/// Splits markdown into headers, tables and plain lines.
fn blocks(markdown: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    for line in markdown.lines() {
        if line.starts_with('|') {
            if let Some(Block::Table(lines)) = blocks.last_mut() {
                lines.push(line);
                continue;
            }
            blocks.push(Block::Table(vec![line]));
        } else if line.starts_with('#') {
            blocks.push(Block::Header(line));
        } else {
            blocks.push(Block::Text(line));
        }
    }
    blocks
}

/// Terminal renderer that can switch between rich and plain text output
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    /// Create a new terminal renderer
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();

        skin.set_headers_fg(Color::Blue);
        // Today's column header and cell content
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.table.set_fg(Color::AnsiValue(245));

        Self { rich_enabled, skin }
    }

    /// Render markdown text to terminal
    pub fn render(&self, markdown: &str) -> Result<()> {
        if !self.rich_enabled {
            print!("{markdown}");
            return Ok(());
        }

        for block in blocks(markdown) {
            match block {
                // Keep the hash symbols visible
                Block::Header(line) => println!("\x1b[34m{line}\x1b[0m"),
                Block::Table(lines) => self.skin.print_text(&lines.join("\n")),
                Block::Text(line) => {
                    self.skin.print_inline(line);
                    println!();
                }
            }
        }
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
