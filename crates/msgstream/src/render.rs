//! Display blocks for stacked messages and their plain-text form.

use crate::message::{Message, TableGroup, Tag};
use crate::pipeline::{renderable_tables, RenderError, RenderLimit, Renderable};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;
use unicode_width::UnicodeWidthStr;

/// Marker shown for an `x` message.
pub const END_OF_MESSAGES: &str = "EOM";

/// Trailer shown when a render pass was cropped.
pub const SHOW_MORE: &str = "... output truncated, render again without a limit to show all";

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub headings: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Log {
        level: Option<String>,
        message: String,
    },
    Metadata(Map<String, Value>),
    Table(TableView),
    EndOfMessages,
    /// Unrecognized message, shown as its compact `[tag, payload]` JSON.
    Raw(String),
}

/// One render pass worth of blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub blocks: Vec<Block>,
    pub truncated: bool,
}

impl From<&Renderable> for Rendered {
    fn from(renderable: &Renderable) -> Self {
        Self {
            blocks: render_messages(&renderable.messages),
            truncated: renderable.truncated,
        }
    }
}

pub fn render_messages(messages: &[Message]) -> Vec<Block> {
    messages.iter().map(render_message).collect()
}

pub fn render_message(message: &Message) -> Block {
    let payload = message.payload();
    let block = match message.tag() {
        Tag::Log => log_block(payload),
        Tag::Metadata => payload.as_object().cloned().map(Block::Metadata),
        Tag::Table => TableGroup::from_payload(payload).map(|group| Block::Table(table_view(&group))),
        Tag::EndOfMessages => Some(Block::EndOfMessages),
        Tag::Row | Tag::Other(_) => None,
    };
    block.unwrap_or_else(|| Block::Raw(compact(&message.to_json())))
}

/// Render both streams to text. Failures become an inline error message
/// instead of an `Err`.
pub fn render_streams(context: &str, compressed: &str, limit: RenderLimit) -> String {
    match renderable_tables(context, compressed, limit) {
        Ok(renderable) => Rendered::from(&renderable).to_string(),
        Err(err) => inline_error(&err),
    }
}

/// Text shown in place of a failed render pass.
pub fn inline_error(err: &RenderError) -> String {
    warn!(error = %err.source, "render failed");
    format!("error: {err}")
}

fn log_block(payload: &Value) -> Option<Block> {
    let obj = payload.as_object()?;
    let message = obj.get("msg")?.as_str()?.to_string();
    let level = obj.get("level").map(cell_text);
    Some(Block::Log { level, message })
}

fn table_view(group: &TableGroup) -> TableView {
    let keys = group
        .header
        .as_ref()
        .and_then(header_columns)
        .or_else(|| {
            group
                .rows
                .iter()
                .find_map(Value::as_object)
                .map(|row| row.keys().map(|k| (k.clone(), k.clone())).collect())
        })
        .unwrap_or_default();

    let rows = group
        .rows
        .iter()
        .map(|row| match row {
            Value::Object(obj) if !keys.is_empty() => keys
                .iter()
                .map(|(key, _)| obj.get(key).map(cell_text).unwrap_or_default())
                .collect(),
            Value::Array(cells) => cells.iter().map(cell_text).collect(),
            other => vec![compact(other)],
        })
        .collect();

    TableView {
        headings: keys.into_iter().map(|(_, title)| title).collect(),
        rows,
    }
}

/// `(lookup key, heading)` per column, from an array of column descriptors
/// or plain column names.
fn header_columns(header: &Value) -> Option<Vec<(String, String)>> {
    header
        .as_array()?
        .iter()
        .map(|column| match column {
            Value::String(name) => Some((name.clone(), name.clone())),
            Value::Object(desc) => {
                let cname = desc.get("cname").and_then(Value::as_str);
                let name = desc.get("name").and_then(Value::as_str);
                let key = cname.or(name)?;
                Some((key.to_string(), name.unwrap_or(key).to_string()))
            }
            _ => None,
        })
        .collect()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => compact(other),
    }
}

fn compact(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headings.len()))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0usize; width];
        for line in std::iter::once(&self.headings).chain(self.rows.iter()) {
            for (idx, cell) in line.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.width());
            }
        }

        let mut first = true;
        for line in std::iter::once(&self.headings)
            .filter(|headings| !headings.is_empty())
            .chain(self.rows.iter())
        {
            if !first {
                writeln!(f)?;
            }
            first = false;
            let mut text = String::new();
            for (idx, cell) in line.iter().enumerate() {
                if idx > 0 {
                    text.push_str("  ");
                }
                text.push_str(cell);
                let pad = widths[idx] - cell.width();
                text.extend(std::iter::repeat(' ').take(pad));
            }
            f.write_str(text.trim_end())?;
        }
        Ok(())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Log {
                level: Some(level),
                message,
            } => write!(f, "[{level}] {message}"),
            Block::Log { level: None, message } => f.write_str(message),
            Block::Metadata(entries) => {
                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{key}: {}", cell_text(value))?;
                }
                Ok(())
            }
            Block::Table(table) => fmt::Display::fmt(table, f),
            Block::EndOfMessages => f.write_str(END_OF_MESSAGES),
            Block::Raw(raw) => f.write_str(raw),
        }
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            writeln!(f, "{block}")?;
        }
        if self.truncated {
            writeln!(f, "{SHOW_MORE}")?;
        }
        Ok(())
    }
}
