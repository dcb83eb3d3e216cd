//! msgstream - bounded previews of tagged JSON message streams.
//!
//! A flow result arrives as two serialized streams of `[tag, payload]`
//! messages. This crate crops them to a byte budget without breaking JSON
//! ([`crop`]), folds table rows under their headers ([`stack`]), and turns the
//! result into display blocks ([`render`]).

pub mod crop;
pub mod message;
pub mod pipeline;
pub mod render;
pub mod stack;

pub use crop::{crop, crop_with_outcome, CropError, CropOutcome, CropScanner, EMPTY_STREAM};
pub use message::{parse_stream, Message, TableGroup, Tag};
pub use pipeline::{
    renderable_tables, RenderError, RenderFailure, RenderLimit, Renderable, FIRST_RENDER_LIMIT,
};
pub use render::{
    inline_error, render_message, render_messages, render_streams, Block, Rendered, TableView,
    END_OF_MESSAGES, SHOW_MORE,
};
pub use stack::stack;
