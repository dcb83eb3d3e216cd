//! Context + compressed stream pipeline: crop, parse, concatenate, stack.

use crate::crop::{crop_with_outcome, CropError};
use crate::message::{parse_stream, Message};
use crate::stack::stack;
use thiserror::Error;
use tracing::debug;

/// Default first-render budget in bytes.
pub const FIRST_RENDER_LIMIT: usize = 1024;

/// How much of the two streams a render pass may consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderLimit {
    Bytes(usize),
    /// "Show all": never crop.
    Unlimited,
}

impl Default for RenderLimit {
    fn default() -> Self {
        RenderLimit::Bytes(FIRST_RENDER_LIMIT)
    }
}

impl RenderLimit {
    pub fn fits(&self, len: usize) -> bool {
        match self {
            RenderLimit::Bytes(budget) => len <= *budget,
            RenderLimit::Unlimited => true,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderFailure {
    #[error(transparent)]
    Crop(#[from] CropError),
    #[error("invalid message stream: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A failed render pass, carrying both raw inputs for display.
#[derive(Debug, Error)]
#[error("{source}\ncontext: {context}\ncompressed: {compressed}")]
pub struct RenderError {
    pub source: RenderFailure,
    pub context: String,
    pub compressed: String,
}

/// Stacked messages ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    pub messages: Vec<Message>,
    /// Some trailing messages were left out to honor the limit.
    pub truncated: bool,
}

/// Turn the two serialized streams into display-ready messages.
///
/// When both streams fit the limit they are parsed whole. Otherwise the
/// context stream is cropped to the budget and the compressed stream to
/// whatever the full context stream leaves over. Any failure discards the
/// whole pass.
pub fn renderable_tables(
    context: &str,
    compressed: &str,
    limit: RenderLimit,
) -> Result<Renderable, RenderError> {
    build(context, compressed, limit).map_err(|source| RenderError {
        source,
        context: context.to_string(),
        compressed: compressed.to_string(),
    })
}

fn build(context: &str, compressed: &str, limit: RenderLimit) -> Result<Renderable, RenderFailure> {
    let total = context.len() + compressed.len();
    let budget = match limit {
        RenderLimit::Bytes(budget) if !limit.fits(total) => budget,
        _ => {
            debug!(total, ?limit, "rendering streams in full");
            let mut messages = parse_stream(context)?;
            messages.extend(parse_stream(compressed)?);
            return Ok(Renderable {
                messages: stack(messages),
                truncated: false,
            });
        }
    };

    let context_budget = budget;
    let compressed_budget = budget.saturating_sub(context.len());
    let context_crop = crop_with_outcome(context, context_budget)?;
    let compressed_crop = crop_with_outcome(compressed, compressed_budget)?;
    debug!(
        total,
        budget,
        context_kept = context_crop.text.len(),
        compressed_kept = compressed_crop.text.len(),
        "cropped streams to first render budget"
    );

    let mut messages = parse_stream(&context_crop.text)?;
    messages.extend(parse_stream(&compressed_crop.text)?);
    Ok(Renderable {
        messages: stack(messages),
        truncated: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fitting_streams_are_not_truncated() {
        let out = renderable_tables(r#"[["L",{"msg":"a"}]]"#, r#"[["x",{}]]"#, RenderLimit::default())
            .unwrap();
        assert!(!out.truncated);
        assert_eq!(
            out.messages,
            vec![
                Message::new("L", json!({"msg": "a"})),
                Message::new("x", json!({})),
            ]
        );
    }

    #[test]
    fn over_budget_crops_both_streams() {
        let context = r#"[["L",{"msg":"foo"}],["L",{"msg":"bar"}],["m",{"session":{}}]]"#;
        let out = renderable_tables(context, r#"[["x",{}]]"#, RenderLimit::Bytes(50)).unwrap();
        assert!(out.truncated);
        assert_eq!(
            out.messages,
            vec![
                Message::new("L", json!({"msg": "foo"})),
                Message::new("L", json!({"msg": "bar"})),
            ]
        );
    }

    #[test]
    fn compressed_gets_leftover_budget() {
        let context = r#"[["L",{"msg":"a"}]]"#;
        let compressed = r#"[["r",{"a":1}],["r",{"a":2}],["r",{"a":3}]]"#;
        let budget = context.len() + 20;
        let out = renderable_tables(context, compressed, RenderLimit::Bytes(budget)).unwrap();
        assert!(out.truncated);
        assert_eq!(
            out.messages,
            vec![
                Message::new("L", json!({"msg": "a"})),
                Message::new("t", json!({"rows": [{"a": 1}]})),
            ]
        );
    }

    #[test]
    fn unlimited_never_crops() {
        let context = r#"[["L",{"msg":"foo"}],["L",{"msg":"bar"}]]"#;
        let out = renderable_tables(context, "[]", RenderLimit::Unlimited).unwrap();
        assert!(!out.truncated);
        assert_eq!(out.messages.len(), 2);
    }

    #[test]
    fn malformed_compressed_with_no_leftover_budget_is_dropped() {
        let context = r#"[["L",{"msg":"foo"}],["L",{"msg":"bar"}]]"#;
        let out = renderable_tables(context, "{not a stream}", RenderLimit::Bytes(30)).unwrap();
        assert!(out.truncated);
        assert_eq!(out.messages, vec![Message::new("L", json!({"msg": "foo"}))]);
    }

    #[test]
    fn failure_carries_both_inputs() {
        let err = renderable_tables("[[1,2]]", "[]", RenderLimit::default()).unwrap_err();
        assert!(matches!(err.source, RenderFailure::Parse(_)));
        let text = err.to_string();
        assert!(text.contains("context: [[1,2]]"));
        assert!(text.contains("compressed: []"));

        let err = renderable_tables(r#"{"a":[1,2,3]}"#, "[]", RenderLimit::Bytes(5)).unwrap_err();
        assert!(matches!(
            err.source,
            RenderFailure::Crop(CropError::MalformedStream)
        ));
    }
}
