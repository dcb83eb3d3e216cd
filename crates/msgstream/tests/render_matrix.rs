use msgstream::{
    render_streams, renderable_tables, stack, Block, Message, RenderLimit, Rendered, SHOW_MORE,
};
use serde_json::json;

#[test]
fn stack_spec_example() {
    let out = stack(vec![
        Message::new("r", json!("A")),
        Message::new("t", json!("H")),
        Message::new("r", json!("B")),
        Message::new("r", json!("C")),
    ]);
    assert_eq!(
        out,
        vec![
            Message::new("t", json!({"rows": ["A"]})),
            Message::new("t", json!({"header": "H", "rows": ["B", "C"]})),
        ]
    );
}

#[test]
fn empty_context_with_end_marker_renders_one_eom_block() {
    let renderable = renderable_tables("[]", r#"[["x",{}]]"#, RenderLimit::default()).unwrap();
    let rendered = Rendered::from(&renderable);
    assert_eq!(rendered.blocks, vec![Block::EndOfMessages]);
    assert!(!rendered.truncated);
    assert_eq!(rendered.to_string(), "EOM\n");
}

#[test]
fn unknown_tag_renders_raw_pair() {
    let text = render_streams(r#"[["?",{"k":[1,2]}]]"#, "[]", RenderLimit::default());
    assert_eq!(text, "[\"?\",{\"k\":[1,2]}]\n");
}

#[test]
fn rows_split_across_streams_join_one_table() {
    let context = r#"[["m",{"plugin":"pslist"}],["t",[{"name":"PID","cname":"pid"},{"cname":"name"}]]]"#;
    let compressed = r#"[["r",{"pid":4,"name":"System"}],["r",{"pid":312,"name":"smss.exe"}],["x",{}]]"#;
    let text = render_streams(context, compressed, RenderLimit::Unlimited);
    assert_eq!(
        text,
        "plugin: pslist\nPID  name\n4    System\n312  smss.exe\nEOM\n"
    );
}

#[test]
fn truncated_render_offers_show_more_and_show_all_does_not() {
    let context = r#"[["L",{"msg":"foo"}],["L",{"msg":"bar"}],["m",{"session":{}}]]"#;
    let preview = render_streams(context, "[]", RenderLimit::Bytes(50));
    assert_eq!(preview, format!("foo\nbar\n{SHOW_MORE}\n"));

    let all = render_streams(context, "[]", RenderLimit::Unlimited);
    assert_eq!(all, "foo\nbar\nsession: {}\n");
}

#[test]
fn parse_failure_degrades_to_inline_error() {
    let text = render_streams(r#"[["L",{"msg":"a"}],["r"]]"#, "[]", RenderLimit::Unlimited);
    assert!(text.starts_with("error: "));
    assert!(text.contains(r#"context: [["L",{"msg":"a"}],["r"]]"#));
    assert!(text.contains("compressed: []"));
}
