//! Tests for stream parsing and channel integration.

use codex_runner::cli::{
    CodexEvent, EventAccumulator, StreamError, StreamParser, ThreadItem, DEFAULT_CHANNEL_BUFFER,
};
use tokio::sync::mpsc::Receiver;
use tokio_test::io::Builder;

async fn collect(mut rx: Receiver<CodexEvent>) -> Vec<CodexEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

async fn accumulate(rx: Receiver<CodexEvent>) -> EventAccumulator {
    let mut acc = EventAccumulator::new();
    for event in collect(rx).await {
        acc.apply(&event);
    }
    acc
}

#[test]
fn parse_line_thread_started() {
    let event = StreamParser::parse_line(r#"{"type":"thread.started","thread_id":"t-1"}"#).unwrap();
    assert_eq!(event.thread_id(), Some("t-1"));
}

#[test]
fn parse_line_trims_whitespace() {
    let event =
        StreamParser::parse_line("  {\"type\":\"thread.started\",\"thread_id\":\"t-1\"}\r\n")
            .unwrap();
    assert_eq!(event.thread_id(), Some("t-1"));
}

#[test]
fn parse_line_invalid_json() {
    let result = StreamParser::parse_line("not valid json at all");

    match result.unwrap_err() {
        StreamError::ParseError { input, reason: _ } => {
            assert_eq!(input, "not valid json at all");
        }
        other => panic!("Expected ParseError, got {other:?}"),
    }
}

#[test]
fn parse_line_whitespace_only() {
    assert!(matches!(
        StreamParser::parse_line("   \t\n  "),
        Err(StreamError::EmptyLine)
    ));
}

#[test]
fn parse_line_unknown_json_is_not_an_error() {
    assert_eq!(
        StreamParser::parse_line(r#"{"type":"turn.failed","error":{"message":"x"}}"#).unwrap(),
        CodexEvent::Unknown
    );
    assert_eq!(StreamParser::parse_line("42").unwrap(), CodexEvent::Unknown);
}

#[tokio::test]
async fn channel_delivers_events_in_order() {
    let reader = Builder::new()
        .read(b"{\"type\":\"thread.started\",\"thread_id\":\"abc123\"}\n")
        .read(b"{\"type\":\"item.completed\",\"item\":{\"type\":\"agent_message\",\"text\":\"first\"}}\n")
        .read(b"{\"type\":\"item.completed\",\"item\":{\"type\":\"agent_message\",\"text\":\"second\"}}\n")
        .build();

    let events = collect(StreamParser::into_channel(reader, DEFAULT_CHANNEL_BUFFER)).await;

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].thread_id(), Some("abc123"));
    assert_eq!(events[1].agent_message().as_deref(), Some("first"));
    assert_eq!(events[2].agent_message().as_deref(), Some("second"));
}

#[tokio::test]
async fn channel_reassembles_lines_split_across_reads() {
    let reader = Builder::new()
        .read(b"{\"type\":\"item.completed\",\"item\":{\"type\":\"agent_")
        .read(b"message\",\"text\":[\"a\",\"b\"")
        .read(b",\"c\"]}}\n")
        .build();

    let acc = accumulate(StreamParser::into_channel(reader, DEFAULT_CHANNEL_BUFFER)).await;
    assert_eq!(acc.last_message(), Some("abc"));
}

#[tokio::test]
async fn channel_skips_malformed_and_blank_lines() {
    let reader = Builder::new()
        .read(b"\n")
        .read(b"Reading prompt from stdin...\n")
        .read(b"{\"type\":\"thread.started\",\"thread_id\":\"abc123\"}\n")
        .read(b"{truncated\n")
        .read(b"   \n")
        .read(b"{\"type\":\"item.completed\",\"item\":{\"type\":\"agent_message\",\"text\":\"done\"}}\n")
        .build();

    let acc = accumulate(StreamParser::into_channel(reader, 1)).await;
    assert_eq!(acc.session_id(), Some("abc123"));
    assert_eq!(acc.last_message(), Some("done"));
    assert_eq!(acc.event_count(), 2);
}

#[tokio::test]
async fn channel_drops_unterminated_final_line() {
    let reader = Builder::new()
        .read(b"{\"type\":\"item.completed\",\"item\":{\"type\":\"agent_message\",\"text\":\"kept\"}}\n")
        .read(b"{\"type\":\"item.completed\",\"item\":{\"type\":\"agent_message\",\"text\":\"lost\"}}")
        .build();

    let acc = accumulate(StreamParser::into_channel(reader, DEFAULT_CHANNEL_BUFFER)).await;
    assert_eq!(acc.last_message(), Some("kept"));
}

#[tokio::test]
async fn channel_tolerates_invalid_utf8() {
    let reader = Builder::new()
        .read(b"\xff\xfe garbage\n")
        .read(b"{\"type\":\"thread.started\",\"thread_id\":\"t-9\"}\n")
        .build();

    let acc = accumulate(StreamParser::into_channel(reader, DEFAULT_CHANNEL_BUFFER)).await;
    assert_eq!(acc.session_id(), Some("t-9"));
}

#[tokio::test]
async fn non_message_items_do_not_clear_message() {
    let reader = Builder::new()
        .read(b"{\"type\":\"item.completed\",\"item\":{\"type\":\"agent_message\",\"text\":\"answer\"}}\n")
        .read(b"{\"type\":\"item.completed\",\"item\":{\"type\":\"command_execution\",\"command\":\"ls\"}}\n")
        .read(b"{\"type\":\"item.completed\",\"item\":{\"type\":\"agent_message\",\"text\":{\"rich\":true}}}\n")
        .build();

    let events = collect(StreamParser::into_channel(reader, DEFAULT_CHANNEL_BUFFER)).await;
    assert_eq!(
        events[1],
        CodexEvent::ItemCompleted {
            item: ThreadItem::Unknown
        }
    );

    let mut acc = EventAccumulator::new();
    for event in &events {
        acc.apply(event);
    }
    assert_eq!(acc.last_message(), Some("answer"));
}
