//! Tests for server mode (capturing the next inbound message)

use telegrammer::commands::{capture, UpdateStream};
use telegrammer::{Error, InboundUpdate};

use crate::common::{
    empty_update, fast_options, message_update, Call, MockMessenger, RECIPIENT,
};

fn polls(calls: &[Call]) -> Vec<i64> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::GetUpdates { offset, .. } => Some(*offset),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_skips_updates_without_message_then_captures() {
    let messenger = MockMessenger::new()
        .with_batches(vec![Ok(vec![empty_update(1), message_update(2, "hi")])]);
    let mut sink = Vec::new();

    let captured = capture(&messenger, &fast_options(), &mut sink).await.unwrap();

    assert_eq!(captured.update_id, 2);
    assert!(captured.rendered.contains("\"text\": \"hi\""));
    let printed = String::from_utf8(sink).unwrap();
    assert_eq!(printed.matches("\"text\": \"hi\"").count(), 1);
    assert!(printed.contains(&format!("\"id\": {}", RECIPIENT)));
    assert_eq!(
        messenger.calls(),
        vec![
            Call::RemoveWebhook,
            Call::GetUpdates {
                offset: 0,
                timeout_secs: 60,
            },
        ]
    );
}

#[tokio::test]
async fn test_keeps_polling_with_advancing_offset() {
    let messenger = MockMessenger::new().with_batches(vec![
        Ok(vec![]),
        Ok(vec![empty_update(10), empty_update(11)]),
        Ok(vec![message_update(12, "later")]),
    ]);
    let mut sink = Vec::new();

    let captured = capture(&messenger, &fast_options(), &mut sink).await.unwrap();

    assert_eq!(captured.update_id, 12);
    assert_eq!(polls(&messenger.calls()), vec![0, 0, 12]);
}

#[tokio::test]
async fn test_first_message_wins() {
    let messenger = MockMessenger::new().with_batches(vec![Ok(vec![
        message_update(5, "first"),
        message_update(6, "second"),
    ])]);
    let mut sink = Vec::new();

    let captured = capture(&messenger, &fast_options(), &mut sink).await.unwrap();

    assert_eq!(captured.update_id, 5);
    let printed = String::from_utf8(sink).unwrap();
    assert!(printed.contains("first"));
    assert!(!printed.contains("second"));
}

#[tokio::test]
async fn test_malformed_message_is_skipped() {
    let messenger = MockMessenger::new().with_batches(vec![Ok(vec![
        InboundUpdate::new(3, Some(serde_json::Value::Null)),
        message_update(4, "ok"),
    ])]);
    let mut sink = Vec::new();

    let captured = capture(&messenger, &fast_options(), &mut sink).await.unwrap();

    assert_eq!(captured.update_id, 4);
}

#[tokio::test]
async fn test_webhook_failure_is_fatal() {
    let messenger = MockMessenger::new().failing_webhook("Unauthorized");
    let mut sink = Vec::new();

    let err = capture(&messenger, &fast_options(), &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Webhook(_)));
    assert_eq!(messenger.calls(), vec![Call::RemoveWebhook]);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_stream_open_failure_is_fatal() {
    let messenger = MockMessenger::new()
        .with_batches(vec![Err(Error::Stream("Conflict: terminated by other getUpdates request".into()))]);
    let mut sink = Vec::new();

    let err = capture(&messenger, &fast_options(), &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Stream(_)));
    assert_eq!(polls(&messenger.calls()), vec![0]);
}

#[tokio::test]
async fn test_poll_failure_after_open_is_retried() {
    let messenger = MockMessenger::new().with_batches(vec![
        Ok(vec![empty_update(1)]),
        Err(Error::Stream("Bad Gateway".into())),
        Ok(vec![message_update(2, "back")]),
    ]);
    let mut sink = Vec::new();

    let captured = capture(&messenger, &fast_options(), &mut sink).await.unwrap();

    assert_eq!(captured.update_id, 2);
    assert_eq!(polls(&messenger.calls()), vec![0, 2, 2]);
    let webhook_removals = messenger
        .calls()
        .iter()
        .filter(|c| **c == Call::RemoveWebhook)
        .count();
    assert_eq!(webhook_removals, 1);
}

#[tokio::test]
async fn test_update_stream_tracks_offset() {
    let messenger = MockMessenger::new()
        .with_batches(vec![Ok(vec![empty_update(7), message_update(9, "x")])]);

    let mut stream = UpdateStream::open(&messenger, 0, 60, std::time::Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(stream.offset(), 10);
    assert_eq!(stream.next().await.id, 7);
    assert_eq!(stream.next().await.id, 9);
    assert_eq!(polls(&messenger.calls()), vec![0]);
}
