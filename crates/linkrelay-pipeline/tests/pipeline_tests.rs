// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end relay scenarios over the mock transport, on a paused clock.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Relay, elapse, idle};
use linkrelay_core::{MediaKind, MessageId, RelayError};
use linkrelay_pipeline::{
    MatchStrategy, RequestState, SchedulerState, ThumbnailHandle, ThumbnailStore,
};
use linkrelay_test_utils::fixtures::{
    self, DESTINATION, FIRST_RESPONDER, SECOND_RESPONDER, SOURCE_CHAT, relay_config,
};
use linkrelay_test_utils::{MockTransport, Sent};

const SENTINEL_REPLY: &str = "HERE IS YOUR LINK: https://cdn.example/final";

fn source_text(id: i32, body: &str) -> linkrelay_core::InboundMessage {
    fixtures::text(id, SOURCE_CHAT.0, body)
}

fn first_reply(id: i32, kind: MediaKind, to: Option<MessageId>) -> linkrelay_core::InboundMessage {
    let message = fixtures::media(id, FIRST_RESPONDER.0, kind, "", "responder-file");
    match to {
        Some(target) => fixtures::replying(message, target),
        None => message,
    }
}

fn second_reply(id: i32, body: &str, to: Option<MessageId>) -> linkrelay_core::InboundMessage {
    let message = fixtures::text(id, SECOND_RESPONDER.0, body);
    match to {
        Some(target) => fixtures::replying(message, target),
        None => message,
    }
}

#[tokio::test(start_paused = true)]
async fn unanswered_request_times_out_and_frees_the_slot() {
    let relay = Relay::start(&relay_config());
    relay
        .deliver(source_text(1, "Check this out https://host/abc123 nice"))
        .await;

    let sent = relay.transport.sent_to(FIRST_RESPONDER).await;
    assert_eq!(sent.len(), 1);
    assert!(matches!(
        &sent[0],
        Sent::Text { text, .. } if text == "Check this out https://host/abc123 nice"
    ));

    let live = relay.pipeline.current_state().await;
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].link, "https://host/abc123");
    assert_eq!(live[0].state, RequestState::DispatchedFirstHop);
    assert!(!live[0].has_thumbnail);
    assert_eq!(relay.pipeline.scheduler_state().await, SchedulerState::Waiting);

    elapse(301).await;

    let done = relay.pipeline.recent_outcomes().await;
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].state, RequestState::TimedOut);
    assert!(done[0].reason.as_deref().unwrap().contains("no resolution"));
    assert!(relay.transport.sent_to(DESTINATION).await.is_empty());
    assert!(relay.pipeline.current_state().await.is_empty());
    assert_eq!(relay.pipeline.scheduler_state().await, SchedulerState::Idle);
    assert_eq!(relay.pipeline.bound_correlations().await, 0);

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn two_hop_relay_publishes_with_thumbnail() {
    let relay = Relay::start(&relay_config());
    relay
        .deliver(fixtures::photo(
            1,
            SOURCE_CHAT.0,
            "new drop https://host/a",
            "thumb-1",
        ))
        .await;
    let dispatched = relay.last_to(FIRST_RESPONDER).await;

    relay
        .deliver(first_reply(50, MediaKind::Video, Some(dispatched)))
        .await;
    let forwarded = relay.transport.sent_to(SECOND_RESPONDER).await;
    assert!(matches!(
        forwarded.as_slice(),
        [Sent::Forward { original: MessageId(50), .. }]
    ));
    let live = relay.pipeline.current_state().await;
    assert_eq!(live[0].state, RequestState::AwaitingSecondHop);
    assert_eq!(live[0].matched_by, Some(MatchStrategy::MatchedByReply));

    relay
        .deliver(second_reply(60, SENTINEL_REPLY, Some(forwarded[0].id())))
        .await;

    let published = relay.transport.sent_to(DESTINATION).await;
    assert_eq!(published.len(), 1);
    let Sent::Media { id, media, caption, .. } = &published[0] else {
        panic!("expected a media publish, got {published:?}");
    };
    assert_eq!(caption, SENTINEL_REPLY);
    assert_eq!(media.bytes, MockTransport::bytes_for("thumb-1"));

    let done = relay.pipeline.recent_outcomes().await;
    assert_eq!(done[0].state, RequestState::Published);
    assert_eq!(done[0].published_as, Some(*id));
    assert_eq!(done[0].matched_by, Some(MatchStrategy::MatchedByReply));

    let stats = relay.pipeline.thumbnail_stats();
    assert_eq!((stats.acquired, stats.released), (1, 1));
    assert_eq!(relay.pipeline.bound_correlations().await, 0);
    assert_eq!(relay.pipeline.scheduler_state().await, SchedulerState::Idle);

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_attachment_upload_falls_back_to_text() {
    let relay = Relay::start(&relay_config());
    relay.transport.fail_send_media(true);
    relay
        .deliver(fixtures::photo(1, SOURCE_CHAT.0, "https://host/a", "thumb"))
        .await;
    let dispatched = relay.last_to(FIRST_RESPONDER).await;
    relay
        .deliver(first_reply(50, MediaKind::Document, Some(dispatched)))
        .await;
    let forwarded = relay.last_to(SECOND_RESPONDER).await;
    relay
        .deliver(second_reply(60, SENTINEL_REPLY, Some(forwarded)))
        .await;

    let published = relay.transport.sent_to(DESTINATION).await;
    assert!(matches!(
        published.as_slice(),
        [Sent::Text { text, .. }] if text == SENTINEL_REPLY
    ));
    assert_eq!(
        relay.pipeline.recent_outcomes().await[0].state,
        RequestState::Published
    );
    assert_eq!(relay.pipeline.thumbnail_stats().live(), 0);

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn publish_failure_after_fallback_fails_the_request() {
    let relay = Relay::start(&relay_config());
    relay.transport.fail_send_media(true);
    relay.transport.fail_send_text_to(DESTINATION).await;
    relay
        .deliver(fixtures::photo(1, SOURCE_CHAT.0, "https://host/a", "thumb"))
        .await;
    let dispatched = relay.last_to(FIRST_RESPONDER).await;
    relay
        .deliver(first_reply(50, MediaKind::Video, Some(dispatched)))
        .await;
    let forwarded = relay.last_to(SECOND_RESPONDER).await;
    relay
        .deliver(second_reply(60, SENTINEL_REPLY, Some(forwarded)))
        .await;

    let done = relay.pipeline.recent_outcomes().await;
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].state, RequestState::Failed);
    assert!(done[0].reason.as_deref().unwrap().contains("publish failed"));
    assert_eq!(relay.pipeline.thumbnail_stats().live(), 0);
    assert_eq!(relay.pipeline.scheduler_state().await, SchedulerState::Idle);

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn links_arriving_while_waiting_queue_in_order() {
    let relay = Relay::start(&relay_config());
    relay.deliver(source_text(1, "https://h/1")).await;
    relay
        .deliver(source_text(2, "two https://h/2 and https://h/3"))
        .await;

    assert_eq!(relay.transport.sent_to(FIRST_RESPONDER).await.len(), 1);
    let live = relay.pipeline.current_state().await;
    let order: Vec<_> = live.iter().map(|s| (s.link.as_str(), s.state)).collect();
    assert_eq!(
        order,
        [
            ("https://h/1", RequestState::DispatchedFirstHop),
            ("https://h/2", RequestState::Queued),
            ("https://h/3", RequestState::Queued),
        ]
    );

    elapse(301).await;
    let live = relay.pipeline.current_state().await;
    assert_eq!(live[0].link, "https://h/2");
    assert_eq!(live[0].state, RequestState::DispatchedFirstHop);
    assert_eq!(live.len(), 2);

    elapse(300).await;
    let live = relay.pipeline.current_state().await;
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].link, "https://h/3");

    let sent = relay.transport.sent_to(FIRST_RESPONDER).await;
    assert_eq!(sent.len(), 3);
    assert!(matches!(&sent[1], Sent::Text { text, .. } if text == "two https://h/2 and https://h/3"));

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn unlinked_replies_match_by_recency() {
    let relay = Relay::start(&relay_config());
    relay.deliver(source_text(1, "https://host/r")).await;

    relay.deliver(first_reply(50, MediaKind::Audio, None)).await;
    assert_eq!(relay.transport.sent_to(SECOND_RESPONDER).await.len(), 1);
    assert_eq!(
        relay.pipeline.current_state().await[0].matched_by,
        Some(MatchStrategy::MatchedByRecency)
    );

    relay.deliver(second_reply(60, SENTINEL_REPLY, None)).await;
    let done = relay.pipeline.recent_outcomes().await;
    assert_eq!(done[0].state, RequestState::Published);
    assert_eq!(done[0].matched_by, Some(MatchStrategy::MatchedByRecency));

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn unlinked_reply_outside_recency_window_is_discarded() {
    let relay = Relay::start(&relay_config());
    relay.deliver(source_text(1, "https://host/late")).await;

    elapse(61).await;
    relay.deliver(first_reply(50, MediaKind::Video, None)).await;

    assert!(relay.transport.sent_to(SECOND_RESPONDER).await.is_empty());
    assert_eq!(
        relay.pipeline.current_state().await[0].state,
        RequestState::DispatchedFirstHop
    );

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn non_qualifying_media_is_ignored() {
    let relay = Relay::start(&relay_config());
    relay.deliver(source_text(1, "https://host/q")).await;
    let dispatched = relay.last_to(FIRST_RESPONDER).await;

    relay
        .deliver(first_reply(50, MediaKind::Photo, Some(dispatched)))
        .await;
    relay
        .deliver(first_reply(51, MediaKind::Sticker, Some(dispatched)))
        .await;
    relay
        .deliver(fixtures::replying(
            fixtures::text(52, FIRST_RESPONDER.0, "processing..."),
            dispatched,
        ))
        .await;
    assert!(relay.transport.sent_to(SECOND_RESPONDER).await.is_empty());

    relay
        .deliver(first_reply(53, MediaKind::Video, Some(dispatched)))
        .await;
    assert!(matches!(
        relay.transport.sent_to(SECOND_RESPONDER).await.as_slice(),
        [Sent::Forward { original: MessageId(53), .. }]
    ));

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn duplicate_first_hop_reply_is_not_forwarded_twice() {
    let relay = Relay::start(&relay_config());
    relay.deliver(source_text(1, "https://host/d")).await;
    let dispatched = relay.last_to(FIRST_RESPONDER).await;

    relay
        .deliver(first_reply(50, MediaKind::Video, Some(dispatched)))
        .await;
    relay
        .deliver(first_reply(51, MediaKind::Video, Some(dispatched)))
        .await;

    assert_eq!(relay.transport.sent_to(SECOND_RESPONDER).await.len(), 1);
    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn second_hop_without_sentinel_does_not_settle() {
    let relay = Relay::start(&relay_config());
    relay.deliver(source_text(1, "https://host/s")).await;
    let dispatched = relay.last_to(FIRST_RESPONDER).await;
    relay
        .deliver(first_reply(50, MediaKind::Video, Some(dispatched)))
        .await;
    let forwarded = relay.last_to(SECOND_RESPONDER).await;

    relay
        .deliver(second_reply(60, "here is your link (lowercase)", Some(forwarded)))
        .await;
    assert!(relay.transport.sent_to(DESTINATION).await.is_empty());
    assert_eq!(
        relay.pipeline.current_state().await[0].state,
        RequestState::AwaitingSecondHop
    );

    relay
        .deliver(second_reply(61, SENTINEL_REPLY, Some(forwarded)))
        .await;
    assert_eq!(relay.transport.sent_to(DESTINATION).await.len(), 1);

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn dispatch_failure_fails_request_and_advances() {
    let relay = Relay::start(&relay_config());
    relay.transport.fail_send_text_to(FIRST_RESPONDER).await;
    relay
        .deliver(fixtures::photo(
            1,
            SOURCE_CHAT.0,
            "https://host/1 https://host/2",
            "thumb",
        ))
        .await;

    let done = relay.pipeline.recent_outcomes().await;
    assert_eq!(done.len(), 2);
    assert!(done.iter().all(|s| s.state == RequestState::Failed));
    assert!(
        done[0]
            .reason
            .as_deref()
            .unwrap()
            .contains("dispatch to first responder failed")
    );
    let stats = relay.pipeline.thumbnail_stats();
    assert_eq!((stats.acquired, stats.released), (2, 2));
    assert_eq!(relay.pipeline.bound_correlations().await, 0);

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn forward_failure_fails_without_waiting_for_timeout() {
    let relay = Relay::start(&relay_config());
    relay.transport.fail_forward(true);
    relay.deliver(source_text(1, "https://host/f")).await;
    let dispatched = relay.last_to(FIRST_RESPONDER).await;
    relay
        .deliver(first_reply(50, MediaKind::Video, Some(dispatched)))
        .await;

    let done = relay.pipeline.recent_outcomes().await;
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].state, RequestState::Failed);
    assert!(
        done[0]
            .reason
            .as_deref()
            .unwrap()
            .contains("second responder")
    );

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn late_reply_after_timeout_is_discarded() {
    let relay = Relay::start(&relay_config());
    relay.deliver(source_text(1, "https://host/1")).await;
    let stale = relay.last_to(FIRST_RESPONDER).await;
    relay.deliver(source_text(2, "https://host/2")).await;

    elapse(301).await;
    relay
        .deliver(first_reply(50, MediaKind::Video, Some(stale)))
        .await;

    assert!(relay.transport.sent_to(SECOND_RESPONDER).await.is_empty());
    let live = relay.pipeline.current_state().await;
    assert_eq!(live[0].link, "https://host/2");
    assert_eq!(live[0].state, RequestState::DispatchedFirstHop);

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stale_queue_entries_expire_without_dispatch() {
    let mut config = relay_config();
    config.timeouts.queue_ttl_secs = Some(100);
    let relay = Relay::start(&config);
    relay.deliver(source_text(1, "https://host/1")).await;
    relay.deliver(source_text(2, "https://host/2")).await;

    elapse(301).await;

    let done = relay.pipeline.recent_outcomes().await;
    assert_eq!(done.len(), 2);
    assert_eq!(done[1].link, "https://host/2");
    assert_eq!(done[1].state, RequestState::TimedOut);
    assert!(done[1].reason.as_deref().unwrap().contains("in queue"));
    assert_eq!(relay.transport.sent_to(FIRST_RESPONDER).await.len(), 1);

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn blocked_and_foreign_messages_never_queue() {
    let mut config = relay_config();
    config.intake.blocked_texts = vec!["#ad".into()];
    let relay = Relay::start(&config);

    relay.deliver(source_text(1, "sponsored #AD https://host/x")).await;
    relay
        .deliver(fixtures::text(2, -100_999, "https://host/elsewhere"))
        .await;
    relay
        .deliver(fixtures::text(3, DESTINATION.0, "https://host/echo"))
        .await;

    assert!(relay.pipeline.current_state().await.is_empty());
    assert_eq!(relay.transport.sent_count().await, 0);

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shutdown_settles_everything_and_releases_thumbnails() {
    let relay = Relay::start(&relay_config());
    relay
        .deliver(fixtures::photo(1, SOURCE_CHAT.0, "https://host/1", "t1"))
        .await;
    relay
        .deliver(fixtures::photo(2, SOURCE_CHAT.0, "https://host/2", "t2"))
        .await;
    let pipeline = relay.pipeline.clone();

    relay.stop().await.unwrap();

    let done = pipeline.recent_outcomes().await;
    assert_eq!(done.len(), 2);
    assert!(done.iter().all(|s| s.state == RequestState::Failed));
    assert!(done.iter().all(|s| s.reason.as_deref() == Some("pipeline shut down")));
    let stats = pipeline.thumbnail_stats();
    assert_eq!((stats.acquired, stats.released), (2, 2));
    assert!(pipeline.current_state().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn closed_transport_ends_run_with_error() {
    let relay = Relay::start(&relay_config());
    relay.transport.close();
    idle().await;

    let result = relay.join().await;
    assert!(matches!(result, Err(RelayError::TransportClosed)));
}

#[tokio::test(start_paused = true)]
async fn publication_outlasting_grace_is_abandoned_not_posted() {
    let relay = Relay::start(&relay_config());
    relay
        .transport
        .delay_sends_to(DESTINATION, Duration::from_secs(60))
        .await;
    relay.deliver(source_text(1, "https://host/slow")).await;
    let dispatched = relay.last_to(FIRST_RESPONDER).await;
    relay
        .deliver(first_reply(50, MediaKind::Video, Some(dispatched)))
        .await;
    let forwarded = relay.last_to(SECOND_RESPONDER).await;

    // The sentinel lands shortly before the resolution deadline, so the
    // scheduler times out while publication is still pending.
    elapse(275).await;
    relay
        .deliver(second_reply(60, SENTINEL_REPLY, Some(forwarded)))
        .await;
    elapse(40).await;

    let done = relay.pipeline.recent_outcomes().await;
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].state, RequestState::Failed);
    assert!(done[0].reason.as_deref().unwrap().contains("did not complete within"));
    assert_eq!(relay.pipeline.scheduler_state().await, SchedulerState::Idle);

    elapse(120).await;
    assert!(relay.transport.sent_to(DESTINATION).await.is_empty());

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn slow_publication_within_grace_still_publishes() {
    let relay = Relay::start(&relay_config());
    relay
        .transport
        .delay_sends_to(DESTINATION, Duration::from_secs(20))
        .await;
    relay.deliver(source_text(1, "https://host/slow")).await;
    let dispatched = relay.last_to(FIRST_RESPONDER).await;
    relay
        .deliver(first_reply(50, MediaKind::Video, Some(dispatched)))
        .await;
    let forwarded = relay.last_to(SECOND_RESPONDER).await;

    elapse(290).await;
    relay
        .deliver(second_reply(60, SENTINEL_REPLY, Some(forwarded)))
        .await;
    elapse(25).await;

    let done = relay.pipeline.recent_outcomes().await;
    assert_eq!(done[0].state, RequestState::Published);
    assert_eq!(relay.transport.sent_to(DESTINATION).await.len(), 1);

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn released_thumbnail_falls_back_to_text_and_publishes() {
    let thumbnails = Arc::new(ThumbnailStore::in_memory());
    let relay = Relay::start_with_thumbnails(&relay_config(), Arc::clone(&thumbnails));
    relay
        .deliver(fixtures::photo(1, SOURCE_CHAT.0, "https://host/a", "thumb"))
        .await;
    let owner = relay.pipeline.current_state().await[0].id;
    let dispatched = relay.last_to(FIRST_RESPONDER).await;
    relay
        .deliver(first_reply(50, MediaKind::Video, Some(dispatched)))
        .await;
    let forwarded = relay.last_to(SECOND_RESPONDER).await;

    let handle = ThumbnailHandle {
        owner,
        kind: MediaKind::Photo,
        file_name: "thumbnail.jpg".into(),
    };
    thumbnails.release(Some(&handle)).await;

    relay
        .deliver(second_reply(60, SENTINEL_REPLY, Some(forwarded)))
        .await;

    assert!(matches!(
        relay.transport.sent_to(DESTINATION).await.as_slice(),
        [Sent::Text { text, .. }] if text == SENTINEL_REPLY
    ));
    let done = relay.pipeline.recent_outcomes().await;
    assert_eq!(done[0].state, RequestState::Published);
    let stats = relay.pipeline.thumbnail_stats();
    assert_eq!((stats.acquired, stats.released), (1, 1));

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn slow_first_hop_send_leaves_state_readable_and_parks_early_replies() {
    let relay = Relay::start(&relay_config());
    relay
        .transport
        .delay_sends_to(FIRST_RESPONDER, Duration::from_secs(5))
        .await;
    relay.deliver(source_text(1, "https://host/a")).await;

    assert_eq!(relay.pipeline.scheduler_state().await, SchedulerState::Dispatching);
    relay.deliver(source_text(2, "https://host/b")).await;
    let live = relay.pipeline.current_state().await;
    assert_eq!(live.len(), 2);
    assert_eq!(live[0].state, RequestState::DispatchedFirstHop);
    assert_eq!(live[1].state, RequestState::Queued);

    // Answer arrives before the transport acknowledged the dispatch.
    relay.deliver(first_reply(50, MediaKind::Video, None)).await;
    assert!(relay.transport.sent_to(SECOND_RESPONDER).await.is_empty());

    elapse(5).await;

    assert!(matches!(
        relay.transport.sent_to(SECOND_RESPONDER).await.as_slice(),
        [Sent::Forward { original: MessageId(50), .. }]
    ));
    let live = relay.pipeline.current_state().await;
    assert_eq!(live[0].state, RequestState::AwaitingSecondHop);
    assert_eq!(live[0].matched_by, Some(MatchStrategy::MatchedByRecency));

    relay.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn hung_first_hop_send_fails_at_the_resolution_deadline() {
    let relay = Relay::start(&relay_config());
    relay
        .transport
        .delay_sends_to(FIRST_RESPONDER, Duration::from_secs(1000))
        .await;
    relay.deliver(source_text(1, "https://host/a")).await;
    relay.deliver(source_text(2, "https://host/b")).await;

    elapse(301).await;

    let done = relay.pipeline.recent_outcomes().await;
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].state, RequestState::Failed);
    assert!(
        done[0]
            .reason
            .as_deref()
            .unwrap()
            .starts_with("dispatch to first responder failed")
    );
    let live = relay.pipeline.current_state().await;
    assert_eq!(live[0].link, "https://host/b");

    let pipeline = relay.pipeline.clone();
    relay.stop().await.unwrap();
    assert!(pipeline.current_state().await.is_empty());
    assert_eq!(pipeline.recent_outcomes().await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn aborted_run_is_settled_and_leaves_no_thumbnail_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = relay_config();
    config.thumbnails.dir = Some(dir.path().to_string_lossy().into_owned());
    let relay = Relay::start(&config);
    relay
        .deliver(fixtures::photo(
            1,
            SOURCE_CHAT.0,
            "https://host/1 https://host/2",
            "thumb",
        ))
        .await;
    assert_eq!(relay.pipeline.thumbnail_stats().acquired, 2);

    let pipeline = relay.abort().await;
    pipeline.settle_remaining().await;

    let done = pipeline.recent_outcomes().await;
    assert_eq!(done.len(), 2);
    assert!(done.iter().all(|s| s.reason.as_deref() == Some("pipeline shut down")));
    assert_eq!(pipeline.thumbnail_stats().live(), 0);
    assert_eq!(pipeline.bound_correlations().await, 0);
    assert_eq!(pipeline.scheduler_state().await, SchedulerState::Idle);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
