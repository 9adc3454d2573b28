use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use huddle_core::{ChatError, ChatService, FixedClock};
use huddle_db::Database;
use huddle_types::api::AttachmentUpload;
use huddle_types::events::ChatEvent;
use huddle_types::models::{ChannelKind, Presence, User};

fn fixed_now() -> DateTime<Utc> {
    "2026-02-10T09:30:00Z".parse().expect("timestamp")
}

fn service() -> ChatService {
    let db = Database::open_in_memory().expect("open store");
    ChatService::with_clock(db, Arc::new(FixedClock(fixed_now())))
}

fn register(chat: &ChatService, name: &str, email: &str) -> User {
    chat.register_user(name, email, "Analyst", None)
        .expect("register user")
}

#[test]
fn channel_name_must_survive_trimming() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");

    let err = chat
        .create_channel("   ", ChannelKind::Team, None, sarah.id)
        .expect_err("blank name");
    assert!(matches!(err, ChatError::Validation(_)));
}

#[test]
fn new_channels_start_with_one_member_and_nothing_unread() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");

    let channel = chat
        .create_channel("finance", ChannelKind::Team, Some("month-end".into()), sarah.id)
        .expect("create");

    assert_eq!(channel.member_count, 1);
    assert_eq!(channel.unread_count, 0);
    assert_eq!(channel.created_at, fixed_now());
    assert!(channel.last_message.is_none());
}

#[test]
fn deleting_a_channel_takes_threads_messages_and_reactions_with_it() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");
    let michael = register(&chat, "Michael Chen", "michael@example.com");

    let channel = chat
        .create_channel("finance", ChannelKind::Team, None, sarah.id)
        .expect("channel");
    let t1 = chat
        .create_thread(channel.id, "Q4 close", sarah.id)
        .expect("thread");
    let t2 = chat
        .create_thread(channel.id, "audit prep", michael.id)
        .expect("thread");
    let m1 = chat
        .send_message(t1.id, sarah.id, "numbers are in", vec![])
        .expect("send");
    chat.send_message(t2.id, michael.id, "auditors booked", vec![])
        .expect("send");
    chat.toggle_reaction(m1.id, michael.id, "Michael Chen", "👍")
        .expect("react");

    chat.delete_channel(channel.id).expect("delete");

    assert!(matches!(
        chat.list_threads(channel.id),
        Err(ChatError::NotFound { entity: "channel", .. })
    ));
    assert!(matches!(
        chat.list_messages(t1.id),
        Err(ChatError::NotFound { entity: "thread", .. })
    ));
    assert!(matches!(
        chat.send_message(t2.id, sarah.id, "too late", vec![]),
        Err(ChatError::NotFound { entity: "thread", .. })
    ));
    assert!(matches!(
        chat.toggle_reaction(m1.id, sarah.id, "Sarah Johnson", "👍"),
        Err(ChatError::NotFound { entity: "message", .. })
    ));
    assert!(matches!(
        chat.delete_channel(channel.id),
        Err(ChatError::NotFound { entity: "channel", .. })
    ));
}

#[test]
fn toggling_the_same_reaction_twice_is_its_own_inverse() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");
    let michael = register(&chat, "Michael Chen", "michael@example.com");

    let channel = chat
        .create_channel("finance", ChannelKind::Team, None, sarah.id)
        .expect("channel");
    let thread = chat
        .create_thread(channel.id, "Q4 close", sarah.id)
        .expect("thread");
    let message = chat
        .send_message(thread.id, sarah.id, "draft is ready", vec![])
        .expect("send");

    let after_add = chat
        .toggle_reaction(message.id, michael.id, "Michael Chen", "🎉")
        .expect("first toggle");
    assert_eq!(after_add.reactions.len(), 1);
    assert_eq!(after_add.reactions[0].user_name, "Michael Chen");
    assert_eq!(after_add.reactions[0].emoji, "🎉");

    let after_remove = chat
        .toggle_reaction(message.id, michael.id, "Michael Chen", "🎉")
        .expect("second toggle");
    assert!(after_remove.reactions.is_empty());
}

#[test]
fn message_count_tracks_stored_messages_and_participants_grow() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");
    let michael = register(&chat, "Michael Chen", "michael@example.com");

    let channel = chat
        .create_channel("finance", ChannelKind::Team, None, sarah.id)
        .expect("channel");
    let thread = chat
        .create_thread(channel.id, "Q4 close", sarah.id)
        .expect("thread");

    chat.send_message(thread.id, michael.id, "first", vec![])
        .expect("send");
    chat.send_message(thread.id, sarah.id, "second", vec![])
        .expect("send");
    chat.send_message(thread.id, michael.id, "third", vec![])
        .expect("send");

    let threads = chat.list_threads(channel.id).expect("list");
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].message_count, 3);
    assert_eq!(
        threads[0].message_count as usize,
        chat.list_messages(thread.id).expect("list").len()
    );
    // Creator first, then authors in order of first contribution.
    assert_eq!(threads[0].participants, vec![sarah.id, michael.id]);
}

#[test]
fn messages_come_back_in_send_order_no_matter_what_reactions_do() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");

    let channel = chat
        .create_channel("finance", ChannelKind::Team, None, sarah.id)
        .expect("channel");
    let thread = chat
        .create_thread(channel.id, "Q4 close", sarah.id)
        .expect("thread");

    let bodies = ["one", "two", "three", "four", "five"];
    let mut sent = Vec::new();
    for body in bodies {
        sent.push(
            chat.send_message(thread.id, sarah.id, body, vec![])
                .expect("send"),
        );
    }
    chat.toggle_reaction(sent[1].id, sarah.id, "Sarah Johnson", "👀")
        .expect("react");

    let listed: Vec<String> = chat
        .list_messages(thread.id)
        .expect("list")
        .into_iter()
        .map(|m| m.body)
        .collect();
    assert_eq!(listed, bodies);
}

#[test]
fn threads_list_in_creation_order_not_activity_order() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");

    let channel = chat
        .create_channel("finance", ChannelKind::Team, None, sarah.id)
        .expect("channel");
    let first = chat
        .create_thread(channel.id, "older thread", sarah.id)
        .expect("thread");
    let second = chat
        .create_thread(channel.id, "newer thread", sarah.id)
        .expect("thread");

    // Activity lands in the newer thread only.
    chat.send_message(second.id, sarah.id, "ping", vec![])
        .expect("send");

    let ids: Vec<Uuid> = chat
        .list_threads(channel.id)
        .expect("list")
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[test]
fn channel_preview_truncates_at_fifty_characters() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");

    let channel = chat
        .create_channel("finance", ChannelKind::Team, None, sarah.id)
        .expect("channel");
    let thread = chat
        .create_thread(channel.id, "Q4 close", sarah.id)
        .expect("thread");

    let long_body = "x".repeat(60);
    chat.send_message(thread.id, sarah.id, &long_body, vec![])
        .expect("send");

    let listed = chat.list_channels(None).expect("list");
    let preview = listed[0].last_message.as_ref().expect("preview");
    assert_eq!(preview.content, format!("{}...", "x".repeat(50)));
    assert_eq!(preview.author, "Sarah Johnson");
    assert_eq!(preview.timestamp, fixed_now());

    let short_body = "y".repeat(40);
    chat.send_message(thread.id, sarah.id, &short_body, vec![])
        .expect("send");

    let listed = chat.list_channels(None).expect("list");
    let preview = listed[0].last_message.as_ref().expect("preview");
    assert_eq!(preview.content, short_body);
}

#[test]
fn unread_counts_rise_on_delivery_and_reset_on_mark_read() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");

    let channel = chat
        .create_channel("finance", ChannelKind::Team, None, sarah.id)
        .expect("channel");
    let thread = chat
        .create_thread(channel.id, "Q4 close", sarah.id)
        .expect("thread");

    for body in ["one", "two", "three"] {
        chat.send_message(thread.id, sarah.id, body, vec![])
            .expect("send");
    }
    assert_eq!(chat.list_channels(None).expect("list")[0].unread_count, 3);

    chat.mark_channel_read(channel.id).expect("mark read");
    assert_eq!(chat.list_channels(None).expect("list")[0].unread_count, 0);

    // Idempotent, and unknown ids are tolerated silently.
    chat.mark_channel_read(channel.id).expect("second mark read");
    chat.mark_channel_read(Uuid::new_v4()).expect("unknown id");
}

#[test]
fn search_matches_body_and_author_name_case_insensitively() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");
    let michael = register(&chat, "Michael Chen", "michael@example.com");

    let channel = chat
        .create_channel("finance", ChannelKind::Team, None, sarah.id)
        .expect("channel");
    let thread = chat
        .create_thread(channel.id, "quarterly review", sarah.id)
        .expect("thread");

    chat.send_message(thread.id, sarah.id, "Q4 results are strong", vec![])
        .expect("send");
    chat.send_message(thread.id, michael.id, "let's discuss Q1", vec![])
        .expect("send");

    let hits = chat.search("q1").expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].message.body, "let's discuss Q1");
    assert_eq!(hits[0].thread.id, thread.id);
    assert_eq!(hits[0].channel.id, channel.id);

    let hits = chat.search("sarah").expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].message.body, "Q4 results are strong");
    assert_eq!(hits[0].message.author_name, "Sarah Johnson");
}

#[test]
fn mentions_are_captured_raw_and_resolved_against_the_directory() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");
    let michael = register(&chat, "Michael Chen", "michael@example.com");

    let channel = chat
        .create_channel("finance", ChannelKind::Team, None, michael.id)
        .expect("channel");
    let thread = chat
        .create_thread(channel.id, "review", michael.id)
        .expect("thread");

    let message = chat
        .send_message(
            thread.id,
            michael.id,
            "hi @Sarah and @bob_2 please review",
            vec![],
        )
        .expect("send");

    assert_eq!(message.mentions, vec!["Sarah".to_string(), "bob_2".to_string()]);
    assert_eq!(message.mention_user_ids, vec![sarah.id]);

    let stored = chat.list_messages(thread.id).expect("list");
    assert_eq!(stored[0].mentions, message.mentions);
    assert_eq!(stored[0].mention_user_ids, message.mention_user_ids);
}

#[test]
fn attachments_keep_their_metadata_and_get_fresh_ids() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");

    let channel = chat
        .create_channel("finance", ChannelKind::Team, None, sarah.id)
        .expect("channel");
    let thread = chat
        .create_thread(channel.id, "Q4 close", sarah.id)
        .expect("thread");

    let message = chat
        .send_message(
            thread.id,
            sarah.id,
            "forecast attached",
            vec![AttachmentUpload {
                name: "forecast.xlsx".into(),
                mime_type: "application/vnd.ms-excel".into(),
                size_bytes: 48_213,
                url: "https://files.example.com/forecast.xlsx".into(),
            }],
        )
        .expect("send");

    assert_eq!(message.attachments.len(), 1);
    assert_eq!(message.attachments[0].name, "forecast.xlsx");

    let stored = chat.list_messages(thread.id).expect("list");
    assert_eq!(stored[0].attachments.len(), 1);
    assert_eq!(
        stored[0].attachments[0].url,
        "https://files.example.com/forecast.xlsx"
    );
}

#[test]
fn thread_and_send_failures_name_the_missing_entity() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");

    assert!(matches!(
        chat.create_thread(Uuid::new_v4(), "orphan", sarah.id),
        Err(ChatError::NotFound { entity: "channel", .. })
    ));

    let channel = chat
        .create_channel("finance", ChannelKind::Team, None, sarah.id)
        .expect("channel");
    assert!(matches!(
        chat.create_thread(channel.id, "  ", sarah.id),
        Err(ChatError::Validation(_))
    ));

    assert!(matches!(
        chat.send_message(Uuid::new_v4(), sarah.id, "hello", vec![]),
        Err(ChatError::NotFound { entity: "thread", .. })
    ));

    let thread = chat
        .create_thread(channel.id, "Q4 close", sarah.id)
        .expect("thread");
    assert!(matches!(
        chat.send_message(thread.id, Uuid::new_v4(), "hello", vec![]),
        Err(ChatError::NotFound { entity: "user", .. })
    ));
}

#[test]
fn successful_mutations_are_announced_to_subscribers() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");

    let channel = chat
        .create_channel("finance", ChannelKind::Team, None, sarah.id)
        .expect("channel");
    let thread = chat
        .create_thread(channel.id, "Q4 close", sarah.id)
        .expect("thread");

    let mut rx = chat.subscribe();
    let message = chat
        .send_message(thread.id, sarah.id, "numbers are in", vec![])
        .expect("send");

    match rx.try_recv().expect("event") {
        ChatEvent::MessageCreate {
            channel_id,
            message: announced,
        } => {
            assert_eq!(channel_id, channel.id);
            assert_eq!(announced.id, message.id);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    chat.toggle_reaction(message.id, sarah.id, "Sarah Johnson", "👍")
        .expect("react");
    assert!(matches!(
        rx.try_recv().expect("event"),
        ChatEvent::ReactionAdd { .. }
    ));
}

#[test]
fn presence_updates_stamp_last_seen_when_stepping_away() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");
    assert_eq!(sarah.status, Presence::Offline);
    assert!(sarah.last_seen.is_none());

    let away = chat
        .set_presence(sarah.id, Presence::Away)
        .expect("presence");
    assert_eq!(away.status, Presence::Away);
    assert_eq!(away.last_seen, Some(fixed_now()));

    // Coming back online keeps the previous stamp.
    let online = chat
        .set_presence(sarah.id, Presence::Online)
        .expect("presence");
    assert_eq!(online.status, Presence::Online);
    assert_eq!(online.last_seen, Some(fixed_now()));

    assert!(matches!(
        chat.set_presence(Uuid::new_v4(), Presence::Online),
        Err(ChatError::NotFound { entity: "user", .. })
    ));
}

#[test]
fn directory_rejects_duplicate_emails() {
    let chat = service();
    register(&chat, "Sarah Johnson", "sarah@example.com");

    let err = chat
        .register_user("Sarah J.", "sarah@example.com", "CFO", None)
        .expect_err("duplicate email");
    assert!(matches!(err, ChatError::Conflict(_)));
}

#[test]
fn channels_filter_by_kind_in_insertion_order() {
    let chat = service();
    let sarah = register(&chat, "Sarah Johnson", "sarah@example.com");

    chat.create_channel("finance", ChannelKind::Team, None, sarah.id)
        .expect("channel");
    let p1 = chat
        .create_channel("q4-forecast", ChannelKind::Project, None, sarah.id)
        .expect("channel");
    chat.create_channel("acme-co", ChannelKind::Client, None, sarah.id)
        .expect("channel");
    let p2 = chat
        .create_channel("budget-review", ChannelKind::Project, None, sarah.id)
        .expect("channel");

    let projects: Vec<Uuid> = chat
        .list_channels(Some(ChannelKind::Project))
        .expect("list")
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(projects, vec![p1.id, p2.id]);
    assert_eq!(chat.list_channels(None).expect("list").len(), 4);
}
