use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Channel, Message, Presence, Thread};

/// Events emitted by the messaging core after each successful mutation.
/// Fanned out in-process over a broadcast channel; consumers (unread badges,
/// notification surfaces) subscribe through the facade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ChatEvent {
    /// A channel was created
    ChannelCreate { channel: Channel },

    /// A channel and everything it owned was removed
    ChannelDelete { channel_id: Uuid },

    /// A channel's unread counter was reset
    ChannelRead { channel_id: Uuid },

    /// A thread was opened under a channel
    ThreadCreate { thread: Thread },

    /// A message was appended to a thread
    MessageCreate { channel_id: Uuid, message: Message },

    /// A reaction was added to a message
    ReactionAdd {
        message_id: Uuid,
        user_id: Uuid,
        user_name: String,
        emoji: String,
    },

    /// A reaction was removed from a message
    ReactionRemove {
        message_id: Uuid,
        user_id: Uuid,
        emoji: String,
    },

    /// A directory user changed presence
    PresenceUpdate {
        user_id: Uuid,
        status: Presence,
        last_seen: Option<DateTime<Utc>>,
    },
}

impl ChatEvent {
    /// Returns the channel_id if this event is scoped to a specific channel.
    /// Events that return `None` are global.
    pub fn channel_id(&self) -> Option<Uuid> {
        match self {
            Self::ChannelCreate { channel } => Some(channel.id),
            Self::ChannelDelete { channel_id } => Some(*channel_id),
            Self::ChannelRead { channel_id } => Some(*channel_id),
            Self::ThreadCreate { thread } => Some(thread.channel_id),
            Self::MessageCreate { channel_id, .. } => Some(*channel_id),
            // Reaction and presence events are global
            _ => None,
        }
    }
}
