// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion from Telegram updates to transport-neutral messages.

use linkrelay_core::{Attachment, InboundMessage, MediaKind, MessageId, PeerId};
use teloxide::types::{FileMeta, Message};

/// Who a message should be attributed to.
///
/// The sending user for ordinary messages, the posting chat for channel
/// posts and anonymous admins, and the chat itself as a last resort.
pub fn author_of(msg: &Message) -> PeerId {
    if let Some(chat) = msg.sender_chat.as_ref() {
        return PeerId(chat.id.0);
    }
    match msg.from.as_ref() {
        Some(user) => PeerId(user.id.0 as i64),
        None => PeerId(msg.chat.id.0),
    }
}

/// The single attachment a message carries, if any.
///
/// For photos the largest size is used.
pub fn attachment_of(msg: &Message) -> Option<Attachment> {
    fn attach(
        kind: MediaKind,
        file: &FileMeta,
        file_name: Option<&String>,
        mime: Option<String>,
    ) -> Option<Attachment> {
        Some(Attachment {
            kind,
            file_id: file.id.to_string(),
            file_name: file_name.cloned(),
            mime_type: mime,
        })
    }

    if let Some(photos) = msg.photo() {
        let largest = photos.last()?;
        return attach(MediaKind::Photo, &largest.file, None, Some("image/jpeg".into()));
    }
    if let Some(video) = msg.video() {
        let mime = video.mime_type.as_ref().map(|m| m.to_string());
        return attach(MediaKind::Video, &video.file, video.file_name.as_ref(), mime);
    }
    if let Some(animation) = msg.animation() {
        let mime = animation.mime_type.as_ref().map(|m| m.to_string());
        return attach(
            MediaKind::Animation,
            &animation.file,
            animation.file_name.as_ref(),
            mime,
        );
    }
    if let Some(audio) = msg.audio() {
        let mime = audio.mime_type.as_ref().map(|m| m.to_string());
        return attach(MediaKind::Audio, &audio.file, audio.file_name.as_ref(), mime);
    }
    if let Some(voice) = msg.voice() {
        let mime = voice.mime_type.as_ref().map(|m| m.to_string());
        return attach(MediaKind::Voice, &voice.file, None, mime);
    }
    if let Some(doc) = msg.document() {
        let mime = doc.mime_type.as_ref().map(|m| m.to_string());
        return attach(MediaKind::Document, &doc.file, doc.file_name.as_ref(), mime);
    }
    if let Some(note) = msg.video_note() {
        return attach(MediaKind::VideoNote, &note.file, None, None);
    }
    if let Some(sticker) = msg.sticker() {
        return attach(MediaKind::Sticker, &sticker.file, None, None);
    }
    None
}

/// Converts a Telegram message into an [`InboundMessage`].
pub fn to_inbound_message(msg: &Message) -> InboundMessage {
    InboundMessage {
        id: MessageId(msg.id.0),
        chat: PeerId(msg.chat.id.0),
        author: author_of(msg),
        text: msg.text().map(str::to_string),
        caption: msg.caption().map(str::to_string),
        attachment: attachment_of(msg),
        reply_to: msg.reply_to_message().map(|r| MessageId(r.id.0)),
        received_at: msg.date,
    }
}
