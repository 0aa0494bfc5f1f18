// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File download and upload helpers.

use linkrelay_core::{MediaBlob, MediaKind, RelayError};
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatId, FileId, InputFile};
use tracing::debug;

/// Downloads a file from Telegram servers by its file id.
///
/// Uses the Bot API's `getFile` to resolve the file path, then downloads
/// the file content as bytes.
pub async fn download_file(bot: &Bot, file_id: &str) -> Result<Vec<u8>, RelayError> {
    let file = bot
        .get_file(FileId(file_id.to_string()))
        .await
        .map_err(|e| RelayError::transport(format!("failed to get file info: {e}"), e))?;

    let mut buf = Vec::new();
    bot.download_file(&file.path, &mut buf)
        .await
        .map_err(|e| RelayError::transport(format!("failed to download file: {e}"), e))?;

    debug!(file_id, size = buf.len(), "downloaded file from Telegram");
    Ok(buf)
}

/// Uploads `media` to `chat` with `caption`, choosing the send method by kind.
pub async fn upload(
    bot: &Bot,
    chat: ChatId,
    media: MediaBlob,
    caption: &str,
) -> Result<Message, RelayError> {
    let file = InputFile::memory(media.bytes).file_name(media.file_name);
    let sent = match media.kind {
        MediaKind::Photo => bot.send_photo(chat, file).caption(caption).await,
        MediaKind::Video => bot.send_video(chat, file).caption(caption).await,
        MediaKind::Animation => bot.send_animation(chat, file).caption(caption).await,
        MediaKind::Audio => bot.send_audio(chat, file).caption(caption).await,
        _ => bot.send_document(chat, file).caption(caption).await,
    };
    sent.map_err(|e| RelayError::transport(format!("failed to upload media: {e}"), e))
}
