//! UI Builder module for creating keyboards and sending replies

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{InputFile, KeyboardButton, KeyboardMarkup, ParseMode, ReplyMarkup};

use crate::location::{Keyboard, Reply};

/// Convert a location keyboard to Telegram reply markup
pub fn create_reply_markup(keyboard: &Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::Remove => ReplyMarkup::kb_remove(),
        Keyboard::Layout(rows) => {
            let buttons: Vec<Vec<KeyboardButton>> = rows
                .iter()
                .map(|row| row.iter().map(|label| KeyboardButton::new(label.clone())).collect())
                .collect();
            ReplyMarkup::Keyboard(KeyboardMarkup::new(buttons))
        }
    }
}

/// Send one reply to a chat
pub async fn send_reply(bot: &Bot, chat_id: ChatId, reply: &Reply) -> Result<()> {
    match reply {
        Reply::Text { text, keyboard, html } => {
            let mut request = bot.send_message(chat_id, text.clone());
            if *html {
                request = request.parse_mode(ParseMode::Html);
            }
            if let Some(keyboard) = keyboard {
                request = request.reply_markup(create_reply_markup(keyboard));
            }
            request.await?;
        }
        Reply::Photo { path, caption, keyboard } => {
            let mut request = bot.send_photo(chat_id, InputFile::file(path.clone()));
            if let Some(caption) = caption {
                request = request.caption(caption.clone()).parse_mode(ParseMode::Html);
            }
            if let Some(keyboard) = keyboard {
                request = request.reply_markup(create_reply_markup(keyboard));
            }
            request.await?;
        }
    }
    Ok(())
}

/// Send replies in order, stopping at the first failure
pub async fn send_replies(bot: &Bot, chat_id: ChatId, replies: &[Reply]) -> Result<()> {
    for reply in replies {
        send_reply(bot, chat_id, reply).await?;
    }
    Ok(())
}
