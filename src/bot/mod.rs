//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Handles commands and incoming text messages
//! - `ui_builder`: Converts keyboards and sends replies
//! - `dialogue_manager`: Applies handler responses to the chat's dialogue

pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dispatching::{HandlerExt, UpdateHandler};
use teloxide::prelude::*;

use crate::dialogue::SessionState;

pub use message_handler::{cancel_handler, message_handler, start_handler, Command};
pub use ui_builder::{create_reply_markup, send_replies, send_reply};

/// Update handler tree of the bot
pub fn schema() -> UpdateHandler<anyhow::Error> {
    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(dptree::case![Command::Start].endpoint(start_handler))
        .branch(dptree::case![Command::Cancel].endpoint(cancel_handler));

    Update::filter_message()
        .enter_dialogue::<Message, InMemStorage<SessionState>, SessionState>()
        .branch(command_handler)
        .branch(dptree::endpoint(message_handler))
}
