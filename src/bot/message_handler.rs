//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ReplyMarkup;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info};

use crate::config::BotConfig;
use crate::dialogue::OracleDialogue;
use crate::localization::t_lang;
use crate::state_graph::StateGraph;

use super::dialogue_manager::apply_response;

/// Commands available in every state
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    /// Open the main menu
    Start,
    /// End the conversation
    Cancel,
}

/// `/start`: show the main menu, keeping the draw history
pub async fn start_handler(
    bot: Bot,
    msg: Message,
    dialogue: OracleDialogue,
    graph: Arc<StateGraph>,
) -> Result<()> {
    info!(user_id = %msg.chat.id, "User started the conversation");
    let session = dialogue.get_or_default().await?;
    apply_response(&bot, msg.chat.id, &dialogue, session, graph.start()).await
}

/// `/cancel`: say goodbye and forget the session
pub async fn cancel_handler(
    bot: Bot,
    msg: Message,
    dialogue: OracleDialogue,
    config: Arc<BotConfig>,
) -> Result<()> {
    info!(user_id = %msg.chat.id, "User canceled the conversation");
    bot.send_message(msg.chat.id, t_lang("farewell", Some(&config.language)))
        .reply_markup(ReplyMarkup::kb_remove())
        .await?;
    dialogue.exit().await?;
    Ok(())
}

/// Route any other message through the state graph
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: OracleDialogue,
    graph: Arc<StateGraph>,
) -> Result<()> {
    let mut session = dialogue.get_or_default().await?;
    debug!(
        user_id = %msg.chat.id,
        location = ?session.location,
        text = ?msg.text(),
        "Received message"
    );

    let response = match session.location {
        Some(state) => graph.dispatch(state, msg.text(), &mut session),
        None => {
            info!(user_id = %msg.chat.id, "User entered the conversation");
            graph.enter(msg.text(), &mut session)
        }
    };

    apply_response(&bot, msg.chat.id, &dialogue, session, response).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/start", "oracle_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/cancel", "oracle_bot").unwrap(), Command::Cancel);
        assert_eq!(Command::parse("/start@oracle_bot", "oracle_bot").unwrap(), Command::Start);
        assert!(Command::parse("/draw", "oracle_bot").is_err());
        assert!(Command::parse("Взять карту", "oracle_bot").is_err());
    }
}
