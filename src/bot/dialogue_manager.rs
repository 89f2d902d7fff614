//! Dialogue Manager module for applying handler responses to a chat

use anyhow::Result;
use teloxide::prelude::*;
use tracing::debug;

use crate::dialogue::{OracleDialogue, SessionState};
use crate::location::{Response, Transition};

use super::ui_builder::send_replies;

/// Send the replies of `response`, then store the session at its next state.
///
/// The dialogue is updated only after every reply went out, so a transport
/// failure leaves the chat where it was.
pub async fn apply_response(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &OracleDialogue,
    mut session: SessionState,
    response: Response,
) -> Result<()> {
    send_replies(bot, chat_id, &response.replies).await?;

    match response.transition {
        Transition::To(next) => {
            debug!(user_id = %chat_id, from = ?session.location, to = %next, "Transition");
            session.location = Some(next);
            dialogue.update(session).await?;
        }
        Transition::Stay => {
            dialogue.update(session).await?;
        }
        Transition::Unhandled => {
            debug!(user_id = %chat_id, location = ?session.location, "Message not handled");
        }
    }

    Ok(())
}
