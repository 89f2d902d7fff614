//! # Slavic Oracle Telegram Bot
//!
//! A menu-driven Telegram bot drawing metaphorical cards. Screens are
//! locations of a button-driven state machine; each chat keeps a small
//! recency window so the same card is not drawn again right away.

pub mod bot;
pub mod card;
pub mod cards_errors;
pub mod cards_reader;
pub mod config;
pub mod dialogue;
pub mod draw_history;
pub mod localization;
pub mod location;
pub mod menu;
pub mod state_graph;
