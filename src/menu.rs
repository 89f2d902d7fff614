//! # Oracle Menu Module
//!
//! Builds the conversation tree of the oracle:
//!
//! ```text
//! main menu ── "draw a card" ──▶ random card
//!    ▲                              │
//!    └──────── "back to" ◀──────────┤
//!                                   └── "draw another card" ──▶ random card
//! ```
//!
//! Every card is a menu of its own. Draws go through the session's
//! [`DrawHistory`](crate::draw_history::DrawHistory), so a card does not come
//! up again while it is in the recency window.

use std::collections::HashMap;
use std::sync::Arc;
use teloxide::utils::html;
use tracing::{info, warn};

use crate::card::Card;
use crate::dialogue::SessionState;
use crate::draw_history::DEFAULT_HISTORY_SIZE;
use crate::localization::{t_args_lang, t_lang, DEFAULT_LANGUAGE};
use crate::location::{LocationId, Locations, Payload, SessionSupplier};
use crate::state_graph::StateGraph;

/// Telegram rejects photo captions longer than this
pub const CAPTION_LIMIT: usize = 1024;

/// Settings of the oracle tree
#[derive(Debug, Clone)]
pub struct OracleOptions {
    pub language: String,
    pub history_size: usize,
}

impl Default for OracleOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

impl OracleOptions {
    fn lang(&self) -> Option<&str> {
        Some(self.language.as_str())
    }
}

/// HTML welcome text of a card location
pub fn card_welcome_text(card: &Card, language_code: Option<&str>) -> String {
    let mut text = format!(
        "<b>{}</b>\n\n{}\n\n{}",
        html::escape(&card.name),
        html::escape(&card.description),
        html::escape(&card.meaning)
    );
    if !card.keywords.is_empty() {
        text.push_str(&format!(
            "\n\n<i>{}: {}</i>",
            t_lang("keywords-label", language_code),
            html::escape(&card.keywords)
        ));
    }
    text
}

/// One location per card, in deck order
pub fn create_card_locations(
    locations: &mut Locations,
    cards: &[Card],
    language_code: Option<&str>,
) -> Vec<LocationId> {
    cards
        .iter()
        .map(|card| {
            let text = card_welcome_text(card, language_code);
            let long_text = text.chars().count() > CAPTION_LIMIT;
            let welcome = match &card.image_path {
                Some(path) => Payload::with_image(text, path),
                None => Payload::text(text),
            };

            let id = locations.add_menu(card.name.clone(), welcome);
            // A card page is complete content even before buttons exist
            locations.set_implemented(id, true);
            if long_text {
                locations.set_send_photo_separately(id, true);
            }
            id
        })
        .collect()
}

/// Supplier drawing a card through the session's history
pub fn card_draw(
    cards: Arc<Vec<Card>>,
    card_locations: &[LocationId],
    history_size: usize,
) -> SessionSupplier {
    let mut by_name = HashMap::new();
    for (card, id) in cards.iter().zip(card_locations) {
        if by_name.insert(card.name.clone(), *id).is_some() {
            warn!(card = %card.name, "Duplicate card name, only the last one can be drawn");
        }
    }

    Arc::new(move |session: &mut SessionState| {
        let card = session.history_mut(history_size).select_card(&cards)?;
        by_name.get(&card.name).copied()
    })
}

/// "Draw another card" and "back to main menu" on every card location
pub fn add_buttons_to_card_locations(
    locations: &mut Locations,
    card_locations: &[LocationId],
    main_menu: LocationId,
    draw: SessionSupplier,
    language_code: Option<&str>,
) {
    let draw_another = t_lang("button-draw-another", language_code);
    let back_prefix = t_lang("button-back-prefix", language_code);
    let retry_notice = t_lang("retry-notice", language_code);

    for location in card_locations {
        locations.add_func_button_with_session(
            *location,
            &draw_another,
            draw.clone(),
            card_locations,
        );
        locations.add_back_buttons(*location, &[main_menu], &back_prefix);
        locations.add_fallback_with_notice(*location, None, &retry_notice);
    }
}

/// Build the complete oracle conversation for `cards`
pub fn build_oracle(cards: Vec<Card>, options: &OracleOptions) -> StateGraph {
    let lang = options.lang();
    let mut locations = Locations::new();

    let main_menu = locations.add_menu(
        t_lang("main-menu-name", lang),
        t_lang("main-menu-welcome", lang),
    );

    let card_locations = create_card_locations(&mut locations, &cards, lang);
    let count = cards.len().to_string();
    let draw = card_draw(Arc::new(cards), &card_locations, options.history_size);
    add_buttons_to_card_locations(&mut locations, &card_locations, main_menu, draw.clone(), lang);

    locations.add_func_button_with_session(
        main_menu,
        &t_lang("button-draw-card", lang),
        draw,
        &card_locations,
    );
    locations.add_info_button(
        main_menu,
        &t_lang("button-about", lang),
        &t_args_lang("about-deck", &[("count", &count)], lang),
    );
    locations.add_fallback_with_notice(main_menu, None, &t_lang("retry-notice", lang));

    info!(cards = card_locations.len(), language = %options.language, "Oracle menu prepared");
    StateGraph::build(locations, main_menu)
}
