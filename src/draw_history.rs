//! # Draw History Module
//!
//! Per-session recency window used to avoid drawing the same card twice in a
//! short span. The window holds the names of the last `capacity` cards; a
//! draw picks uniformly among cards outside the window and falls back to the
//! whole deck when the window covers every card.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

use crate::card::Card;

pub const DEFAULT_HISTORY_SIZE: usize = 5;

/// Bounded FIFO of recently drawn card names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawHistory {
    capacity: usize,
    recent: VecDeque<String>,
}

impl Default for DrawHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_SIZE)
    }
}

impl DrawHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            recent: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.recent.iter().any(|recent| recent == name)
    }

    /// Names in draw order, oldest first
    pub fn recent(&self) -> impl Iterator<Item = &str> {
        self.recent.iter().map(String::as_str)
    }

    /// Remember a drawn card, evicting the oldest entry past capacity
    pub fn record(&mut self, name: impl Into<String>) {
        self.recent.push_back(name.into());
        while self.recent.len() > self.capacity {
            self.recent.pop_front();
        }
    }

    /// Draw a card not seen in the window using the thread-local RNG
    pub fn select_card<'a>(&mut self, cards: &'a [Card]) -> Option<&'a Card> {
        self.select_card_with(cards, &mut rand::thread_rng())
    }

    /// Draw a card not seen in the window. `None` only for an empty deck.
    pub fn select_card_with<'a, R: Rng + ?Sized>(
        &mut self,
        cards: &'a [Card],
        rng: &mut R,
    ) -> Option<&'a Card> {
        let available: Vec<&Card> = cards
            .iter()
            .filter(|card| !self.contains(&card.name))
            .collect();

        let chosen = if available.is_empty() {
            debug!(
                deck_size = cards.len(),
                window = self.capacity,
                "Every card is recent, drawing from the full deck"
            );
            cards.choose(rng)?
        } else {
            *available.choose(rng)?
        };

        self.record(chosen.name.clone());
        Some(chosen)
    }
}
