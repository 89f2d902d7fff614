//! # Oracle Menu Tests
//!
//! Tests for the oracle conversation tree: card locations, their buttons and
//! card draws through the state graph.

use std::collections::HashSet;
use std::sync::Arc;

use slavic_oracle::card::Card;
use slavic_oracle::dialogue::SessionState;
use slavic_oracle::localization::t_lang;
use slavic_oracle::location::{Keyboard, LocationId, Locations, Reply, Transition};
use slavic_oracle::menu::{
    add_buttons_to_card_locations, build_oracle, card_draw, card_welcome_text,
    create_card_locations, OracleOptions, CAPTION_LIMIT,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(size: usize) -> Vec<Card> {
        (1..=size)
            .map(|i| {
                Card::new(
                    format!("Карта {i}"),
                    format!("Описание {i}"),
                    format!("Совет {i}"),
                    format!("слово {i}"),
                )
            })
            .collect()
    }

    fn ru() -> Option<&'static str> {
        Some("ru")
    }

    #[test]
    fn test_card_welcome_text_is_escaped_html() {
        let card = Card::new("Сирин & Алконост", "Птицы <рая>", "Слушай", "песня");
        let text = card_welcome_text(&card, ru());

        assert!(text.starts_with("<b>Сирин &amp; Алконост</b>"));
        assert!(text.contains("Птицы &lt;рая&gt;"));
        assert!(text.contains("Слушай"));
        assert!(text.ends_with("<i>Ключевые слова: песня</i>"));
    }

    #[test]
    fn test_card_welcome_text_without_keywords() {
        let card = Card::new("Леший", "Хозяин леса", "Не сходи с тропы", "");
        let text = card_welcome_text(&card, ru());
        assert!(!text.contains("<i>"));
    }

    #[test]
    fn test_create_card_locations() {
        let cards = deck(3);
        let mut locations = Locations::new();
        let ids = create_card_locations(&mut locations, &cards, ru());

        assert_eq!(ids.len(), 3);
        for (card, id) in cards.iter().zip(&ids) {
            let location = locations.get(*id).unwrap();
            assert_eq!(location.name(), card.name);
            assert!(location.is_implemented());
            assert!(location.is_menu());
            assert!(location.welcome().text.contains(&card.description));
            assert_eq!(location.welcome().image_path, None);
        }
    }

    #[test]
    fn test_long_card_text_sends_photo_separately() {
        let cards = vec![
            Card::new("Короткая", "текст", "совет", "").with_image("short.png"),
            Card::new("Длинная", "т".repeat(CAPTION_LIMIT), "совет", "").with_image("long.png"),
        ];
        let mut locations = Locations::new();
        let ids = create_card_locations(&mut locations, &cards, ru());

        let short = locations.send_welcome(ids[0]);
        assert_eq!(short.len(), 1);
        assert!(matches!(&short[0], Reply::Photo { caption: Some(_), .. }));

        assert!(locations.get(ids[1]).unwrap().send_photo_separately());
        let long = locations.send_welcome(ids[1]);
        assert_eq!(long.len(), 2);
        assert!(matches!(&long[0], Reply::Photo { caption: None, .. }));
        assert!(matches!(&long[1], Reply::Text { html: true, .. }));
    }

    #[test]
    fn test_card_location_buttons() {
        let cards = deck(2);
        let mut locations = Locations::new();
        let main_menu = locations.add_menu("Главное меню", "Добро пожаловать");
        let ids = create_card_locations(&mut locations, &cards, ru());
        let draw = card_draw(Arc::new(cards), &ids, 5);

        add_buttons_to_card_locations(&mut locations, &ids, main_menu, draw, ru());

        let location = locations.get(ids[0]).unwrap();
        assert_eq!(
            location.keyboard(),
            &Keyboard::Layout(vec![
                vec!["Взять ещё одну карту".to_string()],
                vec!["Назад: Главное меню".to_string()],
            ])
        );
        assert_eq!(location.children(), ids.as_slice());
        assert_eq!(location.handlers().len(), 3);

        let mut session = SessionState::default();
        let back = locations.handle(ids[0], Some("Назад: Главное меню"), &mut session);
        assert_eq!(back.transition, Transition::To(main_menu));

        let other = locations.handle(ids[0], Some("что-то"), &mut session);
        assert_eq!(other.transition, Transition::To(ids[0]));
        assert_eq!(other.replies[0], Reply::plain(t_lang("retry-notice", ru())));
    }

    #[test]
    fn test_card_draw_records_history() {
        let cards = deck(3);
        let mut locations = Locations::new();
        let ids = create_card_locations(&mut locations, &cards, ru());
        let draw = card_draw(Arc::new(cards), &ids, 2);

        let mut session = SessionState::default();
        let first = draw(&mut session).unwrap();
        let second = draw(&mut session).unwrap();

        assert_ne!(first, second);
        let history = session.history.as_ref().unwrap();
        assert_eq!(history.capacity(), 2);
        assert!(history.contains(locations.get(first).unwrap().name()));
        assert!(history.contains(locations.get(second).unwrap().name()));
    }

    #[test]
    fn test_card_draw_on_empty_deck() {
        let draw = card_draw(Arc::new(Vec::new()), &[], 5);
        assert_eq!(draw(&mut SessionState::default()), None);
    }

    #[test]
    fn test_oracle_graph_contains_every_card() {
        let graph = build_oracle(deck(6), &OracleOptions::default());

        assert_eq!(graph.len(), 7);
        assert_eq!(graph.root(), LocationId(0));
        let main_menu = graph.location(graph.root()).unwrap();
        assert_eq!(main_menu.name(), "Главное меню");
        assert!(main_menu.is_implemented());
        assert_eq!(main_menu.labels(), &["Взять карту".to_string(), "О колоде".to_string()]);
    }

    #[test]
    fn test_oracle_draws_without_repeats() {
        let graph = build_oracle(deck(6), &OracleOptions::default());
        let mut session = SessionState::default();

        let response = graph.start();
        assert_eq!(response.transition, Transition::To(graph.root()));
        assert_eq!(response.replies[0].text(), Some(t_lang("main-menu-welcome", ru()).as_str()));

        let mut state = graph.root();
        let mut drawn = Vec::new();
        let mut button = t_lang("button-draw-card", ru());
        for _ in 0..6 {
            let response = graph.dispatch(state, Some(button.as_str()), &mut session);
            let next = response.next_location().unwrap();
            assert_ne!(next, graph.root());
            drawn.push(graph.location(next).unwrap().name().to_string());
            state = next;
            button = t_lang("button-draw-another", ru());
        }

        // Six consecutive draws from a six-card deck with a window of five
        let unique: HashSet<&String> = drawn.iter().collect();
        assert_eq!(unique.len(), 6);
        assert_eq!(session.history.as_ref().unwrap().len(), 5);
    }

    #[test]
    fn test_oracle_about_and_fallback() {
        let graph = build_oracle(deck(4), &OracleOptions::default());
        let mut session = SessionState::default();
        let root = graph.root();

        let about = graph.dispatch(root, Some("О колоде"), &mut session);
        assert_eq!(about.transition, Transition::To(root));
        assert!(about.replies[0].text().unwrap().contains('4'));

        let unknown = graph.dispatch(root, Some("привет"), &mut session);
        assert_eq!(unknown.transition, Transition::To(root));
        assert_eq!(unknown.replies.len(), 2);

        let photo = graph.dispatch(root, None, &mut session);
        assert_eq!(photo.transition, Transition::To(root));
    }

    #[test]
    fn test_oracle_first_contact_is_a_plain_greeting() {
        let graph = build_oracle(deck(3), &OracleOptions::default());
        let mut session = SessionState::default();

        let response = graph.enter(Some("привет"), &mut session);
        assert_eq!(response, graph.start());
        assert_eq!(response.replies.len(), 1);
        assert_eq!(
            response.replies[0].text(),
            Some(t_lang("main-menu-welcome", ru()).as_str())
        );
        assert!(session.history.is_none());

        let response = graph.enter(Some("Взять карту"), &mut session);
        let card = response.next_location().unwrap();
        assert_ne!(card, graph.root());
        assert!(session.history.is_some());
    }

    #[test]
    fn test_oracle_in_english() {
        let options = OracleOptions {
            language: "en".to_string(),
            history_size: 3,
        };
        let graph = build_oracle(deck(2), &options);
        let main_menu = graph.location(graph.root()).unwrap();

        assert_eq!(main_menu.name(), "Main menu");
        assert_eq!(main_menu.labels(), &["Draw a card".to_string(), "About the deck".to_string()]);

        let mut session = SessionState::default();
        let card = graph
            .dispatch(graph.root(), Some("Draw a card"), &mut session)
            .next_location()
            .unwrap();
        let back = graph.dispatch(card, Some("Back to Main menu"), &mut session);
        assert_eq!(back.transition, Transition::To(graph.root()));
        assert_eq!(session.history.unwrap().capacity(), 3);
    }

    #[test]
    fn test_oracle_with_empty_deck_falls_back() {
        let graph = build_oracle(Vec::new(), &OracleOptions::default());
        let mut session = SessionState::default();
        assert_eq!(graph.len(), 1);

        let response = graph.dispatch(graph.root(), Some("Взять карту"), &mut session);
        assert_eq!(response.transition, Transition::To(graph.root()));
        assert_eq!(response.replies[0], Reply::plain(t_lang("retry-notice", ru())));
    }
}
