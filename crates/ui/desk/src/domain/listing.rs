//! Live search over the opportunity cards.

use portal::Opportunity;

/// Anything with a title and a description can be filtered.
pub trait Searchable {
    fn title(&self) -> &str;
    fn description(&self) -> &str;
}

impl Searchable for Opportunity {
    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Case-insensitive substring filter. The term is stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    term: String,
}

impl ListFilter {
    pub fn new(term: &str) -> Self {
        Self {
            term: term.to_lowercase(),
        }
    }

    pub fn set_term(&mut self, raw: &str) {
        self.term = raw.to_lowercase();
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn matches<T: Searchable>(&self, card: &T) -> bool {
        self.term.is_empty()
            || card.title().to_lowercase().contains(&self.term)
            || card.description().to_lowercase().contains(&self.term)
    }

    /// One flag per card, same order.
    pub fn visibility<T: Searchable>(&self, cards: &[T]) -> Vec<bool> {
        cards.iter().map(|c| self.matches(c)).collect()
    }

    pub fn visible<'a, T: Searchable>(&'a self, cards: &'a [T]) -> impl Iterator<Item = &'a T> + 'a {
        cards.iter().filter(move |c| self.matches(*c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Card(&'static str, &'static str);

    impl Searchable for Card {
        fn title(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            self.1
        }
    }

    fn cards() -> Vec<Card> {
        vec![
            Card("Beach Cleanup", "Pick up litter"),
            Card("Food Bank", "Help clean the shore afterwards"),
            Card("Tutoring", "Math for kids"),
        ]
    }

    #[test]
    fn matches_title_or_description_ignoring_case() {
        let filter = ListFilter::new("CLEAN");
        assert_eq!(filter.visibility(&cards()), vec![true, true, false]);
    }

    #[test]
    fn empty_term_shows_everything() {
        let filter = ListFilter::default();
        assert_eq!(filter.visible(&cards()).count(), 3);
    }

    #[test]
    fn recomputes_on_every_term_change() {
        let cards = cards();
        let mut filter = ListFilter::default();
        filter.set_term("m");
        assert_eq!(filter.visibility(&cards), vec![false, false, true]);
        filter.set_term("");
        assert_eq!(filter.visibility(&cards), vec![true, true, true]);
        filter.set_term("xyz");
        assert!(filter.visible(&cards).next().is_none());
    }
}
