use crate::model::Place;

/// Shortest trimmed query that is sent to the geocoder, in characters.
pub const MIN_QUERY_LEN: usize = 2;
/// Most matches requested per lookup.
pub const MAX_SUGGESTIONS: usize = 5;

/// Sequence number of an outgoing request. Only the newest is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticket(pub u64);

/// Hands out tickets and remembers the newest one.
#[derive(Debug, Default, Clone)]
pub struct Sequencer {
    latest: u64,
}

impl Sequencer {
    pub fn next(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    /// Query too short: suggestions were cleared, nothing to send.
    Cleared,
    Lookup { ticket: Ticket, query: String },
}

/// Search box state: the current suggestions and the lookup sequence.
#[derive(Debug, Default, Clone)]
pub struct Autocomplete {
    input: String,
    suggestions: Vec<Place>,
    selected: usize,
    sequence: Sequencer,
}

impl Autocomplete {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn suggestions(&self) -> &[Place] {
        &self.suggestions
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn labels(&self) -> Vec<String> {
        self.suggestions.iter().map(Place::label).collect()
    }

    /// React to an edit of the search input.
    pub fn on_input(&mut self, text: &str) -> SearchAction {
        self.input = text.to_string();
        let query = text.trim();

        if query.chars().count() < MIN_QUERY_LEN {
            self.clear();
            // Invalidate any lookup still in flight.
            self.sequence.next();
            return SearchAction::Cleared;
        }

        self.suggestions.clear();
        self.selected = 0;
        SearchAction::Lookup { ticket: self.sequence.next(), query: query.to_string() }
    }

    /// Accept lookup results. Returns `false` when they belong to a
    /// superseded query and were dropped.
    pub fn on_results(&mut self, ticket: Ticket, places: Vec<Place>) -> bool {
        if !self.sequence.is_current(ticket) {
            tracing::debug!("Dropping stale suggestions for {ticket:?}");
            return false;
        }
        self.suggestions = places.into_iter().take(MAX_SUGGESTIONS).collect();
        self.selected = 0;
        true
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.suggestions.is_empty() {
            return;
        }
        let len = self.suggestions.len() as isize;
        self.selected = (self.selected as isize + delta).rem_euclid(len) as usize;
    }

    /// Take the chosen place. The suggestion list is cleared and the input
    /// shows the place name.
    pub fn select(&mut self, index: usize) -> Option<Place> {
        let place = self.suggestions.get(index).cloned()?;
        self.clear();
        self.input = place.name.clone();
        Some(place)
    }

    pub fn clear(&mut self) {
        self.suggestions.clear();
        self.selected = 0;
    }
}
