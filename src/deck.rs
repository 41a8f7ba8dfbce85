use log::{debug, info};
use rand::Rng;

use crate::config::DeckConfig;
use crate::gesture::{classify_release, drag_hint, drag_transform, DragHint, DragState, Verdict};
use crate::profiles::{generate_profiles, Profile};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardState {
    Idle,
    Dragging(DragState),
    Committing(Verdict),
    Removed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    profile: Profile,
    state: CardState,
    gestures_bound: bool,
}

impl Card {
    fn new(profile: Profile) -> Self {
        Self {
            profile,
            state: CardState::Idle,
            gestures_bound: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.profile.id
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn state(&self) -> CardState {
        self.state
    }

    pub fn gestures_bound(&self) -> bool {
        self.gestures_bound
    }

    pub fn is_committing(&self) -> bool {
        matches!(self.state, CardState::Committing(_))
    }
}

/// Handle for one scheduled removal. Tickets issued before a reset are stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalTicket {
    serial: u64,
    card_id: String,
    generation: u64,
}

impl RemovalTicket {
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn card_id(&self) -> &str {
        &self.card_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Ignored,
    SnappedBack,
    Committed(RemovalTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    Stale,
    Removed,
    Regenerated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardVisual {
    pub transform: String,
    pub transition: String,
    pub opacity: f64,
}

impl CardVisual {
    pub fn style(&self) -> String {
        format!(
            "transform: {}; transition: {}; opacity: {};",
            self.transform, self.transition, self.opacity
        )
    }
}

/// Owns the visible stack of cards. The last card is the topmost one and the
/// only one that takes gestures or commits.
#[derive(Debug)]
pub struct DeckController {
    config: DeckConfig,
    cards: Vec<Card>,
    generation: u64,
    batches: u64,
    next_serial: u64,
}

impl DeckController {
    pub fn new(config: DeckConfig, rng: &mut impl Rng) -> Self {
        let mut deck = Self {
            config: config.sanitized(),
            cards: Vec::new(),
            generation: 0,
            batches: 0,
            next_serial: 0,
        };
        deck.reset(rng);
        deck
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// True while a card is playing its exit animation.
    pub fn is_busy(&self) -> bool {
        self.cards.iter().any(Card::is_committing)
    }

    pub fn top(&self) -> Option<&Card> {
        self.cards.last()
    }

    fn top_mut(&mut self) -> Option<&mut Card> {
        self.cards.last_mut()
    }

    /// Deals a fresh batch. Every outstanding removal ticket becomes stale.
    pub fn reset(&mut self, rng: &mut impl Rng) {
        self.generation += 1;
        self.cards = generate_profiles(self.config.batch_shape(), self.batches, rng)
            .into_iter()
            .map(Card::new)
            .collect();
        self.batches += 1;
        info!(
            "Dealt {} profiles (generation {})",
            self.cards.len(),
            self.generation
        );
        self.bind_top();
    }

    /// Marks a card as taking gesture input. Returns false when it already was.
    pub fn bind_gestures(&mut self, card_id: &str) -> bool {
        let Some(card) = self
            .cards
            .iter_mut()
            .find(|card| card.id() == card_id && card.state != CardState::Removed)
        else {
            return false;
        };
        if card.gestures_bound {
            return false;
        }
        card.gestures_bound = true;
        true
    }

    fn bind_top(&mut self) -> bool {
        match self.top().map(|card| card.id().to_owned()) {
            Some(id) => self.bind_gestures(&id),
            None => false,
        }
    }

    pub fn is_bound(&self, card_id: &str) -> bool {
        self.cards
            .iter()
            .any(|card| card.id() == card_id && card.gestures_bound)
    }

    pub fn pointer_down(&mut self, card_id: &str, pointer_id: i32, x: f64, y: f64) -> bool {
        let Some(card) = self.top_mut() else {
            return false;
        };
        if card.id() != card_id || !card.gestures_bound || card.state != CardState::Idle {
            return false;
        }
        card.state = CardState::Dragging(DragState::new(pointer_id, x, y));
        true
    }

    pub fn pointer_move(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        match self.top_mut().map(|card| &mut card.state) {
            Some(CardState::Dragging(drag)) if drag.pointer_id == pointer_id => {
                drag.track(x, y);
                true
            }
            _ => false,
        }
    }

    pub fn pointer_up(&mut self, pointer_id: i32, x: f64, y: f64) -> ReleaseOutcome {
        let threshold = self.config.threshold_px;
        let Some(card) = self.top_mut() else {
            return ReleaseOutcome::Ignored;
        };
        let CardState::Dragging(mut drag) = card.state else {
            return ReleaseOutcome::Ignored;
        };
        if drag.pointer_id != pointer_id {
            return ReleaseOutcome::Ignored;
        }

        drag.track(x, y);
        card.state = CardState::Idle;
        let (dx, dy) = drag.delta();

        match classify_release(dx, dy, threshold) {
            Some(verdict) => match self.commit(verdict) {
                Some(ticket) => ReleaseOutcome::Committed(ticket),
                None => ReleaseOutcome::Ignored,
            },
            None => ReleaseOutcome::SnappedBack,
        }
    }

    pub fn pointer_cancel(&mut self, pointer_id: i32) -> bool {
        let Some(card) = self.top_mut() else {
            return false;
        };
        match card.state {
            CardState::Dragging(drag) if drag.pointer_id == pointer_id => {
                card.state = CardState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Starts the exit of the topmost card. A card that is already on its way
    /// out yields no second ticket.
    pub fn commit(&mut self, verdict: Verdict) -> Option<RemovalTicket> {
        let generation = self.generation;
        let serial = self.next_serial;
        let card = self.top_mut()?;

        match card.state {
            CardState::Committing(_) | CardState::Removed => {
                debug!("Ignoring {:?} on {}: already leaving", verdict, card.id());
                None
            }
            CardState::Idle | CardState::Dragging(_) => {
                card.state = CardState::Committing(verdict);
                let ticket = RemovalTicket {
                    serial,
                    card_id: card.id().to_owned(),
                    generation,
                };
                debug!("Committed {:?} on {}", verdict, ticket.card_id);
                self.next_serial += 1;
                Some(ticket)
            }
        }
    }

    pub fn is_pending(&self, ticket: &RemovalTicket) -> bool {
        self.pending_position(ticket).is_some()
    }

    fn pending_position(&self, ticket: &RemovalTicket) -> Option<usize> {
        if ticket.generation != self.generation {
            return None;
        }
        self.cards
            .iter()
            .position(|card| card.id() == ticket.card_id && card.is_committing())
    }

    /// Runs once the exit animation has had time to finish.
    pub fn complete_removal(
        &mut self,
        ticket: &RemovalTicket,
        rng: &mut impl Rng,
    ) -> RemovalOutcome {
        let Some(position) = self.pending_position(ticket) else {
            debug!("Dropping stale removal for {}", ticket.card_id);
            return RemovalOutcome::Stale;
        };

        let mut card = self.cards.remove(position);
        card.state = CardState::Removed;
        debug!("Removed {} ({} left)", card.id(), self.cards.len());

        if self.cards.is_empty() {
            self.reset(rng);
            return RemovalOutcome::Regenerated;
        }
        self.bind_top();
        RemovalOutcome::Removed
    }

    /// Shows the next photo of the topmost card.
    pub fn cycle_photo(&mut self) -> Option<usize> {
        let card = self.top_mut()?;
        if card.state == CardState::Removed {
            return None;
        }
        Some(card.profile.next_photo())
    }

    pub fn drag_hint(&self) -> Option<DragHint> {
        match self.top()?.state {
            CardState::Dragging(drag) => {
                let (dx, dy) = drag.delta();
                drag_hint(dx, dy, self.config.threshold_px)
            }
            _ => None,
        }
    }

    pub fn card_visual(&self, card: &Card) -> CardVisual {
        let config = &self.config;
        match card.state {
            CardState::Idle => CardVisual {
                transform: "none".to_owned(),
                transition: format!("transform {}ms ease", config.snap_back_ms),
                opacity: 1.0,
            },
            CardState::Dragging(drag) => {
                let (dx, dy) = drag.delta();
                CardVisual {
                    transform: drag_transform(dx, dy, config.rotation_divisor),
                    transition: "none".to_owned(),
                    opacity: 1.0,
                }
            }
            CardState::Committing(verdict) => CardVisual {
                transform: verdict.exit_transform().to_owned(),
                transition: format!(
                    "transform {ms}ms ease, opacity {ms}ms ease",
                    ms = config.exit_ms
                ),
                opacity: 0.0,
            },
            CardState::Removed => CardVisual {
                transform: "none".to_owned(),
                transition: "none".to_owned(),
                opacity: 0.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn deck_with(batch_size: usize) -> (DeckController, StdRng) {
        let mut rng = StdRng::seed_from_u64(1234);
        let config = DeckConfig {
            batch_size,
            ..DeckConfig::default()
        };
        (DeckController::new(config, &mut rng), rng)
    }

    fn top_id(deck: &DeckController) -> String {
        deck.top().unwrap().id().to_owned()
    }

    fn drag(deck: &mut DeckController, dx: f64, dy: f64) -> ReleaseOutcome {
        let id = top_id(deck);
        assert!(deck.pointer_down(&id, 1, 200.0, 300.0));
        assert!(deck.pointer_move(1, 200.0 + dx / 2.0, 300.0 + dy / 2.0));
        deck.pointer_up(1, 200.0 + dx, 300.0 + dy)
    }

    fn committed_verdict(deck: &DeckController) -> Option<Verdict> {
        match deck.top()?.state() {
            CardState::Committing(verdict) => Some(verdict),
            _ => None,
        }
    }

    #[test]
    fn new_deck_binds_only_the_top_card() {
        let (deck, _) = deck_with(12);
        assert_eq!(deck.len(), 12);
        let bound: Vec<_> = deck.cards().iter().filter(|c| c.gestures_bound()).collect();
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].id(), deck.top().unwrap().id());
    }

    #[test]
    fn drags_past_threshold_commit() {
        let cases = [
            ((-120.0, 0.0), Verdict::Reject),
            ((120.0, 0.0), Verdict::Accept),
            ((0.0, -120.0), Verdict::SuperLike),
            ((60.0, -120.0), Verdict::SuperLike),
            ((-120.0, -120.0), Verdict::Reject),
        ];
        for ((dx, dy), expected) in cases {
            let (mut deck, _) = deck_with(4);
            let id = top_id(&deck);
            match drag(&mut deck, dx, dy) {
                ReleaseOutcome::Committed(ticket) => assert_eq!(ticket.card_id(), id),
                other => panic!("expected commit for ({dx}, {dy}), got {other:?}"),
            }
            assert_eq!(committed_verdict(&deck), Some(expected));
        }
    }

    #[test]
    fn short_drag_snaps_back() {
        let (mut deck, _) = deck_with(4);
        assert_eq!(drag(&mut deck, 50.0, -50.0), ReleaseOutcome::SnappedBack);

        let top = deck.top().unwrap();
        assert_eq!(top.state(), CardState::Idle);
        let visual = deck.card_visual(top);
        assert_eq!(visual.transform, "none");
        assert_eq!(visual.transition, "transform 200ms ease");
        assert_eq!(deck.len(), 4);
    }

    #[test]
    fn dragging_suspends_transition_and_rotates() {
        let (mut deck, _) = deck_with(2);
        let id = top_id(&deck);
        deck.pointer_down(&id, 3, 10.0, 10.0);
        deck.pointer_move(3, 50.0, 0.0);

        let visual = deck.card_visual(deck.top().unwrap());
        assert_eq!(visual.transition, "none");
        assert_eq!(visual.transform, "translate(40.0px, -10.0px) rotate(2.00deg)");
        assert_eq!(deck.drag_hint().unwrap().verdict, Verdict::Accept);
    }

    #[test]
    fn pointer_cancel_returns_to_idle() {
        let (mut deck, _) = deck_with(2);
        let id = top_id(&deck);
        deck.pointer_down(&id, 1, 0.0, 0.0);
        deck.pointer_move(1, -300.0, 0.0);
        assert!(deck.pointer_cancel(1));
        assert_eq!(deck.top().unwrap().state(), CardState::Idle);
        assert_eq!(deck.pointer_up(1, -300.0, 0.0), ReleaseOutcome::Ignored);
    }

    #[test]
    fn other_pointers_and_cards_are_ignored() {
        let (mut deck, _) = deck_with(3);
        let below = deck.cards()[0].id().to_owned();
        assert!(!deck.pointer_down(&below, 1, 0.0, 0.0));

        let id = top_id(&deck);
        assert!(deck.pointer_down(&id, 1, 0.0, 0.0));
        assert!(!deck.pointer_down(&id, 2, 0.0, 0.0));
        assert!(!deck.pointer_move(2, 500.0, 0.0));
        assert_eq!(deck.pointer_up(2, 500.0, 0.0), ReleaseOutcome::Ignored);
        assert_eq!(deck.pointer_up(1, 0.0, 0.0), ReleaseOutcome::SnappedBack);
    }

    #[test]
    fn double_accept_removes_one_profile() {
        let (mut deck, mut rng) = deck_with(5);
        let first = deck.commit(Verdict::Accept).unwrap();
        assert_eq!(deck.commit(Verdict::Accept), None);
        let id = top_id(&deck);
        assert!(!deck.pointer_down(&id, 1, 0.0, 0.0));

        assert_eq!(deck.complete_removal(&first, &mut rng), RemovalOutcome::Removed);
        assert_eq!(deck.complete_removal(&first, &mut rng), RemovalOutcome::Stale);
        assert_eq!(deck.len(), 4);
    }

    #[test]
    fn committing_card_fades_out() {
        let (mut deck, _) = deck_with(2);
        deck.commit(Verdict::Reject).unwrap();
        let visual = deck.card_visual(deck.top().unwrap());
        assert_eq!(visual.transform, "translateX(-120%) rotate(-12deg)");
        assert_eq!(visual.transition, "transform 250ms ease, opacity 250ms ease");
        assert_eq!(visual.opacity, 0.0);
    }

    #[test]
    fn removal_binds_next_card_once() {
        let (mut deck, mut rng) = deck_with(3);
        let next = deck.cards()[1].id().to_owned();
        assert!(!deck.is_bound(&next));

        let ticket = deck.commit(Verdict::Reject).unwrap();
        deck.complete_removal(&ticket, &mut rng);

        assert_eq!(top_id(&deck), next);
        assert!(deck.is_bound(&next));
        assert!(!deck.bind_gestures(&next));
        assert_eq!(deck.cards().iter().filter(|c| c.gestures_bound()).count(), 1);

        assert!(matches!(drag(&mut deck, 120.0, 0.0), ReleaseOutcome::Committed(_)));
        assert_eq!(deck.commit(Verdict::Accept), None);
    }

    #[test]
    fn emptied_deck_regenerates_full_batch() {
        let (mut deck, mut rng) = deck_with(2);
        let old_ids: Vec<String> = deck.cards().iter().map(|c| c.id().to_owned()).collect();

        let ticket = deck.commit(Verdict::Accept).unwrap();
        assert_eq!(deck.complete_removal(&ticket, &mut rng), RemovalOutcome::Removed);
        let ticket = deck.commit(Verdict::SuperLike).unwrap();
        assert_eq!(deck.complete_removal(&ticket, &mut rng), RemovalOutcome::Regenerated);

        assert_eq!(deck.len(), 2);
        assert!(deck.cards().iter().all(|c| !old_ids.contains(&c.id().to_owned())));
        assert!(deck.top().unwrap().gestures_bound());
    }

    #[test]
    fn reset_invalidates_pending_removal() {
        let (mut deck, mut rng) = deck_with(3);
        assert!(!deck.is_busy());
        let ticket = deck.commit(Verdict::Reject).unwrap();
        assert!(deck.is_pending(&ticket));
        assert!(deck.is_busy());

        deck.reset(&mut rng);
        assert!(!deck.is_pending(&ticket));
        assert!(!deck.is_busy());
        assert_eq!(deck.complete_removal(&ticket, &mut rng), RemovalOutcome::Stale);
        assert_eq!(deck.len(), 3);
    }

    #[test]
    fn photo_cycle_touches_only_the_top_photo() {
        let (mut deck, _) = deck_with(3);
        let order: Vec<String> = deck.cards().iter().map(|c| c.id().to_owned()).collect();
        let count = deck.top().unwrap().profile().photos.len();

        for step in 1..=count + 1 {
            let index = deck.cycle_photo().unwrap();
            assert_eq!(index, step % count);
        }
        let after: Vec<String> = deck.cards().iter().map(|c| c.id().to_owned()).collect();
        assert_eq!(order, after);
        assert_eq!(deck.top().unwrap().state(), CardState::Idle);
        assert_eq!(deck.cards()[0].profile().photo_index(), 0);
    }

    #[test]
    fn empty_deck_operations_are_no_ops() {
        let (mut deck, _) = deck_with(1);
        deck.cards.clear();

        assert_eq!(deck.commit(Verdict::Accept), None);
        assert_eq!(deck.cycle_photo(), None);
        assert_eq!(deck.pointer_up(1, 0.0, 0.0), ReleaseOutcome::Ignored);
        assert!(!deck.pointer_cancel(1));
        assert!(deck.drag_hint().is_none());
    }
}
