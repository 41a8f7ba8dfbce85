pub mod config;
pub mod deck;
pub mod gesture;
pub mod profiles;

use config::load_config;
use deck::{Card, CardVisual, DeckController, ReleaseOutcome, RemovalOutcome, RemovalTicket};
use gesture::{DragHint, Verdict};
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::JsCast;
use yew::prelude::*;

type SharedDeck = Rc<RefCell<DeckController>>;
type PendingRemovals = Rc<RefCell<HashMap<u64, (RemovalTicket, Timeout)>>>;

#[derive(Clone)]
struct CardHandlers {
    pointer_down: Callback<web_sys::PointerEvent>,
    pointer_move: Callback<web_sys::PointerEvent>,
    pointer_up: Callback<web_sys::PointerEvent>,
    pointer_cancel: Callback<web_sys::PointerEvent>,
    double_click: Callback<web_sys::MouseEvent>,
}

#[function_component(App)]
fn app() -> Html {
    let deck: SharedDeck =
        use_mut_ref(|| DeckController::new(load_config(), &mut rand::thread_rng()));
    let pending: PendingRemovals = use_mut_ref(HashMap::new);
    let redraw = use_force_update();

    let on_commit = {
        let deck = deck.clone();
        let pending = pending.clone();
        let redraw = redraw.clone();

        Callback::from(move |verdict: Verdict| {
            let ticket = deck.borrow_mut().commit(verdict);
            if let Some(ticket) = ticket {
                schedule_removal(ticket, &deck, &pending, &redraw);
                redraw.force_update();
            }
        })
    };

    let on_shuffle = {
        let deck = deck.clone();
        let pending = pending.clone();
        let redraw = redraw.clone();

        Callback::from(move |_: MouseEvent| {
            pending.borrow_mut().clear();
            deck.borrow_mut().reset(&mut rand::thread_rng());
            redraw.force_update();
        })
    };

    let nope_click = {
        let on_commit = on_commit.clone();
        Callback::from(move |_: MouseEvent| on_commit.emit(Verdict::Reject))
    };
    let super_like_click = {
        let on_commit = on_commit.clone();
        Callback::from(move |_: MouseEvent| on_commit.emit(Verdict::SuperLike))
    };
    let like_click = {
        let on_commit = on_commit.clone();
        Callback::from(move |_: MouseEvent| on_commit.emit(Verdict::Accept))
    };

    let current = deck.borrow();
    let handlers = current
        .top()
        .filter(|card| card.gestures_bound())
        .map(|card| card_handlers(card.id(), &deck, &pending, &redraw));

    let cards = current.cards().iter().map(|card| {
        let is_top = handlers.is_some() && current.top().map(Card::id) == Some(card.id());
        let hint = if is_top { current.drag_hint() } else { None };
        render_card(
            card,
            current.card_visual(card),
            hint,
            if is_top { handlers.as_ref() } else { None },
        )
    });

    html! {
        <div class="app-container">
            <header class="app-header">
                <h1>{ "Swipe Deck" }</h1>
                <button class="shuffle-button" onclick={on_shuffle}>{ "Shuffle" }</button>
            </header>
            <main class="content single-column">
                <section class="deck" aria-busy={ if current.is_busy() { "true" } else { "false" } }>
                    { for cards }
                </section>
                <div class="controls">
                    <button class="control nope" aria-label="Nope" onclick={nope_click}>{ "✕" }</button>
                    <button class="control super-like" aria-label="Super like" onclick={super_like_click}>{ "★" }</button>
                    <button class="control like" aria-label="Like" onclick={like_click}>{ "♥" }</button>
                </div>
            </main>
        </div>
    }
}

fn card_handlers(
    card_id: &str,
    deck: &SharedDeck,
    pending: &PendingRemovals,
    redraw: &UseForceUpdateHandle,
) -> CardHandlers {
    let pointer_down = {
        let deck = deck.clone();
        let redraw = redraw.clone();
        let card_id = card_id.to_owned();

        Callback::from(move |event: web_sys::PointerEvent| {
            let started = deck.borrow_mut().pointer_down(
                &card_id,
                event.pointer_id(),
                event.client_x() as f64,
                event.client_y() as f64,
            );
            if started {
                if let Some(target) = event
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                {
                    let _ = target.set_pointer_capture(event.pointer_id());
                }
                redraw.force_update();
            }
        })
    };

    let pointer_move = {
        let deck = deck.clone();
        let redraw = redraw.clone();

        Callback::from(move |event: web_sys::PointerEvent| {
            let moved = deck.borrow_mut().pointer_move(
                event.pointer_id(),
                event.client_x() as f64,
                event.client_y() as f64,
            );
            if moved {
                event.prevent_default();
                redraw.force_update();
            }
        })
    };

    let pointer_up = {
        let deck = deck.clone();
        let pending = pending.clone();
        let redraw = redraw.clone();

        Callback::from(move |event: web_sys::PointerEvent| {
            let outcome = deck.borrow_mut().pointer_up(
                event.pointer_id(),
                event.client_x() as f64,
                event.client_y() as f64,
            );
            if outcome == ReleaseOutcome::Ignored {
                return;
            }
            release_capture(&event);
            if let ReleaseOutcome::Committed(ticket) = outcome {
                schedule_removal(ticket, &deck, &pending, &redraw);
            }
            redraw.force_update();
        })
    };

    let pointer_cancel = {
        let deck = deck.clone();
        let redraw = redraw.clone();

        Callback::from(move |event: web_sys::PointerEvent| {
            let cancelled = deck.borrow_mut().pointer_cancel(event.pointer_id());
            if cancelled {
                release_capture(&event);
                redraw.force_update();
            }
        })
    };

    let double_click = {
        let deck = deck.clone();
        let redraw = redraw.clone();

        Callback::from(move |_: web_sys::MouseEvent| {
            let cycled = deck.borrow_mut().cycle_photo();
            if cycled.is_some() {
                redraw.force_update();
            }
        })
    };

    CardHandlers {
        pointer_down,
        pointer_move,
        pointer_up,
        pointer_cancel,
        double_click,
    }
}

fn release_capture(event: &web_sys::PointerEvent) {
    if let Some(target) = event
        .target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
    {
        let _ = target.release_pointer_capture(event.pointer_id());
    }
}

/// Removes the card once its exit animation has run. Dropping the stored
/// `Timeout` cancels it, which is how shuffle discards in-flight removals.
fn schedule_removal(
    ticket: RemovalTicket,
    deck: &SharedDeck,
    pending: &PendingRemovals,
    redraw: &UseForceUpdateHandle,
) {
    let delay = deck.borrow().config().removal_delay_ms;

    {
        let current = deck.borrow();
        pending
            .borrow_mut()
            .retain(|_, (queued, _)| current.is_pending(queued));
    }

    let timeout = {
        let deck = deck.clone();
        let redraw = redraw.clone();
        let ticket = ticket.clone();

        Timeout::new(delay, move || {
            let outcome = deck
                .borrow_mut()
                .complete_removal(&ticket, &mut rand::thread_rng());
            if outcome != RemovalOutcome::Stale {
                redraw.force_update();
            }
        })
    };

    pending
        .borrow_mut()
        .insert(ticket.serial(), (ticket, timeout));
}

fn render_card(
    card: &Card,
    visual: CardVisual,
    hint: Option<DragHint>,
    handlers: Option<&CardHandlers>,
) -> Html {
    let profile = card.profile();
    let classes = classes!(
        "card",
        handlers.map(|_| "card--top"),
        card.is_committing().then_some("card--leaving")
    );

    let stamp = match hint {
        Some(hint) => html! {
            <span class={classes!("card__stamp", hint.verdict.css_class())}
                style={format!("opacity: {:.2};", hint.strength)}>
                { hint.verdict.stamp() }
            </span>
        },
        None => html! {},
    };

    html! {
        <article key={card.id().to_owned()}
            class={classes}
            style={visual.style()}
            onpointerdown={handlers.map(|h| h.pointer_down.clone())}
            onpointermove={handlers.map(|h| h.pointer_move.clone())}
            onpointerup={handlers.map(|h| h.pointer_up.clone())}
            onpointercancel={handlers.map(|h| h.pointer_cancel.clone())}
            ondblclick={handlers.map(|h| h.double_click.clone())}>
            <img class="card__media"
                src={profile.current_photo().to_owned()}
                alt={profile.photo_alt()}
                draggable="false" />
            { stamp }
            <div class="card__body">
                <div class="title-row">
                    <h2 class="card__title">{ &profile.name }</h2>
                    <span class="card__age">{ profile.age.to_string() }</span>
                </div>
                <div class="card__meta">{ profile.meta_line() }</div>
                <p class="card__bio">{ &profile.bio }</p>
                <div class="card__chips">
                    { for profile.tags.iter().map(|tag| html! { <span class="chip">{ tag }</span> }) }
                </div>
            </div>
        </article>
    }
}

#[wasm_bindgen(start)]
pub fn run_app() {
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
