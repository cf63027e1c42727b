//! FAQ accordion
//!
//! One state machine per item. Opening an item collapses every other item
//! first, so at most one is expanded at any time.

use serde::Serialize;
use vela_core::{ElementId, FsmId, FsmRuntime, KeyCode, PageEvent, StateMachine};
use vela_platform::Page;

use crate::config::{self, FaqConfig};

const ACTIVE: &str = "active";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FaqState {
    Collapsed,
    Expanded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FaqInput {
    Toggle,
    Collapse,
}

struct FaqItem {
    item: ElementId,
    question: ElementId,
    fsm: FsmId,
}

pub struct FaqAccordion<P: Page + 'static> {
    machines: FsmRuntime<FaqState, FaqInput, P>,
    items: Vec<FaqItem>,
}

impl<P: Page + 'static> FaqAccordion<P> {
    /// Wire every item that has both a question and an answer
    pub fn init(page: &mut P, config: &FaqConfig) -> Option<Self> {
        let items = config::compile(&config.items, "faq")?;
        let question = config::compile(&config.question, "faq")?;
        let answer = config::compile(&config.answer, "faq")?;

        let mut accordion = Self {
            machines: FsmRuntime::new(),
            items: Vec::new(),
        };
        for item in page.query_all(&items) {
            let q = page.query_within(item, &question).first().copied();
            let a = page.query_within(item, &answer).first().copied();
            let (Some(q), Some(a)) = (q, a) else {
                tracing::debug!(?item, "faq: item without question or answer");
                continue;
            };
            page.set_attribute(q, "tabindex", "0");

            // Markup may mark several items active; the first one wins
            let expanded = page.has_class(item, ACTIVE) && accordion.open_index().is_none();
            show(page, item, a, expanded);
            let initial = if expanded {
                FaqState::Expanded
            } else {
                FaqState::Collapsed
            };
            let machine = StateMachine::builder(initial)
                .on(FaqState::Collapsed, FaqInput::Toggle, FaqState::Expanded)
                .on(FaqState::Expanded, FaqInput::Toggle, FaqState::Collapsed)
                .on(FaqState::Expanded, FaqInput::Collapse, FaqState::Collapsed)
                .on_enter(FaqState::Expanded, move |page: &mut P| show(page, item, a, true))
                .on_enter(FaqState::Collapsed, move |page: &mut P| show(page, item, a, false))
                .build();

            accordion.items.push(FaqItem {
                item,
                question: q,
                fsm: accordion.machines.create(machine),
            });
        }

        if accordion.items.is_empty() {
            tracing::debug!("faq: no items");
            return None;
        }
        tracing::debug!(items = accordion.items.len(), "faq: wired");
        Some(accordion)
    }

    /// Toggle the item at `index`, collapsing all others
    pub fn toggle(&mut self, page: &mut P, index: usize) -> Option<FaqState> {
        let fsm = self.items.get(index)?.fsm;
        for other in &self.items {
            if other.fsm != fsm {
                self.machines.send(other.fsm, FaqInput::Collapse, page);
            }
        }
        let state = self.machines.send(fsm, FaqInput::Toggle, page)?;
        tracing::trace!(index, ?state, "faq: toggled");
        Some(state)
    }

    fn question_index(&self, page: &P, target: ElementId) -> Option<usize> {
        self.items
            .iter()
            .position(|it| page.contains(it.question, target))
    }

    pub fn handle_click(&mut self, page: &mut P, event: &PageEvent) -> bool {
        let Some(index) = event.target.and_then(|t| self.question_index(page, t)) else {
            return false;
        };
        self.toggle(page, index);
        true
    }

    /// `Enter` or `Space` on a question toggles it
    pub fn handle_key(&mut self, page: &mut P, event: &mut PageEvent) -> bool {
        if !matches!(event.key(), Some(KeyCode::ENTER | KeyCode::SPACE)) {
            return false;
        }
        let Some(index) = event.target.and_then(|t| self.question_index(page, t)) else {
            return false;
        };
        event.prevent_default();
        self.toggle(page, index);
        true
    }

    pub fn state(&self, index: usize) -> Option<FaqState> {
        self.machines.current_state(self.items.get(index)?.fsm)
    }

    /// Position of the expanded item, if any
    pub fn open_index(&self) -> Option<usize> {
        self.items
            .iter()
            .position(|it| self.machines.current_state(it.fsm) == Some(FaqState::Expanded))
    }

    /// The expanded item, if any
    pub fn open_item(&self) -> Option<ElementId> {
        self.open_index().map(|i| self.items[i].item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn show<P: Page + ?Sized>(page: &mut P, item: ElementId, answer: ElementId, expanded: bool) {
    if expanded {
        page.add_class(item, ACTIVE);
        page.set_style(answer, "display", "block");
    } else {
        page.remove_class(item, ACTIVE);
        page.set_style(answer, "display", "none");
    }
}
