//! State Machine Runtime
//!
//! Flat state machines for page-level interaction states (menus, panels,
//! accordions). Supports:
//! - Guards (conditional transitions)
//! - Entry/exit actions
//! - Transition actions
//!
//! Actions receive a mutable context (usually the page the machine drives),
//! so every effect bound to a state change runs inside a single
//! [`StateMachine::send`] call. An observer that only sees the context
//! between `send` calls never sees a half-applied transition.

use std::hash::Hash;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Unique identifier for a state machine instance
    pub struct FsmId;
}

/// A guard function that determines if a transition should occur
pub type Guard<C> = Box<dyn Fn(&C) -> bool + Send>;

/// An action function executed during transitions
pub type Action<C> = Box<dyn FnMut(&mut C) + Send>;

/// A transition in the state machine
pub struct Transition<S, E, C: ?Sized> {
    pub from_state: S,
    pub event: E,
    pub to_state: S,
    pub guard: Option<Guard<C>>,
    pub actions: SmallVec<[Action<C>; 2]>,
}

impl<S, E, C: ?Sized> Transition<S, E, C> {
    /// Create a simple transition without guard or actions
    pub fn new(from: S, event: E, to: S) -> Self {
        Self {
            from_state: from,
            event,
            to_state: to,
            guard: None,
            actions: SmallVec::new(),
        }
    }

    /// Add a guard condition
    pub fn with_guard<F: Fn(&C) -> bool + Send + 'static>(mut self, guard: F) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    /// Add an action to execute during transition
    pub fn with_action<F: FnMut(&mut C) + Send + 'static>(mut self, action: F) -> Self {
        self.actions.push(Box::new(action));
        self
    }
}

/// Builder for creating state machines
pub struct StateMachineBuilder<S, E, C: ?Sized> {
    initial_state: S,
    transitions: Vec<Transition<S, E, C>>,
    entry_callbacks: FxHashMap<S, Vec<Action<C>>>,
    exit_callbacks: FxHashMap<S, Vec<Action<C>>>,
}

impl<S, E, C> StateMachineBuilder<S, E, C>
where
    S: Copy + Eq + Hash,
    E: Copy + Eq,
    C: ?Sized,
{
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            transitions: Vec::new(),
            entry_callbacks: FxHashMap::default(),
            exit_callbacks: FxHashMap::default(),
        }
    }

    /// Add a transition
    pub fn transition(mut self, transition: Transition<S, E, C>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add a simple transition (from, event, to)
    pub fn on(mut self, from: S, event: E, to: S) -> Self {
        self.transitions.push(Transition::new(from, event, to));
        self
    }

    /// Add an entry action for a state
    pub fn on_enter<F: FnMut(&mut C) + Send + 'static>(mut self, state: S, action: F) -> Self {
        self.entry_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(action));
        self
    }

    /// Add an exit action for a state
    pub fn on_exit<F: FnMut(&mut C) + Send + 'static>(mut self, state: S, action: F) -> Self {
        self.exit_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(action));
        self
    }

    /// Build the state machine
    pub fn build(self) -> StateMachine<S, E, C> {
        StateMachine {
            current_state: self.initial_state,
            transitions: self.transitions,
            entry_callbacks: self.entry_callbacks,
            exit_callbacks: self.exit_callbacks,
            history: Vec::new(),
        }
    }
}

/// A state machine instance
pub struct StateMachine<S, E, C: ?Sized> {
    current_state: S,
    transitions: Vec<Transition<S, E, C>>,
    entry_callbacks: FxHashMap<S, Vec<Action<C>>>,
    exit_callbacks: FxHashMap<S, Vec<Action<C>>>,
    /// History of state transitions (for debugging)
    history: Vec<(S, E, S)>,
}

impl<S, E, C> StateMachine<S, E, C>
where
    S: Copy + Eq + Hash,
    E: Copy + Eq,
    C: ?Sized,
{
    /// Create a new state machine with an initial state and transitions
    pub fn new(initial_state: S, transitions: Vec<Transition<S, E, C>>) -> Self {
        Self {
            current_state: initial_state,
            transitions,
            entry_callbacks: FxHashMap::default(),
            exit_callbacks: FxHashMap::default(),
            history: Vec::new(),
        }
    }

    /// Create a builder for a state machine
    pub fn builder(initial_state: S) -> StateMachineBuilder<S, E, C> {
        StateMachineBuilder::new(initial_state)
    }

    /// Get the current state
    pub fn current_state(&self) -> S {
        self.current_state
    }

    /// Check if we're in a specific state
    pub fn is_in(&self, state: S) -> bool {
        self.current_state == state
    }

    /// Get transition history
    pub fn history(&self) -> &[(S, E, S)] {
        &self.history
    }

    /// Clear transition history
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn find_transition(&self, event: E, ctx: &C) -> Option<usize> {
        let current = self.current_state;
        self.transitions.iter().position(|t| {
            t.from_state == current
                && t.event == event
                && t.guard.as_ref().map_or(true, |guard| guard(ctx))
        })
    }

    /// Check if an event can trigger a transition from current state
    pub fn can_send(&self, event: E, ctx: &C) -> bool {
        self.find_transition(event, ctx).is_some()
    }

    /// Send an event to the state machine, potentially triggering a transition.
    ///
    /// Exit actions of the current state, the transition's own actions and
    /// the entry actions of the target state all run before this returns.
    pub fn send(&mut self, event: E, ctx: &mut C) -> S {
        let current = self.current_state;

        let Some(idx) = self.find_transition(event, ctx) else {
            return current;
        };

        // Get the target state before executing callbacks
        let to_state = self.transitions[idx].to_state;

        if let Some(callbacks) = self.exit_callbacks.get_mut(&current) {
            for callback in callbacks.iter_mut() {
                callback(ctx);
            }
        }

        for action in self.transitions[idx].actions.iter_mut() {
            action(ctx);
        }

        self.current_state = to_state;
        self.history.push((current, event, to_state));

        if let Some(callbacks) = self.entry_callbacks.get_mut(&to_state) {
            for callback in callbacks.iter_mut() {
                callback(ctx);
            }
        }

        to_state
    }

    /// Register an entry callback for a state
    pub fn on_enter<F: FnMut(&mut C) + Send + 'static>(&mut self, state: S, callback: F) {
        self.entry_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(callback));
    }

    /// Register an exit callback for a state
    pub fn on_exit<F: FnMut(&mut C) + Send + 'static>(&mut self, state: S, callback: F) {
        self.exit_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(callback));
    }
}

/// Runtime that manages several state machines sharing one context type
pub struct FsmRuntime<S, E, C: ?Sized> {
    machines: SlotMap<FsmId, StateMachine<S, E, C>>,
}

impl<S, E, C> FsmRuntime<S, E, C>
where
    S: Copy + Eq + Hash,
    E: Copy + Eq,
    C: ?Sized,
{
    pub fn new() -> Self {
        Self {
            machines: SlotMap::with_key(),
        }
    }

    /// Register a state machine
    pub fn create(&mut self, machine: StateMachine<S, E, C>) -> FsmId {
        self.machines.insert(machine)
    }

    /// Get a reference to a state machine
    pub fn get(&self, id: FsmId) -> Option<&StateMachine<S, E, C>> {
        self.machines.get(id)
    }

    /// Get a mutable reference to a state machine
    pub fn get_mut(&mut self, id: FsmId) -> Option<&mut StateMachine<S, E, C>> {
        self.machines.get_mut(id)
    }

    /// Send an event to a state machine
    pub fn send(&mut self, id: FsmId, event: E, ctx: &mut C) -> Option<S> {
        self.machines.get_mut(id).map(|fsm| fsm.send(event, ctx))
    }

    /// Get current state of a state machine
    pub fn current_state(&self, id: FsmId) -> Option<S> {
        self.machines.get(id).map(|fsm| fsm.current_state())
    }

    /// Iterate over all machines
    pub fn iter(&self) -> impl Iterator<Item = (FsmId, &StateMachine<S, E, C>)> {
        self.machines.iter()
    }

    /// Iterate mutably over all machines
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (FsmId, &mut StateMachine<S, E, C>)> {
        self.machines.iter_mut()
    }

    /// Remove a state machine
    pub fn remove(&mut self, id: FsmId) -> Option<StateMachine<S, E, C>> {
        self.machines.remove(id)
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}

impl<S, E, C> Default for FsmRuntime<S, E, C>
where
    S: Copy + Eq + Hash,
    E: Copy + Eq,
    C: ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Panel {
        Closed,
        Open,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Input {
        Toggle,
        Dismiss,
    }

    /// Stand-in for the page: a log of applied effects.
    #[derive(Default)]
    struct Effects {
        log: Vec<&'static str>,
        enabled: bool,
    }

    fn panel() -> StateMachine<Panel, Input, Effects> {
        StateMachine::builder(Panel::Closed)
            .on(Panel::Closed, Input::Toggle, Panel::Open)
            .on(Panel::Open, Input::Toggle, Panel::Closed)
            .on(Panel::Open, Input::Dismiss, Panel::Closed)
            .on_enter(Panel::Open, |fx: &mut Effects| fx.log.push("enter-open"))
            .on_exit(Panel::Open, |fx: &mut Effects| fx.log.push("exit-open"))
            .build()
    }

    #[test]
    fn test_simple_transitions() {
        let mut fx = Effects::default();
        let mut fsm = panel();

        assert_eq!(fsm.current_state(), Panel::Closed);
        assert_eq!(fsm.send(Input::Toggle, &mut fx), Panel::Open);
        assert_eq!(fsm.send(Input::Toggle, &mut fx), Panel::Closed);
        assert_eq!(fx.log, vec!["enter-open", "exit-open"]);
    }

    #[test]
    fn test_invalid_event_no_transition() {
        let mut fx = Effects::default();
        let mut fsm = panel();

        // Dismiss has no transition out of Closed
        fsm.send(Input::Dismiss, &mut fx);
        assert_eq!(fsm.current_state(), Panel::Closed);
        assert!(fx.log.is_empty());
        assert!(fsm.history().is_empty());
    }

    #[test]
    fn test_guard_reads_context() {
        let mut fsm: StateMachine<Panel, Input, Effects> = StateMachine::builder(Panel::Closed)
            .transition(
                Transition::new(Panel::Closed, Input::Toggle, Panel::Open)
                    .with_guard(|fx: &Effects| fx.enabled),
            )
            .build();

        let mut fx = Effects::default();
        fsm.send(Input::Toggle, &mut fx);
        assert_eq!(fsm.current_state(), Panel::Closed);

        fx.enabled = true;
        assert!(fsm.can_send(Input::Toggle, &fx));
        fsm.send(Input::Toggle, &mut fx);
        assert_eq!(fsm.current_state(), Panel::Open);
    }

    #[test]
    fn test_action_order() {
        let mut fsm: StateMachine<Panel, Input, Effects> = StateMachine::builder(Panel::Closed)
            .transition(
                Transition::new(Panel::Closed, Input::Toggle, Panel::Open)
                    .with_action(|fx: &mut Effects| fx.log.push("action")),
            )
            .on_exit(Panel::Closed, |fx: &mut Effects| fx.log.push("exit-closed"))
            .on_enter(Panel::Open, |fx: &mut Effects| fx.log.push("enter-open"))
            .build();

        let mut fx = Effects::default();
        fsm.send(Input::Toggle, &mut fx);
        assert_eq!(fx.log, vec!["exit-closed", "action", "enter-open"]);
    }

    #[test]
    fn test_history() {
        let mut fx = Effects::default();
        let mut fsm = panel();

        fsm.send(Input::Toggle, &mut fx);
        fsm.send(Input::Dismiss, &mut fx);

        let history = fsm.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], (Panel::Closed, Input::Toggle, Panel::Open));
        assert_eq!(history[1], (Panel::Open, Input::Dismiss, Panel::Closed));

        fsm.clear_history();
        assert!(fsm.history().is_empty());
    }

    #[test]
    fn test_fsm_runtime() {
        let mut fx = Effects::default();
        let mut runtime = FsmRuntime::new();

        let first = runtime.create(panel());
        let second = runtime.create(panel());
        assert_eq!(runtime.len(), 2);

        runtime.send(first, Input::Toggle, &mut fx);
        assert_eq!(runtime.current_state(first), Some(Panel::Open));
        assert_eq!(runtime.current_state(second), Some(Panel::Closed));

        runtime.remove(first);
        assert_eq!(runtime.len(), 1);
        assert_eq!(runtime.current_state(first), None);
    }
}
