use crate::actions::{self, Action};
use crate::effects::{self, Effect, EffectEnv};
use crate::store::Store;
use eframe::egui;
use std::sync::mpsc::{self, Receiver, Sender};

pub struct State {
    pub store: Store,
    action_queue: Vec<Action>,
    effect_queue: Vec<Effect>,
    inbox_tx: Sender<Action>,
    inbox_rx: Receiver<Action>,
}

impl State {
    pub fn new(store: Store) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::channel();
        Self {
            store,
            action_queue: Vec::new(),
            effect_queue: Vec::new(),
            inbox_tx,
            inbox_rx,
        }
    }

    /// Handle for code that produces actions off the UI thread.
    pub fn sender(&self) -> Sender<Action> {
        self.inbox_tx.clone()
    }

    pub fn dispatch(&mut self, action: Action) {
        self.action_queue.push(action);
    }

    /// Move everything that arrived since the last frame onto the queue.
    pub fn poll_inbox(&mut self) {
        self.action_queue.extend(self.inbox_rx.try_iter());
    }

    pub fn flush_actions(&mut self) {
        let actions = std::mem::take(&mut self.action_queue);
        for action in actions {
            let mut effects = actions::update(&mut self.store, action);
            self.effect_queue.append(&mut effects);
        }
    }

    pub fn flush_effects(&mut self, ctx: Option<&egui::Context>) {
        let effects = std::mem::take(&mut self.effect_queue);
        let env = EffectEnv {
            inbox: &self.inbox_tx,
            repaint: ctx,
        };
        for effect in effects {
            effects::run(&mut self.store, &env, effect);
        }
    }
}
