//! Coordinator → UI event queue.
//!
//! Single-threaded (WASM): the coordinator pushes from async continuations,
//! the UI drains once per frame. An optional wake hook lets the UI request a
//! repaint the moment a network response lands instead of on the next input.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use agristar_types::event::ChatEvent;

type WakeHook = Box<dyn Fn()>;

#[derive(Default)]
struct Inner {
    queue: VecDeque<ChatEvent>,
    wake: Option<WakeHook>,
}

/// Shared event bus — clone-cheap via Rc.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<Inner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the callback run after every emit (egui: `ctx.request_repaint`).
    pub fn set_wake_hook(&self, hook: impl Fn() + 'static) {
        self.inner.borrow_mut().wake = Some(Box::new(hook));
    }

    pub fn emit(&self, event: ChatEvent) {
        let mut inner = self.inner.borrow_mut();
        inner.queue.push_back(event);
        if let Some(wake) = &inner.wake {
            wake();
        }
    }

    /// Take every pending event in emission order.
    pub fn drain(&self) -> Vec<ChatEvent> {
        self.inner.borrow_mut().queue.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
