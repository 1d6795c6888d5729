//! Callbacks deferred until the application is initialized.

use super::Application;
use std::cell::RefCell;
use std::collections::VecDeque;

pub type ReadyCallback = Box<dyn FnOnce(&Application)>;

/// FIFO of callbacks waiting for the `Init` event.
///
/// Callers go through [`Application::on_ready`], which bypasses the queue
/// once the application is initialized.
#[derive(Default)]
pub struct ReadyQueue {
    pending: RefCell<VecDeque<ReadyCallback>>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, callback: ReadyCallback) {
        self.pending.borrow_mut().push_back(callback);
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Run every queued callback in enqueue order, each exactly once.
    pub(crate) fn flush(&self, app: &Application) {
        loop {
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(callback) => callback(app),
                None => break,
            }
        }
    }
}
