//! Runner combinators

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use super::AnimationRunner;

/// Continuation-style step: receives the callback to report its outcome
pub type ChainStep = Box<dyn FnOnce(Box<dyn FnOnce(bool)>)>;

impl AnimationRunner {
    /// Report `true` once every runner completed, or `false` as soon as one
    /// is cancelled. Pending members are left running.
    pub fn all(runners: &[AnimationRunner], callback: impl FnOnce(bool) + 'static) {
        if runners.is_empty() {
            callback(true);
            return;
        }

        let remaining = Rc::new(Cell::new(runners.len()));
        let callback: Rc<RefCell<Option<Box<dyn FnOnce(bool)>>>> =
            Rc::new(RefCell::new(Some(Box::new(callback))));

        for runner in runners {
            let remaining = Rc::clone(&remaining);
            let callback = Rc::clone(&callback);
            runner.done(move |status| {
                remaining.set(remaining.get() - 1);
                if !status || remaining.get() == 0 {
                    let pending = callback.borrow_mut().take();
                    if let Some(callback) = pending {
                        callback(status);
                    }
                }
            });
        }
    }

    /// Run `steps` strictly in order, stopping at the first `false`
    pub fn chain(steps: Vec<ChainStep>, callback: impl FnOnce(bool) + 'static) {
        next_step(VecDeque::from(steps), Box::new(callback));
    }
}

fn next_step(mut steps: VecDeque<ChainStep>, callback: Box<dyn FnOnce(bool)>) {
    let Some(step) = steps.pop_front() else {
        callback(true);
        return;
    };
    step(Box::new(move |ok| {
        if ok {
            next_step(steps, callback);
        } else {
            callback(false);
        }
    }));
}
