//! Class name to script animation registry

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::ScriptAnimation;
use crate::error::AnimateError;

type Factory = Box<dyn FnOnce() -> ScriptAnimation>;

enum Slot {
    Pending(Factory),
    Ready(Rc<ScriptAnimation>),
    /// Factory is running
    Building,
}

/// Registered script animations, instantiated lazily on first lookup
#[derive(Default)]
pub struct AnimationRegistry {
    slots: RefCell<HashMap<String, Slot>>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under a class selector such as `.fade`
    pub fn register(
        &self,
        selector: &str,
        factory: impl FnOnce() -> ScriptAnimation + 'static,
    ) -> Result<(), AnimateError> {
        let name = selector
            .strip_prefix('.')
            .filter(|name| !name.is_empty() && !name.contains(char::is_whitespace))
            .ok_or_else(|| AnimateError::NotClassSelector(selector.to_string()))?;
        tracing::debug!("Registered script animation '{}'", name);
        self.slots.borrow_mut().insert(name.to_string(), Slot::Pending(Box::new(factory)));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    /// Animations registered for `classes`, in class order, each at most once
    pub fn lookup(&self, classes: &str) -> Vec<Rc<ScriptAnimation>> {
        let mut seen = HashSet::new();
        classes
            .split_whitespace()
            .filter(|class| seen.insert(*class))
            .filter_map(|class| self.instance(class))
            .collect()
    }

    fn instance(&self, name: &str) -> Option<Rc<ScriptAnimation>> {
        let factory = {
            let mut slots = self.slots.borrow_mut();
            let slot = slots.get_mut(name)?;
            match std::mem::replace(slot, Slot::Building) {
                Slot::Ready(animation) => {
                    *slot = Slot::Ready(Rc::clone(&animation));
                    return Some(animation);
                }
                Slot::Pending(factory) => factory,
                Slot::Building => return None,
            }
        };

        // factories may consult the registry themselves
        let animation = Rc::new(factory());
        tracing::trace!("Instantiated script animation '{}'", name);
        self.slots.borrow_mut().insert(name.to_string(), Slot::Ready(Rc::clone(&animation)));
        Some(animation)
    }
}

impl std::fmt::Debug for AnimationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.slots.borrow().keys().cloned().collect();
        names.sort();
        f.debug_struct("AnimationRegistry").field("names", &names).finish()
    }
}
