//! Class-Delta Resolver
//!
//! Class string helpers shared by the drivers, and the resolver that turns
//! concurrent add/remove requests into the effective delta for an element.

use std::collections::HashSet;

use fos_dom::Element;

use crate::options::AnimationOptions;

/// Marker suffix of classes being animated in
pub const ADD_CLASS_SUFFIX: &str = "-add";
/// Marker suffix of classes being animated out
pub const REMOVE_CLASS_SUFFIX: &str = "-remove";
/// Suffix of the classes that trigger the animation proper
pub const ACTIVE_CLASS_SUFFIX: &str = "-active";

/// Effective class changes for one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDelta {
    pub add_class: String,
    pub remove_class: String,
}

impl ClassDelta {
    pub fn is_empty(&self) -> bool {
        self.add_class.is_empty() && self.remove_class.is_empty()
    }
}

/// Split a class string on whitespace
pub fn split_classes(classes: &str) -> Vec<&str> {
    classes.split_whitespace().collect()
}

/// Join two class strings with a single space, skipping empty sides
pub fn merge_classes(a: &str, b: &str) -> String {
    match (a.trim().is_empty(), b.trim().is_empty()) {
        (true, true) => String::new(),
        (true, false) => b.trim().to_string(),
        (false, true) => a.trim().to_string(),
        (false, false) => format!("{} {}", a.trim(), b.trim()),
    }
}

/// Prefix or suffix every class with `fix`
pub fn pend_classes(classes: &str, fix: &str, is_prefix: bool) -> String {
    classes
        .split_whitespace()
        .map(|class| if is_prefix { format!("{}{}", fix, class) } else { format!("{}{}", class, fix) })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Flag {
    Add,
    Remove,
}

/// Compute the effective delta of `add`/`remove` against `existing`.
///
/// A class requested both ways is added. An add is dropped when the class
/// is already present (unless it carries a `-remove` marker); a remove is
/// dropped when the class is absent (unless it carries an `-add` marker).
pub fn resolve_element_classes(existing: &str, add: &str, remove: &str) -> ClassDelta {
    let present: HashSet<&str> = existing.split_whitespace().collect();

    let mut flags: Vec<(&str, Flag)> = Vec::new();
    for class in add.split_whitespace() {
        if !flags.iter().any(|(c, _)| *c == class) {
            flags.push((class, Flag::Add));
        }
    }
    for class in remove.split_whitespace() {
        if !flags.iter().any(|(c, _)| *c == class) {
            flags.push((class, Flag::Remove));
        }
    }

    let mut adds = Vec::new();
    let mut removes = Vec::new();
    for (class, flag) in flags {
        match flag {
            Flag::Add => {
                let conflicting = remove.split_whitespace().any(|c| c == class);
                let marked = present.contains(format!("{}{}", class, REMOVE_CLASS_SUFFIX).as_str());
                if conflicting || !present.contains(class) || marked {
                    adds.push(class);
                }
            }
            Flag::Remove => {
                let marked = present.contains(format!("{}{}", class, ADD_CLASS_SUFFIX).as_str());
                if present.contains(class) || marked {
                    removes.push(class);
                }
            }
        }
    }

    ClassDelta { add_class: adds.join(" "), remove_class: removes.join(" ") }
}

/// Fold a newer request into a queued one on the same element
pub fn merge_animation_details(element: &Element, target: &mut AnimationOptions, newer: AnimationOptions) {
    let add = merge_classes(
        target.add_class.as_deref().unwrap_or(""),
        newer.add_class.as_deref().unwrap_or(""),
    );
    let remove = merge_classes(
        target.remove_class.as_deref().unwrap_or(""),
        newer.remove_class.as_deref().unwrap_or(""),
    );
    let delta = resolve_element_classes(&element.class_attribute(), &add, &remove);

    if let Some(temp) = newer.temp_classes {
        let merged = merge_classes(target.temp_classes.as_deref().unwrap_or(""), &temp);
        target.temp_classes = Some(merged);
    }
    match (&mut target.from, newer.from) {
        (Some(from), Some(newer)) => from.extend(&newer),
        (slot, newer) => *slot = newer.or(slot.take()),
    }
    match (&mut target.to, newer.to) {
        (Some(to), Some(newer)) => to.extend(&newer),
        (slot, newer) => *slot = newer.or(slot.take()),
    }
    // the first real DOM operation is kept
    if target.dom_operation.is_none() {
        target.dom_operation = newer.dom_operation;
    }
    if newer.duration.is_some() {
        target.duration = newer.duration;
    }

    target.add_class = (!delta.add_class.is_empty()).then_some(delta.add_class);
    target.remove_class = (!delta.remove_class.is_empty()).then_some(delta.remove_class);
}

/// Apply and clear the requested class changes
pub fn apply_animation_classes(element: &Element, options: &mut AnimationOptions) {
    if let Some(add) = options.add_class.take() {
        element.add_class(&add);
    }
    if let Some(remove) = options.remove_class.take() {
        element.remove_class(&remove);
    }
}

/// Apply and clear the `from` styles
pub fn apply_animation_from_styles(element: &Element, options: &mut AnimationOptions) {
    if let Some(from) = options.from.take() {
        element.set_styles(&from);
    }
}

/// Apply and clear the `to` styles
pub fn apply_animation_to_styles(element: &Element, options: &mut AnimationOptions) {
    if let Some(to) = options.to.take() {
        element.set_styles(&to);
    }
}

pub fn apply_animation_styles(element: &Element, options: &mut AnimationOptions) {
    apply_animation_from_styles(element, options);
    apply_animation_to_styles(element, options);
}

/// Drop every class starting with `<prefix>-`
pub fn strip_prefixed_classes(classes: &str, prefix: &str) -> String {
    let marker = format!("{}-", prefix);
    classes
        .split_whitespace()
        .filter(|class| !class.starts_with(&marker))
        .collect::<Vec<_>>()
        .join(" ")
}
