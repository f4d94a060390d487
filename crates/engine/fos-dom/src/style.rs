//! Inline styles and computed animation timings
//!
//! The timing sheet stands in for `getComputedStyle`: rules keyed by class
//! selectors declare transition/keyframe timings, and an element's computed
//! timings are the cascade of every rule whose classes it carries.

use std::collections::BTreeMap;

/// Inline style declarations (property -> value)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    props: BTreeMap<String, String>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(property, value)` pairs
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut map = Self::new();
        for (prop, value) in pairs {
            map.set(prop, value);
        }
        map
    }

    pub fn set(&mut self, prop: &str, value: &str) {
        self.props.insert(prop.to_string(), value.to_string());
    }

    pub fn get(&self, prop: &str) -> Option<&str> {
        self.props.get(prop).map(|s| s.as_str())
    }

    pub fn remove(&mut self, prop: &str) -> Option<String> {
        self.props.remove(prop)
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay every declaration of `other`
    pub fn extend(&mut self, other: &StyleMap) {
        for (prop, value) in other.iter() {
            self.set(prop, value);
        }
    }
}

/// Computed transition/keyframe timings of an element, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTimings {
    pub transition_duration: f64,
    pub transition_delay: f64,
    pub animation_duration: f64,
    pub animation_delay: f64,
    pub animation_iteration_count: f64,
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            transition_duration: 0.0,
            transition_delay: 0.0,
            animation_duration: 0.0,
            animation_delay: 0.0,
            animation_iteration_count: 1.0,
        }
    }
}

impl AnimationTimings {
    /// Longest delay across transitions and keyframes
    pub fn max_delay(&self) -> f64 {
        self.transition_delay.max(self.animation_delay)
    }

    /// Longest running time, keyframe iterations included
    pub fn max_duration(&self) -> f64 {
        self.transition_duration
            .max(self.animation_duration * self.animation_iteration_count)
    }

    pub fn has_duration(&self) -> bool {
        self.transition_duration > 0.0 || self.animation_duration > 0.0
    }
}

/// A timing declaration applied to elements carrying all selector classes
#[derive(Debug, Clone, PartialEq)]
pub struct TimingRule {
    classes: Vec<String>,
    transition: Option<(f64, f64)>,
    keyframes: Option<(f64, f64, f64)>,
}

impl TimingRule {
    /// Create a rule from a compound class selector such as `.fade.fos-enter`
    /// (the leading dots are optional)
    pub fn new(selector: &str) -> Self {
        let classes = selector
            .split(|c: char| c == '.' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        Self { classes, transition: None, keyframes: None }
    }

    /// Declare `transition-duration` / `transition-delay` in seconds
    pub fn transition(mut self, duration: f64, delay: f64) -> Self {
        self.transition = Some((duration, delay));
        self
    }

    /// Declare a keyframe animation in seconds; infinite iteration counts
    /// should be passed as `1.0`
    pub fn keyframes(mut self, duration: f64, delay: f64, iterations: f64) -> Self {
        self.keyframes = Some((duration, delay, iterations));
        self
    }

    /// Parse a `transition` shorthand such as `all 0.5s ease 100ms`
    pub fn transition_shorthand(self, value: &str) -> Self {
        let times: Vec<f64> = value.split_whitespace().filter_map(parse_time).collect();
        let duration = times.first().copied().unwrap_or(0.0);
        let delay = times.get(1).copied().unwrap_or(0.0);
        self.transition(duration, delay)
    }

    pub fn matches(&self, mut has_class: impl FnMut(&str) -> bool) -> bool {
        !self.classes.is_empty() && self.classes.iter().all(|c| has_class(c))
    }

    pub(crate) fn apply(&self, timings: &mut AnimationTimings) {
        if let Some((duration, delay)) = self.transition {
            timings.transition_duration = duration;
            timings.transition_delay = delay;
        }
        if let Some((duration, delay, iterations)) = self.keyframes {
            timings.animation_duration = duration;
            timings.animation_delay = delay;
            timings.animation_iteration_count = iterations;
        }
    }
}

/// Parse a CSS time value into seconds
pub fn parse_time(s: &str) -> Option<f64> {
    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse::<f64>().ok().map(|v| v / 1000.0)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("0.5s"), Some(0.5));
        assert_eq!(parse_time("250ms"), Some(0.25));
        assert_eq!(parse_time("ease"), None);
    }

    #[test]
    fn test_shorthand() {
        let rule = TimingRule::new(".fade.fos-enter").transition_shorthand("all 2s linear 500ms");
        let mut timings = AnimationTimings::default();
        rule.apply(&mut timings);
        assert_eq!(timings.transition_duration, 2.0);
        assert_eq!(timings.transition_delay, 0.5);
    }

    #[test]
    fn test_max_duration_counts_iterations() {
        let timings = AnimationTimings {
            transition_duration: 1.0,
            animation_duration: 0.75,
            animation_iteration_count: 2.0,
            animation_delay: 0.2,
            ..Default::default()
        };
        assert_eq!(timings.max_duration(), 1.5);
        assert_eq!(timings.max_delay(), 0.2);
    }

    #[test]
    fn test_rule_requires_all_classes() {
        let rule = TimingRule::new("fade fos-enter");
        assert!(rule.matches(|c| c == "fade" || c == "fos-enter"));
        assert!(!rule.matches(|c| c == "fade"));
    }
}
