//! Class list (`classList`)
//!
//! Ordered, duplicate-free set of CSS class tokens.

/// Space-separated class tokens of an element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    tokens: Vec<String>,
}

impl ClassList {
    /// Create empty class list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a space-separated class attribute
    pub fn parse(value: &str) -> Self {
        let mut list = Self::new();
        list.add(value);
        list
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check if a class is present
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Add every class in a space-separated list, returns how many were new
    pub fn add(&mut self, names: &str) -> usize {
        let mut added = 0;
        for token in names.split_whitespace() {
            if !self.contains(token) {
                self.tokens.push(token.to_string());
                added += 1;
            }
        }
        added
    }

    /// Remove every class in a space-separated list, returns how many were present
    pub fn remove(&mut self, names: &str) -> usize {
        let before = self.tokens.len();
        let doomed: Vec<&str> = names.split_whitespace().collect();
        self.tokens.retain(|t| !doomed.contains(&t.as_str()));
        before - self.tokens.len()
    }

    /// Toggle a class, returns the new state
    pub fn toggle(&mut self, token: &str, force: Option<bool>) -> bool {
        let present = self.contains(token);
        let want = force.unwrap_or(!present);
        if want && !present {
            self.add(token);
        } else if !want && present {
            self.remove(token);
        }
        want
    }

    /// Class attribute value
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|s| s.as_str())
    }
}

impl std::fmt::Display for ClassList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dedups() {
        let list = ClassList::parse("btn  btn-primary btn");
        assert_eq!(list.len(), 2);
        assert_eq!(list.value(), "btn btn-primary");
    }

    #[test]
    fn test_add_remove() {
        let mut list = ClassList::new();
        assert_eq!(list.add("foo bar"), 2);
        assert_eq!(list.add("foo"), 0);

        assert_eq!(list.remove("foo baz"), 1);
        assert!(!list.contains("foo"));
        assert!(list.contains("bar"));
    }

    #[test]
    fn test_toggle() {
        let mut list = ClassList::new();

        assert!(list.toggle("active", None));
        assert!(list.contains("active"));

        assert!(!list.toggle("active", None));
        assert!(!list.contains("active"));

        assert!(list.toggle("active", Some(true)));
        assert!(list.toggle("active", Some(true)));
        assert_eq!(list.len(), 1);
    }
}
