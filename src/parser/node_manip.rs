use std::collections::HashMap;

/// Collision counters for display names, owned by a single parse pass.
///
/// Only names handed to [`NameRegistry::uniquify`] are counted; a generated
/// name such as `node-01` is not recorded in its own right.
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    counters: HashMap<String, u32>,
}

impl NameRegistry {
    pub fn new() -> Self {
        NameRegistry::default()
    }

    /// Returns `name` the first time it is seen, then `name-01`, `name-02`
    /// and so on.
    pub fn uniquify(&mut self, name: &str) -> String {
        match self.counters.get_mut(name) {
            Some(counter) => {
                *counter += 1;
                format!("{}-{:02}", name, counter)
            }
            None => {
                self.counters.insert(name.to_string(), 0);
                name.to_string()
            }
        }
    }

    /// Number of distinct names seen.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

/// Free-function form of [`NameRegistry::uniquify`].
pub fn uniquify(registry: &mut NameRegistry, name: &str) -> String {
    registry.uniquify(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniquify_sequence() {
        let mut registry = NameRegistry::new();
        assert_eq!(uniquify(&mut registry, "node"), "node");
        assert_eq!(uniquify(&mut registry, "node"), "node-01");
        assert_eq!(uniquify(&mut registry, "other"), "other");
        assert_eq!(uniquify(&mut registry, "node"), "node-02");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_counter_keeps_two_digits_minimum() {
        let mut registry = NameRegistry::new();
        let names: Vec<String> = (0..101).map(|_| registry.uniquify("n")).collect();
        assert_eq!(names[9], "n-09");
        assert_eq!(names[10], "n-10");
        assert_eq!(names[100], "n-100");
    }

    #[test]
    fn test_registries_are_independent() {
        let mut first = NameRegistry::new();
        let mut second = NameRegistry::new();
        first.uniquify("a");
        assert_eq!(second.uniquify("a"), "a");
        assert_eq!(first.uniquify("a"), "a-01");
    }
}
