use std::collections::HashMap;

use super::fingerprint::FingerprintKey;
use crate::models::Proxy;

/// What happened to a descriptor handed to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// First descriptor for its key; stored.
    Inserted,
    /// Key already present; the incoming descriptor was discarded.
    Duplicate,
    /// Key already present; the incoming descriptor took the stored one's
    /// place, keeping its position.
    Replaced,
}

/// Retained descriptors, one per fingerprint, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct DedupRegistry {
    index: HashMap<FingerprintKey, usize>,
    proxies: Vec<Proxy>,
    duplicates: usize,
}

impl DedupRegistry {
    pub fn new() -> Self {
        DedupRegistry::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        DedupRegistry {
            index: HashMap::with_capacity(capacity),
            proxies: Vec::with_capacity(capacity),
            duplicates: 0,
        }
    }

    /// Stores `proxy` unless `key` was seen before. The first descriptor
    /// for a key always wins.
    pub fn insert(&mut self, key: FingerprintKey, proxy: Proxy) -> InsertOutcome {
        self.insert_by(key, proxy, |_, _| false)
    }

    /// Like [`insert`](Self::insert), but a duplicate replaces the stored
    /// descriptor when `better(incoming, stored)` returns true.
    pub fn insert_by<F>(&mut self, key: FingerprintKey, proxy: Proxy, better: F) -> InsertOutcome
    where
        F: FnOnce(&Proxy, &Proxy) -> bool,
    {
        match self.index.get(&key) {
            Some(&slot) => {
                self.duplicates += 1;
                if better(&proxy, &self.proxies[slot]) {
                    self.proxies[slot] = proxy;
                    InsertOutcome::Replaced
                } else {
                    InsertOutcome::Duplicate
                }
            }
            None => {
                self.index.insert(key, self.proxies.len());
                self.proxies.push(proxy);
                InsertOutcome::Inserted
            }
        }
    }

    pub fn contains(&self, key: &FingerprintKey) -> bool {
        self.index.contains_key(key)
    }

    /// Retained descriptors in insertion order.
    pub fn all(&self) -> &[Proxy] {
        &self.proxies
    }

    pub fn into_proxies(self) -> Vec<Proxy> {
        self.proxies
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Descriptors rejected or replaced so far.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::fingerprint;
    use crate::models::ProxyType;

    fn trojan(name: &str, server: &str) -> Proxy {
        let mut proxy = Proxy::new(ProxyType::Trojan, server);
        proxy.name = name.to_string();
        proxy.port = Some(443);
        proxy.password = Some("pw".to_string());
        proxy
    }

    fn add(registry: &mut DedupRegistry, proxy: Proxy) -> InsertOutcome {
        registry.insert(fingerprint(&proxy), proxy)
    }

    #[test]
    fn test_first_seen_wins() {
        let mut registry = DedupRegistry::new();
        assert_eq!(add(&mut registry, trojan("a", "h.example")), InsertOutcome::Inserted);
        assert_eq!(add(&mut registry, trojan("b", "H.example")), InsertOutcome::Duplicate);
        assert_eq!(add(&mut registry, trojan("c", "other.example")), InsertOutcome::Inserted);

        let names: Vec<_> = registry.all().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.duplicates(), 1);
    }

    #[test]
    fn test_insert_by_replaces_in_place() {
        let mut registry = DedupRegistry::new();
        add(&mut registry, trojan("short", "h.example"));
        add(&mut registry, trojan("x", "other.example"));

        let longer = trojan("a longer name", "h.example");
        let outcome = registry.insert_by(fingerprint(&longer), longer, |incoming, stored| {
            incoming.name.len() > stored.name.len()
        });
        assert_eq!(outcome, InsertOutcome::Replaced);
        assert_eq!(registry.all()[0].name, "a longer name");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_empty_registry() {
        let registry = DedupRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.all().is_empty());
        assert!(!registry.contains(&fingerprint(&trojan("a", "h.example"))));
    }
}
