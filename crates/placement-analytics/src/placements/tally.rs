use std::collections::BTreeMap;

/// Ordered counter. Iteration follows the key's `Ord`, and rankings break
/// count ties on that same order, so no view depends on input order.
#[derive(Debug, Clone)]
pub(crate) struct Tally<K: Ord> {
    counts: BTreeMap<K, usize>,
    total: usize,
}

impl<K: Ord> Default for Tally<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
            total: 0,
        }
    }
}

impl<K: Ord + Clone> Tally<K> {
    pub(crate) fn add(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
        self.total += 1;
    }

    pub(crate) fn get(&self, key: &K) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }

    /// Entries by count descending, then key ascending.
    pub(crate) fn ranked(&self) -> Vec<(K, usize)> {
        let mut entries: Vec<(K, usize)> = self
            .counts
            .iter()
            .map(|(key, count)| (key.clone(), *count))
            .collect();
        entries.sort_by(|(a_key, a_count), (b_key, b_count)| {
            b_count.cmp(a_count).then_with(|| a_key.cmp(b_key))
        });
        entries
    }
}

impl<K: Ord + Clone> FromIterator<K> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tally = Self::default();
        for key in iter {
            tally.add(key);
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_breaks_ties_on_key_order() {
        let forward: Tally<&str> = ["b", "a", "c", "a", "c"].into_iter().collect();
        let reverse: Tally<&str> = ["c", "a", "c", "a", "b"].into_iter().collect();

        let expected = vec![("a", 2), ("c", 2), ("b", 1)];
        assert_eq!(forward.ranked(), expected);
        assert_eq!(reverse.ranked(), expected);
        assert_eq!(forward.total(), 5);
        assert_eq!(forward.get(&"z"), 0);
    }
}
