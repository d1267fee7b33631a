//! # Concurrent Prefix Index (Trie)
//!
//! Backs the `GET /v1/users?q=` prefix search: a case-folding trie
//! mapping user-facing strings (username, email, name) to user ids.
//! Grounded in `indexes/trie_test.go` — there's no `trie.go` in the
//! extraction, so the test file is the sole behavioral spec: case-folded
//! keys, multi-value leaf sets deduplicated *per node*, global dedup of
//! values across the whole matched subtree (the same user can be
//! reachable via several keys), deterministic sorted-child DFS, and
//! dangling-node pruning on removal.
//!
//! The trie itself isn't internally locked — callers hold a `RwLock`
//! around it (see `registry`'s use of the same pattern for services),
//! matching the original's locking being the caller's (`DSDHandler`'s)
//! responsibility rather than baked into the data structure.

use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

#[derive(Debug, Default)]
struct TrieNode {
    children: BTreeMap<char, TrieNode>,
    values: Vec<Uuid>,
}

/// A case-insensitive prefix trie over `(key, user id)` pairs.
#[derive(Debug, Default)]
pub struct Trie {
    root: TrieNode,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `key`, folding `key` to lowercase. If the
    /// same value is already present at that exact node, it is not
    /// duplicated.
    pub fn insert(&mut self, key: &str, value: Uuid) {
        if key.is_empty() {
            return;
        }

        let mut node = &mut self.root;
        for ch in key.chars().flat_map(char::to_lowercase) {
            node = node.children.entry(ch).or_default();
        }

        if !node.values.contains(&value) {
            node.values.push(value);
        }
    }

    /// Removes `value` from the node for `key`, pruning any node left
    /// with no values and no children, walking back up toward the root
    /// as long as ancestors keep becoming empty.
    pub fn remove(&mut self, key: &str, value: Uuid) {
        if key.is_empty() {
            return;
        }

        let chars: Vec<char> = key.chars().flat_map(char::to_lowercase).collect();
        Self::remove_rec(&mut self.root, &chars, value);
    }

    /// Returns `true` if the node at `path[index..]` should be pruned
    /// from its parent after recursing.
    fn remove_rec(node: &mut TrieNode, path: &[char], value: Uuid) -> bool {
        match path.split_first() {
            None => {
                node.values.retain(|v| *v != value);
                node.values.is_empty() && node.children.is_empty()
            }
            Some((ch, rest)) => {
                let Some(child) = node.children.get_mut(ch) else {
                    return false;
                };
                if Self::remove_rec(child, rest, value) {
                    node.children.remove(ch);
                }
                node.values.is_empty() && node.children.is_empty()
            }
        }
    }

    /// Returns up to `limit` distinct values whose key starts with
    /// `prefix`. An empty prefix always returns no results — unbounded
    /// prefix search isn't a feature here, only assisted lookup.
    pub fn search(&self, limit: usize, prefix: &str) -> Vec<Uuid> {
        if prefix.is_empty() || limit == 0 {
            return Vec::new();
        }

        let chars: Vec<char> = prefix.chars().flat_map(char::to_lowercase).collect();

        let mut node = &self.root;
        for ch in &chars {
            match node.children.get(ch) {
                Some(next) => node = next,
                None => return Vec::new(),
            }
        }

        let mut results = Vec::new();
        let mut seen = HashSet::new();
        Self::collect(node, limit, &mut results, &mut seen);
        results
    }

    fn collect(node: &TrieNode, limit: usize, out: &mut Vec<Uuid>, seen: &mut HashSet<Uuid>) {
        for value in &node.values {
            if out.len() >= limit {
                return;
            }
            if seen.insert(*value) {
                out.push(*value);
            }
        }

        for child in node.children.values() {
            if out.len() >= limit {
                return;
            }
            Self::collect(child, limit, out, seen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(keys: &[&str]) -> (Trie, Vec<Uuid>) {
        let mut trie = Trie::new();
        let ids: Vec<Uuid> = keys.iter().map(|_| Uuid::new_v4()).collect();
        for (key, id) in keys.iter().zip(&ids) {
            trie.insert(key, *id);
        }
        (trie, ids)
    }

    #[test]
    fn search_shared_prefix_returns_matching_count() {
        let (trie, _) = build(&["do", "dog", "dope", "door", "desk", "cat"]);
        assert_eq!(trie.search(20, "do").len(), 4);
    }

    #[test]
    fn search_no_shared_prefix() {
        let (trie, _) = build(&["love", "big", "small"]);
        assert_eq!(trie.search(20, "b").len(), 1);
    }

    #[test]
    fn search_empty_prefix_returns_nothing() {
        let (trie, _) = build(&["love", "big", "small"]);
        assert_eq!(trie.search(20, "").len(), 0);
    }

    #[test]
    fn search_empty_trie_returns_nothing() {
        let trie = Trie::new();
        assert_eq!(trie.search(20, "anything").len(), 0);
    }

    #[test]
    fn search_respects_results_limit() {
        let (trie, _) = build(&["do", "dog", "dope", "door", "desk", "cat"]);
        assert_eq!(trie.search(3, "d").len(), 3);
    }

    #[test]
    fn search_duplicated_keys_each_get_own_value() {
        let mut trie = Trie::new();
        for _ in 0..3 {
            trie.insert("dog", Uuid::new_v4());
        }
        trie.insert("door", Uuid::new_v4());
        trie.insert("desk", Uuid::new_v4());
        trie.insert("cat", Uuid::new_v4());

        assert_eq!(trie.search(4, "do").len(), 4);
        assert_eq!(trie.search(2, "do").len(), 2);
    }

    #[test]
    fn search_folds_case() {
        let mut trie = Trie::new();
        trie.insert("Dog", Uuid::new_v4());
        trie.insert("DOG", Uuid::new_v4());
        trie.insert("dog", Uuid::new_v4());
        trie.insert("door", Uuid::new_v4());
        trie.insert("deSk", Uuid::new_v4());
        trie.insert("cat", Uuid::new_v4());

        assert_eq!(trie.search(20, "d").len(), 5);
    }

    #[test]
    fn search_dedupes_same_value_across_different_keys() {
        let mut trie = Trie::new();
        let user_id = Uuid::new_v4();
        trie.insert("dog", user_id);
        trie.insert("do", user_id);
        trie.insert("dope", user_id);

        assert_eq!(trie.search(20, "do").len(), 1);
    }

    #[test]
    fn remove_from_node_with_children_keeps_children_reachable() {
        let (mut trie, ids) = build(&["dog", "do", "dope", "cat"]);
        trie.remove("do", ids[1]);
        assert_eq!(trie.search(20, "do").len(), 2);
    }

    #[test]
    fn remove_from_leaf_node_prunes_it() {
        let (mut trie, ids) = build(&["dog", "do", "dope", "cat"]);
        trie.remove("dog", ids[0]);
        assert_eq!(trie.search(20, "dog").len(), 0);
    }

    #[test]
    fn remove_one_of_several_values_at_a_node() {
        let (mut trie, ids) = build(&["do", "do", "do", "dog", "dope"]);
        trie.remove("do", ids[0]);
        assert_eq!(trie.search(20, "do").len(), 4);
    }

    #[test]
    fn remove_is_case_insensitive() {
        let (mut trie, ids) = build(&["do", "do", "do", "dog", "dope"]);
        trie.remove("DO", ids[0]);
        assert_eq!(trie.search(20, "do").len(), 4);
    }

    #[test]
    fn remove_with_empty_key_is_a_no_op() {
        let (mut trie, ids) = build(&["do", "dooog"]);
        trie.remove("", ids[0]);
        assert_eq!(trie.search(20, "do").len(), 2);
    }

    #[test]
    fn remove_on_empty_trie_is_a_no_op() {
        let mut trie = Trie::new();
        trie.remove("do", Uuid::new_v4());
        assert_eq!(trie.search(20, "do").len(), 0);
    }

    #[test]
    fn remove_prunes_dangling_ancestor_nodes() {
        let (mut trie, ids) = build(&["do", "dog"]);
        trie.remove("dog", ids[1]);

        let do_node_children = trie_children_len(&trie, "do");
        assert_eq!(do_node_children, 0);
    }

    #[test]
    fn remove_prunes_multiple_dangling_ancestors() {
        let (mut trie, ids) = build(&["do", "dooog"]);
        trie.remove("dooog", ids[1]);

        assert_eq!(trie_children_len(&trie, "do"), 0);
    }

    #[test]
    fn remove_stops_pruning_at_a_node_with_other_children() {
        let (mut trie, ids) = build(&["do", "dooog", "dot", "dog"]);
        trie.remove("dooog", ids[1]);

        assert_eq!(trie_children_len(&trie, "do"), 2);
    }

    fn trie_children_len(trie: &Trie, key: &str) -> usize {
        let mut node = &trie.root;
        for ch in key.chars() {
            node = node.children.get(&ch).expect("path should exist");
        }
        node.children.len()
    }
}
