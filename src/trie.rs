//! Compact trie grouping items under shared string prefixes.
//!
//! Each edge carries a whole fragment of characters rather than one. Adding
//! a key that diverges inside a fragment splits that edge. Several items may
//! share one key. Removal detaches an item but never merges nodes back.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Display;

use crate::error::Result;
use crate::uint_map::UIntMap;

/// Children are keyed by the first character of their fragment.
#[inline(always)]
fn edge(c: char) -> i32 {
    c as i32
}

fn common_prefix(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[derive(Clone)]
struct Node<T> {
    fragment: Vec<char>,
    items: Vec<T>,
    children: Option<UIntMap<Node<T>>>,
}

impl<T> Node<T> {
    fn new(fragment: Vec<char>) -> Self {
        Self {
            fragment,
            items: Vec::new(),
            children: None,
        }
    }

    fn leaf(fragment: Vec<char>, item: T) -> Self {
        Self {
            fragment,
            items: vec![item],
            children: None,
        }
    }

    fn child(&self, c: char) -> Option<&Node<T>> {
        self.children.as_ref()?.get(edge(c)).ok().flatten()
    }

    fn child_mut(&mut self, c: char) -> Option<&mut Node<T>> {
        self.children.as_mut()?.get_mut(edge(c)).ok().flatten()
    }

    fn add_child(&mut self, node: Node<T>) -> Result<()> {
        let key = node.fragment.first().map_or(0, |&c| edge(c));
        self.children
            .get_or_insert_with(UIntMap::new)
            .put(key, node)?;
        Ok(())
    }

    fn children(&self) -> impl Iterator<Item = &Node<T>> {
        self.children.iter().flat_map(|children| children.values())
    }
}

impl<T: PartialEq> Node<T> {
    fn add_item(&mut self, item: T) -> bool {
        if self.items.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Adds `item` under `chars`, relative to this node. Returns `false` if
    /// the item was already present at that key.
    fn insert(&mut self, chars: &[char], item: T) -> Result<bool> {
        let Some(&first) = chars.first() else {
            return Ok(self.add_item(item));
        };
        let key = edge(first);
        let children = self.children.get_or_insert_with(UIntMap::new);
        let split = match children.get_mut(key)? {
            None => {
                children.put(key, Node::leaf(chars.to_vec(), item))?;
                return Ok(true);
            }
            Some(child) => {
                let split = common_prefix(&child.fragment, chars);
                if split == child.fragment.len() {
                    return child.insert(&chars[split..], item);
                }
                split
            }
        };

        // The key diverges or ends inside the child's fragment: put a new
        // node holding the shared part between this node and the child.
        let mut branch = Node::new(chars[..split].to_vec());
        if split == chars.len() {
            branch.items.push(item);
        } else {
            branch.add_child(Node::leaf(chars[split..].to_vec(), item))?;
        }
        if let Some(mut child) = children.remove(key) {
            child.fragment = child.fragment.split_off(split);
            branch.add_child(child)?;
        }
        children.put(key, branch)?;
        Ok(true)
    }
}

impl<T: Display> Node<T> {
    fn dump(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:width$}", "", width = depth * 2)?;
        if depth == 0 {
            f.write_str("#")?;
        } else {
            for c in &self.fragment {
                write!(f, "{c}")?;
            }
        }
        let children = self
            .children
            .as_ref()
            .map(UIntMap::values_sorted_by_key)
            .unwrap_or_default();
        if !children.is_empty() {
            f.write_str("(")?;
            for child in &children {
                if let Some(c) = child.fragment.first() {
                    write!(f, " {c}")?;
                }
            }
            f.write_str(" )")?;
        }
        for item in &self.items {
            write!(f, " [{item}]")?;
        }
        writeln!(f)?;
        for child in children {
            child.dump(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Compact trie from string keys to items.
///
/// # Examples
///
/// ```rust
/// use probe_hash::Trie;
///
/// let mut trie = Trie::new();
/// trie.add("el", 1).unwrap();
/// trie.add("elma", 2).unwrap();
/// trie.add("elmas", 3).unwrap();
/// assert_eq!(trie.prefix_matching_items("elmaslar"), vec![&1, &2, &3]);
/// assert_eq!(trie.items("elma"), &[2]);
/// assert!(trie.items("elm").is_empty());
/// ```
#[derive(Clone)]
pub struct Trie<T> {
    root: Node<T>,
    len: usize,
}

impl<T> Trie<T> {
    /// Creates an empty trie.
    pub fn new() -> Self {
        Self {
            root: Node::new(Vec::new()),
            len: 0,
        }
    }

    /// Number of stored items. An item added under two keys counts twice.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no items are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Node reached by consuming exactly `key`.
    fn node_for(&self, key: &str) -> Option<&Node<T>> {
        let chars: Vec<char> = key.chars().collect();
        let mut node = &self.root;
        let mut rest = chars.as_slice();
        while let Some(&first) = rest.first() {
            let child = node.child(first)?;
            rest = rest.strip_prefix(child.fragment.as_slice())?;
            node = child;
        }
        Some(node)
    }

    fn node_for_mut(&mut self, key: &str) -> Option<&mut Node<T>> {
        let chars: Vec<char> = key.chars().collect();
        let mut node = &mut self.root;
        let mut rest = chars.as_slice();
        while let Some(&first) = rest.first() {
            let child = node.child_mut(first)?;
            rest = rest.strip_prefix(child.fragment.as_slice())?;
            node = child;
        }
        Some(node)
    }

    /// Items stored under exactly `key`.
    pub fn items(&self, key: &str) -> &[T] {
        self.node_for(key).map_or(&[], |node| node.items.as_slice())
    }

    /// Every stored item, shallower keys first.
    pub fn all(&self) -> Vec<&T> {
        let mut items = Vec::with_capacity(self.len);
        let mut level = vec![&self.root];
        while !level.is_empty() {
            let mut next = Vec::new();
            for node in level {
                items.extend(node.items.iter());
                next.extend(node.children());
            }
            level = next;
        }
        items
    }

    /// Items whose key is a prefix of `input`, shortest key first.
    pub fn prefix_matching_items(&self, input: &str) -> Vec<&T> {
        let chars: Vec<char> = input.chars().collect();
        let mut items: Vec<&T> = self.root.items.iter().collect();
        let mut node = &self.root;
        let mut rest = chars.as_slice();
        while let Some(&first) = rest.first() {
            let Some(child) = node.child(first) else {
                break;
            };
            let Some(tail) = rest.strip_prefix(child.fragment.as_slice()) else {
                break;
            };
            items.extend(child.items.iter());
            rest = tail;
            node = child;
        }
        items
    }
}

impl<T: PartialEq> Trie<T> {
    /// Adds `item` under `key`. Returns `false` if an equal item was already
    /// stored under that key.
    pub fn add(&mut self, key: &str, item: T) -> Result<bool> {
        let chars: Vec<char> = key.chars().collect();
        let added = self.root.insert(&chars, item)?;
        if added {
            self.len += 1;
        }
        Ok(added)
    }

    /// Detaches `item` from `key`, leaving the node structure in place.
    /// Returns `true` if the item was present.
    pub fn remove(&mut self, key: &str, item: &T) -> bool {
        let Some(node) = self.node_for_mut(key) else {
            return false;
        };
        let Some(position) = node.items.iter().position(|stored| stored == item) else {
            return false;
        };
        node.items.remove(position);
        self.len -= 1;
        true
    }

    /// Returns `true` if `item` is stored under exactly `key`.
    pub fn contains_item(&self, key: &str, item: &T) -> bool {
        self.node_for(key)
            .is_some_and(|node| node.items.contains(item))
    }
}

impl<T> Default for Trie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for Trie<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trie")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Indented dump of the node structure, one node per line.
impl<T: Display> Display for Trie<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.dump(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec::Vec;

    use super::*;

    fn build(keys: &[&str]) -> Trie<String> {
        let mut trie = Trie::new();
        for key in keys {
            trie.add(key, key.to_string()).unwrap();
        }
        trie
    }

    fn matches(trie: &Trie<String>, input: &str) -> Vec<String> {
        trie.prefix_matching_items(input)
            .into_iter()
            .cloned()
            .collect()
    }

    #[test]
    fn empty_trie_matches_nothing() {
        let trie: Trie<String> = Trie::new();
        assert!(trie.prefix_matching_items("foo").is_empty());
        assert!(trie.is_empty());
    }

    #[test]
    fn shared_prefixes_in_either_order() {
        for keys in [["elmas", "elma"], ["elma", "elmas"]] {
            let trie = build(&keys);
            assert_eq!(matches(&trie, "elma"), ["elma"]);
            assert_eq!(matches(&trie, "elmas"), ["elma", "elmas"]);
        }
    }

    #[test]
    fn longer_inputs() {
        let trie = build(&["el", "elmas", "elma", "ela"]);
        assert!(matches(&trie, "e").is_empty());
        assert_eq!(matches(&trie, "el"), ["el"]);
        assert_eq!(matches(&trie, "elif"), ["el"]);
        assert_eq!(matches(&trie, "ela"), ["el", "ela"]);
        assert_eq!(matches(&trie, "elastik"), ["el", "ela"]);
        assert_eq!(matches(&trie, "elmaslar"), ["el", "elma", "elmas"]);
    }

    #[test]
    fn divergence_inside_fragment_does_not_match() {
        let trie = build(&["e", "elma", "elmas"]);
        assert_eq!(matches(&trie, "elms"), ["e"]);

        let trie = build(&["airport", "airports"]);
        assert!(matches(&trie, "airpods").is_empty());

        let trie = build(&["comple", "complete"]);
        assert_eq!(matches(&trie, "complutense"), Vec::<String>::new());
    }

    #[test]
    fn split_creates_branch() {
        let trie = build(&["foobar", "foxes"]);
        assert_eq!(trie.len(), 2);
        assert!(trie.items("fo").is_empty());
        assert_eq!(trie.items("foobar"), ["foobar"]);
        assert_eq!(trie.items("foxes"), ["foxes"]);
        assert_eq!(trie.to_string(), "#( f )\n  fo( o x )\n    obar [foobar]\n    xes [foxes]\n");
    }

    #[test]
    fn split_with_item_on_branch() {
        let trie = build(&["foobar", "foo"]);
        assert_eq!(trie.items("foo"), ["foo"]);
        assert_eq!(trie.items("foobar"), ["foobar"]);
        assert_eq!(trie.to_string(), "#( f )\n  foo( b ) [foo]\n    bar [foobar]\n");
    }

    #[test]
    fn homonyms_share_a_node() {
        let mut trie = Trie::new();
        assert_eq!(trie.add("gül", 1), Ok(true));
        assert_eq!(trie.add("gül", 2), Ok(true));
        assert_eq!(trie.add("gül", 1), Ok(false));
        assert_eq!(trie.len(), 2);
        assert_eq!(trie.items("gül"), &[1, 2]);
        assert!(trie.contains_item("gül", &2));
        assert!(!trie.contains_item("gü", &2));
    }

    #[test]
    fn all_lists_every_item() {
        let trie = build(&["elma", "el", "arm", "armut", "a", "elmas"]);
        assert_eq!(trie.all().len(), 6);
        assert_eq!(trie.len(), 6);
    }

    #[test]
    fn removal_does_not_compact() {
        let mut trie = build(&["el", "elmas", "elma", "ela"]);
        let before = trie.to_string();
        assert!(trie.remove("elma", &"elma".to_string()));
        assert!(!trie.remove("elma", &"elma".to_string()));
        assert!(!trie.remove("elm", &"elma".to_string()));
        assert_eq!(trie.len(), 3);
        assert_eq!(matches(&trie, "elmaslar"), ["el", "elmas"]);
        assert_eq!(trie.to_string().lines().count(), before.lines().count());
        assert!(!trie.contains_item("elma", &"elma".to_string()));
    }

    #[test]
    fn empty_key_lives_on_root() {
        let mut trie = Trie::new();
        trie.add("", 0).unwrap();
        trie.add("a", 1).unwrap();
        assert_eq!(trie.items(""), &[0]);
        assert_eq!(trie.prefix_matching_items("abc"), [&0, &1]);
    }
}
