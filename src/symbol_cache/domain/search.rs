//! Lazy cross-file symbol search.

use super::{CacheEntry, FileKey, SymbolKind, SymbolNode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Separator joining ancestor names in a qualified path.
pub const QUALIFIED_PATH_SEPARATOR: char = '/';

/// Filters applied to a symbol search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Only symbols of this kind qualify.
    #[serde(default)]
    pub kind_filter: Option<SymbolKind>,
    /// Require the whole name to equal the query instead of containing it.
    #[serde(default)]
    pub exact_match: bool,
}

impl SearchOptions {
    /// Restricts matches to `kind`.
    #[must_use]
    pub const fn with_kind(mut self, kind: SymbolKind) -> Self {
        self.kind_filter = Some(kind);
        self
    }

    /// Requires whole-name matches.
    #[must_use]
    pub const fn exact(mut self) -> Self {
        self.exact_match = true;
        self
    }
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMatch {
    /// File containing the symbol.
    pub file: FileKey,
    /// Symbol name with its original casing.
    pub name: String,
    /// Symbol kind.
    pub kind: SymbolKind,
    /// Ancestor names and the symbol's own name joined by
    /// [`QUALIFIED_PATH_SEPARATOR`].
    pub qualified_path: String,
}

/// A search over a snapshot of cache entries.
///
/// Nothing is matched until iteration. The snapshot is fixed when the search
/// is created, so every call to [`SymbolSearch::iter`] restarts the same
/// finite sequence regardless of later cache mutations.
#[derive(Debug, Clone)]
pub struct SymbolSearch {
    entries: Vec<Arc<CacheEntry>>,
    needle: String,
    options: SearchOptions,
}

impl SymbolSearch {
    /// Creates a search for `query` over `entries`.
    #[must_use]
    pub fn new(entries: Vec<Arc<CacheEntry>>, query: &str, options: SearchOptions) -> Self {
        Self {
            entries,
            needle: query.to_lowercase(),
            options,
        }
    }

    /// Starts a fresh pass over the snapshot.
    #[must_use]
    pub fn iter(&self) -> SymbolMatches<'_> {
        SymbolMatches {
            search: self,
            next_entry: 0,
            current_file: None,
            pending: Vec::new(),
        }
    }

    fn accepts(&self, node: &SymbolNode) -> bool {
        if self
            .options
            .kind_filter
            .is_some_and(|kind| kind != node.kind())
        {
            return false;
        }

        let name = node.name().to_lowercase();
        if self.options.exact_match {
            name == self.needle
        } else {
            name.contains(&self.needle)
        }
    }
}

impl<'a> IntoIterator for &'a SymbolSearch {
    type Item = SymbolMatch;
    type IntoIter = SymbolMatches<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the matches of a [`SymbolSearch`].
///
/// Walks each entry's trees pre-order, testing a node before its children.
#[derive(Debug)]
pub struct SymbolMatches<'a> {
    search: &'a SymbolSearch,
    next_entry: usize,
    current_file: Option<&'a FileKey>,
    pending: Vec<(&'a SymbolNode, String)>,
}

impl<'a> Iterator for SymbolMatches<'a> {
    type Item = SymbolMatch;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((node, path)) = self.pending.pop() {
                for child in node.children().iter().rev() {
                    let child_path = format!("{path}{QUALIFIED_PATH_SEPARATOR}{}", child.name());
                    self.pending.push((child, child_path));
                }

                if self.search.accepts(node) {
                    let file = self.current_file?.clone();
                    return Some(SymbolMatch {
                        file,
                        name: node.name().to_owned(),
                        kind: node.kind(),
                        qualified_path: path,
                    });
                }
                continue;
            }

            let search = self.search;
            let entry: &'a CacheEntry = search.entries.get(self.next_entry)?;
            self.next_entry += 1;
            self.current_file = Some(entry.key());
            for root in entry.payload().iter().rev() {
                self.pending.push((root, root.name().to_owned()));
            }
        }
    }
}
