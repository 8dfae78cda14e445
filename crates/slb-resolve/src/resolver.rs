//! Dependency resolver
//!
//! Transitive closures over the `depends_on` relation of a
//! [`ServiceCatalog`]. Traversal is iterative with one visited set per root,
//! so cyclic dependency data terminates. The catalog is immutable for the
//! lifetime of the resolver, which lets every `(seed, mode)` result be
//! memoized.

use dashmap::DashMap;
use slb_catalog::{ServiceCatalog, ServiceKey};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Which dependencies a traversal follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalMode {
    /// Follow only dependencies that are known user-mode services
    UserModeOnly,

    /// Follow every dependency, including kernel-mode and unknown names
    IncludeKernelMode,
}

impl TraversalMode {
    /// Mode from an "include kernel-mode" flag
    #[inline]
    #[must_use]
    pub fn from_flag(include_kernel_mode: bool) -> Self {
        if include_kernel_mode {
            Self::IncludeKernelMode
        } else {
            Self::UserModeOnly
        }
    }
}

/// Shared closure result
pub type Closure = Arc<BTreeSet<ServiceKey>>;

/// Memoizing closure calculator over one catalog
#[derive(Debug)]
pub struct DependencyResolver<'a> {
    catalog: &'a ServiceCatalog,
    memo: DashMap<(ServiceKey, TraversalMode), Closure>,
}

impl<'a> DependencyResolver<'a> {
    /// Create resolver for a catalog
    #[must_use]
    pub fn new(catalog: &'a ServiceCatalog) -> Self {
        Self {
            catalog,
            memo: DashMap::new(),
        }
    }

    /// Catalog being resolved against
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &'a ServiceCatalog {
        self.catalog
    }

    /// Every service reachable from `seed`
    ///
    /// Names missing from the catalog appear in the result but are not
    /// expanded further. The seed itself is never part of its own closure,
    /// even when a cycle leads back to it.
    pub fn closure(&self, seed: &ServiceKey, include_kernel_mode: bool) -> Closure {
        let mode = TraversalMode::from_flag(include_kernel_mode);
        let memo_key = (seed.clone(), mode);

        if let Some(hit) = self.memo.get(&memo_key) {
            return Arc::clone(hit.value());
        }

        let closure = Arc::new(self.traverse(seed, mode));
        self.memo.insert(memo_key, Arc::clone(&closure));
        closure
    }

    /// Direct dependencies that survive the mode filter
    ///
    /// Unknown seeds have no dependencies.
    pub fn direct(&self, key: &ServiceKey, mode: TraversalMode) -> Vec<ServiceKey> {
        let Some(record) = self.catalog.get(key) else {
            return Vec::new();
        };

        record
            .dependency_keys()
            .filter(|dep| match mode {
                TraversalMode::IncludeKernelMode => true,
                TraversalMode::UserModeOnly => self.catalog.is_user_mode(dep),
            })
            .collect()
    }

    fn traverse(&self, seed: &ServiceKey, mode: TraversalMode) -> BTreeSet<ServiceKey> {
        let mut seen = HashSet::from([seed.clone()]);
        let mut stack = Vec::new();
        let mut closure = BTreeSet::new();

        for dep in self.direct(seed, mode) {
            if seen.insert(dep.clone()) {
                stack.push(dep);
            }
        }

        while let Some(key) = stack.pop() {
            for dep in self.direct(&key, mode) {
                if seen.insert(dep.clone()) {
                    stack.push(dep);
                }
            }
            closure.insert(key);
        }

        closure
    }

    /// Indented dependency tree rooted at `seed`
    ///
    /// Each service is expanded once; later occurrences are marked as
    /// repeats and left unexpanded.
    pub fn dependency_tree(&self, seed: &ServiceKey, include_kernel_mode: bool) -> DependencyTree {
        let mode = TraversalMode::from_flag(include_kernel_mode);
        let mut expanded = HashSet::new();
        self.subtree(seed, mode, &mut expanded)
    }

    fn subtree(
        &self,
        key: &ServiceKey,
        mode: TraversalMode,
        expanded: &mut HashSet<ServiceKey>,
    ) -> DependencyTree {
        let name = self.catalog.display_name(key).to_string();

        if !expanded.insert(key.clone()) {
            return DependencyTree {
                name,
                repeated: true,
                children: Vec::new(),
            };
        }

        let mut deps = self.direct(key, mode);
        deps.sort();
        deps.dedup();

        let children = deps
            .iter()
            .map(|dep| self.subtree(dep, mode, expanded))
            .collect();

        DependencyTree {
            name,
            repeated: false,
            children,
        }
    }
}

/// Rendered-ready dependency tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyTree {
    /// Display name of this node
    pub name: String,

    /// Node was already expanded elsewhere in the tree
    pub repeated: bool,

    /// Direct dependencies, sorted by key
    pub children: Vec<DependencyTree>,
}

impl DependencyTree {
    /// Render as indented lines, two spaces per level
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_into(0, &mut lines);
        lines
    }

    fn render_into(&self, depth: usize, lines: &mut Vec<String>) {
        let marker = if self.repeated { " (*)" } else { "" };
        lines.push(format!("{}{}{marker}", "  ".repeat(depth), self.name));
        for child in &self.children {
            child.render_into(depth + 1, lines);
        }
    }
}
