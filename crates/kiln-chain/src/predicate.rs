//! Chunk-selection predicates and their composition.
//!
//! A cache group (and `optimization.splitChunks` itself) carries a `chunks`
//! slot deciding which chunks are eligible for grouping. Engines accept either
//! a policy literal (`"all"`, `"initial"`, `"async"`) or a function. Several
//! plugins may need to narrow that decision without knowing about each other,
//! so a slot moves through these states:
//!
//! ```text
//! unset ──compose──► composed(1) ──compose──► composed(n + 1)
//!   │                    ▲
//!   └──set──► policy / custom ──compose──┘
//! ```
//!
//! [`compose`] never touches the previous filter. It wraps it in a new
//! [`PredicateLayer`] whose exclusion rule is checked first: an exclusion
//! short-circuits and the wrapped filter is not consulted.

use std::fmt;
use std::sync::Arc;

/// Engine-provided view of a chunk being considered for grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkUnit {
    /// Chunk name, if the chunk is named
    pub name: Option<String>,
    /// The chunk is only ever loaded as part of an initial (entry) load
    pub only_initial: bool,
    /// The chunk may be loaded as part of an initial load
    pub can_be_initial: bool,
}

impl ChunkUnit {
    /// An async (lazily loaded) chunk with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            only_initial: false,
            can_be_initial: false,
        }
    }

    /// An initial (entry) chunk with the given name.
    pub fn initial(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            only_initial: true,
            can_be_initial: true,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_only_initial(&self) -> bool {
        self.only_initial
    }

    pub fn can_be_initial(&self) -> bool {
        self.can_be_initial
    }
}

/// Literal chunk policies understood by every engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkPolicy {
    /// Every chunk is eligible
    All,
    /// Only chunks that are exclusively initial
    Initial,
    /// Only chunks that can never be initial
    Async,
}

impl ChunkPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkPolicy::All => "all",
            ChunkPolicy::Initial => "initial",
            ChunkPolicy::Async => "async",
        }
    }

    /// Lift the literal into its function form.
    pub fn test(&self, unit: &ChunkUnit) -> bool {
        match self {
            ChunkPolicy::All => true,
            ChunkPolicy::Initial => unit.is_only_initial(),
            ChunkPolicy::Async => !unit.can_be_initial(),
        }
    }
}

impl std::str::FromStr for ChunkPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ChunkPolicy::All),
            "initial" => Ok(ChunkPolicy::Initial),
            "async" => Ok(ChunkPolicy::Async),
            other => Err(format!("unknown chunk policy: {other}")),
        }
    }
}

impl fmt::Display for ChunkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type PredicateFn = dyn Fn(&ChunkUnit) -> bool + Send + Sync;

/// A user- or plugin-supplied decision function with a label for inspection.
#[derive(Clone)]
pub struct CustomPredicate {
    label: String,
    func: Arc<PredicateFn>,
}

impl CustomPredicate {
    pub fn new(
        label: impl Into<String>,
        func: impl Fn(&ChunkUnit) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn test(&self, unit: &ChunkUnit) -> bool {
        (self.func)(unit)
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPredicate")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CustomPredicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

/// Condition under which a layer forces a chunk out of a group.
#[derive(Debug, Clone, PartialEq)]
pub enum ExclusionRule {
    /// Exclude the chunk whose name equals this value (unnamed and
    /// empty-named chunks pass)
    ChunkName(String),
    /// Exclude every chunk for which the predicate returns `true`
    Matching(CustomPredicate),
}

impl ExclusionRule {
    pub fn chunk_name(name: impl Into<String>) -> Self {
        ExclusionRule::ChunkName(name.into())
    }

    pub fn excludes(&self, unit: &ChunkUnit) -> bool {
        match self {
            ExclusionRule::ChunkName(name) => {
                !name.is_empty() && unit.name() == Some(name.as_str())
            }
            ExclusionRule::Matching(predicate) => predicate.test(unit),
        }
    }

    fn describe(&self) -> String {
        match self {
            ExclusionRule::ChunkName(name) => format!("exclude({name})"),
            ExclusionRule::Matching(predicate) => format!("exclude({})", predicate.label()),
        }
    }
}

/// One exclusion wrapped around whatever the slot held before.
#[derive(Debug, PartialEq)]
pub struct PredicateLayer {
    rule: ExclusionRule,
    prev: Option<ChunkFilter>,
}

impl PredicateLayer {
    pub fn rule(&self) -> &ExclusionRule {
        &self.rule
    }

    /// The wrapped filter; `None` means the include-everything baseline.
    pub fn prev(&self) -> Option<&ChunkFilter> {
        self.prev.as_ref()
    }
}

// Unwind long layer chains without recursing once per layer.
impl Drop for PredicateLayer {
    fn drop(&mut self) {
        let mut next = self.prev.take();
        while let Some(ChunkFilter::Composed(layer)) = next {
            next = match Arc::try_unwrap(layer) {
                Ok(mut inner) => inner.prev.take(),
                Err(_) => None,
            };
        }
    }
}

/// Value of a chunk-selection slot.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkFilter {
    Policy(ChunkPolicy),
    Custom(CustomPredicate),
    Composed(Arc<PredicateLayer>),
}

impl ChunkFilter {
    pub fn custom(
        label: impl Into<String>,
        func: impl Fn(&ChunkUnit) -> bool + Send + Sync + 'static,
    ) -> Self {
        ChunkFilter::Custom(CustomPredicate::new(label, func))
    }

    /// Decide whether `unit` is eligible.
    ///
    /// Composed layers are walked outermost first without recursion, so
    /// arbitrarily deep compositions cannot exhaust the stack.
    pub fn test(&self, unit: &ChunkUnit) -> bool {
        let mut current = self;
        loop {
            match current {
                ChunkFilter::Policy(policy) => return policy.test(unit),
                ChunkFilter::Custom(predicate) => return predicate.test(unit),
                ChunkFilter::Composed(layer) => {
                    if layer.rule.excludes(unit) {
                        return false;
                    }
                    match &layer.prev {
                        Some(prev) => current = prev,
                        None => return true,
                    }
                }
            }
        }
    }

    /// Number of composed layers above the base filter.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = Some(self);
        while let Some(ChunkFilter::Composed(layer)) = current {
            depth += 1;
            current = layer.prev.as_ref();
        }
        depth
    }

    /// Whether some layer already excludes the chunk called `name`.
    pub fn excludes_chunk_name(&self, name: &str) -> bool {
        let mut current = Some(self);
        while let Some(ChunkFilter::Composed(layer)) = current {
            if matches!(&layer.rule, ExclusionRule::ChunkName(excluded) if excluded == name) {
                return true;
            }
            current = layer.prev.as_ref();
        }
        false
    }

    /// The innermost filter, or `None` when the composition started unset.
    pub fn base(&self) -> Option<&ChunkFilter> {
        let mut current = self;
        while let ChunkFilter::Composed(layer) = current {
            current = layer.prev.as_ref()?;
        }
        Some(current)
    }

    /// Human-readable rendering used when serializing engine configuration.
    pub fn describe(&self) -> String {
        match self {
            ChunkFilter::Policy(policy) => policy.as_str().to_string(),
            ChunkFilter::Custom(predicate) => format!("[predicate {}]", predicate.label()),
            ChunkFilter::Composed(_) => {
                let mut parts = Vec::new();
                let mut current = Some(self);
                while let Some(filter) = current {
                    match filter {
                        ChunkFilter::Composed(layer) => {
                            parts.push(layer.rule.describe());
                            current = layer.prev.as_ref();
                        }
                        ChunkFilter::Policy(policy) => {
                            parts.push(policy.as_str().to_string());
                            current = None;
                        }
                        ChunkFilter::Custom(predicate) => {
                            parts.push(predicate.label().to_string());
                            current = None;
                        }
                    }
                }
                if self.base().is_none() {
                    parts.push("all".to_string());
                }
                format!("[predicate {}]", parts.join(" > "))
            }
        }
    }
}

impl From<ChunkPolicy> for ChunkFilter {
    fn from(policy: ChunkPolicy) -> Self {
        ChunkFilter::Policy(policy)
    }
}

/// Layer `rule` on top of `prev`.
///
/// The result excludes every unit `rule` excludes and otherwise answers
/// exactly as `prev` would have; an absent `prev` answers `true`.
pub fn compose(prev: Option<&ChunkFilter>, rule: ExclusionRule) -> ChunkFilter {
    ChunkFilter::Composed(Arc::new(PredicateLayer {
        rule,
        prev: prev.cloned(),
    }))
}

/// Convenience for the common "never group this named chunk" case.
pub fn exclude_chunk(prev: Option<&ChunkFilter>, name: impl Into<String>) -> ChunkFilter {
    compose(prev, ExclusionRule::chunk_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_slot_includes_everything_but_the_excluded_name() {
        let filter = exclude_chunk(None, "remote");
        assert!(!filter.test(&ChunkUnit::named("remote")));
        assert!(filter.test(&ChunkUnit::named("vendor")));
        assert!(filter.test(&ChunkUnit::default()));
    }

    #[test]
    fn initial_policy_is_lifted() {
        let filter = exclude_chunk(Some(&ChunkPolicy::Initial.into()), "remote");
        assert!(!filter.test(&ChunkUnit::initial("remote")));
        assert!(filter.test(&ChunkUnit::initial("main")));
        assert!(!filter.test(&ChunkUnit::named("lazy")));
    }

    #[test]
    fn async_policy_is_lifted() {
        let filter = exclude_chunk(Some(&ChunkPolicy::Async.into()), "remote");
        assert!(filter.test(&ChunkUnit::named("lazy")));
        assert!(!filter.test(&ChunkUnit::named("remote")));
        assert!(!filter.test(&ChunkUnit::initial("main")));
    }

    #[test]
    fn exclusion_short_circuits_before_previous_predicate() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let base = ChunkFilter::custom("counting", move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            true
        });

        let filter = exclude_chunk(Some(&base), "remote");
        assert!(!filter.test(&ChunkUnit::named("remote")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(filter.test(&ChunkUnit::named("other")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn composing_leaves_previous_layer_untouched() {
        let first = exclude_chunk(None, "x");
        let second = exclude_chunk(Some(&first), "y");

        assert!(first.test(&ChunkUnit::named("y")));
        assert!(!second.test(&ChunkUnit::named("y")));
        assert_eq!(first.depth(), 1);
        assert_eq!(second.depth(), 2);
    }

    #[test]
    fn deep_composition_does_not_overflow() {
        let mut filter = ChunkFilter::Policy(ChunkPolicy::All);
        for i in 0..50_000 {
            filter = exclude_chunk(Some(&filter), format!("chunk-{i}"));
        }
        assert!(!filter.test(&ChunkUnit::named("chunk-0")));
        assert!(filter.test(&ChunkUnit::named("main")));
        assert_eq!(filter.depth(), 50_000);
    }

    #[test]
    fn describe_lists_layers_outermost_first() {
        let filter = exclude_chunk(Some(&ChunkPolicy::Initial.into()), "remote");
        assert_eq!(filter.describe(), "[predicate exclude(remote) > initial]");

        let unset = exclude_chunk(None, "remote");
        assert_eq!(unset.describe(), "[predicate exclude(remote) > all]");
    }

    #[test]
    fn empty_name_never_matches() {
        let filter = exclude_chunk(None, "");
        assert!(filter.test(&ChunkUnit::named("")));
        assert!(filter.test(&ChunkUnit::default()));
    }

    #[test]
    fn finds_an_existing_exclusion_below_other_layers() {
        let remote = exclude_chunk(Some(&ChunkPolicy::All.into()), "remote");
        let both = exclude_chunk(Some(&remote), "admin");

        assert!(both.excludes_chunk_name("remote"));
        assert!(both.excludes_chunk_name("admin"));
        assert!(!both.excludes_chunk_name("main"));
        assert!(!ChunkFilter::Policy(ChunkPolicy::All).excludes_chunk_name("remote"));
    }
}
