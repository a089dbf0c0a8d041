//! Filter specification and resolution.
//!
//! Raw caller input ([`FilterArgs`]) is validated exactly once into a closed
//! [`MonitorSelector`]; the [`FilterResolver`] then turns a selector into the
//! concrete, ordered set of monitors to act on.

use std::fmt;

use tracing::debug;

use crate::error::{MonitorError, Result};
use crate::repository::{MonitorRepository, TagQuery};
use crate::types::{Monitor, MonitorId};

/// Normalizes a state string for comparison.
///
/// Trims, treats `-` and `_` as spaces, collapses whitespace runs and
/// lowercases, so `No-Data`, `no_data` and `No   Data` compare equal.
#[must_use]
pub fn canonical_state(state: &str) -> String {
    state
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Splits a comma-separated tag list, trimming entries and dropping blanks.
#[must_use]
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Desired overall state, stored in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePredicate(String);

impl StatePredicate {
    /// Creates a predicate; `None` when the canonical form is empty.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let canonical = canonical_state(raw);
        (!canonical.is_empty()).then_some(Self(canonical))
    }

    /// Exact comparison on the canonical form.
    #[must_use]
    pub fn matches(&self, state: &str) -> bool {
        canonical_state(state) == self.0
    }

    /// Returns the canonical form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `service`/`env`/`namespace` constraints, matched as exact `key:value`
/// tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeFilter {
    /// Service name.
    pub service: Option<String>,
    /// Environment.
    pub env: Option<String>,
    /// Kubernetes namespace.
    pub namespace: Option<String>,
}

impl CompositeFilter {
    /// Returns true if no constraint is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.service.is_none() && self.env.is_none() && self.namespace.is_none()
    }

    /// Returns the constraints as `key:value` tags.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        [
            ("service", &self.service),
            ("env", &self.env),
            ("namespace", &self.namespace),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| format!("{key}:{v}")))
        .collect()
    }

    /// Returns true if the monitor carries every constraint verbatim.
    ///
    /// `service:checkout` does not match a monitor tagged only
    /// `service:checkout-api`.
    #[must_use]
    pub fn matches(&self, monitor: &Monitor) -> bool {
        self.tags().iter().all(|tag| monitor.has_tag(tag))
    }
}

/// How the candidate set is obtained from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterStrategy {
    /// Every monitor.
    All,
    /// Exact tag constraints, ANDed.
    ExactTags {
        /// Composite constraints, also re-checked locally.
        composite: CompositeFilter,
        /// Additional raw constraints forwarded to the provider.
        tags: TagQuery,
    },
    /// Provider free-text search, narrowed by composite constraints locally.
    FreeText {
        /// Search text, passed through uninterpreted.
        text: String,
        /// Composite constraints applied after the search.
        composite: CompositeFilter,
    },
    /// Provider-native boolean query, e.g. `service:(a OR b)`.
    Query(String),
}

impl FilterStrategy {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ExactTags { .. } => "exact-tags",
            Self::FreeText { .. } => "free-text",
            Self::Query(_) => "query",
        }
    }
}

/// A validated filter: a primary strategy plus an optional state post-filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorFilter {
    /// Primary strategy.
    pub strategy: FilterStrategy,
    /// State post-filter.
    pub state: Option<StatePredicate>,
}

impl MonitorFilter {
    /// A filter matching every monitor.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            strategy: FilterStrategy::All,
            state: None,
        }
    }
}

/// Which monitors an operation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorSelector {
    /// Exactly one monitor; bypasses every filter.
    ById(MonitorId),
    /// Every monitor the filter resolves to.
    Filtered(MonitorFilter),
}

impl MonitorSelector {
    /// Returns the monitor ID for single-monitor selectors.
    #[must_use]
    pub const fn id(&self) -> Option<MonitorId> {
        match self {
            Self::ById(id) => Some(*id),
            Self::Filtered(_) => None,
        }
    }
}

impl fmt::Display for MonitorSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ById(id) => write!(f, "monitor {id}"),
            Self::Filtered(filter) => write!(f, "{} filter", filter.strategy.name()),
        }
    }
}

/// Whether an empty filter may select every monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRequirement {
    /// Empty input resolves to all monitors (listing, `delete-all`).
    AllowAll,
    /// A monitor ID or at least one filter is required (tag mutations).
    Explicit,
}

/// Raw filter input as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterArgs {
    /// Single-monitor selector.
    pub monitor_id: Option<u64>,
    /// `service:` constraint.
    pub service: Option<String>,
    /// `env:` constraint.
    pub env: Option<String>,
    /// `namespace:` constraint.
    pub namespace: Option<String>,
    /// Raw tag constraints.
    pub tags: Vec<String>,
    /// Free-text search.
    pub search: Option<String>,
    /// Provider-native query.
    pub query: Option<String>,
    /// Desired overall state.
    pub state: Option<String>,
}

fn present(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl FilterArgs {
    /// Validates the combination and builds the selector.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Validation` if:
    /// - a monitor ID is combined with any filter or state
    /// - a query is combined with service/env/namespace/tags/search
    /// - free-text search is combined with raw tag constraints
    /// - `requirement` is `Explicit` and neither an ID nor a filter is given
    pub fn into_selector(self, requirement: TargetRequirement) -> Result<MonitorSelector> {
        let composite = CompositeFilter {
            service: present(self.service.as_ref()),
            env: present(self.env.as_ref()),
            namespace: present(self.namespace.as_ref()),
        };
        let tags = TagQuery::from_tags(self.tags);
        let search = present(self.search.as_ref());
        let query = present(self.query.as_ref());
        let state = self.state.as_deref().and_then(StatePredicate::new);

        let has_filters =
            !composite.is_empty() || !tags.is_empty() || search.is_some() || query.is_some();

        if let Some(id) = self.monitor_id {
            if has_filters || state.is_some() {
                return Err(MonitorError::validation(
                    "cannot use --monitor-id together with filter flags",
                ));
            }
            if id == 0 {
                return Err(MonitorError::validation("monitor ID must be positive"));
            }
            return Ok(MonitorSelector::ById(MonitorId(id)));
        }

        if query.is_some() && (!composite.is_empty() || !tags.is_empty() || search.is_some()) {
            return Err(MonitorError::validation(
                "cannot use --query together with other filter flags \
                 (--service, --env, --namespace, --filter-tags)",
            ));
        }

        if search.is_some() && !tags.is_empty() {
            return Err(MonitorError::validation(
                "cannot combine a free-text search with exact tag filters",
            ));
        }

        if !has_filters && requirement == TargetRequirement::Explicit {
            return Err(MonitorError::validation(
                "either --monitor-id or filter flags \
                 (--service, --env, --namespace, --filter-tags, --query) must be provided",
            ));
        }

        let strategy = match (query, search) {
            (Some(query), _) => FilterStrategy::Query(query),
            (None, Some(text)) => FilterStrategy::FreeText { text, composite },
            (None, None) if composite.is_empty() && tags.is_empty() => FilterStrategy::All,
            (None, None) => FilterStrategy::ExactTags { composite, tags },
        };

        Ok(MonitorSelector::Filtered(MonitorFilter { strategy, state }))
    }
}

/// Resolves selectors against a repository.
#[derive(Debug)]
pub struct FilterResolver<'a, R> {
    repo: &'a R,
}

impl<'a, R: MonitorRepository> FilterResolver<'a, R> {
    /// Creates a resolver over the given repository.
    #[must_use]
    pub const fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Resolves the selector to monitors, in provider order.
    ///
    /// # Errors
    ///
    /// Returns the repository error if the lookup fails.
    pub async fn resolve(&self, selector: &MonitorSelector) -> Result<Vec<Monitor>> {
        match selector {
            MonitorSelector::ById(id) => Ok(vec![self.repo.get(*id).await?]),
            MonitorSelector::Filtered(filter) => self.resolve_filter(filter).await,
        }
    }

    async fn resolve_filter(&self, filter: &MonitorFilter) -> Result<Vec<Monitor>> {
        let mut monitors = match &filter.strategy {
            FilterStrategy::All => self.repo.list(&TagQuery::new(), None).await?,
            FilterStrategy::ExactTags { composite, tags } => {
                let mut query = TagQuery::from_tags(composite.tags());
                for tag in tags.tags() {
                    query.push(tag.as_str());
                }
                let mut found = self.repo.list(&query, None).await?;
                found.retain(|m| composite.matches(m));
                found
            }
            FilterStrategy::FreeText { text, composite } => {
                let mut found = self.repo.list(&TagQuery::new(), Some(text)).await?;
                found.retain(|m| composite.matches(m));
                found
            }
            FilterStrategy::Query(query) => {
                self.repo.list(&TagQuery::new(), Some(query)).await?
            }
        };

        let candidates = monitors.len();
        if let Some(state) = &filter.state {
            monitors.retain(|m| state.matches(m.state()));
        }

        debug!(
            strategy = filter.strategy.name(),
            state = filter.state.as_ref().map(StatePredicate::as_str),
            candidates,
            matched = monitors.len(),
            "resolved monitors"
        );
        Ok(monitors)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;
    use crate::memory::{InMemoryRepository, Operation, RecordedCall};

    fn args() -> FilterArgs {
        FilterArgs::default()
    }

    fn fleet() -> InMemoryRepository {
        InMemoryRepository::with_monitors([
            Monitor::new("a-hml")
                .with_id(1)
                .with_tags(["service:a", "env:hml"])
                .with_state("OK"),
            Monitor::new("b-hml")
                .with_id(2)
                .with_tags(["service:b", "env:hml"])
                .with_state("No Data"),
            Monitor::new("a-prd")
                .with_id(3)
                .with_tags(["service:a", "env:prd", "namespace:shop"])
                .with_state("Alert"),
            Monitor::new("a-api-hml")
                .with_id(4)
                .with_tags(["service:a-api", "env:hml"])
                .with_state("no_data"),
        ])
    }

    fn ids(monitors: &[Monitor]) -> Vec<u64> {
        monitors.iter().filter_map(|m| m.id).map(MonitorId::get).collect()
    }

    mod canonical_tests {
        use super::*;

        #[test]
        fn separators_and_case_are_equivalent() {
            let expected = canonical_state("No Data");
            assert_eq!(canonical_state("No-Data"), expected);
            assert_eq!(canonical_state("no_data"), expected);
            assert_eq!(canonical_state("No   Data"), expected);
            assert_eq!(canonical_state("  NO -_ data "), expected);
            assert_eq!(expected, "no data");
        }

        #[test]
        fn no_partial_matching() {
            let predicate = StatePredicate::new("No Data").expect("predicate");
            assert!(predicate.matches("no-data"));
            assert!(!predicate.matches("No"));
            assert!(!predicate.matches("No Data Yet"));
        }

        #[test]
        fn blank_state_is_no_predicate() {
            assert!(StatePredicate::new("  - _ ").is_none());
        }

        #[test]
        fn parse_tag_list_trims_and_drops_blanks() {
            assert_eq!(
                parse_tag_list(" team:core, ,env:hml,,"),
                vec!["team:core", "env:hml"]
            );
            assert!(parse_tag_list("").is_empty());
        }

        proptest! {
            #[test]
            fn prop_canonical_is_idempotent(s in "[A-Za-z _-]{0,24}") {
                let once = canonical_state(&s);
                prop_assert_eq!(canonical_state(&once), once.clone());
            }

            #[test]
            fn prop_separator_choice_does_not_matter(
                words in proptest::collection::vec("[a-zA-Z]{1,8}", 1..4),
                sep in prop_oneof![Just("-"), Just("_"), Just(" "), Just("   ")],
            ) {
                let joined = words.join(sep);
                prop_assert_eq!(canonical_state(&joined), words.join(" ").to_lowercase());
            }
        }
    }

    mod validation_tests {
        use super::*;
        use test_case::test_case;

        #[test_case(FilterArgs { monitor_id: Some(1), service: Some("a".into()), ..args() } ; "id with service")]
        #[test_case(FilterArgs { monitor_id: Some(1), state: Some("OK".into()), ..args() } ; "id with state")]
        #[test_case(FilterArgs { monitor_id: Some(1), query: Some("service:a".into()), ..args() } ; "id with query")]
        #[test_case(FilterArgs { query: Some("service:(a OR b)".into()), service: Some("a".into()), ..args() } ; "query with service")]
        #[test_case(FilterArgs { query: Some("x".into()), env: Some("hml".into()), ..args() } ; "query with env")]
        #[test_case(FilterArgs { query: Some("x".into()), tags: vec!["team:core".into()], ..args() } ; "query with tags")]
        #[test_case(FilterArgs { search: Some("cpu".into()), tags: vec!["team:core".into()], ..args() } ; "search with tags")]
        #[test_case(FilterArgs { state: Some("Alert".into()), ..args() } ; "state alone")]
        #[test_case(args() ; "nothing")]
        #[test_case(FilterArgs { monitor_id: Some(0), ..args() } ; "zero id")]
        fn rejects_invalid_combinations(input: FilterArgs) {
            let result = input.into_selector(TargetRequirement::Explicit);
            assert!(matches!(result, Err(MonitorError::Validation { .. })));
        }

        #[test]
        fn query_with_state_is_allowed() {
            let selector = FilterArgs {
                query: Some("service:(a OR b)".into()),
                state: Some("No-Data".into()),
                ..args()
            }
            .into_selector(TargetRequirement::Explicit)
            .expect("valid");

            let MonitorSelector::Filtered(filter) = selector else {
                panic!("expected filter");
            };
            assert_eq!(filter.strategy, FilterStrategy::Query("service:(a OR b)".into()));
            assert_eq!(filter.state.as_ref().map(StatePredicate::as_str), Some("no data"));
        }

        #[test]
        fn empty_allowed_when_listing() {
            let selector = args()
                .into_selector(TargetRequirement::AllowAll)
                .expect("valid");
            assert_eq!(selector, MonitorSelector::Filtered(MonitorFilter::all()));
        }

        #[test]
        fn blank_values_count_as_absent() {
            let selector = FilterArgs {
                monitor_id: Some(9),
                service: Some("  ".into()),
                query: Some(String::new()),
                ..args()
            }
            .into_selector(TargetRequirement::Explicit)
            .expect("valid");
            assert_eq!(selector.id(), Some(MonitorId(9)));
        }

        #[test]
        fn composite_becomes_exact_tags() {
            let selector = FilterArgs {
                service: Some("a".into()),
                namespace: Some("shop".into()),
                ..args()
            }
            .into_selector(TargetRequirement::Explicit)
            .expect("valid");
            let MonitorSelector::Filtered(filter) = selector else {
                panic!("expected filter");
            };
            let FilterStrategy::ExactTags { composite, tags } = filter.strategy else {
                panic!("expected exact tags");
            };
            assert_eq!(composite.tags(), vec!["service:a", "namespace:shop"]);
            assert!(tags.is_empty());
        }
    }

    mod resolver_tests {
        use super::*;

        async fn resolve(repo: &InMemoryRepository, input: FilterArgs) -> Vec<u64> {
            let selector = input
                .into_selector(TargetRequirement::AllowAll)
                .expect("valid");
            let monitors = FilterResolver::new(repo)
                .resolve(&selector)
                .await
                .expect("resolve");
            ids(&monitors)
        }

        #[tokio::test]
        async fn service_and_env_resolve_exactly() {
            let repo = InMemoryRepository::with_monitors([
                Monitor::new("one").with_id(1).with_tags(["service:a", "env:hml"]),
                Monitor::new("two").with_id(2).with_tags(["service:b", "env:hml"]),
            ]);
            let found = resolve(
                &repo,
                FilterArgs {
                    service: Some("a".into()),
                    env: Some("hml".into()),
                    ..args()
                },
            )
            .await;
            assert_eq!(found, vec![1]);
            assert_eq!(
                repo.calls(),
                vec![RecordedCall::List {
                    tags: vec!["service:a".into(), "env:hml".into()],
                    search: None,
                }]
            );
        }

        #[tokio::test]
        async fn composite_rejects_prefix_matches_from_provider() {
            let repo = fleet().with_prefix_tag_matching();
            let found = resolve(
                &repo,
                FilterArgs {
                    service: Some("a".into()),
                    env: Some("hml".into()),
                    ..args()
                },
            )
            .await;
            assert_eq!(found, vec![1]);
        }

        #[tokio::test]
        async fn free_text_is_post_filtered_by_composite() {
            let found = resolve(
                &fleet(),
                FilterArgs {
                    search: Some("service:a".into()),
                    env: Some("hml".into()),
                    ..args()
                },
            )
            .await;
            // the search also hits "service:a-api"; the composite env filter
            // keeps both hml ones
            assert_eq!(found, vec![1, 4]);

            let found = resolve(
                &fleet(),
                FilterArgs {
                    search: Some("hml".into()),
                    service: Some("a".into()),
                    ..args()
                },
            )
            .await;
            assert_eq!(found, vec![1]);
        }

        #[tokio::test]
        async fn query_forwards_text_and_applies_state() {
            let repo = fleet();
            let found = resolve(
                &repo,
                FilterArgs {
                    query: Some("env:hml".into()),
                    state: Some("No-Data".into()),
                    ..args()
                },
            )
            .await;
            assert_eq!(found, vec![2, 4]);
            assert_eq!(
                repo.calls(),
                vec![RecordedCall::List {
                    tags: vec![],
                    search: Some("env:hml".into()),
                }]
            );
        }

        #[tokio::test]
        async fn state_applies_after_exact_tags() {
            let found = resolve(
                &fleet(),
                FilterArgs {
                    service: Some("a".into()),
                    state: Some("alert".into()),
                    ..args()
                },
            )
            .await;
            assert_eq!(found, vec![3]);
        }

        #[tokio::test]
        async fn empty_filter_lists_everything_in_order() {
            let found = resolve(&fleet(), args()).await;
            assert_eq!(found, vec![1, 2, 3, 4]);
        }

        #[tokio::test]
        async fn by_id_uses_get() {
            let repo = fleet();
            let found = resolve(
                &repo,
                FilterArgs {
                    monitor_id: Some(3),
                    ..args()
                },
            )
            .await;
            assert_eq!(found, vec![3]);
            assert_eq!(repo.count(Operation::Get), 1);
            assert_eq!(repo.count(Operation::List), 0);
        }

        #[tokio::test]
        async fn list_failure_propagates() {
            let repo = fleet().failing_list();
            let selector = MonitorSelector::Filtered(MonitorFilter::all());
            let result = FilterResolver::new(&repo).resolve(&selector).await;
            assert!(matches!(result, Err(MonitorError::Remote { .. })));
        }
    }
}
