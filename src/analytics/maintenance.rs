//! Separating local development traffic from production blog views.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::analytics::events::EventStore;
use crate::models::blog_view::BlogView;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SlugOriginBreakdown {
    pub slug: String,
    pub total: usize,
    pub production: usize,
    pub localhost: usize,
    pub unique_visitors: usize,
    pub localhost_visitors: usize,
}

/// Blog views split by origin. This is the snapshot taken before and after a purge.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OriginOverview {
    pub total_views: usize,
    pub localhost_views: usize,
    pub production_views: usize,
    pub total_visitors: usize,
    pub localhost_visitors: usize,
    pub production_visitors: usize,
    pub blog_stats: Vec<SlugOriginBreakdown>,
    pub oldest_view: Option<DateTime<Utc>>,
    pub latest_view: Option<DateTime<Utc>>,
    pub date_range_days: i64,
    pub localhost_percentage: f64,
}

#[derive(Debug, Clone)]
pub struct PurgeOutcome {
    pub removed_count: usize,
    pub before: OriginOverview,
    pub after: OriginOverview,
    pub removed: Vec<BlogView>,
}

#[derive(Default)]
struct SlugAccumulator<'a> {
    total: usize,
    localhost: usize,
    visitors: HashSet<&'a str>,
    localhost_visitors: HashSet<&'a str>,
}

pub fn origin_overview(store: &EventStore) -> OriginOverview {
    let views = store.blog_views();

    let mut all_visitors = HashSet::new();
    let mut localhost_visitors = HashSet::new();
    let mut production_visitors = HashSet::new();
    let mut localhost_views = 0;

    let mut order: Vec<&str> = Vec::new();
    let mut per_slug: HashMap<&str, SlugAccumulator> = HashMap::new();

    for view in views {
        let visitor = view.visitor_id.as_str();
        all_visitors.insert(visitor);

        let acc = per_slug.entry(view.blog_slug.as_str()).or_insert_with(|| {
            order.push(&view.blog_slug);
            SlugAccumulator::default()
        });
        acc.total += 1;
        acc.visitors.insert(visitor);

        if view.is_localhost() {
            localhost_views += 1;
            localhost_visitors.insert(visitor);
            acc.localhost += 1;
            acc.localhost_visitors.insert(visitor);
        } else {
            production_visitors.insert(visitor);
        }
    }

    let blog_stats = order
        .into_iter()
        .filter_map(|slug| {
            per_slug.get(slug).map(|acc| SlugOriginBreakdown {
                slug: slug.to_string(),
                total: acc.total,
                production: acc.total - acc.localhost,
                localhost: acc.localhost,
                unique_visitors: acc.visitors.len(),
                localhost_visitors: acc.localhost_visitors.len(),
            })
        })
        .collect();

    let oldest_view = views.iter().map(|v| v.viewed_at).min();
    let latest_view = views.iter().map(|v| v.viewed_at).max();
    let date_range_days = match (oldest_view, latest_view) {
        (Some(oldest), Some(latest)) => (latest - oldest).num_days(),
        _ => 0,
    };

    let total_views = views.len();
    let localhost_percentage = if total_views > 0 {
        (localhost_views as f64 / total_views as f64 * 10_000.0).round() / 100.0
    } else {
        0.0
    };

    OriginOverview {
        total_views,
        localhost_views,
        production_views: total_views - localhost_views,
        total_visitors: all_visitors.len(),
        localhost_visitors: localhost_visitors.len(),
        production_visitors: production_visitors.len(),
        blog_stats,
        oldest_view,
        latest_view,
        date_range_days,
        localhost_percentage,
    }
}

/// The non-canonical views a purge is about to remove, with the overview they
/// were taken from.
#[derive(Debug, Clone)]
pub struct PurgePlan {
    pub before: OriginOverview,
    pub views: Vec<BlogView>,
}

impl PurgePlan {
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

pub fn plan_purge(store: &EventStore) -> PurgePlan {
    PurgePlan {
        before: origin_overview(store),
        views: store
            .blog_views()
            .iter()
            .filter(|v| v.is_localhost())
            .cloned()
            .collect(),
    }
}

/// Remove exactly the views in `plan`, in one step.
///
/// Views stored after the plan was taken stay, local or not. With nothing to
/// remove the store is untouched and `before == after`.
pub fn apply_purge(store: &mut EventStore, plan: &PurgePlan) -> PurgeOutcome {
    let before = origin_overview(store);
    let ids: HashSet<&str> = plan.views.iter().map(|v| v.id.as_str()).collect();
    if ids.is_empty() {
        return PurgeOutcome {
            removed_count: 0,
            after: before.clone(),
            before,
            removed: Vec::new(),
        };
    }

    let removed = store.purge(|v| ids.contains(v.id.as_str()));
    let after = origin_overview(store);
    log::info!(
        "Purged {} local blog views ({} remain)",
        removed.len(),
        after.total_views
    );

    PurgeOutcome {
        removed_count: removed.len(),
        before,
        after,
        removed,
    }
}

/// Drop every non-canonical blog view in one step, snapshotting either side.
pub fn purge_by_origin(store: &mut EventStore) -> PurgeOutcome {
    let plan = plan_purge(store);
    apply_purge(store, &plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::origin::TrafficOrigin;
    use chrono::Duration;

    fn seeded() -> EventStore {
        let mut store = EventStore::new();
        let t0 = Utc::now() - Duration::days(3);
        for i in 0..5 {
            store.append_blog_view(
                &format!("P{}", i % 2),
                "x",
                "X",
                TrafficOrigin::Production,
                t0 + Duration::hours(i),
            );
        }
        for i in 0..3 {
            store.append_blog_view(
                "L",
                "x",
                "X",
                TrafficOrigin::Local,
                t0 + Duration::days(3) + Duration::minutes(i),
            );
        }
        store
    }

    #[test]
    fn overview_splits_by_origin() {
        let overview = origin_overview(&seeded());
        assert_eq!(overview.total_views, 8);
        assert_eq!(overview.localhost_views, 3);
        assert_eq!(overview.production_views, 5);
        assert_eq!(overview.total_visitors, 3);
        assert_eq!(overview.localhost_visitors, 1);
        assert_eq!(overview.production_visitors, 2);
        assert_eq!(overview.localhost_percentage, 37.5);
        assert_eq!(overview.date_range_days, 3);
        assert_eq!(
            overview.blog_stats,
            vec![SlugOriginBreakdown {
                slug: "x".to_string(),
                total: 8,
                production: 5,
                localhost: 3,
                unique_visitors: 3,
                localhost_visitors: 1,
            }]
        );
    }

    #[test]
    fn purge_removes_local_views() {
        let mut store = seeded();
        assert_eq!(store.views_for_slug("x", Utc::now()).total_views, 8);

        let outcome = purge_by_origin(&mut store);
        assert_eq!(outcome.removed_count, 3);
        assert_eq!(outcome.before.total_views, 8);
        assert_eq!(outcome.after.total_views, 5);
        assert_eq!(outcome.after.localhost_views, 0);
        assert!(outcome.removed.iter().all(|v| v.is_localhost()));
        assert_eq!(store.views_for_slug("x", Utc::now()).total_views, 5);
    }

    #[test]
    fn purge_is_idempotent() {
        let mut store = seeded();
        purge_by_origin(&mut store);

        let again = purge_by_origin(&mut store);
        assert_eq!(again.removed_count, 0);
        assert_eq!(again.before, again.after);
        assert!(again.removed.is_empty());
        assert_eq!(store.blog_views().len(), 5);
    }

    #[test]
    fn empty_store_overview() {
        let overview = origin_overview(&EventStore::new());
        assert_eq!(overview.total_views, 0);
        assert_eq!(overview.localhost_percentage, 0.0);
        assert_eq!(overview.oldest_view, None);
        assert!(overview.blog_stats.is_empty());
    }

    #[test]
    fn plan_leaves_later_views_alone() {
        let mut store = seeded();
        let plan = plan_purge(&store);
        assert_eq!(plan.views.len(), 3);
        assert_eq!(plan.before.localhost_views, 3);

        let (late, _) = store.append_blog_view("L", "x", "X", TrafficOrigin::Local, Utc::now());
        assert!(!late.is_unique_view);

        let outcome = apply_purge(&mut store, &plan);
        assert_eq!(outcome.removed_count, 3);
        assert_eq!(outcome.before.localhost_views, 4);
        assert_eq!(outcome.after.localhost_views, 1);
        assert_eq!(store.blog_views().len(), 6);
        assert!(store.blog_views().iter().any(|v| v.id == late.id));
    }
}
