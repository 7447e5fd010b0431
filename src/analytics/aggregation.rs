//! Read-only statistics over the registry and event store.
//!
//! Nothing here is cached: every call walks the current collections, and every
//! time window is anchored at the `now` it is given. Rankings are by count,
//! descending, with ties left in the order the keys were first seen.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::analytics::events::EventStore;
use crate::analytics::registry::{RecentVisitor, VisitorRegistry};
use crate::models::blog_view::BlogView;

/// Days covered by the per-slug daily breakdown, today included.
pub const DAILY_HISTORY_DAYS: i64 = 30;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TopPage {
    pub url: String,
    pub count: usize,
    pub title: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PageviewStats {
    pub total: usize,
    pub today: usize,
    pub yesterday: usize,
    pub this_week: usize,
    pub unique_urls: usize,
    pub top_pages: Vec<TopPage>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TopPost {
    pub slug: String,
    pub title: String,
    pub view_count: usize,
    pub unique_viewers: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BlogStats {
    pub total_blog_posts: usize,
    pub total_views: usize,
    pub total_unique_views: usize,
    pub average_views_per_post: f64,
    pub top_posts: Vec<TopPost>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VisitorStats {
    pub total_visitors: usize,
    pub new_visitors: usize,
    pub returning_visitors: usize,
    pub total_blog_views: usize,
    pub unique_blog_views: usize,
    pub top_blog_posts: Vec<TopPost>,
    pub recent_visitors: Vec<RecentVisitor>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DailyViews {
    pub date: NaiveDate,
    pub views: usize,
    pub unique_views: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BlogAnalytics {
    pub slug: String,
    pub total_views: usize,
    pub unique_views: usize,
    pub recent_views: usize,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub daily_views: Vec<DailyViews>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BlogAnalyticsSummary {
    pub slug: String,
    pub total_views: usize,
    pub unique_views: usize,
    pub recent_views: usize,
}

/// Count and distinct viewers per slug, in first-seen slug order.
struct SlugTally<'a> {
    slug: &'a str,
    title: &'a str,
    count: usize,
    viewers: HashSet<&'a str>,
}

fn tally_slugs(views: &[BlogView]) -> Vec<SlugTally<'_>> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut tallies: Vec<SlugTally> = Vec::new();
    for view in views {
        let pos = *positions.entry(view.blog_slug.as_str()).or_insert_with(|| {
            tallies.push(SlugTally {
                slug: &view.blog_slug,
                title: &view.blog_title,
                count: 0,
                viewers: HashSet::new(),
            });
            tallies.len() - 1
        });
        let tally = &mut tallies[pos];
        tally.count += 1;
        tally.viewers.insert(&view.visitor_id);
    }
    tallies
}

fn top_posts(tallies: &[SlugTally], limit: usize) -> Vec<TopPost> {
    let mut ranked: Vec<&SlugTally> = tallies.iter().collect();
    // stable: equal counts stay in first-seen order
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
        .into_iter()
        .take(limit)
        .map(|t| TopPost {
            slug: t.slug.to_string(),
            title: t.title.to_string(),
            view_count: t.count,
            unique_viewers: t.viewers.len(),
        })
        .collect()
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::default()).and_utc()
}

pub fn pageview_stats(store: &EventStore, limit: usize, now: DateTime<Utc>) -> PageviewStats {
    let today_start = start_of_day(now);
    let yesterday_start = today_start - Duration::days(1);
    let week_start = today_start - Duration::days(7);

    let pageviews = store.pageviews();
    let mut today = 0;
    let mut yesterday = 0;
    let mut this_week = 0;

    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut pages: Vec<TopPage> = Vec::new();

    for pageview in pageviews {
        let ts = pageview.timestamp;
        if ts >= today_start {
            today += 1;
        } else if ts >= yesterday_start {
            yesterday += 1;
        }
        if ts >= week_start {
            this_week += 1;
        }

        let pos = *positions.entry(pageview.url.as_str()).or_insert_with(|| {
            pages.push(TopPage {
                url: pageview.url.clone(),
                count: 0,
                title: pageview.title.clone(),
            });
            pages.len() - 1
        });
        pages[pos].count += 1;
    }

    let unique_urls = pages.len();
    pages.sort_by(|a, b| b.count.cmp(&a.count));
    pages.truncate(limit);

    PageviewStats {
        total: pageviews.len(),
        today,
        yesterday,
        this_week,
        unique_urls,
        top_pages: pages,
    }
}

pub fn blog_stats(store: &EventStore, limit: usize) -> BlogStats {
    let tallies = tally_slugs(store.blog_views());
    let total_blog_posts = tallies.len();
    let total_views: usize = tallies.iter().map(|t| t.count).sum();
    let total_unique_views = tallies.iter().map(|t| t.viewers.len()).sum();
    let average_views_per_post = if total_blog_posts > 0 {
        total_views as f64 / total_blog_posts as f64
    } else {
        0.0
    };

    BlogStats {
        total_blog_posts,
        total_views,
        total_unique_views,
        average_views_per_post,
        top_posts: top_posts(&tallies, limit),
    }
}

pub fn visitor_stats(registry: &VisitorRegistry, store: &EventStore, limit: usize) -> VisitorStats {
    let summary = registry.summary(limit);
    let views = store.blog_views();
    let tallies = tally_slugs(views);
    let unique_blog_views = views
        .iter()
        .map(|v| v.visitor_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    VisitorStats {
        total_visitors: summary.total_visitors,
        new_visitors: summary.new_visitors,
        returning_visitors: summary.returning_visitors,
        total_blog_views: views.len(),
        unique_blog_views,
        top_blog_posts: top_posts(&tallies, limit),
        recent_visitors: summary.recent_visitors,
    }
}

/// Views of `slug` per UTC day, oldest first, ending today.
pub fn daily_views(store: &EventStore, slug: &str, now: DateTime<Utc>) -> Vec<DailyViews> {
    let today = now.date_naive();
    let mut per_day: HashMap<NaiveDate, (usize, HashSet<&str>)> = HashMap::new();
    for view in store.blog_views().iter().filter(|v| v.blog_slug == slug) {
        let entry = per_day.entry(view.viewed_at.date_naive()).or_default();
        entry.0 += 1;
        entry.1.insert(&view.visitor_id);
    }

    (0..DAILY_HISTORY_DAYS)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);
            let (views, unique_views) = per_day
                .get(&date)
                .map(|(count, viewers)| (*count, viewers.len()))
                .unwrap_or_default();
            DailyViews {
                date,
                views,
                unique_views,
            }
        })
        .collect()
}

pub fn blog_analytics(store: &EventStore, slug: &str, now: DateTime<Utc>) -> BlogAnalytics {
    let views = store.views_for_slug(slug, now);
    BlogAnalytics {
        slug: views.slug,
        total_views: views.total_views,
        unique_views: views.unique_views,
        recent_views: views.recent_views,
        last_viewed_at: views.last_viewed_at,
        daily_views: daily_views(store, slug, now),
    }
}

pub fn multiple_blog_analytics(
    store: &EventStore,
    slugs: &[String],
    now: DateTime<Utc>,
) -> Vec<BlogAnalyticsSummary> {
    slugs
        .iter()
        .map(|slug| {
            let views = store.views_for_slug(slug, now);
            BlogAnalyticsSummary {
                slug: views.slug,
                total_views: views.total_views,
                unique_views: views.unique_views,
                recent_views: views.recent_views,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::origin::TrafficOrigin;
    use crate::models::pageview::PageviewContext;
    use crate::models::visitor::VisitorAttributes;
    use chrono::TimeZone;

    fn pageview(store: &mut EventStore, url: &str, at: DateTime<Utc>, now: DateTime<Utc>) {
        store.append_pageview(
            url.to_string(),
            Some(format!("Title of {}", url)),
            None,
            None,
            Some(at),
            PageviewContext::default(),
            now,
        );
    }

    fn view(store: &mut EventStore, visitor: &str, slug: &str, at: DateTime<Utc>) {
        store.append_blog_view(visitor, slug, &slug.to_uppercase(), TrafficOrigin::Production, at);
    }

    #[test]
    fn empty_store_is_all_zero() {
        let store = EventStore::new();
        let stats = pageview_stats(&store, 10, Utc::now());
        assert_eq!(
            stats,
            PageviewStats {
                total: 0,
                today: 0,
                yesterday: 0,
                this_week: 0,
                unique_urls: 0,
                top_pages: vec![],
            }
        );

        let blog = blog_stats(&store, 10);
        assert_eq!(blog.total_blog_posts, 0);
        assert_eq!(blog.average_views_per_post, 0.0);
        assert!(blog.top_posts.is_empty());

        let visitors = visitor_stats(&VisitorRegistry::new(), &store, 10);
        assert_eq!(visitors.total_visitors, 0);
        assert_eq!(visitors.unique_blog_views, 0);
    }

    #[test]
    fn pageview_windows_are_day_aligned() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 10, 0, 0).unwrap();
        let mut store = EventStore::new();
        pageview(&mut store, "/a", Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap(), now);
        pageview(&mut store, "/a", Utc.with_ymd_and_hms(2024, 5, 14, 23, 59, 59).unwrap(), now);
        pageview(&mut store, "/b", Utc.with_ymd_and_hms(2024, 5, 14, 0, 0, 0).unwrap(), now);
        pageview(&mut store, "/c", Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap(), now);
        pageview(&mut store, "/c", Utc.with_ymd_and_hms(2024, 5, 7, 23, 0, 0).unwrap(), now);

        let stats = pageview_stats(&store, 10, now);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.today, 1);
        assert_eq!(stats.yesterday, 2);
        assert_eq!(stats.this_week, 4);
        assert_eq!(stats.unique_urls, 3);
    }

    #[test]
    fn top_pages_break_ties_by_first_seen() {
        let now = Utc::now();
        let mut store = EventStore::new();
        for url in ["/b", "/a", "/c", "/a", "/b", "/d"] {
            pageview(&mut store, url, now, now);
        }
        let stats = pageview_stats(&store, 3, now);
        let urls: Vec<_> = stats.top_pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["/b", "/a", "/c"]);
        assert_eq!(stats.top_pages[0].count, 2);
        assert_eq!(stats.top_pages[0].title.as_deref(), Some("Title of /b"));
        assert_eq!(stats.unique_urls, 4);
    }

    #[test]
    fn blog_stats_sum_per_slug() {
        let now = Utc::now();
        let mut store = EventStore::new();
        view(&mut store, "A", "x", now);
        view(&mut store, "A", "x", now);
        view(&mut store, "B", "x", now);
        view(&mut store, "A", "y", now);

        let stats = blog_stats(&store, 10);
        assert_eq!(stats.total_blog_posts, 2);
        assert_eq!(stats.total_views, 4);
        // x has A and B, y has A
        assert_eq!(stats.total_unique_views, 3);
        assert_eq!(stats.average_views_per_post, 2.0);
        assert_eq!(stats.top_posts[0].slug, "x");
        assert_eq!(stats.top_posts[0].title, "X");
        assert_eq!(stats.top_posts[0].unique_viewers, 2);
    }

    #[test]
    fn visitor_stats_union_viewers() {
        let now = Utc::now();
        let mut registry = VisitorRegistry::new();
        let mut attrs = VisitorAttributes::unknown();
        registry.resolve_or_create(attrs.clone(), None, now);
        attrs.user_agent = "other".to_string();
        registry.resolve_or_create(attrs.clone(), None, now);
        registry.resolve_or_create(attrs, None, now);

        let mut store = EventStore::new();
        view(&mut store, "A", "x", now);
        view(&mut store, "B", "x", now);
        view(&mut store, "A", "y", now);
        view(&mut store, "A", "y", now);
        view(&mut store, "A", "y", now);

        let stats = visitor_stats(&registry, &store, 10);
        assert_eq!(stats.total_visitors, 2);
        assert_eq!(stats.new_visitors, 1);
        assert_eq!(stats.returning_visitors, 1);
        assert_eq!(stats.total_blog_views, 5);
        assert_eq!(stats.unique_blog_views, 2);
        assert_eq!(stats.top_blog_posts[0].slug, "y");
        assert_eq!(stats.top_blog_posts[0].unique_viewers, 1);
        assert_eq!(stats.recent_visitors.len(), 2);
    }

    #[test]
    fn daily_breakdown_covers_thirty_days() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        let mut store = EventStore::new();
        view(&mut store, "A", "x", now);
        view(&mut store, "A", "x", now - Duration::hours(3));
        view(&mut store, "B", "x", now - Duration::days(2));
        view(&mut store, "B", "x", now - Duration::days(40));
        view(&mut store, "C", "other", now);

        let days = daily_views(&store, "x", now);
        assert_eq!(days.len(), DAILY_HISTORY_DAYS as usize);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 4, 16).unwrap());
        let last = days.last().unwrap();
        assert_eq!(last.date, now.date_naive());
        assert_eq!((last.views, last.unique_views), (2, 1));
        assert_eq!(days[27].views, 1);
        assert_eq!(days.iter().map(|d| d.views).sum::<usize>(), 3);
    }

    #[test]
    fn multiple_analytics_keep_request_order() {
        let now = Utc::now();
        let mut store = EventStore::new();
        view(&mut store, "A", "x", now);
        let slugs = vec!["missing".to_string(), "x".to_string()];
        let result = multiple_blog_analytics(&store, &slugs, now);
        assert_eq!(result[0].slug, "missing");
        assert_eq!(result[0].total_views, 0);
        assert_eq!(result[1].total_views, 1);

        let single = blog_analytics(&store, "x", now);
        assert_eq!(single.total_views, 1);
        assert_eq!(single.daily_views.len(), DAILY_HISTORY_DAYS as usize);
    }
}
