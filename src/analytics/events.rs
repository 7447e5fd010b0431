use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashSet;

use crate::models::blog_view::BlogView;
use crate::models::origin::TrafficOrigin;
use crate::models::pageview::{Pageview, PageviewContext};

/// Views newer than this count as "recent".
pub const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SlugViews {
    pub slug: String,
    pub total_views: usize,
    pub unique_views: usize,
    pub recent_views: usize,
    pub last_viewed_at: Option<DateTime<Utc>>,
}

/// Blog views and pageviews, in arrival order.
#[derive(Debug, Default)]
pub struct EventStore {
    blog_views: Vec<BlogView>,
    pageviews: Vec<Pageview>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blog_views(&self) -> &[BlogView] {
        &self.blog_views
    }

    pub fn pageviews(&self) -> &[Pageview] {
        &self.pageviews
    }

    /// Record a view of `slug` by `visitor_id`.
    ///
    /// The unique flag is decided against the views stored right now. Returns the
    /// stored event and the number of views of `slug` including this one.
    pub fn append_blog_view(
        &mut self,
        visitor_id: &str,
        slug: &str,
        title: &str,
        origin: TrafficOrigin,
        now: DateTime<Utc>,
    ) -> (BlogView, usize) {
        let mut prior = 0;
        let mut seen = false;
        for view in self.blog_views.iter().filter(|v| v.blog_slug == slug) {
            prior += 1;
            seen |= view.visitor_id == visitor_id;
        }

        let view = BlogView::new(
            visitor_id.to_string(),
            slug.to_string(),
            title.to_string(),
            now,
            !seen,
            origin,
        );
        log::debug!(
            "Blog view {} of {} by {} ({})",
            view.id,
            slug,
            visitor_id,
            origin
        );
        self.blog_views.push(view.clone());
        (view, prior + 1)
    }

    pub fn append_pageview(
        &mut self,
        url: String,
        title: Option<String>,
        referrer: Option<String>,
        user_agent: Option<String>,
        client_timestamp: Option<DateTime<Utc>>,
        context: PageviewContext,
        now: DateTime<Utc>,
    ) -> Pageview {
        let pageview = Pageview::new(
            url,
            title,
            referrer,
            user_agent,
            client_timestamp,
            context,
            now,
        );
        log::debug!("Pageview {} of {}", pageview.id, pageview.url);
        self.pageviews.push(pageview.clone());
        pageview
    }

    pub fn views_for_slug(&self, slug: &str, now: DateTime<Utc>) -> SlugViews {
        let recent_cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
        let mut viewers = HashSet::new();
        let mut total_views = 0;
        let mut recent_views = 0;
        let mut last_viewed_at: Option<DateTime<Utc>> = None;

        for view in self.blog_views.iter().filter(|v| v.blog_slug == slug) {
            total_views += 1;
            viewers.insert(view.visitor_id.as_str());
            if view.viewed_at >= recent_cutoff {
                recent_views += 1;
            }
            last_viewed_at = last_viewed_at.max(Some(view.viewed_at));
        }

        SlugViews {
            slug: slug.to_string(),
            total_views,
            unique_views: viewers.len(),
            recent_views,
            last_viewed_at,
        }
    }

    /// Remove every blog view matching `predicate`, returning what was removed.
    /// Pageviews are never purged.
    pub fn purge<F>(&mut self, predicate: F) -> Vec<BlogView>
    where
        F: Fn(&BlogView) -> bool,
    {
        let (removed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.blog_views).into_iter().partition(|v| predicate(v));
        self.blog_views = kept;
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_view_per_visitor_and_slug() {
        let mut store = EventStore::new();
        let now = Utc::now();

        let (v1, total) = store.append_blog_view("V", "intro", "Intro", TrafficOrigin::Production, now);
        assert!(v1.is_unique_view);
        assert_eq!(total, 1);

        // A different slug in between does not reset anything.
        let (other, _) = store.append_blog_view("V", "other", "Other", TrafficOrigin::Production, now);
        assert!(other.is_unique_view);

        let (v2, total) = store.append_blog_view("V", "intro", "Intro", TrafficOrigin::Production, now);
        assert!(!v2.is_unique_view);
        assert_eq!(total, 2);

        let (v3, total) = store.append_blog_view("V", "intro", "Intro", TrafficOrigin::Production, now);
        assert!(!v3.is_unique_view);
        assert_eq!(total, 3);

        let (w, total) = store.append_blog_view("W", "intro", "Intro", TrafficOrigin::Production, now);
        assert!(w.is_unique_view);
        assert_eq!(total, 4);
    }

    #[test]
    fn views_for_slug_aggregates() {
        let mut store = EventStore::new();
        let now = Utc::now();
        store.append_blog_view("A", "x", "X", TrafficOrigin::Production, now - Duration::days(10));
        store.append_blog_view("A", "x", "X", TrafficOrigin::Production, now - Duration::days(3));
        store.append_blog_view("B", "x", "X", TrafficOrigin::Local, now - Duration::hours(1));
        store.append_blog_view("C", "y", "Y", TrafficOrigin::Production, now);

        let views = store.views_for_slug("x", now);
        assert_eq!(views.total_views, 3);
        assert_eq!(views.unique_views, 2);
        assert_eq!(views.recent_views, 2);
        assert_eq!(views.last_viewed_at, Some(now - Duration::hours(1)));
        assert!(views.unique_views <= views.total_views);
    }

    #[test]
    fn unknown_slug_is_zero() {
        let views = EventStore::new().views_for_slug("missing", Utc::now());
        assert_eq!(views.total_views, 0);
        assert_eq!(views.unique_views, 0);
        assert_eq!(views.recent_views, 0);
        assert_eq!(views.last_viewed_at, None);
    }

    #[test]
    fn pageview_timestamp_falls_back_to_receipt() {
        let mut store = EventStore::new();
        let now = Utc::now();
        let earlier = now - Duration::minutes(5);

        let with = store.append_pageview(
            "/a".into(),
            None,
            None,
            None,
            Some(earlier),
            PageviewContext::default(),
            now,
        );
        let without = store.append_pageview(
            "/a".into(),
            None,
            None,
            None,
            None,
            PageviewContext::default(),
            now,
        );
        assert_eq!(with.timestamp, earlier);
        assert_eq!(with.tracked_at, now);
        assert_eq!(without.timestamp, now);
        assert_eq!(store.pageviews().len(), 2);
    }

    #[test]
    fn purge_matching_views() {
        let mut store = EventStore::new();
        let t0 = Utc::now();
        store.append_blog_view("A", "x", "X", TrafficOrigin::Production, t0);
        store.append_blog_view("B", "x", "X", TrafficOrigin::Local, t0 + Duration::seconds(1));
        store.append_blog_view("C", "x", "X", TrafficOrigin::Production, t0 + Duration::seconds(2));

        let removed = store.purge(|v| v.is_localhost());
        assert_eq!(removed.len(), 1);
        assert_eq!(store.blog_views().len(), 2);
        assert!(store.purge(|v| v.is_localhost()).is_empty());

        let visitors: Vec<_> = store.blog_views().iter().map(|v| v.visitor_id.as_str()).collect();
        assert_eq!(visitors, vec!["A", "C"]);
        assert_eq!(removed[0].visitor_id, "B");
    }
}
