//! In-memory visitor, blog view and pageview analytics.
//!
//! [Analytics] owns the visitor registry and the event store behind a single
//! lock. Tracking calls take the write half for their whole check-then-act
//! sequence, so two requests carrying the same fingerprint can never both
//! register a visitor, and a view's unique flag always reflects every view
//! stored before it. Readers get owned snapshots.

pub mod aggregation;
pub mod error;
pub mod events;
pub mod maintenance;
pub mod registry;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::analytics::aggregation::{
    BlogAnalytics, BlogAnalyticsSummary, BlogStats, PageviewStats, VisitorStats,
};
use crate::analytics::error::{AnalyticsError, Result};
use crate::analytics::events::{EventStore, SlugViews};
use crate::analytics::maintenance::{OriginOverview, PurgeOutcome, PurgePlan};
use crate::analytics::registry::VisitorRegistry;
use crate::models::blog_view::BlogView;
use crate::models::origin::TrafficOrigin;
use crate::models::pageview::{Pageview, PageviewContext};
use crate::models::visitor::{Visitor, VisitorAttributes};

/// Visitor token used when a blog view arrives without one.
pub const ANONYMOUS_VISITOR: &str = "anonymous";

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Reject blog views naming an unregistered visitor instead of
    /// registering a placeholder visitor.
    pub strict_visitor_references: bool,
    /// Length of top-N rankings and of the recent-visitor list.
    pub top_n: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            strict_visitor_references: false,
            top_n: 10,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSizes {
    pub visitors: usize,
    pub blog_views: usize,
    pub pageviews: usize,
}

/// Result of the one-shot "count a view of this post" call.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogViewIncrement {
    pub slug: String,
    pub total_views: usize,
    pub unique_views: usize,
    pub is_new_view: bool,
}

#[derive(Debug)]
struct Inner {
    registry: VisitorRegistry,
    store: EventStore,
}

#[derive(Debug)]
pub struct Analytics {
    config: AnalyticsConfig,
    inner: RwLock<Inner>,
}

impl Default for Analytics {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

impl Analytics {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(Inner {
                registry: VisitorRegistry::new(),
                store: EventStore::new(),
            }),
        }
    }

    pub fn sizes(&self) -> StoreSizes {
        let inner = self.inner.read();
        StoreSizes {
            visitors: inner.registry.len(),
            blog_views: inner.store.blog_views().len(),
            pageviews: inner.store.pageviews().len(),
        }
    }

    pub fn track_visitor(&self, attributes: VisitorAttributes, hint: Option<&str>) -> (Visitor, bool) {
        self.track_visitor_at(attributes, hint, Utc::now())
    }

    pub fn track_visitor_at(
        &self,
        attributes: VisitorAttributes,
        hint: Option<&str>,
        now: DateTime<Utc>,
    ) -> (Visitor, bool) {
        self.inner.write().registry.resolve_or_create(attributes, hint, now)
    }

    #[cfg(test)]
    pub fn visitor(&self, token: &str) -> Option<Visitor> {
        self.inner.read().registry.get(token).cloned()
    }

    /// Record a view of `slug` by `visitor_id`, returning the stored view and the
    /// slug's running total.
    pub fn track_blog_view(
        &self,
        visitor_id: &str,
        slug: &str,
        title: &str,
        origin: TrafficOrigin,
    ) -> Result<(BlogView, usize)> {
        self.track_blog_view_at(visitor_id, slug, title, origin, Utc::now())
    }

    pub fn track_blog_view_at(
        &self,
        visitor_id: &str,
        slug: &str,
        title: &str,
        origin: TrafficOrigin,
        now: DateTime<Utc>,
    ) -> Result<(BlogView, usize)> {
        let mut inner = self.inner.write();
        self.ensure_visitor(&mut inner, visitor_id, now)?;
        Ok(inner.store.append_blog_view(visitor_id, slug, title, origin, now))
    }

    pub fn increment_blog_view(
        &self,
        slug: &str,
        session_id: Option<&str>,
        origin: TrafficOrigin,
    ) -> Result<BlogViewIncrement> {
        self.increment_blog_view_at(slug, session_id, origin, Utc::now())
    }

    /// Count a view of `slug` for the visitor in `session_id`, or for the shared
    /// anonymous visitor when there is none.
    pub fn increment_blog_view_at(
        &self,
        slug: &str,
        session_id: Option<&str>,
        origin: TrafficOrigin,
        now: DateTime<Utc>,
    ) -> Result<BlogViewIncrement> {
        let visitor_id = session_id
            .filter(|s| !s.is_empty())
            .unwrap_or(ANONYMOUS_VISITOR);
        let title = format!("Blog post: {}", slug);

        let mut inner = self.inner.write();
        self.ensure_visitor(&mut inner, visitor_id, now)?;
        let (view, _) = inner.store.append_blog_view(visitor_id, slug, &title, origin, now);
        let views = inner.store.views_for_slug(slug, now);

        Ok(BlogViewIncrement {
            slug: views.slug,
            total_views: views.total_views,
            unique_views: views.unique_views,
            is_new_view: view.is_unique_view,
        })
    }

    // Unknown tokens are tolerated by registering a placeholder visitor; the
    // view itself still carries the caller's token.
    fn ensure_visitor(&self, inner: &mut Inner, visitor_id: &str, now: DateTime<Utc>) -> Result<()> {
        if inner.registry.get(visitor_id).is_some() {
            return Ok(());
        }
        if self.config.strict_visitor_references {
            return Err(AnalyticsError::UnknownVisitor(visitor_id.to_string()));
        }
        log::warn!(
            "Blog view from unregistered visitor {}, registering placeholder visitor",
            visitor_id
        );
        inner
            .registry
            .resolve_or_create(VisitorAttributes::unknown(), None, now);
        Ok(())
    }

    pub fn track_pageview(
        &self,
        url: String,
        title: Option<String>,
        referrer: Option<String>,
        user_agent: Option<String>,
        client_timestamp: Option<DateTime<Utc>>,
        context: PageviewContext,
    ) -> Pageview {
        self.inner.write().store.append_pageview(
            url,
            title,
            referrer,
            user_agent,
            client_timestamp,
            context,
            Utc::now(),
        )
    }

    pub fn blog_views(&self, slug: &str) -> SlugViews {
        self.blog_views_at(slug, Utc::now())
    }

    pub fn blog_views_at(&self, slug: &str, now: DateTime<Utc>) -> SlugViews {
        self.inner.read().store.views_for_slug(slug, now)
    }

    pub fn pageview_stats(&self) -> PageviewStats {
        self.pageview_stats_at(Utc::now())
    }

    pub fn pageview_stats_at(&self, now: DateTime<Utc>) -> PageviewStats {
        aggregation::pageview_stats(&self.inner.read().store, self.config.top_n, now)
    }

    pub fn blog_stats(&self) -> BlogStats {
        aggregation::blog_stats(&self.inner.read().store, self.config.top_n)
    }

    pub fn visitor_stats(&self) -> VisitorStats {
        let inner = self.inner.read();
        aggregation::visitor_stats(&inner.registry, &inner.store, self.config.top_n)
    }

    pub fn blog_analytics(&self, slug: &str) -> BlogAnalytics {
        aggregation::blog_analytics(&self.inner.read().store, slug, Utc::now())
    }

    pub fn multiple_blog_analytics(&self, slugs: &[String]) -> Vec<BlogAnalyticsSummary> {
        aggregation::multiple_blog_analytics(&self.inner.read().store, slugs, Utc::now())
    }

    pub fn origin_overview(&self) -> OriginOverview {
        maintenance::origin_overview(&self.inner.read().store)
    }

    /// Remove all non-canonical blog views under one write lock.
    pub fn purge_non_canonical(&self) -> PurgeOutcome {
        maintenance::purge_by_origin(&mut self.inner.write().store)
    }

    /// Snapshot the non-canonical views without removing anything, so they can
    /// be archived before [Analytics::apply_purge] drops them.
    pub fn plan_purge(&self) -> PurgePlan {
        maintenance::plan_purge(&self.inner.read().store)
    }

    pub fn apply_purge(&self, plan: &PurgePlan) -> PurgeOutcome {
        maintenance::apply_purge(&mut self.inner.write().store, plan)
    }
}
