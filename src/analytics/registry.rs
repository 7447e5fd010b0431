use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::models::visitor::{Visitor, VisitorAttributes};

/// One row of the "recently active" list.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecentVisitor {
    pub visitor_id: String,
    pub is_new_visitor: bool,
    pub total_visits: u64,
    pub last_visit_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VisitorSummary {
    pub total_visitors: usize,
    pub new_visitors: usize,
    pub returning_visitors: usize,
    pub recent_visitors: Vec<RecentVisitor>,
}

/// Owns every [Visitor], one per distinct fingerprint, in insertion order.
#[derive(Debug, Default)]
pub struct VisitorRegistry {
    visitors: Vec<Visitor>,
    // fingerprint -> position in `visitors`
    index: HashMap<String, usize>,
}

impl VisitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    /// Find the visitor for `attributes`, counting a visit, or register a new one.
    ///
    /// Returns a copy of the visitor as it stands after the call and whether it
    /// was created. `hint` is the token the client believes it has; identity is
    /// always derived from the attributes, so it is only logged when it disagrees.
    pub fn resolve_or_create(
        &mut self,
        attributes: VisitorAttributes,
        hint: Option<&str>,
        now: DateTime<Utc>,
    ) -> (Visitor, bool) {
        let fingerprint = attributes.fingerprint();
        if let Some(hint) = hint.filter(|h| *h != fingerprint) {
            log::debug!("Visitor hint {} does not match fingerprint {}", hint, fingerprint);
        }

        match self.index.get(&fingerprint) {
            Some(&pos) => {
                let visitor = &mut self.visitors[pos];
                visitor.record_visit(now);
                (visitor.clone(), false)
            }
            None => {
                let visitor = Visitor::new(attributes, now);
                log::info!("New visitor {}", visitor.id);
                self.index.insert(fingerprint, self.visitors.len());
                self.visitors.push(visitor.clone());
                (visitor, true)
            }
        }
    }

    pub fn get(&self, token: &str) -> Option<&Visitor> {
        self.index.get(token).map(|&pos| &self.visitors[pos])
    }

    /// Totals plus the `limit` most recently active visitors, latest first.
    /// Visitors with the same last-visit instant keep registration order.
    pub fn summary(&self, limit: usize) -> VisitorSummary {
        let total_visitors = self.visitors.len();
        let new_visitors = self.visitors.iter().filter(|v| v.is_new_visitor()).count();

        let mut by_recency: Vec<&Visitor> = self.visitors.iter().collect();
        by_recency.sort_by(|a, b| b.last_visit_at.cmp(&a.last_visit_at));

        let recent_visitors = by_recency
            .into_iter()
            .take(limit)
            .map(|v| RecentVisitor {
                visitor_id: v.id.clone(),
                is_new_visitor: v.is_new_visitor(),
                total_visits: v.total_visits,
                last_visit_at: v.last_visit_at,
            })
            .collect();

        VisitorSummary {
            total_visitors,
            new_visitors,
            returning_visitors: total_visitors - new_visitors,
            recent_visitors,
        }
    }
}
