//! Relevance-ranked search over the denormalised collections.
//!
//! A linear scan: each record scores the sum of its candidate fields'
//! match quality against the term (exact 100, prefix 80, substring 60,
//! subsequence 30). Results are capped at 20 and memoised briefly.

use std::sync::Arc;
use std::time::Duration;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::cache::TtlCache;
use crate::store::EntityStore;

/// Maximum number of hits returned per query.
const MAX_RESULTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Machinery,
    Vehicle,
    Tool,
    #[serde(rename = "sparepart")]
    SparePart,
    Warehouse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SearchKind,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub url: String,
    pub relevance: u32,
    /// Title with matching fragments wrapped in `<mark>` tags.
    pub highlighted: String,
}

pub struct SearchService {
    store: Arc<EntityStore>,
    cache: TtlCache,
}

impl SearchService {
    pub fn new(store: Arc<EntityStore>, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache: TtlCache::new(Some(cache_ttl)),
        }
    }

    #[instrument(skip(self))]
    pub fn search(&self, term: &str) -> Vec<SearchHit> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }

        if let Some(cached) = self.cache.get(&term) {
            if let Ok(hits) = serde_json::from_str::<Vec<SearchHit>>(&cached) {
                debug!(%term, "search served from cache");
                return hits;
            }
        }

        let mut hits = Vec::new();

        for item in self.store.machinery.all() {
            let relevance = relevance(
                &term,
                &[
                    &item.name,
                    &item.brand,
                    &item.model,
                    &item.category,
                    &item.serial_number,
                ],
            );
            if relevance > 0 {
                hits.push(SearchHit {
                    id: item.id.clone(),
                    kind: SearchKind::Machinery,
                    title: item.name.clone(),
                    subtitle: format!("{} {}", item.brand, item.model),
                    description: format!("{} - {}", item.category, item.status),
                    url: format!("/machinery/{}", item.id),
                    relevance,
                    highlighted: highlight(&term, &item.name),
                });
            }
        }

        for item in self.store.vehicles.all() {
            let year = item.year.to_string();
            let relevance = relevance(&term, &[&item.plate, &item.brand, &item.model, &year]);
            if relevance > 0 {
                hits.push(SearchHit {
                    id: item.id.clone(),
                    kind: SearchKind::Vehicle,
                    title: item.plate.clone(),
                    subtitle: format!("{} {}", item.brand, item.model),
                    description: format!("{} - {}", item.year, item.status),
                    url: format!("/vehicles/{}", item.id),
                    relevance,
                    highlighted: highlight(&term, &item.plate),
                });
            }
        }

        for item in self.store.tools.all() {
            let relevance = relevance(
                &term,
                &[
                    &item.name,
                    &item.internal_code,
                    item.category.as_deref().unwrap_or(""),
                    item.brand.as_deref().unwrap_or(""),
                ],
            );
            if relevance > 0 {
                hits.push(SearchHit {
                    id: item.id.clone(),
                    kind: SearchKind::Tool,
                    title: item.name.clone(),
                    subtitle: item.internal_code.clone(),
                    description: format!(
                        "{} - {}",
                        item.category.as_deref().unwrap_or("Herramienta"),
                        item.status
                    ),
                    url: format!("/tools/{}", item.id),
                    relevance,
                    highlighted: highlight(&term, &item.name),
                });
            }
        }

        for item in self.store.spare_parts.all() {
            let relevance = relevance(
                &term,
                &[
                    &item.name,
                    &item.code,
                    &item.brand,
                    item.category.as_deref().unwrap_or(""),
                ],
            );
            if relevance > 0 {
                hits.push(SearchHit {
                    id: item.id.clone(),
                    kind: SearchKind::SparePart,
                    title: item.name.clone(),
                    subtitle: item.code.clone(),
                    description: format!("{} - Stock: {}", item.brand, item.total_stock()),
                    url: format!("/spareparts/{}", item.id),
                    relevance,
                    highlighted: highlight(&term, &item.name),
                });
            }
        }

        for item in self.store.warehouses.all() {
            let relevance = relevance(&term, &[&item.name, &item.city, &item.address]);
            if relevance > 0 {
                hits.push(SearchHit {
                    id: item.id.clone(),
                    kind: SearchKind::Warehouse,
                    title: item.name.clone(),
                    subtitle: item.city.clone(),
                    description: item.address.clone(),
                    url: format!("/warehouses/{}", item.id),
                    relevance,
                    highlighted: highlight(&term, &item.name),
                });
            }
        }

        hits.sort_by(|a, b| b.relevance.cmp(&a.relevance).then(a.title.cmp(&b.title)));
        hits.truncate(MAX_RESULTS);

        if let Ok(serialized) = serde_json::to_string(&hits) {
            self.cache.set(&term, &serialized, None);
        }
        hits
    }

    /// Drops memoised results; called after mutations that change what a
    /// query would return.
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    /// Sweeps expired memoised results.
    pub fn cleanup(&self) {
        self.cache.cleanup();
    }
}

/// Sum of per-field scores for a lowercased term.
fn relevance(term: &str, fields: &[&str]) -> u32 {
    let mut score = 0;
    for field in fields {
        let field = field.to_lowercase();
        if field == term {
            score += 100;
        } else if field.starts_with(term) {
            score += 80;
        } else if field.contains(term) {
            score += 60;
        } else if is_subsequence(&field, term) {
            score += 30;
        }
    }
    score
}

/// Every pattern character appears in order within `text`.
fn is_subsequence(text: &str, pattern: &str) -> bool {
    let mut pattern_chars = pattern.chars().peekable();
    for c in text.chars() {
        match pattern_chars.peek() {
            Some(&p) if p == c => {
                pattern_chars.next();
            }
            Some(_) => {}
            None => break,
        }
    }
    pattern_chars.peek().is_none()
}

/// Wraps case-insensitive occurrences of `term` in `<mark>` tags.
fn highlight(term: &str, text: &str) -> String {
    match RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.replace_all(text, "<mark>$0</mark>").into_owned(),
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Warehouse;
    use crate::store::DEFAULT_ACTOR;
    use chrono::Utc;

    #[test]
    fn results_are_capped_and_ranked() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(EntityStore::open(dir.path()).unwrap());
        for i in 0..25 {
            store
                .warehouses
                .insert(
                    Warehouse {
                        id: String::new(),
                        name: format!("Almacén Norte {i}"),
                        address: format!("Calle {i}"),
                        city: "Trujillo".into(),
                        phone: None,
                        manager: None,
                        notes: None,
                        created_at: Utc::now(),
                        created_by: String::new(),
                        updated_at: None,
                        updated_by: None,
                    },
                    DEFAULT_ACTOR,
                )
                .unwrap();
        }

        let svc = SearchService::new(store, Duration::from_secs(60));
        let hits = svc.search("norte");
        assert_eq!(hits.len(), MAX_RESULTS);
        assert!(hits.windows(2).all(|w| w[0].relevance >= w[1].relevance));
    }

    #[test]
    fn empty_and_whitespace_terms_return_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(EntityStore::open(dir.path()).unwrap());
        let svc = SearchService::new(store, Duration::from_secs(60));
        assert!(svc.search("").is_empty());
        assert!(svc.search("   ").is_empty());
    }

    #[test]
    fn exact_beats_prefix_beats_substring_beats_fuzzy() {
        assert_eq!(relevance("cat", &["cat"]), 100);
        assert_eq!(relevance("cat", &["caterpillar"]), 80);
        assert_eq!(relevance("cat", &["bobcat"]), 60);
        assert_eq!(relevance("cat", &["carreta"]), 30);
        assert_eq!(relevance("cat", &["zzz"]), 0);
    }

    #[test]
    fn relevance_sums_across_fields() {
        assert_eq!(relevance("cat", &["cat", "caterpillar"]), 180);
    }

    #[test]
    fn subsequence_requires_order() {
        assert!(is_subsequence("caterpillar", "ctr"));
        assert!(!is_subsequence("caterpillar", "rtc"));
        assert!(is_subsequence("anything", ""));
        assert!(!is_subsequence("", "a"));
    }

    #[test]
    fn highlight_wraps_every_occurrence() {
        assert_eq!(
            highlight("cat", "Bobcat Caterpillar"),
            "Bob<mark>cat</mark> <mark>Cat</mark>erpillar"
        );
    }
}
