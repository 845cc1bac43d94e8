//! Search, tag filter and ordering for public listings.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset};
use folio_db::entities::{post, project, tag};
use serde::{Deserialize, Deserializer};

/// Ordering of a listing by publication date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

/// Query string accepted by public list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive text searched in titles and summaries.
    pub q: Option<String>,
    /// Exact tag name. `all` disables the filter.
    pub tag: Option<String>,
    /// `oldest` or `newest`; anything else means `newest`.
    #[serde(default, deserialize_with = "lenient_sort")]
    pub sort: SortOrder,
}

fn lenient_sort<'de, D>(deserializer: D) -> Result<SortOrder, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref().map(str::trim) {
        Some(sort) if sort.eq_ignore_ascii_case("oldest") => SortOrder::Oldest,
        _ => SortOrder::Newest,
    })
}

impl ListQuery {
    fn search_term(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    fn tag_filter(&self) -> Option<&str> {
        self.tag
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != "all")
    }

    /// Cache key for this query under a route.
    #[must_use]
    pub fn cache_key(&self, route: &str) -> String {
        let mut params = Vec::new();
        if let Some(q) = self.search_term() {
            params.push(format!("q={}", urlencoding::encode(&q)));
        }
        if let Some(tag) = self.tag_filter() {
            params.push(format!("tag={}", urlencoding::encode(tag)));
        }
        if self.sort == SortOrder::Oldest {
            params.push("sort=oldest".to_string());
        }

        if params.is_empty() {
            route.to_string()
        } else {
            format!("{route}?{}", params.join("&"))
        }
    }
}

/// Something that can appear in a public listing.
pub trait Listable {
    fn title(&self) -> &str;
    fn summary(&self) -> &str;
    fn tags(&self) -> &[tag::Model];
    fn published_at(&self) -> Option<DateTime<FixedOffset>>;
}

impl Listable for (project::Model, Vec<tag::Model>) {
    fn title(&self) -> &str {
        &self.0.title
    }

    fn summary(&self) -> &str {
        &self.0.short_description
    }

    fn tags(&self) -> &[tag::Model] {
        &self.1
    }

    fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.0.published_at
    }
}

impl Listable for (post::Model, Vec<tag::Model>) {
    fn title(&self) -> &str {
        &self.0.title
    }

    fn summary(&self) -> &str {
        &self.0.excerpt
    }

    fn tags(&self) -> &[tag::Model] {
        &self.1
    }

    fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.0.published_at
    }
}

/// Filter and order a listing.
#[must_use]
pub fn apply<T: Listable>(items: Vec<T>, query: &ListQuery) -> Vec<T> {
    let term = query.search_term();
    let tag = query.tag_filter();

    let mut items: Vec<T> = items
        .into_iter()
        .filter(|item| {
            term.as_deref().is_none_or(|term| {
                item.title().to_lowercase().contains(term)
                    || item.summary().to_lowercase().contains(term)
            })
        })
        .filter(|item| tag.is_none_or(|tag| item.tags().iter().any(|t| t.name == tag)))
        .collect();

    match query.sort {
        SortOrder::Newest => items.sort_by(|a, b| b.published_at().cmp(&a.published_at())),
        SortOrder::Oldest => items.sort_by(|a, b| a.published_at().cmp(&b.published_at())),
    }
    items
}

/// Unique tag names across a listing, sorted.
#[must_use]
pub fn categories<T: Listable>(items: &[T]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.tags().iter().map(|t| t.name.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
