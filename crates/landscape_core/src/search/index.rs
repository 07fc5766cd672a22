//! In-memory inverted index over landscape items.
//!
//! # Invariants
//! - Built wholesale from one landscape; never updated in place.
//! - Searching never fails; malformed queries match nothing.

use crate::model::identity::FullyQualifiedIdentifier;
use crate::model::item::Item;
use crate::model::landscape::Landscape;
use crate::search::query::{parse_query, Query};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

type Postings = BTreeMap<String, BTreeSet<FullyQualifiedIdentifier>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchIndex {
    terms: Postings,
    tags: Postings,
    documents: usize,
}

impl SearchIndex {
    /// Indexes every item of `landscape`.
    pub fn build(landscape: &Landscape) -> Self {
        let mut index = Self::default();
        for item in landscape.items() {
            index.add(item);
        }
        debug!(
            "event=search_index_build module=search status=ok landscape={} documents={} terms={} tags={}",
            landscape.identifier(),
            index.documents,
            index.terms.len(),
            index.tags.len()
        );
        index
    }

    fn add(&mut self, item: &Item) {
        let fqi = item.fqi();
        let text = [
            item.name.as_deref(),
            item.description.as_deref(),
            Some(item.identifier()),
            Some(item.group()),
        ]
        .into_iter()
        .flatten()
        .chain(item.labels.values().map(String::as_str));

        for token in text.flat_map(str::split_whitespace) {
            self.terms
                .entry(token.to_lowercase())
                .or_default()
                .insert(fqi.clone());
        }
        for tag in item.tags() {
            let tag = tag.trim().to_lowercase();
            if !tag.is_empty() {
                self.tags.entry(tag).or_default().insert(fqi.clone());
            }
        }
        self.documents += 1;
    }

    /// Items matching the query `text`.
    ///
    /// Malformed queries yield an empty set.
    pub fn search(&self, text: &str) -> BTreeSet<FullyQualifiedIdentifier> {
        match parse_query(text) {
            Ok(query) => self.evaluate(&query),
            Err(err) => {
                debug!(
                    "event=search module=search status=rejected reason={} query_len={}",
                    err,
                    text.len()
                );
                BTreeSet::new()
            }
        }
    }

    pub fn evaluate(&self, query: &Query) -> BTreeSet<FullyQualifiedIdentifier> {
        match query {
            Query::Term(term) => substring_matches(&self.terms, term),
            Query::Tag(tag) => substring_matches(&self.tags, tag),
            Query::And(left, right) => {
                let left = self.evaluate(left);
                if left.is_empty() {
                    return left;
                }
                let right = self.evaluate(right);
                left.intersection(&right).cloned().collect()
            }
            Query::Or(left, right) => {
                let mut matches = self.evaluate(left);
                matches.extend(self.evaluate(right));
                matches
            }
        }
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents == 0
    }
}

fn substring_matches(postings: &Postings, needle: &str) -> BTreeSet<FullyQualifiedIdentifier> {
    postings
        .iter()
        .filter(|(token, _)| token.contains(needle))
        .flat_map(|(_, items)| items.iter().cloned())
        .collect()
}
