//! Group resolution and blacklisting.
//!
//! # Responsibility
//! - Merge declared and implicit groups into the landscape.
//! - Strip item descriptions of blacklisted groups before diffing.
//! - Strip blacklisted labels from item descriptions.
//!
//! # Invariants
//! - Declared groups are resolved before items are swept.
//! - A blacklisted group never remains in the landscape (except `Common`,
//!   which is emptied instead).
//! - Bad patterns degrade to literal matching, never fail the run.

use crate::input::description::LandscapeDescription;
use crate::input::process_log::ProcessLog;
use crate::model::identity::FullyQualifiedIdentifier;
use crate::model::landscape::Landscape;
use regex::Regex;

/// Compiled blacklist entry.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Anchored regex; must match the whole name.
    Regex(Regex),
    /// Fallback for patterns that are not valid regexes.
    Literal(String),
}

impl Matcher {
    /// Compiles `pattern` as a full-match regex, or returns the compile error.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        // Validate unanchored first so the wrapper cannot hide a broken pattern.
        Regex::new(pattern)?;
        Regex::new(&format!("^(?:{pattern})$")).map(Self::Regex)
    }

    pub fn literal(pattern: &str) -> Self {
        Self::Literal(pattern.to_string())
    }
}

/// Returns whether `name` is matched by `matcher`.
pub fn matches(matcher: &Matcher, name: &str) -> bool {
    match matcher {
        Matcher::Regex(regex) => regex.is_match(name),
        Matcher::Literal(literal) => name.contains(literal.as_str()),
    }
}

pub fn is_blacklisted(name: &str, matchers: &[Matcher]) -> bool {
    matchers.iter().any(|matcher| matches(matcher, name))
}

/// Compiles blacklist patterns, falling back to literals with a warning.
pub fn compile_matchers(patterns: &[String], log: &mut ProcessLog) -> Vec<Matcher> {
    patterns
        .iter()
        .filter(|pattern| !pattern.is_empty())
        .map(|pattern| {
            Matcher::regex(pattern).unwrap_or_else(|err| {
                log.warn(format!(
                    "Failed to compile matcher pattern `{pattern}`, using literal match: {err}"
                ));
                Matcher::literal(pattern)
            })
        })
        .collect()
}

/// Resolves groups of `input` into `landscape` and applies the blacklists.
///
/// Returns the items dropped together with newly blacklisted groups, so the
/// caller can report them as removed.
pub fn resolve_groups(
    input: &mut LandscapeDescription,
    landscape: &mut Landscape,
    log: &mut ProcessLog,
) -> Vec<FullyQualifiedIdentifier> {
    let group_matchers = compile_matchers(&input.config.group_blacklist, log);

    for (identifier, declaration) in &input.groups {
        let mut group = declaration.to_group(identifier);
        if is_blacklisted(group.identifier(), &group_matchers) {
            log.info(format!("Ignoring blacklisted group {}", group.identifier()));
            continue;
        }
        if let Some(existing) = landscape.group(group.identifier()) {
            group.merge(existing);
        }
        log.info(format!("Adding or updating group {}", group.identifier()));
        landscape.insert_group(group);
    }

    let stale = landscape
        .groups()
        .map(|group| group.identifier().to_string())
        .filter(|identifier| is_blacklisted(identifier, &group_matchers))
        .collect::<Vec<_>>();
    let mut removed = Vec::new();
    for identifier in stale {
        let dropped = landscape.remove_group(&identifier);
        log.info(format!(
            "Removing blacklisted group {identifier} with {} items",
            dropped.len()
        ));
        removed.extend(dropped);
    }

    let before = input.items.len();
    input.items.retain(|item| {
        let group = item.effective_group();
        if is_blacklisted(group, &group_matchers) {
            log.info(format!(
                "Ignoring item {} of blacklisted group {group}",
                item.identifier
            ));
            return false;
        }
        if landscape.ensure_group(group) {
            log.info(format!("Adding implicit group {group}"));
        }
        true
    });
    if before != input.items.len() {
        log.info(format!(
            "Removed {} item descriptions of blacklisted groups",
            before - input.items.len()
        ));
    }

    strip_blacklisted_labels(input, log);
    removed
}

/// Removes labels whose key matches the label blacklist.
pub fn strip_blacklisted_labels(input: &mut LandscapeDescription, log: &mut ProcessLog) {
    let label_matchers = compile_matchers(&input.config.label_blacklist, log);
    if label_matchers.is_empty() {
        return;
    }

    for item in &mut input.items {
        let before = item.labels.len();
        item.labels
            .retain(|key, _| !is_blacklisted(key, &label_matchers));
        if before != item.labels.len() {
            log.info(format!(
                "Stripped {} blacklisted labels from item {}",
                before - item.labels.len(),
                item.identifier
            ));
        }
    }
}
