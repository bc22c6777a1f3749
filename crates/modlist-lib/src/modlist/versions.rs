//! Version comparison and fleet-wide game version selection
//!
//! Mod versions are loosely structured (`0.127.1+1.21.5`, `v2.0.0-beta.3`,
//! `mc1.21-0.6.0`), so comparison works on the leading numeric run and only
//! falls back to plain string ordering when there is nothing numeric to
//! compare. None of these functions panic on malformed input.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::record::ModRecord;

/// Compare two version strings
///
/// ```
/// use modlist_lib::modlist::versions::compare_versions;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare_versions("1.21.10", "1.21.9"), Ordering::Greater);
/// assert_eq!(compare_versions("1.0.0", "1.0.0-beta"), Ordering::Greater);
/// assert_eq!(compare_versions("v2.0", "2.0.0"), Ordering::Equal);
/// assert_eq!(compare_versions("", "0.1"), Ordering::Less);
/// ```
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a = strip_v_prefix(a.trim());
    let b = strip_v_prefix(b.trim());

    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    match (numeric_prefix(a), numeric_prefix(b)) {
        (Some((fields_a, rest_a)), Some((fields_b, rest_b))) => {
            let len = fields_a.len().max(fields_b.len());
            for i in 0..len {
                let x = fields_a.get(i).copied().unwrap_or(0);
                let y = fields_b.get(i).copied().unwrap_or(0);
                match x.cmp(&y) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }

            // A bare release outranks the same release with a suffix
            match (rest_a.is_empty(), rest_b.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => compare_versions(strip_separator(rest_a), strip_separator(rest_b)),
            }
        }
        _ => compare_non_numeric(a, b),
    }
}

/// Both sides start with text: compare the text run, then recurse on the rest
fn compare_non_numeric(a: &str, b: &str) -> Ordering {
    let split = |s: &str| s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
    let (word_a, rest_a) = a.split_at(split(a));
    let (word_b, rest_b) = b.split_at(split(b));

    if word_a.is_empty() || word_b.is_empty() || word_a != word_b {
        return a.cmp(b);
    }

    compare_versions(rest_a, rest_b)
}

fn strip_v_prefix(s: &str) -> &str {
    match s.strip_prefix(['v', 'V']) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => s,
    }
}

fn strip_separator(s: &str) -> &str {
    s.strip_prefix(['-', '+', '.', '_']).unwrap_or(s)
}

/// Leading run of dot-separated integers and whatever follows it
///
/// `None` when the string does not start with a digit or a field overflows.
fn numeric_prefix(s: &str) -> Option<(Vec<u64>, &str)> {
    let mut fields = Vec::new();
    let mut rest = s;

    loop {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if end == 0 {
            break;
        }
        fields.push(rest[..end].parse::<u64>().ok()?);
        rest = &rest[end..];

        match rest.strip_prefix('.') {
            Some(after) if after.starts_with(|c: char| c.is_ascii_digit()) => rest = after,
            _ => break,
        }
    }

    if fields.is_empty() {
        None
    } else {
        Some((fields, rest))
    }
}

/// Whether a game version is a plain release (`1.21.5`), not a snapshot
pub fn is_release_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() >= 2
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

/// Highest version of a collection, ignoring empty strings
pub fn highest_version<'a, I>(versions: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    versions
        .into_iter()
        .filter(|v| !v.trim().is_empty())
        .max_by(|a, b| compare_versions(a, b))
        .map(str::to_string)
}

/// Sort ascending and drop duplicates and empty entries
pub fn sort_versions(mut versions: Vec<String>) -> Vec<String> {
    versions.retain(|v| !v.trim().is_empty());
    versions.sort_by(|a, b| compare_versions(a, b).then_with(|| a.cmp(b)));
    versions.dedup();
    versions
}

/// Game version shared by the largest group of content records
///
/// Server, launcher and installer rows do not vote. Ties go to the higher
/// version.
pub fn majority_game_version(records: &[ModRecord]) -> Option<String> {
    let mut votes: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        let game_version = record.current.game_version.trim();
        if record.mod_type.is_infrastructure() || game_version.is_empty() {
            continue;
        }
        *votes.entry(game_version).or_default() += 1;
    }

    votes
        .into_iter()
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then_with(|| compare_versions(va, vb)))
        .map(|(version, _)| version.to_string())
}

/// Following game version by patch arithmetic
///
/// ```
/// use modlist_lib::modlist::versions::next_game_version;
///
/// assert_eq!(next_game_version("1.21.5").as_deref(), Some("1.21.6"));
/// assert_eq!(next_game_version("1.21").as_deref(), Some("1.21.1"));
/// assert_eq!(next_game_version("snapshot"), None);
/// ```
pub fn next_game_version(current: &str) -> Option<String> {
    let current = current.trim();
    if !is_release_version(current) {
        return None;
    }

    let mut parts: Vec<u64> = current
        .split('.')
        .map(|p| p.parse::<u64>().ok())
        .collect::<Option<_>>()?;

    if parts.len() == 2 {
        parts.push(1);
    } else if let Some(patch) = parts.last_mut() {
        *patch = patch.checked_add(1)?;
    }

    Some(
        parts
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join("."),
    )
}

/// Highest game version any content record reaches
///
/// Uses each record's `LatestGameVersion`, falling back to its
/// `CurrentGameVersion`.
pub fn latest_game_version(records: &[ModRecord]) -> Option<String> {
    highest_version(
        records
            .iter()
            .filter(|record| !record.mod_type.is_infrastructure())
            .map(|record| {
                if record.latest.game_version.trim().is_empty() {
                    record.current.game_version.as_str()
                } else {
                    record.latest.game_version.as_str()
                }
            }),
    )
}

#[cfg(test)]
mod tests {
    include!("versions.test.rs");
}
