use crate::remote::RemoteItem;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// How two files claiming the same station id are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionRule {
    /// Latest `last-modified` wins. Files without a parsable date lose
    /// against dated ones; remaining ties go to the greater href.
    #[default]
    NewestModifiedWins,
}

impl CollisionRule {
    /// Orders two candidates so that the preferred one compares greater.
    pub fn compare(&self, a: &RemoteItem, b: &RemoteItem) -> Ordering {
        match self {
            CollisionRule::NewestModifiedWins => a
                .modified_at()
                .cmp(&b.modified_at())
                .then_with(|| a.href.cmp(&b.href)),
        }
    }

    /// Picks the winner among `candidates`, returning it and the losers.
    pub fn resolve<'a>(
        &self,
        candidates: &[&'a RemoteItem],
    ) -> Option<(&'a RemoteItem, Vec<&'a RemoteItem>)> {
        let winner = *candidates.iter().max_by(|a, b| self.compare(a, b))?;
        let losers = candidates
            .iter()
            .copied()
            .filter(|c| c.href != winner.href)
            .collect();
        Some((winner, losers))
    }
}

impl fmt::Display for CollisionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionRule::NewestModifiedWins => f.write_str("newest-modified-wins"),
        }
    }
}

/// A file that was not registered because another file won its station id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConflict {
    pub station_id: String,
    /// Href of the registered file.
    pub kept: String,
    /// Href of the file that lost.
    pub discarded: String,
    pub rule: CollisionRule,
}

/// Derives the station id from a file name: the part before the first `_`,
/// or the whole stem when there is none (`cam4_1h.txt` → `cam4`).
pub fn station_id_from_filename(name: &str) -> String {
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    match stem.split_once('_') {
        Some((prefix, _)) if !prefix.is_empty() => prefix.to_string(),
        _ => stem.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(href: &str, last_modified: Option<&str>) -> RemoteItem {
        RemoteItem {
            name: href.trim_start_matches('/').to_string(),
            href: href.to_string(),
            size: None,
            last_modified: last_modified.map(str::to_string),
            etag: None,
        }
    }

    #[test]
    fn ids_from_file_names() {
        assert_eq!(station_id_from_filename("cam4_1h.txt"), "cam4");
        assert_eq!(station_id_from_filename("r6gb_15m_v2.txt"), "r6gb");
        assert_eq!(station_id_from_filename("rpr1.txt"), "rpr1");
        assert_eq!(station_id_from_filename("_1h.txt"), "_1h");
    }

    #[test]
    fn newest_file_wins() {
        let old = item("/cam4_1h.txt", Some("Sun, 01 Jun 2025 10:00:00 GMT"));
        let new = item("/cam4_5m.txt", Some("Mon, 02 Jun 2025 10:00:00 GMT"));
        let undated = item("/cam4_zz.txt", None);

        let (winner, losers) = CollisionRule::NewestModifiedWins
            .resolve(&[&undated, &new, &old])
            .unwrap();
        assert_eq!(winner.href, "/cam4_5m.txt");
        assert_eq!(losers.len(), 2);
    }

    #[test]
    fn ties_go_to_greater_href_regardless_of_order() {
        let a = item("/cam4_1h.txt", Some("Sun, 01 Jun 2025 10:00:00 GMT"));
        let b = item("/cam4_5m.txt", Some("Sun, 01 Jun 2025 10:00:00 GMT"));

        let rule = CollisionRule::NewestModifiedWins;
        assert_eq!(rule.resolve(&[&a, &b]).unwrap().0.href, "/cam4_5m.txt");
        assert_eq!(rule.resolve(&[&b, &a]).unwrap().0.href, "/cam4_5m.txt");
        assert!(rule.resolve(&[]).is_none());
    }
}
