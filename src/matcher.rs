// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::history::EpisodeRecord;
use crate::rules::MatchRule;

/// The records selected for one programme, in history order
#[derive(Debug, Clone)]
pub struct Bucket<'a> {
    pub programme: String,
    pub episodes: Vec<&'a EpisodeRecord>,
}

/// Per-programme buckets borrowing from the read-only record set
#[derive(Debug, Clone, Default)]
pub struct Buckets<'a> {
    buckets: Vec<Bucket<'a>>,
    index: HashMap<String, usize>,
}

impl<'a> Buckets<'a> {
    fn slot(&mut self, programme: &str) -> usize {
        if let Some(&slot) = self.index.get(programme) {
            return slot;
        }

        let slot = self.buckets.len();
        self.buckets.push(Bucket {
            programme: programme.to_string(),
            episodes: Vec::new(),
        });
        self.index.insert(programme.to_string(), slot);
        slot
    }

    /// Episodes matched to `programme`; empty for unknown programmes
    pub fn get(&self, programme: &str) -> &[&'a EpisodeRecord] {
        self.index
            .get(programme)
            .map(|&slot| self.buckets[slot].episodes.as_slice())
            .unwrap_or_default()
    }

    /// Total number of matched episodes across all buckets
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.episodes.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Iterate buckets in the order their programmes first appear in the rules
    pub fn iter(&self) -> impl Iterator<Item = &Bucket<'a>> {
        self.buckets.iter()
    }
}

/// Sort records into programme buckets
///
/// A record joins a programme's bucket once per rule of that programme it
/// satisfies: younger than the rule's max age, and a name the rule accepts.
/// Buckets keep history order and are never deduplicated.
pub fn match_episodes<'a>(
    records: &'a [EpisodeRecord],
    rules: &[MatchRule],
    now: DateTime<Utc>,
) -> Buckets<'a> {
    let mut buckets = Buckets::default();
    let slots: Vec<usize> = rules
        .iter()
        .map(|rule| buckets.slot(&rule.programme))
        .collect();

    for record in records {
        let age = now.signed_duration_since(record.added_at());

        for (rule, &slot) in rules.iter().zip(&slots) {
            if age < rule.max_age && rule.matcher.matches(&record.name) {
                buckets.buckets[slot].episodes.push(record);
            }
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MatchSpec, ProgrammeConfig};
    use crate::rules::compile_rules;
    use chrono::TimeDelta;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn record(pid: &str, name: &str, age: TimeDelta) -> EpisodeRecord {
        EpisodeRecord {
            pid: pid.to_string(),
            name: name.to_string(),
            time_added: (now() - age).timestamp(),
            ..Default::default()
        }
    }

    fn programme(name: &str, spec: Option<MatchSpec>, days: u32) -> ProgrammeConfig {
        ProgrammeConfig {
            match_spec: spec,
            max_age_days: days,
            ..ProgrammeConfig::named(name)
        }
    }

    fn pids(episodes: &[&EpisodeRecord]) -> Vec<String> {
        episodes.iter().map(|e| e.pid.clone()).collect()
    }

    #[test]
    fn exact_rule_selects_matching_names_in_log_order() {
        let records = vec![
            record("a", "Only Connect", TimeDelta::days(3)),
            record("b", "University Challenge", TimeDelta::days(2)),
            record("c", "Only Connect", TimeDelta::days(1)),
        ];
        let rules = compile_rules(&[programme("Only Connect", None, 365)]).unwrap();

        let buckets = match_episodes(&records, &rules, now());

        assert_eq!(pids(buckets.get("Only Connect")), ["a", "c"]);
        assert_eq!(buckets.total(), 2);
    }

    #[test]
    fn records_at_or_beyond_max_age_are_excluded() {
        let records = vec![
            record("young", "Show", TimeDelta::days(29)),
            record("edge", "Show", TimeDelta::days(30)),
            record("old", "Show", TimeDelta::days(31)),
        ];
        let rules = compile_rules(&[programme("Show", None, 30)]).unwrap();

        let buckets = match_episodes(&records, &rules, now());

        assert_eq!(pids(buckets.get("Show")), ["young"]);
    }

    #[test]
    fn epoch_zero_records_fall_outside_realistic_windows() {
        let records = vec![EpisodeRecord {
            pid: "broken".to_string(),
            name: "Show".to_string(),
            time_added: 0,
            ..Default::default()
        }];
        let rules = compile_rules(&[programme("Show", None, 365)]).unwrap();

        let buckets = match_episodes(&records, &rules, now());

        assert!(buckets.get("Show").is_empty());
    }

    #[test]
    fn future_records_are_included() {
        let records = vec![record("future", "Show", TimeDelta::days(-1))];
        let rules = compile_rules(&[programme("Show", None, 1)]).unwrap();

        let buckets = match_episodes(&records, &rules, now());

        assert_eq!(pids(buckets.get("Show")), ["future"]);
    }

    #[test]
    fn pattern_list_matches_either_pattern() {
        let records = vec![
            record("foo", "Foo Show", TimeDelta::days(1)),
            record("bar", "Bar Show", TimeDelta::days(1)),
            record("baz", "Baz Show", TimeDelta::days(1)),
        ];
        let spec = MatchSpec::List(vec!["Foo.*".to_string(), "Bar.*".to_string()]);
        let rules = compile_rules(&[programme("Mixed", Some(spec), 365)]).unwrap();

        let buckets = match_episodes(&records, &rules, now());

        assert_eq!(pids(buckets.get("Mixed")), ["foo", "bar"]);
    }

    #[test]
    fn record_matching_several_programmes_joins_each_bucket() {
        let records = vec![record("shared", "The News Quiz", TimeDelta::days(1))];
        let rules = compile_rules(&[
            programme("The News Quiz", None, 365),
            programme("Comedy", Some(MatchSpec::Single("The .*".to_string())), 365),
        ])
        .unwrap();

        let buckets = match_episodes(&records, &rules, now());

        assert_eq!(pids(buckets.get("The News Quiz")), ["shared"]);
        assert_eq!(pids(buckets.get("Comedy")), ["shared"]);
    }

    #[test]
    fn overlapping_patterns_of_one_programme_are_not_deduplicated() {
        let records = vec![record("dup", "Foo Bar", TimeDelta::days(1))];
        let spec = MatchSpec::List(vec!["Foo".to_string(), "Foo Bar".to_string()]);
        let rules = compile_rules(&[programme("Foo", Some(spec), 365)]).unwrap();

        let buckets = match_episodes(&records, &rules, now());

        assert_eq!(pids(buckets.get("Foo")), ["dup", "dup"]);
    }

    #[test]
    fn every_compiled_programme_gets_a_bucket() {
        let records = vec![record("a", "Something Else", TimeDelta::days(1))];
        let rules = compile_rules(&[programme("Empty", None, 365)]).unwrap();

        let buckets = match_episodes(&records, &rules, now());

        assert_eq!(buckets.len(), 1);
        assert!(buckets.get("Empty").is_empty());
        assert!(buckets.get("Unknown").is_empty());
    }

    #[test]
    fn buckets_iterate_in_rule_order() {
        let rules = compile_rules(&[
            programme("Zulu", None, 365),
            programme("Alpha", None, 365),
        ])
        .unwrap();

        let buckets = match_episodes(&[], &rules, now());
        let names: Vec<_> = buckets.iter().map(|b| b.programme.as_str()).collect();

        assert_eq!(names, ["Zulu", "Alpha"]);
    }

    #[test]
    fn membership_holds_for_every_combination() {
        let names = ["Alpha", "Alpha Beta", "Gamma"];
        let ages = [0, 5, 10, 15];
        let mut records = Vec::new();
        for name in names {
            for days in ages {
                records.push(record(&format!("{name}-{days}"), name, TimeDelta::days(days)));
            }
        }
        let spec = MatchSpec::Single("Alpha".to_string());
        let rules = compile_rules(&[programme("A", Some(spec), 10)]).unwrap();

        let buckets = match_episodes(&records, &rules, now());
        let selected = pids(buckets.get("A"));

        for r in &records {
            let expected = r.name.starts_with("Alpha")
                && now().signed_duration_since(r.added_at()) < TimeDelta::days(10);
            assert_eq!(selected.contains(&r.pid), expected, "record {}", r.pid);
        }
    }
}
