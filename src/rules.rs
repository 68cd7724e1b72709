// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::TimeDelta;
use regex::Regex;

use crate::config::ProgrammeConfig;
use crate::error::RuleError;

/// How a rule decides whether a history name belongs to its programme
#[derive(Debug, Clone)]
pub enum NameMatcher {
    /// Literal equality with the programme name
    Exact(String),
    /// Regex anchored at the start of the name
    Pattern(Regex),
}

impl NameMatcher {
    /// Build a prefix matcher: the pattern must match at position 0 but need
    /// not consume the whole name
    pub fn prefix(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{pattern})")).map(NameMatcher::Pattern)
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatcher::Exact(expected) => name == expected,
            NameMatcher::Pattern(regex) => regex.is_match(name),
        }
    }
}

/// A compiled selection rule owned by one programme
#[derive(Debug, Clone)]
pub struct MatchRule {
    pub programme: String,
    pub max_age: TimeDelta,
    pub matcher: NameMatcher,
}

/// Compile the configured programmes into a flat rule list
///
/// Programmes without a name are skipped. A programme without a pattern
/// matches its own name exactly; otherwise every pattern becomes its own
/// rule sharing the programme's max age.
pub fn compile_rules(programmes: &[ProgrammeConfig]) -> Result<Vec<MatchRule>, RuleError> {
    let mut rules = Vec::new();

    for programme in programmes {
        let Some(name) = programme.enabled_name() else {
            continue;
        };
        let max_age = TimeDelta::days(i64::from(programme.max_age_days));

        let Some(spec) = &programme.match_spec else {
            rules.push(MatchRule {
                programme: name.to_string(),
                max_age,
                matcher: NameMatcher::Exact(name.to_string()),
            });
            continue;
        };

        for pattern in spec.patterns() {
            let matcher = NameMatcher::prefix(pattern).map_err(|e| RuleError::InvalidPattern {
                programme: name.to_string(),
                pattern: pattern.clone(),
                source: e,
            })?;

            rules.push(MatchRule {
                programme: name.to_string(),
                max_age,
                matcher,
            });
        }
    }

    Ok(rules)
}
