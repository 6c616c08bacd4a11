use serde::{Deserialize, Serialize};

use super::domain::{DataBag, FieldValue};

/// Synonym table mapping canonical underwriting concepts to the spellings
/// decision engines and test generators are known to use.
///
/// The table is configuration data rather than a hardcoded constant so a
/// deployment can extend it per domain. Entry order is the tie-break when a
/// loosely-named field matches more than one concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAliases {
    entries: Vec<AliasEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasEntry {
    /// Canonical concept name, matched as a substring of the requested field.
    pub concept: String,
    /// Known spellings tried in order against the data bag.
    pub aliases: Vec<String>,
}

impl FieldAliases {
    pub fn new(entries: Vec<AliasEntry>) -> Self {
        Self { entries }
    }

    pub fn entry(concept: &str, aliases: &[&str]) -> AliasEntry {
        AliasEntry {
            concept: concept.to_string(),
            aliases: aliases.iter().map(|alias| alias.to_string()).collect(),
        }
    }

    pub fn push(&mut self, entry: AliasEntry) {
        self.entries.push(entry);
    }

    /// Resolve a loosely-named field against the data bag.
    ///
    /// Lookup ladder, first hit wins:
    /// 1. exact key;
    /// 2. normalized spellings (lowercase, snake_case, squashed, camelCase,
    ///    PascalCase, kebab-case) built from the field's words;
    /// 3. case-insensitive scan over every key;
    /// 4. alias table, for each concept contained in the lowered field name.
    pub fn resolve<'a>(&self, field_name: &str, data: &'a DataBag) -> Option<&'a FieldValue> {
        if let Some(value) = data.get(field_name) {
            return Some(value);
        }

        let field_lower = field_name.trim().to_lowercase();
        for candidate in spelling_variants(&field_lower) {
            if let Some(value) = data.get(&candidate) {
                return Some(value);
            }
        }

        if let Some(value) = data
            .entries()
            .find(|(key, _)| key.eq_ignore_ascii_case(&field_lower))
            .map(|(_, value)| value)
        {
            return Some(value);
        }

        for entry in &self.entries {
            if !field_lower.contains(entry.concept.as_str()) {
                continue;
            }
            for alias in &entry.aliases {
                if let Some(value) = data.get(alias) {
                    return Some(value);
                }
            }
        }

        None
    }
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self::new(vec![
            Self::entry("age", &["age", "applicantAge", "applicant_age"]),
            Self::entry(
                "credit score",
                &["creditScore", "credit_score", "score", "creditRating"],
            ),
            Self::entry(
                "income",
                &["income", "annualIncome", "annual_income", "salary"],
            ),
            Self::entry(
                "health",
                &["health", "healthStatus", "health_status", "healthConditions"],
            ),
            Self::entry(
                "coverage",
                &["coverage", "coverageAmount", "coverage_amount", "requestedCoverage"],
            ),
            Self::entry(
                "risk category",
                &["riskCategory", "risk_category", "risk", "category"],
            ),
            Self::entry("smok", &["smoker", "smoking", "isSmoker", "is_smoker"]),
        ])
    }
}

/// Candidate keys generated from the words of a lowered field name.
fn spelling_variants(field_lower: &str) -> Vec<String> {
    let words: Vec<&str> = field_lower
        .split(|ch: char| ch == ' ' || ch == '_' || ch == '-')
        .filter(|word| !word.is_empty())
        .collect();
    if words.is_empty() {
        return Vec::new();
    }

    let mut variants = vec![
        field_lower.to_string(),
        words.join("_"),
        words.concat(),
        camel_case(&words),
        pascal_case(&words),
        words.join("-"),
    ];
    variants.dedup();
    variants
}

fn camel_case(words: &[&str]) -> String {
    let mut joined = String::new();
    for (index, word) in words.iter().enumerate() {
        if index == 0 {
            joined.push_str(word);
        } else {
            joined.push_str(&capitalize(word));
        }
    }
    joined
}

fn pascal_case(words: &[&str]) -> String {
    words.iter().map(|word| capitalize(word)).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Human title for a lowered field name, e.g. `credit score` -> `Credit Score`.
pub(crate) fn title_case(field: &str) -> String {
    field
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag() -> DataBag {
        let mut bag = DataBag::new();
        bag.insert("creditScore", 700);
        bag.insert("applicantAge", 15);
        bag.insert("annual_income", 62_000);
        bag.insert("Health Status", "good");
        bag
    }

    #[test]
    fn resolution_is_commutative_across_naming_conventions() {
        let aliases = FieldAliases::default();
        let data = bag();

        for spelling in ["creditScore", "credit_score", "Credit Score", "credit score"] {
            assert_eq!(
                aliases.resolve(spelling, &data),
                Some(&FieldValue::Number(700.0)),
                "spelling {spelling:?} should resolve"
            );
        }
    }

    #[test]
    fn falls_back_to_alias_table() {
        let aliases = FieldAliases::default();
        let data = bag();

        assert_eq!(
            aliases.resolve("age", &data),
            Some(&FieldValue::Number(15.0))
        );
        assert_eq!(
            aliases.resolve("income", &data),
            Some(&FieldValue::Number(62_000.0))
        );
    }

    #[test]
    fn case_insensitive_scan_matches_human_keys() {
        let aliases = FieldAliases::default();
        let data = bag();

        assert_eq!(
            aliases.resolve("health status", &data),
            Some(&FieldValue::Text("good".to_string()))
        );
    }

    #[test]
    fn unknown_field_is_absent() {
        let aliases = FieldAliases::default();
        assert_eq!(aliases.resolve("occupation", &bag()), None);
    }

    #[test]
    fn custom_entries_extend_the_table() {
        let mut aliases = FieldAliases::default();
        aliases.push(FieldAliases::entry("term", &["coverageLimit"]));

        let mut data = DataBag::new();
        data.insert("coverageLimit", 20);
        assert_eq!(
            aliases.resolve("term years", &data),
            Some(&FieldValue::Number(20.0))
        );
    }

    #[test]
    fn titles_fields_for_output() {
        assert_eq!(title_case("credit score"), "Credit Score");
        assert_eq!(title_case("age"), "Age");
    }
}
