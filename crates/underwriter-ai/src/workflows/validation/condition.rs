use std::fmt;

/// Comparison operator recognized in a free-text condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    GreaterOrEqual,
    LessOrEqual,
    Greater,
    Less,
    Equal,
    Between,
}

impl ComparisonOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::GreaterOrEqual => ">=",
            ComparisonOp::LessOrEqual => "<=",
            ComparisonOp::Greater => ">",
            ComparisonOp::Less => "<",
            ComparisonOp::Equal => "==",
            ComparisonOp::Between => "between",
        }
    }

    /// Whether the comparison holds for ordered operands. `Between` takes two
    /// bounds and is handled by the caller; it never holds here.
    pub fn holds<T: PartialOrd>(self, actual: &T, expected: &T) -> bool {
        match self {
            ComparisonOp::GreaterOrEqual => actual >= expected,
            ComparisonOp::LessOrEqual => actual <= expected,
            ComparisonOp::Greater => actual > expected,
            ComparisonOp::Less => actual < expected,
            ComparisonOp::Equal => actual == expected,
            ComparisonOp::Between => false,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Expected operand of a parsed condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f64),
    Text(String),
    Bool(bool),
}

/// Structured form of a free-text condition such as `Age >= 18` or
/// `Credit score between 600 and 750`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCondition {
    /// Lowercased, trimmed field name preceding the operator.
    pub field: String,
    pub op: ComparisonOp,
    pub operand: Operand,
    /// Upper bound, present only for `Between`.
    pub operand2: Option<f64>,
}

/// Parse a free-text condition into its structured form.
///
/// Grammars are tried in priority order, first match wins:
/// 1. `<field> between <num> and <num>` (inclusive bounds);
/// 2. `<field> (>=|<=|>|<|==|=) <number-or-word>` (`=` maps to `==`,
///    currency formatting stripped from numbers);
/// 3. smoker phrase with an optional negation cue (`non` / `not`);
/// 4. `<field> (is|equals) <token>` string equality.
///
/// Anything else yields `None`; the caller treats it as an aggregate
/// placeholder or leaves it unevaluated.
pub fn parse(expected: &str) -> Option<ParsedCondition> {
    let text = expected.trim();
    if text.is_empty() {
        return None;
    }

    parse_between(text)
        .or_else(|| parse_comparison(text))
        .or_else(|| parse_smoker_phrase(text))
        .or_else(|| parse_string_equality(text))
}

fn parse_between(text: &str) -> Option<ParsedCondition> {
    let (prefix, rest) = split_on_keyword(text, "between")?;
    let field = field_before(prefix)?;

    let mut tokens = rest.split_whitespace();
    let low = parse_number(tokens.next()?)?;
    if !tokens.next()?.eq_ignore_ascii_case("and") {
        return None;
    }
    let high = parse_number(tokens.next()?)?;

    Some(ParsedCondition {
        field,
        op: ComparisonOp::Between,
        operand: Operand::Number(low),
        operand2: Some(high),
    })
}

fn parse_comparison(text: &str) -> Option<ParsedCondition> {
    let (index, token_len, op) = find_operator(text)?;
    let field = field_before(&text[..index])?;

    let rest = text[index + token_len..].trim_start();
    let token = rest.split_whitespace().next()?;

    let operand = if let Some(number) = parse_number(token) {
        Operand::Number(number)
    } else if token.chars().all(|ch| ch.is_alphanumeric() || ch == '_') {
        Operand::Text(token.to_lowercase())
    } else {
        return None;
    };

    Some(ParsedCondition {
        field,
        op,
        operand,
        operand2: None,
    })
}

fn parse_smoker_phrase(text: &str) -> Option<ParsedCondition> {
    let lower = text.to_ascii_lowercase();
    if !lower.contains("smok") {
        return None;
    }

    let negated =
        lower.contains("non") || lower.split_whitespace().any(|word| word == "not");

    Some(ParsedCondition {
        field: "smoker".to_string(),
        op: ComparisonOp::Equal,
        operand: Operand::Bool(!negated),
        operand2: None,
    })
}

fn parse_string_equality(text: &str) -> Option<ParsedCondition> {
    let (prefix, rest) = split_on_keyword(text, "is").or_else(|| split_on_keyword(text, "equals"))?;
    let field = field_before(prefix)?;

    let token = rest.split_whitespace().next()?;
    let token: String = token
        .chars()
        .filter(|ch| ch.is_alphanumeric() || *ch == '_' || *ch == '-')
        .collect();
    if token.is_empty() {
        return None;
    }

    Some(ParsedCondition {
        field,
        op: ComparisonOp::Equal,
        operand: Operand::Text(token.to_lowercase()),
        operand2: None,
    })
}

/// Earliest operator occurrence in the text. Two-character operators are
/// checked before their one-character prefixes so `>=` never reads as `>`.
fn find_operator(text: &str) -> Option<(usize, usize, ComparisonOp)> {
    for (index, _) in text.char_indices() {
        let rest = &text[index..];
        let hit = if rest.starts_with(">=") {
            Some((2, ComparisonOp::GreaterOrEqual))
        } else if rest.starts_with("<=") {
            Some((2, ComparisonOp::LessOrEqual))
        } else if rest.starts_with("==") {
            Some((2, ComparisonOp::Equal))
        } else if rest.starts_with('>') {
            Some((1, ComparisonOp::Greater))
        } else if rest.starts_with('<') {
            Some((1, ComparisonOp::Less))
        } else if rest.starts_with('=') {
            Some((1, ComparisonOp::Equal))
        } else {
            None
        };

        if let Some((len, op)) = hit {
            return Some((index, len, op));
        }
    }
    None
}

/// Split `text` around the first standalone, case-insensitive occurrence of
/// `keyword`, returning the text before and after it.
fn split_on_keyword<'a>(text: &'a str, keyword: &str) -> Option<(&'a str, &'a str)> {
    let lower = text.to_ascii_lowercase();
    let mut search_from = 0;
    while let Some(offset) = lower[search_from..].find(keyword) {
        let start = search_from + offset;
        let end = start + keyword.len();
        let boundary_before = start == 0
            || lower[..start]
                .chars()
                .next_back()
                .is_some_and(char::is_whitespace);
        let boundary_after = end == lower.len()
            || lower[end..].chars().next().is_some_and(char::is_whitespace);
        if boundary_before && boundary_after {
            return Some((&text[..start], &text[end..]));
        }
        search_from = end;
    }
    None
}

/// Longest run of word characters and single spaces immediately preceding the
/// operator, lowercased. Multi-word field names are supported.
fn field_before(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim_end();
    let start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, ch)| ch.is_alphanumeric() || *ch == '_' || *ch == ' ')
        .last()
        .map(|(index, _)| index)?;

    let field = trimmed[start..].trim().to_lowercase();
    if field.is_empty() || !field.chars().any(char::is_alphanumeric) {
        return None;
    }
    Some(field)
}

/// Parse a possibly currency-formatted number: `$50,000` -> `50000`.
fn parse_number(token: &str) -> Option<f64> {
    let cleaned: String = token
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|ch| *ch != ',')
        .collect();
    if cleaned.is_empty() || !cleaned.chars().next().is_some_and(|ch| ch.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_between_range() {
        let parsed = parse("Credit score between 600 and 750").expect("between parses");
        assert_eq!(parsed.field, "credit score");
        assert_eq!(parsed.op, ComparisonOp::Between);
        assert_eq!(parsed.operand, Operand::Number(600.0));
        assert_eq!(parsed.operand2, Some(750.0));
    }

    #[test]
    fn parses_comparison_with_currency_operand() {
        let parsed = parse("Income >= $50,000").expect("comparison parses");
        assert_eq!(parsed.field, "income");
        assert_eq!(parsed.op, ComparisonOp::GreaterOrEqual);
        assert_eq!(parsed.operand, Operand::Number(50_000.0));
        assert_eq!(parsed.operand2, None);
    }

    #[test]
    fn single_equals_maps_to_equality() {
        let parsed = parse("Age = 25").expect("equality parses");
        assert_eq!(parsed.op, ComparisonOp::Equal);
        assert_eq!(parsed.operand, Operand::Number(25.0));
    }

    #[test]
    fn comparison_accepts_word_operand() {
        let parsed = parse("Health = good").expect("word operand parses");
        assert_eq!(parsed.field, "health");
        assert_eq!(parsed.operand, Operand::Text("good".to_string()));
    }

    #[test]
    fn smoker_phrase_with_negation_expects_false() {
        let parsed = parse("Applicant must be a non-smoker").expect("smoker phrase parses");
        assert_eq!(parsed.field, "smoker");
        assert_eq!(parsed.operand, Operand::Bool(false));
    }

    #[test]
    fn smoker_phrase_without_negation_expects_true() {
        let parsed = parse("Smoking allowed").expect("smoker phrase parses");
        assert_eq!(parsed.operand, Operand::Bool(true));
    }

    #[test]
    fn string_equality_uses_is_keyword() {
        let parsed = parse("Employment status is Employed").expect("is-phrase parses");
        assert_eq!(parsed.field, "employment status");
        assert_eq!(parsed.op, ComparisonOp::Equal);
        assert_eq!(parsed.operand, Operand::Text("employed".to_string()));
    }

    #[test]
    fn between_wins_over_embedded_and() {
        let parsed = parse("Age between 18 and 65").expect("between parses");
        assert_eq!(parsed.field, "age");
        assert_eq!(parsed.operand, Operand::Number(18.0));
        assert_eq!(parsed.operand2, Some(65.0));
    }

    #[test]
    fn aggregate_phrases_do_not_parse() {
        assert_eq!(parse("All criteria met"), None);
        assert_eq!(parse("Meets underwriting guidelines"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn multi_word_field_precedes_operator() {
        let parsed = parse("Debt to income ratio <= 0.35").expect("parses");
        assert_eq!(parsed.field, "debt to income ratio");
        assert_eq!(parsed.op, ComparisonOp::LessOrEqual);
        assert_eq!(parsed.operand, Operand::Number(0.35));
    }
}
