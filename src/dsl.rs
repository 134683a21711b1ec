//! Rule grammar.
//!
//! ```text
//! Rule      := ['If'] Condition (Connector Condition)* 'then' Condition
//! Condition := Word+ 'is' Word+
//! Connector := 'and' | 'or'
//! ```
//!
//! Keywords are case-insensitive. A rule may use only one kind of connector.

use crate::ops::Connector;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ConditionSyntax {
    pub(crate) variable: String,
    pub(crate) term: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RuleSyntax {
    pub(crate) connector: Connector,
    pub(crate) conditions: Vec<ConditionSyntax>,
    pub(crate) result: ConditionSyntax,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Keyword {
    If,
    Is,
    And,
    Or,
    Then,
}

fn keyword(word: &str) -> Option<Keyword> {
    const KEYWORDS: [(&str, Keyword); 5] = [
        ("if", Keyword::If),
        ("is", Keyword::Is),
        ("and", Keyword::And),
        ("or", Keyword::Or),
        ("then", Keyword::Then),
    ];

    KEYWORDS
        .iter()
        .find(|(kw, _)| word.eq_ignore_ascii_case(kw))
        .map(|(_, k)| *k)
}

struct Parser<'t> {
    tokens: Vec<&'t str>,
    pos: usize,
}

impl<'t> Parser<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            tokens: text.split_whitespace().collect(),
            pos: 0,
        }
    }

    fn peek_keyword(&self) -> Option<Keyword> {
        self.tokens.get(self.pos).and_then(|t| keyword(t))
    }

    fn eat(&mut self, kw: Keyword) -> bool {
        if self.peek_keyword() == Some(kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// One or more non-keyword words, joined by single spaces.
    fn words(&mut self, what: &str) -> Result<String, String> {
        let start = self.pos;

        while self.pos < self.tokens.len() && self.peek_keyword().is_none() {
            self.pos += 1;
        }

        if start == self.pos {
            return Err(match self.tokens.get(self.pos) {
                Some(found) => format!("expected {what}, found `{found}`"),
                None => format!("expected {what}, found end of rule"),
            });
        }

        Ok(self.tokens[start..self.pos].join(" "))
    }

    fn condition(&mut self) -> Result<ConditionSyntax, String> {
        let variable = self.words("a variable name")?;

        if !self.eat(Keyword::Is) {
            return Err(format!("expected `is` after `{variable}`"));
        }

        let term = self.words("a category name")?;

        Ok(ConditionSyntax { variable, term })
    }

    fn rule(&mut self) -> Result<RuleSyntax, String> {
        self.eat(Keyword::If);

        let mut conditions = vec![self.condition()?];
        let mut connector = Connector::Simple;

        loop {
            let next = match self.peek_keyword() {
                Some(Keyword::And) => Connector::And,
                Some(Keyword::Or) => Connector::Or,
                _ => break,
            };

            if connector != Connector::Simple && connector != next {
                return Err("mixing `and` with `or` in one rule is not supported".into());
            }

            connector = next;
            self.pos += 1;
            conditions.push(self.condition()?);
        }

        if !self.eat(Keyword::Then) {
            return Err("expected `then` after the conditions".into());
        }

        let result = self.condition()?;

        if let Some(extra) = self.tokens.get(self.pos) {
            return Err(format!("unexpected `{extra}` after the result"));
        }

        Ok(RuleSyntax {
            connector,
            conditions,
            result,
        })
    }
}

/// Parses the part of a rule line that follows its `Label:` prefix.
pub(crate) fn parse_rule(text: &str) -> Result<RuleSyntax, String> {
    Parser::new(text).rule()
}

#[cfg(test)]
fn cond(variable: &str, term: &str) -> ConditionSyntax {
    ConditionSyntax {
        variable: variable.into(),
        term: term.into(),
    }
}

#[test]
fn test_and_rule() {
    let rule = parse_rule(" If HR is Low and R is Normal then D is Stable\n").unwrap();

    assert_eq!(rule.connector, Connector::And);
    assert_eq!(rule.conditions, vec![cond("HR", "Low"), cond("R", "Normal")]);
    assert_eq!(rule.result, cond("D", "Stable"));
}

#[test]
fn test_simple_and_or_rules() {
    let simple = parse_rule("If HR is High then D is Critical").unwrap();

    assert_eq!(simple.connector, Connector::Simple);
    assert_eq!(simple.conditions, vec![cond("HR", "High")]);

    let or = parse_rule("if A is x OR B is y or C is z then D is w").unwrap();

    assert_eq!(or.connector, Connector::Or);
    assert_eq!(or.conditions.len(), 3);

    // `If` is optional
    let bare = parse_rule("A is x then B is y").unwrap();

    assert_eq!(bare.conditions, vec![cond("A", "x")]);
}

#[test]
fn test_multi_word_sides_are_joined() {
    let rule = parse_rule("If heart  rate is very low then D is Stable").unwrap();

    assert_eq!(rule.conditions, vec![cond("heart rate", "very low")]);
}

#[test]
fn test_grammar_errors() {
    assert!(parse_rule("If A is x and B is y or C is z then D is w")
        .unwrap_err()
        .contains("mixing"));
    assert!(parse_rule("If A x then D is w").unwrap_err().contains("`is`"));
    assert!(parse_rule("If A is then D is w").unwrap_err().contains("category"));
    assert!(parse_rule("If A is x then D").unwrap_err().contains("`is`"));
    assert!(parse_rule("If A is x D is w").unwrap_err().contains("`then`"));
    assert!(parse_rule("If A is x then D is w then").unwrap_err().contains("unexpected"));
    assert!(parse_rule("").is_err());
}
