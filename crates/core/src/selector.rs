//! A small CSS subset used by the match rules and the sender/context lookups.
//!
//! Supported: comma separated alternatives of compound selectors, where a
//! compound is an optional tag (or `*`) followed by `.class` tokens and
//! attribute predicates (`[a]`, `[a="v"]`, `[a^="v"]`, `[a*="v"]`,
//! `[a$="v"]`, `[a~="v"]`). Combinators are rejected.

use std::fmt;
use std::str::FromStr;

use crate::error::SelectorError;
use crate::ports::TreeNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    Exists,
    Equals,
    Prefix,
    Suffix,
    Contains,
    Word,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrPredicate {
    pub name: String,
    pub op: AttrOp,
    pub value: String,
}

impl AttrPredicate {
    fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        let value = self.value.as_str();
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == value,
            // Empty operands never match for substring operators.
            AttrOp::Prefix => !value.is_empty() && actual.starts_with(value),
            AttrOp::Suffix => !value.is_empty() && actual.ends_with(value),
            AttrOp::Contains => !value.is_empty() && actual.contains(value),
            AttrOp::Word => actual.split_whitespace().any(|word| word == value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttrPredicate>,
}

impl CompoundSelector {
    pub fn matches<N: TreeNode>(&self, node: &N) -> bool {
        if let Some(tag) = &self.tag {
            if !node.tag_name().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = node.attribute("class").unwrap_or("");
            let has_all = self
                .classes
                .iter()
                .all(|class| class_attr.split_whitespace().any(|token| token == class));
            if !has_all {
                return false;
            }
        }
        self.attributes
            .iter()
            .all(|predicate| predicate.matches(node.attribute(&predicate.name)))
    }
}

/// A parsed selector group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<CompoundSelector>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let alternatives = Parser::new(source).parse_group()?;
        Ok(Self {
            source: source.trim().to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn alternatives(&self) -> &[CompoundSelector] {
        &self.alternatives
    }

    /// True when the node matches any alternative of the group.
    pub fn matches<N: TreeNode>(&self, node: &N) -> bool {
        self.alternatives.iter().any(|compound| compound.matches(node))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::Unexpected {
            selector: self.source.to_string(),
            offset: self.pos,
            found,
        }
    }

    fn parse_group(&mut self) -> Result<Vec<CompoundSelector>, SelectorError> {
        let mut alternatives = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek().is_none() {
                break;
            }
            alternatives.push(self.parse_compound()?);

            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => self.pos += 1,
                Some(c) if c == '>' || c == '+' || c == '~' || starts_compound(c) => {
                    return Err(SelectorError::Combinator(self.source.to_string()));
                }
                Some(c) => return Err(self.unexpected(c)),
            }
        }

        if alternatives.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(alternatives)
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut compound = CompoundSelector::default();
        let start = self.pos;

        match self.peek() {
            Some('*') => self.pos += 1,
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.read_ident().to_ascii_lowercase());
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    let class = self.read_ident();
                    if class.is_empty() {
                        return Err(self.unexpected(self.peek().unwrap_or('.')));
                    }
                    compound.classes.push(class);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attributes.push(self.parse_attribute()?);
                }
                _ => break,
            }
        }

        if self.pos == start {
            return match self.peek() {
                Some(c) => Err(self.unexpected(c)),
                None => Err(SelectorError::Empty),
            };
        }
        Ok(compound)
    }

    fn parse_attribute(&mut self) -> Result<AttrPredicate, SelectorError> {
        self.skip_whitespace();
        let name = self.read_ident().to_ascii_lowercase();
        if name.is_empty() {
            return match self.peek() {
                Some(c) => Err(self.unexpected(c)),
                None => Err(SelectorError::UnterminatedAttribute(self.source.to_string())),
            };
        }
        self.skip_whitespace();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttrPredicate {
                    name,
                    op: AttrOp::Exists,
                    value: String::new(),
                });
            }
            Some('=') => {
                self.pos += 1;
                AttrOp::Equals
            }
            Some(c @ ('^' | '$' | '*' | '~')) => {
                self.pos += 1;
                if self.peek() != Some('=') {
                    return Err(self.unexpected(self.peek().unwrap_or(c)));
                }
                self.pos += 1;
                match c {
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    '*' => AttrOp::Contains,
                    _ => AttrOp::Word,
                }
            }
            Some(c) => return Err(self.unexpected(c)),
            None => return Err(SelectorError::UnterminatedAttribute(self.source.to_string())),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let begin = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(SelectorError::UnterminatedAttribute(self.source.to_string()));
                }
                let value: String = self.chars[begin..self.pos].iter().collect();
                self.pos += 1;
                value
            }
            _ => self.read_ident(),
        };

        self.skip_whitespace();
        match self.peek() {
            Some(']') => {
                self.pos += 1;
                Ok(AttrPredicate { name, op, value })
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(SelectorError::UnterminatedAttribute(self.source.to_string())),
        }
    }

    fn read_ident(&mut self) -> String {
        let begin = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        self.chars[begin..self.pos].iter().collect()
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn starts_compound(c: char) -> bool {
    is_ident_char(c) || c == '.' || c == '[' || c == '*'
}
