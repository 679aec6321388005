use std::fmt;

use thiserror::Error;

use crate::page::ElementData;

/// Why a selector string failed to parse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character `{0}` in selector")]
    Unexpected(char),
    #[error("unterminated attribute selector")]
    UnterminatedAttribute,
    #[error("attribute selector missing a name")]
    MissingAttributeName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Tag(String),
    Class(String),
    AttrPresent(String),
    AttrEquals { name: String, value: String },
    AttrContains { name: String, value: String },
}

/// A compound simple selector: an optional tag name plus any number of
/// class and attribute tests, all against one element. This covers every
/// form the platform chains use (`main`, `.user-message`,
/// `[data-role="user"]`, `[data-test-id*="user"]`,
/// `message-set.user-message`); there are no descendant combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    raw: String,
    parts: Vec<Part>,
}

impl Selector {
    /// Parses a selector string.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut parts = Vec::new();
        let mut chars = raw.chars().peekable();
        while let Some(&c) = chars.peek() {
            match c {
                '.' => {
                    chars.next();
                    let name = read_ident(&mut chars);
                    if name.is_empty() {
                        return Err(SelectorError::Unexpected('.'));
                    }
                    parts.push(Part::Class(name));
                }
                '[' => {
                    chars.next();
                    parts.push(read_attribute(&mut chars)?);
                }
                _ if is_ident_char(c) => {
                    let name = read_ident(&mut chars);
                    // A tag test only makes sense once, at the front.
                    if !parts.is_empty() {
                        return Err(SelectorError::Unexpected(c));
                    }
                    parts.push(Part::Tag(name));
                }
                other => return Err(SelectorError::Unexpected(other)),
            }
        }

        if parts.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { raw, parts })
    }

    /// Whether `element` satisfies every part of this selector.
    pub fn matches(&self, element: &ElementData) -> bool {
        self.parts.iter().all(|part| match part {
            Part::Tag(tag) => element.tag.eq_ignore_ascii_case(tag),
            Part::Class(class) => element.classes.iter().any(|c| c == class),
            Part::AttrPresent(name) => element.attr(name).is_some(),
            Part::AttrEquals { name, value } => element.attr(name) == Some(value.as_str()),
            Part::AttrContains { name, value } => {
                element.attr(name).is_some_and(|v| v.contains(value.as_str()))
            }
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if is_ident_char(c) {
            out.push(c);
            chars.next();
        } else {
            break;
        }
    }
    out
}

fn read_attribute(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<Part, SelectorError> {
    let mut body = String::new();
    loop {
        match chars.next() {
            Some(']') => break,
            Some(c) => body.push(c),
            None => return Err(SelectorError::UnterminatedAttribute),
        }
    }

    let (name, op_value) = match body.find(['*', '=']) {
        Some(pos) => {
            let (name, rest) = body.split_at(pos);
            (name.trim(), Some(rest))
        }
        None => (body.trim(), None),
    };
    if name.is_empty() {
        return Err(SelectorError::MissingAttributeName);
    }

    match op_value {
        None => Ok(Part::AttrPresent(name.to_owned())),
        Some(rest) => {
            let (contains, value) = if let Some(v) = rest.strip_prefix("*=") {
                (true, v)
            } else if let Some(v) = rest.strip_prefix('=') {
                (false, v)
            } else {
                return Err(SelectorError::Unexpected('*'));
            };
            let value = unquote(value.trim()).to_owned();
            if contains {
                Ok(Part::AttrContains {
                    name: name.to_owned(),
                    value,
                })
            } else {
                Ok(Part::AttrEquals {
                    name: name.to_owned(),
                    value,
                })
            }
        }
    }
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'"' || bytes[0] == b'\'') && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::ElementData;

    fn div() -> ElementData {
        ElementData::new("div")
            .with_class("user-message")
            .with_attr("data-test-id", "user-query-7")
    }

    #[test]
    fn tag_class_and_attr_forms_parse_and_match() {
        assert!(Selector::parse("div").unwrap().matches(&div()));
        assert!(Selector::parse(".user-message").unwrap().matches(&div()));
        assert!(Selector::parse("[data-test-id]").unwrap().matches(&div()));
        assert!(Selector::parse(r#"[data-test-id*="user"]"#)
            .unwrap()
            .matches(&div()));
        assert!(Selector::parse(r#"[data-test-id="user-query-7"]"#)
            .unwrap()
            .matches(&div()));
        assert!(!Selector::parse(r#"[data-test-id="user"]"#)
            .unwrap()
            .matches(&div()));
    }

    #[test]
    fn compound_selector_requires_every_part() {
        let sel = Selector::parse("div.user-message[data-test-id]").unwrap();
        assert!(sel.matches(&div()));
        assert!(!sel.matches(&ElementData::new("div")));
        assert!(!sel.matches(&ElementData::new("span").with_class("user-message")));
    }

    #[test]
    fn malformed_selectors_report_errors() {
        assert_eq!(Selector::parse(""), Err(SelectorError::Empty));
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert_eq!(
            Selector::parse("[data-role"),
            Err(SelectorError::UnterminatedAttribute)
        );
        assert_eq!(
            Selector::parse("[=user]"),
            Err(SelectorError::MissingAttributeName)
        );
        assert_eq!(Selector::parse("a b"), Err(SelectorError::Unexpected(' ')));
    }
}
