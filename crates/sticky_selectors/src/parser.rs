//! Selector parsing.

use crate::{Combinator, ComplexSelector, CompoundSelector, SelectorList, SimpleSelector};
use core::mem::take;

/// Internal tokenizer token kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Tok {
    /// A combinator token like child/adjacent/general sibling.
    Combinator(Combinator),
    /// Whitespace that implies a descendant combinator.
    DescendantWS,
    /// A simple selector token (type, class, id, attribute, universal).
    Simple(SimpleSelector),
    /// Anything outside the supported grammar.
    Invalid,
}

/// Tokenizer over a selector string.
struct SelectorTokenizer<'input> {
    input_bytes: &'input [u8],
    index: usize,
}

impl<'input> SelectorTokenizer<'input> {
    #[inline]
    const fn new(input: &'input str) -> Self {
        Self {
            input_bytes: input.as_bytes(),
            index: 0,
        }
    }

    /// Return the next selector token, if any.
    fn next_token(&mut self) -> Option<Tok> {
        let start = self.index;
        self.skip_spaces();
        let &current = self.input_bytes.get(self.index)?;
        if self.index > start {
            // Whitespace between two tokens is a descendant combinator.
            return Some(Tok::DescendantWS);
        }
        let token = match current {
            b'*' => {
                self.advance();
                Tok::Simple(SimpleSelector::Universal)
            }
            b'.' => {
                self.advance();
                self.consume_ident()
                    .map_or(Tok::Invalid, |ident| Tok::Simple(SimpleSelector::Class(ident)))
            }
            b'#' => {
                self.advance();
                self.consume_ident().map_or(Tok::Invalid, |ident| {
                    Tok::Simple(SimpleSelector::IdSelector(ident))
                })
            }
            b'[' => self.consume_attr(),
            b'>' => {
                self.advance();
                Tok::Combinator(Combinator::Child)
            }
            b'+' => {
                self.advance();
                Tok::Combinator(Combinator::AdjacentSibling)
            }
            b'~' => {
                self.advance();
                Tok::Combinator(Combinator::GeneralSibling)
            }
            _ => self.consume_ident().map_or(Tok::Invalid, |ident| {
                Tok::Simple(SimpleSelector::Type(ident.to_ascii_lowercase()))
            }),
        };
        Some(token)
    }

    #[inline]
    fn advance(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    /// Consume an identifier of ASCII alphanumerics, '-' and '_'.
    ///
    /// Returns `None` when no identifier character is present.
    fn consume_ident(&mut self) -> Option<String> {
        let start = self.index;
        while let Some(&byte) = self.input_bytes.get(self.index) {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        let slice = self.input_bytes.get(start..self.index).unwrap_or(&[]);
        if slice.is_empty() {
            return None;
        }
        Some(String::from_utf8_lossy(slice).into_owned())
    }

    /// Parse `[name]` or `[name=value]` with an optional quoted value.
    fn consume_attr(&mut self) -> Tok {
        // skip '['
        self.advance();
        self.skip_spaces();
        let Some(name) = self.consume_ident() else {
            return Tok::Invalid;
        };
        let name = name.to_ascii_lowercase();
        self.skip_spaces();
        let selector = if self.peek_is(b'=') {
            self.advance();
            self.skip_spaces();
            let value = match self.input_bytes.get(self.index) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    self.advance();
                    match self.consume_quoted_attr_value(quote) {
                        Some(value) => value,
                        None => return Tok::Invalid,
                    }
                }
                _ => self.consume_unquoted_attr_value(),
            };
            SimpleSelector::AttrEquals { name, value }
        } else {
            SimpleSelector::AttrExists(name)
        };
        self.skip_spaces();
        if !self.peek_is(b']') {
            return Tok::Invalid;
        }
        self.advance();
        Tok::Simple(selector)
    }

    #[inline]
    fn peek_is(&self, expected: u8) -> bool {
        self.input_bytes
            .get(self.index)
            .is_some_and(|&byte| byte == expected)
    }

    /// Consume an unquoted attribute value until whitespace or a closing bracket.
    fn consume_unquoted_attr_value(&mut self) -> String {
        let start = self.index;
        while let Some(&byte) = self.input_bytes.get(self.index) {
            if byte.is_ascii_whitespace() || byte == b']' {
                break;
            }
            self.advance();
        }
        let slice = self.input_bytes.get(start..self.index).unwrap_or(&[]);
        String::from_utf8_lossy(slice).into_owned()
    }

    /// Consume a quoted attribute value up to the matching quote byte.
    fn consume_quoted_attr_value(&mut self, quote: u8) -> Option<String> {
        let start = self.index;
        while matches!(self.input_bytes.get(self.index), Some(&byte) if byte != quote) {
            self.advance();
        }
        let slice = self.input_bytes.get(start..self.index)?;
        let out = String::from_utf8_lossy(slice).into_owned();
        // Unterminated quote.
        self.input_bytes.get(self.index)?;
        self.advance();
        Some(out)
    }

    fn skip_spaces(&mut self) {
        while matches!(self.input_bytes.get(self.index), Some(byte) if byte.is_ascii_whitespace()) {
            self.advance();
        }
    }
}

/// Parse a selector list from CSS text.
///
/// A single invalid entry invalidates the whole list, which then matches nothing.
pub fn parse_selector_list(input: &str) -> SelectorList {
    let mut list = SelectorList::default();
    for part in input.split(',') {
        let Some(sel) = parse_complex_selector(part.trim()) else {
            return SelectorList::default();
        };
        list.selectors.push(sel);
    }
    list
}

/// Parse one complex selector. Returns `None` for empty or malformed input.
pub fn parse_complex_selector(input: &str) -> Option<ComplexSelector> {
    let mut tokens = SelectorTokenizer::new(input);
    let mut current = CompoundSelector::default();
    let mut first: Option<CompoundSelector> = None;
    let mut rest: Vec<(Combinator, CompoundSelector)> = Vec::new();
    let mut pending_combinator: Option<Combinator> = None;

    while let Some(token) = tokens.next_token() {
        match token {
            Tok::Invalid => return None,
            Tok::Combinator(comb) => {
                // Explicit combinators override an implied descendant one.
                if current.simples.is_empty() {
                    if matches!(pending_combinator, Some(Combinator::Descendant)) {
                        pending_combinator = Some(comb);
                        continue;
                    }
                    return None;
                }
                push_compound(&mut first, &mut rest, pending_combinator, take(&mut current));
                pending_combinator = Some(comb);
            }
            Tok::DescendantWS => {
                if !current.simples.is_empty() {
                    push_compound(&mut first, &mut rest, pending_combinator, take(&mut current));
                    pending_combinator = Some(Combinator::Descendant);
                }
            }
            Tok::Simple(simple) => current.simples.push(simple),
        }
    }

    if current.simples.is_empty() {
        // Empty input or a dangling combinator.
        return None;
    }
    push_compound(&mut first, &mut rest, pending_combinator, current);

    Some(ComplexSelector {
        first: first.unwrap_or_default(),
        rest,
    })
}

fn push_compound(
    first: &mut Option<CompoundSelector>,
    rest: &mut Vec<(Combinator, CompoundSelector)>,
    combinator: Option<Combinator>,
    compound: CompoundSelector,
) {
    if first.is_none() {
        *first = Some(compound);
    } else {
        rest.push((combinator.unwrap_or(Combinator::Descendant), compound));
    }
}
