//! Inline `style="..."` attribute handling.

/// A single declaration from a style attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name in ASCII lowercase.
    pub property: String,
    /// Value trimmed of surrounding ASCII whitespace.
    pub value: String,
}

/// Parse a style attribute into declarations, keeping only the last
/// occurrence of each property at the position it was first declared.
///
/// Items without a colon, or with an empty property or value, are skipped.
pub fn parse_style_attribute(input: &str) -> Vec<Declaration> {
    let mut out: Vec<Declaration> = Vec::new();
    for raw_item in input.split(';') {
        let Some((raw_prop, raw_value)) = raw_item.split_once(':') else {
            continue;
        };
        let property = raw_prop.trim_matches(is_ascii_whitespace).to_ascii_lowercase();
        let value = raw_value.trim_matches(is_ascii_whitespace);
        if property.is_empty() || value.is_empty() {
            continue;
        }
        if let Some(existing) = out.iter_mut().find(|decl| decl.property == property) {
            value.clone_into(&mut existing.value);
        } else {
            out.push(Declaration {
                property,
                value: value.to_owned(),
            });
        }
    }
    out
}

/// Serialize declarations back into attribute text.
pub fn serialize_declarations(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(|decl| format!("{}: {};", decl.property, decl.value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Set `property` in `input`, returning the new attribute text. An empty
/// value removes the property.
pub fn set_property(input: &str, property: &str, value: &str) -> String {
    let property = property.trim_matches(is_ascii_whitespace).to_ascii_lowercase();
    let value = value.trim_matches(is_ascii_whitespace);
    let mut declarations = parse_style_attribute(input);
    if value.is_empty() {
        declarations.retain(|decl| decl.property != property);
    } else if let Some(existing) = declarations.iter_mut().find(|decl| decl.property == property) {
        value.clone_into(&mut existing.value);
    } else {
        declarations.push(Declaration {
            property,
            value: value.to_owned(),
        });
    }
    serialize_declarations(&declarations)
}

/// Value of `property` in `input`, if declared.
pub fn property_value(input: &str, property: &str) -> Option<String> {
    let property = property.to_ascii_lowercase();
    parse_style_attribute(input)
        .into_iter()
        .find(|decl| decl.property == property)
        .map(|decl| decl.value)
}

/// Parse a `<number>px` or bare `0` length.
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim_matches(is_ascii_whitespace);
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
    let parsed = number.trim_matches(is_ascii_whitespace).parse::<f64>().ok()?;
    parsed.is_finite().then_some(parsed)
}

/// ASCII whitespace per CSS Syntax (TAB, LF, FF, CR, SPACE).
const fn is_ascii_whitespace(character: char) -> bool {
    matches!(
        character,
        '\u{0009}' | '\u{000A}' | '\u{000C}' | '\u{000D}' | '\u{0020}'
    )
}
