//! Sentinel markers placed at the top and bottom edges of a subject's
//! positioned ancestor.

use crate::host::{NodeKey, StickyHost};
use anyhow::Result;
use core::fmt;

/// Block size of every sentinel, in CSS pixels.
pub const SENTINEL_THICKNESS_PX: f64 = 10.0;

/// Which edge of the ancestor a sentinel marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentinelRole {
    Top,
    Bottom,
}

impl SentinelRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    /// Class applied to sentinels of this role.
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Top => "sticky-sentinel-top",
            Self::Bottom => "sticky-sentinel-bottom",
        }
    }

    /// Label shown inside debug sentinels.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Top => "TOP",
            Self::Bottom => "BOTTOM",
        }
    }

    const fn debug_color(self) -> &'static str {
        match self {
            Self::Top => "green",
            Self::Bottom => "red",
        }
    }
}

impl fmt::Display for SentinelRole {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Properties that place a sentinel. Debug styling never touches these.
pub const GEOMETRY_PROPERTIES: [&str; 6] = ["position", "height", "left", "right", "top", "bottom"];

/// Inline style declarations for a sentinel, in application order.
pub fn sentinel_declarations(role: SentinelRole, debug: bool) -> Vec<(&'static str, String)> {
    let mut declarations = vec![
        ("position", "absolute".to_owned()),
        ("height", format!("{SENTINEL_THICKNESS_PX}px")),
        ("left", "0".to_owned()),
        ("right", "0".to_owned()),
        ("pointer-events", "none".to_owned()),
    ];
    match role {
        SentinelRole::Top => declarations.push(("top", "0".to_owned())),
        SentinelRole::Bottom => declarations.push(("bottom", "0".to_owned())),
    }
    if debug {
        declarations.extend([
            ("visibility", "visible".to_owned()),
            ("z-index", "9999".to_owned()),
            ("opacity", "0.5".to_owned()),
            ("background-color", role.debug_color().to_owned()),
            ("border", "1px solid black".to_owned()),
            ("display", "flex".to_owned()),
            ("align-items", "center".to_owned()),
            ("justify-content", "center".to_owned()),
            ("font-size", "10px".to_owned()),
            ("color", "white".to_owned()),
            ("font-weight", "bold".to_owned()),
        ]);
    } else {
        declarations.push(("visibility", "hidden".to_owned()));
    }
    declarations
}

/// Create a detached sentinel element for `role`.
///
/// Attaching it to the document is left to the caller.
///
/// # Errors
///
/// Propagates host failures while styling the new element.
pub fn create_sentinel<H: StickyHost + ?Sized>(
    host: &mut H,
    role: SentinelRole,
    debug: bool,
) -> Result<NodeKey> {
    let sentinel = host.create_element("div");
    host.add_class(sentinel, role.class_name())?;
    for (property, value) in sentinel_declarations(role, debug) {
        host.set_style(sentinel, property, &value)?;
    }
    if debug {
        host.set_text_content(sentinel, role.label())?;
    }
    Ok(sentinel)
}
