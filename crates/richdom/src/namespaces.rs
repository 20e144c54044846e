//! Namespace assignment as pure name lookup.
//!
//! Namespaces are a function of the tag or attribute name alone; no document
//! context is threaded through the builder beyond SVG inheritance for
//! elements created directly under an SVG parent.

/// XML namespace carried by an element or attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ns {
    Svg,
    XLink,
}

impl Ns {
    pub const fn uri(self) -> &'static str {
        match self {
            Ns::Svg => "http://www.w3.org/2000/svg",
            Ns::XLink => "http://www.w3.org/1999/xlink",
        }
    }
}

/// Namespace for an element tag name, or `None` for the default namespace.
pub fn namespace_for_tag(name: &str) -> Option<Ns> {
    if is_svg_tag(name) { Some(Ns::Svg) } else { None }
}

/// Namespace for an attribute name, or `None` for the default namespace.
pub fn namespace_for_attribute(name: &str) -> Option<Ns> {
    if name.starts_with("xlink:") {
        Some(Ns::XLink)
    } else {
        None
    }
}

fn is_svg_tag(name: &str) -> bool {
    // SVG tag names are case-sensitive; camelCase entries appear as written.
    matches!(
        name,
        "svg"
            | "circle"
            | "clipPath"
            | "defs"
            | "ellipse"
            | "filter"
            | "foreignObject"
            | "g"
            | "image"
            | "line"
            | "linearGradient"
            | "marker"
            | "mask"
            | "path"
            | "pattern"
            | "polygon"
            | "polyline"
            | "radialGradient"
            | "rect"
            | "stop"
            | "symbol"
            | "text"
            | "textPath"
            | "tspan"
            | "use"
    )
}
