//! Lightweight inline-style handling.
//!
//! Parses `style=""` attributes into an ordered declaration list the
//! components can edit, and extracts the few visual values the viewer
//! renders (opacity, vertical translation, display).

/// Ordered inline style declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleProps {
    declarations: Vec<(String, String)>,
}

impl StyleProps {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the value in place, or append a new declaration.
    pub fn set(&mut self, property: &str, value: &str) {
        match self.declarations.iter_mut().find(|(p, _)| p == property) {
            Some(decl) => decl.1 = value.to_string(),
            None => self
                .declarations
                .push((property.to_string(), value.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn to_inline(&self) -> String {
        self.declarations
            .iter()
            .map(|(p, v)| format!("{}: {}", p, v))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// `opacity` clamped to 0.0–1.0; 1.0 when unset or unparsable.
    pub fn opacity(&self) -> f32 {
        self.get("opacity")
            .and_then(|v| v.trim().parse::<f32>().ok())
            .map(|o| o.clamp(0.0, 1.0))
            .unwrap_or(1.0)
    }

    /// Vertical offset from a `translateY(..)` transform, in px.
    pub fn translate_y(&self) -> f32 {
        self.get("transform")
            .and_then(|t| {
                let t = t.trim();
                let inner = t.strip_prefix("translateY(")?.strip_suffix(')')?;
                parse_css_size(inner)
            })
            .unwrap_or(0.0)
    }
}

/// Parse an inline `style="..."` attribute value.
pub fn parse_inline_style(style: &str) -> StyleProps {
    let mut props = StyleProps::default();
    for decl in style.split(';') {
        let parts: Vec<&str> = decl.splitn(2, ':').collect();
        if parts.len() != 2 {
            continue;
        }
        let prop = parts[0].trim().to_lowercase();
        let val = parts[1].trim();
        if prop.is_empty() {
            continue;
        }
        props.set(&prop, val);
    }
    props
}

/// Parse a CSS size value (px or plain number).
pub fn parse_css_size(val: &str) -> Option<f32> {
    let v = val.trim().to_lowercase();
    let num_str = v.trim_end_matches("px").trim_end_matches("rem").trim_end_matches("em");
    num_str.trim().parse::<f32>().ok()
}
