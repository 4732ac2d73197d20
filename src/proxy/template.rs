//! Path templates with whole-segment `{param}` placeholders.
//!
//! A [`PathTemplate`] is used on both sides of a route: the public
//! template captures raw parameter values from the request path, and
//! the upstream template renders them back into a path. Values are
//! carried verbatim in both directions, without decoding or encoding.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template such as `/api/curation/ticket/{id}/claim`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        if raw.is_empty() {
            return Err("path cannot be empty".into());
        }
        if !raw.starts_with('/') {
            return Err(format!("path must start with '/' (did you mean '/{raw}'?)"));
        }

        let mut segments = Vec::new();
        for part in raw.split('/').filter(|s| !s.is_empty()) {
            if let Some(inner) = part.strip_prefix('{') {
                let Some(name) = inner.strip_suffix('}') else {
                    return Err(format!("unclosed parameter in segment '{part}'"));
                };
                if name.is_empty() {
                    return Err("parameter name cannot be empty".into());
                }
                if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(format!(
                        "parameter '{name}' may only contain letters, digits and '_'"
                    ));
                }
                if segments
                    .iter()
                    .any(|s| matches!(s, Segment::Param(p) if p == name))
                {
                    return Err(format!("parameter '{name}' appears more than once"));
                }
                segments.push(Segment::Param(name.to_string()));
            } else if part.contains('{') || part.contains('}') {
                return Err(format!(
                    "parameters must span a whole segment, got '{part}'"
                ));
            } else {
                segments.push(Segment::Literal(part.to_string()));
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match pre-split request segments, returning a specificity score and
    /// the raw captured values. Literal segments score 10, parameters 5.
    #[must_use]
    pub fn capture(&self, request: &[&str]) -> Option<(u32, HashMap<String, String>)> {
        if self.segments.len() != request.len() {
            return None;
        }

        let mut params = HashMap::new();
        let mut specificity = 0;
        for (segment, value) in self.segments.iter().zip(request) {
            match segment {
                Segment::Literal(lit) if lit == value => specificity += 10,
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*value).to_string());
                    specificity += 5;
                }
            }
        }
        Some((specificity, params))
    }

    /// Render the template, inserting each parameter value exactly once.
    ///
    /// Missing parameters render as an empty segment; route validation
    /// guarantees every upstream parameter is captured by the public side.
    #[must_use]
    pub fn render(&self, params: &HashMap<String, String>) -> String {
        if self.segments.is_empty() {
            return "/".into();
        }
        let mut out = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Param(name) => {
                    if let Some(value) = params.get(name) {
                        out.push_str(value);
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Split a request path into its non-empty segments.
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn parses_literals_and_params() {
        let t = PathTemplate::parse("/api/curation/ticket/{id}/claim").unwrap();
        assert_eq!(t.segments().len(), 5);
        assert_eq!(t.params().collect::<Vec<_>>(), vec!["id"]);
    }

    #[test]
    fn rejects_relative_path() {
        let err = PathTemplate::parse("api/vitals").unwrap_err();
        assert!(err.contains("did you mean '/api/vitals'?"));
    }

    #[test]
    fn rejects_partial_segment_param() {
        assert!(PathTemplate::parse("/tickets/id-{id}").is_err());
        assert!(PathTemplate::parse("/tickets/{id").is_err());
        assert!(PathTemplate::parse("/tickets/{}").is_err());
    }

    #[test]
    fn rejects_duplicate_param() {
        let err = PathTemplate::parse("/a/{id}/b/{id}").unwrap_err();
        assert!(err.contains("more than once"));
    }

    #[test]
    fn captures_raw_values() {
        let t = PathTemplate::parse("/api/curation/ticket/{id}/claim").unwrap();
        let (score, captured) = t
            .capture(&split_path("/api/curation/ticket/a%2Fb/claim"))
            .unwrap();
        assert_eq!(score, 45);
        assert_eq!(captured["id"], "a%2Fb");
    }

    #[test]
    fn capture_requires_same_length() {
        let t = PathTemplate::parse("/api/cart/mini").unwrap();
        assert!(t.capture(&split_path("/api/cart")).is_none());
        assert!(t.capture(&split_path("/api/cart/mini/extra")).is_none());
    }

    #[test]
    fn render_substitutes_each_param_once() {
        let t = PathTemplate::parse("/admin/curators/payouts/{batchId}/process").unwrap();
        assert_eq!(
            t.render(&params(&[("batchId", "{batchId}")])),
            "/admin/curators/payouts/{batchId}/process"
        );
        assert_eq!(
            t.render(&params(&[("batchId", "b-7")])),
            "/admin/curators/payouts/b-7/process"
        );
    }

    #[test]
    fn render_does_not_touch_similar_names() {
        let t = PathTemplate::parse("/items/{item_id}/{id}").unwrap();
        assert_eq!(
            t.render(&params(&[("id", "short"), ("item_id", "long")])),
            "/items/long/short"
        );
    }

    #[test]
    fn root_template_renders_slash() {
        let t = PathTemplate::parse("/").unwrap();
        assert_eq!(t.render(&HashMap::new()), "/");
    }
}
