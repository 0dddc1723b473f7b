//! Route templates such as `/items/{item_id}`.
//!
//! Templates are compiled to an anchored regex once at registration. Static
//! segments are escaped, each `{name}` segment captures one non-empty path
//! segment, and a trailing slash is significant.

use crate::router::ParamVec;
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct PathTemplate {
    raw: String,
    regex: Regex,
    params: Vec<Arc<str>>,
}

impl fmt::Debug for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathTemplate")
            .field("raw", &self.raw)
            .field("params", &self.params)
            .finish()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PathTemplate {
    /// Compile a template.
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not start with `/` or the
    /// generated pattern fails to compile.
    pub fn parse(raw: &str) -> Result<Self, String> {
        if !raw.starts_with('/') {
            return Err(format!("template '{raw}' must start with '/'"));
        }
        if raw == "/" {
            let regex = Regex::new(r"^/$").map_err(|e| e.to_string())?;
            return Ok(Self {
                raw: raw.to_string(),
                regex,
                params: Vec::new(),
            });
        }

        let mut pattern = String::with_capacity(raw.len() + 8);
        pattern.push('^');
        let mut params: Vec<Arc<str>> = Vec::with_capacity(raw.matches('{').count());

        for segment in raw[1..].split('/') {
            pattern.push('/');
            if let Some(name) = segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
            {
                if name.is_empty() {
                    return Err(format!("template '{raw}' has an unnamed segment"));
                }
                pattern.push_str("([^/]+)");
                params.push(Arc::from(name));
            } else if segment.contains('{') || segment.contains('}') {
                return Err(format!(
                    "template '{raw}' mixes literal text and a parameter in segment '{segment}'"
                ));
            } else {
                pattern.push_str(&regex::escape(segment));
            }
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| e.to_string())?;
        debug!(template = %raw, pattern = %pattern, "Compiled route template");
        Ok(Self {
            raw: raw.to_string(),
            regex,
            params,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parameter names in positional order.
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.params
    }

    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Extract percent-decoded segment values positionally.
    ///
    /// Returns `None` when the path does not match or a segment is not valid
    /// UTF-8 after decoding.
    #[must_use]
    pub fn extract(&self, path: &str) -> Option<ParamVec> {
        let caps = self.regex.captures(path)?;
        let mut out = ParamVec::new();
        for (i, name) in self.params.iter().enumerate() {
            let raw = caps.get(i + 1)?.as_str();
            let value = urlencoding::decode(raw).ok()?;
            out.push((Arc::clone(name), value.into_owned()));
        }
        Some(out)
    }
}
