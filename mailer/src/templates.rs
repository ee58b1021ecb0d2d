use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("email template not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read email template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Loads HTML templates from a directory and fills in `{{KEY}}` placeholders.
///
/// Templates are read from disk on every call, so edits show up without a
/// restart. Values are inserted verbatim: nothing is HTML-escaped.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    dir: PathBuf,
}

impl TemplateRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Render `<dir>/<name>.html` with the given substitutions.
    pub async fn render(
        &self,
        name: &str,
        substitutions: &HashMap<&str, &str>,
    ) -> Result<String, TemplateError> {
        let path = self.dir.join(format!("{name}.html"));

        let template = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                TemplateError::NotFound(path.clone())
            } else {
                TemplateError::Read {
                    path: path.clone(),
                    source: e,
                }
            }
        })?;

        log::debug!("Loaded template {} ({} bytes)", path.display(), template.len());

        Ok(substitute(&template, substitutions))
    }
}

/// Replace every `{{key}}` token in one pass over the template, so inserted
/// values are never scanned again. Unknown placeholders stay as they are.
pub fn substitute(template: &str, substitutions: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];

        let Some(close) = after_open.find("}}") else {
            rest = &rest[open..];
            break;
        };

        match substitutions.get(&after_open[..close]) {
            Some(value) => {
                out.push_str(value);
                rest = &after_open[close + 2..];
            }
            None => {
                // not a known token; the next brace may still open one
                out.push('{');
                rest = &rest[open + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}
