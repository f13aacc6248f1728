//! `data.js` binding scanner.
//!
//! The sync job writes the snapshot as a script of top-level bindings whose
//! right-hand sides are JSON literals:
//!
//! ```text
//! // Auto-synced from Smartsheet
//! const SLA_DATA = { "summary": { ... }, ... };
//! const ORDERS_DATA = [ ... ];
//! ```
//!
//! Only that shape is accepted: `const`/`let`/`var` (optionally `export`ed),
//! an identifier, `=`, one JSON value and an optional `;`. Line and block
//! comments may appear between bindings. Anything else is a parse error.

use serde_json::Value;
use tracing::debug;

use crate::error::{LoadError, LoadResult};

/// One `NAME = <json>` binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: Value,
    /// 1-based line where the declaration starts.
    pub line: usize,
}

/// Parse every binding in a `data.js` source, in declaration order.
///
/// Declaring the same name twice is an error.
pub fn parse_bindings(source: &str) -> LoadResult<Vec<Binding>> {
    let mut scanner = Scanner::new(source);
    let mut bindings: Vec<Binding> = Vec::new();

    loop {
        scanner.skip_trivia()?;
        if scanner.at_end() {
            break;
        }

        let binding = scanner.binding()?;
        if bindings.iter().any(|b| b.name == binding.name) {
            return Err(LoadError::Parse {
                line: binding.line,
                message: format!("duplicate binding `{}`", binding.name),
            });
        }
        debug!(name = %binding.name, line = binding.line, "Parsed binding");
        bindings.push(binding);
    }

    Ok(bindings)
}

/// Take the binding called `name` out of `bindings`.
pub fn take_binding(bindings: &mut Vec<Binding>, name: &str) -> Option<Binding> {
    let idx = bindings.iter().position(|b| b.name == name)?;
    Some(bindings.remove(idx))
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        let pos = if src.starts_with('\u{feff}') { '\u{feff}'.len_utf8() } else { 0 };
        Self { src, pos }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn line_at(&self, pos: usize) -> usize {
        self.src[..pos].matches('\n').count() + 1
    }

    fn error(&self, message: impl Into<String>) -> LoadError {
        LoadError::Parse {
            line: self.line_at(self.pos),
            message: message.into(),
        }
    }

    /// Skip whitespace, `// ...` and `/* ... */`.
    fn skip_trivia(&mut self) -> LoadResult<()> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with("//") {
                match trimmed.find('\n') {
                    Some(end) => self.pos += end + 1,
                    None => self.pos = self.src.len(),
                }
            } else if trimmed.starts_with("/*") {
                match trimmed[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => return Err(self.error("unterminated block comment")),
                }
            } else {
                return Ok(());
            }
        }
    }

    fn identifier(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
            _ => return None,
        }
        let end = chars
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '$'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += end;
        Some(&rest[..end])
    }

    fn expect_char(&mut self, expected: char) -> LoadResult<()> {
        self.skip_trivia()?;
        if self.rest().starts_with(expected) {
            self.pos += expected.len_utf8();
            Ok(())
        } else {
            Err(self.error(format!("expected `{expected}`")))
        }
    }

    fn binding(&mut self) -> LoadResult<Binding> {
        let line = self.line_at(self.pos);

        let mut keyword = self.identifier();
        if keyword == Some("export") {
            self.skip_trivia()?;
            keyword = self.identifier();
        }
        if !matches!(keyword, Some("const" | "let" | "var")) {
            return Err(LoadError::Parse {
                line,
                message: "expected a `const`, `let` or `var` declaration".to_string(),
            });
        }

        self.skip_trivia()?;
        let name = self
            .identifier()
            .ok_or_else(|| self.error("expected a binding name"))?
            .to_string();

        self.expect_char('=')?;
        self.skip_trivia()?;
        let value = self.json_value(&name)?;

        self.skip_trivia()?;
        if self.rest().starts_with(';') {
            self.pos += 1;
        }

        Ok(Binding { name, value, line })
    }

    fn json_value(&mut self, name: &str) -> LoadResult<Value> {
        let start_line = self.line_at(self.pos);
        let rest = self.rest();

        // Numbers and literals are not self-delimiting, so a directly following
        // `;` would read as trailing JSON. Cut the token out first.
        if !rest.starts_with(|c| matches!(c, '{' | '[' | '"')) {
            let end = rest
                .find(|c: char| c == ';' || c == '/' || c.is_whitespace())
                .unwrap_or(rest.len());
            if end == 0 {
                return Err(self.error(format!("missing value for `{name}`")));
            }
            let value = serde_json::from_str(&rest[..end]).map_err(|e| LoadError::Parse {
                line: start_line,
                message: format!("invalid JSON literal for `{name}`: {e}"),
            })?;
            self.pos += end;
            return Ok(value);
        }

        let mut stream = serde_json::Deserializer::from_str(self.rest()).into_iter::<Value>();

        match stream.next() {
            Some(Ok(value)) => {
                self.pos += stream.byte_offset();
                Ok(value)
            }
            Some(Err(e)) => Err(LoadError::Parse {
                line: start_line + e.line().saturating_sub(1),
                message: format!("invalid JSON literal for `{name}`: {e}"),
            }),
            None => Err(self.error(format!("missing value for `{name}`"))),
        }
    }
}
