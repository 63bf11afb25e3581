//! Package metadata locator.
//!
//! Pulls the verbatim metadata object of one package out of a repository
//! index (`{"packages": {"<file>": {...}, ...}}`) in a single forward scan,
//! without building a JSON tree. The resolver calls this once per package to
//! install, so the scan only tracks brace depth and string boundaries.
//!
//! The scan is an explicit state machine:
//!
//! ```text
//! SeekAnchor --"packages": {--> SeekKey --"<key>":--> SeekValueOpenBrace --{--> CaptureValue
//! ```
//!
//! The lexer owns the `InString` sub-state: braces inside quoted strings
//! (escapes included) are never counted. Keys are compared against the raw,
//! still-escaped key text.

use thiserror::Error;

const ANCHOR: &[u8] = b"packages";

/// Why a package's metadata could not be located.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    /// The document has no top-level `"packages"` member.
    #[error("Index has no top-level \"packages\" object")]
    AnchorNotFound,

    /// The `"packages"` object closed without containing the key.
    #[error("Package '{key}' not found under \"packages\"")]
    KeyNotFound {
        /// The key that was searched for.
        key: String,
    },

    /// The document ended or broke structure before the value was complete.
    #[error("Malformed index at byte {offset}: {reason}")]
    MalformedDocument {
        /// Byte offset where the problem was detected.
        offset: usize,
        /// What was wrong.
        reason: &'static str,
    },
}

/// Return the verbatim metadata object stored under `"packages"` → `key`.
///
/// The returned slice starts with `{`, ends with the matching `}` and
/// borrows `document`.
///
/// # Example
///
/// ```
/// use depsolve_core::locator::locate;
///
/// let index = r#"{"packages":{"foo-1.0.json":{"version":"1.0"}}}"#;
/// assert_eq!(locate(index, "foo-1.0.json").unwrap(), r#"{"version":"1.0"}"#);
/// ```
///
/// # Errors
///
/// [`LocateError::AnchorNotFound`] when there is no top-level `"packages"`
/// member, [`LocateError::KeyNotFound`] when that object closes without
/// `key`, and [`LocateError::MalformedDocument`] when the structure breaks
/// (value not an object, unterminated string or object).
pub fn locate<'a>(document: &'a str, key: &str) -> Result<&'a str, LocateError> {
    let mut scanner = Scanner::new(document.as_bytes(), key);
    let (start, end) = scanner.run()?;
    // Both ends sit on ASCII braces, so they are char boundaries.
    Ok(&document[start..end])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekAnchor,
    SeekKey,
    SeekValueOpenBrace,
    CaptureValue { start: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    /// String contents between the quotes, `start..end`.
    Str { start: usize, end: usize },
}

/// Splits the input into the only tokens the scan cares about.
struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.bytes[start..end]
    }

    /// Next structural token with its byte offset, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<(usize, Token)>, LocateError> {
        while let Some(&b) = self.bytes.get(self.pos) {
            let pos = self.pos;
            self.pos += 1;
            match b {
                b'{' => return Ok(Some((pos, Token::Open))),
                b'}' => return Ok(Some((pos, Token::Close))),
                b'"' => {
                    let end = self.skip_string(pos)?;
                    return Ok(Some((pos, Token::Str { start: pos + 1, end })));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    /// `InString`: consume up to and including the closing quote.
    fn skip_string(&mut self, open: usize) -> Result<usize, LocateError> {
        while let Some(&b) = self.bytes.get(self.pos) {
            self.pos += 1;
            match b {
                b'\\' => self.pos += 1,
                b'"' => return Ok(self.pos - 1),
                _ => {}
            }
        }
        Err(LocateError::MalformedDocument {
            offset: open,
            reason: "unterminated string",
        })
    }

    fn skip_whitespace(&mut self) {
        while self
            .bytes
            .get(self.pos)
            .is_some_and(u8::is_ascii_whitespace)
        {
            self.pos += 1;
        }
    }

    /// Consume `:` after optional whitespace.
    fn eat_colon(&mut self) -> bool {
        self.skip_whitespace();
        if self.bytes.get(self.pos) == Some(&b':') {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume `{` after optional whitespace, returning its offset.
    fn eat_open_brace(&mut self) -> Option<usize> {
        self.skip_whitespace();
        if self.bytes.get(self.pos) == Some(&b'{') {
            self.pos += 1;
            Some(self.pos - 1)
        } else {
            None
        }
    }
}

struct Scanner<'a> {
    lexer: Lexer<'a>,
    key: &'a str,
    depth: usize,
    state: State,
}

impl<'a> Scanner<'a> {
    fn new(bytes: &'a [u8], key: &'a str) -> Self {
        Self {
            lexer: Lexer::new(bytes),
            key,
            depth: 0,
            state: State::SeekAnchor,
        }
    }

    fn run(&mut self) -> Result<(usize, usize), LocateError> {
        loop {
            self.state = match self.state {
                State::SeekAnchor => self.seek_anchor()?,
                State::SeekKey => self.seek_key()?,
                State::SeekValueOpenBrace => self.seek_value_open_brace()?,
                State::CaptureValue { start } => return self.capture_value(start),
            };
        }
    }

    /// Find `"packages": {` among the members of the top-level object.
    fn seek_anchor(&mut self) -> Result<State, LocateError> {
        while let Some((pos, token)) = self.lexer.next_token()? {
            match token {
                Token::Open => self.depth += 1,
                Token::Close => {
                    if self.depth <= 1 {
                        return Err(LocateError::AnchorNotFound);
                    }
                    self.depth -= 1;
                }
                Token::Str { start, end } => {
                    if self.depth == 1
                        && self.lexer.slice(start, end) == ANCHOR
                        && self.lexer.eat_colon()
                    {
                        if self.lexer.eat_open_brace().is_none() {
                            return Err(LocateError::MalformedDocument {
                                offset: pos,
                                reason: "\"packages\" is not an object",
                            });
                        }
                        self.depth = 1;
                        return Ok(State::SeekKey);
                    }
                }
            }
        }
        Err(LocateError::AnchorNotFound)
    }

    /// Walk the packages object, testing keys at depth 1.
    fn seek_key(&mut self) -> Result<State, LocateError> {
        while let Some((_, token)) = self.lexer.next_token()? {
            match token {
                Token::Open => self.depth += 1,
                Token::Close => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        return Err(LocateError::KeyNotFound {
                            key: self.key.to_string(),
                        });
                    }
                }
                Token::Str { start, end } => {
                    if self.depth == 1
                        && self.lexer.slice(start, end) == self.key.as_bytes()
                        && self.lexer.eat_colon()
                    {
                        return Ok(State::SeekValueOpenBrace);
                    }
                }
            }
        }
        Err(LocateError::MalformedDocument {
            offset: self.lexer.bytes.len(),
            reason: "\"packages\" object is never closed",
        })
    }

    fn seek_value_open_brace(&mut self) -> Result<State, LocateError> {
        match self.lexer.eat_open_brace() {
            Some(start) => Ok(State::CaptureValue { start }),
            None => Err(LocateError::MalformedDocument {
                offset: self.lexer.pos,
                reason: "package value is not an object",
            }),
        }
    }

    /// Consume the value object, returning its inclusive span as `start..end`.
    fn capture_value(&mut self, start: usize) -> Result<(usize, usize), LocateError> {
        self.depth = 1;
        while let Some((pos, token)) = self.lexer.next_token()? {
            match token {
                Token::Open => self.depth += 1,
                Token::Close => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        return Ok((start, pos + 1));
                    }
                }
                Token::Str { .. } => {}
            }
        }
        Err(LocateError::MalformedDocument {
            offset: start,
            reason: "package object is never closed",
        })
    }
}
