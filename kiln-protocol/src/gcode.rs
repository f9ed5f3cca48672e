//! Tokenizer for G-code style command lines.
//!
//! Line format:
//! - NAME: first whitespace-separated token (e.g. `ADD_SEGMENT`)
//! - PARAMS: zero or more `KEY=VALUE` tokens, in any order
//! - COMMENT: everything after `;` is ignored
//!
//! Names and keys compare case-insensitively, values are kept verbatim.

use heapless::Vec;

/// Maximum parameters on a single line
pub const MAX_PARAMS: usize = 8;

/// Comment delimiter
pub const COMMENT_CHAR: char = ';';

/// Errors that can occur while tokenizing a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GcodeError {
    /// Line contains no command name
    Empty,
    /// More parameters than [`MAX_PARAMS`]
    TooManyParams,
    /// Parameter token without `=` or with an empty key
    MalformedParam,
    /// The same key appears twice
    DuplicateParam,
}

/// A tokenized command line borrowing from the input text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcodeLine<'a> {
    name: &'a str,
    params: Vec<(&'a str, &'a str), MAX_PARAMS>,
}

impl<'a> GcodeLine<'a> {
    /// Tokenize a single line
    pub fn parse(line: &'a str) -> Result<Self, GcodeError> {
        let code = match line.find(COMMENT_CHAR) {
            Some(idx) => &line[..idx],
            None => line,
        };

        let mut tokens = code.split_whitespace();
        let name = tokens.next().ok_or(GcodeError::Empty)?;

        let mut params: Vec<(&'a str, &'a str), MAX_PARAMS> = Vec::new();
        for token in tokens {
            let (key, value) = token.split_once('=').ok_or(GcodeError::MalformedParam)?;
            if key.is_empty() {
                return Err(GcodeError::MalformedParam);
            }
            if params.iter().any(|(k, _)| k.eq_ignore_ascii_case(key)) {
                return Err(GcodeError::DuplicateParam);
            }
            params
                .push((key, value))
                .map_err(|_| GcodeError::TooManyParams)?;
        }

        Ok(Self { name, params })
    }

    /// Command name as written
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Check the command name, ignoring case
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Look up a parameter value by key, ignoring case
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| *v)
    }

    /// Number of parameters on the line
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}
