//! Token cursor used to read the leading keywords and object name of a
//! statement.
//!
//! Tokenization uses sqlparser's Snowflake dialect; comments come back as
//! whitespace tokens and are skipped along with it.
//!
//! ```ignore
//! let mut parser = TokenParser::new("drop table if exists sample_table")?;
//! parser.skip_whitespace();
//! parser.expect_word_ci("drop")?;
//! ```

use sqlparser::dialect::SnowflakeDialect;
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer};

use super::identifier_utils::{format_word, join_qualified};

/// Token stream plus position.
pub struct TokenParser {
    tokens: Vec<TokenWithSpan>,
    pos: usize,
}

impl TokenParser {
    /// Create a new TokenParser from a SQL string.
    ///
    /// Only the leading keywords are ever read, so when the tokenizer fails
    /// further on (an unterminated literal under different escaping rules,
    /// say) the text before the failure is tokenized instead. Returns `None`
    /// if the failure cannot be located.
    pub fn new(sql: &str) -> Option<Self> {
        let dialect = SnowflakeDialect {};
        let mut end = sql.len();
        loop {
            match Tokenizer::new(&dialect, &sql[..end]).tokenize_with_location() {
                Ok(tokens) => return Some(Self { tokens, pos: 0 }),
                Err(e) => {
                    let cut = byte_offset(&sql[..end], e.location.line, e.location.column)?;
                    if cut >= end {
                        return None;
                    }
                    tracing::trace!(error = %e.message, cut, "tokenizing statement prefix");
                    end = cut;
                }
            }
        }
    }

    // ========================================================================
    // Position and state
    // ========================================================================

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    #[inline]
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len());
    }

    #[inline]
    pub fn current_token(&self) -> Option<&TokenWithSpan> {
        self.tokens.get(self.pos)
    }

    #[inline]
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    /// Skip whitespace and comment tokens.
    pub fn skip_whitespace(&mut self) {
        while let Some(token) = self.current_token() {
            match &token.token {
                Token::Whitespace(_) => self.advance(),
                _ => break,
            }
        }
    }

    // ========================================================================
    // Token type checks
    // ========================================================================

    /// Check if current token is a word matching (case-insensitive).
    ///
    /// Quoted words never match, so `"select"` used as an identifier is not
    /// mistaken for the keyword.
    #[inline]
    pub fn check_word_ci(&self, word: &str) -> bool {
        if let Some(token) = self.current_token() {
            matches!(&token.token, Token::Word(w) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case(word))
        } else {
            false
        }
    }

    /// Check if current token matches a specific token type (by discriminant).
    #[inline]
    pub fn check_token(&self, expected: &Token) -> bool {
        if let Some(token) = self.current_token() {
            std::mem::discriminant(&token.token) == std::mem::discriminant(expected)
        } else {
            false
        }
    }

    // ========================================================================
    // Expect methods (check and advance)
    // ========================================================================

    /// Expect a specific word (case-insensitive), advancing if found.
    ///
    /// Returns `Some(())` if the word was found and position advanced,
    /// `None` otherwise (position unchanged).
    pub fn expect_word_ci(&mut self, word: &str) -> Option<()> {
        if self.check_word_ci(word) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    /// Expect a sequence of words separated by whitespace, advancing past all
    /// of them. Position is unchanged when any word is missing.
    pub fn expect_words_ci(&mut self, words: &[&str]) -> Option<()> {
        let start = self.pos;
        for word in words {
            self.skip_whitespace();
            if self.expect_word_ci(word).is_none() {
                self.pos = start;
                return None;
            }
        }
        Some(())
    }

    // ========================================================================
    // Identifier parsing
    // ========================================================================

    /// Parse a possibly qualified object name (`name`, `schema.name`,
    /// `db."Schema".name`), keeping quotes as written.
    ///
    /// Advances past the name if successful.
    pub fn parse_object_name(&mut self) -> Option<String> {
        let mut parts = Vec::new();
        loop {
            match self.current_token().map(|t| &t.token) {
                Some(Token::Word(w)) => {
                    parts.push(format_word(w));
                    self.advance();
                }
                _ => break,
            }

            let before_dot = self.pos;
            self.skip_whitespace();
            if self.check_token(&Token::Period) {
                self.advance();
                self.skip_whitespace();
            } else {
                self.pos = before_dot;
                break;
            }
        }

        if parts.is_empty() {
            None
        } else {
            Some(join_qualified(&parts))
        }
    }
}

/// Byte offset of a 1-based `(line, column)` tokenizer location
fn byte_offset(sql: &str, line: u64, column: u64) -> Option<usize> {
    let line_start = match line {
        0 | 1 => 0,
        n => sql.match_indices('\n').nth(usize::try_from(n - 2).ok()?)?.0 + 1,
    };
    let column = usize::try_from(column.saturating_sub(1)).ok()?;
    let rest = &sql[line_start..];
    match rest.char_indices().nth(column) {
        Some((i, _)) => Some(line_start + i),
        None => Some(sql.len()),
    }
}
