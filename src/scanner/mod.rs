//! Lexical analysis for Lox source code.
//!
//! Scanning takes in raw characters and groups them into tokens: single
//! characters `(`, `,`, numbers `123`, string literals `"hi!"`, identifiers
//! `min`. Whitespace and `//` comments are skipped, and because the scanner
//! already walks every character of a literal it also converts the text into
//! the value the compiler will embed into the constant pool.
//!
//! The scanner is a pull machine: nothing is tokenized ahead of time, each
//! call to [`Scanner::scan_token`] classifies exactly one lexeme. The
//! compiler never looks more than one token ahead, so no token buffer is
//! needed and token lexemes can borrow from the source buffer for the whole
//! compilation.
mod token;

use std::{iter::Peekable, str::CharIndices};

use TokenType::*;
pub(crate) use token::*;

use crate::error::scanner::{ScanError, ScanErrorType};

/// A scanner for Lox source code
pub(crate) struct Scanner<'a> {
	/// User input source code
	source:      &'a str,
	/// User input source code iterator
	source_iter: Peekable<CharIndices<'a>>,
	/// Points at the beginning of the current lexeme
	start:       usize,
	/// Points at the character currently being considered
	cursor:      usize,
	/// Tracks what source line the cursor is on so we can produce tokens that
	/// know their location.
	line:        usize,
}

impl<'a> Scanner<'a> {
	pub fn new(source: &'a str) -> Self {
		let source_iter = source.char_indices().peekable();

		Self { source, source_iter, start: 0, cursor: 0, line: 1 }
	}

	/// Scan the next token, skipping leading whitespace and comments. Once the
	/// source is exhausted every further call returns an `Eof` token.
	pub fn scan_token(&mut self) -> Result<Token<'a>, ScanError> {
		loop {
			let Some(&(index, next_char)) = self.source_iter.peek() else {
				return Ok(Token::new(Eof, "", self.line));
			};
			self.start = index;
			self.cursor = index;
			self.advance();

			#[rustfmt::skip]
			let r#type = match next_char {
				'(' => LeftParen,
				')' => RightParen,
				'{' => LeftBrace,
				'}' => RightBrace,
				',' => Comma,
				'.' => Dot,
				'-' => Minus,
				'+' => Plus,
				';' => Semicolon,
				'*' => Star,
				'!' => if self.match_next('=') { BangEqual } else { Bang },
				'=' => if self.match_next('=') { EqualEqual } else { Equal },
				'<' => if self.match_next('=') { LessEqual } else { Less },
				'>' => if self.match_next('=') { GreaterEqual } else { Greater },
				'/' => if self.match_next('/') {
					// A comment goes until the end of the line.
					while self.peek().is_some_and(|c| c != '\n') { self.advance(); }
					continue;
				} else { Slash },
				' ' | '\r' | '\t' => continue,
				'\n' => { self.line += 1; continue }
				'"' => self.string()?,
				c if c.is_ascii_digit() => self.number()?,
				c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
				_ => return Err(ScanError::new(self.line, ScanErrorType::UnexpectedCharacter)),
			};

			let lexeme = &self.source[self.start..self.cursor];
			return Ok(Token::new(r#type, lexeme, self.line));
		}
	}

	/// Consume the next character if it is the expected one
	fn match_next(&mut self, expected: char) -> bool {
		matches!(self.peek(), Some(c) if c == expected && { self.advance(); true })
	}

	/// Advance to the next character
	fn advance(&mut self) {
		if let Some((i, c)) = self.source_iter.next() {
			self.cursor = i + c.len_utf8();
		}
	}

	/// Peek the current character
	fn peek(&mut self) -> Option<char> { self.source_iter.peek().map(|&(_, c)| c) }

	/// Peek the second character ahead
	fn peek_second(&mut self) -> Option<char> {
		let mut it = self.source_iter.clone();
		it.next()?;
		it.peek().map(|&(_, c)| c)
	}

	/// Scan a string literal. No escape sequences: the payload is the raw
	/// bytes between the quotes, newlines included.
	fn string(&mut self) -> Result<TokenType<'a>, ScanError> {
		while let Some(c) = self.peek() {
			if c == '"' {
				break;
			}
			if c == '\n' {
				self.line += 1;
			}
			self.advance();
		}

		if self.peek().is_none() {
			return Err(ScanError::new(self.line, ScanErrorType::UnterminatedString));
		}
		self.advance(); // The closing "
		let value = &self.source[self.start + 1..self.cursor - 1];
		Ok(StringLiteral(value))
	}

	/// Scan a number literal: digits, optionally a `.` followed by more
	/// digits. No leading sign, no exponent, no leading or trailing dot.
	fn number(&mut self) -> Result<TokenType<'a>, ScanError> {
		while self.peek().is_some_and(|c| c.is_ascii_digit()) {
			self.advance();
		}

		// Look for a fractional part.
		if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
			self.advance(); // consume '.'
			while self.peek().is_some_and(|c| c.is_ascii_digit()) {
				self.advance();
			}
		}

		let s = &self.source[self.start..self.cursor];
		let value = s.parse().map_err(|_| ScanError::new(self.line, ScanErrorType::InvalidNumber))?;
		Ok(NumberLiteral(value))
	}

	/// Scan an identifier or keyword
	fn identifier(&mut self) -> TokenType<'a> {
		while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
			self.advance();
		}
		let text = &self.source[self.start..self.cursor];
		TokenType::keyword_or_identifier(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scan(input: &str) -> Result<Vec<Token<'_>>, ScanError> {
		let mut scanner = Scanner::new(input);
		let mut tokens = Vec::new();
		loop {
			let token = scanner.scan_token()?;
			let done = token.r#type == Eof;
			tokens.push(token);
			if done {
				return Ok(tokens);
			}
		}
	}

	fn expect(input: &str, ok: bool) { assert_eq!(scan(input).is_ok(), ok, "scanning {input:?}"); }

	#[test]
	fn scan_tokens() {
		expect("", true);
		expect("(", true);
		expect("(){}", true);
		expect(" ( ) ", true);
		expect("@", false);
		expect("你好", false);
		expect("12345", true);
		expect("// comment only", true);
		expect("user", true);
		expect("return", true);
	}

	#[test]
	fn scan_operators() {
		for op in ["!", "!=", "=", "==", "<", "<=", ">", ">=", "-", "+", "*", "/", ";", ",", "."] {
			expect(op, true);
		}
	}

	#[test]
	fn scan_numbers() {
		expect("0", true);
		expect("42", true);
		expect("3.14", true);
		expect("0.5", true);
		expect("123.456", true);
		// A trailing or leading dot is scanned as a separate Dot token.
		expect("1.", true);
		expect(".5", true);

		let tokens = scan("1.").unwrap();
		assert_eq!(tokens[0].r#type, NumberLiteral(1.0));
		assert_eq!(tokens[1].r#type, Dot);
	}

	#[test]
	fn scan_strings() {
		expect(r#""""#, true);
		expect(r#""hello""#, true);
		expect(r#""hello world""#, true);
		expect(r#""unterminated string"#, false);

		// No escape processing: backslashes pass through verbatim.
		let tokens = scan(r#""a\nb""#).unwrap();
		assert_eq!(tokens[0].r#type, StringLiteral(r"a\nb"));
	}

	#[test]
	fn scan_keywords() {
		let keywords = [
			"and", "class", "else", "false", "for", "fun", "if", "nil", "or", "print", "return", "super",
			"this", "true", "var", "while",
		];
		for keyword in keywords {
			let tokens = scan(keyword).unwrap();
			assert!(!matches!(tokens[0].r#type, Identifier(_)), "{keyword} must scan as a keyword");
		}
	}

	#[test]
	fn scan_identifiers() {
		for ident in ["x", "_name", "myVariable123", "snake_case", "CamelCase", "and123"] {
			let tokens = scan(ident).unwrap();
			assert_eq!(tokens[0].r#type, Identifier(ident));
			assert_eq!(tokens[0].lexeme, ident);
		}
	}

	#[test]
	fn scan_comments_and_whitespace() {
		expect("// single line comment", true);
		expect("// comment with ()[]{}", true);
		expect("  \t\r\n  ", true);

		let tokens = scan("1 // trailing\n2").unwrap();
		assert_eq!(tokens.len(), 3);
		assert_eq!(tokens[1].r#type, NumberLiteral(2.0));
		assert_eq!(tokens[1].line, 2);
	}

	#[test]
	fn scan_multiple_tokens() {
		let tokens = scan("1 + 2").unwrap();
		assert_eq!(tokens.len(), 4);
		assert_eq!(tokens[0].r#type, NumberLiteral(1.0));
		assert_eq!(tokens[1].r#type, Plus);
		assert_eq!(tokens[2].r#type, NumberLiteral(2.0));
		assert_eq!(tokens[3].r#type, Eof);
	}

	#[test]
	fn scan_string_with_newlines() {
		let tokens = scan("\"hello\nworld\"").unwrap();
		assert_eq!(tokens[0].r#type, StringLiteral("hello\nworld"));
		// The token reports the line the literal ends on.
		assert_eq!(tokens[0].line, 2);
	}

	#[test]
	fn eof_is_sticky() {
		let mut scanner = Scanner::new("1");
		assert_eq!(scanner.scan_token().unwrap().r#type, NumberLiteral(1.0));
		assert_eq!(scanner.scan_token().unwrap().r#type, Eof);
		assert_eq!(scanner.scan_token().unwrap().r#type, Eof);
	}

	#[test]
	fn error_carries_line() {
		let mut scanner = Scanner::new("\n\n@");
		let error = loop {
			match scanner.scan_token() {
				Ok(_) => continue,
				Err(e) => break e,
			}
		};
		assert_eq!(error.line(), 3);
		assert_eq!(error.r#type(), ScanErrorType::UnexpectedCharacter);
	}
}
