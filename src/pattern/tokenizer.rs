//! C3 — Tokenizer for the pattern language.
//!
//! Deterministic, single-pass, O(n). `...` is lexed as one [`TokenKind::Ellipsis`]
//! token, never three dots; a lone `$` is its own token (load-bearing for
//! capture parsing: `$name` is two tokens, `$` then `name`); quoted strings
//! preserve their inner text verbatim with no escape processing.

use crate::error::{Error, Result};
use crate::pattern::token::{Token, TokenKind};

pub fn tokenize(pattern: &str) -> Result<Vec<Token>> {
    let mut out = Vec::new();
    let bytes = pattern.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;

        if c.is_ascii_alphanumeric() || c == '_' {
            i += 1;
            while i < bytes.len() {
                let cc = bytes[i] as char;
                if cc.is_ascii_alphanumeric() || cc == '_' {
                    i += 1;
                } else {
                    break;
                }
            }
            let text = &pattern[start..i];
            let kind = if text == "_" {
                TokenKind::Underscore
            } else {
                TokenKind::Ident(text.to_string())
            };
            out.push(Token::new(kind, start, i));
            continue;
        }

        match c {
            '(' => {
                out.push(Token::new(TokenKind::LParen, start, start + 1));
                i += 1;
            }
            ')' => {
                out.push(Token::new(TokenKind::RParen, start, start + 1));
                i += 1;
            }
            '{' => {
                out.push(Token::new(TokenKind::LBrace, start, start + 1));
                i += 1;
            }
            '}' => {
                out.push(Token::new(TokenKind::RBrace, start, start + 1));
                i += 1;
            }
            '[' => {
                out.push(Token::new(TokenKind::LBrack, start, start + 1));
                i += 1;
            }
            ']' => {
                out.push(Token::new(TokenKind::RBrack, start, start + 1));
                i += 1;
            }
            '^' => {
                out.push(Token::new(TokenKind::Caret, start, start + 1));
                i += 1;
            }
            '!' => {
                out.push(Token::new(TokenKind::Bang, start, start + 1));
                i += 1;
            }
            '?' => {
                out.push(Token::new(TokenKind::QMark, start, start + 1));
                i += 1;
            }
            '$' => {
                out.push(Token::new(TokenKind::Dollar, start, start + 1));
                i += 1;
            }
            '.' => {
                if bytes.get(i + 1) == Some(&b'.') && bytes.get(i + 2) == Some(&b'.') {
                    i += 3;
                    out.push(Token::new(TokenKind::Ellipsis, start, i));
                } else {
                    return Err(Error::bad_character(start, '.'));
                }
            }
            '"' | '\'' => {
                let quote = c;
                i += 1;
                let text_start = i;
                while i < bytes.len() && bytes[i] as char != quote {
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(Error::unbalanced_delimiter(start, quote));
                }
                let text = pattern[text_start..i].to_string();
                i += 1; // closing quote
                let kind = if quote == '"' {
                    TokenKind::DqString(text)
                } else {
                    TokenKind::SqString(text)
                };
                out.push(Token::new(kind, start, i));
            }
            other => return Err(Error::bad_character(start, other)),
        }
    }

    Ok(out)
}
