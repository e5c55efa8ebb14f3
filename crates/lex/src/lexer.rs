use crate::token::{IntType, Number, Punct, Token, TokenKind};

// Longest match first; order only matters between prefixes of each other.
const PUNCTS: &[(&str, Punct)] = &[
    ("...", Punct::Ellipsis),
    ("<<=", Punct::ShlAssign),
    (">>=", Punct::ShrAssign),
    ("##", Punct::HashHash),
    ("->", Punct::Arrow),
    ("++", Punct::Inc),
    ("--", Punct::Dec),
    ("<<", Punct::Shl),
    (">>", Punct::Shr),
    ("<=", Punct::Le),
    (">=", Punct::Ge),
    ("==", Punct::Eq),
    ("!=", Punct::Ne),
    ("&&", Punct::AndAnd),
    ("||", Punct::OrOr),
    ("+=", Punct::PlusAssign),
    ("-=", Punct::MinusAssign),
    ("*=", Punct::StarAssign),
    ("/=", Punct::SlashAssign),
    ("%=", Punct::PercentAssign),
    ("&=", Punct::AndAssign),
    ("|=", Punct::OrAssign),
    ("^=", Punct::XorAssign),
    ("#", Punct::Hash),
    ("(", Punct::LParen),
    (")", Punct::RParen),
    ("{", Punct::LBrace),
    ("}", Punct::RBrace),
    ("[", Punct::LBracket),
    ("]", Punct::RBracket),
    (";", Punct::Semicolon),
    (",", Punct::Comma),
    (".", Punct::Dot),
    ("+", Punct::Plus),
    ("-", Punct::Minus),
    ("*", Punct::Star),
    ("/", Punct::Slash),
    ("%", Punct::Percent),
    ("&", Punct::Amp),
    ("|", Punct::Pipe),
    ("^", Punct::Caret),
    ("~", Punct::Tilde),
    ("!", Punct::Bang),
    ("?", Punct::Question),
    (":", Punct::Colon),
    ("=", Punct::Assign),
    ("<", Punct::Lt),
    (">", Punct::Gt),
];

pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    len: usize,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            len: src.len(),
            pos: 0,
        }
    }

    /// Byte offset of the next unread character. The paster uses this to
    /// check that a re-lexed spelling was consumed in full.
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }
    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }
    fn starts_with(&self, s: &str) -> bool {
        self.bytes
            .get(self.pos..)
            .is_some_and(|rest| rest.starts_with(s.as_bytes()))
    }

    fn is_ident_start(c: u8) -> bool {
        (c == b'_') || (c as char).is_ascii_alphabetic()
    }
    fn is_ident_continue(c: u8) -> bool {
        (c == b'_') || (c as char).is_ascii_alphanumeric()
    }

    // Returns the number of whitespace characters consumed; a comment
    // counts as a single space.
    fn skip_ws_and_comments(&mut self) -> usize {
        let mut count = 0usize;
        loop {
            while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n' | 0x0C)) {
                self.pos += 1;
                count += 1;
            }
            if self.starts_with("//") {
                self.pos += 2;
                while let Some(c) = self.peek() {
                    if c == b'\n' {
                        break;
                    }
                    self.pos += 1;
                }
                count += 1;
                continue;
            }
            if self.starts_with("/*") {
                self.pos += 2;
                while self.pos < self.len && !self.starts_with("*/") {
                    self.pos += 1;
                }
                if self.starts_with("*/") {
                    self.pos += 2;
                }
                count += 1;
                continue;
            }
            break;
        }
        count
    }

    fn number(&mut self, leading_ws: usize) -> Token {
        let start = self.pos;
        let (radix, digits_start) = if self.starts_with("0x") || self.starts_with("0X") {
            self.pos += 2;
            (16, self.pos)
        } else if self.peek() == Some(b'0') {
            (8, self.pos)
        } else {
            (10, self.pos)
        };
        while let Some(c) = self.peek() {
            if (c as char).is_digit(radix) {
                self.pos += 1;
            } else {
                break;
            }
        }
        let value = u64::from_str_radix(&self.src[digits_start..self.pos], radix).unwrap_or(u64::MAX);

        let mut has_u = false;
        let mut has_l = false;
        while let Some(c) = self.peek() {
            match c {
                b'u' | b'U' if !has_u => {
                    has_u = true;
                    self.pos += 1;
                }
                b'l' | b'L' if !has_l => {
                    has_l = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let ty = match (has_u, has_l) {
            (true, true) => IntType::Ulong,
            (true, false) => IntType::Uint,
            (false, true) => IntType::Long,
            (false, false) => {
                if value > i32::MAX as u64 {
                    IntType::Long
                } else {
                    IntType::Int
                }
            }
        };
        Token::new(
            TokenKind::Number(Number {
                repr: self.src[start..self.pos].to_string(),
                value,
                ty,
            }),
            leading_ws,
        )
    }

    fn char_literal(&mut self, leading_ws: usize) -> Token {
        let start = self.pos;
        self.pos += 1; // opening quote
        let value = match self.bump() {
            Some(b'\\') => match self.bump() {
                Some(b'n') => 10,
                Some(b't') => 9,
                Some(b'r') => 13,
                Some(b'0') => 0,
                Some(c) => u64::from(c),
                None => 0,
            },
            Some(c) => u64::from(c),
            None => 0,
        };
        if self.peek() == Some(b'\'') {
            self.pos += 1;
        }
        // Char literals have type int in C
        Token::new(
            TokenKind::Number(Number {
                repr: self.src[start..self.pos].to_string(),
                value,
                ty: IntType::Int,
            }),
            leading_ws,
        )
    }

    pub fn next_token(&mut self) -> Option<Token> {
        let leading_ws = self.skip_ws_and_comments();
        let start = self.pos;
        let c = self.peek()?;

        // The preprocessor has no keywords; every word is an identifier
        if Self::is_ident_start(c) {
            self.bump();
            while let Some(c2) = self.peek() {
                if Self::is_ident_continue(c2) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            let name = self.src[start..self.pos].to_string();
            return Some(Token::new(TokenKind::Ident(name), leading_ws));
        }

        if (c as char).is_ascii_digit() {
            return Some(self.number(leading_ws));
        }

        if c == b'"' {
            self.bump();
            while let Some(ch) = self.bump() {
                match ch {
                    b'\\' => {
                        let _ = self.bump();
                    }
                    b'"' => break,
                    _ => {}
                }
            }
            let repr = self.src[start..self.pos].to_string();
            return Some(Token::new(TokenKind::Str(repr), leading_ws));
        }

        if c == b'\'' {
            return Some(self.char_literal(leading_ws));
        }

        for (spelling, p) in PUNCTS {
            if self.starts_with(spelling) {
                self.pos += spelling.len();
                return Some(Token::new(TokenKind::Punct(*p), leading_ws));
            }
        }

        // Unknown byte: pass it through as a one-character identifier
        let ch = self.bump()?;
        Some(Token::new(
            TokenKind::Ident((ch as char).to_string()),
            leading_ws,
        ))
    }
}

/// Tokenize a whole line (or any snippet) into an owned sequence.
pub fn tokenize_line(src: &str) -> Vec<Token> {
    let mut lx = Lexer::new(src);
    let mut toks = Vec::new();
    while let Some(t) = lx.next_token() {
        toks.push(t);
    }
    toks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize_line(src).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn leading_whitespace_is_counted() {
        let toks = tokenize_line("a  +b");
        assert_eq!(toks[0].leading_ws, 0);
        assert_eq!(toks[1].leading_ws, 2);
        assert_eq!(toks[2].leading_ws, 0);
    }

    #[test]
    fn comment_counts_as_one_space() {
        let toks = tokenize_line("a/* gap */b");
        assert_eq!(toks[1].leading_ws, 1);
    }

    #[test]
    fn hash_and_paste_are_distinct() {
        let toks = tokenize_line("# ## #");
        assert!(toks[0].is_punct(Punct::Hash));
        assert!(toks[1].is_punct(Punct::HashHash));
        assert!(toks[2].is_punct(Punct::Hash));
    }

    #[test]
    fn number_suffixes_select_types() {
        let cases = [
            ("1", IntType::Int),
            ("1u", IntType::Uint),
            ("199409L", IntType::Long),
            ("7ul", IntType::Ulong),
            ("3000000000", IntType::Long),
        ];
        for (src, want) in cases {
            match kinds(src).remove(0) {
                TokenKind::Number(n) => assert_eq!(n.ty, want, "{}", src),
                other => panic!("expected number for {}, got {:?}", src, other),
            }
        }
    }

    #[test]
    fn bases_parse_to_values() {
        for (src, want) in [("0x10", 16), ("010", 8), ("42", 42)] {
            match kinds(src).remove(0) {
                TokenKind::Number(n) => assert_eq!(n.value, want, "{}", src),
                other => panic!("expected number for {}, got {:?}", src, other),
            }
        }
    }

    #[test]
    fn string_repr_keeps_quotes() {
        match kinds(r#""hi there""#).remove(0) {
            TokenKind::Str(s) => assert_eq!(s, r#""hi there""#),
            other => panic!("expected string, got {:?}", other),
        }
    }

    #[test]
    fn char_literal_is_an_int() {
        match kinds("'a'").remove(0) {
            TokenKind::Number(n) => {
                assert_eq!(n.value, 97);
                assert_eq!(n.ty, IntType::Int);
            }
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn offset_tracks_consumption() {
        let mut lx = Lexer::new("foo_bar");
        let t = lx.next_token().unwrap();
        assert_eq!(t.spelling(), "foo_bar");
        assert_eq!(lx.offset(), 7);
    }
}
