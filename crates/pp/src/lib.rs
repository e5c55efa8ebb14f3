use std::collections::HashMap;

use lex::{tokenize_line, Punct, Token, TokenKind};

mod builtins;
mod error;
mod expand;

pub use error::PpError;
pub use expand::{paste, render, stringify};

pub type Result<T> = std::result::Result<T, PpError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroKind {
    Object,
    Function { params: usize },
}

/// A stored macro definition. Parameter occurrences in the replacement list
/// are pre-lowered to `Param` placeholder tokens holding the zero-based
/// parameter index.
#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    pub name: String,
    pub kind: MacroKind,
    pub replacement: Vec<Token>,
}

impl Macro {
    pub fn object(name: &str, replacement: Vec<Token>) -> Self {
        Self {
            name: name.to_string(),
            kind: MacroKind::Object,
            replacement,
        }
    }

    pub fn function(name: &str, params: usize, replacement: Vec<Token>) -> Self {
        Self {
            name: name.to_string(),
            kind: MacroKind::Function { params },
            replacement,
        }
    }

    pub fn params(&self) -> usize {
        match self.kind {
            MacroKind::Object => 0,
            MacroKind::Function { params } => params,
        }
    }
}

/// Macro engine state: the definition table, the stack of macros currently
/// being expanded, and the source location reported by `__LINE__` and
/// `__FILE__`.
pub struct Preprocessor {
    macros: HashMap<String, Macro>,
    expanding: Vec<String>,
    file: String,
    line: u32,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor {
    pub fn new() -> Self {
        Self {
            macros: HashMap::new(),
            expanding: Vec::new(),
            file: "<stdin>".to_string(),
            line: 0,
        }
    }

    pub fn set_file(&mut self, file: &str) {
        self.file = file.to_string();
    }

    pub fn current_line(&self) -> u32 {
        self.line
    }

    /// The macro bound to an identifier, if any.
    pub fn definition(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    // Lookup for expansion. __LINE__ and __FILE__ depend on the caller's
    // location, so a fresh single-token replacement is synthesized instead
    // of mutating the stored one.
    pub(crate) fn lookup(&self, name: &str) -> Option<Macro> {
        let def = self.macros.get(name)?;
        match name {
            "__LINE__" => Some(Macro::object(name, vec![Token::int(u64::from(self.line))])),
            "__FILE__" => Some(Macro::object(name, vec![Token::str_lit(&self.file)])),
            _ => Some(def.clone()),
        }
    }

    /// Insert a definition. Redefining a name is allowed only when the new
    /// macro is token-for-token identical to the stored one; the duplicate
    /// is then dropped and the table is left untouched.
    pub fn define(&mut self, def: Macro) -> Result<()> {
        debug_assert!(def.replacement.iter().all(|t| match t.kind {
            TokenKind::Param(i) => i < def.params(),
            _ => true,
        }));
        match self.macros.get(&def.name) {
            Some(existing) if *existing != def => Err(PpError::Redefinition(def.name.clone())),
            Some(_) => Ok(()),
            None => {
                self.macros.insert(def.name.clone(), def);
                Ok(())
            }
        }
    }

    /// Remove a binding; silently succeeds if the name is not defined.
    pub fn undef(&mut self, name: &str) {
        let _ = self.macros.remove(name);
    }

    pub fn is_expanding(&self, name: &str) -> bool {
        self.expanding.iter().any(|n| n == name)
    }

    /// Run the directive and expansion passes over a whole source text and
    /// produce the preprocessed output.
    pub fn process_source(&mut self, src: &str) -> Result<String> {
        let mut out = String::new();
        for (lineno, text) in logical_lines(src) {
            self.line = lineno;
            let toks = tokenize_line(&text);
            if toks.first().is_some_and(|t| t.is_punct(Punct::Hash)) {
                self.directive(&toks[1..])?;
                continue;
            }
            let expanded = self.expand(toks)?;
            out.push_str(&render(&expanded));
            out.push('\n');
        }
        Ok(out)
    }

    // Directive dispatch. Only #define and #undef drive the macro table;
    // anything else passes without effect.
    fn directive(&mut self, toks: &[Token]) -> Result<()> {
        let Some((head, rest)) = toks.split_first() else {
            return Ok(());
        };
        match head.ident_text() {
            Some("define") => {
                let def = parse_define(rest)?;
                self.define(def)
            }
            Some("undef") => match rest.first().and_then(|t| t.ident_text()) {
                Some(name) => {
                    self.undef(name);
                    Ok(())
                }
                None => Err(PpError::BadDirective("undef")),
            },
            _ => Ok(()),
        }
    }
}

/// Parse the tokens following `#define` into a macro record. A `(` directly
/// after the name, with no intervening whitespace, starts a parameter list.
fn parse_define(toks: &[Token]) -> Result<Macro> {
    let Some((name_tok, rest)) = toks.split_first() else {
        return Err(PpError::BadDirective("define"));
    };
    let Some(name) = name_tok.ident_text() else {
        return Err(PpError::BadDirective("define"));
    };

    if let Some(open) = rest.first() {
        if open.is_punct(Punct::LParen) && open.leading_ws == 0 {
            let (params, body) = parse_params(&rest[1..])?;
            let replacement = lower_params(body, &params);
            reject_edge_paste(&replacement)?;
            return Ok(Macro::function(name, params.len(), replacement));
        }
    }
    let replacement = rest.to_vec();
    reject_edge_paste(&replacement)?;
    Ok(Macro::object(name, replacement))
}

fn parse_params(toks: &[Token]) -> Result<(Vec<String>, &[Token])> {
    let mut params = Vec::new();
    let mut i = 0;
    if toks.get(i).is_some_and(|t| t.is_punct(Punct::RParen)) {
        return Ok((params, &toks[i + 1..]));
    }
    loop {
        match toks.get(i) {
            Some(t) => match t.ident_text() {
                Some(name) => {
                    params.push(name.to_string());
                    i += 1;
                }
                None => return Err(PpError::BadDirective("define")),
            },
            None => return Err(PpError::UnexpectedEnd),
        }
        match toks.get(i) {
            Some(t) if t.is_punct(Punct::Comma) => i += 1,
            Some(t) if t.is_punct(Punct::RParen) => {
                i += 1;
                break;
            }
            Some(t) => {
                return Err(PpError::Expected {
                    expected: ")",
                    found: t.spelling(),
                })
            }
            None => return Err(PpError::UnexpectedEnd),
        }
    }
    Ok((params, &toks[i..]))
}

fn lower_params(body: &[Token], params: &[String]) -> Vec<Token> {
    body.iter()
        .map(|tok| match tok.ident_text().and_then(|n| params.iter().position(|p| p == n)) {
            Some(index) => Token::new(TokenKind::Param(index), tok.leading_ws),
            None => tok.clone(),
        })
        .collect()
}

// A paste operator cannot sit at either end of a replacement list.
fn reject_edge_paste(body: &[Token]) -> Result<()> {
    if body.first().is_some_and(|t| t.is_punct(Punct::HashHash)) {
        return Err(PpError::PasteAtStart);
    }
    if body.last().is_some_and(|t| t.is_punct(Punct::HashHash)) {
        return Err(PpError::PasteAtEnd);
    }
    Ok(())
}

// Assemble logical lines, splicing backslash-newline continuations. Each
// entry carries the 1-based number of its first physical line, which is
// what __LINE__ reports.
fn logical_lines(src: &str) -> Vec<(u32, String)> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut start = 1u32;
    let mut lineno = 0u32;
    for line in src.lines() {
        lineno += 1;
        let line = line.strip_suffix('\r').unwrap_or(line);
        if buf.is_empty() {
            start = lineno;
        }
        if let Some(stripped) = line.strip_suffix('\\') {
            buf.push_str(stripped);
            continue;
        }
        buf.push_str(line);
        out.push((start, std::mem::take(&mut buf)));
    }
    if !buf.is_empty() {
        out.push((start, buf));
    }
    out
}
