use lex::{Lexer, Punct, Token, TokenKind};

use crate::{Macro, MacroKind, PpError, Preprocessor, Result};

impl Preprocessor {
    /// Expand every macro invocation reachable in `input` without violating
    /// the recursion guard. Consumes the input sequence; when nothing needs
    /// expanding the same sequence is handed back untouched.
    pub fn expand(&mut self, input: Vec<Token>) -> Result<Vec<Token>> {
        if !self.needs_expansion(&input) {
            return Ok(input);
        }

        let mut out: Vec<Token> = Vec::with_capacity(input.len());
        let mut i = 0;
        while i < input.len() {
            match self.invocable(&input, i) {
                Some(def) => {
                    let leading_ws = input[i].leading_ws;
                    let mut pos = i + 1;
                    let args = read_args(&input, &mut pos, &def)?;
                    let mut expn = self.expand_macro(&def, args)?;
                    // The expansion inherits the invocation site's spacing
                    if let Some(first) = expn.first_mut() {
                        first.leading_ws = leading_ws;
                    }
                    out.append(&mut expn);
                    i = pos;
                }
                None => {
                    out.push(input[i].clone());
                    i += 1;
                }
            }
        }
        Ok(out)
    }

    fn needs_expansion(&self, toks: &[Token]) -> bool {
        toks.iter().any(|t| match t.ident_text() {
            Some(name) => !self.is_expanding(name) && self.definition(name).is_some(),
            None => false,
        })
    }

    // A definition that may expand at position i: bound, off the expansion
    // stack, and for function-like macros immediately followed by '('.
    fn invocable(&self, toks: &[Token], i: usize) -> Option<Macro> {
        let name = toks[i].ident_text()?;
        if self.is_expanding(name) {
            return None;
        }
        let def = self.lookup(name)?;
        if matches!(def.kind, MacroKind::Function { .. })
            && !toks.get(i + 1).is_some_and(|t| t.is_punct(Punct::LParen))
        {
            return None;
        }
        Some(def)
    }

    fn expand_macro(&mut self, def: &Macro, args: Vec<Vec<Token>>) -> Result<Vec<Token>> {
        debug_assert!(!self.is_expanding(&def.name));
        self.expanding.push(def.name.clone());
        let res = self.substitute(def, &args);
        let popped = self.expanding.pop();
        debug_assert!(popped.is_some());
        res
    }

    // Replacement-list walk: parameters are replaced by the expansion of a
    // copy of the argument (the raw argument stays available for '#' and
    // '##' sites), '#' before a parameter stringifies the raw argument, and
    // everything else is copied through. Paste operators are folded before
    // the whole result is rescanned with this macro still on the stack.
    fn substitute(&mut self, def: &Macro, args: &[Vec<Token>]) -> Result<Vec<Token>> {
        let body = &def.replacement;
        let mut res: Vec<Token> = Vec::with_capacity(body.len());
        let mut i = 0;
        while i < body.len() {
            let tok = &body[i];
            match &tok.kind {
                TokenKind::Param(k) => {
                    let expanded = self.expand(args[*k].clone())?;
                    res.extend(expanded);
                    i += 1;
                }
                TokenKind::Punct(Punct::Hash) => {
                    if let Some(TokenKind::Param(k)) = body.get(i + 1).map(|t| &t.kind) {
                        res.push(stringify(&args[*k]));
                        i += 2;
                    } else {
                        res.push(tok.clone());
                        i += 1;
                    }
                }
                _ => {
                    res.push(tok.clone());
                    i += 1;
                }
            }
        }
        let res = expand_paste_operators(res)?;
        self.expand(res)
    }
}

fn skip(toks: &[Token], pos: &mut usize, p: Punct) -> Result<()> {
    match toks.get(*pos) {
        Some(t) if t.is_punct(p) => {
            *pos += 1;
            Ok(())
        }
        Some(t) => Err(PpError::Expected {
            expected: p.as_str(),
            found: t.spelling(),
        }),
        None => Err(PpError::UnexpectedEnd),
    }
}

// Read the argument list of a function-like invocation. `pos` starts just
// past the macro name and ends just past the closing parenthesis. Object
// -like macros read nothing.
fn read_args(toks: &[Token], pos: &mut usize, def: &Macro) -> Result<Vec<Vec<Token>>> {
    let params = match def.kind {
        MacroKind::Object => return Ok(Vec::new()),
        MacroKind::Function { params } => params,
    };
    skip(toks, pos, Punct::LParen)?;
    let mut args = Vec::with_capacity(params);
    for n in 0..params {
        args.push(read_arg(toks, pos)?);
        if n + 1 < params {
            skip(toks, pos, Punct::Comma)?;
        }
    }
    skip(toks, pos, Punct::RParen)?;
    Ok(args)
}

// One argument: at least one token, ending before a ',' or ')' at nesting
// depth zero. Nesting allows things like MAX(foo(a), b).
fn read_arg(toks: &[Token], pos: &mut usize) -> Result<Vec<Token>> {
    let mut arg = Vec::new();
    let mut nesting = 0i32;
    loop {
        let tok = toks.get(*pos).ok_or(PpError::UnexpectedEnd)?;
        if tok.is_punct(Punct::LParen) {
            nesting += 1;
        } else if tok.is_punct(Punct::RParen) {
            nesting -= 1;
            if nesting < 0 {
                return Err(PpError::NegativeNesting);
            }
        }
        arg.push(tok.clone());
        *pos += 1;
        if nesting == 0 {
            match toks.get(*pos) {
                Some(t) if t.is_punct(Punct::Comma) || t.is_punct(Punct::RParen) => break,
                Some(_) => {}
                None => return Err(PpError::UnexpectedEnd),
            }
        }
    }
    Ok(arg)
}

/// Fold token paste operators left to right, in place:
/// `['foo', '##', '_f', '##', 'unc']` becomes `['foo_func']`.
pub(crate) fn expand_paste_operators(list: Vec<Token>) -> Result<Vec<Token>> {
    if !list.iter().any(|t| t.is_punct(Punct::HashHash)) {
        return Ok(list);
    }
    let mut it = list.into_iter();
    let first = match it.next() {
        Some(t) => t,
        None => return Ok(Vec::new()),
    };
    if first.is_punct(Punct::HashHash) {
        return Err(PpError::PasteAtStart);
    }
    let mut out = vec![first];
    while let Some(tok) = it.next() {
        if tok.is_punct(Punct::HashHash) {
            let right = it.next().ok_or(PpError::PasteAtEnd)?;
            let left = out.pop().ok_or(PpError::PasteAtStart)?;
            out.push(paste(&left, &right)?);
        } else {
            out.push(tok);
        }
    }
    Ok(out)
}

/// Paste two tokens: concatenate their spellings and re-lex, requiring the
/// result to be a single token covering every byte. The pasted token keeps
/// the left operand's leading whitespace.
pub fn paste(left: &Token, right: &Token) -> Result<Token> {
    let text = format!("{}{}", left.spelling(), right.spelling());
    let mut lx = Lexer::new(&text);
    match lx.next_token() {
        Some(mut tok) if lx.offset() == text.len() => {
            tok.leading_ws = left.leading_ws;
            Ok(tok)
        }
        _ => Err(PpError::InvalidPaste {
            left: left.spelling(),
            right: right.spelling(),
        }),
    }
}

/// Stringify an argument sequence into a single string literal token. Any
/// run of interior whitespace folds to one space; leading and trailing
/// whitespace is dropped.
pub fn stringify(list: &[Token]) -> Token {
    let mut text = String::new();
    for (n, tok) in list.iter().enumerate() {
        if n > 0 && tok.leading_ws > 0 {
            text.push(' ');
        }
        text.push_str(&tok.spelling());
    }
    Token::str_lit(&text)
}

/// Render a token sequence back to source text, reproducing each token's
/// recorded leading whitespace.
pub fn render(list: &[Token]) -> String {
    let mut out = String::new();
    for tok in list {
        out.push_str(&" ".repeat(tok.leading_ws));
        out.push_str(&tok.spelling());
    }
    out
}
