use lex::{Lexer, Token};

use crate::{Macro, Preprocessor, Result};

impl Preprocessor {
    /// Register the standard predefined macros. `__LINE__` and `__FILE__`
    /// are stored as placeholders and resolved per lookup from the current
    /// source location.
    pub fn register_builtins(&mut self) -> Result<()> {
        self.define(Macro::object("__STDC_VERSION__", builtin_body("199409L")))?;
        self.define(Macro::object("__STDC__", builtin_body("1")))?;
        self.define(Macro::object("__STDC_HOSTED__", builtin_body("1")))?;
        self.define(Macro::object("__LINE__", builtin_body("0")))?;
        self.define(Macro::object("__FILE__", vec![Token::str_lit("")]))?;
        self.define(Macro::object("__x86_64__", builtin_body("1")))?;
        // Not properly handled by musl headers; expands to nothing
        self.define(Macro::object("__inline", builtin_body(" ")))?;
        self.define(Macro::function(
            "__builtin_va_end",
            1,
            builtin_body(
                "@[0].gp_offset=0;\
                 @[0].fp_offset=0;\
                 @[0].overflow_arg_area=(void*)0;\
                 @[0].reg_save_area=(void*)0;",
            ),
        ))?;
        Ok(())
    }
}

// Replacement lists for built-ins come from a tiny textual grammar in which
// '@' stands for the parameter with index 0 and everything else is lexed
// verbatim.
fn builtin_body(text: &str) -> Vec<Token> {
    let mut toks = Vec::new();
    for (n, part) in text.split('@').enumerate() {
        if n > 0 {
            toks.push(Token::param(0));
        }
        let mut lx = Lexer::new(part);
        while let Some(t) = lx.next_token() {
            toks.push(t);
        }
    }
    toks
}
