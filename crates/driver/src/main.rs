use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use lex::Lexer;
use pp::{Macro, Preprocessor};

#[derive(Parser, Debug)]
#[command(
    name = "emberc",
    about = "Ember C compiler front end",
    long_about = "Ember C compiler front end: preprocessing and tokenization stages",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the preprocessor over a C source file and print the result
    Preprocess {
        /// Input C file
        input: PathBuf,
        /// Defines in the form NAME or NAME=VALUE
        #[arg(short = 'D', value_name = "NAME[=VALUE]")]
        define: Vec<String>,
        /// Undefine macro NAME
        #[arg(short = 'U', value_name = "NAME")]
        undef: Vec<String>,
        /// Skip registering the standard predefined macros
        #[arg(long)]
        no_builtins: bool,
    },
    /// Tokenize a source file and print one token per line
    Tokens {
        /// Input C file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Preprocess {
            input,
            define,
            undef,
            no_builtins,
        } => cmd_preprocess(&input, &define, &undef, no_builtins),
        Commands::Tokens { input } => cmd_tokens(&input),
    }
}

fn read_source(input: &Path) -> Result<String> {
    fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
}

fn cmd_preprocess(
    input: &Path,
    defines: &[String],
    undefs: &[String],
    no_builtins: bool,
) -> Result<()> {
    let src = read_source(input)?;
    let mut pp = Preprocessor::new();
    pp.set_file(&input.display().to_string());
    if !no_builtins {
        pp.register_builtins()?;
    }
    for d in defines {
        let (name, value) = match d.split_once('=') {
            Some((n, v)) => (n, v),
            None => (d.as_str(), "1"),
        };
        pp.define(Macro::object(name, lex::tokenize_line(value)))?;
    }
    for name in undefs {
        pp.undef(name);
    }
    let out = pp.process_source(&src)?;
    print!("{}", out);
    Ok(())
}

fn cmd_tokens(input: &Path) -> Result<()> {
    let src = read_source(input)?;
    let mut lx = Lexer::new(&src);
    while let Some(tok) = lx.next_token() {
        println!("{:?}", tok.kind);
    }
    Ok(())
}
