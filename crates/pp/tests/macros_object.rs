use pp::Preprocessor;

fn squash(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[test]
fn define_object_basic() {
    let mut pp = Preprocessor::new();
    let src = "#define FOO 42\nint x = FOO;\n";
    let out = pp.process_source(src).unwrap();
    assert!(squash(&out).contains("intx=42;"), "output was:\n{}", out);
}

#[test]
fn expansion_inherits_site_spacing() {
    let mut pp = Preprocessor::new();
    let src = "#define X 42\nX + X\n";
    let out = pp.process_source(src).unwrap();
    assert_eq!(out, "42 + 42\n");
}

#[test]
fn undef_restores_identifier() {
    let mut pp = Preprocessor::new();
    let src = "#define FOO 1\n#undef FOO\nint z = FOO;\n";
    let out = pp.process_source(src).unwrap();
    assert!(squash(&out).contains("intz=FOO;"), "output was:\n{}", out);
}

#[test]
fn define_with_line_continuation() {
    let mut pp = Preprocessor::new();
    let src = "#define A 1 \\\n+ 2\nint r = A;\n";
    let out = pp.process_source(src).unwrap();
    assert!(squash(&out).contains("intr=1+2;"), "output was:\n{}", out);
}

#[test]
fn nested_object_definitions() {
    let mut pp = Preprocessor::new();
    let src = "#define A B\n#define B 7\nint r = A;\n";
    let out = pp.process_source(src).unwrap();
    assert!(squash(&out).contains("intr=7;"), "output was:\n{}", out);
}

#[test]
fn lines_without_macros_pass_through() {
    let mut pp = Preprocessor::new();
    let src = "#define FOO 1\nint  bar = 2;\n";
    let out = pp.process_source(src).unwrap();
    assert_eq!(out, "int  bar = 2;\n");
}

#[test]
fn unknown_directives_are_ignored() {
    let mut pp = Preprocessor::new();
    let src = "#pragma once\n#include <stdio.h>\nint x;\n";
    let out = pp.process_source(src).unwrap();
    assert_eq!(out, "int x;\n");
}

#[test]
fn redefinition_with_different_body_fails() {
    let mut pp = Preprocessor::new();
    let src = "#define N 1\n#define N 2\n";
    let err = pp.process_source(src).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Redefinition of macro 'N' with different substitution."
    );
}

#[test]
fn identical_redefinition_is_permitted() {
    let mut pp = Preprocessor::new();
    // same tokens, different spacing and number spelling
    let src = "#define N  0x10\n#define N 16\nint r = N;\n";
    let out = pp.process_source(src).unwrap();
    assert!(squash(&out).contains("intr=0x10;"), "output was:\n{}", out);
}
