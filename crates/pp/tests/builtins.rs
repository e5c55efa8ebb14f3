use pp::Preprocessor;

fn squash(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[test]
fn standard_macros_have_their_values() {
    let mut pp = Preprocessor::new();
    pp.register_builtins().unwrap();
    let out = pp
        .process_source("__STDC__ __STDC_HOSTED__ __STDC_VERSION__ __x86_64__\n")
        .unwrap();
    assert_eq!(out, "1 1 199409L 1\n");
}

#[test]
fn line_and_file_track_the_source_position() {
    let mut pp = Preprocessor::new();
    pp.set_file("x.c");
    pp.register_builtins().unwrap();
    let src = "\n\n\n\n\n\n\n\n\n__LINE__ __FILE__\n";
    let out = pp.process_source(src).unwrap();
    assert!(out.contains("10 \"x.c\""), "got:\n{}", out);
}

#[test]
fn line_follows_spliced_lines() {
    let mut pp = Preprocessor::new();
    pp.register_builtins().unwrap();
    let out = pp.process_source("int a;\nint \\\nb;\n__LINE__\n").unwrap();
    // the spliced line spans physical lines 2 and 3; the next starts at 4
    assert!(out.contains('4'), "got:\n{}", out);
}

#[test]
fn inline_vanishes() {
    let mut pp = Preprocessor::new();
    pp.register_builtins().unwrap();
    let out = pp.process_source("static __inline int f(void);\n").unwrap();
    assert_eq!(squash(&out), "staticintf(void);");
}

#[test]
fn va_end_resets_every_va_list_field() {
    let mut pp = Preprocessor::new();
    pp.register_builtins().unwrap();
    let out = pp.process_source("__builtin_va_end(ap);\n").unwrap();
    let s = squash(&out);
    assert!(s.contains("ap[0].gp_offset=0;"), "got:\n{}", out);
    assert!(s.contains("ap[0].fp_offset=0;"), "got:\n{}", out);
    assert!(s.contains("ap[0].overflow_arg_area=(void*)0;"), "got:\n{}", out);
    assert!(s.contains("ap[0].reg_save_area=(void*)0;"), "got:\n{}", out);
}

#[test]
fn builtins_can_be_undefined() {
    let mut pp = Preprocessor::new();
    pp.register_builtins().unwrap();
    let out = pp.process_source("#undef __x86_64__\n__x86_64__\n").unwrap();
    assert_eq!(out, "__x86_64__\n");
}

#[test]
fn conflicting_builtin_redefinition_fails() {
    let mut pp = Preprocessor::new();
    pp.register_builtins().unwrap();
    let err = pp.process_source("#define __STDC__ 0\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Redefinition of macro '__STDC__' with different substitution."
    );
}
