//! trybuild compile-time tests for qualifier_macros

#[test]
fn trybuild_qualifier_macros() {
    let t = trybuild::TestCases::new();
    t.pass("tests/trybuild/qualifier_ok.rs");
    t.pass("tests/trybuild/unit_qualifier_ok.rs");
}
