use indoc::indoc;
use jsmorph_core::analysis::ImpurityQualities;
use jsmorph_core::{Error, PurityOptions, PurityVerdict, Session};
use jsmorph_syntax::Node;
use jsmorph_test_helpers::session;

fn assess(session: &Session, options: &PurityOptions) -> (PurityVerdict, ImpurityQualities) {
    let function = session
        .select("FunctionDeclaration")
        .expect("select failed")[0];
    let assessment = session
        .assess_purity(function, options)
        .expect("assessment failed");
    (assessment.verdict, assessment.qualities)
}

#[test]
fn test_pure_function() {
    let session = session("function add(a, b) { return a + b; }");
    let (verdict, qualities) = assess(&session, &PurityOptions::default());
    assert_eq!(verdict, PurityVerdict::Probably);
    assert!(qualities.is_empty());
}

#[test]
fn test_free_variable_read() {
    let session = session("function impure(a) { return a + outer; }");
    let (verdict, qualities) = assess(&session, &PurityOptions::default());
    assert_eq!(verdict, PurityVerdict::ProbablyNot);
    assert_eq!(qualities, ImpurityQualities::THROUGH_ACCESS);
}

#[test]
fn test_parameter_member_mutation() {
    let session = session("function test(a) { a.foo = b; }");
    let (verdict, qualities) = assess(&session, &PurityOptions::default());
    assert_eq!(verdict, PurityVerdict::ProbablyNot);
    assert!(qualities.contains(ImpurityQualities::PARAMETER_MEMBER_MUTATION));
}

#[test]
fn test_allow_list_absorbs_trusted_calls() {
    let session = session("function clamp(x) { return Math.max(0, Math.min(x, 1)); }");
    let (verdict, _) = assess(&session, &PurityOptions::default());
    assert_eq!(verdict, PurityVerdict::ProbablyNot);

    let options = PurityOptions::allow(["Math.max()", "Math.min()"]);
    let (verdict, qualities) = assess(&session, &options);
    assert_eq!(verdict, PurityVerdict::Probably);
    assert!(qualities.is_empty());
}

#[test]
fn test_invalid_allow_list_entry() {
    let session = session("function f() {}");
    let function = session.select_one("FunctionDeclaration").expect("one function");
    let err = session
        .assess_purity(function, &PurityOptions::allow(["var x = 1;"]))
        .expect_err("not a call");
    assert!(matches!(err, Error::InvalidAllowList { .. }));
}

#[test]
fn test_pure_candidates_in_document_order() {
    let session = session(indoc! {"
        function square(x) { return x * x; }
        function log(x) { console.log(x); }
        function sumOfSquares(a, b) {
            function sq(v) { return v * v; }
            return sq(a) + sq(b);
        }
        function poke(o) { o.touched = true; }
    "});
    let candidates = session
        .find_pure_function_candidates(&PurityOptions::default())
        .expect("search failed");
    let names: Vec<String> = candidates
        .keys()
        .map(|&function| match &session.ast()[function] {
            Node::FunctionDeclaration { name, .. } => {
                session.ast().identifier_name(*name).unwrap_or_default().to_string()
            }
            other => panic!("unexpected candidate {:?}", other.kind()),
        })
        .collect();
    assert_eq!(names, vec!["square", "sumOfSquares", "sq"]);
}
