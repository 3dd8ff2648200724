//! Conservative function purity assessment.
//!
//! A function is *probably* pure when, judged by syntax and lexical scope
//! alone, it touches nothing outside itself: no free variables, no writes
//! through its parameters or `arguments`, and no calls to inner functions
//! that are themselves probably impure. Calls matching an allow-list
//! sample are trusted.
//!
//! Each function is analyzed in isolation: its scopes are built as if it
//! were the only statement of a script, so anything that resolves to an
//! implicit global is a through access.

use bitflags::bitflags;
use indexmap::IndexMap;
use jsmorph_syntax::{
    is_similar, parse_script_new, walk, Ast, Node, NodeId, VisitControl, Visitor,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::scope::{binding_identifiers, ScopeAnalyzer, ScopeIndex, VariableId};
use crate::session::Session;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImpurityQualities: u8 {
        /// Reads or writes a variable bound outside the function.
        const THROUGH_ACCESS = 0b0001;
        /// Assigns to a member of a parameter.
        const PARAMETER_MEMBER_MUTATION = 0b0010;
        /// Assigns to a member of `arguments`.
        const ARGUMENTS_MEMBER_MUTATION = 0b0100;
        /// Calls an inner function that is not probably pure.
        const CALLS_IMPURE_FUNCTIONS = 0b1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PurityVerdict {
    Probably,
    ProbablyNot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurityAssessment {
    pub node: NodeId,
    pub verdict: PurityVerdict,
    pub qualities: ImpurityQualities,
}

impl PurityAssessment {
    pub fn is_probably_pure(&self) -> bool {
        self.verdict == PurityVerdict::Probably
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurityOptions {
    /// Call shapes trusted to be pure, as source text such as
    /// `"Math.max()"`. A call matches when every field present in the
    /// sample matches; an empty argument list matches any arguments.
    pub allow_list: Vec<String>,
}

impl PurityOptions {
    pub fn allow<I, S>(calls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allow_list: calls.into_iter().map(Into::into).collect(),
        }
    }

    fn samples(&self) -> Result<Vec<Value>> {
        self.allow_list.iter().map(|entry| call_sample(entry)).collect()
    }
}

fn call_sample(entry: &str) -> Result<Value> {
    let (ast, script) = parse_script_new(entry)?;
    let call = ast[script]
        .statements()
        .and_then(|statements| statements.first())
        .and_then(|&first| match &ast[first] {
            Node::ExpressionStatement { expression } => Some(*expression),
            _ => None,
        })
        .filter(|&expression| matches!(ast[expression], Node::CallExpression { .. }));
    match call {
        Some(call) => Ok(ast.to_value(call)),
        None => Err(Error::InvalidAllowList {
            entry: entry.to_string(),
        }),
    }
}

/// Assesses the function-like node `function`.
pub fn assess_purity(ast: &Ast, function: NodeId, options: &PurityOptions) -> Result<PurityAssessment> {
    let samples = options.samples()?;
    Ok(Assessor::new(ast, function, &samples).run(ast))
}

/// Every function declaration under the session root that is probably
/// pure, in document order.
pub fn find_pure_function_candidates(
    session: &Session,
    options: &PurityOptions,
) -> Result<IndexMap<NodeId, PurityAssessment>> {
    let samples = options.samples()?;
    let ast = session.ast();
    let mut candidates = IndexMap::new();
    for function in session.select("FunctionDeclaration")? {
        let assessment = Assessor::new(ast, function, &samples).run(ast);
        if assessment.is_probably_pure() {
            candidates.insert(function, assessment);
        }
    }
    debug!(count = candidates.len(), "pure function candidates");
    Ok(candidates)
}

impl Session {
    pub fn assess_purity(&self, function: NodeId, options: &PurityOptions) -> Result<PurityAssessment> {
        assess_purity(self.ast(), function, options)
    }

    pub fn find_pure_function_candidates(
        &self,
        options: &PurityOptions,
    ) -> Result<IndexMap<NodeId, PurityAssessment>> {
        find_pure_function_candidates(self, options)
    }
}

struct Assessor<'s> {
    function: NodeId,
    samples: &'s [Value],
    index: ScopeIndex,
    through: Vec<VariableId>,
    params: Vec<VariableId>,
    /// Name binding of each function declaration nested directly in the
    /// assessed function (not inside another nested declaration).
    inner_functions: FxHashMap<NodeId, NodeId>,
    inner_verdicts: FxHashMap<VariableId, PurityVerdict>,
    qualities: ImpurityQualities,
}

impl<'s> Assessor<'s> {
    fn new(ast: &Ast, function: NodeId, samples: &'s [Value]) -> Self {
        let graph = ScopeAnalyzer::new(ast).analyze(function);
        let index = ScopeIndex::from_graph(graph, 0);

        let mut inner_functions = FxHashMap::default();
        let mut nested = FxHashSet::default();
        for id in jsmorph_syntax::traverse::descendants(ast, function) {
            if id == function || nested.contains(&id) {
                continue;
            }
            if let Node::FunctionDeclaration { name, .. } = &ast[id] {
                inner_functions.insert(*name, id);
                nested.extend(jsmorph_syntax::traverse::descendants(ast, id));
            }
        }

        // Free variables used only inside inner declarations are charged
        // to those declarations, not to this function.
        let global = index.global_scope();
        let through = index
            .variables()
            .filter(|&var| index.scope_of(var).ok() == Some(global))
            .filter(|&var| {
                index.variable(var).is_ok_and(|v| {
                    v.references.iter().any(|r| !nested.contains(&r.node))
                })
            })
            .collect();

        let params = match &ast[function] {
            Node::FunctionDeclaration { params, .. }
            | Node::FunctionExpression { params, .. }
            | Node::ArrowExpression { params, .. }
            | Node::Method { params, .. } => binding_identifiers(ast, *params)
                .into_iter()
                .filter_map(|ident| index.lookup_variable(ast, ident).ok())
                .collect(),
            _ => Vec::new(),
        };

        Self {
            function,
            samples,
            index,
            through,
            params,
            inner_functions,
            inner_verdicts: FxHashMap::default(),
            qualities: ImpurityQualities::empty(),
        }
    }

    fn run(mut self, ast: &Ast) -> PurityAssessment {
        walk(ast, self.function, &mut self);
        if !self.through.is_empty() {
            self.qualities |= ImpurityQualities::THROUGH_ACCESS;
        }
        let verdict = if self.qualities.is_empty() {
            PurityVerdict::Probably
        } else {
            PurityVerdict::ProbablyNot
        };
        trace!(node = ?self.function, ?verdict, qualities = ?self.qualities, "assessed function");
        PurityAssessment {
            node: self.function,
            verdict,
            qualities: self.qualities,
        }
    }

    fn lookup(&self, ast: &Ast, node: NodeId) -> Option<VariableId> {
        self.index.lookup_variable(ast, node).ok()
    }

    fn check_member_target(&mut self, ast: &Ast, object: NodeId) {
        let Some(root) = root_identifier(ast, object) else {
            return;
        };
        if let Some(var) = self.lookup(ast, root) {
            if self.params.contains(&var) {
                self.qualities |= ImpurityQualities::PARAMETER_MEMBER_MUTATION;
            }
        }
        if ast.identifier_name(root) == Some("arguments") {
            self.qualities |= ImpurityQualities::ARGUMENTS_MEMBER_MUTATION;
        }
    }

    fn check_call(&mut self, ast: &Ast, call: NodeId, callee: NodeId) {
        if !self.samples.is_empty() {
            let value = ast.to_value(call);
            if self.samples.iter().any(|sample| is_similar(sample, &value)) {
                if let Some(var) = root_identifier(ast, callee).and_then(|r| self.lookup(ast, r)) {
                    self.through.retain(|&v| v != var);
                }
                return;
            }
        }
        if !matches!(ast[callee], Node::IdentifierExpression { .. }) {
            return;
        }
        let Some(var) = self.lookup(ast, callee) else {
            return;
        };
        if self.inner_verdict(ast, var) == Some(PurityVerdict::ProbablyNot) {
            self.qualities |= ImpurityQualities::CALLS_IMPURE_FUNCTIONS;
        }
    }

    /// Verdict for an inner function declaration, assessed on first use.
    fn inner_verdict(&mut self, ast: &Ast, var: VariableId) -> Option<PurityVerdict> {
        if let Some(verdict) = self.inner_verdicts.get(&var) {
            return Some(*verdict);
        }
        let declaration = self
            .index
            .variable(var)
            .ok()?
            .declarations
            .iter()
            .find_map(|d| self.inner_functions.get(&d.node).copied())?;
        let verdict = Assessor::new(ast, declaration, self.samples).run(ast).verdict;
        self.inner_verdicts.insert(var, verdict);
        Some(verdict)
    }
}

impl Visitor for Assessor<'_> {
    fn enter(&mut self, ast: &Ast, id: NodeId, _parent: Option<NodeId>) -> VisitControl {
        if id == self.function {
            return VisitControl::Continue;
        }
        match &ast[id] {
            Node::FunctionDeclaration { .. } => return VisitControl::Skip,
            Node::StaticMemberAssignmentTarget { object, .. }
            | Node::ComputedMemberAssignmentTarget { object, .. } => {
                self.check_member_target(ast, *object);
            }
            Node::CallExpression { callee, .. } => self.check_call(ast, id, *callee),
            _ => {}
        }
        VisitControl::Continue
    }
}

/// The identifier at the bottom of a member chain, `a` in `a.b[c].d`.
fn root_identifier(ast: &Ast, mut id: NodeId) -> Option<NodeId> {
    loop {
        match &ast[id] {
            Node::IdentifierExpression { .. } => return Some(id),
            Node::StaticMemberExpression { object, .. }
            | Node::ComputedMemberExpression { object, .. } => id = *object,
            _ => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assess_src(source: &str, options: &PurityOptions) -> PurityAssessment {
        let session = Session::parse(source).unwrap();
        let function = session.select("FunctionDeclaration").unwrap()[0];
        session.assess_purity(function, options).unwrap()
    }

    fn assess(source: &str) -> PurityAssessment {
        assess_src(source, &PurityOptions::default())
    }

    #[test]
    fn test_pure_function() {
        let assessment = assess("function add(a, b) { return a + b; }");
        assert_eq!(assessment.verdict, PurityVerdict::Probably);
        assert!(assessment.qualities.is_empty());
    }

    #[test]
    fn test_through_access() {
        let assessment = assess("function impure(a) { return a + outer; }");
        assert_eq!(assessment.verdict, PurityVerdict::ProbablyNot);
        assert_eq!(assessment.qualities, ImpurityQualities::THROUGH_ACCESS);
    }

    #[test]
    fn test_parameter_member_mutation() {
        let assessment = assess("function test(a) { a.foo = 1; }");
        assert_eq!(assessment.qualities, ImpurityQualities::PARAMETER_MEMBER_MUTATION);
    }

    #[test]
    fn test_parameter_mutation_and_through_access() {
        let assessment = assess("function test(a) { a.foo = b; }");
        assert_eq!(
            assessment.qualities,
            ImpurityQualities::PARAMETER_MEMBER_MUTATION | ImpurityQualities::THROUGH_ACCESS
        );
    }

    #[test]
    fn test_arguments_member_mutation() {
        let assessment = assess("function test() { arguments[0].x = 1; }");
        assert_eq!(assessment.qualities, ImpurityQualities::ARGUMENTS_MEMBER_MUTATION);
    }

    #[test]
    fn test_recursion_is_not_through_access() {
        let assessment = assess("function fact(n) { return n < 2 ? 1 : n * fact(n - 1); }");
        assert!(assessment.is_probably_pure());
    }

    #[test]
    fn test_calls_impure_inner_function() {
        let assessment = assess("function outer() { inner(); function inner() { sideEffect(); } }");
        assert!(assessment.qualities.contains(ImpurityQualities::CALLS_IMPURE_FUNCTIONS));
        // `sideEffect` is free only inside `inner`.
        assert!(!assessment.qualities.contains(ImpurityQualities::THROUGH_ACCESS));
    }

    #[test]
    fn test_calls_pure_inner_function() {
        let assessment = assess("function outer(a) { function double(x) { return x * 2; } return double(a); }");
        assert!(assessment.is_probably_pure());
    }

    #[test]
    fn test_allow_list_absorbs_callee() {
        let options = PurityOptions::allow(["Math.max()"]);
        let assessment = assess_src("function m(a, b) { return Math.max(a, b); }", &options);
        assert!(assessment.is_probably_pure());

        let assessment = assess("function m(a, b) { return Math.max(a, b); }");
        assert_eq!(assessment.qualities, ImpurityQualities::THROUGH_ACCESS);
    }

    #[test]
    fn test_invalid_allow_list() {
        let options = PurityOptions::allow(["var a;"]);
        let session = Session::parse("function f() {}").unwrap();
        let function = session.select_one("FunctionDeclaration").unwrap();
        assert!(matches!(
            session.assess_purity(function, &options),
            Err(Error::InvalidAllowList { .. })
        ));
    }

    #[test]
    fn test_candidates_keep_pure_functions_in_order() {
        let session = Session::parse(indoc::indoc! {"
            function a(x) { return x; }
            function b() { return g; }
            function c() { return 1; }
        "})
        .unwrap();
        let candidates = session
            .find_pure_function_candidates(&PurityOptions::default())
            .unwrap();
        let names: Vec<&str> = candidates
            .keys()
            .map(|&f| match &session.ast()[f] {
                Node::FunctionDeclaration { name, .. } => session.ast().identifier_name(*name).unwrap(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(names, ["a", "c"]);
    }
}
