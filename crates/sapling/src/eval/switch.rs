//! Switch expression evaluation

use super::control::{bubble, eval_block};
use super::{Evaluate, Evaluator};
use crate::ast::SwitchExpr;
use crate::context::EvalContext;
use crate::scope::Scope;
use crate::value::Value;

/// Whether a case value selects its case for `subject`.
///
/// A regex case matches a string subject by search; everything else
/// compares with strict equality, so `1` and `1.0` are different cases.
fn case_matches(subject: &Value, candidate: &Value) -> bool {
    match (subject, candidate) {
        (Value::Str(s), Value::Regex(re)) => re.is_match(s),
        _ => subject.strict_equals(candidate),
    }
}

impl Evaluate for SwitchExpr {
    /// Evaluate the subject once, then case values in source order until
    /// one matches. Case values after the match are never evaluated. With
    /// no match the default case runs if present, otherwise the result is
    /// nil. Cases do not fall through.
    fn eval(&self, ev: &Evaluator, scope: &Scope, ctx: &EvalContext) -> Value {
        let subject = bubble!(self.subject.eval(ev, scope, ctx));

        for case in self.cases.iter().filter(|case| !case.is_default) {
            for expr in &case.exprs {
                let candidate = bubble!(expr.eval(ev, scope, ctx));
                if case_matches(&subject, &candidate) {
                    return eval_block(&case.body, ev, scope, ctx);
                }
            }
        }

        match self.cases.iter().find(|case| case.is_default) {
            Some(default) => eval_block(&default.body, ev, scope, ctx),
            None => Value::Nil,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse;

    fn eval(src: &str) -> Value {
        Evaluator::new().evaluate(
            &parse(src).unwrap(),
            &Scope::root("test"),
            &EvalContext::new(),
        )
    }

    #[test]
    fn test_first_matching_case() {
        let src = "switch 2 { case 1: \"one\" case 2, 3: \"two or three\" default: \"other\" }";
        assert_eq!(eval(src), Value::string("two or three"));
    }

    #[test]
    fn test_default_position_does_not_matter() {
        let src = "switch 3 { default: \"other\" case 3: \"three\" }";
        assert_eq!(eval(src), Value::string("three"));
    }

    #[test]
    fn test_no_match_without_default_is_nil() {
        assert_eq!(eval("switch 9 { case 1: 1 }"), Value::Nil);
    }

    #[test]
    fn test_strict_equality() {
        let src = "switch 1 { case 1.0: \"float\" default: \"int\" }";
        assert_eq!(eval(src), Value::string("int"));
    }

    #[test]
    fn test_regex_case() {
        let src = "switch \"abc123\" { case regex(\"^[a-z]+$\"): \"letters\" case regex(\"[0-9]\"): \"digits\" }";
        assert_eq!(eval(src), Value::string("digits"));
    }

    #[test]
    fn test_later_cases_not_evaluated_after_match() {
        let src = "switch 1 { case 1: \"hit\" case missing: \"never\" }";
        assert_eq!(eval(src), Value::string("hit"));
    }

    #[test]
    fn test_subject_error_bubbles() {
        assert!(eval("switch missing { default: 1 }").is_error());
    }
}
