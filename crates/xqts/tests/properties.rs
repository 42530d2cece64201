//! Algebraic properties of assertion evaluation

mod common;

use common::*;
use proptest::prelude::*;
use xqts::prelude::*;

fn engine() -> ScriptedEngine {
    let engine = ScriptedEngine::new();
    engine
        .returns("true()", Sequence::one(AtomicValue::boolean(true)))
        .returns("false()", Sequence::one(AtomicValue::boolean(false)))
        .script("$result", Script::Binding("result".into()))
        .fails("error()", "FOER0000", "raised");
    engine
}

fn arb_outcome() -> impl Strategy<Value = ExecutionOutcome> {
    prop_oneof![
        prop::collection::vec(-3i64..4, 0..4).prop_map(|v| success(&v)),
        Just(ExecutionOutcome::Success(Sequence::one(elem()))),
        Just(ExecutionOutcome::Success(Sequence::one(AtomicValue::string("a b")))),
        Just(ExecutionOutcome::Success(Sequence::one(AtomicValue::double(f64::NAN)))),
        "[A-Z]{4}[0-9]{4}".prop_map(|code| failure(&code, "fault")),
    ]
}

fn arb_result_leaf() -> impl Strategy<Value = Assertion> {
    prop_oneof![
        "-?[0-3]( [0-3]){0,2}".prop_map(Assertion::eq),
        any::<bool>().prop_map(Assertion::boolean),
        Just(Assertion::string_value("a b")),
        Just(Assertion::serialization("<elem attr=\"value\"/>")),
        Just(Assertion::type_matches("xs:integer+")),
        Just(Assertion::type_matches("element()?")),
        Just(Assertion::type_matches("not a type")),
        Just(Assertion::IsEmpty),
        (0usize..3).prop_map(Assertion::count),
        Just(Assertion::xml("<elem attr='value'/>")),
    ]
}

fn arb_query_leaf() -> impl Strategy<Value = Assertion> {
    prop_oneof![
        Just(Assertion::query("true()")),
        Just(Assertion::query("false()")),
        Just(Assertion::query("$result")),
        Just(Assertion::query("error()")),
        Just(Assertion::deep_eq("$result")),
        Just(Assertion::permutation("$result")),
        Just(Assertion::serialization_matches("[", "")),
        Just(Assertion::serialization_error("SENR0001")),
        "[A-Z]{4}[0-9]{4}|\\*".prop_map(Assertion::error),
    ]
}

fn arb_leaf() -> impl Strategy<Value = Assertion> {
    prop_oneof![arb_result_leaf(), arb_query_leaf()]
}

fn arb_assertion() -> impl Strategy<Value = Assertion> {
    arb_leaf().prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.and(b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.or(b)),
            inner.prop_map(Assertion::not),
        ]
    })
}

fn success_only() -> Vec<Assertion> {
    vec![
        Assertion::eq("1"),
        Assertion::true_(),
        Assertion::string_value(""),
        Assertion::serialization(""),
        Assertion::query("true()"),
        Assertion::type_matches("item()*"),
        Assertion::IsEmpty,
        Assertion::count(0),
    ]
}

proptest! {
    #[test]
    fn evaluation_always_yields_a_verdict(a in arb_assertion(), o in arb_outcome()) {
        let engine = engine();
        let evaluator = Evaluator::new(Harness::new(&engine));
        let verdict = evaluator.evaluate(&a, &o);
        prop_assert_eq!(verdict, evaluator.check(&a, &o).is_ok());
    }

    #[test]
    fn and_is_conjunction(a in arb_assertion(), b in arb_assertion(), o in arb_outcome()) {
        let engine = engine();
        let evaluator = Evaluator::new(Harness::new(&engine));
        let left = evaluator.evaluate(&a, &o);
        let right = evaluator.evaluate(&b, &o);
        prop_assert_eq!(evaluator.evaluate(&a.clone().and(b), &o), left && right);
    }

    #[test]
    fn or_is_disjunction(a in arb_assertion(), b in arb_assertion(), o in arb_outcome()) {
        let engine = engine();
        let evaluator = Evaluator::new(Harness::new(&engine));
        let left = evaluator.evaluate(&a, &o);
        let right = evaluator.evaluate(&b, &o);
        prop_assert_eq!(evaluator.evaluate(&a.clone().or(b), &o), left || right);
    }

    #[test]
    fn not_is_negation(a in arb_assertion(), o in arb_outcome()) {
        let engine = engine();
        let evaluator = Evaluator::new(Harness::new(&engine));
        prop_assert_eq!(evaluator.evaluate(&a.clone().not(), &o), !evaluator.evaluate(&a, &o));
    }

    #[test]
    fn right_branch_skipped_when_left_decides(a in arb_assertion(), o in arb_outcome()) {
        let engine = engine();
        let evaluator = Evaluator::new(Harness::new(&engine));
        let left = evaluator.evaluate(&a, &o);
        let calls = engine.prepared();

        let combined = if left {
            a.or(Assertion::query("true()"))
        } else {
            a.and(Assertion::query("true()"))
        };
        prop_assert_eq!(evaluator.evaluate(&combined, &o), left);
        // The left branch runs its nested queries again; the right branch never runs.
        prop_assert_eq!(engine.prepared(), calls * 2);
    }

    #[test]
    fn error_assertion_false_for_every_success(
        code in "[A-Z]{4}[0-9]{4}|\\*",
        v in prop::collection::vec(any::<i64>(), 0..5),
    ) {
        let engine = engine();
        prop_assert!(!evaluate(&engine, &Assertion::error(code), &success(&v)));
    }

    #[test]
    fn success_only_assertions_false_for_every_failure(code in "[A-Z]{4}[0-9]{4}", message in ".*") {
        let engine = engine();
        let outcome = failure(&code, &message);
        for assertion in success_only() {
            prop_assert!(!evaluate(&engine, &assertion, &outcome));
        }
        prop_assert_eq!(engine.prepared(), 0);
    }
}
