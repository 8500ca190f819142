// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::stream;
use serde_json::json;

use crate::config::Options;
use crate::contract::{Hint, HintChecker, Signature};
use crate::engine::{
    Aggregation, CachedResult, ConsumptionSite, PropagationScope, Session, SiteFailure,
    SiteOutcome,
};
use crate::errors::{EvaluationError, Phase, TeardownError, Violation};
use crate::graph::{Args, NodeRegistry, Producer, Value};
use crate::traits::Decorate;

/// End-to-end tests driving a session over small graphs with the hint checker
#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn counting(calls: &Arc<AtomicUsize>, value: Value) -> Producer {
        let calls = calls.clone();
        Producer::sync(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(value.clone())
        })
    }

    fn session(registry: NodeRegistry, options: Options) -> Session {
        Session::new(registry, options, Arc::new(HintChecker::new()))
    }

    fn failure_of(result: &CachedResult) -> &crate::engine::FailureRecord {
        result.failure().expect("expected a captured failure")
    }

    /// Counts decorations and otherwise leaves producers alone.
    struct CountingDecorator {
        calls: Arc<AtomicUsize>,
    }

    impl Decorate for CountingDecorator {
        fn decorate(&self, _: &str, _: &Signature, producer: Producer) -> Result<Producer, Violation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(producer)
        }
    }

    #[test]
    fn test_node_is_evaluated_once_per_session() {
        let calls = counter();
        let mut registry = NodeRegistry::new();
        let a = registry
            .register("a", Signature::new().returns(Hint::Int), counting(&calls, json!(1)))
            .unwrap();

        let mut session = session(registry, Options::enabled());
        let first = session.get_or_evaluate(a).unwrap();
        let second = session.get_or_evaluate(a).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.value(), Some(&json!(1)));
    }

    #[test]
    fn test_decoration_failure_never_runs_the_body() {
        let calls = counter();
        let mut registry = NodeRegistry::new();
        registry
            .register(
                "broken",
                Signature::new().returns(Hint::Named("Missing".to_string())),
                counting(&calls, json!(1)),
            )
            .unwrap();
        registry
            .register("left", Signature::new().param("broken"), Producer::sync(|_| Ok(json!(null))))
            .unwrap();
        registry
            .register("right", Signature::new().param("broken"), Producer::sync(|_| Ok(json!(null))))
            .unwrap();

        let mut session = session(registry, Options::enabled());
        let broken = session.evaluate("broken").unwrap();
        session.evaluate("left").unwrap();
        session.evaluate("right").unwrap();

        let record = failure_of(&broken);
        assert_eq!(record.origin(), "broken");
        assert_eq!(record.phase(), Phase::Decoration);
        assert!(record.message().contains("'Missing' is unresolvable"));
        assert!(Arc::ptr_eq(&broken, &session.cached("broken").unwrap()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_call_time_violation_is_captured_not_raised() {
        let mut registry = NodeRegistry::new();
        registry
            .register("b", Signature::new().returns(Hint::Int), Producer::sync(|_| Ok(json!("oops"))))
            .unwrap();

        let mut session = session(registry, Options::enabled());
        let result = session.evaluate("b").unwrap();
        let record = failure_of(&result);
        assert_eq!(record.phase(), Phase::Call);
        assert!(record.message().contains("violates type hint int"));
    }

    #[test]
    fn test_ordinary_errors_propagate_and_are_remembered() {
        let calls = counter();
        let seen = calls.clone();
        let mut registry = NodeRegistry::new();
        registry
            .register(
                "flaky",
                Signature::new(),
                Producer::sync(move |_| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Err(anyhow::anyhow!("connection refused"))
                }),
            )
            .unwrap();

        let mut session = session(registry, Options::enabled());
        let first = session.evaluate("flaky").unwrap_err();
        let second = session.evaluate("flaky").unwrap_err();

        assert!(matches!(first, EvaluationError::Producer { .. }));
        assert!(second.to_string().contains("connection refused"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sync_and_async_values_pass_through_unchanged() {
        let mut registry = NodeRegistry::new();
        registry
            .register("sync", Signature::new().returns(Hint::Int), Producer::sync(|_| Ok(json!(5))))
            .unwrap();
        registry
            .register(
                "later",
                Signature::new().typed_param("sync", Hint::Int).returns(Hint::Str),
                Producer::asynchronous(|args: Args| async move {
                    let n = args.get("sync")?.as_i64().unwrap_or_default();
                    tokio::task::yield_now().await;
                    Ok::<_, anyhow::Error>(json!(format!("n={}", n)))
                }),
            )
            .unwrap();

        let mut checked = session(registry, Options::enabled());
        assert_eq!(checked.evaluate("sync").unwrap().value(), Some(&json!(5)));
        assert_eq!(checked.evaluate("later").unwrap().value(), Some(&json!("n=5")));
    }

    #[test]
    fn test_async_violation_is_captured() {
        let mut registry = NodeRegistry::new();
        registry
            .register(
                "later",
                Signature::new().returns(Hint::Int),
                Producer::asynchronous(|_args: Args| async { Ok::<_, anyhow::Error>(json!(1.5)) }),
            )
            .unwrap();

        let mut session = session(registry, Options::enabled());
        let result = session.evaluate("later").unwrap();
        assert_eq!(failure_of(&result).phase(), Phase::Call);
    }

    #[test]
    fn test_generators_bypass_checking() {
        let mut registry = NodeRegistry::new();
        registry
            .register(
                "resource",
                Signature::new().returns(Hint::Named("Missing".to_string())),
                Producer::generator(|_| Ok(vec![Ok(json!("handle"))])),
            )
            .unwrap();
        registry
            .register(
                "events",
                Signature::new().returns(Hint::Int),
                Producer::async_generator(|_args: Args| {
                    Ok(stream::iter(vec![Ok::<Value, anyhow::Error>(json!("not an int"))]))
                }),
            )
            .unwrap();

        let mut session = session(registry, Options::enabled());
        assert_eq!(session.evaluate("resource").unwrap().value(), Some(&json!("handle")));
        assert_eq!(session.evaluate("events").unwrap().value(), Some(&json!("not an int")));
        assert!(session.teardown().is_empty());
    }

    #[test]
    fn test_opt_in_generator_checking() {
        let mut registry = NodeRegistry::new();
        registry
            .register(
                "numbers",
                Signature::new().returns(Hint::Iter(Box::new(Hint::Int))),
                Producer::generator(|_| Ok(vec![Ok(json!("one"))])),
            )
            .unwrap();

        let options = Options {
            check_generators: true,
            ..Options::enabled()
        };
        let mut session = session(registry, options);
        let result = session.evaluate("numbers").unwrap();
        assert!(failure_of(&result).message().contains("yielded \"one\""));
    }

    #[test]
    fn test_opt_in_checking_of_async_generator_first_item() {
        let mut registry = NodeRegistry::new();
        registry
            .register(
                "events",
                Signature::new().returns(Hint::Iter(Box::new(Hint::Int))),
                Producer::async_generator(|_args: Args| {
                    Ok(stream::iter(vec![Ok::<Value, anyhow::Error>(json!("one"))]))
                }),
            )
            .unwrap();

        let options = Options {
            check_generators: true,
            ..Options::enabled()
        };
        let mut session = session(registry, options);
        let result = session.evaluate("events").unwrap();
        let failure = failure_of(&result);
        assert_eq!(failure.origin(), "events");
        assert!(failure.message().contains("yielded \"one\""));
        assert!(session.teardown().is_empty());
    }

    #[test]
    fn test_opt_in_checking_of_async_generator_later_item() {
        let mut registry = NodeRegistry::new();
        registry
            .register(
                "events",
                Signature::new().returns(Hint::Iter(Box::new(Hint::Int))),
                Producer::async_generator(|_args: Args| {
                    Ok(stream::iter(vec![
                        Ok::<Value, anyhow::Error>(json!(1)),
                        Ok(json!("two")),
                    ]))
                }),
            )
            .unwrap();

        let options = Options {
            check_generators: true,
            ..Options::enabled()
        };
        let mut session = session(registry, options);
        assert_eq!(session.evaluate("events").unwrap().value(), Some(&json!(1)));

        let errors = session.teardown();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            TeardownError::Producer { node, error } => {
                assert_eq!(node, "events");
                assert!(error.to_string().contains("two"));
            }
            other => panic!("expected a producer teardown error, got {:?}", other),
        }
    }

    #[test]
    fn test_teardown_runs_in_reverse_setup_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = NodeRegistry::new();
        for (name, deps) in [("outer", vec![]), ("inner", vec!["outer"])] {
            let order = order.clone();
            let signature = deps.into_iter().fold(Signature::new(), |s, d| s.param(d));
            registry
                .register(
                    name,
                    signature,
                    Producer::generator(move |_| {
                        let order = order.clone();
                        let first = std::iter::once(Ok(json!(name)));
                        let finish = std::iter::from_fn(move || {
                            order.lock().unwrap().push(name);
                            None
                        });
                        Ok(first.chain(finish))
                    }),
                )
                .unwrap();
        }

        let mut session = session(registry, Options::enabled());
        session.evaluate("inner").unwrap();
        assert!(session.teardown().is_empty());
        assert_eq!(*order.lock().unwrap(), vec!["inner", "outer"]);
    }

    #[test]
    fn test_second_item_is_a_teardown_error() {
        let mut registry = NodeRegistry::new();
        registry
            .register(
                "chatty",
                Signature::new(),
                Producer::generator(|_| Ok(vec![Ok(json!(1)), Ok(json!(2))])),
            )
            .unwrap();

        let mut session = session(registry, Options::default());
        session.evaluate("chatty").unwrap();
        let errors = session.teardown();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], TeardownError::MoreThanOneItem { .. }));
    }

    #[test]
    fn test_failed_site_names_the_node_and_skips_the_body() {
        let body_calls = counter();
        let seen = body_calls.clone();
        let mut registry = NodeRegistry::new();
        registry
            .register("bad", Signature::new().returns(Hint::Int), Producer::sync(|_| Ok(json!("x"))))
            .unwrap();
        registry
            .register("good", Signature::new().returns(Hint::Int), Producer::sync(|_| Ok(json!(1))))
            .unwrap();

        let mut session = session(registry, Options::enabled());
        let failing = ConsumptionSite::new("test_bad", ["bad"]).with_body(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let report = session.call_site(&failing).unwrap();
        assert!(!report.passed());
        assert!(report
            .diagnostic()
            .unwrap()
            .starts_with("Fixture \"bad\" failed type-checking: "));
        assert_eq!(body_calls.load(Ordering::SeqCst), 0);

        let healthy = ConsumptionSite::new("test_good", ["good"]).with_body(|args| {
            anyhow::ensure!(args.get("good")? == &json!(1), "unexpected value");
            Ok(())
        });
        assert!(session.call_site(&healthy).unwrap().passed());
    }

    #[test]
    fn test_setup_hook_is_idempotent() {
        let decorations = counter();
        let mut registry = NodeRegistry::new();
        let a = registry
            .register("a", Signature::new(), Producer::sync(|_| Ok(json!(1))))
            .unwrap();

        let decorator = CountingDecorator {
            calls: decorations.clone(),
        };
        let mut session = Session::new(registry, Options::enabled(), Arc::new(decorator));
        session.setup_node(a).unwrap();
        session.setup_node(a).unwrap();
        session.evaluate("a").unwrap();

        assert_eq!(decorations.load(Ordering::SeqCst), 1);
        assert!(session.registry().get(a).unwrap().is_wrapped());
    }

    #[test]
    fn test_a_b_c_scenario() {
        let a_calls = counter();
        let b_calls = counter();
        let c_calls = counter();
        let mut registry = NodeRegistry::new();
        registry
            .register("a", Signature::new().returns(Hint::Int), counting(&a_calls, json!(42)))
            .unwrap();
        registry
            .register("b", Signature::new().returns(Hint::Int), counting(&b_calls, json!("forty-two")))
            .unwrap();

        let seen = c_calls.clone();
        let site = ConsumptionSite::new("c", ["a", "b"]).with_body(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let mut session = session(registry, Options::enabled());
        let report = session.call_site(&site).unwrap();

        assert_eq!(session.cached("a").unwrap().value(), Some(&json!(42)));
        let b = session.cached("b").unwrap();
        assert_eq!(failure_of(&b).origin(), "b");
        assert!(failure_of(&b).message().contains("int"));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert_eq!(c_calls.load(Ordering::SeqCst), 0);

        match report.outcome() {
            SiteOutcome::Failed(SiteFailure::Propagated(propagated)) => {
                assert_eq!(propagated.origins().collect::<Vec<_>>(), vec!["b"]);
            }
            other => panic!("expected a propagated failure, got {:?}", other),
        }
    }

    #[test]
    fn test_all_failures_are_aggregated_unless_first_only() {
        let mut registry = NodeRegistry::new();
        for name in ["x", "y"] {
            registry
                .register(name, Signature::new().returns(Hint::Int), Producer::sync(|_| Ok(json!("s"))))
                .unwrap();
        }
        let site = ConsumptionSite::new("test_xy", ["x", "y"]);

        let mut all = session(registry.clone(), Options::enabled());
        let report = all.call_site(&site).unwrap();
        let diagnostic = report.diagnostic().unwrap();
        assert!(diagnostic.contains("Fixture \"x\""));
        assert!(diagnostic.contains("\n\nFixture \"y\""));

        let first_only = Options {
            aggregation: Aggregation::FirstOnly,
            ..Options::enabled()
        };
        let mut first = session(registry, first_only);
        let diagnostic = first.call_site(&site).unwrap().diagnostic().unwrap();
        assert!(diagnostic.contains("Fixture \"x\""));
        assert!(!diagnostic.contains("Fixture \"y\""));
    }

    #[test]
    fn test_repeated_requirement_is_reported_once() {
        let mut registry = NodeRegistry::new();
        registry
            .register("b", Signature::new().returns(Hint::Int), Producer::sync(|_| Ok(json!("s"))))
            .unwrap();
        let site = ConsumptionSite::new("test_twice", ["b", "b"]);

        let mut session = session(registry, Options::enabled());
        let report = session.call_site(&site).unwrap();
        match report.outcome() {
            SiteOutcome::Failed(SiteFailure::Propagated(propagated)) => {
                assert_eq!(propagated.origins().collect::<Vec<_>>(), vec!["b"]);
            }
            other => panic!("expected a propagated failure, got {:?}", other),
        }
        assert_eq!(report.diagnostic().unwrap().matches("Fixture \"b\"").count(), 1);
    }

    #[test]
    fn test_closure_scope_sees_transitive_failures() {
        let mut registry = NodeRegistry::new();
        registry
            .register("deep", Signature::new().returns(Hint::Int), Producer::sync(|_| Ok(json!("s"))))
            .unwrap();
        registry
            .register("shallow", Signature::new().param("deep"), Producer::sync(|_| Ok(json!(1))))
            .unwrap();
        let site = ConsumptionSite::new("test_shallow", ["shallow"]);

        let mut direct = session(registry.clone(), Options::enabled());
        assert!(direct.call_site(&site).unwrap().passed());

        let closure = Options {
            scope: PropagationScope::Closure,
            ..Options::enabled()
        };
        let mut transitive = session(registry, closure);
        let report = transitive.call_site(&site).unwrap();
        assert!(report.diagnostic().unwrap().starts_with("Fixture \"deep\""));
    }

    #[test]
    fn test_site_own_violation_is_distinct_from_propagation() {
        let mut registry = NodeRegistry::new();
        registry
            .register("name", Signature::new(), Producer::sync(|_| Ok(json!("alice"))))
            .unwrap();
        let site = ConsumptionSite::with_signature("test_name", Signature::new().typed_param("name", Hint::Int))
            .with_body(|_| Ok(()));

        let options = Options {
            check_sites: true,
            ..Options::enabled()
        };
        let mut session = session(registry, options);
        let report = session.call_site(&site).unwrap();
        match report.failure() {
            Some(SiteFailure::OwnViolation(record)) => assert_eq!(record.origin(), "test_name"),
            other => panic!("expected the site's own violation, got {:?}", other),
        }
        assert!(report.diagnostic().unwrap().starts_with("Test \"test_name\" failed type-checking"));
    }

    #[test]
    fn test_checking_disabled_leaves_everything_alone() {
        let mut registry = NodeRegistry::new();
        registry
            .register("b", Signature::new().returns(Hint::Int), Producer::sync(|_| Ok(json!("x"))))
            .unwrap();
        let site = ConsumptionSite::new("test_b", ["b"])
            .with_body(|args| {
                anyhow::ensure!(args.get("b")?.is_string(), "not a string");
                Ok(())
            });

        let mut session = session(registry, Options::default());
        assert!(session.call_site(&site).unwrap().passed());
        assert!(!session.registry().by_name("b").unwrap().evaluator().unwrap().is_checked());
    }

    #[test]
    fn test_cycles_are_reported() {
        let mut registry = NodeRegistry::new();
        registry
            .register("ping", Signature::new().param("pong"), Producer::sync(|_| Ok(json!(1))))
            .unwrap();
        registry
            .register("pong", Signature::new().param("ping"), Producer::sync(|_| Ok(json!(2))))
            .unwrap();

        let mut session = session(registry, Options::enabled());
        match session.evaluate("ping").unwrap_err() {
            EvaluationError::Cycle { path } => assert_eq!(path, vec!["ping", "pong", "ping"]),
            other => panic!("expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_site_requirement() {
        let mut session = session(NodeRegistry::new(), Options::enabled());
        let err = session.call_site(&ConsumptionSite::new("test_x", ["nope"])).unwrap_err();
        assert!(matches!(err, EvaluationError::UnresolvedDependency { .. }));
    }

    #[test]
    fn test_async_node_inside_a_runtime_is_an_error() {
        let mut registry = NodeRegistry::new();
        registry
            .register(
                "remote",
                Signature::new().returns(Hint::Int),
                Producer::asynchronous(|_args: Args| async { Ok::<_, anyhow::Error>(json!(1)) }),
            )
            .unwrap();

        let outer = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let mut session = session(registry, Options::enabled());
        let err = outer.block_on(async { session.evaluate("remote") }).unwrap_err();
        assert!(matches!(err, EvaluationError::NestedRuntime));
        assert!(session.teardown().is_empty());
    }
}
