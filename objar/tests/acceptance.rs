//! End-to-end behaviour of the container: memoization, wiring order,
//! cycle reporting and annotated invocation.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use objar::prelude::*;

type Calls = Arc<Mutex<Vec<&'static str>>>;

fn calls() -> Calls {
    Arc::new(Mutex::new(Vec::new()))
}

/// Resolve through a captured handle rather than the factory argument.
fn resolve_outer(outer: &WeakContainer, name: &str) -> Result<Instance> {
    let container = outer.upgrade().ok_or_else(|| ObjarError::factory(name, "container dropped"))?;
    container.resolve(name)
}

fn as_str(instance: &Instance) -> &'static str {
    instance.downcast_ref::<&'static str>().copied().unwrap_or("<not a str>")
}

#[test]
fn add_a_service_definition() {
    let container = Container::new();
    assert!(!container.is_defined("foo"));
    container.define("foo", |_| Ok(Some("bar"))).unwrap();
    assert!(container.is_defined("foo"));
}

#[test]
fn resolving_an_undefined_service_fails() {
    let container = Container::new();
    let err = container.resolve("foo").unwrap_err();

    assert!(matches!(err, ObjarError::NotDefined(_)));
    assert_eq!(err.to_string(), "The service \"foo\" is not defined");
    assert!(container.snapshot().resolved.is_empty());
}

#[test]
fn empty_factory_result_fails_every_time() {
    let runs = Arc::new(AtomicU32::new(0));
    let container = Container::new();
    container
        .define("foo", {
            let runs = runs.clone();
            move |_| -> Result<Option<()>> {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        })
        .unwrap();

    for _ in 0..2 {
        let err = container.resolve("foo").unwrap_err();
        assert!(matches!(err, ObjarError::EmptyDefinition { .. }));
        assert_eq!(err.to_string(), "The definition of the service \"foo\" must return it");
    }
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[test]
fn same_instance_is_returned() {
    let container = Container::new();
    container.define("foo", |_| Ok(Some(Vec::<u8>::new()))).unwrap();

    let one = container.resolve("foo").unwrap();
    let second = container.resolve("foo").unwrap();

    assert!(Arc::ptr_eq(&one, &second));
}

#[test]
fn redefinition_only_applies_before_first_resolve() {
    let container = Container::new();
    container.define("foo", |_| Ok(Some("first"))).unwrap();
    container.define("foo", |_| Ok(Some("second"))).unwrap();
    assert_eq!(*container.resolve_as::<&str>("foo").unwrap(), "second");

    container.define("foo", |_| Ok(Some("third"))).unwrap();
    assert_eq!(*container.resolve_as::<&str>("foo").unwrap(), "second");
}

#[test]
fn diamond_graph_invokes_each_factory_once() {
    //   A
    //  / \
    // v   v
    // C   B
    //  \ /
    //   v
    //   D -> E
    let calls = calls();
    let container = Container::new();
    let outer = container.downgrade();

    container
        .define("E", {
            let calls = calls.clone();
            move |_| {
                calls.lock().unwrap().push("E");
                Ok(Some("E"))
            }
        })
        .unwrap()
        .define("A", {
            let calls = calls.clone();
            let outer = outer.clone();
            move |_| {
                calls.lock().unwrap().push("A");
                resolve_outer(&outer, "B")?;
                resolve_outer(&outer, "C")?;
                Ok(Some("A"))
            }
        })
        .unwrap()
        .define("B", {
            let calls = calls.clone();
            move |c| {
                calls.lock().unwrap().push("B");
                c.resolve("D")?;
                Ok(Some("B"))
            }
        })
        .unwrap()
        .define("C", {
            let calls = calls.clone();
            move |c| {
                calls.lock().unwrap().push("C");
                c.resolve("D")?;
                Ok(Some("C"))
            }
        })
        .unwrap()
        .define("D", {
            let calls = calls.clone();
            let outer = outer.clone();
            move |_| {
                calls.lock().unwrap().push("D");
                resolve_outer(&outer, "E")?;
                Ok(Some("D"))
            }
        })
        .unwrap();

    let a = container.resolve("A").unwrap();

    assert_eq!(as_str(&a), "A");
    assert_eq!(*calls.lock().unwrap(), vec!["A", "B", "D", "E", "C"]);
    for name in ["A", "B", "C", "D", "E"] {
        assert!(container.is_resolved(name), "{name} should be memoized");
    }
}

fn cyclic_container() -> Container {
    //   A -> B
    //   ^    |
    //   |    v
    //   D <- C -> E
    let container = Container::new();
    let outer = container.downgrade();

    container
        .define("A", |c| {
            c.resolve("B")?;
            Ok(Some("A"))
        })
        .unwrap()
        .define("B", |c| {
            c.resolve("C")?;
            Ok(Some("B"))
        })
        .unwrap()
        .define("E", |_| Ok(Some("E")))
        .unwrap()
        .define("C", move |_| {
            resolve_outer(&outer, "D")?;
            resolve_outer(&outer, "E")?;
            Ok(Some("C"))
        })
        .unwrap()
        .define("D", |c| {
            c.resolve("A")?;
            Ok(Some("D"))
        })
        .unwrap();

    container
}

#[test]
fn circular_dependency_reports_the_full_loop() {
    let container = cyclic_container();
    let expected = "Circular dependency detected: A -> B -> C -> D -> A";

    let err = container.resolve("A").unwrap_err();
    assert!(matches!(err, ObjarError::CircularDependency(_)));
    assert_eq!(err.to_string(), expected);

    for name in ["B", "C", "D"] {
        let err = container.resolve(name).unwrap_err();
        assert_eq!(err.to_string(), expected, "resolving {name}");
    }

    assert_eq!(*container.resolve_as::<&str>("E").unwrap(), "E");

    // still stuck after an unrelated success
    assert_eq!(container.resolve("B").unwrap_err().to_string(), expected);
    assert_eq!(container.snapshot().stuck(), vec!["A", "B", "C", "D"]);
}

#[test]
fn cycle_chain_is_structured() {
    let container = cyclic_container();

    let err = container.resolve("C").unwrap_err();
    let chain: Vec<&str> = err
        .cycle()
        .unwrap_or_default()
        .iter()
        .map(ServiceName::as_str)
        .collect();

    // entered at C, so the oldest in-flight name is C
    assert_eq!(chain, vec!["C", "D", "A", "B", "C"]);
}

#[test]
fn invoke_rejects_badly_annotated_functions() {
    let container = Container::new();

    let err = container.invoke::<()>(vec!["a".into()]).unwrap_err();
    assert!(matches!(err, ObjarError::InvalidInvocation { .. }));

    let err = container.invoke::<()>(vec!["a".into(), "b".into()]).unwrap_err();
    assert!(matches!(err, ObjarError::InvalidInvocation { .. }));
}

#[test]
fn invoke_with_undefined_dependency_fails() {
    let container = Container::new();
    let err = container
        .invoke(vec!["a".into(), Annotation::call(|_| ())])
        .unwrap_err();

    assert_eq!(err.to_string(), "The service \"a\" is not defined");
}

#[test]
fn invoke_injects_dependencies() {
    // A -> B -> C
    let container = Container::new();
    container
        .define("A", |c| {
            c.resolve("B")?;
            Ok(Some("A"))
        })
        .unwrap()
        .define("B", |c| {
            c.resolve("C")?;
            Ok(Some("B"))
        })
        .unwrap()
        .define("C", |_| Ok(Some("C")))
        .unwrap();

    let received = container
        .invoke(vec![
            "A".into(),
            "B".into(),
            "C".into(),
            Annotation::call(|args| args.iter().map(as_str).collect::<Vec<_>>()),
        ])
        .unwrap();

    assert_eq!(received, vec!["A", "B", "C"]);
}

#[test]
fn invoke_returns_callable_result_untouched() {
    let container = Container::new();
    container.define_value("n", 20u32).unwrap();

    let total = container
        .invoke(vec![
            "n".into(),
            "n".into(),
            Annotation::call(|args| {
                args.iter()
                    .filter_map(|a| a.downcast_ref::<u32>())
                    .sum::<u32>()
                    + 2
            }),
        ])
        .unwrap();

    assert_eq!(total, 42);
}

#[test]
fn invoke_takes_part_in_cycle_detection() {
    let container = Container::new();
    container
        .define("A", |c| {
            c.invoke(vec!["A".into(), Annotation::call(|_| ())])?;
            Ok(Some("A"))
        })
        .unwrap();

    let expected = "Circular dependency detected: A -> A";
    let err = container.resolve("A").unwrap_err();
    assert!(matches!(err, ObjarError::CircularDependency(_)));
    assert_eq!(err.to_string(), expected);

    assert_eq!(container.resolve("A").unwrap_err().to_string(), expected);
}

#[test]
fn undefined_service_stays_in_flight() {
    let container = Container::new();
    assert!(matches!(container.resolve("late"), Err(ObjarError::NotDefined(_))));
    assert_eq!(
        container.resolve("late").unwrap_err().to_string(),
        "Circular dependency detected: late -> late"
    );
}
