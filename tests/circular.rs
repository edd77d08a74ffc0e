use epoch_di::{key_of_type, Container, ContainerOptions, DiError, Lifetime, Resolver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::Duration;

fn assert_circular<T>(result: Result<T, DiError>, expected_path: &[&str]) {
    match result {
        Err(DiError::Circular(path)) => {
            assert_eq!(path.len(), expected_path.len(), "path was {path:?}");
            for (actual, expected) in path.iter().zip(expected_path) {
                assert!(
                    actual.ends_with(expected),
                    "expected {expected} in path {path:?}"
                );
            }
        }
        Err(e) => panic!("expected circular dependency error, got {e}"),
        Ok(_) => panic!("expected circular dependency error, resolution succeeded"),
    }
}

struct A;
struct B;
struct C;

#[test]
fn test_self_circular_dependency() {
    let container = Container::new();
    container
        .try_register::<A, _>(key_of_type::<A>(), Lifetime::Transient, |ctx| {
            ctx.resolve::<A>()?;
            Ok(Arc::new(A))
        })
        .unwrap();

    assert_circular(container.resolve::<A>(), &["A", "A"]);
}

#[test]
fn test_two_level_circular() {
    let container = Container::new();
    container
        .try_register::<A, _>(key_of_type::<A>(), Lifetime::Transient, |ctx| {
            ctx.resolve::<B>()?;
            Ok(Arc::new(A))
        })
        .unwrap();
    container
        .try_register::<B, _>(key_of_type::<B>(), Lifetime::Transient, |ctx| {
            ctx.resolve::<A>()?;
            Ok(Arc::new(B))
        })
        .unwrap();

    assert_circular(container.resolve::<A>(), &["A", "B", "A"]);
    assert_circular(container.resolve::<B>(), &["B", "A", "B"]);
}

#[test]
fn test_three_level_circular_through_singletons() {
    let container = Container::new();
    container
        .try_register::<A, _>(key_of_type::<A>(), Lifetime::Singleton, |ctx| {
            ctx.resolve::<B>()?;
            Ok(Arc::new(A))
        })
        .unwrap();
    container
        .try_register::<B, _>(key_of_type::<B>(), Lifetime::Scoped, |ctx| {
            ctx.resolve::<C>()?;
            Ok(Arc::new(B))
        })
        .unwrap();
    container
        .try_register::<C, _>(key_of_type::<C>(), Lifetime::Singleton, |ctx| {
            ctx.resolve::<A>()?;
            Ok(Arc::new(C))
        })
        .unwrap();

    assert_circular(container.resolve::<A>(), &["A", "B", "C", "A"]);

    // The failed singleton is not left half-built; a second attempt fails the same way.
    assert_circular(container.resolve::<A>(), &["A", "B", "C", "A"]);
}

#[test]
fn test_circular_with_traits() {
    trait ServiceA: Send + Sync {
        fn name(&self) -> &str;
    }
    trait ServiceB: Send + Sync {
        fn name(&self) -> &str;
    }

    struct ImplA;
    impl ServiceA for ImplA {
        fn name(&self) -> &str {
            "A"
        }
    }
    struct ImplB;
    impl ServiceB for ImplB {
        fn name(&self) -> &str {
            "B"
        }
    }

    let container = Container::new();
    container
        .try_register::<dyn ServiceA, _>(key_of_type::<dyn ServiceA>(), Lifetime::Singleton, |ctx| {
            ctx.resolve::<dyn ServiceB>()?;
            Ok(Arc::new(ImplA) as Arc<dyn ServiceA>)
        })
        .unwrap();
    container
        .try_register::<dyn ServiceB, _>(key_of_type::<dyn ServiceB>(), Lifetime::Singleton, |ctx| {
            ctx.resolve::<dyn ServiceA>()?;
            Ok(Arc::new(ImplB) as Arc<dyn ServiceB>)
        })
        .unwrap();

    assert_circular(container.resolve::<dyn ServiceA>(), &["ServiceA", "ServiceB", "ServiceA"]);
}

#[test]
fn test_diamond_is_not_circular() {
    struct Top {
        left: Arc<A>,
        right: Arc<B>,
    }

    let container = Container::new();
    container.add_singleton(C).unwrap();
    container
        .add_transient_factory(|ctx| {
            ctx.resolve::<C>().unwrap();
            A
        })
        .unwrap();
    container
        .add_transient_factory(|ctx| {
            ctx.resolve::<C>().unwrap();
            B
        })
        .unwrap();
    container
        .add_transient_factory(|ctx| Top {
            left: ctx.resolve().unwrap(),
            right: ctx.resolve().unwrap(),
        })
        .unwrap();

    let top = container.resolve::<Top>().unwrap();
    let _ = (&top.left, &top.right);
}

#[test]
fn test_same_type_under_different_names_is_not_circular() {
    let container = Container::new();
    container.register_named("inner", Lifetime::Transient, |_| 1u32).unwrap();
    container
        .try_register::<u32, _>(key_of_type::<u32>().with_name("outer"), Lifetime::Transient, |ctx| {
            let inner = ctx.resolve_named::<u32>("inner")?;
            Ok(Arc::new(*inner + 1))
        })
        .unwrap();

    assert_eq!(*container.resolve_named::<u32>("outer").unwrap(), 2);
}

#[test]
fn test_depth_exceeded() {
    let container = Container::with_options(ContainerOptions::default().with_max_depth(2).unwrap());
    container
        .try_register::<A, _>(key_of_type::<A>(), Lifetime::Transient, |ctx| {
            ctx.resolve::<B>()?;
            Ok(Arc::new(A))
        })
        .unwrap();
    container
        .try_register::<B, _>(key_of_type::<B>(), Lifetime::Transient, |ctx| {
            ctx.resolve::<C>()?;
            Ok(Arc::new(B))
        })
        .unwrap();
    container.add_transient_factory(|_| C).unwrap();

    assert!(matches!(container.resolve::<A>(), Err(DiError::DepthExceeded(2))));
    // A chain that fits is fine.
    assert!(container.resolve::<B>().is_ok());
}

#[test]
fn test_cycle_through_captured_container_is_reported() {
    let container = Container::new();
    let handle = container.clone();
    container
        .try_register::<A, _>(key_of_type::<A>(), Lifetime::Transient, move |_| {
            handle.resolve::<A>()?;
            Ok(Arc::new(A))
        })
        .unwrap();

    assert_circular(container.resolve::<A>(), &["A", "A"]);
}

#[test]
fn test_captured_container_cycle_through_other_keys() {
    let container = Container::new();
    let handle = container.clone();
    container
        .try_register::<A, _>(key_of_type::<A>(), Lifetime::Scoped, move |_| {
            handle.resolve::<B>()?;
            Ok(Arc::new(A))
        })
        .unwrap();
    container
        .try_register::<B, _>(key_of_type::<B>(), Lifetime::Transient, |ctx| {
            ctx.resolve::<A>()?;
            Ok(Arc::new(B))
        })
        .unwrap();

    assert_circular(container.resolve::<A>(), &["A", "B", "A"]);
}

#[test]
fn test_captured_container_resolves_unrelated_keys() {
    let container = Container::new();
    let handle = container.clone();
    container.add_singleton(C).unwrap();
    container
        .try_register::<A, _>(key_of_type::<A>(), Lifetime::Transient, move |_| {
            handle.resolve::<C>()?;
            Ok(Arc::new(A))
        })
        .unwrap();

    assert!(container.resolve::<A>().is_ok());
    assert!(container.resolve::<A>().is_ok());
}

#[test]
fn test_singleton_cycle_across_threads_fails_instead_of_blocking() {
    let container = Container::new();
    let both_building = Arc::new(Barrier::new(2));

    // Each factory waits for the other thread to start its own build once,
    // so thread 1 holds A while asking for B and thread 2 holds B while
    // asking for A.
    let first_a = Arc::new(AtomicBool::new(true));
    let barrier = both_building.clone();
    container
        .try_register::<A, _>(key_of_type::<A>(), Lifetime::Singleton, move |ctx| {
            if first_a.swap(false, Ordering::SeqCst) {
                barrier.wait();
            }
            ctx.resolve::<B>()?;
            Ok(Arc::new(A))
        })
        .unwrap();

    let first_b = Arc::new(AtomicBool::new(true));
    let barrier = both_building.clone();
    container
        .try_register::<B, _>(key_of_type::<B>(), Lifetime::Singleton, move |ctx| {
            if first_b.swap(false, Ordering::SeqCst) {
                barrier.wait();
            }
            ctx.resolve::<A>()?;
            Ok(Arc::new(B))
        })
        .unwrap();

    let (tx, rx) = mpsc::channel();
    for which in 0..2 {
        let container = container.clone();
        let tx = tx.clone();
        thread::spawn(move || {
            let result = if which == 0 {
                container.resolve::<A>().map(|_| ())
            } else {
                container.resolve::<B>().map(|_| ())
            };
            let _ = tx.send(result);
        });
    }

    for _ in 0..2 {
        let result = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("cross-thread cycle blocked");
        match result {
            Err(DiError::Circular(path)) => {
                assert_eq!(path.len(), 3, "path was {path:?}");
                assert_eq!(path.first(), path.last());
            }
            other => panic!("expected circular dependency error, got {other:?}"),
        }
    }

    // Neither singleton was committed half-built.
    assert!(matches!(container.resolve::<A>(), Err(DiError::Circular(_))));
}
