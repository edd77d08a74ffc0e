#![no_main]

use epoch_di::{Container, Lifetime, Resolver};
use libfuzzer_sys::fuzz_target;
use std::collections::HashMap;
use std::sync::Arc;

const NAMES: [&str; 4] = ["a", "b", "c", "d"];

fn lifetime(byte: u8) -> Lifetime {
    match byte % 3 {
        0 => Lifetime::Singleton,
        1 => Lifetime::Scoped,
        _ => Lifetime::Transient,
    }
}

// Replays a byte string as register / resolve / scope operations and checks
// every resolution against a model of the registry.
fuzz_target!(|data: &[u8]| {
    let container = Container::new();
    let mut model: HashMap<&str, (Lifetime, u64)> = HashMap::new();
    let mut last_seen: HashMap<&str, Arc<u64>> = HashMap::new();

    for chunk in data.chunks(3) {
        let [op, slot, arg] = match chunk {
            [op, slot, arg] => [*op, *slot, *arg],
            _ => return,
        };
        let name = NAMES[(slot as usize) % NAMES.len()];

        match op % 4 {
            0 => {
                let lifetime = lifetime(arg);
                let value = u64::from(arg);
                container
                    .register_named(name, lifetime, move |_| value)
                    .expect("default policy accepts duplicates");
                model.insert(name, (lifetime, value));
                last_seen.remove(name);
            }
            1 => {
                let resolved = container.resolve_named::<u64>(name);
                match model.get(name) {
                    None => assert!(resolved.unwrap_err().is_not_registered()),
                    Some(&(lifetime, value)) => {
                        let resolved = resolved.expect("registered key resolves");
                        assert_eq!(*resolved, value);
                        if let Some(previous) = last_seen.get(name) {
                            let same = Arc::ptr_eq(previous, &resolved);
                            match lifetime {
                                Lifetime::Singleton | Lifetime::Scoped => assert!(same),
                                Lifetime::Transient => assert!(!same),
                            }
                        }
                        last_seen.insert(name, resolved);
                    }
                }
            }
            2 => {
                container.start_new_scope();
                last_seen.retain(|name, _| {
                    matches!(model.get(name), Some((Lifetime::Singleton, _)))
                });
            }
            _ => {
                if arg % 16 == 0 {
                    container.reset_for_testing();
                    model.clear();
                    last_seen.clear();
                }
            }
        }
    }

    assert_eq!(container.registration_count(), model.len());
});
