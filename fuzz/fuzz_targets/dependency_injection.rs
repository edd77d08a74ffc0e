#![no_main]

use epoch_di::{key_of_type, Container, DiError, Lifetime, Resolver};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

struct Config {
    value: u32,
}

struct DatabaseService {
    config: Arc<Config>,
    connection_id: String,
}

struct BusinessService {
    db: Arc<DatabaseService>,
    service_id: u32,
}

struct SessionService {
    session_id: String,
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 12 {
        return;
    }

    // Parse input bytes
    let config_value = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let service_id = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    let pattern = u32::from_le_bytes([data[8], data[9], data[10], data[11]]);
    let lifetime = match (pattern >> 2) % 3 {
        0 => Lifetime::Singleton,
        1 => Lifetime::Scoped,
        _ => Lifetime::Transient,
    };

    let container = Container::new();
    container.add_singleton(Config { value: config_value }).unwrap();
    container
        .register(lifetime, |ctx| {
            let config = ctx.resolve::<Config>().unwrap();
            DatabaseService {
                connection_id: format!("conn_{}", config.value),
                config,
            }
        })
        .unwrap();

    match pattern % 4 {
        0 => {
            // Simple dependency injection
            let db = container.resolve::<DatabaseService>().unwrap();
            assert_eq!(db.config.value, config_value);
            assert_eq!(db.connection_id, format!("conn_{}", config_value));
        }
        1 => {
            // Chain of dependencies
            container
                .add_scoped_factory(move |ctx| BusinessService {
                    db: ctx.resolve().unwrap(),
                    service_id,
                })
                .unwrap();

            let business = container.resolve::<BusinessService>().unwrap();
            assert_eq!(business.service_id, service_id);
            assert_eq!(business.db.config.value, config_value);

            container.start_new_scope();
            let again = container.resolve::<BusinessService>().unwrap();
            assert!(!Arc::ptr_eq(&business, &again));
            if lifetime == Lifetime::Singleton {
                assert!(Arc::ptr_eq(&business.db, &again.db));
            }
        }
        2 => {
            // Scoped services across scope changes
            container
                .add_scoped_factory(|ctx| SessionService {
                    session_id: format!("session_{}", ctx.current_scope()),
                })
                .unwrap();

            for _ in 0..(service_id % 8) {
                let a = container.resolve::<SessionService>().unwrap();
                let b = container.resolve::<SessionService>().unwrap();
                assert!(Arc::ptr_eq(&a, &b));
                assert_eq!(a.session_id, format!("session_{}", container.current_scope()));
                container.start_new_scope();
            }
        }
        _ => {
            // Cycles are reported, never overflow the stack
            let depth = (service_id % 6) as usize + 1;
            for level in 0..depth {
                let next = (level + 1) % depth;
                container
                    .try_register::<u32, _>(
                        key_of_type::<u32>().with_name(level.to_string()),
                        Lifetime::Transient,
                        move |ctx| {
                            let below = ctx.resolve_named::<u32>(&next.to_string())?;
                            Ok(Arc::new(*below + 1))
                        },
                    )
                    .unwrap();
            }

            match container.resolve_named::<u32>("0") {
                Err(DiError::Circular(path)) => assert_eq!(path.len(), depth + 1),
                Err(e) => panic!("unexpected error {e}"),
                Ok(_) => panic!("cycle resolved"),
            }
        }
    }
});
