/// Unit tests for DiError and DiResult types

use epoch_di::{key_of_type, Container, DiError, DiResult, Lifetime, Resolver};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
struct UpstreamDown;

impl fmt::Display for UpstreamDown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("upstream unavailable")
    }
}

impl Error for UpstreamDown {}

#[test]
fn test_error_display_not_registered() {
    let error = DiError::NotRegistered {
        service: "TestService".to_string(),
    };
    let display_str = format!("{}", error);
    assert_eq!(display_str, "Service not registered: TestService");
}

#[test]
fn test_error_display_type_mismatch() {
    let error = DiError::TypeMismatch("std::string::String");
    assert_eq!(error.to_string(), "Type mismatch for: std::string::String");
}

#[test]
fn test_error_display_circular() {
    let error = DiError::Circular(vec!["ServiceA", "ServiceB", "ServiceA"]);
    assert_eq!(error.to_string(), "Circular dependency: ServiceA -> ServiceB -> ServiceA");
}

#[test]
fn test_error_display_empty_circular_path() {
    let error = DiError::Circular(vec![]);
    assert_eq!(error.to_string(), "Circular dependency: ");
}

#[test]
fn test_error_display_depth_exceeded() {
    let error = DiError::DepthExceeded(100);
    assert_eq!(error.to_string(), "Max depth 100 exceeded");
}

#[test]
fn test_error_display_duplicate() {
    let error = DiError::DuplicateRegistration {
        service: "u32 (\"port\")".to_string(),
    };
    assert_eq!(error.to_string(), "Service already registered: u32 (\"port\")");
}

#[test]
fn test_error_display_invalid_config() {
    let error = DiError::InvalidConfig("bad depth".to_string());
    assert_eq!(error.to_string(), "Invalid configuration: bad depth");
}

#[test]
fn test_factory_error_keeps_source() {
    let error = DiError::factory(UpstreamDown);
    let source = error.source().expect("factory errors expose their cause");
    assert_eq!(source.to_string(), "upstream unavailable");
}

#[test]
fn test_factory_error_is_attributed_to_failing_service() {
    struct Client;

    let container = Container::new();
    container
        .try_register::<Client, _>(key_of_type::<Client>(), Lifetime::Scoped, |_| {
            Err(DiError::factory(UpstreamDown))
        })
        .unwrap();

    let error = match container.resolve::<Client>() {
        Err(e) => e,
        Ok(_) => panic!("factory should fail"),
    };
    let message = error.to_string();
    assert!(message.starts_with("Factory for "), "{message}");
    assert!(message.contains("Client"), "{message}");
    assert!(message.ends_with("failed: upstream unavailable"), "{message}");
}

#[test]
fn test_nested_factory_error_names_innermost_service() {
    struct Inner;
    struct Outer;

    let container = Container::new();
    container
        .try_register::<Inner, _>(key_of_type::<Inner>(), Lifetime::Transient, |_| {
            Err(DiError::factory(UpstreamDown))
        })
        .unwrap();
    container
        .try_register::<Outer, _>(key_of_type::<Outer>(), Lifetime::Transient, |ctx| {
            ctx.resolve::<Inner>()?;
            Ok(Arc::new(Outer))
        })
        .unwrap();

    match container.resolve::<Outer>() {
        Err(DiError::Factory { service, .. }) => {
            assert!(service.ends_with("Inner"));
            assert!(!service.ends_with("Outer"));
        }
        _ => panic!("expected factory error"),
    }
}

#[test]
fn test_errors_are_cloneable() {
    let error = DiError::factory(UpstreamDown);
    let copy = error.clone();
    assert_eq!(error.to_string(), copy.to_string());
}

#[test]
fn test_is_not_registered() {
    assert!(DiError::NotRegistered { service: "X".into() }.is_not_registered());
    assert!(!DiError::DepthExceeded(1).is_not_registered());
}

#[test]
fn test_diresult_ok() {
    let result: DiResult<String> = Ok("success".to_string());
    assert_eq!(result.unwrap(), "success");
}

#[test]
fn test_diresult_err() {
    let result: DiResult<String> = Err(DiError::TypeMismatch("TestType"));
    assert!(matches!(result, Err(DiError::TypeMismatch("TestType"))));
}
