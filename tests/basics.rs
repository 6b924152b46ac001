use ferrous_wire::{
    Arg, Callable, Constructor, ContainerBuilder, Definition, DiError, Method, Param, Params,
    TypeDef,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct ConsoleLogger {
    level: String,
}

fn console_logger() -> TypeDef {
    TypeDef::concrete(
        "ConsoleLogger",
        Constructor::new(
            vec![Param::new("level").with_default("info".to_string())],
            |_, _, args| {
                Ok(ConsoleLogger {
                    level: args.get::<String>(0)?.to_string(),
                })
            },
        ),
    )
}

#[test]
fn test_logger_cache_alias_scenario() {
    let container = ContainerBuilder::new()
        .register_type(console_logger())
        .define("Logger", Definition::class("ConsoleLogger", Params::new()))
        .define_str("Cache", "@Logger")
        .build();

    let cache = container.get("Cache").unwrap();
    let logger = container.get("Logger").unwrap();
    assert!(Arc::ptr_eq(&cache, &logger));
    assert_eq!(container.get_as::<ConsoleLogger>("Logger").unwrap().level, "info");
}

#[test]
fn test_singleton_per_identifier() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let container = ContainerBuilder::new()
        .register_type(TypeDef::concrete(
            "Counter",
            Constructor::new(vec![], move |_, _, _| Ok(counter.fetch_add(1, Ordering::SeqCst))),
        ))
        .class("Primary", "Counter", Params::new())
        .build();

    let a = container.get("Counter").unwrap();
    let b = container.get("Counter").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(built.load(Ordering::SeqCst), 1);

    // Another identifier of the same type is an independent instance.
    let primary = container.get("Primary").unwrap();
    assert!(Arc::ptr_eq(&primary, &container.get("Primary").unwrap()));
    assert!(!Arc::ptr_eq(&primary, &a));
    assert_eq!(built.load(Ordering::SeqCst), 2);

    let other = container.make("Counter", &Params::new()).unwrap();
    assert!(!Arc::ptr_eq(&other, &a));
    assert_eq!(built.load(Ordering::SeqCst), 3);
}

#[test]
fn test_alias_chain_resolves_to_terminal_instance() {
    let container = ContainerBuilder::new()
        .instance("Terminal", 7u32)
        .define_str("Middle", "@Terminal")
        .define_str("Front", "@Middle")
        .build();

    let front = container.get("Front").unwrap();
    assert!(Arc::ptr_eq(&front, &container.get("Front").unwrap()));
    assert!(Arc::ptr_eq(&front, &container.get("Terminal").unwrap()));
    assert!(Arc::ptr_eq(&front, &container.get("@Middle").unwrap()));
    assert_eq!(*container.get_as::<u32>("Front").unwrap(), 7);
}

#[test]
fn test_plain_class_name_definition_constructs_that_class() {
    let container = ContainerBuilder::new()
        .register_type(console_logger())
        .define_str("Logger", "ConsoleLogger")
        .define_str("ConsoleLogger", "ConsoleLogger")
        .build();

    let logger = container.get("Logger").unwrap();
    assert!(Arc::ptr_eq(&logger, &container.get("Logger").unwrap()));
    assert!(!Arc::ptr_eq(&logger, &container.get("ConsoleLogger").unwrap()));
    assert_eq!(container.get_as::<ConsoleLogger>("Logger").unwrap().level, "info");
}

#[test]
fn test_identifiers_sharing_a_class_are_independent() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let container = ContainerBuilder::new()
        .register_type(TypeDef::concrete(
            "Counter",
            Constructor::new(vec![], move |_, _, _| Ok(counter.fetch_add(1, Ordering::SeqCst))),
        ))
        .define_str("Hits", "Counter")
        .define_str("Misses", "Counter")
        .define_str("AlsoHits", "@Hits")
        .build();

    let hits = container.get("Hits").unwrap();
    let misses = container.get("Misses").unwrap();
    assert!(!Arc::ptr_eq(&hits, &misses));
    assert!(Arc::ptr_eq(&hits, &container.get("AlsoHits").unwrap()));
    assert_eq!(built.load(Ordering::SeqCst), 2);

    // Neither definition cached anything under the class name itself.
    let counter = container.get("Counter").unwrap();
    assert!(!Arc::ptr_eq(&counter, &hits));
    assert!(!Arc::ptr_eq(&counter, &misses));
    assert_eq!(built.load(Ordering::SeqCst), 3);
}

#[test]
fn test_not_found_cases() {
    let container = ContainerBuilder::new().build();

    assert_eq!(container.get("Missing").unwrap_err(), DiError::NotFound("Missing".into()));
    assert!(matches!(container.get("not a name"), Err(DiError::NotFound(_))));
    assert!(matches!(container.get("Missing#variant"), Err(DiError::NotFound(_))));
    assert!(matches!(container.make("Missing", &Params::new()), Err(DiError::NotFound(_))));
    assert!(!container.has("Missing"));
}

#[test]
fn test_has_does_not_construct() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let container = ContainerBuilder::new()
        .register_type(TypeDef::concrete(
            "Mailer",
            Constructor::new(vec![], move |_, _, _| Ok(counter.fetch_add(1, Ordering::SeqCst))),
        ))
        .register_type(TypeDef::interface("Transport"))
        .instance("Port", 25u16)
        .build();

    assert!(container.has("Mailer"));
    assert!(container.has("@Mailer"));
    assert!(container.has("Port"));
    assert!(!container.has("Transport"));
    assert_eq!(built.load(Ordering::SeqCst), 0);
}

#[test]
fn test_factory_definition_is_called_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let connect = Callable::new(
        "connect",
        vec![Param::typed("port", "Port")],
        move |_, args| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(format!("localhost:{}", args.get::<u16>(0)?))
        },
    );
    let container = ContainerBuilder::new()
        .instance("Port", 5432u16)
        .define("Dsn", Definition::factory(connect))
        .build();

    assert_eq!(&*container.get_as::<String>("Dsn").unwrap(), "localhost:5432");
    assert_eq!(&*container.get_as::<String>("Dsn").unwrap(), "localhost:5432");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_method_definition_uses_receiver_class() {
    struct Clock {
        offset: i64,
    }

    let base = TypeDef::interface("Clock").method(
        "now",
        Method::new(vec![Param::new("base").with_default(1_000i64)], |_, clock: Arc<Clock>, args| {
            Ok(*args.get::<i64>(0)? + clock.offset)
        }),
    );
    let utc = TypeDef::concrete(
        "UtcClock",
        Constructor::new(vec![Param::new("offset")], |_, _, args| {
            Ok(Clock {
                offset: *args.get::<i64>(0)?,
            })
        }),
    )
    .extends("Clock");

    let container = ContainerBuilder::new()
        .register_type(base)
        .register_type(utc)
        .class("Clock", "UtcClock", Params::new().with("offset", Arg::value(5i64)))
        .define_str("Now", "Clock::now")
        .define_str("Later", "Clock::later")
        .build();

    assert_eq!(*container.get_as::<i64>("Now").unwrap(), 1_005);
    assert_eq!(
        container.get("Later").unwrap_err(),
        DiError::NotFound("Clock::later".into())
    );
}

#[test]
fn test_typed_accessors_report_mismatch() {
    let container = ContainerBuilder::new().instance("Port", 80u16).build();
    assert!(matches!(container.get_as::<String>("Port"), Err(DiError::TypeMismatch(_))));
}

#[test]
fn test_runtime_define_before_first_get() {
    let container = ContainerBuilder::new().build();
    container.define("Region", Definition::instance("eu-west".to_string())).unwrap();
    container.define("Region", Definition::instance("us-east".to_string())).unwrap();
    assert_eq!(&*container.get_as::<String>("Region").unwrap(), "us-east");

    let err = container
        .define("Region", Definition::instance("ap-south".to_string()))
        .unwrap_err();
    assert!(matches!(err, DiError::Misuse(_)));
    assert_eq!(&*container.get_as::<String>("Region").unwrap(), "us-east");
}

#[test]
fn test_concurrent_get_yields_one_instance() {
    let container = ContainerBuilder::new()
        .register_type(console_logger())
        .build();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = container.clone();
            std::thread::spawn(move || container.get("ConsoleLogger").unwrap())
        })
        .collect();
    let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let first = container.get("ConsoleLogger").unwrap();
    for instance in &instances {
        assert!(Arc::ptr_eq(instance, &first));
    }
}
