#![cfg(feature = "config")]

use ferrous_wire::{Constructor, ContainerBuilder, DiError, Param, TypeDef};
use std::sync::Arc;

struct ConsoleLogger {
    level: String,
    retries: i64,
}

fn console_logger() -> TypeDef {
    TypeDef::concrete(
        "ConsoleLogger",
        Constructor::new(
            vec![Param::new("level"), Param::new("retries").with_default(0i64)],
            |_, _, args| {
                Ok(ConsoleLogger {
                    level: args.get::<String>(0)?.to_string(),
                    retries: *args.get::<i64>(1)?,
                })
            },
        ),
    )
}

#[test]
fn test_json_bootstrap() {
    let container = ContainerBuilder::new()
        .register_type(console_logger())
        .definitions_from_json(
            r#"{
                "Logger": {
                    "class": "ConsoleLogger",
                    "params": { "level": "debug", "retries": 3 }
                },
                "Cache": "@Logger"
            }"#,
        )
        .unwrap()
        .build();

    let logger = container.get_as::<ConsoleLogger>("Logger").unwrap();
    assert_eq!(logger.level, "debug");
    assert_eq!(logger.retries, 3);
    assert!(Arc::ptr_eq(&container.get("Cache").unwrap(), &container.get("Logger").unwrap()));
}

#[test]
fn test_yaml_bootstrap_with_references() {
    let container = ContainerBuilder::new()
        .register_type(console_logger())
        .instance("Level#verbose", "trace".to_string())
        .definitions_from_yaml(
            concat!(
                "Audit:\n",
                "  class: ConsoleLogger\n",
                "  params:\n",
                "    level: '@Level#verbose'\n",
                "DefaultLevel: '@Level#verbose'\n",
            ),
        )
        .unwrap()
        .build();

    let audit = container.get_as::<ConsoleLogger>("Audit").unwrap();
    assert_eq!(audit.level, "trace");
    assert_eq!(audit.retries, 0);
    assert_eq!(&*container.get_as::<String>("DefaultLevel").unwrap(), "trace");
}

#[test]
fn test_invalid_documents() {
    assert!(matches!(
        ContainerBuilder::new().definitions_from_json("[1, 2]"),
        Err(DiError::Config(_))
    ));

    let err = ContainerBuilder::new()
        .definitions_from_json(r#"{"Broken": "not an identifier"}"#)
        .unwrap()
        .try_build()
        .unwrap_err();
    assert_eq!(err, DiError::NotFound("not an identifier".into()));
}
