// ABOUTME: Integration tests for slot synthesis and declaration validation
// ABOUTME: Covers undeclared, unused and duplicate names, path checks and failure aggregation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{Product, ProductDao};
use sqlmapper::{
    build, BuildError, Dialect, ErrorCode, ExecResult, ExecSlot, FieldMap, MapperConfig,
    QuerySlot, SynthesisError, Synthesizer, UnusedParameterPolicy,
};

/// Finish a synthesizer whose slots were declared by `declare`
fn synthesize(
    config: MapperConfig,
    declare: impl FnOnce(&mut Synthesizer),
) -> Result<(), BuildError> {
    common::init_test_logging();
    let mut synthesizer = Synthesizer::new(Dialect::Sqlite).with_config(config);
    declare(&mut synthesizer);
    synthesizer.finish(())
}

/// Errors recorded for the single slot `name`
fn errors_for(result: Result<(), BuildError>, name: &str) -> Vec<SynthesisError> {
    let error = result.unwrap_err();
    error
        .failure(name)
        .unwrap_or_else(|| panic!("no failure recorded for {name}: {error}"))
        .errors
        .clone()
}

#[test]
fn test_product_dao_synthesizes_for_every_dialect() {
    common::init_test_logging();
    for dialect in [Dialect::Sqlite, Dialect::Postgres] {
        let dao: ProductDao = build(dialect).unwrap();
        assert!(dao.find_by_id.is_ready());
        assert!(dao.update_map.is_ready());
        assert_eq!(dao.find_by_id_slice.name(), "find_by_id_slice");
    }
}

#[test]
fn test_undeclared_parameter() {
    let result = synthesize(MapperConfig::default(), |s| {
        let _: QuerySlot<(String, f64), Vec<Product>> = s.query(
            "find",
            "select * from Product where name = :name: and qty = :qty:",
            &["name", "cost"],
        );
    });

    let errors = errors_for(result, "find");
    assert!(errors.contains(&SynthesisError::UndeclaredParameter { name: "qty".into() }));
    assert!(errors.contains(&SynthesisError::UnusedParameter {
        name: "cost".into()
    }));
}

#[test]
fn test_unused_parameter_is_an_error_by_default() {
    let result = synthesize(MapperConfig::default(), |s| {
        let _: QuerySlot<(String, f64), Vec<Product>> = s.query(
            "find",
            "select * from Product where cost = :cost:",
            &["name", "cost"],
        );
    });

    assert_eq!(
        errors_for(result, "find"),
        [SynthesisError::UnusedParameter {
            name: "name".into()
        }]
    );
}

#[test]
fn test_unused_parameter_policy_warn() {
    let config = MapperConfig {
        unused_parameters: UnusedParameterPolicy::Warn,
        ..MapperConfig::default()
    };
    let result = synthesize(config, |s| {
        let slot: QuerySlot<(String, f64), Vec<Product>> = s.query(
            "find",
            "select * from Product where cost = :cost:",
            &["name", "cost"],
        );
        assert!(slot.is_ready());
    });

    assert!(result.is_ok());
}

#[test]
fn test_positional_templates_ignore_declared_names() {
    let result = synthesize(MapperConfig::default(), |s| {
        let _: QuerySlot<(String, f64), Vec<Product>> = s.query(
            "find",
            "select * from Product where name = :$1: and cost = :$2:",
            &["unrelated"],
        );
    });

    assert!(result.is_ok());
}

#[test]
fn test_arity_and_duplicate_names() {
    let result = synthesize(MapperConfig::default(), |s| {
        let _: QuerySlot<(i64,), Product> =
            s.query("arity", "select * from Product where id = :id:", &["id", "name"]);
        let _: QuerySlot<(i64, i64), Vec<Product>> = s.query(
            "duplicate",
            "select * from Product where id between :id: and :id:",
            &["id", "id"],
        );
    });
    let error = result.unwrap_err();

    let arity = &error.failure("arity").unwrap().errors;
    assert!(arity.contains(&SynthesisError::ArityMismatch {
        declared: 2,
        arguments: 1
    }));

    let duplicate = &error.failure("duplicate").unwrap().errors;
    assert_eq!(
        duplicate,
        &[SynthesisError::DuplicateParameter { name: "id".into() }]
    );
}

#[test]
fn test_record_path_checks() {
    let result = synthesize(MapperConfig::default(), |s| {
        let _: ExecSlot<(Product,), u64> = s.exec(
            "unknown_field",
            "update Product set qty = :p.qty: where id = :p.id:",
            &["p"],
        );
        let _: ExecSlot<(Product,), u64> = s.exec(
            "whole_record",
            "update Product set name = :p: where id = :p.id:",
            &["p"],
        );
        let _: QuerySlot<(i64,), Product> = s.query(
            "scalar_path",
            "select * from Product where id = :id.value:",
            &["id"],
        );
        let _: ExecSlot<(FieldMap,), u64> = s.exec(
            "deep_map",
            "update Product set name = :p.Name.first: where id = :p.Id:",
            &["p"],
        );
    });
    let error = result.unwrap_err();

    assert_eq!(
        error.failure("unknown_field").unwrap().errors,
        [SynthesisError::UnknownField {
            parameter: "p".into(),
            field: "qty".into()
        }]
    );
    assert_eq!(
        error.failure("whole_record").unwrap().errors,
        [SynthesisError::NotBindable {
            parameter: "p".into(),
            shape: "record"
        }]
    );
    assert_eq!(
        error.failure("scalar_path").unwrap().errors,
        [SynthesisError::NotAddressable {
            parameter: "id".into(),
            shape: "scalar",
            field: "value".into()
        }]
    );
    assert_eq!(
        error.failure("deep_map").unwrap().errors,
        [SynthesisError::NotAddressable {
            parameter: "p.Name".into(),
            shape: "map value",
            field: "first".into()
        }]
    );
}

#[test]
fn test_incompatible_result_shapes() {
    let result = synthesize(MapperConfig::default(), |s| {
        let _: QuerySlot<(i64,), u64> =
            s.query("query_count", "select * from Product where id = :id:", &["id"]);
        let _: ExecSlot<(i64,), Product> =
            s.exec("exec_record", "delete from Product where id = :id:", &["id"]);
        let _: ExecSlot<(i64,), ExecResult> =
            s.exec("exec_ok", "delete from Product where id = :id:", &["id"]);
    });
    let error = result.unwrap_err();

    assert_eq!(
        error.failure("query_count").unwrap().errors,
        [SynthesisError::IncompatibleResultShape {
            capability: "query",
            shape: "an affected-row count"
        }]
    );
    assert_eq!(
        error.failure("exec_record").unwrap().errors,
        [SynthesisError::IncompatibleResultShape {
            capability: "exec",
            shape: "a record"
        }]
    );
    assert!(error.failure("exec_ok").is_none());
}

#[test]
fn test_positional_marker_out_of_range() {
    let result = synthesize(MapperConfig::default(), |s| {
        let _: QuerySlot<(String,), Vec<Product>> = s.query(
            "find",
            "select * from Product where name = :$1: and cost = :$3:",
            &[],
        );
    });

    assert_eq!(
        errors_for(result, "find"),
        [SynthesisError::PositionOutOfRange {
            position: 3,
            arguments: 1
        }]
    );
}

#[test]
fn test_malformed_templates() {
    let result = synthesize(MapperConfig::default(), |s| {
        let _: QuerySlot<(i64,), Product> =
            s.query("unterminated", "select * from Product where id = :id", &["id"]);
        let _: QuerySlot<(i64, i64), Vec<Product>> = s.query(
            "mixed",
            "select * from Product where id = :id: or id = :$2:",
            &["id", "other"],
        );
    });
    let error = result.unwrap_err();

    assert!(matches!(
        error.failure("unterminated").unwrap().errors[..],
        [SynthesisError::UnterminatedMarker { .. }]
    ));
    assert_eq!(
        error.failure("mixed").unwrap().errors,
        [SynthesisError::MixedMarkerStyles]
    );
}

#[test]
fn test_failures_are_aggregated_across_slots() {
    let result = synthesize(MapperConfig::default(), |s| {
        let _: QuerySlot<(i64,), Product> =
            s.query("good", "select * from Product where id = :id:", &["id"]);
        let _: QuerySlot<(i64,), Product> =
            s.query("bad_name", "select * from Product where id = :key:", &["id"]);
        let _: ExecSlot<(i64,), Product> =
            s.exec("bad_shape", "delete from Product where id = :id:", &["id"]);
    });
    let error = result.unwrap_err();

    assert_eq!(error.dialect, "SQLite");
    let slots: Vec<&str> = error.failures.iter().map(|f| f.slot.as_str()).collect();
    assert_eq!(slots, ["bad_name", "bad_shape"]);
    assert!(error.failure("good").is_none());

    let codes: Vec<ErrorCode> = error.errors().map(SynthesisError::code).collect();
    assert!(codes.contains(&ErrorCode::TemplateInvalid));
    assert!(codes.contains(&ErrorCode::ShapeInvalid));

    let message = error.to_string();
    assert!(message.contains("2 slot(s)"));
    assert!(message.contains("bad_name"));
    assert!(message.contains("'key' is referenced by the template but not declared"));
}

#[test]
fn test_shared_templates_are_parsed_once() {
    common::init_test_logging();
    let mut synthesizer = Synthesizer::new(Dialect::Postgres);

    let by_id: QuerySlot<(i64,), Product> =
        synthesizer.query("by_id", "select * from Product where id = :id:", &["id"]);
    let by_id_map: QuerySlot<(i64,), FieldMap> =
        synthesizer.query("by_id_map", "select * from Product where id = :id:", &["id"]);
    let by_name: QuerySlot<(String,), Vec<Product>> =
        synthesizer.query("by_name", "select * from Product where name = :name:", &["name"]);
    assert_eq!(synthesizer.parsed_templates(), 2);

    let (by_id, by_id_map, _by_name) = synthesizer.finish((by_id, by_id_map, by_name)).unwrap();
    assert_eq!(
        by_id.render(&(4,)).unwrap().sql,
        by_id_map.render(&(4,)).unwrap().sql
    );
}
