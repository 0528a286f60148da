mod common;

use std::path::Path;

use codegen::WritePolicy;
use config::GenerationFlags;
use logging::NullSink;
use pipeline::{plan, ArtifactKind, PipelineError, PlanBuilder};

use common::*;

#[test]
fn test_core_units_by_default() {
    let ctx = context(service(&["// @microgen"], vec![count_method(&[])]), flags());
    let plan = plan(&ctx, &NullSink).expect("plan");
    assert_eq!(
        plan.kinds(),
        vec![ArtifactKind::Exchanges, ArtifactKind::Endpoints, ArtifactKind::EndpointsClient]
    );
}

#[test]
fn test_nothing_requested_is_an_empty_plan() {
    let flags = GenerationFlags { emit_core: false, ..Default::default() };
    let ctx = context(service(&["// @microgen"], vec![count_method(&[])]), flags);
    let plan = plan(&ctx, &NullSink).expect("empty plan is not an error");
    assert!(plan.is_empty());
}

#[test]
fn test_everything_requested_follows_catalog_order() {
    let flags = GenerationFlags {
        protocol_package: "acme.strings".to_string(),
        emit_entry_point: true,
        ..flags()
    };
    let iface = service(
        &[
            "// @microgen transport, recovering, logging",
            "// @microgen error-logging main",
            &format!("// @protobuf {}", PROTOBUF),
        ],
        vec![count_method(&[])],
    );
    let ctx = context(iface, flags);
    let plan = plan(&ctx, &NullSink).expect("plan");
    assert_eq!(plan.kinds(), ArtifactKind::CATALOG.to_vec());

    let position = |kind| plan.kinds().iter().position(|k| *k == kind).expect("planned");
    assert!(position(ArtifactKind::Exchanges) < position(ArtifactKind::Endpoints));
    assert!(position(ArtifactKind::Endpoints) < position(ArtifactKind::GrpcServer));
    assert!(position(ArtifactKind::HttpServer) < position(ArtifactKind::HttpClient));
}

#[test]
fn test_tags_select_transport_units() {
    let iface = service(
        &["// @microgen http-client", "// @microgen middleware"],
        vec![count_method(&[])],
    );
    let flags = GenerationFlags { emit_core: false, ..flags() };
    let plan = plan(&context(iface, flags), &NullSink).expect("plan");
    assert_eq!(
        plan.kinds(),
        vec![ArtifactKind::Middleware, ArtifactKind::HttpConverters, ArtifactKind::HttpClient]
    );
}

#[test]
fn test_prerequisites_are_aggregated() {
    let flags = GenerationFlags {
        import_package: String::new(),
        protocol_package: "acme..strings".to_string(),
        ..Default::default()
    };
    let iface = service(&["// @microgen grpc"], vec![count_method(&[])]);
    let err = plan(&context(iface, flags), &NullSink).expect_err("prerequisites missing");

    let planning = match err {
        PipelineError::Planning(planning) => planning,
        other => panic!("expected a planning error, got {other:?}"),
    };
    let failures = planning.failures();
    // three core units and four gRPC units miss the import package, the gRPC
    // units also miss @protobuf, and the protocol package is malformed
    assert_eq!(failures.len(), 12);
    assert_eq!(failures[0].kind, ArtifactKind::Exchanges);
    assert!(failures
        .iter()
        .any(|f| f.kind == ArtifactKind::ProtocolDefinition
            && f.reason.contains("invalid protocol package")));
    assert_eq!(
        failures.iter().filter(|f| f.reason.contains("@protobuf")).count(),
        4
    );
    assert!(planning.to_string().starts_with("cannot plan generation:"));
}

#[test]
fn test_inactive_units_are_not_checked() {
    let flags = GenerationFlags { emit_core: false, ..Default::default() };
    let iface = service(&["// @microgen"], vec![count_method(&[])]);
    assert!(plan(&context(iface, flags), &NullSink).expect("plan").is_empty());
}

#[test]
fn test_units_are_deduplicated() {
    let ctx = context(service(&["// @microgen"], vec![count_method(&[])]), flags());
    let plan = PlanBuilder::new(&ctx)
        .candidate(ArtifactKind::Exchanges)
        .candidate(ArtifactKind::Exchanges)
        .catalog()
        .build()
        .expect("plan");
    assert_eq!(plan.len(), 3);
}

#[test]
fn test_unit_paths_and_policies() {
    let flags = GenerationFlags {
        protocol_package: "acme.strings".to_string(),
        emit_entry_point: true,
        output_dir: "out".into(),
        ..flags()
    };
    let iface = service(
        &["// @microgen grpc", &format!("// @protobuf {}", PROTOBUF)],
        vec![count_method(&[])],
    );
    let ctx = context(iface, flags);
    let plan = plan(&ctx, &NullSink).expect("plan");
    let unit = |kind| plan.iter().find(|u| u.kind() == kind).expect("planned").clone();

    let proto = unit(ArtifactKind::ProtocolDefinition);
    assert_eq!(proto.logical_path(), Path::new("string_service.proto"));
    assert_eq!(proto.policy(), WritePolicy::CreateIfAbsent);

    let main = unit(ArtifactKind::EntryPoint);
    assert_eq!(main.output_path(&ctx), Path::new("out/cmd/string_service/main.go"));
    assert_eq!(main.policy(), WritePolicy::CreateIfAbsent);

    let converters = unit(ArtifactKind::GrpcTypeConverters);
    assert_eq!(converters.policy(), WritePolicy::MergePreserving);
    assert_eq!(
        converters.logical_path(),
        Path::new("transport/grpc/protobuf_type_converters.microgen.go")
    );
}
