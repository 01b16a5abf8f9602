use std::path::PathBuf;

use remix_common::PlannerDefaults;
use remix_graph::{generate_batch, transcoder_args};
use remix_model::{BatchRequest, Geometry};
use remix_planner::BatchState;

fn load_fixture(name: &str) -> BatchRequest {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("requests")
        .join(name);
    BatchRequest::load(path).expect("fixture request should load")
}

#[test]
fn grouped_fixture_compiles_every_variant() {
    let request = load_fixture("grouped-strict.json");
    assert!(request.issues().is_empty(), "{:?}", request.issues());

    let outcome =
        generate_batch(&request, &PlannerDefaults::default(), BatchState::default()).unwrap();
    let report = &outcome.report;

    assert_eq!(report.requested, 4);
    assert_eq!(report.variants.len(), 4);
    assert!(report.failures.is_empty());

    let orders: Vec<Vec<&str>> = report
        .variants
        .iter()
        .map(|v| v.clip_order.iter().map(String::as_str).collect())
        .collect();
    assert_eq!(orders[0], vec!["hook-1", "body-1", "cta-1"]);
    assert_eq!(orders[1], vec!["hook-2", "body-2", "cta-2"]);
    assert_eq!(orders[2], orders[0]);
    assert_eq!(orders[3], orders[1]);

    for variant in &report.variants {
        assert_eq!(variant.output_geometry, Some(Geometry::VERTICAL));
        assert!(variant.audio_present);
        assert!((variant.timeline_duration_secs - 12.0).abs() < 0.05);
        assert!(variant
            .output_args
            .contains(&"campaign=spring-launch".to_string()));
    }

    // body-2 has no audio stream and is replaced by generated silence.
    assert!(report.variants[1].compiled_graph_text.contains("anullsrc"));
    assert!(!report.variants[1].compiled_graph_text.contains("[1:a]"));
}

#[test]
fn report_serializes_with_camel_case_keys() {
    let request = load_fixture("grouped-strict.json");
    let outcome =
        generate_batch(&request, &PlannerDefaults::default(), BatchState::default()).unwrap();

    let json = serde_json::to_value(&outcome.report).unwrap();
    assert!(json["generatedAt"].is_string());
    assert_eq!(json["variants"][0]["variantId"], "variant-0001");
    assert!(json["variants"][0]["compiledGraphText"]
        .as_str()
        .unwrap()
        .contains("concat=n=3:v=1:a=1"));
}

#[test]
fn transcoder_args_list_one_input_per_slot() {
    let request = load_fixture("grouped-strict.json");
    let outcome =
        generate_batch(&request, &PlannerDefaults::default(), BatchState::default()).unwrap();

    let variant = &outcome.report.variants[0];
    let graph = remix_model::CompiledGraph {
        variant_id: variant.variant_id.clone(),
        graph_text: variant.compiled_graph_text.clone(),
        stream_count: variant.clip_order.len(),
        audio_present: variant.audio_present,
        inputs: variant.inputs.clone(),
        output_geometry: variant.output_geometry,
        output_args: variant.output_args.clone(),
        video_label: "outv".to_string(),
        audio_label: Some("outa".to_string()),
    };
    let args = transcoder_args(&graph, "out/variant-0001.mp4");

    assert_eq!(args.iter().filter(|a| *a == "-i").count(), 3);
    assert!(args.contains(&"sources/hook-1.mp4".to_string()));
    assert_eq!(args.last().map(String::as_str), Some("out/variant-0001.mp4"));
}

#[test]
fn state_carries_across_batches() {
    let request = load_fixture("grouped-strict.json");
    let settings = PlannerDefaults::default();

    let first = generate_batch(&request, &settings, BatchState::default()).unwrap();
    let second = generate_batch(&request, &settings, first.state).unwrap();

    assert_eq!(second.report.variants[0].variant_id, "variant-0005");
    assert_eq!(second.state.next_variant_index, 8);
}
