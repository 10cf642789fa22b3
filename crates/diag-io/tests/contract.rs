//! Wire-level tests of the `/api/diagonalize` JSON contract.

use diag_engine::{DiagonalizationEngine, EngineConfig};
use diag_io::{NOT_DIAGONALIZABLE_MESSAGE, handle_request};
use serde_json::{Value, json};

fn post(body: Value) -> (u16, Value) {
    post_with(body, &DiagonalizationEngine::default())
}

fn post_with(body: Value, engine: &DiagonalizationEngine) -> (u16, Value) {
    let bytes = serde_json::to_vec(&body).expect("serialize request");
    let response = handle_request(&bytes, engine);
    let value = serde_json::to_value(&response.body).expect("serialize response");
    (response.status, value)
}

#[test]
fn real_example_wire_format() {
    let (status, body) = post(json!({ "matrix": [[4, 1], [2, 3]] }));
    assert_eq!(status, 200);
    assert_eq!(body["diagonalizable"], json!(true));
    assert_eq!(body["D"], json!([[5, 0], [0, 2]]));
    assert_eq!(body["P"], json!([[0.7071, -0.4472], [0.7071, 0.8944]]));
    assert_eq!(body["verification"], json!([[4, 1], [2, 3]]));
    assert_eq!(body["original"], json!([[4, 1], [2, 3]]));
    assert!(body["P_inv"].is_array());
}

#[test]
fn complex_example_wire_format() {
    let (status, body) = post(json!({ "matrix": [[0, -1], [1, 0]] }));
    assert_eq!(status, 200);
    assert_eq!(body["D"], json!([["0+1i", 0], [0, "0-1i"]]));
    assert_eq!(body["verification"], json!([[0, -1], [1, 0]]));
    // Leading entry of each eigenvector is the real positive anchor
    assert_eq!(body["P"][0][0], json!(0.7071));
    assert_eq!(body["P"][0][1], json!(0.7071));
}

#[test]
fn diagonal_ui_examples_reproduce_their_diagonal() {
    for n in 3..=5usize {
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { (i + 1) as f64 } else { 0.0 }).collect())
            .collect();
        let (status, body) = post(json!({ "matrix": rows }));
        assert_eq!(status, 200);
        let d = body["D"].as_array().expect("D is an array");
        for (k, row) in d.iter().enumerate() {
            // Descending eigenvalue order
            assert_eq!(row[k], json!(n - k));
        }
        assert_eq!(body["verification"], body["original"]);
    }
}

#[test]
fn not_diagonalizable_wire_format() {
    let (status, body) = post(json!({ "matrix": [[1, 1], [0, 1]] }));
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({ "diagonalizable": false, "message": NOT_DIAGONALIZABLE_MESSAGE })
    );
}

#[test]
fn error_bodies() {
    let cases = [
        (json!({}), "No matrix provided"),
        (json!({ "matrix": null }), "No matrix provided"),
        (json!({ "matrix": [[1, 2]] }), "Matrix must be square"),
        (json!({ "matrix": [[1, "x"], [0, 1]] }), "Invalid JSON"),
        (json!([1, 2, 3]), "Invalid JSON"),
    ];
    for (request, prefix) in cases {
        let (status, body) = post(request);
        assert_eq!(status, 400);
        let message = body["error"].as_str().expect("error message");
        assert!(message.starts_with(prefix), "{message}");
    }
}

#[test]
fn size_limit_follows_configuration() {
    let engine = DiagonalizationEngine::new(EngineConfig {
        max_dimension: 5,
        ..Default::default()
    });
    let rows: Vec<Vec<f64>> = (0..6).map(|_| vec![0.0; 6]).collect();
    let (status, body) = post_with(json!({ "matrix": rows }), &engine);
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "Matrix size must be between 1 and 5" }));
}
