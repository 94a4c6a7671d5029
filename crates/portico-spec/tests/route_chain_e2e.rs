//! End-to-end tests driving a composed route chain the way a router would:
//! build the chain once with `with_route_spec`, then run requests through it
//! with `run_chain`.

use bytes::Bytes;
use http::{Method, StatusCode};
use portico_core::middleware::{run_chain, BoxFuture, BoxedMiddleware};
use portico_core::schema::{FieldRule, FieldSchema, ValidationTarget};
use portico_core::{Params, Request, Response, RouteContext};
use portico_docs::{DocsRegistry, OpenApiGenerator};
use portico_spec::{with_route_spec, MediaSpec, ResponseSpec, RouteSpec};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn json_response(status: StatusCode, body: &Value) -> Response {
    http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Bytes::from(body.to_string()))
        .unwrap()
}

/// Builds the chain for `POST /items`: JSON body with a required name, a
/// query count of at least one, and a validated success response. The
/// returned flag records whether the handler ran.
fn items_chain(registry: &Arc<DocsRegistry>) -> (Vec<BoxedMiddleware>, Arc<AtomicBool>) {
    let invoked = Arc::new(AtomicBool::new(false));
    let seen = invoked.clone();

    let spec = RouteSpec::builder()
        .summary("Create an item")
        .body(
            FieldSchema::builder()
                .required("name", FieldRule::non_empty_string())
                .build(),
        )
        .query(
            FieldSchema::builder()
                .required("count", FieldRule::integer_min(1))
                .build(),
        )
        .response(
            200,
            ResponseSpec::new("Created").json(MediaSpec::validated_fields(
                FieldSchema::builder()
                    .required("success", FieldRule::boolean_literal(true))
                    .required("count", FieldRule::integer())
                    .required("name", FieldRule::string())
                    .build(),
            )),
        )
        .build();

    let chain = with_route_spec(
        registry,
        Method::POST,
        "/items",
        spec,
        move |ctx: &mut RouteContext, _request: Request| -> BoxFuture<'static, Response> {
            seen.store(true, Ordering::SeqCst);
            let count = ctx
                .valid(ValidationTarget::Query)
                .and_then(|v| v["count"].as_i64())
                .unwrap_or(0);
            let name = ctx
                .valid(ValidationTarget::Body)
                .and_then(|v| v["name"].as_str())
                .unwrap_or("")
                .to_string();
            Box::pin(async move {
                json_response(
                    StatusCode::OK,
                    &json!({"success": true, "count": count, "name": name}),
                )
            })
        },
    );

    (chain, invoked)
}

#[tokio::test]
async fn test_valid_request_flows_through_every_stage() {
    let registry = Arc::new(DocsRegistry::new());
    let (chain, invoked) = items_chain(&registry);

    let request = http::Request::builder()
        .method(Method::POST)
        .uri("/items?count=2")
        .body(Bytes::from_static(br#"{"name":"Widget"}"#))
        .unwrap();

    let mut ctx = RouteContext::new();
    let response = run_chain(&chain, &mut ctx, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(invoked.load(Ordering::SeqCst));

    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body, json!({"success": true, "count": 2, "name": "Widget"}));
}

#[tokio::test]
async fn test_invalid_query_rejected_before_handler() {
    let registry = Arc::new(DocsRegistry::new());
    let (chain, invoked) = items_chain(&registry);

    let request = http::Request::builder()
        .method(Method::POST)
        .uri("/items?count=abc")
        .body(Bytes::from_static(br#"{"name":"Widget"}"#))
        .unwrap();

    let mut ctx = RouteContext::new();
    let response = run_chain(&chain, &mut ctx, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!invoked.load(Ordering::SeqCst));

    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_invalid_body_rejected_before_query_runs() {
    let registry = Arc::new(DocsRegistry::new());
    let (chain, invoked) = items_chain(&registry);

    // Body stage runs first; its failure wins even though the query is also bad.
    let request = http::Request::builder()
        .method(Method::POST)
        .uri("/items?count=abc")
        .body(Bytes::from_static(br#"{"name":""}"#))
        .unwrap();

    let mut ctx = RouteContext::new();
    let response = run_chain(&chain, &mut ctx, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!invoked.load(Ordering::SeqCst));

    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["error"]["issues"][0]["path"][0], "name");
}

#[tokio::test]
async fn test_handler_breaking_response_contract_yields_opaque_500() {
    let registry = Arc::new(DocsRegistry::new());

    let spec = RouteSpec::builder()
        .response(
            200,
            ResponseSpec::new("Success").json(MediaSpec::validated_fields(
                FieldSchema::builder()
                    .required("ok", FieldRule::boolean_literal(true))
                    .build(),
            )),
        )
        .build();

    let chain = with_route_spec(
        &registry,
        Method::GET,
        "/status",
        spec,
        |_ctx: &mut RouteContext, _request: Request| -> BoxFuture<'static, Response> {
            Box::pin(async { json_response(StatusCode::OK, &json!({"ok": false})) })
        },
    );

    let request = http::Request::builder()
        .uri("/status")
        .body(Bytes::new())
        .unwrap();

    let mut ctx = RouteContext::new();
    let response = run_chain(&chain, &mut ctx, request).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = std::str::from_utf8(response.body()).unwrap();
    assert!(text.contains("Response validation failed!"));
    // The declared schema and the offending value stay out of the client body.
    assert!(!text.contains("false"));
}

#[tokio::test]
async fn test_path_params_coerced_and_bounded() {
    let registry = Arc::new(DocsRegistry::new());

    let spec = RouteSpec::builder()
        .params(
            FieldSchema::builder()
                .required("id", FieldRule::integer_min(1))
                .build(),
        )
        .build();

    let chain = with_route_spec(
        &registry,
        Method::GET,
        "/items/{id}",
        spec,
        |ctx: &mut RouteContext, _request: Request| -> BoxFuture<'static, Response> {
            let id = ctx
                .valid(ValidationTarget::Params)
                .and_then(|v| v["id"].as_i64())
                .unwrap_or(0);
            Box::pin(async move { json_response(StatusCode::OK, &json!({"id": id})) })
        },
    );

    let run = |raw_id: &'static str, chain: Vec<BoxedMiddleware>| async move {
        let request = http::Request::builder()
            .uri(format!("/items/{raw_id}"))
            .body(Bytes::new())
            .unwrap();
        let mut params = Params::new();
        params.push("id", raw_id);
        let mut ctx = RouteContext::with_path_params(params);
        run_chain(&chain, &mut ctx, request).await
    };

    let rejected = run("0", chain.clone()).await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    let accepted = run("42", chain).await;
    assert_eq!(accepted.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(accepted.body()).unwrap();
    assert_eq!(body, json!({"id": 42}));
}

#[tokio::test]
async fn test_undeclared_response_status_passes_through() {
    let registry = Arc::new(DocsRegistry::new());

    let spec = RouteSpec::builder()
        .response(
            200,
            ResponseSpec::new("Success").json(MediaSpec::validated_fields(
                FieldSchema::any_object(),
            )),
        )
        .build();

    let chain = with_route_spec(
        &registry,
        Method::GET,
        "/maybe",
        spec,
        |_ctx: &mut RouteContext, _request: Request| -> BoxFuture<'static, Response> {
            Box::pin(async {
                json_response(StatusCode::NOT_FOUND, &json!({"anything": "goes"}))
            })
        },
    );

    let request = http::Request::builder()
        .uri("/maybe")
        .body(Bytes::new())
        .unwrap();

    let mut ctx = RouteContext::new();
    let response = run_chain(&chain, &mut ctx, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body, json!({"anything": "goes"}));
}

#[tokio::test]
async fn test_multiple_targets_validated_independently() {
    let registry = Arc::new(DocsRegistry::new());

    let spec = RouteSpec::builder()
        .headers(
            FieldSchema::builder()
                .required("x-api-version", FieldRule::integer())
                .build(),
        )
        .cookies(
            FieldSchema::builder()
                .required("session", FieldRule::non_empty_string())
                .build(),
        )
        .build();

    let chain = with_route_spec(
        &registry,
        Method::GET,
        "/whoami",
        spec,
        |ctx: &mut RouteContext, _request: Request| -> BoxFuture<'static, Response> {
            let version = ctx
                .valid(ValidationTarget::Headers)
                .and_then(|v| v["x-api-version"].as_i64())
                .unwrap_or(0);
            let session = ctx
                .valid(ValidationTarget::Cookies)
                .and_then(|v| v["session"].as_str())
                .unwrap_or("")
                .to_string();
            Box::pin(async move {
                json_response(StatusCode::OK, &json!({"version": version, "session": session}))
            })
        },
    );

    let request = http::Request::builder()
        .uri("/whoami")
        .header("x-api-version", "3")
        .header(http::header::COOKIE, "session=abc; theme=dark")
        .body(Bytes::new())
        .unwrap();

    let mut ctx = RouteContext::new();
    let response = run_chain(&chain, &mut ctx, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body, json!({"version": 3, "session": "abc"}));

    // Missing cookie fails even when the header target is satisfied.
    let request = http::Request::builder()
        .uri("/whoami")
        .header("x-api-version", "3")
        .body(Bytes::new())
        .unwrap();
    let mut ctx = RouteContext::new();
    let response = run_chain(&chain, &mut ctx, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_registered_route_appears_in_generated_documentation() {
    let registry = Arc::new(DocsRegistry::new());

    let spec = RouteSpec::builder()
        .summary("List products")
        .tag("catalog")
        .query(
            FieldSchema::builder()
                .optional("count", FieldRule::integer_min(1))
                .build(),
        )
        .response(
            200,
            ResponseSpec::new("A page of products").json(
                MediaSpec::documented(json!({"type": "array"}))
                    .example(json!([{"name": "Widget"}])),
            ),
        )
        .build();

    let _chain = with_route_spec(
        &registry,
        Method::GET,
        "/products/{category}",
        spec,
        |_ctx: &mut RouteContext, _request: Request| -> BoxFuture<'static, Response> {
            Box::pin(async { json_response(StatusCode::OK, &json!([])) })
        },
    );

    let document = OpenApiGenerator::new()
        .title("Catalog")
        .version("1.0.0")
        .generate(&registry)
        .unwrap();

    let item = document.paths.get("/products/{category}").unwrap();
    let operation = item.get.as_ref().unwrap();
    assert_eq!(operation.summary.as_deref(), Some("List products"));
    assert_eq!(operation.tags, vec!["catalog".to_string()]);
    assert!(operation.responses.contains_key("200"));

    // The path template contributes a required path parameter.
    let params = &operation.parameters;
    assert!(params.iter().any(|p| p.name == "category" && p.required));
}

#[tokio::test]
async fn test_composition_not_requests_writes_documentation() {
    let registry = Arc::new(DocsRegistry::new());
    let (chain, _invoked) = items_chain(&registry);
    assert_eq!(registry.len(), 1);

    for _ in 0..3 {
        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/items?count=1")
            .body(Bytes::from_static(br#"{"name":"Widget"}"#))
            .unwrap();
        let mut ctx = RouteContext::new();
        let _ = run_chain(&chain, &mut ctx, request).await;
    }

    // Serving traffic never grows the registry.
    assert_eq!(registry.len(), 1);
}
