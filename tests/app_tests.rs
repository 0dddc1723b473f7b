//! The tutorial endpoints driven through the in-process dispatcher.

use http::Method;
use paramgate::app::build_dispatcher;
use paramgate::dispatcher::{Dispatcher, IncomingRequest, Outcome, RequestState};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

fn dispatcher() -> Dispatcher {
    build_dispatcher().unwrap()
}

fn get(d: &Dispatcher, target: &str) -> Outcome {
    d.dispatch(&IncomingRequest::new(Method::GET, target))
}

fn send(d: &Dispatcher, method: Method, target: &str, body: &Value) -> Outcome {
    d.dispatch(&IncomingRequest::new(method, target).with_json(body))
}

fn detail(outcome: &Outcome) -> &Vec<Value> {
    outcome.response.body["detail"].as_array().unwrap()
}

fn item() -> Value {
    json!({ "name": "Foo", "price": 35.4 })
}

#[test]
fn test_root() {
    let out = get(&dispatcher(), "/");
    assert_eq!(out.state, RequestState::Dispatched);
    assert_eq!(out.response.status, 200);
    assert_eq!(out.response.body, json!({ "message": "Hello World" }));
}

#[test]
fn test_create_item_returns_validated_item() {
    let body = json!({
        "name": "Foo",
        "description": "A very nice Item",
        "price": 35.4,
        "tax": 3.2,
        "tags": ["rock", "metal", "rock"],
        "images": [{ "url": "http://example.com/baz.jpg", "name": "The Foo live" }],
        "unknown": true
    });
    let out = send(&dispatcher(), Method::POST, "/items/?extra_param=x", &body);
    assert_eq!(out.response.status, 200);
    assert_eq!(
        out.response.body,
        json!({
            "name": "Foo",
            "description": "A very nice Item",
            "price": 35.4,
            "tax": 3.2,
            "tags": ["metal", "rock"],
            "images": [{ "url": "http://example.com/baz.jpg", "name": "The Foo live" }]
        })
    );
}

#[test]
fn test_create_item_fills_defaults() {
    let out = send(&dispatcher(), Method::POST, "/items/", &item());
    assert_eq!(out.response.status, 200);
    assert_eq!(
        out.response.body,
        json!({
            "name": "Foo",
            "description": null,
            "price": 35.4,
            "tax": null,
            "tags": [],
            "images": null
        })
    );
}

#[test]
fn test_create_item_reports_every_nested_leaf() {
    let body = json!({
        "price": 0,
        "description": "d".repeat(301),
        "images": [
            { "url": "http://ok.example/a.png", "name": "fine" },
            { "url": "not a url" }
        ]
    });
    let out = send(&dispatcher(), Method::POST, "/items/", &body);
    assert_eq!(out.state, RequestState::Rejected);
    assert_eq!(out.response.status, 422);

    let locs: Vec<&Value> = detail(&out).iter().map(|e| &e["loc"]).collect();
    assert!(locs.contains(&&json!(["body", "name"])));
    assert!(locs.contains(&&json!(["body", "description"])));
    assert!(locs.contains(&&json!(["body", "price"])));
    assert!(locs.contains(&&json!(["body", "images", 1, "url"])));
    assert!(locs.contains(&&json!(["body", "images", 1, "name"])));
    assert_eq!(detail(&out).len(), 5);
}

#[test]
fn test_create_item_without_body() {
    let out = get(&dispatcher(), "/items/");
    assert_eq!(out.response.status, 405);

    let out = dispatcher().dispatch(&IncomingRequest::new(Method::POST, "/items/"));
    assert_eq!(out.response.status, 422);
    let errors = detail(&out);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["type"], "missing");
    assert_eq!(errors[0]["loc"], json!(["body"]));
}

#[test]
fn test_create_item_null_body_is_missing() {
    let out = send(&dispatcher(), Method::POST, "/items/", &Value::Null);
    assert_eq!(out.response.status, 422);
    let errors = detail(&out);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["type"], "missing");
    assert_eq!(errors[0]["loc"], json!(["body"]));
}

#[test]
fn test_create_item_large_distinct_tag_set() {
    let tags: Vec<String> = (0..60_000).map(|i| format!("tag-{i}")).collect();
    let body = json!({ "name": "Bulk", "price": 1.0, "tags": tags });
    let started = Instant::now();
    let out = send(&dispatcher(), Method::POST, "/items/", &body);
    let elapsed = started.elapsed();

    assert_eq!(out.response.status, 200);
    assert_eq!(out.response.body["tags"].as_array().unwrap().len(), 60_000);
    assert!(elapsed < Duration::from_secs(3), "took {elapsed:?}");
}

#[test]
fn test_create_item_rejects_array_body() {
    let out = send(&dispatcher(), Method::POST, "/items/", &json!([1, 2]));
    assert_eq!(out.response.status, 422);
    assert_eq!(detail(&out)[0]["type"], "model_type");
    assert_eq!(detail(&out)[0]["loc"], json!(["body"]));
}

#[test]
fn test_get_model_messages() {
    let d = dispatcher();
    let cases = [
        ("alexnet", "Deep learning FTW!"),
        ("lenet", "LeCNN all the images"),
        ("resnet", ""),
    ];
    for (name, message) in cases {
        let out = get(&d, &format!("/models/{name}"));
        assert_eq!(out.response.status, 200, "model {name}");
        assert_eq!(
            out.response.body,
            json!({ "model_name": name, "message": message })
        );
    }
}

#[test]
fn test_get_model_outside_enum() {
    let out = get(&dispatcher(), "/models/vgg");
    assert_eq!(out.response.status, 422);
    let err = &detail(&out)[0];
    assert_eq!(err["type"], "enum");
    assert_eq!(err["loc"], json!(["path", "model_name"]));
    assert_eq!(err["input"], "vgg");
    assert_eq!(err["ctx"]["expected"], "'alexnet', 'resnet' or 'lenet'");
}

#[test]
fn test_read_item_defaults() {
    let out = get(&dispatcher(), "/items/5");
    assert_eq!(out.response.status, 200);
    assert_eq!(
        out.response.body,
        json!({ "item_id": 5, "skip": 0, "limit": 10, "my_bool": false })
    );
}

#[test]
fn test_read_item_bool_vocabulary() {
    let d = dispatcher();
    for token in ["yes", "on", "true", "1", "TRUE"] {
        let out = get(&d, &format!("/items/1?my_bool={token}"));
        assert_eq!(out.response.body["my_bool"], true, "token {token}");
    }
    for token in ["no", "off", "false", "0"] {
        let out = get(&d, &format!("/items/1?my_bool={token}"));
        assert_eq!(out.response.body["my_bool"], false, "token {token}");
    }
    let out = get(&d, "/items/1?my_bool=maybe");
    assert_eq!(out.response.status, 422);
    assert_eq!(detail(&out)[0]["type"], "bool_parsing");
}

#[test]
fn test_read_item_id_is_unbounded() {
    let d = dispatcher();
    for id in ["0", "-3", "1", "99999"] {
        let out = get(&d, &format!("/items/{id}"));
        assert_eq!(out.response.status, 200, "id {id}");
        assert_eq!(out.response.body["item_id"], id.parse::<i64>().unwrap());
    }
    let out = get(&d, "/items/abc");
    assert_eq!(out.response.status, 422);
    assert_eq!(detail(&out)[0]["type"], "int_parsing");
}

#[test]
fn test_read_item_id_tolerates_surrounding_whitespace() {
    let out = get(&dispatcher(), "/items/%205%20");
    assert_eq!(out.response.status, 200);
    assert_eq!(out.response.body["item_id"], 5);
}

#[test]
fn test_read_item_extra_param() {
    let d = dispatcher();
    let out = get(&d, "/items/2?extra_param=hello");
    assert_eq!(out.response.body["extra_param"], "hello");

    let out = get(&d, "/items/2?extra_param=");
    assert!(out.response.body.get("extra_param").is_none());

    let long = "x".repeat(51);
    let out = get(&d, &format!("/items/2?extra_param={long}"));
    assert_eq!(out.response.status, 422);
    assert_eq!(detail(&out)[0]["type"], "string_too_long");
    assert_eq!(detail(&out)[0]["loc"], json!(["query", "extra_param"]));
}

#[test]
fn test_read_item_repeated_query_keeps_last() {
    let out = get(&dispatcher(), "/items/2?limit=1&limit=7");
    assert_eq!(out.response.body["limit"], 7);
}

#[test]
fn test_update_item() {
    let body = json!({
        "item": item(),
        "user": { "usename": "dave", "full_name": "Dave Grohl" },
        "importance": 5
    });
    let out = send(&dispatcher(), Method::PUT, "/items/3?extra_param=note", &body);
    assert_eq!(out.response.status, 200);
    assert_eq!(
        out.response.body,
        json!({
            "item_id": 3,
            "item": {
                "name": "Foo",
                "description": null,
                "price": 35.4,
                "tax": null,
                "tags": [],
                "images": null
            },
            "user": { "usename": "dave", "full_name": "Dave Grohl" },
            "importance": 5,
            "extra_param": "note"
        })
    );
}

#[test]
fn test_update_item_missing_body_members() {
    let body = json!({ "item": item() });
    let out = send(&dispatcher(), Method::PUT, "/items/3", &body);
    assert_eq!(out.response.status, 422);
    let locs: Vec<&Value> = detail(&out).iter().map(|e| &e["loc"]).collect();
    assert_eq!(
        locs,
        vec![&json!(["body", "user"]), &json!(["body", "importance"])]
    );
    assert!(detail(&out).iter().all(|e| e["type"] == "missing"));
}

#[test]
fn test_update_item_reports_path_before_body() {
    let body = json!({ "item": { "name": 1 }, "user": {}, "importance": "high" });
    let out = send(&dispatcher(), Method::PUT, "/items/x", &body);
    let errors = detail(&out);
    assert_eq!(errors[0]["loc"], json!(["path", "item_id"]));
    let tail: Vec<&Value> = errors[1..].iter().map(|e| &e["loc"]).collect();
    assert_eq!(
        tail,
        vec![
            &json!(["body", "item", "name"]),
            &json!(["body", "item", "price"]),
            &json!(["body", "user", "usename"]),
            &json!(["body", "importance"]),
        ]
    );
}
