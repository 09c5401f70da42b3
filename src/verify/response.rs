//! Dynamic response check.

use serde_json::Value;

use crate::http::ApiResponse;
use crate::verify::descriptor::{Expectation, ExpectedResponseDescriptor};
use crate::verify::path::{resolve_path, values_equal};
use crate::verify::verdict::{Mismatch, Verdict};

/// Compare `response` against `descriptor`. No descriptor means nothing to check.
pub fn verify_response(descriptor: Option<&ExpectedResponseDescriptor>, response: &ApiResponse) -> Verdict {
    let Some(descriptor) = descriptor else {
        return Verdict::pass();
    };
    let mut failures = Vec::new();

    if let Some(expected) = descriptor.status {
        if response.status != expected {
            failures.push(Mismatch::Status {
                expected,
                actual: response.status,
            });
        }
    }

    for (name, expected) in &descriptor.headers {
        let actual = response.headers.get(name);
        if actual != Some(expected) {
            failures.push(Mismatch::ResponseHeader {
                name: name.clone(),
                expected: expected.clone(),
                actual: actual.cloned(),
            });
        }
    }

    if let Some(fields) = &descriptor.body {
        if descriptor.exact_match {
            let expected = descriptor.body_value().unwrap_or(Value::Null);
            let matches = response
                .body
                .as_ref()
                .is_some_and(|actual| values_equal(actual, &expected));
            if !matches {
                failures.push(Mismatch::Body {
                    expected,
                    actual: response.body.clone(),
                });
            }
        } else {
            let root = response.body.as_ref().unwrap_or(&Value::Null);
            for (path, expectation) in fields {
                match (resolve_path(root, path), expectation) {
                    (None, _) => failures.push(Mismatch::MissingPath { path: path.clone() }),
                    (Some(_), Expectation::Required) => {}
                    (Some(actual), Expectation::Literal(expected)) => {
                        if !values_equal(actual, expected) {
                            failures.push(Mismatch::PathValue {
                                path: path.clone(),
                                expected: expected.clone(),
                                actual: actual.clone(),
                            });
                        }
                    }
                }
            }
        }
    }

    Verdict::from_failures(failures)
}

/// Boolean form of [`verify_response`].
pub fn check_response(descriptor: Option<&ExpectedResponseDescriptor>, response: &ApiResponse) -> bool {
    verify_response(descriptor, response).passed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(value: Value) -> ExpectedResponseDescriptor {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_absent_descriptor_passes() {
        assert!(check_response(None, &ApiResponse::new(204)));
    }

    #[test]
    fn test_status_and_headers() {
        let desc = descriptor(json!({"status": 201, "headers": {"Location": "/api/users/4"}}));
        let mut resp = ApiResponse::new(201);
        resp.headers.insert("Location".into(), "/api/users/4".into());
        assert!(check_response(Some(&desc), &resp));

        resp.status = 200;
        assert!(!check_response(Some(&desc), &resp));

        let verdict = verify_response(Some(&desc), &ApiResponse::new(201));
        assert_eq!(
            verdict.failures,
            vec![Mismatch::ResponseHeader {
                name: "Location".into(),
                expected: "/api/users/4".into(),
                actual: None,
            }]
        );
    }

    #[test]
    fn test_dotted_paths() {
        let desc = descriptor(json!({"body": {"[0].id": true, "user.name": "Ann"}}));
        let resp = ApiResponse::new(200).with_body(json!({"user": {"name": "Ann"}, "0": {"id": 7}}));
        assert!(check_response(Some(&desc), &resp));

        let wrong_name = ApiResponse::new(200).with_body(json!({"user": {"name": "Bob"}, "0": {"id": 7}}));
        assert!(!check_response(Some(&desc), &wrong_name));
    }

    #[test]
    fn test_missing_segment_fails() {
        let desc = descriptor(json!({"body": {"user.address.city": true}}));
        let resp = ApiResponse::new(200).with_body(json!({"user": {"name": "Ann"}}));
        let verdict = verify_response(Some(&desc), &resp);
        assert_eq!(verdict.failures, vec![Mismatch::MissingPath { path: "user.address.city".into() }]);

        assert!(!check_response(Some(&desc), &ApiResponse::new(204)));
    }

    #[test]
    fn test_sentinel_accepts_any_defined_value() {
        let desc = descriptor(json!({"body": {"deletedAt": true}}));
        let resp = ApiResponse::new(200).with_body(json!({"deletedAt": null}));
        assert!(check_response(Some(&desc), &resp));
    }

    #[test]
    fn test_exact_match() {
        let desc = descriptor(json!({"body": {"id": 1, "name": "Ann"}, "exactMatch": true}));
        let same = ApiResponse::new(200).with_body(json!({"name": "Ann", "id": 1}));
        assert!(check_response(Some(&desc), &same));

        let extra = ApiResponse::new(200).with_body(json!({"id": 1, "name": "Ann", "role": "admin"}));
        assert!(!check_response(Some(&desc), &extra));

        assert!(!check_response(Some(&desc), &ApiResponse::new(204)));
    }
}
