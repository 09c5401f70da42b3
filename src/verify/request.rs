//! Static request check.

use serde_json::Value;

use crate::http::ApiRequest;
use crate::verify::descriptor::{Expectation, SolutionDescriptor};
use crate::verify::path::values_equal;
use crate::verify::verdict::{Mismatch, Verdict};

/// Compare `request` against `descriptor`, listing every failed sub-check.
///
/// Body fields are only enforced when the request's method carries a body.
pub fn verify_request(descriptor: &SolutionDescriptor, request: &ApiRequest) -> Verdict {
    let mut failures = Vec::new();

    if let Some(expected) = &descriptor.method {
        if &request.method != expected {
            failures.push(Mismatch::Method {
                expected: expected.clone(),
                actual: request.method.clone(),
            });
        }
    }

    if let Some(expected) = &descriptor.url {
        if &request.url != expected {
            failures.push(Mismatch::Url {
                expected: expected.clone(),
                actual: request.url.clone(),
            });
        }
    }

    for (name, expectation) in &descriptor.headers {
        let actual = request.headers.get(name).map(String::as_str);
        if let Some(mismatch) = check_header(name, expectation, actual) {
            failures.push(mismatch);
        }
    }

    if request.carries_body() {
        for (field, expectation) in &descriptor.body {
            match (request.body_field(field), expectation) {
                (None, _) => failures.push(Mismatch::MissingBodyField { field: field.clone() }),
                (Some(_), Expectation::Required) => {}
                (Some(actual), Expectation::Literal(expected)) => {
                    if !values_equal(actual, expected) {
                        failures.push(Mismatch::BodyField {
                            field: field.clone(),
                            expected: expected.clone(),
                            actual: actual.clone(),
                        });
                    }
                }
            }
        }
    }

    Verdict::from_failures(failures)
}

/// Boolean form of [`verify_request`].
pub fn check_request(descriptor: &SolutionDescriptor, request: &ApiRequest) -> bool {
    verify_request(descriptor, request).passed
}

// Header names match exactly as written in the descriptor. An empty literal
// behaves like the sentinel.
fn check_header(name: &str, expectation: &Expectation, actual: Option<&str>) -> Option<Mismatch> {
    let Some(actual) = actual.filter(|v| !v.is_empty()) else {
        return Some(Mismatch::MissingHeader { name: name.to_string() });
    };

    let expected = match expectation {
        Expectation::Required => return None,
        Expectation::Literal(Value::String(s)) if s.is_empty() => return None,
        Expectation::Literal(Value::String(s)) => s.clone(),
        Expectation::Literal(other) => other.to_string(),
    };

    (actual != expected).then(|| Mismatch::Header {
        name: name.to_string(),
        expected,
        actual: actual.to_string(),
    })
}
