//! Mock key synthesis.
//!
//! The key format is shared with the static entry table and must not drift:
//! 1. `"<METHOD>:<url>"`
//! 2. protected url + auth header present → append `"/<header value>"`
//! 3. body method with absent/empty body → append `"/empty"`

use crate::http::ApiRequest;

/// Rules for the optional key extensions.
#[derive(Debug, Clone)]
pub struct KeyRules {
    /// Url prefixes that address protected resources.
    pub protected_prefixes: Vec<String>,
    /// Header whose value distinguishes credential-specific entries.
    pub auth_header: String,
}

impl Default for KeyRules {
    fn default() -> Self {
        Self {
            protected_prefixes: vec!["/api/profile".to_string()],
            auth_header: "Authorization".to_string(),
        }
    }
}

impl KeyRules {
    pub fn is_protected(&self, url: &str) -> bool {
        self.protected_prefixes.iter().any(|p| url.starts_with(p.as_str()))
    }
}

/// Build the lookup key for `request`.
pub fn synthesize_key(request: &ApiRequest, rules: &KeyRules) -> String {
    let mut key = format!("{}:{}", request.method, request.url);

    if rules.is_protected(&request.url) {
        if let Some(credential) = request.header(&rules.auth_header) {
            key.push('/');
            key.push_str(credential);
        }
    }

    if request.carries_body() && request.body_is_empty() {
        key.push_str("/empty");
    }

    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_key() {
        let req = ApiRequest::new("GET", "/api/users");
        assert_eq!(synthesize_key(&req, &KeyRules::default()), "GET:/api/users");
    }

    #[test]
    fn test_protected_url_appends_credential() {
        let rules = KeyRules::default();
        let req = ApiRequest::new("GET", "/api/profile").with_header("Authorization", "Bearer valid-token");
        assert_eq!(synthesize_key(&req, &rules), "GET:/api/profile/Bearer valid-token");

        // Credential on an unprotected url is ignored.
        let req = ApiRequest::new("GET", "/api/users").with_header("Authorization", "Bearer valid-token");
        assert_eq!(synthesize_key(&req, &rules), "GET:/api/users");
    }

    #[test]
    fn test_missing_body_appends_empty() {
        let rules = KeyRules::default();
        let req = ApiRequest::new("POST", "/api/users");
        assert_eq!(synthesize_key(&req, &rules), "POST:/api/users/empty");

        let req = ApiRequest::new("PUT", "/api/users/1").with_body(json!({}));
        assert_eq!(synthesize_key(&req, &rules), "PUT:/api/users/1/empty");

        let req = ApiRequest::new("POST", "/api/users").with_body(json!({"name": "Ann"}));
        assert_eq!(synthesize_key(&req, &rules), "POST:/api/users");

        // DELETE never gets the suffix.
        let req = ApiRequest::new("DELETE", "/api/users/42");
        assert_eq!(synthesize_key(&req, &rules), "DELETE:/api/users/42");
    }

    #[test]
    fn test_both_extensions_in_order() {
        let rules = KeyRules::default();
        let req = ApiRequest::new("POST", "/api/profile").with_header("authorization", "Bearer t");
        assert_eq!(synthesize_key(&req, &rules), "POST:/api/profile/Bearer t/empty");
    }

    #[test]
    fn test_key_is_stable() {
        let rules = KeyRules::default();
        let req = ApiRequest::new("PATCH", "/api/profile")
            .with_header("Authorization", "Bearer x")
            .with_body(json!({"bio": "hi"}));
        assert_eq!(synthesize_key(&req, &rules), synthesize_key(&req, &rules));
    }
}
