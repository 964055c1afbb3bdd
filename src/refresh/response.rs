use serde::Serialize;
use serde_json::Value;

/// Wire body posted to the refresh endpoint.
#[derive(Serialize)]
pub(super) struct RefreshRequest<'a> {
    #[serde(rename = "refreshToken")]
    pub refresh_token: &'a str,
}

/// Response fields that may carry the new access token, in priority order.
/// First string-valued match wins.
pub(super) const TOKEN_FIELDS: [&str; 4] =
    ["accessToken", "newAccessToken", "access_token", "token"];

pub(super) fn extract_access_token(body: &Value) -> Option<String> {
    TOKEN_FIELDS
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_str))
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn each_alias_is_recognized() {
        for field in TOKEN_FIELDS {
            let body = json!({ field: "tok" });
            assert_eq!(extract_access_token(&body).as_deref(), Some("tok"));
        }
    }

    #[test]
    fn first_matching_field_wins() {
        let body = json!({ "access_token": "a", "token": "b" });
        assert_eq!(extract_access_token(&body).as_deref(), Some("a"));

        let body = json!({ "accessToken": "x", "newAccessToken": "y", "token": "z" });
        assert_eq!(extract_access_token(&body).as_deref(), Some("x"));
    }

    #[test]
    fn non_string_values_are_ignored() {
        let body = json!({ "accessToken": 42, "token": "fallback" });
        assert_eq!(extract_access_token(&body).as_deref(), Some("fallback"));
    }

    #[test]
    fn missing_fields_yield_none() {
        let body = json!({ "expires_in": 3600 });
        assert!(extract_access_token(&body).is_none());
    }

    #[test]
    fn refresh_request_serializes_camel_case() {
        let body = serde_json::to_value(RefreshRequest {
            refresh_token: "R1",
        })
        .unwrap();
        assert_eq!(body, json!({ "refreshToken": "R1" }));
    }
}
