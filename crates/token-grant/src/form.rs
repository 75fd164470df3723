//! Outbound token endpoint form

use crate::credentials::ClientCredentials;
use crate::request::TokenRequest;

/// Build the `application/x-www-form-urlencoded` pairs for the provider's
/// token endpoint: `grant_type`, `client_id`, `client_secret`, then the
/// grant-specific fields.
pub fn upstream_form<'a>(
    request: &'a TokenRequest,
    credentials: &'a ClientCredentials,
) -> Vec<(&'static str, &'a str)> {
    let mut pairs = vec![
        ("grant_type", request.grant_type().as_str()),
        ("client_id", credentials.client_id()),
        ("client_secret", credentials.client_secret().expose().as_str()),
    ];
    pairs.extend(request.fields());
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Secret;

    fn credentials() -> ClientCredentials {
        ClientCredentials::new("cid.apps.googleusercontent.com", Secret::new("GOCSPX-x".into()))
    }

    #[test]
    fn authorization_code_form_has_exact_keys() {
        let req = TokenRequest::from_json(
            br#"{"grant_type":"authorization_code","code":"c0de","redirect_uri":"com.example:/cb","code_verifier":"ver","extra":"dropped"}"#,
        )
        .unwrap();
        let creds = credentials();

        assert_eq!(
            upstream_form(&req, &creds),
            vec![
                ("grant_type", "authorization_code"),
                ("client_id", "cid.apps.googleusercontent.com"),
                ("client_secret", "GOCSPX-x"),
                ("code", "c0de"),
                ("redirect_uri", "com.example:/cb"),
                ("code_verifier", "ver"),
            ]
        );
    }

    #[test]
    fn refresh_form_has_exact_keys() {
        let req =
            TokenRequest::from_json(br#"{"grant_type":"refresh_token","refresh_token":"1//rt"}"#)
                .unwrap();
        let creds = credentials();

        assert_eq!(
            upstream_form(&req, &creds),
            vec![
                ("grant_type", "refresh_token"),
                ("client_id", "cid.apps.googleusercontent.com"),
                ("client_secret", "GOCSPX-x"),
                ("refresh_token", "1//rt"),
            ]
        );
    }

    #[test]
    fn client_supplied_credentials_never_override_server_ones() {
        let req = TokenRequest::from_json(
            br#"{"grant_type":"refresh_token","refresh_token":"rt","client_id":"evil","client_secret":"evil"}"#,
        )
        .unwrap();
        let creds = credentials();
        let form = upstream_form(&req, &creds);

        assert!(form.iter().all(|(_, v)| *v != "evil"), "got: {form:?}");
        assert_eq!(form.iter().filter(|(k, _)| *k == "client_id").count(), 1);
    }
}
