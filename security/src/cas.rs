// security/src/cas.rs

use async_trait::async_trait;
use log::{error, info, warn};
use models::NetId;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::AuthError;

static CAS_USER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<cas:user>\s*(.*?)\s*</cas:user>").expect("CAS user pattern is valid")
});

static CAS_FAILURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<cas:authenticationFailure[^>]*>(.*?)</cas:authenticationFailure>")
        .expect("CAS failure pattern is valid")
});

/// Outcome of a CAS `serviceValidate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CasResponse {
    Success(String),
    Failure(String),
    Unrecognized,
}

/// Classifies a CAS 2.0 service validation body.
pub fn parse_service_response(body: &str) -> CasResponse {
    if body.contains("<cas:authenticationSuccess>") {
        return match CAS_USER.captures(body) {
            Some(captures) => CasResponse::Success(captures[1].to_string()),
            None => CasResponse::Failure("no user in success response".to_string()),
        };
    }
    if body.contains("<cas:authenticationFailure") {
        let reason = CAS_FAILURE
            .captures(body)
            .map(|captures| captures[1].trim().to_string())
            .unwrap_or_else(|| "Unknown authentication failure".to_string());
        return CasResponse::Failure(reason);
    }
    CasResponse::Unrecognized
}

/// Single sign-on ticket validation.
#[async_trait]
pub trait TicketValidator: Send + Sync + 'static {
    /// Where to send the browser to log in; CAS returns it to `service_url`.
    fn login_url(&self, service_url: &str) -> String;
    /// Ends the SSO session, then sends the browser to `service_url`.
    fn logout_url(&self, service_url: &str) -> String;
    /// Exchanges a one-time ticket for the net id it was issued to.
    /// `service_url` must be the one used at login. Rejected tickets give
    /// `Ok(None)`.
    async fn validate(&self, ticket: &str, service_url: &str) -> Result<Option<NetId>, AuthError>;
}

pub struct CasClient {
    http: reqwest::Client,
    login_endpoint: Url,
    logout_endpoint: Url,
    validate_endpoint: Url,
}

impl CasClient {
    pub fn new(base_url: &str) -> Result<Self, AuthError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, AuthError> {
        let base = base_url.trim_end_matches('/');
        let endpoint = |path: &str| {
            Url::parse(&format!("{}/{}", base, path))
                .map_err(|e| AuthError::Configuration(format!("invalid CAS url '{}': {}", base_url, e)))
        };
        Ok(CasClient {
            http,
            login_endpoint: endpoint("login")?,
            logout_endpoint: endpoint("logout")?,
            validate_endpoint: endpoint("serviceValidate")?,
        })
    }
}

fn with_service(endpoint: &Url, service_url: &str) -> String {
    let mut url = endpoint.clone();
    url.query_pairs_mut().append_pair("service", service_url);
    url.into()
}

#[async_trait]
impl TicketValidator for CasClient {
    fn login_url(&self, service_url: &str) -> String {
        with_service(&self.login_endpoint, service_url)
    }

    fn logout_url(&self, service_url: &str) -> String {
        with_service(&self.logout_endpoint, service_url)
    }

    async fn validate(&self, ticket: &str, service_url: &str) -> Result<Option<NetId>, AuthError> {
        let response = self
            .http
            .get(self.validate_endpoint.clone())
            .query(&[("ticket", ticket), ("service", service_url)])
            .send()
            .await
            .map_err(|e| AuthError::CasRequest(e.to_string()))?;

        if !response.status().is_success() {
            warn!("CAS validation returned HTTP {}", response.status());
            return Ok(None);
        }
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::CasRequest(e.to_string()))?;

        match parse_service_response(&body) {
            CasResponse::Success(user) => match NetId::new(user) {
                Ok(net_id) => {
                    info!("CAS validated ticket for {}", net_id);
                    Ok(Some(net_id))
                }
                Err(e) => {
                    error!("CAS returned an unusable net id: {}", e);
                    Ok(None)
                }
            },
            CasResponse::Failure(reason) => {
                warn!("CAS authentication failed: {}", reason);
                Ok(None)
            }
            CasResponse::Unrecognized => {
                error!("Unexpected CAS response format: {}", body);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_success() {
        let body = r#"<cas:serviceResponse xmlns:cas="http://www.yale.edu/tp/cas">
    <cas:authenticationSuccess>
        <cas:user>abc123</cas:user>
    </cas:authenticationSuccess>
</cas:serviceResponse>"#;
        assert_eq!(parse_service_response(body), CasResponse::Success("abc123".to_string()));
    }

    #[test]
    fn parses_failure_with_code() {
        let body = r#"<cas:serviceResponse xmlns:cas="http://www.yale.edu/tp/cas">
    <cas:authenticationFailure code="INVALID_TICKET">
        Ticket ST-1856339 not recognized
    </cas:authenticationFailure>
</cas:serviceResponse>"#;
        assert_eq!(
            parse_service_response(body),
            CasResponse::Failure("Ticket ST-1856339 not recognized".to_string())
        );
    }

    #[test]
    fn flags_unexpected_bodies() {
        assert_eq!(parse_service_response("<html>oops</html>"), CasResponse::Unrecognized);
        assert!(matches!(
            parse_service_response("<cas:authenticationSuccess></cas:authenticationSuccess>"),
            CasResponse::Failure(_)
        ));
    }

    #[test]
    fn builds_login_and_logout_urls() {
        let cas = CasClient::new("https://secure-tst.its.yale.edu/cas/").unwrap();
        let service = "http://localhost:3000/api/auth/cas-validate?redirect=%2Fbookmarks";
        let login = Url::parse(&cas.login_url(service)).unwrap();
        assert_eq!(login.path(), "/cas/login");
        assert_eq!(
            login.query_pairs().find(|(k, _)| k == "service").map(|(_, v)| v.into_owned()),
            Some(service.to_string())
        );

        let logout = cas.logout_url("https://rides.example.edu");
        assert!(logout.starts_with("https://secure-tst.its.yale.edu/cas/logout?service=https%3A%2F%2F"));
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(CasClient::new("not a url").is_err());
    }
}
