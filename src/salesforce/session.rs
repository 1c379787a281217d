//! Session bridge: exchange configured credentials for a CRM session.
//!
//! A fresh login is performed for every CRM operation. Nothing is cached and
//! nothing tracks expiry.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::utilities::config::CrmCredentials;
use crate::utilities::errors::{RelayError, RelayResult};

static SESSION_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<sessionId>([^<]+)</sessionId>").unwrap());
static SERVER_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<serverUrl>([^<]+)</serverUrl>").unwrap());
static FAULT_STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<faultstring>(.*?)</faultstring>").unwrap());
static FAULT_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<faultcode[^>]*>(.*?)</faultcode>").unwrap());

/// An authenticated CRM session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmSession {
    pub access_token: String,
    /// `https://<instance>.my.salesforce.com`, no trailing slash.
    pub instance_url: String,
}

/// Anything that can produce a CRM session on demand.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn login(&self) -> RelayResult<CrmSession>;
}

/// Username/password login through the SOAP partner endpoint.
pub struct SoapLoginProvider {
    credentials: CrmCredentials,
    client: reqwest::Client,
}

impl SoapLoginProvider {
    pub fn new(credentials: CrmCredentials, client: reqwest::Client) -> Self {
        Self { credentials, client }
    }

    fn login_endpoint(&self) -> String {
        format!(
            "{}/services/Soap/u/{}",
            self.credentials.login_url.trim_end_matches('/'),
            self.credentials.api_version
        )
    }
}

#[async_trait]
impl SessionProvider for SoapLoginProvider {
    async fn login(&self) -> RelayResult<CrmSession> {
        let username = self.credentials.username.as_deref().ok_or_else(|| {
            RelayError::Config("SALESFORCE_USERNAME is not set".to_string())
        })?;
        let password = self.credentials.password_with_token().ok_or_else(|| {
            RelayError::Config("SALESFORCE_PASSWORD is not set".to_string())
        })?;

        tracing::debug!(username, endpoint = %self.login_endpoint(), "CRM login");

        let response = self
            .client
            .post(self.login_endpoint())
            .header("Content-Type", "text/xml; charset=UTF-8")
            .header("SOAPAction", "login")
            .body(login_envelope(username, &password))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(login_fault(&body, status.as_u16()));
        }

        let session = parse_login_response(&body)?;
        tracing::debug!(instance_url = %session.instance_url, "CRM login succeeded");
        Ok(session)
    }
}

/// Escape text for inclusion in an XML element.
pub fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn login_envelope(username: &str, password: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:urn="urn:partner.soap.sforce.com">
  <soapenv:Body>
    <urn:login>
      <urn:username>{}</urn:username>
      <urn:password>{}</urn:password>
    </urn:login>
  </soapenv:Body>
</soapenv:Envelope>"#,
        xml_escape(username),
        xml_escape(password)
    )
}

/// Extract the session from a successful SOAP login response.
pub fn parse_login_response(body: &str) -> RelayResult<CrmSession> {
    if FAULT_STRING.is_match(body) {
        return Err(login_fault(body, 500));
    }

    let access_token = SESSION_ID
        .captures(body)
        .map(|c| c[1].to_string())
        .ok_or_else(|| RelayError::Crm {
            message: "Login response did not contain a sessionId".to_string(),
            details: None,
        })?;
    let server_url = SERVER_URL
        .captures(body)
        .map(|c| c[1].to_string())
        .ok_or_else(|| RelayError::Crm {
            message: "Login response did not contain a serverUrl".to_string(),
            details: None,
        })?;

    Ok(CrmSession {
        access_token,
        instance_url: instance_url(&server_url)?,
    })
}

/// `https://host/services/Soap/u/59.0/00D...` → `https://host`.
fn instance_url(server_url: &str) -> RelayResult<String> {
    let url = reqwest::Url::parse(server_url).map_err(|e| RelayError::Crm {
        message: format!("Invalid serverUrl '{}': {}", server_url, e),
        details: None,
    })?;
    let host = url.host_str().ok_or_else(|| RelayError::Crm {
        message: format!("serverUrl '{}' has no host", server_url),
        details: None,
    })?;
    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

fn login_fault(body: &str, status: u16) -> RelayError {
    let message = FAULT_STRING
        .captures(body)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| format!("Login failed with status {}", status));
    let code = FAULT_CODE.captures(body).map(|c| c[1].trim().to_string());
    RelayError::Crm {
        message,
        details: Some(serde_json::json!({
            "status": status,
            "faultcode": code,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LOGIN_OK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="urn:partner.soap.sforce.com">
<soapenv:Body><loginResponse><result>
<metadataServerUrl>https://acme.my.salesforce.com/services/Soap/m/59.0/00D000000000001</metadataServerUrl>
<passwordExpired>false</passwordExpired>
<sandbox>false</sandbox>
<serverUrl>https://acme.my.salesforce.com/services/Soap/u/59.0/00D000000000001</serverUrl>
<sessionId>00D000000000001!AQ0AQFakeSession</sessionId>
<userId>005000000000001AAA</userId>
</result></loginResponse></soapenv:Body></soapenv:Envelope>"#;

    const LOGIN_FAULT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:sf="urn:fault.partner.soap.sforce.com">
<soapenv:Body><soapenv:Fault>
<faultcode>sf:INVALID_LOGIN</faultcode>
<faultstring>INVALID_LOGIN: Invalid username, password, security token; or user locked out.</faultstring>
</soapenv:Fault></soapenv:Body></soapenv:Envelope>"#;

    #[test]
    fn test_parse_login_response() {
        let session = parse_login_response(LOGIN_OK).unwrap();
        assert_eq!(session.access_token, "00D000000000001!AQ0AQFakeSession");
        assert_eq!(session.instance_url, "https://acme.my.salesforce.com");
    }

    #[test]
    fn test_parse_login_fault() {
        let err = parse_login_response(LOGIN_FAULT).unwrap_err();
        match err {
            RelayError::Crm { message, details } => {
                assert!(message.starts_with("INVALID_LOGIN"));
                assert_eq!(details.unwrap()["faultcode"], "sf:INVALID_LOGIN");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_login_missing_session() {
        let err = parse_login_response("<result></result>").unwrap_err();
        assert!(err.to_string().contains("sessionId"));
    }

    #[test]
    fn test_instance_url_keeps_port() {
        assert_eq!(
            instance_url("http://localhost:8443/services/Soap/u/59.0").unwrap(),
            "http://localhost:8443"
        );
    }

    #[test]
    fn test_login_envelope_escapes_credentials() {
        let envelope = login_envelope("a&b@example.com", "p<w>d\"'");
        assert!(envelope.contains("<urn:username>a&amp;b@example.com</urn:username>"));
        assert!(envelope.contains("<urn:password>p&lt;w&gt;d&quot;&apos;</urn:password>"));
    }

    #[tokio::test]
    async fn test_login_without_username_is_config_error() {
        let provider = SoapLoginProvider::new(CrmCredentials::default(), reqwest::Client::new());
        let err = provider.login().await.unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }

    fn credentials(server: &MockServer) -> CrmCredentials {
        CrmCredentials {
            login_url: server.uri(),
            username: Some("recruiter@example.com".into()),
            password: Some("hunter2".into()),
            security_token: Some("TOKEN".into()),
            api_version: "59.0".into(),
        }
    }

    #[tokio::test]
    async fn test_login_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/Soap/u/59.0"))
            .and(header("SOAPAction", "login"))
            .and(body_string_contains("<urn:password>hunter2TOKEN</urn:password>"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_OK))
            .expect(1)
            .mount(&server)
            .await;

        let provider = SoapLoginProvider::new(credentials(&server), reqwest::Client::new());
        let session = provider.login().await.unwrap();
        assert_eq!(session.access_token, "00D000000000001!AQ0AQFakeSession");
        assert_eq!(session.instance_url, "https://acme.my.salesforce.com");
    }

    #[tokio::test]
    async fn test_login_fault_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/Soap/u/59.0"))
            .respond_with(ResponseTemplate::new(500).set_body_string(LOGIN_FAULT))
            .mount(&server)
            .await;

        let provider = SoapLoginProvider::new(credentials(&server), reqwest::Client::new());
        match provider.login().await.unwrap_err() {
            RelayError::Crm { message, details } => {
                assert!(message.starts_with("INVALID_LOGIN"));
                let details = details.unwrap();
                assert_eq!(details["status"], 500);
                assert_eq!(details["faultcode"], "sf:INVALID_LOGIN");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
