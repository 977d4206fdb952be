use crate::api::EmailProvider;
use crate::api::models::{ProviderError, ProviderResponse, TemplateParams};
use crate::app::{AppConfig, ConfigError};
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://api.emailjs.com";
const SEND_PATH: &str = "api/v1.0/email/send";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// EmailJS REST client. One request per `send`, no retries.
pub struct EmailJsClient {
    http: HttpClient,
    endpoint: Url,
    service_id: String,
    public_key: String,
    private_key: Option<String>,
}

impl EmailJsClient {
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::Http(e.to_string()))?;
        Self::with_http(http, config)
    }

    fn with_http(http: HttpClient, config: &AppConfig) -> Result<Self, ConfigError> {
        let base = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            http,
            endpoint: Self::send_endpoint(base)?,
            service_id: config.service_id.clone(),
            public_key: config.public_key.clone(),
            private_key: config.private_key.clone().filter(|k| !k.is_empty()),
        })
    }

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn send_endpoint(base_url: &str) -> Result<Url, ConfigError> {
        let normalized = crate::utils::normalize_url(base_url);
        let base = Url::parse(&format!("{}/", normalized.trim_end_matches('/')))?;
        Ok(base.join(SEND_PATH)?)
    }

    fn payload(&self, template_id: &str, params: &TemplateParams) -> Value {
        let mut body = serde_json::json!({
            "service_id": self.service_id,
            "template_id": template_id,
            "user_id": self.public_key,
            "template_params": params,
        });
        if let Some(key) = &self.private_key {
            body["accessToken"] = Value::String(key.clone());
        }
        body
    }
}

impl EmailProvider for EmailJsClient {
    async fn send(
        &self,
        template_id: &str,
        params: &TemplateParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let body = self.payload(template_id, params);
        log::debug!("POST {} (template {})", self.endpoint(), template_id);
        let resp = self
            .http
            .post(self.endpoint().clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;

        let status = resp.status();
        // EmailJS answers with plain text ("OK" or a reason) rather than JSON.
        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) => {
                log::debug!("could not read provider response body: {}", e);
                String::new()
            }
        };
        if status.is_success() {
            Ok(ProviderResponse {
                status: status.as_u16(),
                text,
            })
        } else {
            Err(ProviderError::http(status.as_u16(), text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            service_id: "service_x".into(),
            template_id: "template_x".into(),
            public_key: "pub".into(),
            to_email: "owner@example.com".into(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn default_endpoint_points_at_emailjs() {
        let client = EmailJsClient::new(&config()).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://api.emailjs.com/api/v1.0/email/send"
        );
    }

    #[test]
    fn custom_base_url_keeps_its_path() {
        let mut cfg = config();
        cfg.base_url = Some("relay.example.com/emailjs/".into());
        let client = EmailJsClient::new(&cfg).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://relay.example.com/emailjs/api/v1.0/email/send"
        );
    }

    #[test]
    fn payload_includes_access_token_only_when_configured() {
        let params = TemplateParams::new().with("from_name", "Al");
        let client = EmailJsClient::new(&config()).unwrap();
        let body = client.payload("template_x", &params);
        assert_eq!(body["service_id"], "service_x");
        assert_eq!(body["user_id"], "pub");
        assert_eq!(body["template_params"]["from_name"], "Al");
        assert!(body.get("accessToken").is_none());

        let mut cfg = config();
        cfg.private_key = Some("secret".into());
        let client = EmailJsClient::new(&cfg).unwrap();
        let body = client.payload("template_x", &params);
        assert_eq!(body["accessToken"], "secret");
    }

    /// Serves one canned HTTP response after reading the full request.
    async fn serve_once(response: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: String) -> EmailJsClient {
        let mut cfg = config();
        cfg.base_url = Some(base_url);
        EmailJsClient::new(&cfg).unwrap()
    }

    #[tokio::test]
    async fn success_body_becomes_response_text() {
        let base = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nOK").await;
        let params = TemplateParams::new().with("from_name", "Al");
        let resp = client_for(base).send("template_x", &params).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.text, "OK");
    }

    #[tokio::test]
    async fn unreadable_error_body_keeps_status() {
        // Promises 100 bytes but closes after 7.
        let base = serve_once(
            "HTTP/1.1 429 Too Many Requests\r\nContent-Length: 100\r\n\r\npartial",
        )
        .await;
        let params = TemplateParams::new();
        let err = client_for(base).send("template_x", &params).await.unwrap_err();
        assert_eq!(err.status, Some(429));
        assert_eq!(err.text, None);
    }
}
