//! reqwest-backed HTTP transport

use super::{HttpTransport, TransportError};
use crate::request::{Method, Request, Response};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::multipart::{Form, Part};

/// Production transport over a pooled reqwest client
///
/// Static headers (Authorization, User-Agent) are installed once on the
/// underlying client; Content-Type is set per request by the body encoder.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Build a transport for the given API base URL and bot token
    pub fn new(
        base_url: impl Into<String>,
        token: &str,
        user_agent: &str,
    ) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bot {token}"))
                .map_err(|_| TransportError::Config("token contains invalid header bytes".into()))?,
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|_| TransportError::Config("user agent contains invalid header bytes".into()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::Request(e.into()))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { client, base_url })
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let url = format!("{}{}", self.base_url, request.route.path());
        let mut builder = self.client.request(Self::method(request.route.method()), url);

        if request.attachments.is_empty() {
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }
        } else {
            // Multipart: the JSON body rides along as the payload_json part
            let mut form = Form::new();
            if let Some(body) = &request.body {
                form = form.text("payload_json", body.to_string());
            }
            for (index, attachment) in request.attachments.iter().enumerate() {
                form = form.part(
                    format!("files[{index}]"),
                    Part::bytes(attachment.data.clone()).file_name(attachment.filename.clone()),
                );
            }
            builder = builder.multipart(form);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.into()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_ascii_lowercase(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.into()))?
            .to_vec();

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
