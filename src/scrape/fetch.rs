//! 页面下载
//!
//! `PageFetcher` 是抓取流程与外部世界之间的接缝：默认实现用阻塞的 reqwest
//! 客户端下载页面，测试和嵌入方可以换成自己的实现。

use super::ScrapeError;
use crate::config::ScrapeConfig;
use crate::parsers::html::decode_document_bytes;
use crate::utils::{domain_is_within_domain, parse_http_url, Url};

/// 校验用户输入的 URL：必须是 http(s)，且主机属于允许的域名
pub fn validate_url(input: &str, allowed_domain: &str) -> Result<Url, ScrapeError> {
    let url = parse_http_url(input).ok_or_else(|| ScrapeError::InvalidUrl(input.trim().to_string()))?;

    let allowed = url
        .host_str()
        .is_some_and(|host| domain_is_within_domain(host, allowed_domain));
    if !allowed {
        return Err(ScrapeError::DomainNotAllowed {
            url: url.to_string(),
            domain: allowed_domain.to_string(),
        });
    }

    Ok(url)
}

/// 页面下载接口
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<String, ScrapeError>;
}

/// 基于 reqwest 的下载器
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ScrapeError::Network(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self { client })
    }
}

fn map_reqwest_error(url: &Url, error: reqwest::Error) -> ScrapeError {
    if error.is_timeout() {
        ScrapeError::Timeout(url.to_string())
    } else {
        ScrapeError::Network(error.to_string())
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|e| map_reqwest_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Network(format!("HTTP {} ({})", status.as_u16(), url)));
        }

        let bytes = response.bytes().map_err(|e| map_reqwest_error(url, e))?;
        tracing::debug!("已下载 {} 字节: {}", bytes.len(), url);
        Ok(decode_document_bytes(&bytes))
    }
}
