// site-client/src/http.rs
// HTTP 客户端 - 网络通信

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::client::{HealthResponse, LoginRequest, LoginResponse, UploadResponse};
use shared::models::SiteSettings;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::service::SettingsService;

/// 服务端返回的错误响应格式
#[derive(serde::Deserialize)]
struct ApiErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// 网络 HTTP 客户端
///
/// 公开页面只用 `get_config`；后台先 `login` 再写配置和上传图片。
#[derive(Debug)]
pub struct NetworkSettingsClient {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl NetworkSettingsClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(config.token.clone()),
        })
    }

    /// 获取基础 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.read().as_deref() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            // 尝试解析为 API 错误响应
            if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&text) {
                return Err(ClientError::Api {
                    code: api_err.code,
                    message: api_err.message,
                    details: api_err.details,
                });
            }
            // 降级到按状态码处理
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(text)),
                _ => Err(ClientError::Internal(text)),
            };
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let req = self.authorize(self.client.get(self.url(path)));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let req = self.authorize(self.client.post(self.url(path)).json(body));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    pub async fn put<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let req = self.authorize(self.client.put(self.url(path)).json(body));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    /// 管理员登录，成功后保存令牌
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post("api/auth/login", &request).await?;
        self.set_token(Some(response.token.clone()));
        tracing::info!(username = %response.username, "Logged in");
        Ok(response)
    }

    pub fn logout(&self) {
        self.set_token(None);
    }

    /// 上传图片，返回的 `path` 可直接写入配置的图片字段
    pub async fn upload_image(
        &self,
        filename: &str,
        data: Vec<u8>,
    ) -> ClientResult<UploadResponse> {
        let part = reqwest::multipart::Part::bytes(data).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let req = self.authorize(self.client.post(self.url("api/uploads")).multipart(form));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        self.get("api/health").await
    }
}

#[async_trait]
impl SettingsService for NetworkSettingsClient {
    async fn get_config(&self) -> ClientResult<SiteSettings> {
        self.get("api/settings").await
    }

    async fn replace_config(&self, settings: &SiteSettings) -> ClientResult<SiteSettings> {
        self.put("api/settings", settings).await
    }
}
