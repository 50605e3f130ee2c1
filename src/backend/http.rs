//! REST client for the backend API

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{multipart, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

use super::MachineBackend;
use crate::{
    config::BackendConfig,
    error::{AppError, AppResult},
    models::{ImageUpload, MachinePayload, MachineRecord},
};

/// Characters kept verbatim in a single path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Error body sent by the backend on failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Response of the batch upload endpoint
#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    images: Vec<String>,
}

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of one machine; the id is opaque and always stays one segment
    fn machine_url(&self, id: &str) -> String {
        self.url(&format!("/machines/{}", utf8_percent_encode(id, PATH_SEGMENT)))
    }

    /// Turn a non-success response into a backend error carrying its message
    async fn check(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error);

        tracing::debug!("Backend responded {} ({:?})", status, message);

        Err(AppError::Backend {
            status: Some(status.as_u16()),
            message,
        })
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let response = Self::check(response).await?;
        response.json::<T>().await.map_err(|e| {
            tracing::warn!("Unexpected backend payload: {}", e);
            AppError::Backend {
                status: None,
                message: None,
            }
        })
    }
}

#[async_trait]
impl MachineBackend for HttpBackend {
    async fn list_machines(&self) -> AppResult<Vec<MachineRecord>> {
        let response = self.client.get(self.url("/machines")).send().await?;
        let raw: Vec<serde_json::Value> = Self::parse(response).await?;

        // One unreadable record must not hide the rest of the catalog
        Ok(raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<MachineRecord>(value) {
                Ok(machine) => Some(machine),
                Err(e) => {
                    tracing::warn!("Skipping unreadable machine record: {}", e);
                    None
                }
            })
            .collect())
    }

    async fn get_machine(&self, id: &str) -> AppResult<Option<MachineRecord>> {
        let response = self
            .client
            .get(self.machine_url(id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Self::parse(response).await.map(Some)
    }

    async fn create_machine(&self, payload: &MachinePayload) -> AppResult<MachineRecord> {
        let response = self
            .client
            .post(self.url("/machines"))
            .json(payload)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn update_machine(&self, id: &str, payload: &MachinePayload) -> AppResult<MachineRecord> {
        let response = self
            .client
            .put(self.machine_url(id))
            .json(payload)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn delete_machine(&self, id: &str) -> AppResult<()> {
        let response = self
            .client
            .delete(self.machine_url(id))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn upload_images(&self, files: Vec<ImageUpload>) -> AppResult<Vec<String>> {
        let mut form = multipart::Form::new();
        for file in files {
            let part = multipart::Part::bytes(file.bytes.to_vec())
                .file_name(file.file_name)
                .mime_str(&file.content_type)
                .map_err(|e| AppError::BadRequest(format!("Invalid image content type: {}", e)))?;
            form = form.part("images", part);
        }

        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await?;

        let uploaded: UploadResponse = Self::parse(response).await?;
        Ok(uploaded.images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MachineStatus, Purpose};
    use axum::{
        extract::Path,
        http::StatusCode as AxumStatus,
        routing::{get, post},
        Json, Router,
    };
    use axum_extra::extract::Multipart;
    use indexmap::IndexMap;
    use serde_json::{json, Value};

    async fn spawn_backend() -> HttpBackend {
        async fn get_one(Path(id): Path<String>) -> Result<Json<Value>, AxumStatus> {
            if id == "missing" {
                return Err(AxumStatus::NOT_FOUND);
            }
            Ok(Json(json!({"_id": id, "title": "JCB 3DX", "image": "one.jpg"})))
        }

        async fn create(Json(body): Json<Value>) -> (AxumStatus, Json<Value>) {
            if body["title"] == "dup" {
                return (
                    AxumStatus::BAD_REQUEST,
                    Json(json!({"error": "Machine already exists"})),
                );
            }
            let mut created = body.clone();
            created["_id"] = json!("new-id");
            (AxumStatus::CREATED, Json(created))
        }

        async fn upload(mut multipart: Multipart) -> Json<Value> {
            let mut urls = Vec::new();
            while let Ok(Some(field)) = multipart.next_field().await {
                let name = field.file_name().unwrap_or_default().to_string();
                urls.push(format!("https://cdn/{}", name));
            }
            Json(json!({ "images": urls }))
        }

        let app = Router::new()
            .route(
                "/machines",
                get(|| async {
                    Json(json!([
                        {"_id": "a", "specifications": {"power": 76, "engine": "Diesel"}},
                        {"_id": "b"},
                        {"_id": "c", "status": "Scrapped"},
                        {"title": "no id"}
                    ]))
                })
                .post(create),
            )
            .route("/machines/:id", get(get_one).delete(|| async { AxumStatus::NO_CONTENT }))
            .route("/upload", post(upload));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        HttpBackend::new(&BackendConfig {
            base_url: format!("http://{}/", addr),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    fn payload(title: &str) -> MachinePayload {
        MachinePayload {
            title: title.to_string(),
            model: "3DX".into(),
            category: "Excavator".into(),
            purpose: Purpose::Rental,
            year: 2020,
            hours: 5200,
            condition: "Good".into(),
            description: None,
            location: "Chennai".into(),
            images: vec![],
            status: MachineStatus::Available,
            specifications: IndexMap::new(),
        }
    }

    #[tokio::test]
    async fn test_list_and_get() {
        let backend = spawn_backend().await;
        let all = backend.list_machines().await.unwrap();
        let ids: Vec<&str> = all.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(all[0].specifications["power"], "76");
        assert_eq!(all[0].specifications["engine"], "Diesel");

        let one = backend.get_machine("abc").await.unwrap().unwrap();
        assert_eq!(one.id, "abc");
        assert_eq!(one.images, vec!["one.jpg"]);

        assert!(backend.get_machine("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_surfaces_backend_message() {
        let backend = spawn_backend().await;
        let created = backend.create_machine(&payload("JCB")).await.unwrap();
        assert_eq!(created.id, "new-id");
        assert_eq!(created.year, Some(2020));

        let err = backend.create_machine(&payload("dup")).await.unwrap_err();
        assert_eq!(err.user_message(), "Machine already exists");
    }

    #[tokio::test]
    async fn test_upload_keeps_order() {
        let backend = spawn_backend().await;
        let files = ["a.jpg", "b.jpg"]
            .iter()
            .map(|name| ImageUpload {
                file_name: name.to_string(),
                content_type: "image/jpeg".into(),
                bytes: axum::body::Bytes::from_static(b"jpeg"),
            })
            .collect();
        let urls = backend.upload_images(files).await.unwrap();
        assert_eq!(urls, vec!["https://cdn/a.jpg", "https://cdn/b.jpg"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let backend = spawn_backend().await;
        backend.delete_machine("abc").await.unwrap();
    }

    #[tokio::test]
    async fn test_reserved_characters_in_id_stay_in_one_segment() {
        let backend = spawn_backend().await;
        for id in ["abc?x=1", "abc#frag", "a/b", "50% off"] {
            let machine = backend.get_machine(id).await.unwrap().unwrap();
            assert_eq!(machine.id, id);
        }
    }

    #[test]
    fn test_machine_url_encoding() {
        let backend = HttpBackend::new(&BackendConfig {
            base_url: "http://backend/api".into(),
            timeout_seconds: 1,
        })
        .unwrap();
        assert_eq!(backend.machine_url("65a1-b_c.d~e"), "http://backend/api/machines/65a1-b_c.d~e");
        assert_eq!(backend.machine_url("abc?x=1"), "http://backend/api/machines/abc%3Fx%3D1");
        assert_eq!(backend.machine_url("a/b#c"), "http://backend/api/machines/a%2Fb%23c");
    }
}
