//! API integration tests
//!
//! Each test starts the router on an ephemeral port in front of an in-memory
//! backend and drives it over HTTP.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{multipart, Client, StatusCode};
use serde_json::{json, Value};

use heavy_horizon::{
    api,
    backend::MachineBackend,
    config::AppConfig,
    error::{AppError, AppResult},
    models::{ImageUpload, MachinePayload, MachineRecord},
    services::Services,
    AppState,
};

/// Backend keeping machines in memory
#[derive(Default)]
struct MemoryBackend {
    machines: Mutex<Vec<MachineRecord>>,
    uploads: Mutex<usize>,
    /// Message returned by the next create/update, if set
    reject_saves_with: Mutex<Option<String>>,
}

impl MemoryBackend {
    fn seeded(records: Vec<Value>) -> Self {
        let machines = records
            .into_iter()
            .map(|r| serde_json::from_value(r).expect("valid record"))
            .collect();
        Self {
            machines: Mutex::new(machines),
            ..Default::default()
        }
    }

    fn record(id: &str, payload: &MachinePayload) -> MachineRecord {
        let mut value = serde_json::to_value(payload).expect("serializable payload");
        value["_id"] = json!(id);
        value["machineCode"] = json!(format!("HH-{}", id));
        serde_json::from_value(value).expect("valid record")
    }

    fn check_rejection(&self) -> AppResult<()> {
        match self.reject_saves_with.lock().unwrap().clone() {
            Some(message) => Err(AppError::Backend {
                status: Some(400),
                message: Some(message),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MachineBackend for MemoryBackend {
    async fn list_machines(&self) -> AppResult<Vec<MachineRecord>> {
        Ok(self.machines.lock().unwrap().clone())
    }

    async fn get_machine(&self, id: &str) -> AppResult<Option<MachineRecord>> {
        Ok(self
            .machines
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn create_machine(&self, payload: &MachinePayload) -> AppResult<MachineRecord> {
        self.check_rejection()?;
        let mut machines = self.machines.lock().unwrap();
        let record = Self::record(&format!("new{}", machines.len()), payload);
        machines.push(record.clone());
        Ok(record)
    }

    async fn update_machine(&self, id: &str, payload: &MachinePayload) -> AppResult<MachineRecord> {
        self.check_rejection()?;
        let mut machines = self.machines.lock().unwrap();
        let slot = machines
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::Backend {
                status: Some(404),
                message: Some("Machine not found".to_string()),
            })?;
        *slot = Self::record(id, payload);
        Ok(slot.clone())
    }

    async fn delete_machine(&self, id: &str) -> AppResult<()> {
        self.machines.lock().unwrap().retain(|m| m.id != id);
        Ok(())
    }

    async fn upload_images(&self, files: Vec<ImageUpload>) -> AppResult<Vec<String>> {
        let mut uploads = self.uploads.lock().unwrap();
        *uploads += 1;
        Ok(files
            .iter()
            .map(|f| format!("https://cdn.example.com/{}", f.file_name))
            .collect())
    }
}

struct TestServer {
    base: String,
    client: Client,
    backend: Arc<MemoryBackend>,
    services: Arc<Services>,
}

impl TestServer {
    async fn start(backend: MemoryBackend) -> Self {
        let backend = Arc::new(backend);
        let config = AppConfig::default();
        let services = Arc::new(Services::new(backend.clone(), &config));
        let state = AppState {
            config: Arc::new(config),
            services: services.clone(),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, api::router(state)).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            client: Client::new(),
            backend,
            services,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> (StatusCode, Value) {
        let response = request.send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap_or(Value::Null))
    }
}

fn catalog() -> MemoryBackend {
    MemoryBackend::seeded(vec![
        json!({
            "_id": "b1",
            "title": "JCB 3DX",
            "model": "3DX",
            "category": "Backhoe Loader",
            "type": "Rental",
            "year": 2020,
            "hours": 5200,
            "condition": "Pure Earthwork Condition",
            "location": "Chennai",
            "images": ["https://cdn.example.com/b1-0.jpg", "https://cdn.example.com/b1-1.jpg"]
        }),
        json!({
            "_id": "e1",
            "title": "Hitachi EX200",
            "model": "EX200",
            "category": "Excavator",
            "type": "Rental",
            "image": "https://cdn.example.com/e1.jpg"
        }),
        json!({
            "_id": "s1",
            "title": "JCB 3DX Super",
            "model": "3DX Super",
            "category": "Backhoe Loader",
            "type": "Sales",
            "status": "Sold",
            "images": []
        }),
    ])
}

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start(MemoryBackend::default()).await;

    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (_, body) = server.get("/ready").await;
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_section_listing_and_category_filter() {
    let server = TestServer::start(catalog()).await;

    let (status, body) = server.get("/services/machines").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "loaded");
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["b1", "e1"]);

    let (_, body) = server.get("/services/machines?category=excavators").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["gallery"]["src"], "https://cdn.example.com/e1.jpg");

    let (status, _) = server.get("/services/machines?category=cranes").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_full_listing_shows_status() {
    let server = TestServer::start(catalog()).await;

    let (_, body) = server.get("/machines").await;
    let cards = body["data"].as_array().unwrap();
    assert_eq!(cards.len(), 3);
    let sold = cards.iter().find(|c| c["id"] == "s1").unwrap();
    assert_eq!(sold["status"], "Sold");
    assert_eq!(sold["sold"], true);
}

#[tokio::test]
async fn test_categories_count() {
    let server = TestServer::start(catalog()).await;

    let (_, body) = server.get("/categories?purpose=Rental").await;
    let tiles = body["data"].as_array().unwrap();
    let count = |key: &str| tiles.iter().find(|t| t["key"] == key).unwrap()["count"].clone();
    assert_eq!(count("backhoe-loaders"), 1);
    assert_eq!(count("excavators"), 1);
    assert_eq!(count("backhoe-breakers"), 0);
}

#[tokio::test]
async fn test_detail_gallery_navigation() {
    let server = TestServer::start(catalog()).await;

    let (status, body) = server.get("/services/machines/b1").await;
    assert_eq!(status, StatusCode::OK);
    let gallery = &body["data"]["gallery"];
    assert_eq!(gallery["index"], 0);
    assert_eq!(gallery["controls"]["counter"], "1 / 2");
    assert_eq!(gallery["controls"]["previous"], 1);

    let (_, body) = server.get("/services/machines/b1?image=1&failed=1").await;
    let gallery = &body["data"]["gallery"];
    assert_eq!(gallery["index"], 1);
    assert_eq!(gallery["src"], gallery["fallback_src"]);
    assert_eq!(gallery["alt"], "JCB 3DX - Image 2");

    let (_, body) = server.get("/services/machines/b1?image=9").await;
    assert_eq!(body["data"]["gallery"]["index"], 0);
}

#[tokio::test]
async fn test_detail_without_images() {
    let server = TestServer::start(catalog()).await;

    let (_, body) = server.get("/sales/machines/s1").await;
    let gallery = &body["data"]["gallery"];
    assert_eq!(gallery["total"], 0);
    assert_eq!(gallery["alt"], "No image available");
    assert!(gallery["controls"].is_null());
    assert_eq!(body["data"]["back"]["path"], "/sales");
}

#[tokio::test]
async fn test_detail_not_found() {
    let server = TestServer::start(catalog()).await;

    let (status, body) = server.get("/services/machines/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["state"], "not_found");
}

#[tokio::test]
async fn test_enquiry_links() {
    let server = TestServer::start(catalog()).await;

    let (status, body) = server
        .get("/sales/machines/s1/enquiry?page_url=https%3A%2F%2Fsite.test%2Fsales%2Fs1")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modal"]["enquiry_type"], "Sales");
    let whatsapp = body["whatsapp_url"].as_str().unwrap();
    assert!(whatsapp.starts_with("https://wa.me/"));
    assert!(whatsapp.contains("Source%3A%20https%3A%2F%2Fsite.test%2Fsales%2Fs1"));
    assert!(body["call_url"].as_str().unwrap().starts_with("tel:"));

    let (status, _) = server.get("/sales/machines/nope/enquiry").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_delete_requires_confirmation() {
    let server = TestServer::start(catalog()).await;

    let (status, _) = server
        .send(server.client.delete(server.url("/admin/machines/b1")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .send(server.client.delete(server.url("/admin/machines/b1?confirm=true")))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = server.get("/admin/machines").await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["id"] != "b1"));
}

#[tokio::test]
async fn test_create_machine_with_images() {
    let server = TestServer::start(MemoryBackend::default()).await;

    let (status, view) = server
        .send(server.client.post(server.url("/admin/drafts")).json(&json!({})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view["heading"], "Add New Machine");
    let session = view["session_id"].as_str().unwrap().to_string();

    let (status, _) = server
        .send(
            server
                .client
                .patch(server.url(&format!("/admin/drafts/{}", session)))
                .json(&json!({
                    "title": "JCB 3DX",
                    "model": "3DX",
                    "type": "Sales",
                    "year": "2019",
                    "hours": 4100,
                    "condition": "<p>Excellent</p>",
                    "location": "Chennai"
                })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let form = multipart::Form::new()
        .part(
            "images",
            multipart::Part::bytes(b"one".to_vec())
                .file_name("one.jpg")
                .mime_str("image/jpeg")
                .unwrap(),
        )
        .part(
            "images",
            multipart::Part::bytes(b"two".to_vec())
                .file_name("two.jpg")
                .mime_str("image/jpeg")
                .unwrap(),
        );
    let (status, view) = server
        .send(
            server
                .client
                .post(server.url(&format!("/admin/drafts/{}/images", session)))
                .multipart(form),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["images"].as_array().unwrap().len(), 2);
    assert_eq!(view["remaining_slots"], 8);

    let preview_url = format!("{}{}", server.base, view["images"][0]["url"].as_str().unwrap());
    let preview = server.client.get(&preview_url).send().await.unwrap();
    assert_eq!(preview.status(), StatusCode::OK);
    assert_eq!(preview.headers()["content-type"], "image/jpeg");
    assert_eq!(preview.bytes().await.unwrap().as_ref(), b"one");

    let (status, body) = server
        .send(
            server
                .client
                .post(server.url(&format!("/admin/drafts/{}/submit", session))),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["machine"]["title"], "JCB 3DX");
    assert_eq!(body["machine"]["year"], 2019);
    assert_eq!(
        body["machine"]["images"],
        json!(["https://cdn.example.com/one.jpg", "https://cdn.example.com/two.jpg"])
    );
    assert_eq!(body["editor"]["message"]["text"], "Machine added successfully");
    assert_eq!(body["editor"]["images"], json!([]));
    assert_eq!(*server.backend.uploads.lock().unwrap(), 1);

    // Previews are released once the save succeeds
    let preview = server.client.get(&preview_url).send().await.unwrap();
    assert_eq!(preview.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.services.previews.live(), 0);
}

#[tokio::test]
async fn test_edit_machine_keeps_existing_images() {
    let server = TestServer::start(catalog()).await;

    let (_, view) = server
        .send(
            server
                .client
                .post(server.url("/admin/drafts"))
                .json(&json!({"machine_id": "b1"})),
        )
        .await;
    assert_eq!(view["heading"], "Edit Machine");
    let session = view["session_id"].as_str().unwrap().to_string();

    let (_, view) = server
        .send(
            server
                .client
                .delete(server.url(&format!("/admin/drafts/{}/images/0", session))),
        )
        .await;
    assert_eq!(view["images"][0]["url"], "https://cdn.example.com/b1-1.jpg");

    server
        .send(
            server
                .client
                .patch(server.url(&format!("/admin/drafts/{}", session)))
                .json(&json!({"status": "Sold"})),
        )
        .await;

    let (status, body) = server
        .send(
            server
                .client
                .post(server.url(&format!("/admin/drafts/{}/submit", session))),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["machine"]["_id"], "b1");
    assert_eq!(body["machine"]["status"], "Sold");
    assert_eq!(body["machine"]["images"], json!(["https://cdn.example.com/b1-1.jpg"]));
    assert_eq!(body["editor"]["message"]["text"], "Machine updated successfully");
    assert_eq!(*server.backend.uploads.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_submit_invalid_draft() {
    let server = TestServer::start(MemoryBackend::default()).await;

    let (_, view) = server
        .send(server.client.post(server.url("/admin/drafts")).json(&json!({})))
        .await;
    let session = view["session_id"].as_str().unwrap().to_string();

    server
        .send(
            server
                .client
                .patch(server.url(&format!("/admin/drafts/{}", session)))
                .json(&json!({"condition": "<p><br></p>", "location": "Chennai"})),
        )
        .await;

    let (status, body) = server
        .send(
            server
                .client
                .post(server.url(&format!("/admin/drafts/{}/submit", session))),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Description is mandatory");
    assert!(server.backend.machines.lock().unwrap().is_empty());

    let (_, view) = server
        .send(
            server
                .client
                .delete(server.url(&format!("/admin/drafts/{}/message", session))),
        )
        .await;
    assert!(view["message"].is_null());
}

#[tokio::test]
async fn test_backend_rejection_is_shown_verbatim() {
    let backend = MemoryBackend::default();
    *backend.reject_saves_with.lock().unwrap() = Some("Machine code already exists".into());
    let server = TestServer::start(backend).await;

    let (_, view) = server
        .send(server.client.post(server.url("/admin/drafts")).json(&json!({})))
        .await;
    let session = view["session_id"].as_str().unwrap().to_string();
    server
        .send(
            server
                .client
                .patch(server.url(&format!("/admin/drafts/{}", session)))
                .json(&json!({"title": "X", "condition": "<p>ok</p>", "location": "Pune"})),
        )
        .await;

    let (status, body) = server
        .send(
            server
                .client
                .post(server.url(&format!("/admin/drafts/{}/submit", session))),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "Machine code already exists");

    let (_, view) = server.get(&format!("/admin/drafts/{}", session)).await;
    assert_eq!(view["message"]["kind"], "error");
    assert_eq!(view["message"]["text"], "Machine code already exists");
    assert_eq!(view["draft"]["title"], "X");
    assert_eq!(view["status"], "idle");
}

#[tokio::test]
async fn test_image_limit() {
    let server = TestServer::start(MemoryBackend::default()).await;

    let (_, view) = server
        .send(server.client.post(server.url("/admin/drafts")).json(&json!({})))
        .await;
    let session = view["session_id"].as_str().unwrap().to_string();

    let form = (0..11).fold(multipart::Form::new(), |form, i| {
        form.part(
            "images",
            multipart::Part::bytes(vec![0u8; 4]).file_name(format!("{}.jpg", i)),
        )
    });
    let (status, body) = server
        .send(
            server
                .client
                .post(server.url(&format!("/admin/drafts/{}/images", session)))
                .multipart(form),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Maximum 10 images allowed");
    assert_eq!(server.services.previews.live(), 0);
}

#[tokio::test]
async fn test_close_session() {
    let server = TestServer::start(MemoryBackend::default()).await;

    let (_, view) = server
        .send(server.client.post(server.url("/admin/drafts")).json(&json!({})))
        .await;
    let session = view["session_id"].as_str().unwrap().to_string();

    let (status, _) = server
        .send(server.client.delete(server.url(&format!("/admin/drafts/{}", session))))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = server.get(&format!("/admin/drafts/{}", session)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
