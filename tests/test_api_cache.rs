use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use notify_admin::domain::entities::FolderContents;
use notify_admin::domain::ports::{KeyValueStore, ServiceApi, TemplateFolderApi};
use notify_admin::infrastructure::notify_client::{ApiCache, NotifyClient, ServiceApiClient, TemplateFolderApiClient};
use notify_admin::infrastructure::persistence::{MemoryStore, NullStore};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SERVICE_ID: &str = "596364a0-858e-42c8-9062-a8fe822260eb";
const TEMPLATE_ID: &str = "b22d7d94-2197-4a7d-a8e7-fd5f9770bf48";
const FOLDER_ID: &str = "3a1f9c6e-2b4d-4e8f-9a0b-1c2d3e4f5a6b";

/// A stand-in for the notification API's template endpoints.
#[derive(Default)]
struct MockApi {
    templates: Vec<Value>,
    reads: usize,
}

type SharedApi = Arc<Mutex<MockApi>>;

async fn list_templates(State(api): State<SharedApi>) -> Json<Value> {
    let mut api = api.lock().unwrap();
    api.reads += 1;
    Json(json!({ "data": api.templates }))
}

async fn get_template(
    State(api): State<SharedApi>,
    Path((_service_id, template_id)): Path<(String, String)>,
) -> Json<Value> {
    let mut api = api.lock().unwrap();
    api.reads += 1;
    let template = api
        .templates
        .iter()
        .find(|t| t["id"] == template_id.as_str())
        .cloned()
        .unwrap_or(Value::Null);
    Json(json!({ "data": template }))
}

async fn update_template(
    State(api): State<SharedApi>,
    Path((_service_id, template_id)): Path<(String, String)>,
    Json(changes): Json<Value>,
) -> Json<Value> {
    let mut api = api.lock().unwrap();
    let template = api
        .templates
        .iter_mut()
        .find(|t| t["id"] == template_id.as_str())
        .unwrap();
    for (key, value) in changes.as_object().unwrap() {
        if key != "created_by" {
            template[key] = value.clone();
        }
    }
    Json(json!({ "data": template.clone() }))
}

async fn move_contents(
    State(api): State<SharedApi>,
    Path((_service_id, folder_id)): Path<(String, String)>,
    Json(contents): Json<Value>,
) -> Json<Value> {
    let mut api = api.lock().unwrap();
    let moved: Vec<String> = serde_json::from_value(contents["templates"].clone()).unwrap();
    for template in api.templates.iter_mut() {
        if moved.iter().any(|id| template["id"] == id.as_str()) {
            template["folder"] = json!(folder_id);
        }
    }
    Json(json!({}))
}

/// Serves the mock API on a free local port and returns its base URL.
async fn start_mock_api(api: SharedApi) -> String {
    let app = Router::new()
        .route("/service/:service_id/template", get(list_templates))
        .route(
            "/service/:service_id/template/:template_id",
            get(get_template).post(update_template),
        )
        .route(
            "/service/:service_id/template-folder/:folder_id/contents",
            post(move_contents),
        )
        .with_state(api);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

struct Clients {
    api: SharedApi,
    services: ServiceApiClient,
    folders: TemplateFolderApiClient,
}

async fn clients_with_store(store: Arc<dyn KeyValueStore>) -> Clients {
    let api: SharedApi = Arc::new(Mutex::new(MockApi {
        templates: vec![json!({
            "id": TEMPLATE_ID,
            "name": "Two week reminder",
            "template_type": "sms",
            "content": "Hello ((name))",
            "folder": null,
        })],
        reads: 0,
    }));
    let base_url = start_mock_api(api.clone()).await;
    let client = NotifyClient::new(&base_url, "notify-admin", "secret").unwrap();
    let cache = ApiCache::new(store, Duration::from_secs(60));
    Clients {
        api,
        services: ServiceApiClient::new(client.clone(), cache.clone()),
        folders: TemplateFolderApiClient::new(client, cache),
    }
}

async fn cached_clients() -> Clients {
    clients_with_store(Arc::new(MemoryStore::new())).await
}

impl Clients {
    fn reads(&self) -> usize {
        self.api.lock().unwrap().reads
    }
}

#[tokio::test]
async fn test_template_reads_are_served_from_cache() {
    let clients = cached_clients().await;

    let first = clients.services.get_service_templates(SERVICE_ID).await.unwrap();
    let second = clients.services.get_service_templates(SERVICE_ID).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(clients.reads(), 1);

    clients
        .services
        .get_service_template(SERVICE_ID, TEMPLATE_ID, None)
        .await
        .unwrap();
    clients
        .services
        .get_service_template(SERVICE_ID, TEMPLATE_ID, None)
        .await
        .unwrap();
    assert_eq!(clients.reads(), 2);
}

#[tokio::test]
async fn test_template_update_drops_cached_copies() {
    let clients = cached_clients().await;
    clients.services.get_service_templates(SERVICE_ID).await.unwrap();
    clients
        .services
        .get_service_template(SERVICE_ID, TEMPLATE_ID, None)
        .await
        .unwrap();

    clients
        .services
        .update_service_template_sender(SERVICE_ID, TEMPLATE_ID, Some("sms-sender-1"), "user-1")
        .await
        .unwrap();

    let template = clients
        .services
        .get_service_template(SERVICE_ID, TEMPLATE_ID, None)
        .await
        .unwrap();
    assert_eq!(template.reply_to.as_deref(), Some("sms-sender-1"));
    let templates = clients.services.get_service_templates(SERVICE_ID).await.unwrap();
    assert_eq!(templates[0].reply_to.as_deref(), Some("sms-sender-1"));
    assert_eq!(clients.reads(), 4);
}

#[tokio::test]
async fn test_move_to_folder_refreshes_list_and_moved_templates() {
    let clients = cached_clients().await;
    let before = clients.services.get_service_templates(SERVICE_ID).await.unwrap();
    assert_eq!(before[0].folder, None);
    clients
        .services
        .get_service_template(SERVICE_ID, TEMPLATE_ID, None)
        .await
        .unwrap();

    let contents = FolderContents {
        templates: vec![TEMPLATE_ID.to_string()],
        folders: Vec::new(),
    };
    clients
        .folders
        .move_to_folder(SERVICE_ID, Some(FOLDER_ID), &contents)
        .await
        .unwrap();

    let after = clients.services.get_service_templates(SERVICE_ID).await.unwrap();
    assert_eq!(after[0].folder.as_deref(), Some(FOLDER_ID));
    let template = clients
        .services
        .get_service_template(SERVICE_ID, TEMPLATE_ID, None)
        .await
        .unwrap();
    assert_eq!(template.folder.as_deref(), Some(FOLDER_ID));
}

#[tokio::test]
async fn test_null_store_always_reads_through() {
    let clients = clients_with_store(Arc::new(NullStore)).await;

    clients.services.get_service_templates(SERVICE_ID).await.unwrap();
    clients.services.get_service_templates(SERVICE_ID).await.unwrap();
    assert_eq!(clients.reads(), 2);
}
