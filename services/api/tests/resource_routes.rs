//! Router-level tests for the api service on the memory backend

use api::{AppState, repositories::Repositories, routes::create_router};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::{Identity, JwtConfig, JwtService, Role};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "api-routes-test-secret-0123456789abcdef";

struct TestApp {
    router: Router,
    jwt: JwtService,
}

impl TestApp {
    fn new() -> Self {
        let jwt = JwtService::new(JwtConfig::with_secret(SECRET)).unwrap();
        let router = create_router(AppState::new(Repositories::in_memory(), jwt.clone()));
        Self { router, jwt }
    }

    fn token(&self, role: Role, technician_id: Option<i32>, client_id: Option<i32>) -> String {
        let identity = Identity {
            id: 1,
            username: "caller".to_string(),
            email: "caller@example.com".to_string(),
            role,
            technician_id,
            client_id,
        };
        self.jwt.issue(&identity).unwrap().token
    }

    fn admin(&self) -> String {
        self.token(Role::Admin, None, None)
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(&self, uri: &str, body: Value) -> i64 {
        let admin = self.admin();
        let (status, value) = self.send("POST", uri, Some(&admin), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "POST {} failed: {}", uri, value);
        value["id"].as_i64().unwrap()
    }

    async fn client(&self, first_name: &str) -> i64 {
        self.create(
            "/api/clients",
            json!({"firstName": first_name, "lastName": "Petrov", "phone": "+7 900 111-22-33"}),
        )
        .await
    }

    async fn device(&self, client_id: i64) -> i64 {
        self.create(
            "/api/devices",
            json!({"type": "Phone", "brand": "Acme", "model": "X1", "clientId": client_id}),
        )
        .await
    }

    async fn service(&self, name: &str, price: &str) -> i64 {
        self.create("/api/services", json!({"name": name, "price": price}))
            .await
    }

    async fn technician(&self, first_name: &str) -> i64 {
        self.create(
            "/api/technicians",
            json!({"firstName": first_name, "lastName": "Smirnova", "specialization": "Phones"}),
        )
        .await
    }

    async fn order(&self, device_id: i64, service_id: i64, technician_id: i64) -> i64 {
        self.create(
            "/api/repairorders",
            json!({"deviceId": device_id, "serviceId": service_id, "technicianId": technician_id}),
        )
        .await
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "api-service");
}

#[tokio::test]
async fn test_client_devices_count() {
    let app = TestApp::new();
    let admin = app.admin();
    let client = app.client("Ivan").await;

    let uri = format!("/api/clients/{}", client);
    let (_, body) = app.send("GET", &uri, Some(&admin), None).await;
    assert_eq!(body["devicesCount"], 0);

    app.device(client).await;

    let (status, body) = app.send("GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["devicesCount"], 1);

    let (_, devices) = app
        .send("GET", &format!("{}/devices", uri), Some(&admin), None)
        .await;
    assert_eq!(devices[0]["type"], "Phone");
    assert_eq!(devices[0]["clientName"], "Ivan Petrov");
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let app = TestApp::new();
    let admin = app.admin();
    let client = app.client("Ivan").await;
    let device = app.device(client).await;
    let service = app.service("Screen", "49.90").await;
    let technician = app.technician("Anna").await;
    let order = app.order(device, service, technician).await;

    for uri in [
        format!("/api/repairorders/{}", order),
        format!("/api/devices/{}", device),
        format!("/api/services/{}", service),
        format!("/api/technicians/{}", technician),
        format!("/api/clients/{}", client),
    ] {
        let (status, _) = app.send("DELETE", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT, "DELETE {}", uri);

        let (status, body) = app.send("GET", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {}", uri);
        assert!(body["error"].as_str().unwrap().contains("not found"));

        let (status, _) = app.send("DELETE", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "second DELETE {}", uri);
    }
}

#[tokio::test]
async fn test_update_missing_is_not_found_without_write() {
    let app = TestApp::new();
    let admin = app.admin();

    let cases = [
        ("/api/clients/41", json!({"firstName": "Ivan", "lastName": "Petrov"})),
        ("/api/services/41", json!({"name": "Screen", "price": "10"})),
        ("/api/technicians/41", json!({"firstName": "Anna", "lastName": "Smirnova"})),
        ("/api/repairorders/41", json!({"status": "Ready"})),
    ];
    for (uri, body) in cases {
        let (status, _) = app.send("PUT", uri, Some(&admin), Some(body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "PUT {}", uri);
    }

    for uri in ["/api/clients", "/api/services", "/api/technicians", "/api/repairorders"] {
        let (_, list) = app.send("GET", uri, Some(&admin), None).await;
        assert_eq!(list, json!([]), "GET {}", uri);
    }
}

#[tokio::test]
async fn test_order_completion_flow() {
    let app = TestApp::new();
    let admin = app.admin();
    let client = app.client("Ivan").await;
    let device = app.device(client).await;
    let service = app.service("Screen", "49.90").await;
    let technician = app.technician("Anna").await;
    let order = app.order(device, service, technician).await;

    let uri = format!("/api/repairorders/{}", order);
    let (_, body) = app.send("GET", &uri, Some(&admin), None).await;
    assert_eq!(body["status"], "Received");
    assert_eq!(body["totalCost"], "0.00");
    assert_eq!(body["completedDate"], Value::Null);
    assert_eq!(body["deviceInfo"], "Acme X1");

    let (status, body) = app
        .send(
            "PATCH",
            &format!("{}/status", uri),
            Some(&admin),
            Some(json!({"status": "Completed"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Completed");
    assert!(body["completedDate"].is_string());

    let (status, _) = app
        .send(
            "PATCH",
            &format!("{}/status", uri),
            Some(&admin),
            Some(json!({"status": "Shipped"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send("PUT", &uri, Some(&admin), Some(json!({"status": "InProgress"})))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = app.send("GET", &uri, Some(&admin), None).await;
    assert_eq!(body["completedDate"], Value::Null);
}

#[tokio::test]
async fn test_order_with_unknown_reference() {
    let app = TestApp::new();
    let admin = app.admin();
    let service = app.service("Screen", "49.90").await;
    let technician = app.technician("Anna").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/repairorders",
            Some(&admin),
            Some(json!({"deviceId": 77, "serviceId": service, "technicianId": technician})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Device"));
}

#[tokio::test]
async fn test_role_gating() {
    let app = TestApp::new();
    let technician_token = app.token(Role::Technician, Some(1), None);
    let user_token = app.token(Role::User, None, None);

    let (status, _) = app.send("GET", "/api/clients", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send("GET", "/api/clients", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send("GET", "/api/clients", Some(&user_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send("GET", "/api/clients", Some(&technician_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            "POST",
            "/api/clients",
            Some(&technician_token),
            Some(json!({"firstName": "Ivan", "lastName": "Petrov"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send("GET", "/api/repairorders/statistics", Some(&technician_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Catalog and roster reads are public
    let (status, _) = app.send("GET", "/api/services", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send("GET", "/api/technicians", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send("GET", "/api/technicians/active", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_technician_edits_only_own_record() {
    let app = TestApp::new();
    let anna = app.technician("Anna").await as i32;
    let boris = app.technician("Boris").await as i32;
    let token = app.token(Role::Technician, Some(anna), None);

    let body = json!({"firstName": "Anna", "lastName": "Smirnova", "specialization": "Tablets"});
    let (status, _) = app
        .send("PUT", &format!("/api/technicians/{}", anna), Some(&token), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send("PUT", &format!("/api/technicians/{}", boris), Some(&token), Some(body))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, record) = app
        .send("GET", &format!("/api/technicians/{}", anna), None, None)
        .await;
    assert_eq!(record["specialization"], "Tablets");
}

#[tokio::test]
async fn test_order_ownership() {
    let app = TestApp::new();
    let owner = app.client("Ivan").await;
    let stranger = app.client("Oleg").await;
    let device = app.device(owner).await;
    let service = app.service("Screen", "49.90").await;
    let assigned = app.technician("Anna").await;
    let other = app.technician("Boris").await;
    let order = app.order(device, service, assigned).await;
    let uri = format!("/api/repairorders/{}", order);
    let patch = format!("{}/status", uri);

    let owner_token = app.token(Role::User, None, Some(owner as i32));
    let stranger_token = app.token(Role::User, None, Some(stranger as i32));
    let unlinked_token = app.token(Role::User, None, None);
    let assigned_token = app.token(Role::Technician, Some(assigned as i32), None);
    let other_token = app.token(Role::Technician, Some(other as i32), None);

    let (_, mine) = app
        .send("GET", "/api/repairorders/my-orders", Some(&owner_token), None)
        .await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    let (_, theirs) = app
        .send("GET", "/api/repairorders/my-orders", Some(&stranger_token), None)
        .await;
    assert_eq!(theirs, json!([]));
    let (_, none) = app
        .send("GET", "/api/repairorders/my-orders", Some(&unlinked_token), None)
        .await;
    assert_eq!(none, json!([]));
    let (_, assigned_orders) = app
        .send("GET", "/api/repairorders/my-orders", Some(&assigned_token), None)
        .await;
    assert_eq!(assigned_orders.as_array().unwrap().len(), 1);

    let (status, _) = app.send("GET", &uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send("GET", &uri, Some(&stranger_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let ready = json!({"status": "Ready"});
    let (status, _) = app
        .send("PATCH", &patch, Some(&owner_token), Some(ready.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .send("PATCH", &patch, Some(&other_token), Some(ready.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app
        .send("PATCH", &patch, Some(&assigned_token), Some(ready))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Ready");
}

#[tokio::test]
async fn test_popular_and_price_range() {
    let app = TestApp::new();
    let client = app.client("Ivan").await;
    let device = app.device(client).await;
    let technician = app.technician("Anna").await;
    let a = app.service("A", "30").await;
    let b = app.service("B", "10").await;
    let c = app.service("C", "20.5").await;

    for (service, count) in [(a, 5), (b, 5), (c, 2)] {
        for _ in 0..count {
            app.order(device, service, technician).await;
        }
    }

    let (status, popular) = app
        .send("GET", "/api/services/popular?top=2", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = popular
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(popular[0]["ordersCount"], 5);

    let (_, ranged) = app
        .send("GET", "/api/services/price-range?minPrice=10&maxPrice=20.5", None, None)
        .await;
    let names: Vec<&str> = ranged
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["B", "C"]);
    assert_eq!(ranged[1]["price"], "20.50");

    let (status, _) = app
        .send("GET", "/api/services/price-range?minPrice=30&maxPrice=10", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send("GET", "/api/services/popular?top=abc", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_statistics() {
    let app = TestApp::new();
    let admin = app.admin();
    let client = app.client("Ivan").await;
    let device = app.device(client).await;
    let service = app.service("Screen", "49.90").await;
    let technician = app.technician("Anna").await;

    let paid = app
        .create(
            "/api/repairorders",
            json!({"deviceId": device, "serviceId": service, "technicianId": technician, "totalCost": "75.5"}),
        )
        .await;
    let working = app.order(device, service, technician).await;
    app.order(device, service, technician).await;

    for (id, status) in [(paid, "Completed"), (working, "InProgress")] {
        let (code, _) = app
            .send(
                "PATCH",
                &format!("/api/repairorders/{}/status", id),
                Some(&admin),
                Some(json!({"status": status})),
            )
            .await;
        assert_eq!(code, StatusCode::OK);
    }

    let (status, stats) = app
        .send("GET", "/api/repairorders/statistics", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalOrders"], 3);
    assert_eq!(stats["completedOrders"], 1);
    assert_eq!(stats["inProgressOrders"], 1);
    assert_eq!(stats["totalRevenue"], "75.50");

    let (_, in_progress) = app
        .send("GET", "/api/repairorders/status/InProgress", Some(&admin), None)
        .await;
    assert_eq!(in_progress.as_array().unwrap().len(), 1);

    let (_, technician_view) = app
        .send("GET", &format!("/api/technicians/{}", technician), None, None)
        .await;
    assert_eq!(technician_view["ordersCount"], 3);
    assert_eq!(technician_view["activeOrdersCount"], 2);
}

#[tokio::test]
async fn test_malformed_input() {
    let app = TestApp::new();
    let admin = app.admin();

    let (status, body) = app
        .send("GET", "/api/clients/abc", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app
        .send(
            "POST",
            "/api/devices",
            Some(&admin),
            Some(json!({"type": "Phone", "brand": "Acme", "model": "X1", "clientId": 99})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send("POST", "/api/services", Some(&admin), Some(json!({"name": "Free"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
