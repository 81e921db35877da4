mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};

use common::{TestApp, product, spawn_app, spawn_app_with_broken_uploads};

const BOUNDARY: &str = "----pos-test-boundary";

fn multipart_request(token: &str, field: &str, file_name: &str, mime: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/products/upload")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect()
}

async fn put_product(app: &TestApp, token: &str, id: &str, body: Value) -> (StatusCode, Value) {
    app.request(Method::PUT, &format!("/api/products/{id}"), Some(token), Some(body))
        .await
}

#[tokio::test]
async fn category_delete_is_refused_while_products_reference_it() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let category = app.create_category(&token, "Minuman").await;

    let first = app
        .create_product(&token, product("Teh Botol", 10, 5000.0, Some(&category)))
        .await;
    app.create_product(&token, product("Air Mineral", 10, 3000.0, Some(&category)))
        .await;

    let uri = format!("/api/categories/{category}");
    let (status, body) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "CATEGORY_IN_USE");
    assert_eq!(body["details"]["productCount"], 2);
    assert!(body["message"].as_str().unwrap().contains("2 products"));

    let first_id = first["id"].as_str().unwrap();
    let (status, _) = app
        .request(Method::DELETE, &format!("/api/products/{first_id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["productCount"], 1);

    let (_, body) = app
        .request(Method::GET, &format!("{uri}/products"), Some(&token), None)
        .await;
    let remaining = body["data"][0]["id"].as_str().unwrap().to_string();
    app.request(Method::DELETE, &format!("/api/products/{remaining}"), Some(&token), None)
        .await;

    let (status, _) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.request(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn price_change_appends_exactly_one_history_row() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let created = app
        .create_product(&token, product("Kopi Sachet", 40, 100.0, None))
        .await;
    let id = created["id"].as_str().unwrap();

    // non-price edit
    let (status, _) = put_product(&app, &token, id, product("Kopi Sachet Susu", 35, 100.0, None)).await;
    assert_eq!(status, StatusCode::OK);

    let history_uri = format!("/api/products/{id}/price-history");
    let (_, body) = app.request(Method::GET, &history_uri, Some(&token), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    // 100 -> 120
    let (status, body) = put_product(&app, &token, id, product("Kopi Sachet Susu", 35, 120.0, None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, body) = app.request(Method::GET, &history_uri, Some(&token), None).await;
    let history = body["data"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["oldPrice"].as_f64(), Some(100.0));
    assert_eq!(history[0]["newPrice"].as_f64(), Some(120.0));
    assert_eq!(history[0]["changedByName"], "Administrator");

    let (_, body) = app
        .request(Method::GET, &format!("/api/products/{id}"), Some(&token), None)
        .await;
    assert_eq!(body["data"]["name"], "Kopi Sachet Susu");
    assert_eq!(body["data"]["updatedByName"], "Administrator");
}

#[tokio::test]
async fn low_stock_returns_only_products_at_or_below_threshold_ascending() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    for (name, qty) in [("A", 7), ("B", 5), ("C", 0), ("D", 3), ("E", 12)] {
        app.create_product(&token, product(name, qty, 1000.0, None)).await;
    }

    let (status, body) = app
        .request(Method::GET, "/api/products/low-stock?threshold=5", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body["data"]), vec!["C", "D", "B"]);

    // default threshold is 10
    let (_, body) = app
        .request(Method::GET, "/api/products/low-stock", Some(&token), None)
        .await;
    assert_eq!(names(&body["data"]), vec!["C", "D", "B", "A"]);
}

#[tokio::test]
async fn expired_view_uses_date_or_status() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let mut old = product("Roti Lama", 3, 8000.0, None);
    old["expDate"] = json!("2020-01-01");
    app.create_product(&token, old).await;

    let mut flagged = product("Susu Basi", 2, 7000.0, None);
    flagged["status"] = json!("kadaluarsa");
    app.create_product(&token, flagged).await;

    let mut fresh = product("Roti Baru", 3, 8000.0, None);
    fresh["expDate"] = json!("2999-12-31");
    app.create_product(&token, fresh).await;

    let (status, body) = app
        .request(Method::GET, "/api/products/expired", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body["data"]), vec!["Roti Lama", "Susu Basi"]);
}

#[tokio::test]
async fn product_validation_and_unknown_category() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/products",
            Some(&token),
            Some(json!({ "name": "", "qty": -1, "supplier": "S", "price": 10 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["name"].is_array());

    let (status, body) = app
        .request(
            Method::POST,
            "/api/products",
            Some(&token),
            Some(product("Teh", 1, 10.0, Some("8d2f0d7e-6d2a-4d8c-9a55-0c0c7b7f1a11"))),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let (status, body) = put_product(
        &app,
        &token,
        "8d2f0d7e-6d2a-4d8c-9a55-0c0c7b7f1a11",
        product("Teh", 1, 10.0, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
}

#[tokio::test]
async fn whitespace_only_name_and_supplier_are_rejected() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/products",
            Some(&token),
            Some(json!({ "name": "   ", "supplier": "   ", "qty": 1, "price": 10 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert!(body["details"]["name"].is_array());
    assert!(body["details"]["supplier"].is_array());

    let (_, body) = app.request(Method::GET, "/api/products", Some(&token), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn prices_beyond_storable_precision_are_validation_errors() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    for price in [json!(1e13), json!(100.005)] {
        let mut body = product("Teh", 1, 0.0, None);
        body["price"] = price;
        let (status, body) = app
            .request(Method::POST, "/api/products", Some(&token), Some(body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["error"], "VALIDATION_FAILED");
        assert!(body["details"]["price"].is_array());
    }

    app.create_product(&token, product("Teh", 1, 100.5, None)).await;
}

#[tokio::test]
async fn malformed_ids_and_queries_use_the_error_envelope() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    for uri in [
        "/api/products/not-a-uuid",
        "/api/products/low-stock?threshold=abc",
        "/api/products?categoryId=42",
        "/api/categories/not-a-uuid/products",
    ] {
        let (status, body) = app.request(Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false, "{uri}");
        assert_eq!(body["error"], "VALIDATION_FAILED", "{uri}");
    }
}

#[tokio::test]
async fn product_delete_succeeds_when_its_image_cannot_be_removed() {
    let app = spawn_app_with_broken_uploads().await;
    let token = app.admin_token().await;

    let mut with_image = product("Teh Botol", 5, 5000.0, None);
    with_image["pictureUrl"] = json!("/uploads/teh.png");
    let created = app.create_product(&token, with_image).await;
    let uri = format!("/api/products/{}", created["id"].as_str().unwrap());

    let (status, body) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);

    let (status, _) = app.request(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn category_names_are_unique_and_stats_are_reported() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let drinks = app.create_category(&token, "Minuman").await;
    app.create_category(&token, "Alat Tulis").await;

    let (status, body) = app
        .request(Method::POST, "/api/categories", Some(&token), Some(json!({ "name": "Minuman" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "CATEGORY_NAME_TAKEN");

    app.create_product(&token, product("Teh", 4, 10.0, Some(&drinks))).await;
    app.create_product(&token, product("Kopi", 6, 20.0, Some(&drinks))).await;

    let (status, body) = app
        .request(Method::GET, "/api/categories/stats", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let stats = body["data"].as_array().unwrap();
    assert_eq!(stats[0]["name"], "Alat Tulis");
    assert_eq!(stats[0]["productCount"], 0);
    assert_eq!(stats[1]["productCount"], 2);
    assert_eq!(stats[1]["totalStock"], 10);
    assert_eq!(stats[1]["avgPrice"].as_f64(), Some(15.0));

    let (_, body) = app
        .request(Method::GET, &format!("/api/products?categoryId={drinks}"), Some(&token), None)
        .await;
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|p| p["categoryName"] == "Minuman"));
}

#[tokio::test]
async fn upload_stores_images_and_product_delete_removes_them() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .send(multipart_request(&token, "image", "Teh Botol.png", "image/png", b"\x89PNG fake"))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let file_name = body["data"]["fileName"].as_str().unwrap().to_string();
    let file_url = body["data"]["fileUrl"].as_str().unwrap().to_string();
    assert_eq!(file_url, format!("/uploads/{file_name}"));
    assert!(file_name.starts_with("teh_botol-") && file_name.ends_with(".png"));
    assert!(app.upload_dir.join(&file_name).exists());

    let mut with_image = product("Teh Botol", 5, 5000.0, None);
    with_image["pictureUrl"] = json!(file_url);
    let created = app.create_product(&token, with_image).await;

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/products/{}", created["id"].as_str().unwrap()),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!app.upload_dir.join(&file_name).exists());
}

#[tokio::test]
async fn upload_rejects_non_images_oversized_files_and_non_admins() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .send(multipart_request(&token, "image", "notes.txt", "text/plain", b"hello"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_UPLOAD");

    // test config caps uploads at 1 KiB
    let (status, body) = app
        .send(multipart_request(&token, "image", "big.png", "image/png", &[0u8; 4096]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_UPLOAD");

    let (status, body) = app
        .send(multipart_request(&token, "file", "a.png", "image/png", b"x"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_UPLOAD");

    let employee = app.employee_token("siti", "001").await;
    let (status, _) = app
        .send(multipart_request(&employee, "image", "a.png", "image/png", b"x"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
