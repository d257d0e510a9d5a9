//! End-to-end tests over the full router with an in-memory database.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use caja_core::{Cart, CartItem, PaymentMethod, Product, Role, SaleStatus, User};
use caja_db::{Database, DbConfig, NewProduct};
use caja_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt;

struct TestApp {
    router: Router,
    db: Database,
    cookie: Option<String>,
    admin: User,
    seller: User,
    coke: Product,
    bread: Product,
}

impl TestApp {
    async fn spawn() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let admin = db.users().insert("admin", "Admin", Role::Admin).await.unwrap();
        let seller = db.users().insert("vendedor", "Vendedor", Role::Seller).await.unwrap();
        let coke = db
            .products()
            .insert(&new_product("Coca-Cola 1.5L", "Coca-Cola", 1990, 10))
            .await
            .unwrap();
        let bread = db
            .products()
            .insert(&new_product("Pan amasado", "Panadería", 250, 2))
            .await
            .unwrap();

        let router = build_router(AppState::new(db.clone()), false);
        TestApp {
            router,
            db,
            cookie: None,
            admin,
            seller,
            coke,
            bread,
        }
    }

    /// Sends a request as `user`, carrying the session cookie along.
    async fn send(
        &mut self,
        method: Method,
        uri: &str,
        user: Option<i64>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = user {
            builder = builder.header("X-User-ID", id.to_string());
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie.as_str());
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&mut self, uri: &str, user: i64) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(user), None).await
    }

    async fn post(&mut self, uri: &str, user: i64, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(user), Some(body)).await
    }

    async fn stock_of(&self, id: i64) -> i64 {
        self.db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    /// Fills the cart and checks it out in cash, returning the sale JSON.
    async fn sell(&mut self, items: &[(i64, i64)], status: &str) -> Value {
        self.sell_with(items, status, "CASH").await
    }

    async fn sell_with(&mut self, items: &[(i64, i64)], status: &str, payment: &str) -> Value {
        let seller = self.seller.id;
        for (product_id, quantity) in items {
            let (code, _) = self
                .post("/cart/add", seller, json!({"product_id": product_id, "quantity": quantity}))
                .await;
            assert_eq!(code, StatusCode::OK);
        }
        let (code, body) = self
            .post("/sales", seller, json!({"payment_method": payment, "status": status}))
            .await;
        assert_eq!(code, StatusCode::OK, "{body}");
        body["sale"].clone()
    }
}

fn new_product(name: &str, brand: &str, sale_price: i64, stock: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        brand: brand.to_string(),
        category_id: None,
        description: None,
        purchase_price: sale_price / 2,
        is_purchase_with_tax: true,
        sale_price,
        is_sale_with_tax: true,
        stock,
    }
}

#[tokio::test]
async fn health_check_works() {
    let mut app = TestApp::spawn().await;
    let (status, body) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "caja-server");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::spawn().await;
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.router.oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn identity_is_required() {
    let mut app = TestApp::spawn().await;

    let (status, body) = app.send(Method::GET, "/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.get("/cart", 999).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let seller = app.seller.id;
    app.db.users().set_active(seller, false).await.unwrap();
    let (status, body) = app.get("/cart", seller).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn product_search() {
    let mut app = TestApp::spawn().await;
    let seller = app.seller.id;

    let (status, body) = app.get("/products/search?term=c", seller).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = app.get("/products/search?term=COCA", seller).await;
    assert_eq!(status, StatusCode::OK);
    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["name"], "Coca-Cola 1.5L");
    assert_eq!(hits[0]["sale_price"], 1990);
    assert_eq!(hits[0]["stock"], 10);
}

#[tokio::test]
async fn cart_add_update_remove() {
    let mut app = TestApp::spawn().await;
    let seller = app.seller.id;
    let coke = app.coke.id;
    let bread = app.bread.id;

    let (status, body) = app.post("/cart/add", seller, json!({"product_id": coke})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["cart"][0]["quantity"], 1);

    let (_, body) = app
        .post("/cart/add", seller, json!({"product_id": coke, "quantity": 2}))
        .await;
    assert_eq!(body["cart"].as_array().unwrap().len(), 1);
    assert_eq!(body["cart"][0]["quantity"], 3);
    assert_eq!(body["total"], 3 * 1990);

    let (status, body) = app
        .post("/cart/add", seller, json!({"product_id": bread, "quantity": 3}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");

    let (status, _) = app
        .post("/cart/add", seller, json!({"product_id": 999, "quantity": 1}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post("/cart/update", seller, json!({"product_id": coke, "quantity": 0}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .post("/cart/update", seller, json!({"product_id": coke, "quantity": 5}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5 * 1990);

    let (status, body) = app
        .send(Method::POST, &format!("/cart/remove/{coke}"), Some(seller), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"], json!([]));
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn cart_init_replaces_contents() {
    let mut app = TestApp::spawn().await;
    let seller = app.seller.id;
    let coke = app.coke.id;

    app.post("/cart/add", seller, json!({"product_id": app.bread.id})).await;
    let (status, body) = app
        .post(
            "/cart/init",
            seller,
            json!({"cart": [{"product_id": coke, "name": "Coca-Cola 1.5L", "quantity": 2, "price": 1800}]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"].as_array().unwrap().len(), 1);
    assert_eq!(body["total"], 3600);

    let (_, body) = app.get("/cart", seller).await;
    assert_eq!(body["cart"][0]["product_id"], coke);
}

#[tokio::test]
async fn cart_init_rejects_bad_rows() {
    let mut app = TestApp::spawn().await;
    let seller = app.seller.id;
    let coke = app.coke.id;

    app.post("/cart/add", seller, json!({"product_id": coke})).await;

    let huge = i64::MAX / 2;
    let (status, body) = app
        .post(
            "/cart/init",
            seller,
            json!({"cart": [{"product_id": coke, "name": "x", "quantity": 3, "price": huge}]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"], "Amount is too large");

    let (status, body) = app
        .post(
            "/cart/init",
            seller,
            json!({"cart": [{"product_id": coke, "name": "x", "quantity": 1, "price": -5}]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .post(
            "/cart/init",
            seller,
            json!({"cart": [{"product_id": coke, "name": "x", "quantity": 0, "price": 100}]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/cart", seller).await;
    assert_eq!(body["cart"][0]["quantity"], 1);
    assert_eq!(body["total"], 1990);
}

#[tokio::test]
async fn checkout_creates_sale_and_clears_cart() {
    let mut app = TestApp::spawn().await;
    let (coke, bread) = (app.coke.id, app.bread.id);

    let sale = app.sell(&[(coke, 3), (bread, 2)], "COMPLETED").await;
    assert_eq!(sale["number"], "VTA-00001");
    assert_eq!(sale["status"], "COMPLETED");
    assert_eq!(sale["is_stock_deducted"], true);
    assert_eq!(sale["total"], 3 * 1990 + 2 * 250);
    assert_eq!(sale["payment_method"], "CASH");
    assert_eq!(sale["user_id"], app.seller.id);

    assert_eq!(app.stock_of(coke).await, 7);
    assert_eq!(app.stock_of(bread).await, 0);

    let seller = app.seller.id;
    let (_, body) = app.get("/cart", seller).await;
    assert_eq!(body["cart"], json!([]));

    let (status, body) = app
        .post("/sales", seller, json!({"payment_method": "CASH"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CART_ERROR");
    assert_eq!(body["error"], "Cart is empty");

    let id = sale["id"].as_i64().unwrap();
    let (status, body) = app.get(&format!("/sales/{id}"), seller).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lines"].as_array().unwrap().len(), 2);
    assert_eq!(body["lines"][0]["product_name"], "Coca-Cola 1.5L");
    assert_eq!(body["lines"][0]["subtotal"], 3 * 1990);

    let (status, _) = app.get("/sales/4242", seller).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_checkout_keeps_cart() {
    let mut app = TestApp::spawn().await;
    let seller = app.seller.id;
    let bread = app.bread.clone();

    app.post("/cart/add", seller, json!({"product_id": bread.id, "quantity": 2}))
        .await;

    // another till sells one unit between adding and paying
    let other = Cart::from_items(vec![CartItem {
        product_id: bread.id,
        name: bread.name.clone(),
        quantity: 1,
        price: bread.sale_price,
    }]);
    app.db
        .engine()
        .checkout(&other, PaymentMethod::Cash, SaleStatus::Completed, None)
        .await
        .unwrap();

    let (status, body) = app
        .post("/sales", seller, json!({"payment_method": "DEBIT"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert_eq!(app.db.sales().count().await.unwrap(), 1);
    assert_eq!(app.stock_of(bread.id).await, 1);

    let (_, body) = app.get("/cart", seller).await;
    assert_eq!(body["cart"][0]["quantity"], 2);
}

#[tokio::test]
async fn cancel_restores_stock_once() {
    let mut app = TestApp::spawn().await;
    let coke = app.coke.id;
    let seller = app.seller.id;

    let sale = app.sell(&[(coke, 4)], "COMPLETED").await;
    let id = sale["id"].as_i64().unwrap();
    assert_eq!(app.stock_of(coke).await, 6);

    let (status, body) = app.post(&format!("/sales/{id}/cancel"), seller, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sale"]["status"], "CANCELLED");
    assert_eq!(body["sale"]["is_stock_deducted"], false);
    assert_eq!(app.stock_of(coke).await, 10);

    let (status, body) = app.post(&format!("/sales/{id}/cancel"), seller, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Sale is already cancelled");
    assert_eq!(app.stock_of(coke).await, 10);

    let (status, _) = app.post("/sales/4242/cancel", seller, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sales_list_filters_by_status_and_payment() {
    let mut app = TestApp::spawn().await;
    let (coke, bread) = (app.coke.id, app.bread.id);
    let seller = app.seller.id;

    let first = app.sell(&[(coke, 1)], "COMPLETED").await;
    let second = app.sell(&[(bread, 1)], "PENDING").await;
    let third = app
        .sell_with(&[(coke, 2)], "COMPLETED", "TRANSFER")
        .await;

    let (status, body) = app.get("/sales", seller).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<&Value> = body["sales"].as_array().unwrap().iter().collect();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0]["id"], third["id"]);
    assert_eq!(listed[2]["id"], first["id"]);

    let (_, body) = app.get("/sales?status=PENDING", seller).await;
    assert_eq!(body["sales"].as_array().unwrap().len(), 1);
    assert_eq!(body["sales"][0]["id"], second["id"]);

    let (_, body) = app
        .get("/sales?status=COMPLETED&payment_method=TRANSFER", seller)
        .await;
    assert_eq!(body["sales"].as_array().unwrap().len(), 1);
    assert_eq!(body["sales"][0]["number"], "VTA-00003");

    let today = chrono::Utc::now().date_naive();
    let (_, body) = app.get(&format!("/sales?date={today}&limit=2"), seller).await;
    assert_eq!(body["sales"].as_array().unwrap().len(), 2);

    let (_, body) = app.get("/sales?date=2000-01-01", seller).await;
    assert!(body["sales"].as_array().unwrap().is_empty());

    let (status, _) = app.get("/sales?status=LOST", seller).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::GET, "/sales", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn pending_sale_is_completed_later() {
    let mut app = TestApp::spawn().await;
    let coke = app.coke.id;
    let seller = app.seller.id;

    let sale = app.sell(&[(coke, 2)], "PENDING").await;
    assert_eq!(sale["status"], "PENDING");
    assert_eq!(sale["is_stock_deducted"], true);
    let id = sale["id"].as_i64().unwrap();

    let (status, body) = app
        .post(
            &format!("/sales/{id}/status"),
            seller,
            json!({"status": "COMPLETED", "payment_method": "TRANSFER"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sale"]["status"], "COMPLETED");
    assert_eq!(body["sale"]["payment_method"], "TRANSFER");
    assert_eq!(app.stock_of(coke).await, 8);
}

#[tokio::test]
async fn edit_requires_admin() {
    let mut app = TestApp::spawn().await;
    let coke = app.coke.id;
    let (seller, admin) = (app.seller.id, app.admin.id);

    let sale = app.sell(&[(coke, 8)], "COMPLETED").await;
    let id = sale["id"].as_i64().unwrap();
    let edit = json!({
        "cart": [{"product_id": coke, "name": "Coca-Cola 1.5L", "quantity": 10, "price": 1990}],
        "payment_method": "CREDIT",
        "status": "COMPLETED"
    });

    let (status, body) = app.post(&format!("/sales/{id}/edit"), seller, edit.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    assert_eq!(app.stock_of(coke).await, 2);

    // the 8 units already sold are returned before the 10 are checked
    let (status, body) = app.post(&format!("/sales/{id}/edit"), admin, edit).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["sale"]["is_modified"], true);
    assert_eq!(body["sale"]["total"], 10 * 1990);
    assert_eq!(body["sale"]["number"], "VTA-00001");
    assert_eq!(app.stock_of(coke).await, 0);

    let overflowing = json!({
        "cart": [{"product_id": coke, "name": "x", "quantity": 3, "price": i64::MAX / 2}],
        "payment_method": "CASH",
        "status": "COMPLETED"
    });
    let (status, body) = app.post(&format!("/sales/{id}/edit"), admin, overflowing).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(app.stock_of(coke).await, 0);
}

#[tokio::test]
async fn dashboard_reports_todays_sales() {
    let mut app = TestApp::spawn().await;
    let (coke, bread) = (app.coke.id, app.bread.id);
    let seller = app.seller.id;

    app.sell(&[(coke, 2)], "COMPLETED").await;
    app.sell(&[(bread, 1)], "PENDING").await;

    let (status, body) = app.get("/dashboard", seller).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sales"]["day"], 2 * 1990);
    assert_eq!(body["sales"]["year"], 2 * 1990);
    assert_eq!(body["top_products"]["day"]["product_id"], coke);
    assert_eq!(body["top_products"]["day"]["quantity"], 2);
    assert_eq!(body["top_profitable_products"][0]["product_id"], coke);
    assert_eq!(body["low_stock_products"][0]["name"], "Pan amasado");
    assert_eq!(body["low_stock_products"][0]["stock"], 1);
}
