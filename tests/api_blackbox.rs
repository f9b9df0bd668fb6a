// Test de caja negra: levanta el router de producción sobre una base en
// memoria, en un puerto efímero, y lo maneja por HTTP como lo haría la UI.

use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use mims_backend::{
    app::build_app,
    config::AppState,
    db::{BranchRepository, CatalogRepository, UserRepository},
    models::{
        auth::{Credential, User, UserRole},
        catalog::{Brand, Pack, PackItem, Product, ProductCategory},
        directory::Branch,
    },
};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(state: AppState) -> Self {
        let app = build_app(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("no se pudo abrir un puerto efímero");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct Seed {
    pool: SqlitePool,
    branch_id: Uuid,
    gorra: Product,
    totem: Product,
    kit_id: Uuid,
}

// Datos mínimos: una sucursal, un admin y un asesor aprobados, dos
// productos y un kit. La contraseña de ambos es "secreta1".
async fn seed() -> Seed {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    let branches = BranchRepository::new(pool.clone());
    let users = UserRepository::new(pool.clone());
    let catalog = CatalogRepository::new(pool.clone());

    let branch = Branch {
        id: Uuid::new_v4(),
        name: "Matriz Av. Los Guaytambos".to_string(),
        city: "Ambato".to_string(),
        location_details: "Av. Los Guaytambos y Av. Atahualpa".to_string(),
        active: true,
        manager_id: None,
        created_at: Utc::now(),
    };
    branches.insert(&pool, &branch).await.unwrap();

    let password_hash = bcrypt::hash("secreta1", bcrypt::DEFAULT_COST).unwrap();
    for (name, email, role) in [
        ("D. Chavez", "admin@grupopalacios.ec", UserRole::Admin),
        ("Juan Pérez", "jperez@grupopalacios.ec", UserRole::Advisor),
    ] {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            branch_id: branch.id,
            approved: true,
            created_at: Utc::now(),
        };
        users.insert_user(&pool, &user).await.unwrap();
        users
            .insert_credential(
                &pool,
                &Credential {
                    id: Uuid::new_v4(),
                    user_id: user.id,
                    password_hash: password_hash.clone(),
                    created_at: Utc::now(),
                },
            )
            .await
            .unwrap();
    }

    let gorra = Product {
        id: Uuid::new_v4(),
        sku: "GORRA-JAC-01".to_string(),
        name: "Gorra JAC bordada".to_string(),
        brand: Brand::Jac,
        category: ProductCategory::Merchandising,
        stock: 40,
        min_stock: 10,
        description: None,
        image_url: None,
        created_at: Utc::now(),
    };
    catalog.insert_product(&pool, &gorra).await.unwrap();

    let totem = Product {
        id: Uuid::new_v4(),
        sku: "TOTEM-JET-01".to_string(),
        name: "Tótem Jetour".to_string(),
        brand: Brand::Jetour,
        category: ProductCategory::Exhibicion,
        stock: 3,
        min_stock: 1,
        description: None,
        image_url: None,
        created_at: Utc::now(),
    };
    catalog.insert_product(&pool, &totem).await.unwrap();

    let kit = Pack {
        id: Uuid::new_v4(),
        name: "Kit Entrega JAC".to_string(),
        description: "Kit estándar de entrega".to_string(),
        brand: Brand::Jac,
        active: true,
        created_at: Utc::now(),
    };
    catalog.insert_pack(&pool, &kit).await.unwrap();
    catalog
        .insert_pack_item(
            &pool,
            &PackItem {
                id: Uuid::new_v4(),
                pack_id: kit.id,
                product_id: gorra.id,
                quantity: 2,
            },
        )
        .await
        .unwrap();

    Seed {
        pool,
        branch_id: branch.id,
        gorra,
        totem,
        kit_id: kit.id,
    }
}

async fn login(client: &reqwest::Client, base_url: &str, email: &str) -> String {
    let res = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&serde_json::json!({ "email": email, "password": "secreta1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn full_withdrawal_flow_over_http() {
    let seed = seed().await;
    let state = AppState::from_pool(seed.pool.clone(), "secreto-blackbox".to_string());
    let server = TestServer::spawn(state).await;
    let client = reqwest::Client::new();

    // Sin token no se pasa.
    let res = client
        .get(format!("{}/api/inventory/products", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

    let advisor_token = login(&client, &server.base_url, "jperez@grupopalacios.ec").await;
    let admin_token = login(&client, &server.base_url, "admin@grupopalacios.ec").await;

    // Retiro mixto: kit ×2 (gorra ×4) + una gorra suelta.
    let res = client
        .post(format!("{}/api/inventory/withdrawals", server.base_url))
        .bearer_auth(&advisor_token)
        .json(&serde_json::json!({
            "branchId": seed.branch_id,
            "reason": "Entrega",
            "items": [
                { "packId": seed.kit_id, "quantity": 2 },
                { "productId": seed.gorra.id, "quantity": 1 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let receipt: serde_json::Value = res.json().await.unwrap();
    assert_eq!(receipt["itemCount"], 2);
    let withdrawal_id = receipt["withdrawalId"].as_str().unwrap().to_string();

    // El historial sale enriquecido.
    let res = client
        .get(format!("{}/api/inventory/withdrawals", server.base_url))
        .bearer_auth(&advisor_token)
        .send()
        .await
        .unwrap();
    let history: serde_json::Value = res.json().await.unwrap();
    assert_eq!(history[0]["userName"], "Juan Pérez");
    assert_eq!(history[0]["branchName"], "Matriz Av. Los Guaytambos");
    assert_eq!(history[0]["items"][0]["fromPack"], seed.kit_id.to_string());

    // Exhibición sin autorizador: 403 con el mensaje tal cual.
    let res = client
        .post(format!("{}/api/inventory/withdrawals", server.base_url))
        .bearer_auth(&advisor_token)
        .json(&serde_json::json!({
            "branchId": seed.branch_id,
            "reason": "Activación Mall",
            "items": [{ "productId": seed.totem.id, "quantity": 1 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Los artículos de Exhibición requieren autorización de un Supervisor o Admin."
    );

    // Pedir más de lo que hay: 409 y nada descontado (quedaban 35 gorras).
    let res = client
        .post(format!("{}/api/inventory/withdrawals", server.base_url))
        .bearer_auth(&advisor_token)
        .json(&serde_json::json!({
            "branchId": seed.branch_id,
            "reason": "Feria",
            "items": [{ "productId": seed.gorra.id, "quantity": 99 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CONFLICT);

    let res = client
        .get(format!(
            "{}/api/inventory/products/sku/GORRA-JAC-01",
            server.base_url
        ))
        .bearer_auth(&advisor_token)
        .send()
        .await
        .unwrap();
    let gorra: serde_json::Value = res.json().await.unwrap();
    assert_eq!(gorra["stock"], 35);

    // Reversa: restituye y solo funciona una vez.
    let res = client
        .post(format!(
            "{}/api/inventory/withdrawals/{withdrawal_id}/revert",
            server.base_url
        ))
        .bearer_auth(&advisor_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let res = client
        .post(format!(
            "{}/api/inventory/withdrawals/{withdrawal_id}/revert",
            server.base_url
        ))
        .bearer_auth(&advisor_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CONFLICT);

    // El dashboard refleja el estado final.
    let res = client
        .get(format!("{}/api/inventory/dashboard", server.base_url))
        .bearer_auth(&advisor_token)
        .send()
        .await
        .unwrap();
    let stats: serde_json::Value = res.json().await.unwrap();
    assert_eq!(stats["totalProducts"], 2);
    assert_eq!(stats["totalStock"], 43);
    assert_eq!(stats["activePacks"], 1);

    // El log de auditoría es solo para admins.
    let res = client
        .get(format!("{}/api/audit", server.base_url))
        .bearer_auth(&advisor_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::FORBIDDEN);

    let res = client
        .get(format!("{}/api/audit", server.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let entries: serde_json::Value = res.json().await.unwrap();
    let actions: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert!(actions.contains(&"NEW_WITHDRAWAL"));
    assert!(actions.contains(&"REVERT_WITHDRAWAL"));
}

#[tokio::test]
async fn role_guards_gate_catalog_mutations() {
    let seed = seed().await;
    let state = AppState::from_pool(seed.pool.clone(), "secreto-blackbox".to_string());
    let server = TestServer::spawn(state).await;
    let client = reqwest::Client::new();

    let advisor_token = login(&client, &server.base_url, "jperez@grupopalacios.ec").await;
    let admin_token = login(&client, &server.base_url, "admin@grupopalacios.ec").await;

    let payload = serde_json::json!({
        "sku": "LLAVERO-KR-01",
        "name": "Llavero Karry",
        "brand": "Karry",
        "category": "Merchandising",
        "stock": 200,
        "minStock": 30
    });

    // Un asesor no crea productos.
    let res = client
        .post(format!("{}/api/inventory/products", server.base_url))
        .bearer_auth(&advisor_token)
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::FORBIDDEN);

    // El admin sí; el duplicado después da 409.
    let res = client
        .post(format!("{}/api/inventory/products", server.base_url))
        .bearer_auth(&admin_token)
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);

    let res = client
        .post(format!("{}/api/inventory/products", server.base_url))
        .bearer_auth(&admin_token)
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CONFLICT);
}
