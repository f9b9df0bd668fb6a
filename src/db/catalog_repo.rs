// src/db/catalog_repo.rs

use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{Brand, Pack, PackItem, Product, ProductCategory},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---
    // Productos
    // ---

    // Lectura simple sobre la pool. El filtro replica los índices: por marca,
    // o por categoría, o todo el catálogo.
    pub async fn find_products(
        &self,
        brand: Option<Brand>,
        category: Option<ProductCategory>,
    ) -> Result<Vec<Product>, AppError> {
        let products = if let Some(brand) = brand {
            sqlx::query_as::<_, Product>(
                "SELECT * FROM products WHERE brand = ? ORDER BY name ASC",
            )
            .bind(brand)
            .fetch_all(&self.pool)
            .await?
        } else if let Some(category) = category {
            sqlx::query_as::<_, Product>(
                "SELECT * FROM products WHERE category = ? ORDER BY name ASC",
            )
            .bind(category)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?
        };
        Ok(products)
    }

    pub async fn find_product_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn find_product_by_sku<'e, E>(
        &self,
        executor: E,
        sku: &str,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE sku = ?")
            .bind(sku)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn insert_product<'e, E>(&self, executor: E, product: &Product) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO products (id, sku, name, brand, category, stock, min_stock, description, image_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.brand)
        .bind(product.category)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(&product.description)
        .bind(&product.image_url)
        .bind(product.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    // Reescribe los campos mutables del producto (el parche se resuelve en
    // el servicio, leyendo y fusionando dentro de la transacción).
    pub async fn update_product<'e, E>(&self, executor: E, product: &Product) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            UPDATE products
            SET name = ?, stock = ?, min_stock = ?, description = ?, image_url = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(&product.description)
        .bind(&product.image_url)
        .bind(product.id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn update_product_stock<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        new_stock: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("UPDATE products SET stock = ? WHERE id = ?")
            .bind(new_stock)
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete_product<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Packs y su BOM
    // ---

    pub async fn find_packs(&self, active_only: bool) -> Result<Vec<Pack>, AppError> {
        let packs = if active_only {
            sqlx::query_as::<_, Pack>("SELECT * FROM packs WHERE active = 1 ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?
        } else {
            sqlx::query_as::<_, Pack>("SELECT * FROM packs ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?
        };
        Ok(packs)
    }

    pub async fn find_pack_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Pack>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let pack = sqlx::query_as::<_, Pack>("SELECT * FROM packs WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(pack)
    }

    pub async fn insert_pack<'e, E>(&self, executor: E, pack: &Pack) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO packs (id, name, description, brand, active, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(pack.id)
        .bind(&pack.name)
        .bind(&pack.description)
        .bind(pack.brand)
        .bind(pack.active)
        .bind(pack.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn update_pack<'e, E>(&self, executor: E, pack: &Pack) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("UPDATE packs SET name = ?, description = ?, active = ? WHERE id = ?")
            .bind(&pack.name)
            .bind(&pack.description)
            .bind(pack.active)
            .bind(pack.id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn find_pack_items<'e, E>(
        &self,
        executor: E,
        pack_id: Uuid,
    ) -> Result<Vec<PackItem>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let items = sqlx::query_as::<_, PackItem>("SELECT * FROM pack_items WHERE pack_id = ?")
            .bind(pack_id)
            .fetch_all(executor)
            .await?;
        Ok(items)
    }

    pub async fn insert_pack_item<'e, E>(&self, executor: E, item: &PackItem) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "INSERT INTO pack_items (id, pack_id, product_id, quantity) VALUES (?, ?, ?, ?)",
        )
        .bind(item.id)
        .bind(item.pack_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .execute(executor)
        .await?;
        Ok(())
    }

    // Reemplazo destructivo del BOM: primero se borra todo.
    pub async fn delete_pack_items<'e, E>(&self, executor: E, pack_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("DELETE FROM pack_items WHERE pack_id = ?")
            .bind(pack_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
