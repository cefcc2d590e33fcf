//! Products service.

use async_trait::async_trait;
use mockall::automock;
use nutrishop::products::{Product, ProductUuid};
use tracing::info;

use crate::{
    domain::products::{data::ProductUpdate, errors::ProductsServiceError},
    store::Store,
};

#[derive(Debug, Clone)]
pub struct InMemoryProductsService {
    store: Store,
}

impl InMemoryProductsService {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProductsService for InMemoryProductsService {
    async fn list_products(&self) -> Result<Vec<Product>, ProductsServiceError> {
        let mut products = self.store.products().values().await;

        products.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(products)
    }

    async fn get_product(&self, product: ProductUuid) -> Result<Product, ProductsServiceError> {
        self.store
            .products()
            .get(product)
            .await
            .ok_or(ProductsServiceError::NotFound)
    }

    #[tracing::instrument(
        name = "products.service.create_product",
        skip(self, product),
        fields(product_uuid = %product.uuid),
        err
    )]
    async fn create_product(&self, product: Product) -> Result<Product, ProductsServiceError> {
        self.store
            .products()
            .insert(product.uuid, product.clone())
            .await?;

        info!(product_uuid = %product.uuid, "created product");

        Ok(product)
    }

    #[tracing::instrument(
        name = "products.service.update_product",
        skip(self, update),
        fields(product_uuid = %product),
        err
    )]
    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<Product, ProductsServiceError> {
        let document = self
            .store
            .products()
            .document(product)
            .await
            .ok_or(ProductsServiceError::NotFound)?;

        let mut current = document.lock().await;

        update.apply(&mut current);

        info!(product_uuid = %product, "updated product");

        Ok(current.clone())
    }

    #[tracing::instrument(
        name = "products.service.delete_product",
        skip(self),
        fields(product_uuid = %product),
        err
    )]
    async fn delete_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError> {
        if !self.store.products().remove(product).await {
            return Err(ProductsServiceError::NotFound);
        }

        info!(product_uuid = %product, "deleted product");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieves all products, ordered by name.
    async fn list_products(&self) -> Result<Vec<Product>, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductUuid) -> Result<Product, ProductsServiceError>;

    /// Adds a product to the catalog.
    async fn create_product(&self, product: Product) -> Result<Product, ProductsServiceError>;

    /// Replaces the mutable fields of a product.
    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<Product, ProductsServiceError>;

    /// Removes a product from the catalog.
    async fn delete_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{TestContext, helpers::usd};

    use super::*;

    #[tokio::test]
    async fn create_product_then_get_returns_it() -> TestResult {
        let ctx = TestContext::new();
        let created = ctx.create_product("Whey", 2999, 10).await?;

        let product = ctx.products.get_product(created.uuid).await?;

        assert_eq!(product, created);
        assert_eq!(product.final_price(), usd(2999));

        Ok(())
    }

    #[tokio::test]
    async fn get_product_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new();

        let result = ctx.products.get_product(ProductUuid::new()).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn create_product_duplicate_uuid_returns_already_exists() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Oats", 650, 5).await?;

        let result = ctx.products.create_product(product).await;

        assert!(
            matches!(result, Err(ProductsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_products_is_ordered_by_name() -> TestResult {
        let ctx = TestContext::new();

        ctx.create_product("Oats", 650, 5).await?;
        ctx.create_product("Bars", 1800, 5).await?;

        let names: Vec<String> = ctx
            .products
            .list_products()
            .await?
            .into_iter()
            .map(|product| product.name)
            .collect();

        assert_eq!(names, vec!["Bars".to_string(), "Oats".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn update_product_replaces_fields() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Greens", 3400, 15).await?;

        let updated = ctx
            .products
            .update_product(
                product.uuid,
                ProductUpdate {
                    name: "Super Greens".to_string(),
                    price: usd(3600),
                    sale_price: Some(usd(3000)),
                    stock_quantity: 2,
                    is_active: true,
                },
            )
            .await?;

        assert_eq!(updated.name, "Super Greens");
        assert_eq!(updated.final_price(), usd(3000));
        assert_eq!(ctx.products.get_product(product.uuid).await?, updated);

        Ok(())
    }

    #[tokio::test]
    async fn update_product_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new();

        let result = ctx
            .products
            .update_product(
                ProductUuid::new(),
                ProductUpdate {
                    name: "Ghost".to_string(),
                    price: usd(100),
                    sale_price: None,
                    stock_quantity: 0,
                    is_active: false,
                },
            )
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn delete_product_makes_it_not_found() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Bars", 1800, 4).await?;

        ctx.products.delete_product(product.uuid).await?;

        let result = ctx.products.get_product(product.uuid).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound after deletion, got {result:?}"
        );

        let again = ctx.products.delete_product(product.uuid).await;

        assert!(matches!(again, Err(ProductsServiceError::NotFound)));

        Ok(())
    }
}
