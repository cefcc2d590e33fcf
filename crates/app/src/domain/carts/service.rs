//! Carts service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use nutrishop::{
    carts::{Cart, CartError, CartUuid},
    coupons::CouponLookup,
    products::{Product, ProductUuid},
    users::UserUuid,
};
use rusty_money::iso::Currency;
use tracing::{Span, info};

use crate::{
    domain::{carts::errors::CartsServiceError, products::ProductsService},
    store::{Document, Store},
};

/// Coupon codes shared by every cart.
pub type Coupons = Arc<dyn CouponLookup + Send + Sync>;

#[derive(Clone)]
pub struct InMemoryCartsService {
    store: Store,
    products: Arc<dyn ProductsService>,
    coupons: Coupons,
    currency: &'static Currency,
}

impl fmt::Debug for InMemoryCartsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCartsService")
            .field("store", &self.store)
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}

impl InMemoryCartsService {
    #[must_use]
    pub fn new(
        store: Store,
        products: Arc<dyn ProductsService>,
        coupons: Coupons,
        currency: &'static Currency,
    ) -> Self {
        Self {
            store,
            products,
            coupons,
            currency,
        }
    }

    async fn document(&self, owner: UserUuid) -> Document<Cart> {
        let currency = self.currency;

        self.store
            .carts()
            .get_or_insert_with(owner, || {
                Cart::new(CartUuid::new(), owner, currency, Timestamp::now())
            })
            .await
    }

    async fn available_product(
        &self,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Product, CartsServiceError> {
        let found = self
            .products
            .get_product(product)
            .await
            .map_err(|error| CartsServiceError::from_catalog(product, error))?;

        found.ensure_available(quantity)?;

        Ok(found)
    }
}

fn record_cart(cart: &Cart) {
    let span = Span::current();

    span.record("item_count", cart.len());
    span.record("total", tracing::field::display(cart.total()));
}

#[async_trait]
impl CartsService for InMemoryCartsService {
    async fn get_cart(&self, owner: UserUuid) -> Result<Cart, CartsServiceError> {
        let document = self.document(owner).await;
        let cart = document.lock().await.clone();

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self),
        fields(
            owner = %owner,
            product_uuid = %product,
            item_count = tracing::field::Empty,
            total = tracing::field::Empty
        ),
        err
    )]
    async fn add_item(
        &self,
        owner: UserUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity.into());
        }

        let document = self.document(owner).await;
        let mut cart = document.lock().await;

        let in_cart = cart.item(product).map_or(0, |item| item.quantity());
        let found = self
            .available_product(product, in_cart.saturating_add(quantity))
            .await?;

        cart.add_item(product, quantity, found.final_price(), Timestamp::now())?;

        record_cart(&cart);
        info!(cart_uuid = %cart.uuid(), "added cart item");

        Ok(cart.clone())
    }

    #[tracing::instrument(
        name = "carts.service.update_item",
        skip(self),
        fields(
            owner = %owner,
            product_uuid = %product,
            item_count = tracing::field::Empty,
            total = tracing::field::Empty
        ),
        err
    )]
    async fn update_item(
        &self,
        owner: UserUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity.into());
        }

        let document = self.document(owner).await;
        let mut cart = document.lock().await;

        if cart.item(product).is_none() {
            return Err(CartsServiceError::ItemNotFound(product));
        }

        self.available_product(product, quantity).await?;

        cart.update_item_quantity(product, quantity, Timestamp::now())?;

        record_cart(&cart);
        info!(cart_uuid = %cart.uuid(), "updated cart item");

        Ok(cart.clone())
    }

    #[tracing::instrument(
        name = "carts.service.set_item_note",
        skip(self, note),
        fields(owner = %owner, product_uuid = %product),
        err
    )]
    async fn set_item_note(
        &self,
        owner: UserUuid,
        product: ProductUuid,
        note: Option<String>,
    ) -> Result<Cart, CartsServiceError> {
        let document = self.document(owner).await;
        let mut cart = document.lock().await;

        if !cart.set_item_note(product, note, Timestamp::now()) {
            return Err(CartsServiceError::ItemNotFound(product));
        }

        Ok(cart.clone())
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self),
        fields(
            owner = %owner,
            product_uuid = %product,
            item_count = tracing::field::Empty,
            total = tracing::field::Empty
        ),
        err
    )]
    async fn remove_item(
        &self,
        owner: UserUuid,
        product: ProductUuid,
    ) -> Result<Cart, CartsServiceError> {
        let document = self.document(owner).await;
        let mut cart = document.lock().await;

        cart.remove_item(product, Timestamp::now())?;

        record_cart(&cart);
        info!(cart_uuid = %cart.uuid(), "removed cart item");

        Ok(cart.clone())
    }

    #[tracing::instrument(
        name = "carts.service.clear_cart",
        skip(self),
        fields(owner = %owner),
        err
    )]
    async fn clear_cart(&self, owner: UserUuid) -> Result<Cart, CartsServiceError> {
        let document = self.document(owner).await;
        let mut cart = document.lock().await;

        cart.clear(Timestamp::now());

        info!(cart_uuid = %cart.uuid(), "cleared cart");

        Ok(cart.clone())
    }

    #[tracing::instrument(
        name = "carts.service.apply_coupon",
        skip(self),
        fields(owner = %owner, total = tracing::field::Empty, item_count = tracing::field::Empty),
        err
    )]
    async fn apply_coupon(&self, owner: UserUuid, code: String) -> Result<Cart, CartsServiceError> {
        let document = self.document(owner).await;
        let mut cart = document.lock().await;

        cart.apply_coupon(&code, &*self.coupons, Timestamp::now())?;

        record_cart(&cart);
        info!(cart_uuid = %cart.uuid(), coupon = %code, "applied coupon");

        Ok(cart.clone())
    }

    #[tracing::instrument(
        name = "carts.service.remove_coupon",
        skip(self),
        fields(owner = %owner),
        err
    )]
    async fn remove_coupon(&self, owner: UserUuid) -> Result<Cart, CartsServiceError> {
        let document = self.document(owner).await;
        let mut cart = document.lock().await;

        cart.remove_coupon(Timestamp::now())?;

        info!(cart_uuid = %cart.uuid(), "removed coupon");

        Ok(cart.clone())
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the owner's cart, creating an empty one on first use.
    async fn get_cart(&self, owner: UserUuid) -> Result<Cart, CartsServiceError>;

    /// Add a product at its current price. Stock must cover the whole line after the add.
    async fn add_item(
        &self,
        owner: UserUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError>;

    /// Set the quantity of a line already in the cart.
    async fn update_item(
        &self,
        owner: UserUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError>;

    /// Attach or clear a note on a line.
    async fn set_item_note(
        &self,
        owner: UserUuid,
        product: ProductUuid,
        note: Option<String>,
    ) -> Result<Cart, CartsServiceError>;

    /// Remove a line. Removing an absent product is not an error.
    async fn remove_item(
        &self,
        owner: UserUuid,
        product: ProductUuid,
    ) -> Result<Cart, CartsServiceError>;

    /// Empty the cart and drop its coupon.
    async fn clear_cart(&self, owner: UserUuid) -> Result<Cart, CartsServiceError>;

    /// Apply a coupon code.
    async fn apply_coupon(&self, owner: UserUuid, code: String) -> Result<Cart, CartsServiceError>;

    /// Drop the applied coupon.
    async fn remove_coupon(&self, owner: UserUuid) -> Result<Cart, CartsServiceError>;
}
