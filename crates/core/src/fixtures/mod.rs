//! Fixtures
//!
//! YAML seed data for demos and tests. A fixture set is a name shared by up to four files under a
//! base path: `products/<name>.yml`, `coupons/<name>.yml`, `subscriptions/<name>.yml` and
//! `carts/<name>.yml`. Subscriptions and carts refer to products by their fixture key.

use std::{fs, path::PathBuf};

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    addresses::Address,
    carts::{Cart, CartError, CartUuid},
    coupons::{CouponBook, CouponRule},
    fixtures::{
        carts::{CartFixture, CartsFixture},
        coupons::CouponsFixture,
        products::ProductsFixture,
        subscriptions::{LineFixture, SubscriptionsFixture},
    },
    orders::PaymentMethod,
    products::{Product, ProductUuid},
    subscriptions::{
        NewSubscription, Subscription, SubscriptionError, SubscriptionItem, SubscriptionUuid,
    },
    users::UserUuid,
};

pub mod carts;
pub mod coupons;
pub mod products;
pub mod subscriptions;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid user id
    #[error("Invalid id: {0}")]
    InvalidId(#[from] uuid::Error),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// No cart loaded
    #[error("No cart loaded")]
    NoCart,

    /// A seeded subscription is invalid
    #[error("Failed to create subscription: {0}")]
    Subscription(#[from] SubscriptionError),

    /// A seeded cart is invalid
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Fixture key -> product
    products: FxHashMap<String, Product>,

    /// Fixture key -> subscription
    subscriptions: FxHashMap<String, Subscription>,

    /// Codes loaded on top of the built-in book
    coupons: CouponBook,

    /// Seeded cart, if a carts file was loaded
    cart: Option<CartFixture>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: FxHashMap::default(),
            subscriptions: FxHashMap::default(),
            coupons: CouponBook::builtin(),
            cart: None,
            currency: None,
        }
    }

    fn read<T: DeserializeOwned>(&self, kind: &str, name: &str) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = self.read("products", name)?;

        for (key, product_fixture) in fixture.products {
            let product = Product::try_from(product_fixture)?;
            let currency = product.price.currency();

            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            self.products.insert(key, product);
        }

        Ok(self)
    }

    /// Load coupon codes from a YAML fixture file, on top of the built-in codes
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a percentage cannot be parsed.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CouponsFixture = self.read("coupons", name)?;

        for (code, percent) in fixture.coupons {
            let percent = products::parse_percentage(&percent)?;

            self.coupons
                .insert(&code, CouponRule::PercentageOff(percent));
        }

        Ok(self)
    }

    /// Load subscriptions from a YAML fixture file. Items are priced at the product's current
    /// final price.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or refers to unknown products.
    pub fn load_subscriptions(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: SubscriptionsFixture = self.read("subscriptions", name)?;

        for (key, subscription_fixture) in fixture.subscriptions {
            let items = subscription_fixture
                .items
                .iter()
                .map(|line| -> Result<SubscriptionItem, FixtureError> {
                    let product = self.product(&line.product)?;

                    Ok(SubscriptionItem {
                        product: product.uuid,
                        quantity: line.quantity,
                        unit_price: product.final_price(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let subscription = Subscription::new(
                NewSubscription {
                    uuid: SubscriptionUuid::new(),
                    owner: subscription_fixture.owner.parse()?,
                    plan: subscription_fixture.plan,
                    items,
                    shipping_address: subscription_fixture.shipping_address,
                    delivery_instructions: subscription_fixture.delivery_instructions,
                    payment_method: subscription_fixture.payment_method,
                    max_orders: subscription_fixture.max_orders,
                    notes: None,
                },
                subscription_fixture.start,
            )?;

            self.subscriptions.insert(key, subscription);
        }

        Ok(self)
    }

    /// Load the seeded cart from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartsFixture = self.read("carts", name)?;

        self.cart = Some(fixture.cart);

        Ok(self)
    }

    /// Load a complete fixture set (products, coupons, subscriptions and cart with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::set_from(Self::new(), name)
    }

    /// Load a complete fixture set from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set_at(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        Self::set_from(Self::with_base_path(base_path), name)
    }

    fn set_from(mut fixture: Self, name: &str) -> Result<Self, FixtureError> {
        fixture
            .load_products(name)?
            .load_coupons(name)?
            .load_subscriptions(name)?
            .load_cart(name)?;

        Ok(fixture)
    }

    /// Get a product by its fixture key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product, FixtureError> {
        self.products
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a product id by its fixture key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_uuid(&self, key: &str) -> Result<ProductUuid, FixtureError> {
        self.product(key).map(|product| product.uuid)
    }

    /// All loaded products
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Get a subscription by its fixture key
    pub fn subscription(&self, key: &str) -> Option<&Subscription> {
        self.subscriptions.get(key)
    }

    /// All loaded subscriptions
    pub fn subscriptions(&self) -> impl Iterator<Item = &Subscription> {
        self.subscriptions.values()
    }

    /// Built-in coupons plus any loaded codes
    pub fn coupons(&self) -> &CouponBook {
        &self.coupons
    }

    /// Get the currency of the fixture set
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// The seeded cart lines as `(product, quantity)` pairs, with the cart owner and coupon.
    ///
    /// Returns `Ok(None)` when no carts file was loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner id is malformed or a line refers to an unknown product.
    pub fn cart_lines(&self) -> Result<Option<SeedCart>, FixtureError> {
        let Some(cart) = &self.cart else {
            return Ok(None);
        };

        let lines = cart
            .items
            .iter()
            .map(|line: &LineFixture| -> Result<(ProductUuid, u32), FixtureError> {
                Ok((self.product_uuid(&line.product)?, line.quantity))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(SeedCart {
            owner: cart.owner.parse()?,
            coupon: cart.coupon.clone(),
            lines,
            shipping_address: cart.shipping_address.clone(),
            payment_method: cart.payment_method.unwrap_or(PaymentMethod::CreditCard),
        }))
    }

    /// Build the seeded cart directly, pricing lines at each product's final price.
    ///
    /// # Errors
    ///
    /// Returns an error if no products or cart were loaded, or if the cart rejects a line or its
    /// coupon.
    pub fn cart(&self, now: Timestamp) -> Result<Cart, FixtureError> {
        let seed = self
            .cart_lines()?
            .ok_or(FixtureError::NoCart)?;

        let mut cart = Cart::new(CartUuid::new(), seed.owner, self.currency()?, now);

        for (uuid, quantity) in &seed.lines {
            let product = self
                .products()
                .find(|product| product.uuid == *uuid)
                .ok_or_else(|| FixtureError::ProductNotFound(uuid.to_string()))?;

            cart.add_item(*uuid, *quantity, product.final_price(), now)?;
        }

        if let Some(code) = &seed.coupon {
            cart.apply_coupon(code, &self.coupons, now)?;
        }

        Ok(cart)
    }
}

/// Seeded cart contents, resolved to product ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedCart {
    /// Cart owner
    pub owner: UserUuid,

    /// Coupon to apply after the lines
    pub coupon: Option<String>,

    /// `(product, quantity)` lines
    pub lines: Vec<(ProductUuid, u32)>,

    /// Where the checkout ships
    pub shipping_address: Address,

    /// How the checkout pays
    pub payment_method: PaymentMethod,
}
