//! Checkout
//!
//! Turns a cart or a due subscription into an [`Order`]. Everything is validated and built before
//! the source is touched: a failed checkout leaves the cart as it was.

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    addresses::Address,
    carts::Cart,
    errors::ErrorKind,
    orders::{NewOrder, Order, OrderError, OrderItem, OrderNumber, OrderUuid, PaymentMethod},
    pricing::{Adjustments, PricingError, Totals, sum, zero},
    products::{ProductError, ProductLookup, ProductUuid},
    subscriptions::Subscription,
};

pub use crate::orders::ESTIMATED_DELIVERY_DAYS;

/// Errors raised while placing an order.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// Nothing to check out.
    #[error("cart is empty")]
    EmptyCart,

    /// A line refers to a product the catalog does not know.
    #[error("product {0} not found")]
    ProductNotFound(ProductUuid),

    /// A product cannot cover its line.
    #[error(transparent)]
    Product(#[from] ProductError),

    /// The order could not be built.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl CheckoutError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyCart => ErrorKind::Validation,
            Self::ProductNotFound(_) => ErrorKind::NotFound,
            Self::Product(error) => error.kind(),
            Self::Order(error) => error.kind(),
            Self::Pricing(error) => error.kind(),
        }
    }
}

/// Customer-supplied details for a cart checkout.
#[derive(Debug, Clone)]
pub struct CheckoutDetails {
    /// How the customer pays
    pub payment_method: PaymentMethod,

    /// Where to ship
    pub shipping_address: Address,

    /// Where to bill; the shipping address when absent
    pub billing_address: Option<Address>,

    /// Courier instructions
    pub delivery_instructions: Option<String>,

    /// Free-form notes
    pub notes: Option<String>,
}

/// Place an order from a cart and clear it.
///
/// Every line is re-checked against current stock and snapshotted with the product's current
/// name. Monetary fields and the coupon code are copied from the cart as they are.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`]: nothing to order.
/// - [`CheckoutError::ProductNotFound`] / [`CheckoutError::Product`]: a line can no longer be
///   fulfilled.
/// - [`CheckoutError::Order`] / [`CheckoutError::Pricing`]: the order could not be built.
///
/// The cart is untouched on error.
pub fn checkout<P>(
    cart: &mut Cart,
    products: &P,
    details: CheckoutDetails,
    order_number: OrderNumber,
    now: Timestamp,
) -> Result<Order, CheckoutError>
where
    P: ProductLookup + ?Sized,
{
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let items = cart
        .items()
        .iter()
        .map(|item| -> Result<OrderItem, CheckoutError> {
            let product = products
                .product(item.product())
                .ok_or(CheckoutError::ProductNotFound(item.product()))?;

            product.ensure_available(item.quantity())?;

            Ok(OrderItem::new(
                item.product(),
                product.name.clone(),
                item.quantity(),
                item.unit_price(),
            )?)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let order = Order::place(
        NewOrder {
            uuid: OrderUuid::new(),
            owner: cart.owner(),
            order_number,
            items,
            totals: *cart.totals(),
            coupon_code: cart.coupon_code().map(str::to_string),
            payment_method: details.payment_method,
            shipping_address: details.shipping_address,
            billing_address: details.billing_address,
            delivery_instructions: details.delivery_instructions,
            notes: details.notes,
            subscription: None,
        },
        now,
    )?;

    cart.clear(now);

    Ok(order)
}

/// Build the order a due subscription produces.
///
/// Lines come from the subscription's snapshotted items with names from the catalog; totals are
/// the item sum with no adjustments or coupon. Stock is not checked. The subscription itself is
/// not advanced; call [`Subscription::process_order`] once the order is stored.
///
/// # Errors
///
/// - [`CheckoutError::ProductNotFound`]: an item's product is no longer in the catalog.
/// - [`CheckoutError::Order`] / [`CheckoutError::Pricing`]: the order could not be built.
pub fn subscription_order<P>(
    subscription: &Subscription,
    products: &P,
    order_number: OrderNumber,
    now: Timestamp,
) -> Result<Order, CheckoutError>
where
    P: ProductLookup + ?Sized,
{
    let items = subscription
        .items()
        .iter()
        .map(|item| -> Result<OrderItem, CheckoutError> {
            let product = products
                .product(item.product)
                .ok_or(CheckoutError::ProductNotFound(item.product))?;

            Ok(OrderItem::new(
                item.product,
                product.name.clone(),
                item.quantity,
                item.unit_price,
            )?)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let currency = subscription.total_amount().currency();
    let subtotal = sum(currency, items.iter().map(OrderItem::total_price))?;
    let totals = Totals::from_parts(subtotal, Adjustments::none(currency), zero(currency))?;

    let order = Order::place(
        NewOrder {
            uuid: OrderUuid::new(),
            owner: subscription.owner(),
            order_number,
            items,
            totals,
            coupon_code: None,
            payment_method: subscription.payment_method(),
            shipping_address: subscription.shipping_address().clone(),
            billing_address: None,
            delivery_instructions: subscription.delivery_instructions().map(str::to_string),
            notes: Some(format!(
                "Subscription order #{}",
                subscription.next_order_number()
            )),
            subscription: Some(subscription.uuid()),
        },
        now,
    )?;

    Ok(order)
}
