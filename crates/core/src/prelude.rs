//! Prelude

pub use crate::{
    addresses::Address,
    calendar::{CalendarError, add_days},
    carts::{Cart, CartError, CartItem, CartUuid},
    checkout::{
        CheckoutDetails, CheckoutError, ESTIMATED_DELIVERY_DAYS, checkout, subscription_order,
    },
    coupons::{AppliedCoupon, CouponBook, CouponLookup, CouponRule, WELCOME_CODE},
    errors::{ErrorKind, ParseEnumError},
    fixtures::{Fixture, FixtureError},
    orders::{
        NewOrder, Order, OrderError, OrderItem, OrderNumber, OrderStatus, OrderTracking,
        OrderUuid, PaymentMethod, PaymentStatus, Refund,
    },
    pricing::{Adjustments, Amount, PricingError, Totals},
    products::{Product, ProductError, ProductLookup, ProductUuid},
    subscriptions::{
        Cancellation, NewSubscription, PauseWindow, Subscription, SubscriptionError,
        SubscriptionItem, SubscriptionPlan, SubscriptionStatus, SubscriptionUuid,
    },
    users::{User, UserUuid},
    uuids::TypedUuid,
};
