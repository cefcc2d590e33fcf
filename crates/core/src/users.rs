//! Users

use crate::uuids::TypedUuid;

/// Marker for user identity.
///
/// Users are owned by the account service; this crate only ever needs to know who owns a cart,
/// order or subscription.
#[derive(Debug)]
pub struct User;

/// User UUID
pub type UserUuid = TypedUuid<User>;
