//! Prizes raffled among donors of an event.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EntityId;

/// A prize donors can win by giving at least `min_amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Prize {
    /// Prize identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Longer description.
    pub description: String,
    /// Link to the prize page or image.
    pub url: String,
    /// Minimum donation that enters the draw.
    pub min_amount: f64,
    /// Free-form status, e.g. `available` or `delivered`.
    pub status: String,
    /// Whether the prize ships outside the host country.
    pub international_delivery: bool,
    /// Owning event.
    pub event_id: EntityId,
}
