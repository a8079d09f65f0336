#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Emergency SOS coordination.
//!
//! Validates and stamps SOS events and decides which emergency contacts a
//! given event notifies. Actual notification dispatch and fan-out belong
//! to the broadcast layer; events here are ephemeral and never persisted.

pub mod registry;

use chrono::{DateTime, Utc};
use safety_map_store_models::GeoPoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use registry::{EmergencyContact, default_contacts};

/// Number of contacts notified per SOS event, taken from the front of the
/// ordered directory.
pub const SOS_NOTIFY_COUNT: usize = 2;

/// Errors that can occur when triggering an SOS event.
#[derive(Debug, Error)]
pub enum EmergencyError {
    /// SOS location failed validation.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of what was rejected.
        message: String,
    },
}

/// Lifecycle state of an emergency event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmergencyStatus {
    /// The SOS is live.
    Active,
    /// The SOS has been called off.
    Resolved,
}

/// A stamped SOS event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// User who triggered the SOS.
    pub user_id: String,
    /// Where the SOS was triggered.
    pub location: GeoPoint,
    /// Server-side trigger time.
    pub triggered_at: DateTime<Utc>,
    /// Lifecycle state; always [`EmergencyStatus::Active`] at creation.
    pub status: EmergencyStatus,
    /// The contacts this event notifies.
    pub contacts_notified: Vec<EmergencyContact>,
}

/// Validates and stamps SOS events against the ordered contact directory.
pub struct EmergencyCoordinator {
    contacts: Vec<EmergencyContact>,
}

impl EmergencyCoordinator {
    /// Creates a coordinator over an ordered contact directory.
    #[must_use]
    pub fn new(contacts: Vec<EmergencyContact>) -> Self {
        Self { contacts }
    }

    /// The full ordered contact directory.
    #[must_use]
    pub fn contacts(&self) -> &[EmergencyContact] {
        &self.contacts
    }

    /// Produces a stamped SOS event for the given user and location.
    ///
    /// The event carries the first [`SOS_NOTIFY_COUNT`] directory entries
    /// as its notification targets. No delivery guarantee is made here.
    ///
    /// # Errors
    ///
    /// Returns [`EmergencyError::Validation`] if the coordinates are not
    /// finite WGS84 values.
    pub fn trigger_sos(
        &self,
        user_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<EmergencyEvent, EmergencyError> {
        let location =
            GeoPoint::try_new(latitude, longitude).map_err(|e| EmergencyError::Validation {
                message: e.to_string(),
            })?;

        let event = EmergencyEvent {
            event_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            location,
            triggered_at: Utc::now(),
            status: EmergencyStatus::Active,
            contacts_notified: self
                .contacts
                .iter()
                .take(SOS_NOTIFY_COUNT)
                .cloned()
                .collect(),
        };

        log::warn!(
            "SOS {} triggered by '{}' at ({}, {}), notifying {} contacts",
            event.event_id,
            user_id,
            location.latitude,
            location.longitude,
            event.contacts_notified.len()
        );
        Ok(event)
    }
}
