use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Activity name -> activity, kept in file order.
pub type Activities = IndexMap<String, Activity>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ActivityError {
    #[error("Activity not found")]
    NotFound,
    #[error("Student is already signed up")]
    AlreadySignedUp,
    #[error("Student is not signed up for this activity")]
    NotSignedUp,
}

/// Only the roster is interpreted. `description`, `schedule`,
/// `max_participants` and anything else in the record are carried through
/// untouched, so one drifted record never hides the others. Capacity is
/// informational only, signups never check it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl Activity {
    pub fn is_participant(&self, email: &str) -> bool {
        self.participants.iter().any(|p| p == email)
    }

    pub(crate) fn add_participant(&mut self, email: &str) -> Result<(), ActivityError> {
        if self.is_participant(email) {
            return Err(ActivityError::AlreadySignedUp);
        }

        self.participants.push(email.to_string());
        Ok(())
    }

    pub(crate) fn remove_participant(&mut self, email: &str) -> Result<(), ActivityError> {
        let Some(index) = self.participants.iter().position(|p| p == email) else {
            return Err(ActivityError::NotSignedUp);
        };

        self.participants.remove(index);
        Ok(())
    }
}

/// Adds `email` to the roster and returns the confirmation message.
pub(crate) fn signup(
    activities: &mut Activities,
    activity_name: &str,
    email: &str,
) -> Result<String, ActivityError> {
    activities
        .get_mut(activity_name)
        .ok_or(ActivityError::NotFound)?
        .add_participant(email)?;

    Ok(format!("Signed up {} for {}", email, activity_name))
}

pub(crate) fn unregister(
    activities: &mut Activities,
    activity_name: &str,
    email: &str,
) -> Result<String, ActivityError> {
    activities
        .get_mut(activity_name)
        .ok_or(ActivityError::NotFound)?
        .remove_participant(email)?;

    Ok(format!("Unregistered {} from {}", email, activity_name))
}
