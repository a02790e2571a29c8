use serde::{Deserialize, Serialize};

/// Name recorded for guests that submit or act without an account.
pub const GUEST: &str = "Guest";

/// The identity on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    /// Whether the actor may approve or reject artifacts.
    pub can_write_artifacts: bool,
}

impl Actor {
    pub fn new(name: impl Into<String>, can_write_artifacts: bool) -> Self {
        Actor {
            name: name.into(),
            can_write_artifacts,
        }
    }

    pub fn guest() -> Self {
        Actor::new(GUEST, false)
    }

    pub fn administrator() -> Self {
        Actor::new("Administrator", true)
    }

    pub fn is_guest(&self) -> bool {
        self.name == GUEST
    }
}
