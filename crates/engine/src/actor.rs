//! Who is calling the engine.
//!
//! Authentication happens outside the engine; callers hand over an already
//! resolved [`Actor`]. Every parent acts for the whole household, a child
//! only ever acts for itself.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Actor {
    Parent { username: String },
    Child { child_id: i64 },
}

impl Actor {
    pub fn parent(username: impl Into<String>) -> Self {
        Self::Parent {
            username: username.into(),
        }
    }

    pub fn child(child_id: i64) -> Self {
        Self::Child { child_id }
    }

    pub fn is_parent(&self) -> bool {
        matches!(self, Self::Parent { .. })
    }

    pub(crate) fn require_parent(&self, action: &str) -> ResultEngine<()> {
        match self {
            Self::Parent { .. } => Ok(()),
            Self::Child { .. } => Err(EngineError::Forbidden(format!(
                "only a parent can {action}"
            ))),
        }
    }

    /// Parents may act for any child; a child only for itself.
    pub(crate) fn require_child_access(&self, child_id: i64) -> ResultEngine<()> {
        match self {
            Self::Parent { .. } => Ok(()),
            Self::Child { child_id: own } if *own == child_id => Ok(()),
            Self::Child { .. } => Err(EngineError::Forbidden(format!(
                "no access to child {child_id}"
            ))),
        }
    }
}
