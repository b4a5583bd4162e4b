//! Department model

use pb_core::traits::{Id, Identifiable};
use serde::{Deserialize, Serialize};

/// A company department. Names are unique.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Option<Id>,
    pub name: String,
}

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

impl Identifiable for Department {
    fn id(&self) -> Option<Id> {
        self.id
    }
}
