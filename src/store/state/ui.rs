use serde::{Deserialize, Serialize};

/// Which modal dialog, if any, is open
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModalState {
    pub active: Option<String>,
}

impl ModalState {
    pub fn open(id: &str) -> Self {
        Self {
            active: Some(id.to_string()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }
}

/// Page-wide busy and error indicators
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UiState {
    pub loading: bool,
    pub error: Option<String>,
}
