use serde::{Deserialize, Serialize};

/// Receipt print layout document.
///
/// The document is opaque to the server: field positions and styles are owned
/// by the layout editor in the browser.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PrintLayout {
    pub layout_key: String,
    pub document: serde_json::Value,
    /// Incremented on every save
    pub version: i64,
    pub updated_at: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SavePrintLayoutRequest {
    pub document: serde_json::Value,
}
