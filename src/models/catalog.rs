use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference record for a medicine product. Shared across patients;
/// prescriptions point at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub commercial_name: String,
    pub active_ingredient: String,
    /// Tablets, capsules, syrup, ...
    pub presentation: String,
    /// mg, ml, g, ...
    pub unit: String,
    /// "500mg", "10mg/5ml", ...
    pub concentration: String,
    pub instructions: Option<String>,
}

impl CatalogEntry {
    /// Short name for lists.
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.commercial_name, self.concentration)
    }

    pub fn full_description(&self) -> String {
        format!(
            "{} ({}) - {} {}",
            self.commercial_name, self.active_ingredient, self.presentation, self.concentration
        )
    }
}
