//! Session state: everything the editor owns besides the live surface.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CustomizerConfig, CustomizerError, ImageSource, ObjectId, PerSide, Side, SideStore};

/// A customer information field on the job sheet form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerField {
    /// Customer name.
    CustomerName,
    /// Customer email.
    CustomerEmail,
    /// Customer phone.
    CustomerPhone,
    /// Delivery address.
    DeliveryAddress,
    /// Point-of-contact name.
    PocName,
    /// Approver name.
    ApprovedBy,
}

impl CustomerField {
    /// All fields in form order. Every one is required for export.
    pub const ALL: [Self; 6] = [
        Self::CustomerName,
        Self::CustomerEmail,
        Self::CustomerPhone,
        Self::DeliveryAddress,
        Self::PocName,
        Self::ApprovedBy,
    ];

    /// Label shown on the form and in validation messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CustomerName => "Customer Name",
            Self::CustomerEmail => "Customer Email",
            Self::CustomerPhone => "Customer Phone",
            Self::DeliveryAddress => "Delivery Address",
            Self::PocName => "POC Name",
            Self::ApprovedBy => "Approved By",
        }
    }
}

impl fmt::Display for CustomerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CustomerField {
    type Err = CustomizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "name" => Ok(Self::CustomerName),
            "email" => Ok(Self::CustomerEmail),
            "phone" => Ok(Self::CustomerPhone),
            "address" => Ok(Self::DeliveryAddress),
            "poc-name" | "poc" => Ok(Self::PocName),
            "approved-by" | "approver" => Ok(Self::ApprovedBy),
            other => Err(CustomizerError::InvalidCommand(format!(
                "unknown customer field '{other}'"
            ))),
        }
    }
}

/// Customer details printed on the job sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    /// Customer name.
    pub name: String,
    /// Customer email.
    pub email: String,
    /// Customer phone.
    pub phone: String,
    /// Delivery address.
    pub address: String,
    /// Point-of-contact name.
    pub poc_name: String,
    /// Name of the person approving the design.
    pub approved_by: String,
}

impl CustomerInfo {
    /// Read a field.
    #[must_use]
    pub fn get(&self, field: CustomerField) -> &str {
        match field {
            CustomerField::CustomerName => &self.name,
            CustomerField::CustomerEmail => &self.email,
            CustomerField::CustomerPhone => &self.phone,
            CustomerField::DeliveryAddress => &self.address,
            CustomerField::PocName => &self.poc_name,
            CustomerField::ApprovedBy => &self.approved_by,
        }
    }

    /// Overwrite a field.
    pub fn set(&mut self, field: CustomerField, value: impl Into<String>) {
        let slot = match field {
            CustomerField::CustomerName => &mut self.name,
            CustomerField::CustomerEmail => &mut self.email,
            CustomerField::CustomerPhone => &mut self.phone,
            CustomerField::DeliveryAddress => &mut self.address,
            CustomerField::PocName => &mut self.poc_name,
            CustomerField::ApprovedBy => &mut self.approved_by,
        };
        *slot = value.into();
    }

    /// Fields that are empty after trimming, in form order.
    #[must_use]
    pub fn missing(&self) -> Vec<CustomerField> {
        CustomerField::ALL
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }
}

/// The editor's state, owned exclusively by one [`crate::CanvasSession`].
///
/// Rebuilt from scratch on "start over"; nothing carries across products.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Side currently shown on the surface.
    pub active_side: Side,
    /// Raw uploaded product photos. Frozen once the editor is entered.
    pub images: PerSide<Option<ImageSource>>,
    /// Stored snapshots of the sides not currently on the surface.
    pub sides: SideStore,
    /// Selected design object on the active side.
    pub selection: Option<ObjectId>,
    /// Product name used for the job sheet title and file name.
    pub product_name: String,
    /// Customer details.
    pub customer: CustomerInfo,
    /// Design accuracy attestation.
    pub verified: bool,
    /// Hand-drawn signature raster.
    pub signature: Option<ImageSource>,
    /// Ink color for the printed artwork.
    pub art_print_color: String,
    /// Font used for new text and applied to selected text.
    pub selected_font: String,
}

impl SessionState {
    /// Fresh state using configured defaults.
    #[must_use]
    pub fn new(config: &CustomizerConfig) -> Self {
        Self {
            active_side: Side::Front,
            images: PerSide::default(),
            sides: SideStore::default(),
            selection: None,
            product_name: config.default_product_name.clone(),
            customer: CustomerInfo::default(),
            verified: false,
            signature: None,
            art_print_color: config.default_art_print_color.clone(),
            selected_font: config.default_font.clone(),
        }
    }

    /// Whether both product photos have been uploaded.
    #[must_use]
    pub fn has_product(&self) -> bool {
        self.images.front.is_some() && self.images.back.is_some()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(&CustomizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_reports_blank_and_whitespace_fields() {
        let mut info = CustomerInfo {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: "   ".into(),
            address: "1 Loom St".into(),
            poc_name: String::new(),
            approved_by: "Grace".into(),
        };
        assert_eq!(
            info.missing(),
            vec![CustomerField::CustomerPhone, CustomerField::PocName]
        );

        info.set(CustomerField::CustomerPhone, "555-0100");
        info.set(CustomerField::PocName, "Bob");
        assert!(info.missing().is_empty());
    }

    #[test]
    fn test_parse_customer_field_aliases() {
        assert_eq!(
            "approved_by".parse::<CustomerField>().ok(),
            Some(CustomerField::ApprovedBy)
        );
        assert_eq!(
            "POC-NAME".parse::<CustomerField>().ok(),
            Some(CustomerField::PocName)
        );
        assert!("zip".parse::<CustomerField>().is_err());
    }

    #[test]
    fn test_new_state_uses_config_defaults() {
        let state = SessionState::default();
        assert_eq!(state.product_name, "My Custom Product");
        assert_eq!(state.selected_font, "Arial Black");
        assert_eq!(state.art_print_color, "#000000");
        assert!(!state.has_product());
    }
}
