use serde::{Deserialize, Serialize};

/// Registry subset persisted on a reseller after enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryData {
    pub cnpj: String,
    pub company_name: Option<String>,
    pub trade_name: Option<String>,
    pub main_activity: Option<String>,
    pub status: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Full company record returned by a registry lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRegistration {
    pub cnpj: String,
    pub company_name: Option<String>,
    pub trade_name: Option<String>,
    /// Comma-joined street, number, complement, neighborhood, city, state and `CEP: x`.
    pub formatted_address: String,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub main_activity: Option<String>,
    pub status: Option<String>,
    pub status_date: Option<String>,
    pub source: String,
}

impl CompanyRegistration {
    #[must_use]
    pub fn registry_data(&self) -> RegistryData {
        RegistryData {
            cnpj: self.cnpj.clone(),
            company_name: self.company_name.clone(),
            trade_name: self.trade_name.clone(),
            main_activity: self.main_activity.clone(),
            status: self.status.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }

    /// `"street, number"`, or just the street when the number is blank.
    ///
    /// Returns `None` when the street is missing.
    #[must_use]
    pub fn street_address(&self) -> Option<String> {
        let street = non_blank(self.street.as_deref())?;
        Some(match non_blank(self.number.as_deref()) {
            Some(number) => format!("{street}, {number}"),
            None => street.to_string(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
