//! Conversion from the raw registry payload to [`CompanyRegistration`].

use revloc_core::CompanyRegistration;

use crate::types::CnpjResponse;

pub const SOURCE_TAG: &str = "brasilapi";

/// Build the comma-joined display address.
///
/// Parts are street, number, complement, neighborhood, city, state and
/// `CEP: <zip>`, skipping any that are blank.
#[must_use]
pub fn format_address(parts: &[Option<&str>], zip: Option<&str>) -> String {
    let mut out: Vec<String> = parts
        .iter()
        .flatten()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    if let Some(zip) = zip.map(str::trim).filter(|z| !z.is_empty()) {
        out.push(format!("CEP: {zip}"));
    }
    out.join(", ")
}

#[must_use]
pub fn into_registration(cnpj: &str, raw: CnpjResponse) -> CompanyRegistration {
    let formatted_address = format_address(
        &[
            raw.street.as_deref(),
            raw.number.as_deref(),
            raw.complement.as_deref(),
            raw.district.as_deref(),
            raw.city.as_deref(),
            raw.state.as_deref(),
        ],
        raw.zip.as_deref(),
    );

    let main_activity = raw
        .main_activity
        .and_then(|a| a.text)
        .or(raw.cnae_fiscal_descricao);

    CompanyRegistration {
        cnpj: cnpj.to_string(),
        company_name: raw.company_name,
        trade_name: raw.trade_name,
        formatted_address,
        street: raw.street,
        number: raw.number,
        complement: raw.complement,
        neighborhood: raw.district,
        city: raw.city,
        state: raw.state,
        postal_code: raw.zip,
        phone: raw.phone,
        email: raw.email,
        main_activity,
        status: raw.status,
        status_date: raw.status_date,
        source: SOURCE_TAG.to_string(),
    }
}
