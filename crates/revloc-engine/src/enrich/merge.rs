//! Folding a registry record and an optional geocode into a record update.

use revloc_core::{postal_code, CompanyRegistration, EnrichmentUpdate, GeocodeResult};

/// Build the update for one record.
///
/// Registry values replace stored ones only when non-blank; everything else
/// is left as `None` so the stored value survives.
#[must_use]
pub fn build_update(
    registration: &CompanyRegistration,
    geocode: Option<&GeocodeResult>,
) -> EnrichmentUpdate {
    EnrichmentUpdate {
        name: filled(registration.company_name.as_deref()),
        address: registration.street_address(),
        neighborhood: filled(registration.neighborhood.as_deref()),
        city: filled(registration.city.as_deref()),
        state: filled(registration.state.as_deref()),
        cep: filled(registration.postal_code.as_deref()).map(|c| postal_code::format(&c)),
        phone: filled(registration.phone.as_deref()),
        registry_data: Some(registration.registry_data()),
        coordinates: geocode.map(|g| g.coordinates),
        geocoding_source: geocode.map(|g| g.source.into()),
    }
}

fn filled(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use revloc_core::{AddressComponents, CoordinateSource, Coordinates, GeocodeSource};

    use super::*;
    use crate::fixtures::candidate;

    fn registration() -> CompanyRegistration {
        CompanyRegistration {
            cnpj: "12345678000195".to_string(),
            company_name: Some("LOJA CENTRO LTDA".to_string()),
            street: Some("RUA DA CONSOLACAO".to_string()),
            number: Some("100".to_string()),
            neighborhood: Some("  ".to_string()),
            city: Some("SAO PAULO".to_string()),
            state: Some("SP".to_string()),
            postal_code: Some("01302000".to_string()),
            formatted_address: "RUA DA CONSOLACAO, 100, SAO PAULO, SP, CEP: 01302000".to_string(),
            source: "brasilapi".to_string(),
            ..CompanyRegistration::default()
        }
    }

    #[test]
    fn registry_values_replace_and_blanks_keep() {
        let update = build_update(&registration(), None);

        let mut record = candidate("Loja", "12345678000195");
        record.neighborhood = "Consolação".to_string();
        record.phone = "11 99999-0000".to_string();
        update.apply_to(&mut record);

        assert_eq!(record.name, "LOJA CENTRO LTDA");
        assert_eq!(record.address, "RUA DA CONSOLACAO, 100");
        assert_eq!(record.neighborhood, "Consolação");
        assert_eq!(record.cep, "01302-000");
        assert_eq!(record.phone, "11 99999-0000");
        assert!(record.coordinates.is_none());
        assert_eq!(
            record.registry_data.map(|d| d.cnpj).as_deref(),
            Some("12345678000195")
        );
        assert!(record.data_enriched);
    }

    #[test]
    fn geocode_sets_coordinates_and_source() {
        let geocode = GeocodeResult {
            coordinates: Coordinates::new(-23.55, -46.65),
            components: AddressComponents::default(),
            formatted_address: String::new(),
            source: GeocodeSource::GoogleMaps,
            place_id: None,
        };
        let update = build_update(&registration(), Some(&geocode));
        assert_eq!(update.coordinates, Some(Coordinates::new(-23.55, -46.65)));
        assert_eq!(update.geocoding_source, Some(CoordinateSource::GoogleMaps));
    }
}
