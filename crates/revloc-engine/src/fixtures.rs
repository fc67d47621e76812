use chrono::Utc;
use revloc_core::{CoordinateSource, Coordinates, Reseller, DEFAULT_HOURS};
use uuid::Uuid;

pub(crate) const SAO_PAULO: Coordinates = Coordinates::new(-23.5505, -46.6333);

pub(crate) fn reseller(name: &str, coordinates: Option<Coordinates>) -> Reseller {
    Reseller {
        id: Uuid::new_v4(),
        name: name.to_string(),
        cnpj: None,
        address: String::new(),
        neighborhood: String::new(),
        city: String::new(),
        state: String::new(),
        cep: String::new(),
        phone: String::new(),
        whatsapp: String::new(),
        hours: DEFAULT_HOURS.to_string(),
        coordinates,
        geocoding_source: coordinates.map(|_| CoordinateSource::NormalizedData),
        active: true,
        data_enriched: false,
        service_radius_km: None,
        priority: 0,
        registry_data: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub(crate) fn candidate(name: &str, cnpj: &str) -> Reseller {
    Reseller {
        cnpj: Some(cnpj.to_string()),
        ..reseller(name, None)
    }
}
