//! Brazilian postal code (CEP) helpers.
//!
//! Validation and formatting are pure. [`regional_fallback`] maps the first
//! two digits of a code to an approximate metropolitan-area coordinate and is
//! the last tier consulted after both geocoding providers come back empty.

use crate::reseller::Coordinates;

/// Number of digits in a valid CEP.
pub const CEP_DIGITS: usize = 8;

/// Country qualifier appended to postal-code geocoding queries.
pub const COUNTRY_QUALIFIER: &str = "Brasil";

const SAO_PAULO: Coordinates = Coordinates {
    lat: -23.5505,
    lng: -46.6333,
};
const RIO_DE_JANEIRO: Coordinates = Coordinates {
    lat: -22.9068,
    lng: -43.1729,
};

/// Prefix table: first two CEP digits to a metro-area coordinate.
const REGIONAL_TABLE: &[(&str, &str, Coordinates)] = &[
    ("01", "São Paulo", SAO_PAULO),
    ("02", "São Paulo", SAO_PAULO),
    ("03", "São Paulo", SAO_PAULO),
    ("04", "São Paulo", SAO_PAULO),
    ("05", "São Paulo", SAO_PAULO),
    ("08", "São Paulo", SAO_PAULO),
    ("20", "Rio de Janeiro", RIO_DE_JANEIRO),
    ("21", "Rio de Janeiro", RIO_DE_JANEIRO),
    ("22", "Rio de Janeiro", RIO_DE_JANEIRO),
    (
        "30",
        "Belo Horizonte",
        Coordinates {
            lat: -19.9191,
            lng: -43.9378,
        },
    ),
    (
        "40",
        "Salvador",
        Coordinates {
            lat: -12.9714,
            lng: -38.5014,
        },
    ),
    (
        "50",
        "Recife",
        Coordinates {
            lat: -8.0476,
            lng: -34.8770,
        },
    ),
    (
        "60",
        "Fortaleza",
        Coordinates {
            lat: -3.7172,
            lng: -38.5434,
        },
    ),
    (
        "70",
        "Brasília",
        Coordinates {
            lat: -15.7942,
            lng: -47.8825,
        },
    ),
    (
        "80",
        "Curitiba",
        Coordinates {
            lat: -25.4244,
            lng: -49.2654,
        },
    ),
    (
        "90",
        "Porto Alegre",
        Coordinates {
            lat: -30.0346,
            lng: -51.2177,
        },
    ),
];

/// Strip every non-digit character.
#[must_use]
pub fn digits(code: &str) -> String {
    code.chars().filter(char::is_ascii_digit).collect()
}

/// A CEP is valid when exactly eight digits remain after stripping separators.
#[must_use]
pub fn validate(code: &str) -> bool {
    digits(code).len() == CEP_DIGITS
}

/// Canonical `NNNNN-NNN` form, or the input unchanged when it is not a CEP.
#[must_use]
pub fn format(code: &str) -> String {
    let clean = digits(code);
    if clean.len() == CEP_DIGITS {
        format!("{}-{}", &clean[..5], &clean[5..])
    } else {
        code.to_string()
    }
}

/// Free-text geocoding query for a CEP, e.g. `"01310-100, Brasil"`.
#[must_use]
pub fn geocode_query(code: &str) -> String {
    format!("{}, {COUNTRY_QUALIFIER}", format(code))
}

/// Approximate metro-area coordinate for a valid CEP, if its region is covered.
#[must_use]
pub fn regional_fallback(code: &str) -> Option<Coordinates> {
    regional_fallback_entry(code).map(|(_, coords)| coords)
}

/// Same as [`regional_fallback`] but also returns the metro-area name.
#[must_use]
pub fn regional_fallback_entry(code: &str) -> Option<(&'static str, Coordinates)> {
    let clean = digits(code);
    if clean.len() != CEP_DIGITS {
        return None;
    }
    let prefix = &clean[..2];
    REGIONAL_TABLE
        .iter()
        .find(|(p, _, _)| *p == prefix)
        .map(|(_, region, coords)| (*region, *coords))
}
