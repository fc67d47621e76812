//! `BrasilAPI` CNPJ response shape.
//!
//! The public endpoint answers with Portuguese keys (`razao_social`,
//! `logradouro`, ...). Some mirrors and cached payloads use English names, so
//! every field accepts both. Scalar fields are read leniently because the
//! upstream sometimes sends numbers where strings are expected (`cep`,
//! `numero`).

use serde::{Deserialize, Deserializer};

#[derive(Debug, Default, Deserialize)]
pub struct CnpjResponse {
    #[serde(default, alias = "razao_social", deserialize_with = "loose_string")]
    pub company_name: Option<String>,
    #[serde(default, alias = "nome_fantasia", deserialize_with = "loose_string")]
    pub trade_name: Option<String>,
    #[serde(default, alias = "logradouro", deserialize_with = "loose_string")]
    pub street: Option<String>,
    #[serde(default, alias = "numero", deserialize_with = "loose_string")]
    pub number: Option<String>,
    #[serde(default, alias = "complemento", deserialize_with = "loose_string")]
    pub complement: Option<String>,
    #[serde(default, alias = "bairro", deserialize_with = "loose_string")]
    pub district: Option<String>,
    #[serde(default, alias = "municipio", deserialize_with = "loose_string")]
    pub city: Option<String>,
    #[serde(default, alias = "uf", deserialize_with = "loose_string")]
    pub state: Option<String>,
    #[serde(default, alias = "cep", deserialize_with = "loose_string")]
    pub zip: Option<String>,
    #[serde(default, alias = "ddd_telefone_1", deserialize_with = "loose_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub email: Option<String>,
    #[serde(default)]
    pub main_activity: Option<MainActivity>,
    #[serde(default, deserialize_with = "loose_string")]
    pub cnae_fiscal_descricao: Option<String>,
    #[serde(
        default,
        alias = "descricao_situacao_cadastral",
        deserialize_with = "loose_string"
    )]
    pub status: Option<String>,
    #[serde(
        default,
        alias = "data_situacao_cadastral",
        deserialize_with = "loose_string"
    )]
    pub status_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MainActivity {
    #[serde(default, deserialize_with = "loose_string")]
    pub text: Option<String>,
}

/// Accept a string, number, or bool; blank strings and `null` become `None`.
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
