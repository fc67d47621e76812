//! Integration tests for `RegistryClient` using wiremock HTTP mocks.

use std::time::{Duration, Instant};

use revloc_registry::{RegistryClient, RegistryError, RegistryLookup};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> RegistryClient {
    RegistryClient::with_base_url(base_url, 1, "revloc-test", Duration::from_millis(50))
        .expect("client construction should not fail")
}

fn company_body(name: &str) -> serde_json::Value {
    serde_json::json!({
        "cnpj": "12345678000195",
        "razao_social": name,
        "nome_fantasia": "LOJA CENTRO",
        "logradouro": "RUA DA CONSOLACAO",
        "numero": "100",
        "complemento": "LOJA 2",
        "bairro": "CONSOLACAO",
        "municipio": "SAO PAULO",
        "uf": "SP",
        "cep": "01302000",
        "ddd_telefone_1": "1133334444",
        "email": "contato@lojacentro.com.br",
        "cnae_fiscal_descricao": "Comércio varejista de materiais de construção",
        "descricao_situacao_cadastral": "ATIVA",
        "data_situacao_cadastral": "2005-11-03"
    })
}

#[tokio::test]
async fn lookup_returns_parsed_company() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cnpj/v1/12345678000195"))
        .respond_with(ResponseTemplate::new(200).set_body_json(company_body("LOJA CENTRO LTDA")))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let company = client
        .lookup("12.345.678/0001-95")
        .await
        .expect("company should be found");

    assert_eq!(company.cnpj, "12345678000195");
    assert_eq!(company.company_name.as_deref(), Some("LOJA CENTRO LTDA"));
    assert_eq!(company.trade_name.as_deref(), Some("LOJA CENTRO"));
    assert_eq!(
        company.formatted_address,
        "RUA DA CONSOLACAO, 100, LOJA 2, CONSOLACAO, SAO PAULO, SP, CEP: 01302000"
    );
    assert_eq!(company.neighborhood.as_deref(), Some("CONSOLACAO"));
    assert_eq!(company.status.as_deref(), Some("ATIVA"));
    assert_eq!(company.status_date.as_deref(), Some("2005-11-03"));
    assert_eq!(company.source, "brasilapi");
}

#[tokio::test]
async fn lookup_pads_short_cnpj_before_requesting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cnpj/v1/02345678000195"))
        .respond_with(ResponseTemplate::new(200).set_body_json(company_body("PADDED LTDA")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(client.lookup("2345678000195").await.is_some());
}

#[tokio::test]
async fn not_found_is_a_plain_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.try_lookup("12345678000195").await;
    assert!(matches!(result, Ok(None)), "got {result:?}");
    assert!(client.lookup("12345678000195").await.is_none());
}

#[tokio::test]
async fn rate_limit_backs_off_once_and_gives_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let start = Instant::now();
    let result = client.try_lookup("12345678000195").await;

    assert!(
        matches!(result, Err(RegistryError::RateLimited { .. })),
        "got {result:?}"
    );
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[tokio::test]
async fn server_error_is_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.try_lookup("12345678000195").await;
    assert!(
        matches!(result, Err(RegistryError::UnexpectedStatus { status: 502, .. })),
        "got {result:?}"
    );
    assert!(client.lookup("12345678000195").await.is_none());
}

#[tokio::test]
async fn malformed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.try_lookup("12345678000195").await;
    assert!(
        matches!(result, Err(RegistryError::Deserialize { .. })),
        "got {result:?}"
    );
}

#[tokio::test]
async fn batch_isolates_a_timed_out_id() {
    let server = MockServer::start().await;
    for id in ["11111111000111", "22222222000122", "44444444000144"] {
        Mock::given(method("GET"))
            .and(path(format!("/cnpj/v1/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(company_body(id)))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/cnpj/v1/33333333000133"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(company_body("SLOW"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ids: Vec<String> = vec![
        "11.111.111/0001-11".to_string(),
        "22222222000122".to_string(),
        "33333333000133".to_string(),
        "44444444000144".to_string(),
    ];
    let results = client
        .batch_lookup(&ids, 2, Duration::from_millis(10))
        .await;

    assert_eq!(results.len(), 4);
    assert!(results["33333333000133"].is_none());
    for id in ["11111111000111", "22222222000122", "44444444000144"] {
        let company = results[id].as_ref().expect("company present");
        assert_eq!(company.company_name.as_deref(), Some(id));
    }
}

#[tokio::test]
async fn batch_deduplicates_ids_by_normalized_form() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cnpj/v1/12345678000195"))
        .respond_with(ResponseTemplate::new(200).set_body_json(company_body("ONE")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ids = vec![
        "12.345.678/0001-95".to_string(),
        "12345678000195".to_string(),
    ];
    let results = client.batch_lookup(&ids, 5, Duration::ZERO).await;
    assert_eq!(results.len(), 1);
}
