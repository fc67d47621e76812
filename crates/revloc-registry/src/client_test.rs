use super::*;

fn test_client(base_url: &str) -> RegistryClient {
    RegistryClient::with_base_url(base_url, 5, "revloc-test", Duration::from_millis(1))
        .expect("client construction should not fail")
}

#[test]
fn build_url_appends_cnpj_path() {
    let client = test_client("https://brasilapi.com.br/api");
    let url = client.build_url("12345678000195").expect("url");
    assert_eq!(
        url.as_str(),
        "https://brasilapi.com.br/api/cnpj/v1/12345678000195"
    );
}

#[test]
fn build_url_strips_trailing_slash() {
    let client = test_client("https://brasilapi.com.br/api///");
    let url = client.build_url("12345678000195").expect("url");
    assert_eq!(
        url.as_str(),
        "https://brasilapi.com.br/api/cnpj/v1/12345678000195"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = RegistryClient::with_base_url("::nope::", 5, "t", Duration::ZERO);
    assert!(matches!(result, Err(RegistryError::InvalidBaseUrl { .. })));
}

#[tokio::test]
async fn invalid_cnpj_fails_before_any_request() {
    // Port 9 is discard; a request would fail with Http, not InvalidCnpj.
    let client = test_client("http://127.0.0.1:9");
    let result = client.try_lookup("123456789012345").await;
    assert!(
        matches!(result, Err(RegistryError::InvalidCnpj(_))),
        "got {result:?}"
    );
}

#[tokio::test]
async fn blank_cnpj_is_invalid_rather_than_all_zeros() {
    let client = test_client("http://127.0.0.1:9");
    for raw in ["", "  ", "./-"] {
        let result = client.try_lookup(raw).await;
        assert!(
            matches!(result, Err(RegistryError::InvalidCnpj(_))),
            "{raw:?} got {result:?}"
        );
    }
}
