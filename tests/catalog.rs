//! End-to-end tests of the blocking client against a mock catalog.

use std::time::Duration;

use serde_json::json;
use socrata::{CATALOG_USER_AGENT, Client, ClientConfig, Domain, Error, select_permalink};
use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CATALOG_PATH: &str = "/api/catalog/v1";

/// Mock server driven from synchronous tests; the blocking client must not
/// run inside the runtime, so the runtime is only entered to set up mocks.
struct CatalogServer {
    server: MockServer,
    rt: Runtime,
}

impl CatalogServer {
    fn start() -> Self {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    fn uri(&self) -> String {
        self.server.uri()
    }

    fn request_count(&self) -> usize {
        self.rt
            .block_on(self.server.received_requests())
            .map(|r| r.len())
            .unwrap_or(0)
    }

    fn client(&self) -> Client {
        Client::from_config(ClientConfig {
            url: format!("{}{}", self.uri(), CATALOG_PATH),
            verify: true,
            timeout: Duration::from_secs(10),
        })
        .unwrap()
        .with_progress(false)
    }
}

fn json_response(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json; charset=utf-8")
}

fn domains_body() -> serde_json::Value {
    json!({
        "results": [
            {"domain": "data.city.gov", "count": 12},
            {"domain": "empty.gov", "count": 0},
            {"domain": "data.state.gov", "count": 3}
        ]
    })
}

fn datasets_body(base: &str) -> serde_json::Value {
    json!({
        "results": [
            {
                "resource": {
                    "name": "Building Permits",
                    "description": "Permits issued since 2006",
                    "updatedAt": "2024-03-01T10:00:00.000Z"
                },
                "permalink": format!("{base}/d/ydr8-5enu")
            },
            {
                "permalink": format!("{base}/d/abcd-1234"),
                "resource": {
                    "name": "Crimes",
                    "description": "Reported incidents",
                    "updatedAt": "2024-02-11T08:30:00.000Z"
                }
            },
            {"resource": {"name": "Orphan"}}
        ]
    })
}

#[test]
fn list_domains_drops_empty_domains() {
    let mock = CatalogServer::start();
    mock.mount(
        Mock::given(method("GET"))
            .and(path(format!("{CATALOG_PATH}/domains")))
            .and(header("user-agent", CATALOG_USER_AGENT))
            .respond_with(json_response(domains_body())),
    );

    let domains = mock.client().list_domains(None).unwrap();
    assert_eq!(
        domains,
        vec![
            Domain {
                name: "data.city.gov".into(),
                count: 12
            },
            Domain {
                name: "data.state.gov".into(),
                count: 3
            },
        ]
    );
}

#[test]
fn list_domains_honours_override_url() {
    let mock = CatalogServer::start();
    mock.mount(
        Mock::given(method("GET"))
            .and(path("/mirror/domains.json"))
            .respond_with(json_response(json!({
                "results": [{"thing": "mirror.example.org", "count": 1}]
            }))),
    );

    let url = format!("{}/mirror/domains.json", mock.uri());
    let domains = mock.client().list_domains(Some(&url)).unwrap();
    assert_eq!(domains.len(), 1);
    assert_eq!(domains[0].name, "mirror.example.org");
}

#[test]
fn list_datasets_queries_selected_domain() {
    let mock = CatalogServer::start();
    mock.mount(
        Mock::given(method("GET"))
            .and(path(CATALOG_PATH))
            .and(query_param("domains", "data.state.gov"))
            .and(header("user-agent", CATALOG_USER_AGENT))
            .respond_with(json_response(datasets_body("https://data.state.gov"))),
    );

    let domains = vec![
        Domain {
            name: "data.city.gov".into(),
            count: 12,
        },
        Domain {
            name: "data.state.gov".into(),
            count: 3,
        },
    ];
    let datasets = mock.client().list_datasets(&domains, Some(2)).unwrap();

    assert_eq!(datasets.len(), 2);
    assert_eq!(datasets[0].name, "Building Permits");
    assert_eq!(datasets[1].updated_at, "2024-02-11T08:30:00.000Z");
    let permalinks: Vec<&str> = (1..=datasets.len())
        .map(|i| select_permalink(&datasets, Some(i)).unwrap())
        .collect();
    assert_eq!(
        permalinks,
        vec![
            "https://data.state.gov/d/ydr8-5enu.json",
            "https://data.state.gov/d/abcd-1234.json"
        ]
    );
}

#[test]
fn list_datasets_rejects_out_of_range_index_without_request() {
    let mock = CatalogServer::start();
    let domains = vec![Domain {
        name: "data.city.gov".into(),
        count: 12,
    }];

    let err = mock.client().list_datasets(&domains, Some(5)).unwrap_err();
    assert!(matches!(err, Error::IndexOutOfRange { index: 5, len: 1 }));
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn malformed_catalog_yields_empty_lists() {
    let mock = CatalogServer::start();
    mock.mount(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{not json", "application/json")),
    );

    let client = mock.client();
    assert!(client.list_domains(None).unwrap().is_empty());
    assert!(client.list_datasets_for("data.city.gov").unwrap().is_empty());
}

#[test]
fn error_status_is_reported() {
    let mock = CatalogServer::start();
    mock.mount(
        Mock::given(method("GET"))
            .and(path(format!("{CATALOG_PATH}/domains")))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_raw(r#"{"error": "Unrecognized arguments [bogus]"}"#, "application/json"),
            ),
    );

    match mock.client().list_domains(None).unwrap_err() {
        Error::Status {
            status, message, ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(message.as_deref(), Some("Unrecognized arguments [bogus]"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn payload_is_decoded_with_declared_charset() {
    let mock = CatalogServer::start();
    // "café" in ISO-8859-1
    mock.mount(
        Mock::given(method("GET"))
            .and(path("/latin1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(vec![b'c', b'a', b'f', 0xE9], "text/plain; charset=ISO-8859-1"),
            ),
    );

    let payload = mock
        .client()
        .retrieve_payload(&format!("{}/latin1", mock.uri()))
        .unwrap();
    assert_eq!(payload.text, "café");
    assert_eq!(payload.charset.as_deref(), Some("iso-8859-1"));
}

#[test]
fn payload_without_charset_is_decoded_as_utf8() {
    let mock = CatalogServer::start();
    mock.mount(
        Mock::given(method("GET"))
            .and(path("/utf8"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("Zürich – 東京".as_bytes().to_vec(), "application/json"),
            ),
    );

    let payload = mock
        .client()
        .retrieve_payload(&format!("{}/utf8", mock.uri()))
        .unwrap();
    assert_eq!(payload.text, "Zürich – 東京");
    assert_eq!(payload.charset, None);
}

#[test]
fn client_reports_configured_catalog_url() {
    let mock = CatalogServer::start();
    let client = mock.client();
    assert_eq!(
        client.catalog_url(),
        format!("{}{}", mock.uri(), CATALOG_PATH)
    );
}

#[test]
fn download_writes_body_under_last_segment() {
    let mock = CatalogServer::start();
    let body: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    mock.mount(
        Mock::given(method("GET"))
            .and(path("/api/views/abcd-1234/rows.json"))
            .and(header("user-agent", CATALOG_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone())),
    );

    let dir = TempDir::new().unwrap();
    let url = format!("{}/api/views/abcd-1234/rows.json", mock.uri());
    let written = mock.client().download(&url, dir.path()).unwrap();

    assert_eq!(written, dir.path().join("rows.json"));
    assert_eq!(std::fs::read(&written).unwrap(), body);
}

#[test]
fn download_overwrites_existing_file() {
    let mock = CatalogServer::start();
    mock.mount(
        Mock::given(method("GET"))
            .and(path("/d/abcd-1234.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]")),
    );

    let dir = TempDir::new().unwrap();
    let target = dir.path().join("abcd-1234.json");
    std::fs::write(&target, "stale content that is longer than the new body").unwrap();

    let url = format!("{}/d/abcd-1234.json", mock.uri());
    mock.client().download(&url, dir.path()).unwrap();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "[]");
}

#[test]
fn failed_download_leaves_no_file() {
    let mock = CatalogServer::start();
    mock.mount(
        Mock::given(method("GET"))
            .and(path("/d/gone.json"))
            .respond_with(ResponseTemplate::new(404)),
    );

    let dir = TempDir::new().unwrap();
    let url = format!("{}/d/gone.json", mock.uri());
    let err = mock.client().download(&url, dir.path()).unwrap_err();

    assert!(matches!(err, Error::Status { status: 404, .. }));
    assert!(!dir.path().join("gone.json").exists());
}

#[test]
fn download_into_missing_directory_is_an_io_error() {
    let mock = CatalogServer::start();
    mock.mount(
        Mock::given(method("GET"))
            .and(path("/d/rows.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]")),
    );

    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist");
    let url = format!("{}/d/rows.json", mock.uri());
    match mock.client().download(&url, &missing).unwrap_err() {
        Error::Io { path, .. } => assert_eq!(path, missing.join("rows.json")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn download_rejects_url_without_file_name() {
    let mock = CatalogServer::start();
    let dir = TempDir::new().unwrap();
    let err = mock
        .client()
        .download(&format!("{}/d/", mock.uri()), dir.path())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidUrl { .. }));
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn browse_then_download() {
    let mock = CatalogServer::start();
    let base = mock.uri();
    mock.mount(
        Mock::given(method("GET"))
            .and(path(format!("{CATALOG_PATH}/domains")))
            .respond_with(json_response(domains_body())),
    );
    mock.mount(
        Mock::given(method("GET"))
            .and(path(CATALOG_PATH))
            .and(query_param("domains", "data.city.gov"))
            .respond_with(json_response(datasets_body(&base))),
    );
    mock.mount(
        Mock::given(method("GET"))
            .and(path("/d/abcd-1234.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"id": 1}]"#)),
    );

    let client = mock.client();
    let domains = client.list_domains(None).unwrap();
    let datasets = client.list_datasets(&domains, None).unwrap();
    let permalink = select_permalink(&datasets, Some(2)).unwrap();

    let dir = TempDir::new().unwrap();
    let written = client.download(permalink, dir.path()).unwrap();
    assert_eq!(written, dir.path().join("abcd-1234.json"));
    assert_eq!(std::fs::read_to_string(written).unwrap(), r#"[{"id": 1}]"#);
}
