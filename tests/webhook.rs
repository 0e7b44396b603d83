use std::sync::Arc;

use survey_webhook::{
    records::MemorySurveyRecords,
    store::{MemoryConfigStore, WEBHOOK_URL_SETTING},
    ConfigStore, EventSource, HttpDispatcher, Outcome, PluginRegistry, SurveyCompleted, WebHook,
};
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

struct Setup {
    server: MockServer,
    settings: Arc<MemoryConfigStore>,
    plugin: Arc<WebHook>,
}

async fn setup() -> Setup {
    let server = MockServer::start().await;
    let settings = Arc::new(MemoryConfigStore::default());

    let records = MemorySurveyRecords::default();
    records.insert_response("42", "1", Some("abc123"));
    records.insert_participant("42", "abc123", "7");
    records.insert_response("42", "2", None);

    let plugin = Arc::new(WebHook::new(
        settings.clone(),
        Arc::new(records),
        Arc::new(HttpDispatcher::new(None).unwrap()),
    ));

    Setup {
        server,
        settings,
        plugin,
    }
}

fn completed(response_id: &str) -> SurveyCompleted {
    SurveyCompleted {
        survey_id: "42".into(),
        response_id: Some(response_id.into()),
    }
}

#[tokio::test]
async fn delivers_substituted_url_to_receiver() {
    let setup = setup().await;
    Mock::given(method("GET"))
        .and(path("/hook"))
        .and(query_param("sid", "42"))
        .and(query_param("token", "abc123"))
        .and(query_param("tid", "7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&setup.server)
        .await;
    setup
        .settings
        .set_survey_setting(
            "42",
            WEBHOOK_URL_SETTING,
            &format!(
                "{}/hook?sid={{SURVEYID}}&token={{TOKEN}}&tid={{TID}}",
                setup.server.uri()
            ),
        )
        .await
        .unwrap();

    assert_eq!(setup.plugin.handle(&completed("1")).await, Outcome::Delivered);
}

#[tokio::test]
async fn anonymous_response_sends_placeholders_literally() {
    let setup = setup().await;
    Mock::given(method("GET"))
        .and(path("/hook"))
        .and(query_param("sid", "42"))
        .and(query_param("token", "{TOKEN}"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&setup.server)
        .await;
    setup
        .settings
        .set_survey_setting(
            "42",
            WEBHOOK_URL_SETTING,
            &format!("{}/hook?sid={{SURVEYID}}&token={{TOKEN}}", setup.server.uri()),
        )
        .await
        .unwrap();

    assert_eq!(setup.plugin.handle(&completed("2")).await, Outcome::Delivered);
}

#[tokio::test]
async fn uses_global_default_when_survey_has_no_url() {
    let setup = setup().await;
    Mock::given(method("GET"))
        .and(path("/default"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&setup.server)
        .await;
    setup
        .settings
        .set_global_setting(
            WEBHOOK_URL_SETTING,
            &format!("{}/default?sid={{SURVEYID}}", setup.server.uri()),
        )
        .await
        .unwrap();

    assert_eq!(setup.plugin.handle(&completed("1")).await, Outcome::Delivered);
}

#[tokio::test]
async fn error_status_is_reported_without_retry() {
    let setup = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&setup.server)
        .await;
    setup
        .settings
        .set_survey_setting("42", WEBHOOK_URL_SETTING, &format!("{}/hook", setup.server.uri()))
        .await
        .unwrap();

    assert_eq!(
        setup.plugin.handle(&completed("1")).await,
        Outcome::Rejected(reqwest::StatusCode::INTERNAL_SERVER_ERROR)
    );
}

#[tokio::test]
async fn unreachable_receiver_does_not_fail_completion() {
    let setup = setup().await;
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    setup
        .settings
        .set_survey_setting("42", WEBHOOK_URL_SETTING, &format!("http://{address}/hook"))
        .await
        .unwrap();

    assert_eq!(setup.plugin.handle(&completed("1")).await, Outcome::Unreachable);
}

#[tokio::test]
async fn registry_delivers_each_event_once() {
    let setup = setup().await;
    Mock::given(method("GET"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&setup.server)
        .await;
    setup
        .settings
        .set_survey_setting("42", WEBHOOK_URL_SETTING, &format!("{}/hook", setup.server.uri()))
        .await
        .unwrap();

    let mut registry = PluginRegistry::new();
    registry.subscribe(setup.plugin.clone());

    registry.publish(&completed("1")).await;
    registry.publish(&completed("1")).await;
}
