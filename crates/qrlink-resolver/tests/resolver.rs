//! Integration tests for `Resolver` over real HTTP using wiremock.
//!
//! Each test stands up a local server; the grammar's short-link base is
//! pointed at it so generic-target rewrites stay local too.

use qrlink_resolver::{
    classify, dispatch, Classification, Grammar, ResolveError, Resolver, ResolverSettings,
    ScanFields,
};
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn test_settings() -> ResolverSettings {
    ResolverSettings {
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
        user_agent: "qrlink-test/0.1".to_owned(),
        ..ResolverSettings::default()
    }
}

/// Default grammar with the short-link service moved onto the mock server.
fn local_grammar(server: &MockServer) -> Grammar {
    Grammar {
        short_link_base: format!("{}/", server.uri()),
        ..Grammar::default()
    }
}

fn test_resolver(grammar: Grammar) -> Resolver {
    init_tracing();
    Resolver::new(grammar, &test_settings()).expect("failed to build test Resolver")
}

fn redirect_to(location: &str) -> ResponseTemplate {
    ResponseTemplate::new(302).insert_header("Location", location)
}

// ---------------------------------------------------------------------------
// Direct deeplinks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deeplink_payload_resolves_without_any_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = test_resolver(local_grammar(&server));
    let resolved = resolver
        .resolve("kfcme://deep_link?storeid=12&countryid=UAE&type=promo")
        .await
        .expect("deeplink should resolve");

    assert_eq!(
        resolved.fields,
        ScanFields {
            store_id: "12".to_owned(),
            country_id: "UAE".to_owned(),
            kind: "promo".to_owned(),
            coupon_flag: String::new(),
            extra_details: String::new(),
        }
    );
}

#[tokio::test]
async fn sample_deeplink_round_trips_through_classify_and_dispatch() {
    let expected = ScanFields {
        store_id: "881".to_owned(),
        country_id: "UAE".to_owned(),
        kind: "promo".to_owned(),
        coupon_flag: "true".to_owned(),
        extra_details: "family-bucket".to_owned(),
    };
    let sample = format!(
        "kfcme://deep_link?storeid={}&countryid={}&type={}&autoapplycoupon={}&extradetails={}",
        expected.store_id,
        expected.country_id,
        expected.kind,
        expected.coupon_flag,
        expected.extra_details
    );

    let Classification::DirectDeeplink(params) = classify(&Grammar::default(), &sample) else {
        panic!("sample deeplink should classify as direct");
    };
    assert_eq!(dispatch(&params), expected);
}

// ---------------------------------------------------------------------------
// Redirect following
// ---------------------------------------------------------------------------

#[tokio::test]
async fn short_link_through_generic_host_resolves_in_two_hops() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/abcd"))
        .respond_with(redirect_to(
            "https://mobapi.americana-food.com/qr/landing?kfc=xyz",
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/xyz"))
        .respond_with(redirect_to(
            "kfcme://deep_link?storeid=12&countryid=UAE&type=promo&autoapplycoupon=1",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = test_resolver(local_grammar(&server));
    let resolved = resolver
        .resolve(&format!("{}/abcd", server.uri()))
        .await
        .expect("short link should resolve");

    assert_eq!(resolved.fields.store_id, "12");
    assert_eq!(resolved.fields.country_id, "UAE");
    assert_eq!(resolved.fields.kind, "promo");
    assert_eq!(resolved.fields.coupon_flag, "1");
    assert!(resolved.is_current_country(resolver.grammar()));
}

#[tokio::test]
async fn relative_location_resolves_against_requested_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/short"))
        .respond_with(redirect_to("/landing?storeid=4&type=menu"))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = test_resolver(local_grammar(&server));
    let resolved = resolver
        .resolve(&format!("{}/short", server.uri()))
        .await
        .expect("relative redirect should resolve");

    assert_eq!(resolved.fields.store_id, "4");
    assert_eq!(resolved.fields.kind, "menu");
}

#[tokio::test]
async fn custom_redirect_header_is_honoured() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/qr"))
        .respond_with(
            ResponseTemplate::new(303)
                .insert_header("X-Deeplink-Target", "kfcme://deep_link?storeid=77"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let grammar = Grammar {
        redirect_header: "X-Deeplink-Target".to_owned(),
        ..local_grammar(&server)
    };
    let resolved = test_resolver(grammar)
        .resolve(&format!("{}/qr", server.uri()))
        .await
        .expect("custom header should be read");

    assert_eq!(resolved.fields.store_id, "77");
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn plain_200_is_no_redirect_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_resolver(local_grammar(&server))
        .resolve(&format!("{}/x", server.uri()))
        .await;

    assert!(
        matches!(result, Err(ResolveError::NoRedirectFound { status: 200, .. })),
        "expected NoRedirectFound, got: {result:?}"
    );
}

#[tokio::test]
async fn not_found_is_no_redirect_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_resolver(local_grammar(&server))
        .resolve(&format!("{}/gone", server.uri()))
        .await;

    assert!(
        matches!(result, Err(ResolveError::NoRedirectFound { status: 404, .. })),
        "expected NoRedirectFound, got: {result:?}"
    );
}

#[tokio::test]
async fn redirect_chain_of_three_stops_after_two_requests() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/1"))
        .respond_with(redirect_to("https://mobapi.americana-food.com/qr?kfc=2"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2"))
        .respond_with(redirect_to("https://mobapi.americana-food.com/qr?kfc=3"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/3"))
        .respond_with(redirect_to("kfcme://deep_link?storeid=1"))
        .expect(0)
        .mount(&server)
        .await;

    let result = test_resolver(local_grammar(&server))
        .resolve(&format!("{base}/1"))
        .await;

    assert!(
        matches!(result, Err(ResolveError::HopLimitExceeded { max_hops: 2 })),
        "expected HopLimitExceeded, got: {result:?}"
    );
}

#[tokio::test]
async fn redirect_to_opaque_landing_page_fails_after_one_request() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/abcd"))
        .respond_with(redirect_to(&format!("{base}/landing")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = test_resolver(local_grammar(&server))
        .resolve(&format!("{base}/abcd"))
        .await;

    let err = result.expect_err("opaque landing page must not resolve");
    assert!(
        matches!(err, ResolveError::UnclassifiableRedirectTarget { .. }),
        "expected UnclassifiableRedirectTarget, got: {err:?}"
    );
}

#[tokio::test]
async fn generic_target_without_short_link_key_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/abcd"))
        .respond_with(redirect_to("https://mobapi.americana-food.com/qr/landing"))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_resolver(local_grammar(&server))
        .resolve(&format!("{}/abcd", server.uri()))
        .await;

    let err = result.expect_err("generic target without key must fail");
    assert!(
        matches!(err, ResolveError::UnclassifiableRedirectTarget { .. }),
        "expected UnclassifiableRedirectTarget, got: {err:?}"
    );
    assert!(err.is_terminal_classification());
}

#[tokio::test]
async fn connection_failure_is_transport_error() {
    let result = test_resolver(Grammar::default())
        .resolve("http://127.0.0.1:1/x")
        .await;

    let err = result.expect_err("closed port must fail");
    assert!(
        matches!(err, ResolveError::Transport(_)),
        "expected Transport, got: {err:?}"
    );
    assert!(!err.is_terminal_classification());
}
