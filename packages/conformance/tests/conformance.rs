//! End-to-end discovery tests.
//!
//! Each test spawns an ephemeral in-process host (real TCP, real HTTP) via
//! [`xrd_conformance::spawn_host`] and resolves resources against it with the
//! real reqwest-backed [`DiscoveryClient`]. The host speaks plain HTTP only,
//! so every `https://` attempt fails and the client's fallbacks are exercised
//! for real.
//!
//! # Coverage
//!
//! | Test | Behaviour |
//! |------|-----------|
//! | `resolves_through_http_host_meta_and_lrdd` | https fails, http host-meta, LRDD expansion |
//! | `every_request_accepts_xrd` | `Accept: application/xrd+xml` |
//! | `repeated_lookup_is_cached` | WebFinger cache |
//! | `host_meta_is_shared_between_accounts` | host-meta cache |
//! | `unknown_account_is_a_fetch_error` | 404 on the LRDD endpoint |
//! | `missing_host_meta_uses_https_well_known_endpoint` | fallback URL |
//! | `malformed_host_meta_is_treated_as_absent` | unparseable host-meta |
//! | `host_meta_lookup` | `get_host_meta` |
//! | `resolved_document_converts_to_jrd` | XRD -> JRD |

use xrd::{HostMetaExt, WebFingerExt};
use xrd_conformance::{spawn_host, HostMetaMode};
use xrd_discovery::{DiscoveryClient, DiscoveryConfig, DiscoveryError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_client() -> DiscoveryClient {
    let config = DiscoveryConfig {
        timeout_secs: 5,
        ..DiscoveryConfig::default()
    };
    DiscoveryClient::from_config(&config).unwrap()
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolves_through_http_host_meta_and_lrdd() {
    let host = spawn_host(HostMetaMode::Lrdd).await;
    let client = make_client();
    let alice = host.account("alice");

    let webfinger = client.get(&alice).await.unwrap();

    assert_eq!(webfinger.subject(), alice);
    assert_eq!(
        webfinger.profile_page_href(),
        format!("http://{}/@alice", host.host)
    );
    assert_eq!(host.host_meta_hits(), 1);
    assert_eq!(host.lrdd_hits(), 1);
}

#[tokio::test]
async fn every_request_accepts_xrd() {
    let host = spawn_host(HostMetaMode::Lrdd).await;
    make_client().get(&host.account("alice")).await.unwrap();

    let accepts = host.accept_headers();
    assert_eq!(accepts.len(), 2);
    assert!(accepts.iter().all(|a| a == "application/xrd+xml"));
}

#[tokio::test]
async fn repeated_lookup_is_cached() {
    let host = spawn_host(HostMetaMode::Lrdd).await;
    let client = make_client();
    let alice = host.account("alice");

    let first = client.get(&alice).await.unwrap();
    let second = client.get(&alice).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(host.host_meta_hits(), 1);
    assert_eq!(host.lrdd_hits(), 1);
}

#[tokio::test]
async fn host_meta_is_shared_between_accounts() {
    let host = spawn_host(HostMetaMode::Lrdd).await;
    let client = make_client();

    let alice = client.get(&host.account("alice")).await.unwrap();
    let bob = client.get(&host.account("bob")).await.unwrap();

    assert_eq!(alice.subject(), host.account("alice"));
    assert_eq!(bob.subject(), host.account("bob"));
    assert_eq!(host.host_meta_hits(), 1);
    assert_eq!(host.lrdd_hits(), 2);
}

#[tokio::test]
async fn unknown_account_is_a_fetch_error() {
    let host = spawn_host(HostMetaMode::Lrdd).await;
    let client = make_client();
    let carol = host.account("carol");

    let err = client.get(&carol).await.unwrap_err();
    match err {
        DiscoveryError::FetchFailed(url) => {
            assert!(url.starts_with(&format!("http://{}/lrdd?resource=acct%3Acarol%40", host.host)));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Failures are not cached; the host-meta still is.
    client.get(&carol).await.unwrap_err();
    assert_eq!(host.lrdd_hits(), 2);
    assert_eq!(host.host_meta_hits(), 1);
}

// ---------------------------------------------------------------------------
// Host-meta fallbacks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_host_meta_uses_https_well_known_endpoint() {
    let host = spawn_host(HostMetaMode::Missing).await;
    let client = make_client();

    let err = client.get(&host.account("alice")).await.unwrap_err();
    match err {
        DiscoveryError::FetchFailed(url) => assert_eq!(
            url,
            format!(
                "https://{0}/.well-known/webfinger?resource=acct%3Aalice%40{1}",
                host.host,
                host.host.replace(':', "%3A")
            )
        ),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(host.host_meta_hits(), 1);
    assert!(client.get_host_meta(&host.host).await.unwrap().is_none());
    assert_eq!(host.host_meta_hits(), 1);
}

#[tokio::test]
async fn malformed_host_meta_is_treated_as_absent() {
    let host = spawn_host(HostMetaMode::Malformed).await;
    let client = make_client();

    assert!(client.get_host_meta(&host.host).await.unwrap().is_none());
    let err = client.get(&host.account("alice")).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::FetchFailed(ref url) if url.starts_with("https://")));
    assert_eq!(host.lrdd_hits(), 0);
}

#[tokio::test]
async fn host_meta_lookup() {
    let host = spawn_host(HostMetaMode::Lrdd).await;
    let client = make_client();

    let host_meta = client.get_host_meta(&host.host).await.unwrap().unwrap();
    assert_eq!(host_meta.lrdd_xrd(), host.lrdd_template());
    assert_eq!(host_meta.lrdd("application/jrd+json"), "");
}

#[tokio::test]
async fn resolved_document_converts_to_jrd() {
    let host = spawn_host(HostMetaMode::Lrdd).await;
    let webfinger = make_client().get(&host.account("alice")).await.unwrap();

    let jrd = webfinger.to_json();
    assert!(jrd.starts_with(&format!(r#"{{"subject":"{}""#, host.account("alice"))));
    assert_eq!(xrd::WebFinger::from_json(&jrd).unwrap(), *webfinger);
}
