//! Integration tests for the authorization redirect and URL error handling
use tokio_util::sync::CancellationToken;

use crate::test_harness::{Harness, CLIENT_ID};
use livelist::error::{REDIRECT_MISMATCH_NOTICE, TOKEN_UNPARSABLE_NOTICE};
use livelist::{SessionOutcome, Token};

// No request may reach this address in these tests
const UNUSED_API: &str = "http://127.0.0.1:9";

#[tokio::test]
async fn test_first_visit_navigates_to_authorization() {
    let mut harness = Harness::new(UNUSED_API, "http://localhost:8000/");
    let outcome = harness.session.run(&CancellationToken::new()).await;

    let SessionOutcome::Redirected(url) = outcome else {
        panic!("expected a redirect");
    };
    assert_eq!(url.host_str(), Some("id.twitch.tv"));
    assert_eq!(url.path(), "/oauth2/authorize");
    assert!(url.as_str().contains(&format!("client_id={}", CLIENT_ID)));
    assert_eq!(harness.environment.navigations(), vec![url]);
    assert!(matches!(harness.session.token(), Token::PendingRedirect));
    assert!(harness.batches().is_empty());
    assert_eq!(harness.session.counters().total, 0);
}

#[tokio::test]
async fn test_url_errors_publish_without_requests() {
    let cases = [
        ("http://localhost:8000/#nothing_here", TOKEN_UNPARSABLE_NOTICE),
        ("http://localhost:8000/?error=redirect_mismatch", REDIRECT_MISMATCH_NOTICE),
    ];

    for (page, notice) in cases {
        let mut harness = Harness::new(UNUSED_API, page);
        let outcome = harness.session.run(&CancellationToken::new()).await;

        assert!(matches!(outcome, SessionOutcome::Published(ref records) if records.is_empty()));
        assert_eq!(harness.notifications(), vec![notice.to_string()], "{}", page);
        assert_eq!(harness.batches(), vec![Vec::new()]);
        assert_eq!(harness.session.counters().total, 0);
        assert!(harness.environment.navigations().is_empty());
    }
}
