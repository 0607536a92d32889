//! Integration tests for the traversal engine
//!
//! These tests drive a full `CrawlSession` against scripted oracles. Time is
//! paused so delays, cooldowns and backoffs complete instantly.

use link_cartographer::crawler::{CrawlSession, CrawlSettings, StepOutcome};
use link_cartographer::oracle::{OracleFault, OraclePrompt, OracleTransport, RetryPolicy};
use link_cartographer::state::{NodeStatus, RunStatus};
use link_cartographer::CrawlError;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const SEED: &str = "https://example.test/";
const REPORT_TEXT: &str = "Small site with a shallow tree.";

type Behavior = dyn Fn(&str, &str) -> Result<String, OracleFault> + Send + Sync;

/// Oracle whose link replies are computed from (credential, page URL)
struct ScriptedOracle {
    behavior: Box<Behavior>,
    expansion_calls: AtomicUsize,
    report_calls: AtomicUsize,
}

impl ScriptedOracle {
    fn new(
        behavior: impl Fn(&str, &str) -> Result<String, OracleFault> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            behavior: Box::new(behavior),
            expansion_calls: AtomicUsize::new(0),
            report_calls: AtomicUsize::new(0),
        })
    }

    fn expansion_calls(&self) -> usize {
        self.expansion_calls.load(Ordering::SeqCst)
    }

    fn report_calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }
}

impl OracleTransport for ScriptedOracle {
    async fn generate(&self, credential: &str, prompt: &OraclePrompt) -> Result<String, OracleFault> {
        if !prompt.expects_json {
            self.report_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(REPORT_TEXT.to_string());
        }

        self.expansion_calls.fetch_add(1, Ordering::SeqCst);
        let page = page_of(&prompt.text);
        (self.behavior)(credential, &page)
    }
}

/// Extracts the page URL from a link-discovery prompt
fn page_of(prompt: &str) -> String {
    let start = prompt
        .find("The current page is ")
        .map(|i| i + "The current page is ".len())
        .expect("prompt names the current page");
    let rest = &prompt[start..];
    let end = rest.find(" at crawl depth").expect("prompt names the depth");
    rest[..end].to_string()
}

fn link(url: &str, kind: &str) -> String {
    format!(
        r#"{{"url":"{}","label":"link","type":"{}","status":200,"discovery":"anchor"}}"#,
        url, kind
    )
}

fn links(items: &[(String, &str)]) -> String {
    let body: Vec<String> = items.iter().map(|(url, kind)| link(url, kind)).collect();
    format!("[{}]", body.join(","))
}

fn child(page: &str, path: &str) -> String {
    format!("{}/{}", page.trim_end_matches('/'), path)
}

fn quota() -> OracleFault {
    OracleFault::new(Some(429), Some("RESOURCE_EXHAUSTED".to_string()), "Quota exceeded")
}

fn session(
    oracle: Arc<ScriptedOracle>,
    max_depth: u32,
    max_pages: usize,
) -> CrawlSession<ScriptedOracle> {
    CrawlSession::new(
        CrawlSettings {
            max_depth,
            max_pages,
            request_delay: Duration::from_millis(500),
        },
        oracle,
        RetryPolicy::default(),
    )
}

fn creds(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("key-{}", i)).collect()
}

#[tokio::test(start_paused = true)]
async fn test_example_scenario() {
    let oracle = ScriptedOracle::new(|_, page| {
        Ok(links(&[
            (child(page, "a"), "internal"),
            (child(page, "a/style.css"), "resource"),
        ]))
    });
    let mut session = session(oracle.clone(), 2, 10);
    session.start(SEED, creds(1)).unwrap();

    let outcome = session.run().await.unwrap();

    assert_eq!(outcome.status, RunStatus::Completed);
    assert_eq!(session.nodes().len(), 5);
    assert_eq!(outcome.statistics.total_nodes, 5);
    assert_eq!(outcome.statistics.scanned, 2);
    assert_eq!(outcome.statistics.resources, 2);
    assert_eq!(outcome.statistics.max_depth, 2);
    assert_eq!(outcome.report, REPORT_TEXT);
    assert_eq!(oracle.report_calls(), 1);

    // Only the seed and /a were expanded
    assert_eq!(
        session.scan_order(),
        &[SEED.to_string(), "https://example.test/a".to_string()]
    );
    assert_eq!(oracle.expansion_calls(), 2);

    // The stylesheet is a leaf
    let css = "https://example.test/a/style.css";
    assert!(session
        .nodes()
        .iter()
        .all(|n| n.parent.as_deref() != Some(css)));
    assert_eq!(session.node(css).unwrap().status, NodeStatus::Pending);

    // Depth-2 page is recorded but never expanded
    let deep = session.node("https://example.test/a/a").unwrap();
    assert_eq!(deep.depth, 2);
    assert_eq!(deep.status, NodeStatus::Pending);
    assert!(!deep.scanned);

    assert_eq!(session.node(SEED).unwrap().status, NodeStatus::Scanned);
}

#[tokio::test(start_paused = true)]
async fn test_no_duplicates_and_breadth_first_order() {
    // Every page links to the same hub pages plus one page of its own
    let oracle = ScriptedOracle::new(|_, page| {
        Ok(links(&[
            ("https://example.test/".to_string(), "internal"),
            ("https://example.test/hub-1".to_string(), "internal"),
            ("https://example.test/hub-2".to_string(), "internal"),
            (child(page, "own"), "internal"),
            ("https://elsewhere.test/".to_string(), "external"),
        ]))
    });
    let mut session = session(oracle, 4, 100);
    session.start(SEED, creds(1)).unwrap();
    session.run().await.unwrap();

    let mut seen = HashSet::new();
    for node in session.nodes() {
        assert!(seen.insert(node.url.clone()), "duplicate node {}", node.url);
    }

    let depths: Vec<u32> = session
        .scan_order()
        .iter()
        .map(|url| session.node(url).unwrap().depth)
        .collect();
    assert!(
        depths.windows(2).all(|w| w[0] <= w[1]),
        "expansion order is not breadth-first: {:?}",
        depths
    );

    // First discovery wins: the hub keeps its first parent
    let hub = session.node("https://example.test/hub-1").unwrap();
    assert_eq!(hub.parent.as_deref(), Some(SEED));
    assert_eq!(hub.depth, 1);

    // External pages are recorded but never expanded
    assert!(session.node("https://elsewhere.test/").is_some());
    assert!(!session
        .scan_order()
        .contains(&"https://elsewhere.test/".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_fragments_and_non_http_links_are_not_crawled() {
    let oracle = ScriptedOracle::new(|_, page| {
        if page == SEED {
            Ok(links(&[
                ("/a".to_string(), "internal"),
                ("/a#top".to_string(), "internal"),
                ("https://example.test/#footer".to_string(), "internal"),
                ("mailto:x@example.test".to_string(), "internal"),
                ("javascript:void(0)".to_string(), "internal"),
            ]))
        } else {
            Ok("[]".to_string())
        }
    });
    let mut session = session(oracle.clone(), 5, 50);
    session.start(SEED, creds(1)).unwrap();
    session.run().await.unwrap();

    assert_eq!(session.nodes().len(), 2);
    assert_eq!(
        session.scan_order(),
        &[SEED.to_string(), "https://example.test/a".to_string()]
    );
    assert_eq!(oracle.expansion_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_page_budget_respected() {
    let oracle = ScriptedOracle::new(|_, page| {
        Ok(links(&[
            (child(page, "a"), "internal"),
            (child(page, "b"), "internal"),
            (child(page, "c"), "internal"),
            (child(page, "d"), "internal"),
        ]))
    });
    let mut session = session(oracle, 10, 7);
    session.start(SEED, creds(1)).unwrap();

    loop {
        let outcome = session.step().await.unwrap();
        assert!(session.nodes().len() <= 7);
        if let StepOutcome::Finished(status) = outcome {
            assert_eq!(status, RunStatus::Completed);
            break;
        }
    }

    assert_eq!(session.nodes().len(), 7);
    assert!(session.nodes().iter().all(|n| n.depth <= 2));
}

#[tokio::test(start_paused = true)]
async fn test_cycle_terminates() {
    let oracle = ScriptedOracle::new(|_, _| Ok(links(&[(SEED.to_string(), "internal")])));
    let mut session = session(oracle.clone(), 50, 1000);
    session.start(SEED, creds(1)).unwrap();

    let outcome = session.run().await.unwrap();

    assert_eq!(outcome.status, RunStatus::Completed);
    assert_eq!(session.nodes().len(), 1);
    assert_eq!(oracle.expansion_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_quota_rotation_updates_cursor() {
    let oracle = ScriptedOracle::new(|credential, page| {
        if credential == "key-0" {
            Err(quota())
        } else if page == SEED {
            Ok(links(&[(child(page, "a"), "internal")]))
        } else {
            Ok("[]".to_string())
        }
    });
    let mut session = session(oracle.clone(), 3, 10);
    session.start(SEED, creds(2)).unwrap();

    let outcome = session.run().await.unwrap();

    assert_eq!(outcome.status, RunStatus::Completed);
    assert_eq!(session.credential_index(), 1);
    assert_eq!(outcome.credential_index, 1);
    assert_eq!(session.rotations().len(), 1);
    assert_eq!(session.rotations()[0].from, 0);
    assert_eq!(session.rotations()[0].to, 1);
    assert_eq!(session.rotations()[0].page_url, SEED);

    // 3 quota attempts on key-0, then key-1 for the seed and for /a
    assert_eq!(oracle.expansion_calls(), 5);
    assert_eq!(session.nodes().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_credential_exhaustion_is_fatal() {
    let oracle = ScriptedOracle::new(|_, _| Err(quota()));
    let mut session = session(oracle.clone(), 3, 10);
    session.start(SEED, creds(3)).unwrap();

    let result = session.step().await;

    assert!(matches!(result, Err(CrawlError::CredentialsExhausted(_))));
    assert_eq!(session.status(), RunStatus::Failed);
    assert_eq!(oracle.expansion_calls(), 9);
    assert_eq!(oracle.report_calls(), 0);
    assert_eq!(session.node(SEED).unwrap().status.label(), "error-429");
    assert_eq!(session.credential_index(), 2);

    // The run stays failed
    assert_eq!(
        session.step().await.unwrap(),
        StepOutcome::Finished(RunStatus::Failed)
    );
}

#[tokio::test(start_paused = true)]
async fn test_run_surfaces_exhaustion() {
    let oracle = ScriptedOracle::new(|_, _| Err(quota()));
    let mut session = session(oracle, 3, 10);
    session.start(SEED, creds(1)).unwrap();

    let error = session.run().await.unwrap_err();
    assert!(matches!(error, CrawlError::CredentialsExhausted(_)));
}

#[tokio::test(start_paused = true)]
async fn test_resources_never_enqueued() {
    let oracle = ScriptedOracle::new(|_, page| {
        if page == SEED {
            Ok(links(&[
                ("https://example.test/app.js".to_string(), "internal"),
                ("https://example.test/logo.png".to_string(), "internal"),
                ("https://example.test/report.pdf".to_string(), "resource"),
                ("https://example.test/about".to_string(), "internal"),
            ]))
        } else {
            Ok("[]".to_string())
        }
    });
    let mut session = session(oracle.clone(), 5, 50);
    session.start(SEED, creds(1)).unwrap();
    session.run().await.unwrap();

    assert_eq!(session.nodes().len(), 5);
    assert_eq!(
        session.scan_order(),
        &[SEED.to_string(), "https://example.test/about".to_string()]
    );
    assert_eq!(oracle.expansion_calls(), 2);
    assert_eq!(session.statistics().resources, 3);
}

#[tokio::test(start_paused = true)]
async fn test_failed_expansion_does_not_abort_crawl() {
    let oracle = ScriptedOracle::new(|_, page| match page {
        SEED => Ok(links(&[
            ("https://example.test/broken".to_string(), "internal"),
            ("https://example.test/missing".to_string(), "internal"),
            ("https://example.test/private".to_string(), "internal"),
            ("https://example.test/fine".to_string(), "internal"),
        ])),
        "https://example.test/broken" => Err(OracleFault::with_code(503, "Service Unavailable")),
        "https://example.test/missing" => Err(OracleFault::with_code(404, "Not Found")),
        "https://example.test/private" => Err(OracleFault::with_code(403, "Forbidden")),
        _ => Ok("[]".to_string()),
    });
    let mut session = session(oracle.clone(), 3, 50);
    session.start(SEED, creds(2)).unwrap();

    let outcome = session.run().await.unwrap();

    assert_eq!(outcome.status, RunStatus::Completed);
    assert_eq!(
        session.node("https://example.test/broken").unwrap().status.label(),
        "error-500"
    );
    assert_eq!(
        session.node("https://example.test/missing").unwrap().status.label(),
        "error-404"
    );
    assert_eq!(
        session.node("https://example.test/private").unwrap().status.label(),
        "error-403"
    );
    assert_eq!(
        session.node("https://example.test/fine").unwrap().status,
        NodeStatus::Scanned
    );
    assert_eq!(outcome.statistics.errors, 3);

    // Non-quota faults are retried in place, never rotated
    assert_eq!(session.credential_index(), 0);
    // seed + fine + 3 attempts for each failing page
    assert_eq!(oracle.expansion_calls(), 2 + 3 * 3);
}

#[tokio::test(start_paused = true)]
async fn test_max_depth_one_expands_only_seed() {
    let oracle = ScriptedOracle::new(|_, page| Ok(links(&[(child(page, "x"), "internal")])));
    let mut session = session(oracle.clone(), 1, 50);
    session.start(SEED, creds(1)).unwrap();
    session.run().await.unwrap();

    assert_eq!(session.nodes().len(), 2);
    assert_eq!(oracle.expansion_calls(), 1);
    assert_eq!(
        session.node("https://example.test/x").unwrap().status,
        NodeStatus::Pending
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_aborts_after_in_flight_step() {
    let oracle = ScriptedOracle::new(|_, page| {
        Ok(links(&[
            (child(page, "a"), "internal"),
            (child(page, "b"), "internal"),
        ]))
    });
    let mut session = session(oracle.clone(), 10, 1000);
    session.start(SEED, creds(1)).unwrap();

    assert_eq!(session.step().await.unwrap(), StepOutcome::Continued);
    session.stop();

    assert_eq!(
        session.step().await.unwrap(),
        StepOutcome::Finished(RunStatus::Aborted)
    );
    assert_eq!(session.status(), RunStatus::Aborted);
    assert_eq!(oracle.expansion_calls(), 1);
    assert_eq!(session.report(), Some(REPORT_TEXT));
    assert_eq!(session.frontier_size(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stop_handle_from_another_task() {
    let oracle = ScriptedOracle::new(|_, page| Ok(links(&[(child(page, "next"), "internal")])));
    let mut session = session(oracle, 10_000, 100_000);
    session.start(SEED, creds(1)).unwrap();

    let handle = session.stop_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        handle.stop();
    });

    let outcome = session.run().await.unwrap();

    assert_eq!(outcome.status, RunStatus::Aborted);
    assert!(outcome.finished_at.is_some());
    // 500ms delay per expansion: a handful of steps before the stop lands
    assert!(session.scan_order().len() < 10);
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_completion() {
    let oracle = ScriptedOracle::new(|_, _| Ok("[]".to_string()));
    let mut session = session(oracle, 2, 10);

    session.start(SEED, creds(1)).unwrap();
    assert!(matches!(
        session.start(SEED, creds(1)),
        Err(CrawlError::AlreadyRunning)
    ));
    session.run().await.unwrap();

    session.start("https://other.test/", creds(1)).unwrap();
    assert_eq!(session.nodes().len(), 1);
    assert_eq!(session.nodes()[0].url, "https://other.test/");
    assert_eq!(session.status(), RunStatus::Running);
}
