//! End-to-end pipeline tests against wiremock embedding and summarizer mocks.

use blindspot_analyzer::{
    run_analysis, AnalysisInput, ClusterCountPolicy, EmbeddingClient, Report, ReportCluster,
    SummarizerClient,
};
use blindspot_core::{Article, BiasLabel, Verdict};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn article(id: i64, title: &str, outlet: &str, bias: Option<BiasLabel>, category: &str) -> Article {
    Article {
        id,
        title: title.to_string(),
        content: format!("{title}에 대한 본문"),
        url: format!("https://news.example.com/{id}"),
        published_at: None,
        outlet: outlet.to_string(),
        bias,
        category: category.to_string(),
    }
}

/// Maps each input text to a fixed vector by title marker, so the k-means
/// grouping is known in advance.
struct EmbedByMarker {
    positions: Vec<(&'static str, Vec<f32>)>,
    fail_marker: Option<&'static str>,
}

impl Respond for EmbedByMarker {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        let inputs = body["inputs"].as_array().unwrap();

        if let Some(marker) = self.fail_marker {
            let hit = inputs
                .iter()
                .any(|input| input.as_str().unwrap().contains(marker));
            if hit {
                return ResponseTemplate::new(500);
            }
        }

        let vectors: Vec<Vec<f32>> = inputs
            .iter()
            .map(|input| {
                let text = input.as_str().unwrap();
                self.positions
                    .iter()
                    .find(|(marker, _)| text.contains(marker))
                    .map(|(_, v)| v.clone())
                    .unwrap_or_else(|| panic!("no vector mapped for text: {text}"))
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(vectors)
    }
}

/// Replies with labeled lines, or without the summary line for clusters whose
/// prompt mentions the drop marker.
struct SummarizeByMarker {
    drop_marker: Option<&'static str>,
}

impl Respond for SummarizeByMarker {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        let prompt = body["messages"][0]["content"].as_str().unwrap();

        let content = match self.drop_marker {
            Some(marker) if prompt.contains(marker) => "topic: 요약 불가".to_string(),
            _ => "topic: 공통 주제\nkeywords: 하나, 둘, 셋\nsummary: 묶인 기사들의 요약.".to_string(),
        };
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [ { "message": { "role": "assistant", "content": content } } ]
        }))
    }
}

async fn mount_mocks(
    server: &MockServer,
    positions: Vec<(&'static str, Vec<f32>)>,
    embed_fail_marker: Option<&'static str>,
    summary_drop_marker: Option<&'static str>,
) {
    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(EmbedByMarker {
            positions,
            fail_marker: embed_fail_marker,
        })
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(SummarizeByMarker {
            drop_marker: summary_drop_marker,
        })
        .mount(server)
        .await;
}

async fn run(server: &MockServer, articles: Vec<Article>) -> Report {
    let embeddings = EmbeddingClient::new(&server.uri(), 30).expect("embed client");
    let summarizer =
        SummarizerClient::new(&server.uri(), None, "test-model", 30).expect("summarizer client");
    let input = AnalysisInput {
        articles,
        policy: ClusterCountPolicy::Bucketed,
    };
    run_analysis(&input, &embeddings, &summarizer)
        .await
        .expect("analysis should succeed")
}

fn cluster_containing<'a>(report: &'a Report, id: i64) -> &'a ReportCluster {
    report
        .clusters
        .iter()
        .find(|c| c.article_ids.contains(&id))
        .unwrap_or_else(|| panic!("no cluster holds article {id}"))
}

#[tokio::test]
async fn two_categories_merge_under_unique_keys() {
    let server = MockServer::start().await;
    mount_mocks(
        &server,
        vec![
            // 정치 splits into three pairs, far apart.
            ("국회 연설", vec![0.0, 0.0]),
            ("연설 후폭풍", vec![0.2, 0.1]),
            ("검찰 수사", vec![50.0, 50.0]),
            ("수사 확대", vec![50.2, 49.9]),
            ("선거제 개편", vec![-50.0, 10.0]),
            ("개편 협상", vec![-49.8, 10.2]),
            // 경제 splits into three singletons.
            ("금리 동결", vec![0.0, 80.0]),
            ("수출 회복", vec![80.0, 0.0]),
            ("집값 반등", vec![-80.0, -80.0]),
        ],
        None,
        None,
    )
    .await;

    let articles = vec![
        article(1, "국회 연설", "한겨레", Some(BiasLabel::Left), "정치"),
        article(2, "연설 후폭풍", "경향신문", Some(BiasLabel::Left), "정치"),
        article(3, "검찰 수사", "한겨레", Some(BiasLabel::Left), "정치"),
        article(4, "수사 확대", "조선일보", Some(BiasLabel::Right), "정치"),
        article(5, "선거제 개편", "KBS뉴스", Some(BiasLabel::Center), "정치"),
        article(6, "개편 협상", "YTN", Some(BiasLabel::Center), "정치"),
        article(7, "금리 동결", "한겨레", Some(BiasLabel::Left), "경제"),
        article(8, "수출 회복", "조선일보", Some(BiasLabel::Right), "경제"),
        article(9, "집값 반등", "KBS뉴스", Some(BiasLabel::Center), "경제"),
    ];

    let report = run(&server, articles).await;

    // Three pair clusters from 정치 and three singletons from 경제, with
    // keys unique across categories.
    assert_eq!(report.clusters.len(), 6);
    let keys: std::collections::BTreeSet<&str> =
        report.clusters.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys.len(), 6);
    assert!(keys.contains("경제_0") && keys.contains("정치_0"));
    assert_ne!(
        cluster_containing(&report, 7).key,
        cluster_containing(&report, 1).key
    );

    // Categories merge in sorted order, local ids ascending within each.
    assert_eq!(report.clusters[0].category, "경제");
    assert_eq!(report.clusters[3].category, "정치");
    for window in report.clusters.windows(2) {
        if window[0].category == window[1].category {
            assert!(window[0].local_id < window[1].local_id);
        }
    }

    assert_eq!(report.article_ids, (1..=9).collect());

    // The all-left pair.
    let left_pair = cluster_containing(&report, 1);
    assert_eq!(left_pair.article_ids, vec![1, 2]);
    assert_eq!(left_pair.article_count, 2);
    assert_eq!(left_pair.label_counts, [2, 0, 0]);
    assert_eq!(left_pair.profile.verdict, Verdict::LeftDominant);
    assert_eq!(left_pair.profile.bias_score, -1.0);
    assert_eq!(left_pair.profile.left_pct, 100);
    assert_eq!(left_pair.topic, "공통 주제");
    assert_eq!(left_pair.summary, "묶인 기사들의 요약.");
    assert_eq!(left_pair.keywords.as_deref(), Some("하나, 둘, 셋"));

    // The split pair balances out.
    let split_pair = cluster_containing(&report, 3);
    assert_eq!(split_pair.article_ids, vec![3, 4]);
    assert_eq!(split_pair.profile.verdict, Verdict::Balanced);
    assert_eq!(split_pair.profile.bias_score, 0.0);

    // The all-center pair.
    let center_pair = cluster_containing(&report, 5);
    assert_eq!(center_pair.label_counts, [0, 2, 0]);
    assert_eq!(center_pair.profile.verdict, Verdict::CenterDominant);
    assert_eq!(center_pair.profile.center_pct, 100);
}

#[tokio::test]
async fn category_below_minimum_is_skipped() {
    let server = MockServer::start().await;
    mount_mocks(
        &server,
        vec![
            ("국회 연설", vec![0.0, 0.0]),
            ("검찰 수사", vec![50.0, 50.0]),
            ("선거제 개편", vec![-50.0, 10.0]),
        ],
        None,
        None,
    )
    .await;

    let articles = vec![
        article(1, "국회 연설", "한겨레", Some(BiasLabel::Left), "정치"),
        article(2, "검찰 수사", "한겨레", Some(BiasLabel::Left), "정치"),
        article(3, "선거제 개편", "KBS뉴스", Some(BiasLabel::Center), "정치"),
        // Two articles are below the minimum of three.
        article(4, "신작 영화", "YTN", Some(BiasLabel::Center), "문화"),
        article(5, "전시 개막", "YTN", Some(BiasLabel::Center), "문화"),
    ];

    let report = run(&server, articles).await;

    assert!(report.clusters.iter().all(|c| c.category == "정치"));
    assert!(!report.article_ids.contains(&4));
    assert!(!report.article_ids.contains(&5));
}

#[tokio::test]
async fn embedding_failure_skips_only_that_category() {
    let server = MockServer::start().await;
    mount_mocks(
        &server,
        vec![
            ("금리 동결", vec![0.0, 80.0]),
            ("수출 회복", vec![80.0, 0.0]),
            ("집값 반등", vec![-80.0, -80.0]),
        ],
        Some("파업"),
        None,
    )
    .await;

    let articles = vec![
        article(1, "병원 파업 확산", "한겨레", Some(BiasLabel::Left), "사회"),
        article(2, "파업 협상 결렬", "조선일보", Some(BiasLabel::Right), "사회"),
        article(3, "파업 일주일째", "KBS뉴스", Some(BiasLabel::Center), "사회"),
        article(4, "금리 동결", "한겨레", Some(BiasLabel::Left), "경제"),
        article(5, "수출 회복", "조선일보", Some(BiasLabel::Right), "경제"),
        article(6, "집값 반등", "KBS뉴스", Some(BiasLabel::Center), "경제"),
    ];

    let report = run(&server, articles).await;

    // 사회 embedding returns 500; 경제 still clusters.
    assert!(!report.clusters.is_empty());
    assert!(report.clusters.iter().all(|c| c.category == "경제"));
    assert_eq!(report.article_ids, (4..=6).collect());
}

#[tokio::test]
async fn cluster_without_summary_is_dropped() {
    let server = MockServer::start().await;
    mount_mocks(
        &server,
        vec![
            ("국회 연설", vec![0.0, 0.0]),
            ("검찰 수사", vec![50.0, 50.0]),
            ("선거제 개편", vec![-50.0, 10.0]),
        ],
        None,
        Some("검찰 수사"),
    )
    .await;

    let articles = vec![
        article(1, "국회 연설", "한겨레", Some(BiasLabel::Left), "정치"),
        article(2, "검찰 수사", "한겨레", Some(BiasLabel::Left), "정치"),
        article(3, "선거제 개편", "KBS뉴스", Some(BiasLabel::Center), "정치"),
    ];

    let report = run(&server, articles).await;

    // Three singleton clusters minus the one whose digest had no summary.
    assert_eq!(report.clusters.len(), 2);
    assert!(!report.article_ids.contains(&2));
    assert!(report.article_ids.contains(&1));
    assert!(report.article_ids.contains(&3));
}
