use finviz_screener::{
    Fetch, FilterBuilder, HttpFetcher, ScanError, Screener, ScreenerConfig, TransportError,
};
use mockito::{Matcher, Server, ServerGuard};

const RESULTS_PAGE: &str = r#"
    <table><tbody>
        <tr id="screener-table"><td><table><tbody><tr><td>
            <table><tbody>
                <tr><td>No.</td><td>Ticker</td></tr>
                <tr><td>1</td><td><a>AAPL</a></td></tr>
                <tr><td>2</td><td><a>MSFT</a></td></tr>
            </tbody></table>
        </td></tr></tbody></table></td></tr>
    </tbody></table>
"#;

fn config(server: &ServerGuard) -> ScreenerConfig {
    ScreenerConfig {
        base_url: format!("{}/screener.ashx", server.url()),
        user_agent: "finviz-test".to_string(),
        request_interval: 0,
        ..Default::default()
    }
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn non_success_status() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/screener.ashx")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let fetcher = HttpFetcher::new(&config(&server)).unwrap();
    let err = fetcher
        .fetch("", &params(&[("v", "111")]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ScanError::Transport(TransportError::Status { status: 503, .. })
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn sends_user_agent_and_merged_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/screener.ashx")
        .match_header("user-agent", "finviz-test")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("v".into(), "111".into()),
            Matcher::UrlEncoded("f".into(), "sec_technology,sh_price_o50".into()),
            Matcher::UrlEncoded("r".into(), "21".into()),
        ]))
        .with_status(200)
        .with_body("page two")
        .create_async()
        .await;

    let fetcher = HttpFetcher::new(&config(&server)).unwrap();
    let page = fetcher
        .fetch(
            "screener.ashx?v=111&f=sec_energy&r=21",
            &params(&[("v", "111"), ("f", "sec_technology,sh_price_o50")]),
        )
        .await
        .unwrap();

    assert_eq!("page two", page.body);
    assert!(page.url.starts_with(&server.url()));
    mock.assert_async().await;
}

#[tokio::test]
async fn connection_failure() {
    let config = ScreenerConfig {
        base_url: "http://127.0.0.1:1/screener.ashx".to_string(),
        ..Default::default()
    };

    let err = HttpFetcher::new(&config)
        .unwrap()
        .fetch("", &[])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ScanError::Transport(TransportError::Request { .. })
    ));
}

#[tokio::test]
async fn scan_over_http() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/screener.ashx")
        .match_query(Matcher::UrlEncoded("f".into(), "sec_technology".into()))
        .with_status(200)
        .with_body(RESULTS_PAGE)
        .create_async()
        .await;

    let tickers = Screener::new(config(&server))
        .unwrap()
        .sector("Technology")
        .scan()
        .await
        .unwrap();

    assert_eq!(vec!["AAPL", "MSFT"], tickers);
    mock.assert_async().await;
}
