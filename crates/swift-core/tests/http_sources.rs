//! Loading blocklists over real HTTP from a local server

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::runtime::Handle;

use swift_core::{
    BlocklistLoader, BlocklistSource, Config, FilterService, HttpFetcher, LineFormat, PatternSet,
    SourceStatus,
};

/// What the test server answers for a path
#[derive(Clone, Copy)]
enum Reply {
    Ok(&'static str),
    Status(u16),
    /// Accept the request and never answer
    Hang,
}

async fn serve(routes: Vec<(&'static str, Reply)>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("/");
                let reply = routes
                    .iter()
                    .find(|(route, _)| *route == path)
                    .map(|(_, reply)| *reply)
                    .unwrap_or(Reply::Status(404));

                let (status, reason, body) = match reply {
                    Reply::Ok(body) => (200, "OK", body),
                    Reply::Status(404) => (404, "Not Found", "not found"),
                    Reply::Status(status) => (status, "Error", "error"),
                    Reply::Hang => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        return;
                    }
                };

                let response = format!(
                    "HTTP/1.1 {} {}\r\n\
                     Content-Type: text/plain\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}{}", addr, path)
}

fn loader(config: &Config) -> BlocklistLoader {
    let fetcher = HttpFetcher::new(config).unwrap();
    BlocklistLoader::new(
        Arc::new(fetcher),
        config.line_format,
        config.concurrent_fetches,
    )
}

#[tokio::test]
async fn test_merges_two_lists() {
    let addr = serve(vec![
        ("/a.txt", Reply::Ok("a.com\nb.com\n")),
        ("/b.txt", Reply::Ok("b.com\r\nc.com\r\n")),
    ])
    .await;
    let config = Config::new(vec![url(addr, "/a.txt"), url(addr, "/b.txt")]);

    let outcome = loader(&config)
        .load(&config.blocklist_source().unwrap())
        .await;

    let expected: PatternSet = ["a.com", "b.com", "c.com"].into_iter().collect();
    assert_eq!(outcome.patterns, expected);
}

#[tokio::test]
async fn test_server_error_skips_source() {
    let addr = serve(vec![
        ("/broken.txt", Reply::Status(500)),
        ("/good.txt", Reply::Ok("b.com\nc.com\n")),
    ])
    .await;
    let config = Config::new(vec![url(addr, "/broken.txt"), url(addr, "/good.txt")]);

    let outcome = loader(&config)
        .load(&config.blocklist_source().unwrap())
        .await;

    let expected: PatternSet = ["b.com", "c.com"].into_iter().collect();
    assert_eq!(outcome.patterns, expected);
    assert_eq!(
        outcome.sources[0].status,
        SourceStatus::Failed {
            reason: "Unexpected HTTP status 500".to_string()
        }
    );
    assert_eq!(outcome.sources[1].status, SourceStatus::Loaded { entries: 2 });
}

#[tokio::test]
async fn test_all_not_found() {
    let addr = serve(vec![]).await;
    let config = Config::new(vec![url(addr, "/a.txt"), url(addr, "/b.txt")]);

    let outcome = loader(&config)
        .load(&config.blocklist_source().unwrap())
        .await;

    assert!(outcome.patterns.is_empty());
    assert!(outcome.sources.iter().all(|s| !s.is_loaded()));
    assert!(!outcome.patterns.is_blocked("https://example.com/page"));
}

#[tokio::test]
async fn test_unreachable_and_slow_sources_are_bounded() {
    let addr = serve(vec![
        ("/hang.txt", Reply::Hang),
        ("/good.txt", Reply::Ok("tracker.net\n")),
    ])
    .await;

    // Grab a free port and release it so nothing is listening there
    let refused = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let mut config = Config::new(vec![
        url(addr, "/hang.txt"),
        url(refused, "/list.txt"),
        url(addr, "/good.txt"),
    ]);
    config.timeout_secs = 1;

    let started = Instant::now();
    let outcome = loader(&config)
        .load(&config.blocklist_source().unwrap())
        .await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(outcome.patterns.len(), 1);
    assert!(outcome.patterns.contains("tracker.net"));
    assert!(!outcome.sources[0].is_loaded());
    assert!(!outcome.sources[1].is_loaded());
    assert!(outcome.sources[2].is_loaded());
}

#[tokio::test]
async fn test_hosts_file_source() {
    let addr = serve(vec![(
        "/hosts",
        Reply::Ok("# hosts\n127.0.0.1 localhost\n0.0.0.0 ads.example.com\n"),
    )])
    .await;
    let mut config = Config::new(vec![url(addr, "/hosts")]);
    config.line_format = LineFormat::Hosts;

    let outcome = loader(&config)
        .load(&config.blocklist_source().unwrap())
        .await;

    let expected: PatternSet = ["ads.example.com"].into_iter().collect();
    assert_eq!(outcome.patterns, expected);
}

#[tokio::test]
async fn test_service_refresh_end_to_end() {
    let addr = serve(vec![("/ads.txt", Reply::Ok("doubleclick.net\n"))]).await;
    let config = Config::new(vec![url(addr, "/ads.txt")]);
    let service = FilterService::new(config, Handle::current()).unwrap();

    assert!(!service.is_blocked("https://ads.doubleclick.net/x"));

    let report = service.refresh().unwrap().await.unwrap();
    assert!(report.published);
    assert_eq!(report.unique_patterns, 1);

    assert!(service.is_blocked("https://ads.doubleclick.net/x"));
    assert!(!service.is_blocked("https://example.com/page"));

    // Same sources again: same membership
    let before = service.current_patterns();
    service
        .load_now(&BlocklistSource::parse([url(addr, "/ads.txt")]).unwrap())
        .await;
    assert_eq!(*service.current_patterns(), *before);
}
