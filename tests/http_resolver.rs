#![allow(non_snake_case)]

use axum::{
    Json,
    Router,
    extract::State,
    http::{
        HeaderMap,
        StatusCode,
    },
    routing::post,
};
use roulette_session::{
    Bet,
    Chips,
    Color,
    Outcome,
    Pocket,
    Resolution,
    Resolver,
    Session,
    Settlement,
    SpinFailure,
    StagedBet,
    resolver::HttpResolver,
};
use serde_json::{
    Value,
    json,
};
use std::{
    net::SocketAddr,
    sync::{
        Arc,
        Mutex,
    },
    time::Duration,
};
use tokio::time::sleep;

async fn serve_router(router: Router) -> (String, tokio::task::JoinHandle<()>) {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let actual_addr = listener.local_addr().unwrap();
    let base_url = format!("http://{actual_addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .await
            .unwrap();
    });

    sleep(Duration::from_millis(50)).await;
    (base_url, handle)
}

/// Answers every spin with `status` and `body`, recording requests.
async fn stub_resolver(
    status: StatusCode,
    body: Value,
) -> (String, Arc<Mutex<Vec<(HeaderMap, Value)>>>, tokio::task::JoinHandle<()>) {
    let seen: Arc<Mutex<Vec<(HeaderMap, Value)>>> = Arc::default();
    let router = Router::new()
        .route(
            "/spin",
            post(
                move |State(seen): State<Arc<Mutex<Vec<(HeaderMap, Value)>>>>,
                      headers: HeaderMap,
                      Json(request): Json<Value>| {
                    let body = body.clone();
                    async move {
                        seen.lock().unwrap().push((headers, request));
                        (status, Json(body))
                    }
                },
            ),
        )
        .with_state(seen.clone());
    let (base_url, handle) = serve_router(router).await;
    (base_url, seen, handle)
}

fn resolver(base_url: &str) -> HttpResolver {
    HttpResolver::new(base_url, None, Duration::from_secs(5)).unwrap()
}

fn red_bet(units: u64) -> StagedBet {
    StagedBet::new(Bet::parse("color", Some("red")).unwrap(), Chips::from_units(units))
}

#[tokio::test]
async fn resolve__success_body_settles() {
    // given
    let (base_url, seen, handle) = stub_resolver(
        StatusCode::OK,
        json!({"result": 17, "color": "black", "total_win": 0.0, "new_bankroll": 900.0}),
    )
    .await;

    // when
    let resolution = resolver(&base_url).resolve(&[red_bet(100)]).await;

    // then
    assert_eq!(
        resolution,
        Resolution::Settled(Outcome {
            pocket: Pocket::from_number(17).unwrap(),
            color: Color::Black,
            bankroll: Chips::from_units(900),
            winnings: Some(Chips::ZERO),
        })
    );
    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].1,
        json!({"bets": [{"type": "red", "value": null, "amount": 100.0}]})
    );
    handle.abort();
}

#[tokio::test]
async fn resolve__error_body_with_client_error_status_is_a_transport_failure() {
    // given
    let (base_url, _seen, handle) =
        stub_resolver(StatusCode::BAD_REQUEST, json!({"error": "Saldo insuficiente"})).await;

    // when
    let resolution = resolver(&base_url).resolve(&[red_bet(5)]).await;

    // then
    assert!(matches!(
        resolution,
        Resolution::Failed(SpinFailure::Transport(message)) if message.contains("400")
    ));
    handle.abort();
}

#[tokio::test]
async fn resolve__error_body_with_ok_status_is_a_resolver_error() {
    let (base_url, _seen, handle) =
        stub_resolver(StatusCode::OK, json!({"error": "table closed"})).await;

    let resolution = resolver(&base_url).resolve(&[red_bet(5)]).await;

    assert_eq!(
        resolution,
        Resolution::Failed(SpinFailure::Resolver("table closed".into()))
    );
    handle.abort();
}

#[tokio::test]
async fn resolve__server_error_is_a_transport_failure() {
    let (base_url, _seen, handle) =
        stub_resolver(StatusCode::INTERNAL_SERVER_ERROR, json!({"detail": "boom"})).await;

    let resolution = resolver(&base_url).resolve(&[red_bet(5)]).await;

    assert!(matches!(
        resolution,
        Resolution::Failed(SpinFailure::Transport(message)) if message.contains("500")
    ));
    handle.abort();
}

#[tokio::test]
async fn resolve__missing_bankroll_is_a_transport_failure() {
    let (base_url, _seen, handle) =
        stub_resolver(StatusCode::OK, json!({"result": 3, "color": "red", "total_win": 10.0}))
            .await;

    let resolution = resolver(&base_url).resolve(&[red_bet(5)]).await;

    assert!(matches!(
        resolution,
        Resolution::Failed(SpinFailure::Transport(message)) if message.contains("malformed")
    ));
    handle.abort();
}

#[tokio::test]
async fn resolve__unreachable_service_is_a_transport_failure() {
    // given a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let resolution = resolver(&base_url).resolve(&[red_bet(5)]).await;

    assert!(matches!(
        resolution,
        Resolution::Failed(SpinFailure::Transport(_))
    ));
}

#[tokio::test]
async fn resolve__sends_session_cookie() {
    let (base_url, seen, handle) = stub_resolver(
        StatusCode::OK,
        json!({"result": "00", "color": "green", "new_bankroll": 95.0}),
    )
    .await;
    let resolver =
        HttpResolver::new(&base_url, Some("session=abc123"), Duration::from_secs(5)).unwrap();

    let resolution = resolver.resolve(&[red_bet(5)]).await;

    assert!(matches!(resolution, Resolution::Settled(outcome) if outcome.pocket == Pocket::DOUBLE_ZERO));
    let requests = seen.lock().unwrap().clone();
    assert_eq!(
        requests[0].0.get("cookie").and_then(|v| v.to_str().ok()),
        Some("session=abc123")
    );
    handle.abort();
}

#[tokio::test]
async fn session_spin__slow_service_times_out_and_refunds() {
    // given
    let router = Router::new().route(
        "/spin",
        post(|| async {
            sleep(Duration::from_secs(5)).await;
            Json(json!({"result": 1, "color": "red", "new_bankroll": 0.0}))
        }),
    );
    let (base_url, handle) = serve_router(router).await;
    let resolver = resolver(&base_url);
    let mut session = Session::new(Chips::from_units(1_000));
    session
        .stage(Bet::parse("straight", Some("1")).unwrap(), Chips::from_units(100))
        .unwrap();

    // when
    let report = session
        .spin(&resolver, Duration::from_millis(200))
        .await
        .unwrap();

    // then
    assert_eq!(session.bankroll(), Chips::from_units(1_000));
    assert!(session.staged().is_empty());
    assert!(matches!(
        report.settlement,
        Settlement::Refunded {
            failure: SpinFailure::Transport(ref message),
            ..
        } if message.contains("timed out")
    ));
    handle.abort();
}
