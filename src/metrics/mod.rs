
use autometrics::prometheus_exporter::{self, PrometheusResponse};
use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tokio::sync::watch;
use warp::{Filter, Rejection, Reply};

lazy_static! {
    pub static ref CHANNELS_OPENED_TOTAL: IntCounter = IntCounter::new(
        "feed_channels_opened_total",
        "Number of push channels opened by the reconciler"
    )
    .expect("metric can not be created");

    pub static ref CHANNELS_CANCELLED_TOTAL: IntCounter = IntCounter::new(
        "feed_channels_cancelled_total",
        "Number of push channels cancelled on retirement or teardown"
    )
    .expect("metric can not be created");

    pub static ref CHANNEL_OPEN_FAILURES: IntCounter = IntCounter::new(
        "feed_channel_open_failures_total",
        "Number of synchronous open_channel failures (retried on later passes)"
    )
    .expect("metric can not be created");

    pub static ref LIVE_CHANNELS: IntGauge = IntGauge::new(
        "feed_live_channels",
        "Number of currently open push channels"
    )
    .expect("metric can not be created");

    pub static ref EVENTS_ACCEPTED_TOTAL: IntCounter = IntCounter::new(
        "feed_events_accepted_total",
        "Number of channel events folded into the read model"
    )
    .expect("metric can not be created");

    pub static ref EVENTS_DISCARDED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "feed_events_discarded_total",
            "Number of channel events discarded before reaching the read model"
        ),
        &["reason"]
    )
    .expect("Should succeed to create metric");

    pub static ref REGISTRY: Registry = Registry::new();
}

fn register_custom_metrics() {
    REGISTRY
        .register(Box::new(CHANNELS_OPENED_TOTAL.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(CHANNELS_CANCELLED_TOTAL.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(CHANNEL_OPEN_FAILURES.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(LIVE_CHANNELS.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(EVENTS_ACCEPTED_TOTAL.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(EVENTS_DISCARDED_TOTAL.clone()))
        .expect("collector can be registered");
}

pub async fn start_server(
    port: u16,
    mut shutdown_signal: watch::Receiver<()>,
) {
    register_custom_metrics();

    let metrics_route = warp::path!("metrics").and_then(metrics_handler);

    let (_, server) =
        warp::serve(metrics_route).bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
            let _ = shutdown_signal.changed().await;
        });
    server.await;
}

async fn metrics_handler() -> Result<impl Reply, Rejection> {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        eprintln!("could not encode custom metrics: {}", e);
    };
    let mut res = match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    };

    res.push_str(&get_metrics_body());
    Ok(res)
}

/// Export metrics for Prometheus to scrape
pub fn get_metrics_body() -> String {
    let autometrics_response = prometheus_exporter::encode_http_response();
    autometrics_response.into_body()
}

/// Export metrics for Prometheus to scrape
pub fn get_metrics() -> PrometheusResponse {
    prometheus_exporter::encode_http_response()
}
