use chrono::{Duration as ChronoDuration, Utc};
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use reqwest::Client;
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use uuid::Uuid;

const DURATION_SECS: u64 = 20;
const BASE_URL: &str = "http://localhost:3000";

struct Target {
    name: &'static str,
    method: &'static str,
    url: String,
    body: Option<serde_json::Value>,
}

#[tokio::main]
async fn main() {
    println!("{}", "🚀 Starting Benchmark Suite".bold().green());
    println!("Target URL: {}", BASE_URL);

    let client = Client::builder()
        .pool_max_idle_per_host(1000)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    if client.get(format!("{}/health", BASE_URL)).send().await.is_err() {
        eprintln!("{}", "❌ Server is NOT reachable at localhost:3000. Please start it first.".red().bold());
        return;
    }

    println!("\n{}", "⚙️  Setting up benchmark data...".yellow());
    let wedding_id = setup_wedding(&client).await;
    let guest = setup_guest(&client, &wedding_id).await;
    let guest_id = guest["id"].as_str().expect("No guest id").to_string();
    let token = guest["token"].as_str().expect("No guest token").to_string();

    println!("{}", "✅ Data created successfully.".green());
    println!("   Wedding ID: {}", wedding_id);
    println!("   Guest ID:   {}", guest_id);

    let targets = vec![
        Target {
            name: "Health Check (Public)",
            method: "GET",
            url: format!("{}/health", BASE_URL),
            body: None,
        },
        Target {
            name: "Open Invitation (Public Read)",
            method: "GET",
            url: format!("{}/api/v1/rsvp/{}", BASE_URL, token),
            body: None,
        },
        Target {
            name: "WhatsApp Reminder (Counter Increment)",
            method: "POST",
            url: format!("{}/api/v1/guests/{}/dispatch", BASE_URL, guest_id),
            body: Some(json!({ "channel": "whatsapp", "kind": "reminder" })),
        },
        Target {
            name: "Door Check-in (Idempotent CAS)",
            method: "POST",
            url: format!("{}/api/v1/guests/{}/check-in", BASE_URL, guest_id),
            body: None,
        },
    ];

    let rps_stages = vec![10, 50, 200, 1000];

    for target in targets {
        println!("\n{}", "=".repeat(60));
        println!("Benchmarking Endpoint: {}", target.name.cyan().bold());
        println!("URL: {}", target.url);
        println!("{}", "=".repeat(60));

        println!("{:<10} | {:<15} | {:<15} | {:<15}", "RPS", "Mean (ms)", "P99 (ms)", "Success Rate");
        println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

        for &rps in &rps_stages {
            run_stage(&client, &target, rps).await;
        }
    }
}

async fn setup_wedding(client: &Client) -> String {
    let slug = format!("bench-{}", Uuid::new_v4());
    let res = client.post(format!("{}/api/v1/weddings", BASE_URL))
        .json(&json!({
            "slug": slug,
            "couple_names": "Ana & Rui",
            "timezone": "Africa/Maputo",
            "wedding_date": (Utc::now() + ChronoDuration::days(60)).to_rfc3339(),
            "default_rsvp_deadline": (Utc::now() + ChronoDuration::days(30)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send wedding create request");

    if !res.status().is_success() {
        panic!("Failed to create wedding: status {}", res.status());
    }

    let body: Value = res.json().await.expect("Failed to parse wedding response");
    body["id"].as_str().expect("No wedding id").to_string()
}

/// Creates a guest and confirms the invitation so check-in is allowed.
async fn setup_guest(client: &Client, wedding_id: &str) -> Value {
    let res = client.post(format!("{}/api/v1/weddings/{}/guests", BASE_URL, wedding_id))
        .json(&json!({
            "name": "Benchmark Guest",
            "phone": "+258841234567",
            "email": "bench@example.com",
            "companions": 1,
            "table_name": "1"
        }))
        .send()
        .await
        .expect("Failed to create guest");

    if !res.status().is_success() {
        let status = res.status();
        let txt = res.text().await.unwrap_or_default();
        panic!("Failed to create guest. Status: {}. Body: {}", status, txt);
    }

    let guest: Value = res.json().await.unwrap();
    let token = guest["token"].as_str().unwrap();

    let rsvp = client.post(format!("{}/api/v1/rsvp/{}", BASE_URL, token))
        .json(&json!({ "decision": "confirmed" }))
        .send()
        .await
        .expect("RSVP failed during setup");

    if !rsvp.status().is_success() {
        panic!("RSVP failed. Status: {}", rsvp.status());
    }

    guest
}

async fn run_stage(client: &Client, target: &Target, rps: u32) {
    let limiter = Arc::new(RateLimiter::direct(
        Quota::per_second(NonZeroU32::new(rps).unwrap())
    ));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(DURATION_SECS);

    loop {
        if start_time.elapsed() > duration {
            break;
        }

        if limiter.check().is_ok() {
            let client = client.clone();
            let url = target.url.clone();
            let body = target.body.clone();
            let method = target.method;
            let tx = tx.clone();

            tokio::spawn(async move {
                let req_start = Instant::now();
                let res = match method {
                    "GET" => client.get(&url).send().await,
                    "POST" => {
                        let mut req = client.post(&url);
                        if let Some(b) = body {
                            req = req.json(&b);
                        }
                        req.send().await
                    },
                    _ => client.get(&url).send().await,
                };
                let latency = req_start.elapsed();

                let success = match res {
                    Ok(r) => r.status().is_success(),
                    Err(_) => false,
                };

                let _ = tx.send((latency, success)).await;
            });
        } else {
            tokio::task::yield_now().await;
        }
    }

    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).unwrap();
    let mut successes = 0;
    let mut total = 0;

    while let Some((latency, success)) = rx.recv().await {
        total += 1;
        if success { successes += 1; }
        histogram.record(latency.as_micros() as u64).unwrap();
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let success_rate = if total > 0 { (successes as f64 / total as f64) * 100.0 } else { 0.0 };

    println!(
        "{:<10} | {:<15.2} | {:<15.2} | {:<14.1}%",
        rps,
        mean_ms,
        p99_ms,
        success_rate
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
}