use chrono::{Duration as ChronoDuration, Utc};
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Client;
use seatclaim_backend::domain::models::auth::Claims;
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

const DURATION_SECS: u64 = 20;
const BASE_URL: &str = "http://localhost:3000";
const RESORT_ID: &str = "bench-resort";
const CLAIMS_PER_SEAT: usize = 32;
const STORM_SEATS: i32 = 8;

#[tokio::main]
async fn main() {
    println!("{}", "🚀 Starting Claim Benchmark Suite".bold().green());
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

    let token = staff_token();

    println!("\n{}", "⚙️  Setting up benchmark data...".yellow());
    let seat_ids = setup_lesson(&client, &token).await;
    println!("{}", "✅ Data created successfully.".green());
    println!("   Seats: {}", seat_ids.len());

    // Read-path throughput: verify a single standing invitation.
    let verify_code = issue_code(&client, &token, &seat_ids[0]).await;

    println!("\n{}", "=".repeat(60));
    println!("Benchmarking Endpoint: {}", "Verify Invitation (Public Read)".cyan().bold());
    println!("{}", "=".repeat(60));
    println!("{:<10} | {:<15} | {:<15} | {:<15}", "RPS", "Mean (ms)", "P99 (ms)", "Success Rate");
    println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

    for &rps in &[10u32, 50, 200, 1000] {
        run_verify_stage(&client, &verify_code, rps).await;
    }

    // Write-path contention: storm each code with concurrent claims and
    // count winners. Anything other than exactly one is a correctness bug.
    println!("\n{}", "=".repeat(60));
    println!("Claim Storm: {} concurrent claims per seat", CLAIMS_PER_SEAT);
    println!("{}", "=".repeat(60));
    println!("{:<10} | {:<10} | {:<12} | {:<15}", "Seat", "Winners", "Conflicts", "P99 (ms)");
    println!("{:-<10}-+-{:-<10}-+-{:-<12}-+-{:-<15}", "", "", "", "");

    let mut all_ok = true;
    for (i, seat_id) in seat_ids.iter().enumerate().skip(1) {
        let code = issue_code(&client, &token, seat_id).await;
        submit_identity(&client, &code, i).await;

        let (winners, conflicts, p99_ms) = storm_claims(&client, &code, i).await;

        let row = format!("{:<10} | {:<10} | {:<12} | {:<15.2}", i, winners, conflicts, p99_ms);
        if winners == 1 {
            println!("{}", row);
        } else {
            all_ok = false;
            println!("{}", row.as_str().red().bold());
        }
    }

    if all_ok {
        println!("\n{}", "✅ Every storm produced exactly one winner.".green().bold());
    } else {
        println!("\n{}", "❌ At least one seat was claimed more or less than once!".red().bold());
    }
}

fn staff_token() -> String {
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret".to_string());
    let claims = Claims {
        sub: "benchmark-bot".to_string(),
        resort_id: RESORT_ID.to_string(),
        role: "ADMIN".to_string(),
        exp: (Utc::now() + ChronoDuration::hours(1)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("Failed to mint benchmark token")
}

async fn setup_lesson(client: &Client, token: &str) -> Vec<String> {
    let res = client.post(format!("{}/api/v1/{}/lessons", BASE_URL, RESORT_ID))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Benchmark Lesson",
            "starts_at": (Utc::now() + ChronoDuration::days(7)).to_rfc3339(),
            "seat_count": STORM_SEATS + 1
        }))
        .send()
        .await
        .expect("Failed to send lesson create request");

    if !res.status().is_success() {
        panic!("Failed to create lesson: status {}", res.status());
    }

    let body: Value = res.json().await.expect("Failed to parse lesson response");
    body["seats"].as_array().expect("No seats in response")
        .iter()
        .map(|s| s["id"].as_str().expect("Seat without id").to_string())
        .collect()
}

async fn issue_code(client: &Client, token: &str, seat_id: &str) -> String {
    let res = client.post(format!("{}/api/v1/{}/seats/{}/invitation", BASE_URL, RESORT_ID, seat_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to issue invitation");

    if !res.status().is_success() {
        panic!("Failed to issue invitation: status {}", res.status());
    }

    let body: Value = res.json().await.unwrap();
    body["code"].as_str().expect("No code in response").to_string()
}

async fn submit_identity(client: &Client, code: &str, n: usize) {
    let res = client.put(format!("{}/api/v1/invitations/{}/identity", BASE_URL, code))
        .json(&json!({
            "student_name": format!("Storm Student {}", n),
            "contact_email": format!("storm{}@bench.local", n)
        }))
        .send()
        .await
        .expect("Failed to submit identity form");

    if !res.status().is_success() {
        panic!("Failed to submit identity form: status {}", res.status());
    }
}

async fn storm_claims(client: &Client, code: &str, n: usize) -> (usize, usize, f64) {
    let mut set = JoinSet::new();

    for attempt in 0..CLAIMS_PER_SEAT {
        let client = client.clone();
        let url = format!("{}/api/v1/invitations/{}/claim", BASE_URL, code);
        let body = json!({
            "student_name": format!("Storm Student {}", n),
            "contact_email": format!("storm{}-{}@bench.local", n, attempt)
        });

        set.spawn(async move {
            let req_start = Instant::now();
            let res = client.post(&url).json(&body).send().await;
            let latency = req_start.elapsed();
            let won = matches!(res, Ok(ref r) if r.status().is_success());
            (latency, won)
        });
    }

    let mut histogram = Histogram::<u64>::new(3).unwrap();
    let mut winners = 0;
    let mut conflicts = 0;

    while let Some(res) = set.join_next().await {
        let (latency, won) = res.unwrap();
        histogram.record(latency.as_micros() as u64).unwrap();
        if won { winners += 1; } else { conflicts += 1; }
    }

    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    (winners, conflicts, p99_ms)
}

async fn run_verify_stage(client: &Client, code: &str, rps: u32) {
    let limiter = Arc::new(RateLimiter::direct(
        Quota::per_second(NonZeroU32::new(rps).unwrap())
    ));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(DURATION_SECS);
    let url = format!("{}/api/v1/invitations/{}", BASE_URL, code);

    loop {
        if start_time.elapsed() > duration {
            break;
        }

        if limiter.check().is_ok() {
            let client = client.clone();
            let url = url.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let req_start = Instant::now();
                let res = client.get(&url).send().await;
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
