//! Retry Patterns Example
//!
//! Walks through the retry policies with operations that fail on purpose:
//! - Immediate retries with Directly
//! - Fixed and exponential delays
//! - Jittered backoff
//! - Choosing a schedule from the error with When
//! - Observing retries with a hook
//! - Bounding an unbounded policy from outside

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use undertow::prelude::*;
use undertow::JitterState;

/// An operation that fails `failures` times, printing every attempt.
fn flaky(
    failures: u32,
) -> (
    Arc<AtomicU32>,
    impl FnMut() -> futures::future::Ready<Result<String, &'static str>> + Send + 'static,
) {
    let attempts = Arc::new(AtomicU32::new(0));
    let op = {
        let attempts = attempts.clone();
        move || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            println!("  Attempt {}", n + 1);
            futures::future::ready(if n < failures {
                Err("transient failure")
            } else {
                Ok(format!("success on attempt {}", n + 1))
            })
        }
    };
    (attempts, op)
}

// ==================== Immediate Retry ====================

async fn example_directly() {
    println!("\n=== Example 1: Directly ===");

    let env = RetryEnv::default();
    let (attempts, op) = flaky(2);

    let result = Directly::new(3).retry(&env, op).await;

    println!("Result: {:?}", result);
    println!("Total attempts: {}", attempts.load(Ordering::SeqCst));
}

// ==================== Delay Schedules ====================

async fn example_schedules() {
    println!("\n=== Example 2: Delay Schedules ===");

    let pause = Pause::new(4, Duration::from_millis(100)).unwrap();
    println!("Pause delay: {:?}", pause.delay());

    let backoff = Backoff::new(5, Duration::from_millis(100))
        .unwrap()
        .with_max_delay(Duration::from_millis(500))
        .unwrap();
    println!("\nBackoff delays (capped at 500ms):");
    for i in 0..5 {
        println!("  Retry {}: {:?}", i + 1, backoff.delay_for_retry(i));
    }

    let jitter = Jitter::decorrelated(Arc::new(SeededRandom::new(7)), Duration::from_secs(2));
    println!("\nDecorrelated jitter (seeded):");
    let mut state = JitterState::default();
    for i in 0..5 {
        let (delay, next) = jitter.next(Duration::from_millis(100), i, state);
        state = next;
        println!("  Retry {}: {:?}", i + 1, delay);
    }

    let env = RetryEnv::default();
    let (attempts, op) = flaky(2);
    let result = JitterBackoff::new(
        4,
        Duration::from_millis(50),
        Jitter::full(Arc::new(ThreadRandom)),
    )
    .unwrap()
    .retry(&env, op)
    .await;

    println!("\nFull jitter result: {:?}", result);
    println!("Total attempts: {}", attempts.load(Ordering::SeqCst));
}

// ==================== Conditional Retry ====================

#[derive(Debug, Clone, PartialEq)]
enum HttpError {
    TooManyRequests,
    ServerError(u16),
    ClientError(u16),
}

async fn example_conditional() {
    println!("\n=== Example 3: Conditional Retry ===");

    let policy = When::<String, HttpError>::new()
        .on_failure(
            |e| *e == HttpError::TooManyRequests,
            |_| Pause::new(3, Duration::from_millis(200)).unwrap(),
        )
        .on_failure(
            |e| matches!(e, HttpError::ServerError(code) if *code >= 500),
            |_| Backoff::new(3, Duration::from_millis(50)).unwrap(),
        );

    let env = RetryEnv::default();
    let attempts = Arc::new(AtomicU32::new(0));
    let result = policy
        .retry(&env, {
            let attempts = attempts.clone();
            move || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                println!("  Request {}", n + 1);
                async move {
                    match n {
                        0 | 1 => Err(HttpError::ServerError(503)),
                        _ => Ok("200 OK".to_string()),
                    }
                }
            }
        })
        .await;
    println!("Server errors then success: {:?}", result);

    let result = policy
        .retry(&env, || async { Err(HttpError::ClientError(404)) })
        .await;
    println!("Client error (no retries): {:?}", result);
}

// ==================== Hooks ====================

async fn example_hooks() {
    println!("\n=== Example 4: Retry Hook ===");

    let env = RetryEnv::default().with_hook(|event: &RetryEvent<'_, String, &'static str>| {
        println!("  Attempt {} failed: {:?}", event.attempt, event.outcome);
        match event.next_delay {
            Some(delay) => println!("         Waiting {:?} before retry...", delay),
            None => println!("         No more retries!"),
        }
        println!("         Total elapsed: {:?}", event.elapsed);
    });

    let (_, op) = flaky(5);
    let result = Backoff::new(2, Duration::from_millis(20))
        .unwrap()
        .retry(&env, op)
        .await;

    println!("\nResult: {:?}", result);
}

// ==================== Bounding Forever ====================

async fn example_forever_with_deadline() {
    println!("\n=== Example 5: Retry Forever Under a Deadline ===");

    let env = RetryEnv::default();
    let (attempts, op) = flaky(u32::MAX);
    let policy = Pause::forever(Duration::from_millis(100)).unwrap();

    match tokio::time::timeout(Duration::from_millis(350), policy.retry(&env, op)).await {
        Ok(result) => println!("Finished: {:?}", result),
        Err(_) => println!("Gave up at the deadline"),
    }
    println!("Total attempts: {}", attempts.load(Ordering::SeqCst));
}

#[tokio::main]
async fn main() {
    // Run with `--features tracing` to see the engine's own retry events.
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    println!("======================================");
    println!("       Retry Patterns Example         ");
    println!("======================================");

    example_directly().await;
    example_schedules().await;
    example_conditional().await;
    example_hooks().await;
    example_forever_with_deadline().await;

    println!("\n======================================");
    println!("           Examples Complete           ");
    println!("======================================");
}
