//! Example: Poll the focused application and print changes.
//!
//! Run with: cargo run -p keyshift-context --example poll_context

use keyshift_context::{platform::PlatformProvider, ContextEvent, ContextPoller};
use std::sync::Arc;
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("keyshift_context=debug")
        .init();

    println!("=== Context Poller Example ===");
    println!("Switch between apps to see focus changes.\n");

    let provider = Arc::new(PlatformProvider::new());
    let mut poller = ContextPoller::new();

    poller.start(
        provider,
        Arc::new(|event| {
            let now = chrono::Local::now().format("%H:%M:%S");
            match event {
                ContextEvent::Focused(kind) => println!(
                    "[{}] Focused: {} ({})",
                    now,
                    kind.app.display_name(),
                    kind.cache_key()
                ),
                ContextEvent::Terminated(bundle_id) => {
                    println!("[{}] Terminated: {}", now, bundle_id)
                }
            }
        }),
    );

    println!("Running for 30 seconds... (Ctrl+C to stop)\n");
    std::thread::sleep(Duration::from_secs(30));

    poller.stop();
    println!("\nDone.");
}
