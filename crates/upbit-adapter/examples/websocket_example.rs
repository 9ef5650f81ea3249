/*
[INPUT]:  Market codes to subscribe
[OUTPUT]: Real-time ticker/trade events
[POS]:    Examples - WebSocket stream handling
[UPDATE]: When WebSocket API changes
*/

use tokio::time::{Duration, sleep};
use tracing_subscriber::EnvFilter;
use upbit_adapter::*;

/// Example: Stream tickers for ten seconds, then stop
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Upbit WebSocket Example ===\n");

    let request = SubscriptionRequest::new()
        .subscribe(StreamType::Ticker, ["KRW-BTC", "KRW-ETH"])
        .subscribe(StreamType::Trade, ["KRW-BTC"]);

    let mut session = StreamSession::new(request);
    let mut receiver = session.take_receiver().expect("Receiver already taken");
    let handle = session.handle();

    let task = tokio::spawn(async move { session.start().await });

    tokio::spawn({
        let handle = handle.clone();
        async move {
            sleep(Duration::from_secs(10)).await;
            handle.stop();
        }
    });

    while let Some(event) = receiver.recv().await {
        match event {
            StreamEvent::Message(message) => println!("✓ {}", message),
            StreamEvent::Error { kind, detail } => println!("✗ {:?}: {}", kind, detail),
            StreamEvent::Closed => println!("Stream closed"),
        }
    }

    match task.await {
        Ok(Ok(())) => println!("\n✓ WebSocket example complete ({:?})", handle.state()),
        Ok(Err(e)) => eprintln!("Stream failed: {}", e),
        Err(e) => eprintln!("Stream task panicked: {}", e),
    }
}
