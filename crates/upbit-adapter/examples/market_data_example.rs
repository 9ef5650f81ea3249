/*
[INPUT]:  Market code (e.g., "KRW-BTC")
[OUTPUT]: Market data (markets, ticker, orderbook, candles)
[POS]:    Examples - public quotation queries
[UPDATE]: When adding new quotation endpoints
*/

use upbit_adapter::*;

/// Example: Query market data (no authentication required)
#[tokio::main]
async fn main() {
    println!("=== Upbit Market Data Example ===\n");

    let client = match UpbitClient::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("✓ HTTP client created (no auth required for quotation endpoints)\n");

    let market = "KRW-BTC";

    println!("Querying tradable markets...");
    match client.market_all(&Query::new().with("isDetails", false)).await {
        Ok(markets) => println!(
            "✓ Markets: {}",
            markets.as_array().map(Vec::len).unwrap_or_default()
        ),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying ticker for {}...", market);
    match client.ticker(&Query::new().with("markets", market)).await {
        Ok(ticker) => println!("✓ Ticker: {}", ticker),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying orderbook for {}...", market);
    match client.orderbook(&Query::new().with("markets", market)).await {
        Ok(orderbook) => println!("✓ Orderbook: {}", orderbook),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying 5 minute candles for {}...", market);
    let candles = Query::new()
        .with("unit", 5)
        .with("market", market)
        .with("count", 3);
    match client.candles_minutes(&candles).await {
        Ok(candles) => println!("✓ Candles: {}", candles),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\n✓ Market data example complete");
}
