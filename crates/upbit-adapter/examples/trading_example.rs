/*
[INPUT]:  API keys from the environment and order parameters
[OUTPUT]: Account balances and order listings
[POS]:    Examples - authenticated exchange operations
[UPDATE]: When exchange API changes
*/

use upbit_adapter::*;

/// Example: Authenticated calls
///
/// Every exchange endpoint carries `Authorization: Bearer <jwt>`, where the
/// token binds the access key, a fresh nonce and the SHA-512 hash of the query.
#[tokio::main]
async fn main() {
    println!("=== Upbit Trading Example ===\n");

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("Missing credentials: {}", e);
            eprintln!("Set UPBIT_OPEN_API_ACCESS_KEY and UPBIT_OPEN_API_SECRET_KEY");
            return;
        }
    };

    let client = match UpbitClient::new().and_then(|client| client.with_credentials(credentials)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("✓ Authenticated client created\n");

    println!("Querying accounts...");
    match client.accounts().await {
        Ok(accounts) => println!("✓ Accounts: {}", accounts),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying open and finished orders...");
    let query = Query::new()
        .with("market", "KRW-BTC")
        .with("states", vec!["wait", "done"]);
    match client.list_orders(&query).await {
        Ok(orders) => println!("✓ Orders: {}", orders),
        Err(e) if e.is_auth_error() => println!("✗ Rejected credentials: {}", e),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\n✓ Trading example complete");
}
