/*
[INPUT]:  Deposit/withdrawal parameters and signed Authorization header
[OUTPUT]: Withdrawal, deposit, wallet status and API key data
[POS]:    HTTP layer - Exchange API wallet endpoints (require auth)
[UPDATE]: When adding new wallet endpoints or changing paths
*/

use reqwest::Method;
use serde_json::Value;

use crate::http::{Result, UpbitClient};
use crate::types::Query;

impl UpbitClient {
    // ### Withdrawals

    /// Withdrawal list; accepts array filters `uuids` and `txids`
    ///
    /// GET /v1/withdraws
    pub async fn withdraws(&self, query: &Query) -> Result<Value> {
        self.private_request(Method::GET, "/v1/withdraws", query)
            .await
    }

    /// Single withdrawal by `uuid`, `txid` or `currency`
    ///
    /// GET /v1/withdraw
    pub async fn withdraw(&self, query: &Query) -> Result<Value> {
        self.private_request(Method::GET, "/v1/withdraw", query).await
    }

    /// Withdrawal availability for a currency
    ///
    /// GET /v1/withdraws/chance?currency={currency}
    pub async fn withdraws_chance(&self, query: &Query) -> Result<Value> {
        self.private_request(Method::GET, "/v1/withdraws/chance", query)
            .await
    }

    /// Request a coin withdrawal
    ///
    /// POST /v1/withdraws/coin
    pub async fn withdraw_coin(&self, query: &Query) -> Result<Value> {
        self.private_request(Method::POST, "/v1/withdraws/coin", query)
            .await
    }

    /// Request a KRW withdrawal to the registered account
    ///
    /// POST /v1/withdraws/krw
    pub async fn withdraw_krw(&self, query: &Query) -> Result<Value> {
        self.private_request(Method::POST, "/v1/withdraws/krw", query)
            .await
    }

    // ### Deposits

    /// Deposit list; accepts array filters `uuids` and `txids`
    ///
    /// GET /v1/deposits
    pub async fn deposits(&self, query: &Query) -> Result<Value> {
        self.private_request(Method::GET, "/v1/deposits", query)
            .await
    }

    /// Single deposit by `uuid`, `txid` or `currency`
    ///
    /// GET /v1/deposit
    pub async fn deposit(&self, query: &Query) -> Result<Value> {
        self.private_request(Method::GET, "/v1/deposit", query).await
    }

    /// Ask the exchange to generate a deposit address (asynchronous on the server side)
    ///
    /// POST /v1/deposits/generate_coin_address
    pub async fn generate_coin_address(&self, query: &Query) -> Result<Value> {
        self.private_request(Method::POST, "/v1/deposits/generate_coin_address", query)
            .await
    }

    /// All deposit addresses
    ///
    /// GET /v1/deposits/coin_addresses
    pub async fn coin_addresses(&self) -> Result<Value> {
        self.private_request(Method::GET, "/v1/deposits/coin_addresses", &Query::new())
            .await
    }

    /// Deposit address for one currency
    ///
    /// GET /v1/deposits/coin_address?currency={currency}
    pub async fn coin_address(&self, query: &Query) -> Result<Value> {
        self.private_request(Method::GET, "/v1/deposits/coin_address", query)
            .await
    }

    /// Deposit KRW
    ///
    /// POST /v1/deposits/krw
    pub async fn deposit_krw(&self, query: &Query) -> Result<Value> {
        self.private_request(Method::POST, "/v1/deposits/krw", query)
            .await
    }

    // ### Service status

    /// Deposit/withdrawal status and block state per currency
    ///
    /// GET /v1/status/wallet
    pub async fn wallet_status(&self) -> Result<Value> {
        self.private_request(Method::GET, "/v1/status/wallet", &Query::new())
            .await
    }

    /// API keys and their expiry dates
    ///
    /// GET /v1/api_keys
    pub async fn api_keys(&self) -> Result<Value> {
        self.private_request(Method::GET, "/v1/api_keys", &Query::new())
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::Credentials;
    use crate::http::{ClientConfig, RequestSigner, UpbitClient};
    use crate::types::Query;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_withdraws_hashes_array_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/withdraws"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = Credentials::new("AK", "SK");
        let client = UpbitClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
            .expect("client init")
            .with_credentials(credentials.clone())
            .expect("credentials");

        let query = Query::new()
            .with("currency", "XRP")
            .with("txids", ["tx-1", "tx-2"]);
        let response = client.withdraws(&query).await.expect("withdraws failed");
        assert_eq!(response, serde_json::json!([]));

        let requests = server.received_requests().await.expect("recorded requests");
        let sent_query = requests[0].url.query().expect("query string");
        assert_eq!(sent_query, "currency=XRP&txids[]=tx-1&txids[]=tx-2");

        let authorization = requests[0]
            .headers
            .get("authorization")
            .expect("authorization header")
            .to_str()
            .expect("ascii header");
        let token = authorization.strip_prefix("Bearer ").expect("bearer prefix");
        let claims = RequestSigner::new(credentials)
            .expect("signer")
            .verify(token)
            .expect("valid token");

        assert_eq!(
            claims.query_hash.as_deref(),
            Some(RequestSigner::query_hash(sent_query).as_str())
        );
    }

    #[tokio::test]
    async fn test_wallet_status_has_no_query_hash() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/status/wallet"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"currency": "BTC", "wallet_state": "working"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = Credentials::new("AK", "SK");
        let client = UpbitClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
            .expect("client init")
            .with_credentials(credentials.clone())
            .expect("credentials");

        let response = client.wallet_status().await.expect("wallet_status failed");
        assert_eq!(response[0]["wallet_state"], "working");

        let requests = server.received_requests().await.expect("recorded requests");
        assert!(requests[0].url.query().is_none());

        let token = requests[0].headers["authorization"]
            .to_str()
            .expect("ascii header")
            .trim_start_matches("Bearer ")
            .to_string();
        let claims = RequestSigner::new(credentials)
            .expect("signer")
            .verify(&token)
            .expect("valid token");
        assert!(claims.query_hash.is_none());
    }
}
