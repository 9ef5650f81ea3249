/*
[INPUT]:  Order parameters and signed Authorization header
[OUTPUT]: Account balances, order chance, order details and placement results
[POS]:    HTTP layer - Exchange API account/order endpoints (require auth)
[UPDATE]: When adding new order endpoints or changing paths
*/

use reqwest::Method;
use serde_json::Value;

use crate::http::{Result, UpbitClient};
use crate::types::Query;

impl UpbitClient {
    /// List held assets
    ///
    /// GET /v1/accounts
    pub async fn accounts(&self) -> Result<Value> {
        self.private_request(Method::GET, "/v1/accounts", &Query::new())
            .await
    }

    /// Order availability for a market
    ///
    /// GET /v1/orders/chance?market={market}
    pub async fn order_chance(&self, query: &Query) -> Result<Value> {
        self.private_request(Method::GET, "/v1/orders/chance", query)
            .await
    }

    /// Single order by `uuid` or `identifier`
    ///
    /// GET /v1/order
    pub async fn order(&self, query: &Query) -> Result<Value> {
        self.private_request(Method::GET, "/v1/order", query).await
    }

    /// Order list; accepts array filters such as `states`, `uuids`, `identifiers`
    ///
    /// GET /v1/orders
    pub async fn list_orders(&self, query: &Query) -> Result<Value> {
        self.private_request(Method::GET, "/v1/orders", query).await
    }

    /// Cancel an order by `uuid` or `identifier`
    ///
    /// DELETE /v1/orders
    pub async fn cancel_order(&self, query: &Query) -> Result<Value> {
        self.private_request(Method::DELETE, "/v1/orders", query)
            .await
    }

    /// Place an order (`market`, `side`, `volume`, `price`, `ord_type`, `identifier`)
    ///
    /// POST /v1/orders
    pub async fn place_order(&self, query: &Query) -> Result<Value> {
        self.private_request(Method::POST, "/v1/orders", query).await
    }
}
