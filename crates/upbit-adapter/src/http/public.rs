/*
[INPUT]:  Market codes and query parameters
[OUTPUT]: Market data (markets, candles, trades, ticker, orderbook)
[POS]:    HTTP layer - Quotation API endpoints (no auth required)
[UPDATE]: When adding new public endpoints or changing response format
*/

use reqwest::Method;
use serde_json::Value;

use crate::http::{Result, UpbitClient};
use crate::types::{Query, QueryValue};

const DEFAULT_MINUTE_UNIT: &str = "1";

impl UpbitClient {
    /// Tradable markets
    ///
    /// GET /v1/market/all?isDetails={bool}
    pub async fn market_all(&self, query: &Query) -> Result<Value> {
        self.public_request(Method::GET, "/v1/market/all", query)
            .await
    }

    /// Minute candles. `unit` is spliced into the path (default 1); every
    /// other parameter goes to the query string.
    ///
    /// GET /v1/candles/minutes/{unit}?market={market}&to={to}&count={count}
    pub async fn candles_minutes(&self, query: &Query) -> Result<Value> {
        let mut query = query.clone();
        let unit = match query.remove("unit") {
            Some(QueryValue::Scalar(unit)) => unit,
            Some(QueryValue::List(units)) => units
                .into_iter()
                .next()
                .unwrap_or_else(|| DEFAULT_MINUTE_UNIT.to_string()),
            None => DEFAULT_MINUTE_UNIT.to_string(),
        };

        let endpoint = format!("/v1/candles/minutes/{unit}");
        self.public_request(Method::GET, &endpoint, &query).await
    }

    /// Day candles
    ///
    /// GET /v1/candles/days
    pub async fn candles_days(&self, query: &Query) -> Result<Value> {
        self.public_request(Method::GET, "/v1/candles/days", query)
            .await
    }

    /// Week candles
    ///
    /// GET /v1/candles/weeks
    pub async fn candles_weeks(&self, query: &Query) -> Result<Value> {
        self.public_request(Method::GET, "/v1/candles/weeks", query)
            .await
    }

    /// Month candles
    ///
    /// GET /v1/candles/months
    pub async fn candles_months(&self, query: &Query) -> Result<Value> {
        self.public_request(Method::GET, "/v1/candles/months", query)
            .await
    }

    /// Recent trades
    ///
    /// GET /v1/trades/ticks
    pub async fn trades_ticks(&self, query: &Query) -> Result<Value> {
        self.public_request(Method::GET, "/v1/trades/ticks", query)
            .await
    }

    /// Ticker snapshot; `markets` is a comma separated list
    ///
    /// GET /v1/ticker?markets={markets}
    pub async fn ticker(&self, query: &Query) -> Result<Value> {
        self.public_request(Method::GET, "/v1/ticker", query).await
    }

    /// Orderbook snapshot; `markets` is a comma separated list
    ///
    /// GET /v1/orderbook?markets={markets}
    pub async fn orderbook(&self, query: &Query) -> Result<Value> {
        self.public_request(Method::GET, "/v1/orderbook", query)
            .await
    }
}
