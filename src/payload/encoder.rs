use chrono::{DateTime, FixedOffset};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::market_data::MarketTick;
use crate::transport::{PublishError, Result};

/// Canonical wire record shared by every transport
///
/// Field names are part of the wire contract with existing consumers and
/// must stay lowercase as written here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickPayload {
    pub local_symbol: String,
    #[serde(serialize_with = "serialize_price", deserialize_with = "deserialize_price")]
    pub bidprice: f64,
    #[serde(serialize_with = "serialize_price", deserialize_with = "deserialize_price")]
    pub askprice: f64,
    /// Only present on pub/sub payloads
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_spread",
        deserialize_with = "deserialize_spread"
    )]
    pub spread: Option<f64>,
    pub time: String,
}

impl TickPayload {
    /// Build the wire record for a tick
    pub fn from_tick(tick: &MarketTick, include_spread: bool) -> Self {
        Self {
            local_symbol: tick.symbol.clone(),
            bidprice: tick.bid_price,
            askprice: tick.ask_price,
            spread: include_spread.then(|| spread(tick.bid_price, tick.ask_price)),
            time: format_timestamp(&tick.timestamp),
        }
    }

    /// Parse `time` back into a timestamp
    pub fn timestamp(&self) -> Result<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.time).map_err(|e| {
            PublishError::Encoding(serde::de::Error::custom(format!(
                "invalid payload time '{}': {}",
                self.time, e
            )))
        })
    }
}

/// Encode a tick into UTF-8 JSON bytes
///
/// Values are not validated. Non-finite prices have no JSON number form and
/// are written as the strings `"NaN"`, `"Infinity"` and `"-Infinity"`, which
/// .NET JSON readers accept as doubles.
pub fn encode(tick: &MarketTick, include_spread: bool) -> Result<Vec<u8>> {
    let payload = TickPayload::from_tick(tick, include_spread);
    Ok(serde_json::to_vec(&payload)?)
}

/// Decode a payload produced by [`encode`]
pub fn decode(bytes: &[u8]) -> Result<TickPayload> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Absolute bid/ask difference; NaN in, NaN out
pub fn spread(bid_price: f64, ask_price: f64) -> f64 {
    (ask_price - bid_price).abs()
}

/// Round-trippable ISO-8601 form with 7 fractional digits and a `+HH:MM` offset
///
/// Matches the "o" round-trip format existing consumers already parse.
/// Precision below 100ns is truncated.
pub fn format_timestamp(time: &DateTime<FixedOffset>) -> String {
    // leap seconds report nanos >= 1e9
    let ticks = (time.timestamp_subsec_nanos() / 100).min(9_999_999);
    format!(
        "{}.{:07}{}",
        time.format("%Y-%m-%dT%H:%M:%S"),
        ticks,
        time.format("%:z")
    )
}

fn serialize_price<S>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_nan() {
        serializer.serialize_str("NaN")
    } else if *value == f64::INFINITY {
        serializer.serialize_str("Infinity")
    } else if *value == f64::NEG_INFINITY {
        serializer.serialize_str("-Infinity")
    } else {
        serializer.serialize_f64(*value)
    }
}

fn serialize_spread<S>(value: &Option<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(spread) => serialize_price(spread, serializer),
        None => serializer.serialize_none(),
    }
}

/// A price as it may appear on the wire
#[derive(Deserialize)]
#[serde(untagged)]
enum WirePrice {
    Number(f64),
    Text(String),
}

impl WirePrice {
    fn into_f64<E: de::Error>(self) -> std::result::Result<f64, E> {
        match self {
            WirePrice::Number(value) => Ok(value),
            WirePrice::Text(text) => match text.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                _ => Err(E::custom(format!("invalid price '{}'", text))),
            },
        }
    }
}

// null is read as NaN
fn deserialize_price<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<WirePrice>::deserialize(deserializer)? {
        Some(price) => price.into_f64(),
        None => Ok(f64::NAN),
    }
}

fn deserialize_spread<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<WirePrice>::deserialize(deserializer)?
        .map(WirePrice::into_f64)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Utc};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_queue_payload_shape() {
        let tick = MarketTick::new("AAPL", 100.0, 100.5, noon());
        let bytes = encode(&tick, false).unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"local_symbol":"AAPL","bidprice":100.0,"askprice":100.5,"time":"2024-01-01T12:00:00.0000000+00:00"}"#
        );
    }

    #[test]
    fn test_pubsub_payload_has_spread() {
        let tick = MarketTick::new("AAPL", 100.0, 100.5, noon());
        let payload = decode(&encode(&tick, true).unwrap()).unwrap();

        assert_eq!(payload.spread, Some(0.5));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let tick = MarketTick::new("GCZ5", 3573.7, 3573.8, noon());
        assert_eq!(encode(&tick, true).unwrap(), encode(&tick, true).unwrap());
        assert_eq!(encode(&tick, false).unwrap(), encode(&tick, false).unwrap());
    }

    #[test]
    fn test_spread_is_symmetric() {
        let pairs = [(100.0, 100.5), (3573.7, 3573.8), (0.0, 12.25), (7.0, 7.0), (1e-9, 2e9)];
        for (bid, ask) in pairs {
            assert_eq!(spread(bid, ask), spread(ask, bid));
            assert!(spread(bid, ask) >= 0.0);
        }
    }

    #[test]
    fn test_spread_propagates_nan() {
        assert!(spread(f64::NAN, 1.0).is_nan());
    }

    #[test]
    fn test_round_trip_recovers_tick() {
        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        let time = est
            .with_ymd_and_hms(2025, 9, 2, 11, 12, 33)
            .unwrap()
            .with_nanosecond(142_811_800)
            .unwrap();
        let tick = MarketTick::new("GCZ5", 3573.7, 3573.8, time);

        let payload = decode(&encode(&tick, false).unwrap()).unwrap();

        assert_eq!(payload.local_symbol, tick.symbol);
        assert_eq!(payload.bidprice, tick.bid_price);
        assert_eq!(payload.askprice, tick.ask_price);
        assert_eq!(payload.spread, None);
        assert_eq!(payload.time, "2025-09-02T11:12:33.1428118-05:00");
        assert_eq!(payload.timestamp().unwrap(), tick.timestamp);
    }

    #[test]
    fn test_timestamp_truncates_below_100ns() {
        let time = noon().with_nanosecond(123_456_789).unwrap().fixed_offset();
        assert_eq!(format_timestamp(&time), "2024-01-01T12:00:00.1234567+00:00");
    }

    #[test]
    fn test_crossed_prices_pass_through() {
        let tick = MarketTick::new("AAPL", 101.0, 100.0, noon());
        let payload = decode(&encode(&tick, true).unwrap()).unwrap();

        assert_eq!(payload.bidprice, 101.0);
        assert_eq!(payload.askprice, 100.0);
        assert_eq!(payload.spread, Some(1.0));
    }

    #[test]
    fn test_non_finite_values_encode_as_strings() {
        let tick = MarketTick::new("AAPL", f64::NAN, f64::INFINITY, noon());
        let text = String::from_utf8(encode(&tick, true).unwrap()).unwrap();

        assert_eq!(
            text,
            r#"{"local_symbol":"AAPL","bidprice":"NaN","askprice":"Infinity","spread":"NaN","time":"2024-01-01T12:00:00.0000000+00:00"}"#
        );
    }

    #[test]
    fn test_non_finite_values_survive_decode() {
        let tick = MarketTick::new("AAPL", f64::NEG_INFINITY, f64::INFINITY, noon());
        let payload = decode(&encode(&tick, true).unwrap()).unwrap();

        assert_eq!(payload.bidprice, f64::NEG_INFINITY);
        assert_eq!(payload.askprice, f64::INFINITY);
        assert_eq!(payload.spread, Some(f64::INFINITY));

        let nan = MarketTick::new("AAPL", f64::NAN, 100.0, noon());
        let payload = decode(&encode(&nan, true).unwrap()).unwrap();
        assert!(payload.bidprice.is_nan());
        assert_eq!(payload.askprice, 100.0);
        assert!(payload.spread.unwrap().is_nan());
    }

    #[test]
    fn test_decode_reads_null_price_as_nan() {
        let payload = decode(
            br#"{"local_symbol":"AAPL","bidprice":null,"askprice":1.5,"time":"2024-01-01T12:00:00.0000000+00:00"}"#,
        )
        .unwrap();
        assert!(payload.bidprice.is_nan());
        assert_eq!(payload.spread, None);
    }

    #[test]
    fn test_decode_rejects_unknown_price_text() {
        let result = decode(
            br#"{"local_symbol":"AAPL","bidprice":"cheap","askprice":1.5,"time":"2024-01-01T12:00:00.0000000+00:00"}"#,
        );
        assert!(matches!(result, Err(PublishError::Encoding(_))));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode(b"not json"),
            Err(crate::transport::PublishError::Encoding(_))
        ));
    }
}
