//! 刻度字段的反序列化
//!
//! 刻度可能超出 32 位范围。大整数序列化器常把它写成字符串，因此同时接受
//! JSON 整数和内容为整数的字符串；浮点数、越界值等一律拒绝。输出始终为 JSON 整数。

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum TickRepr {
    Int(i64),
    Text(String),
}

fn parse<E: serde::de::Error>(repr: TickRepr) -> Result<i64, E> {
    match repr {
        TickRepr::Int(value) => Ok(value),
        TickRepr::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| E::custom(format!("invalid tick value: {:?}", text))),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = TickRepr::deserialize(deserializer)
        .map_err(|_| D::Error::custom("tick must be an integer or an integer string"))?;
    parse(repr)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "super::deserialize")]
        tick: i64,
    }

    fn probe(json: &str) -> Result<i64, serde_json::Error> {
        serde_json::from_str::<Probe>(json).map(|p| p.tick)
    }

    #[test]
    fn test_integer() {
        assert_eq!(probe(r#"{"tick": 10000}"#).unwrap(), 10_000);
        assert_eq!(probe(r#"{"tick": -3}"#).unwrap(), -3);
    }

    #[test]
    fn test_big_integer_string() {
        assert_eq!(
            probe(r#"{"tick": "9007199254740993"}"#).unwrap(),
            9_007_199_254_740_993
        );
    }

    #[test]
    fn test_rejects_non_integers() {
        assert!(probe(r#"{"tick": 1.5}"#).is_err());
        assert!(probe(r#"{"tick": "soon"}"#).is_err());
        assert!(probe(r#"{"tick": null}"#).is_err());
        assert!(probe(r#"{"tick": 18446744073709551615}"#).is_err());
    }
}
