//! Per-type JSON decoding.
//!
//! A response type opts in by implementing [`SelfDecodable`], which carries
//! the [`JsonDecoder`] used for every response of that type.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// How JSON object keys are matched against field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyDecodingStrategy {
    /// Keys are used exactly as they appear.
    #[default]
    UseDefaultKeys,
    /// `snake_case` keys are rewritten to `camelCase` before decoding.
    ///
    /// Leading and trailing underscores are kept, the first word is left
    /// as-is and every following word is capitalized: `first_name` becomes
    /// `firstName`, `_private_key_` becomes `_privateKey_`.
    ConvertFromSnakeCase,
}

/// A reusable JSON decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonDecoder {
    key_strategy: KeyDecodingStrategy,
}

impl JsonDecoder {
    /// Decodes keys exactly as they appear.
    pub const DEFAULT: JsonDecoder = JsonDecoder::new(KeyDecodingStrategy::UseDefaultKeys);

    /// Converts `snake_case` keys to `camelCase`.
    pub const SNAKE_CASE: JsonDecoder =
        JsonDecoder::new(KeyDecodingStrategy::ConvertFromSnakeCase);

    /// Creates a decoder with the given key strategy.
    pub const fn new(key_strategy: KeyDecodingStrategy) -> Self {
        Self { key_strategy }
    }

    /// The key strategy in use.
    pub fn key_strategy(&self) -> KeyDecodingStrategy {
        self.key_strategy
    }

    /// Decodes `bytes` into `T`.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error for malformed JSON, missing
    /// fields or type mismatches.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, serde_json::Error> {
        match self.key_strategy {
            KeyDecodingStrategy::UseDefaultKeys => serde_json::from_slice(bytes),
            KeyDecodingStrategy::ConvertFromSnakeCase => {
                let value: Value = serde_json::from_slice(bytes)?;
                serde_json::from_value(convert_keys(value))
            }
        }
    }
}

/// A response type that knows how to decode itself.
///
/// The default decoder matches keys exactly. Override [`SelfDecodable::DECODER`]
/// to change the key strategy for a type.
///
/// # Examples
///
/// ```
/// use courier::{JsonDecoder, SelfDecodable};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Person {
///     first_name: String,
///     last_name: String,
/// }
///
/// impl SelfDecodable for Person {
///     const DECODER: JsonDecoder = JsonDecoder::SNAKE_CASE;
/// }
///
/// let person: Person = Person::DECODER
///     .decode(br#"{"first_name":"Dushant","last_name":"Singh"}"#)
///     .unwrap();
/// assert_eq!(person.first_name, "Dushant");
/// ```
pub trait SelfDecodable: DeserializeOwned {
    /// The decoder used for every response of this type.
    const DECODER: JsonDecoder = JsonDecoder::DEFAULT;
}

impl SelfDecodable for Value {}

impl<T: SelfDecodable> SelfDecodable for Vec<T> {
    const DECODER: JsonDecoder = T::DECODER;
}

impl<T: SelfDecodable> SelfDecodable for Option<T> {
    const DECODER: JsonDecoder = T::DECODER;
}

fn convert_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let key = match convert_from_snake_case(&key) {
                        Cow::Borrowed(_) => key,
                        Cow::Owned(converted) => converted,
                    };
                    (key, convert_keys(value))
                })
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(convert_keys).collect()),
        other => other,
    }
}

fn convert_from_snake_case(key: &str) -> Cow<'_, str> {
    let without_leading = key.trim_start_matches('_');
    if without_leading.is_empty() {
        return Cow::Borrowed(key);
    }
    let core = without_leading.trim_end_matches('_');
    if !core.contains('_') {
        return Cow::Borrowed(key);
    }

    let leading = &key[..key.len() - without_leading.len()];
    let trailing = &without_leading[core.len()..];

    let mut converted = String::with_capacity(key.len());
    converted.push_str(leading);

    let mut words = core.split('_').filter(|word| !word.is_empty());
    if let Some(first) = words.next() {
        converted.push_str(first);
    }
    for word in words {
        let mut chars = word.chars();
        if let Some(initial) = chars.next() {
            converted.extend(initial.to_uppercase());
            converted.push_str(&chars.as_str().to_lowercase());
        }
    }

    converted.push_str(trailing);
    Cow::Owned(converted)
}
