use serde::{
    Deserialize, Deserializer, Serialize,
    de::{IgnoredAny, MapAccess, Visitor},
};
use std::fmt;

/// City name, zip code and current weather as exchanged with both upstream
/// services and returned to callers.
///
/// Field names are matched case-insensitively when reading, and a `null`
/// value reads as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CityWeatherRecord {
    #[serde(rename = "CityName")]
    pub city_name: String,

    #[serde(rename = "ZipCode")]
    pub zip_code: String,

    #[serde(rename = "Weather")]
    pub current_weather: String,
}

impl CityWeatherRecord {
    /// Take the weather reported by the weather service, keeping everything else.
    pub fn merge_weather(mut self, weather: CityWeatherRecord) -> Self {
        self.current_weather = weather.current_weather;
        self
    }
}

impl<'de> Deserialize<'de> for CityWeatherRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = CityWeatherRecord;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with CityName, ZipCode and Weather")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut record = CityWeatherRecord::default();

        while let Some(key) = map.next_key::<String>()? {
            let slot = match key.to_ascii_lowercase().as_str() {
                "cityname" => &mut record.city_name,
                "zipcode" => &mut record.zip_code,
                "weather" => &mut record.current_weather,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                    continue;
                }
            };
            *slot = map.next_value::<Option<String>>()?.unwrap_or_default();
        }

        Ok(record)
    }
}
