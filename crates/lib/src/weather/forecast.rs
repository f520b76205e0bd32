//! JMA forecast client.
//!
//! The forecast document is an array of reports, each with a list of time series;
//! today's forecast for the primary sub-area sits at `[0].timeSeries[0].areas[0]`.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::WeatherConfig;

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("forecast request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("forecast api error: {0}")]
    Api(String),
    #[error("invalid forecast json: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unexpected forecast document: {0}")]
    Shape(String),
}

/// The two fields a reply needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayForecast {
    pub area: String,
    pub weather: String,
}

/// Source of today's forecast for an area code.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn today(&self, area_code: &str) -> Result<TodayForecast, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct ForecastReport {
    #[serde(rename = "timeSeries", default)]
    time_series: Vec<TimeSeries>,
}

#[derive(Debug, Deserialize)]
struct TimeSeries {
    #[serde(default)]
    areas: Vec<AreaForecast>,
}

#[derive(Debug, Deserialize)]
struct AreaForecast {
    area: Area,
    #[serde(default)]
    weathers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Area {
    name: String,
}

/// Substitute the area code into a URL template containing `{code}`.
pub fn forecast_url(template: &str, area_code: &str) -> String {
    template.replace("{code}", area_code)
}

/// Decode a forecast document and pull out area name and first weather text.
pub fn parse_today(body: &[u8]) -> Result<TodayForecast, WeatherError> {
    let reports: Vec<ForecastReport> = serde_json::from_slice(body)?;
    let area = reports
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::Shape("no reports".to_string()))?
        .time_series
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::Shape("no time series".to_string()))?
        .areas
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::Shape("no areas".to_string()))?;
    let weather = area
        .weathers
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::Shape("no weather text".to_string()))?;
    Ok(TodayForecast {
        area: area.area.name,
        weather,
    })
}

/// Client for the JMA forecast JSON endpoint.
#[derive(Clone)]
pub struct JmaClient {
    url_template: String,
    client: reqwest::Client,
}

impl JmaClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            url_template: config.forecast_url.clone(),
            client,
        })
    }
}

#[async_trait]
impl ForecastSource for JmaClient {
    async fn today(&self, area_code: &str) -> Result<TodayForecast, WeatherError> {
        let url = forecast_url(&self.url_template, area_code);
        log::debug!("weather: GET {}", url);
        let res = self.client.get(&url).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(WeatherError::Api(format!("{} {}", status, body)));
        }
        let body = res.bytes().await?;
        parse_today(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "publishingOffice": "気象庁",
            "reportDatetime": "2024-05-01T11:00:00+09:00",
            "timeSeries": [
                {
                    "timeDefines": ["2024-05-01T11:00:00+09:00"],
                    "areas": [
                        {
                            "area": {"name": "東京地方", "code": "130010"},
                            "weatherCodes": ["101"],
                            "weathers": ["晴れ　時々　くもり", "くもり"],
                            "winds": ["南の風"]
                        },
                        {
                            "area": {"name": "伊豆諸島北部", "code": "130020"},
                            "weathers": ["くもり"]
                        }
                    ]
                },
                {"timeDefines": [], "areas": []}
            ]
        },
        {"timeSeries": []}
    ]"#;

    #[test]
    fn url_template_substitutes_code() {
        assert_eq!(
            forecast_url(
                "https://www.jma.go.jp/bosai/forecast/data/forecast/{code}.json",
                "130000"
            ),
            "https://www.jma.go.jp/bosai/forecast/data/forecast/130000.json"
        );
    }

    #[test]
    fn reads_first_area_and_weather() {
        let today = parse_today(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            today,
            TodayForecast {
                area: "東京地方".to_string(),
                weather: "晴れ　時々　くもり".to_string(),
            }
        );
    }

    #[test]
    fn object_instead_of_array_is_decode_error() {
        let err = parse_today(br#"{"timeSeries": []}"#).unwrap_err();
        assert!(matches!(err, WeatherError::Decode(_)));
    }

    #[test]
    fn empty_pieces_are_shape_errors() {
        for (body, what) in [
            ("[]", "no reports"),
            (r#"[{"timeSeries": []}]"#, "no time series"),
            (r#"[{"timeSeries": [{"areas": []}]}]"#, "no areas"),
            (
                r#"[{"timeSeries": [{"areas": [{"area": {"name": "x"}}]}]}]"#,
                "no weather text",
            ),
        ] {
            match parse_today(body.as_bytes()) {
                Err(WeatherError::Shape(msg)) => assert_eq!(msg, what),
                other => panic!("{}: expected shape error, got {:?}", body, other),
            }
        }
    }
}
