//! Weather lookup: region names to JMA area codes, forecast fetch, and reply text.

mod forecast;
mod regions;

pub use forecast::{
    forecast_url, parse_today, ForecastSource, JmaClient, TodayForecast, WeatherError,
};
pub use regions::{resolve_region, Region, RegionTable, DEFAULT_REGION, TODAY_WEATHER_PHRASE};

/// Reply for a successful lookup.
pub fn format_forecast(forecast: &TodayForecast) -> String {
    format!(
        "{} の今日の天気は「{}」です。",
        forecast.area, forecast.weather
    )
}

/// Reply when the text names no supported region.
pub fn region_prompt(table: &RegionTable) -> String {
    format!(
        "地域名を送ってください。（例：{}）",
        table.examples().join("、")
    )
}

/// Reply when the forecast could not be fetched or read.
pub fn format_failure(err: &WeatherError) -> String {
    format!("天気情報の取得に失敗しました：{}", err)
}
