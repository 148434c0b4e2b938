use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CountryCount {
    pub country: String,
    pub clicks: i64,
}

#[derive(Debug, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub clicks: i64,
}

#[derive(Debug, Serialize)]
pub struct UrlStatisticsResponse {
    pub short_code: String,
    pub total_clicks: i64,
    pub clicks_today: i64,
    pub clicks_this_week: i64,
    pub clicks_this_month: i64,
    pub first_click_at: Option<DateTime<Utc>>,
    pub last_click_at: Option<DateTime<Utc>>,
    pub top_countries: Vec<CountryCount>,
    pub daily_timeline: Vec<DailyCount>,
}

#[derive(Debug, Serialize)]
pub struct PlatformStatisticsResponse {
    pub total_urls: i64,
    pub total_clicks: i64,
    pub clicks_today: i64,
}
