use crate::db::HeatmapSettings;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

const FALLBACK_LEVEL_COLOR: &str = "#161B22";

#[derive(Debug, Error)]
pub enum ContributionsError {
    #[error("contributions request failed: {0}")]
    Request(String),
    #[error("contributions API returned status {0}")]
    Status(u16),
    #[error("invalid contributions response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub level: u8,
}

#[derive(Debug, Deserialize)]
struct ContributionsResponse {
    #[serde(default)]
    contributions: Vec<ContributionDay>,
}

/// A column of seven slots; `None` pads days outside the fetched range.
pub type Week = [Option<ContributionDay>; 7];

pub fn contributions_url(settings: &HeatmapSettings, username: &str) -> String {
    format!(
        "{}/{}?y=last",
        settings.api_base.trim_end_matches('/'),
        urlencoding::encode(username.trim())
    )
}

pub async fn fetch_contributions(
    settings: &HeatmapSettings,
    username: &str,
) -> Result<Vec<ContributionDay>, ContributionsError> {
    let url = contributions_url(settings, username);
    let response = super::HTTP_CLIENT
        .get(&url)
        .send()
        .await
        .map_err(|e| ContributionsError::Request(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ContributionsError::Status(response.status().as_u16()));
    }

    let body: ContributionsResponse = response
        .json()
        .await
        .map_err(|e| ContributionsError::Decode(e.to_string()))?;
    Ok(body.contributions)
}

pub fn week_start_day(week_start: u8) -> Weekday {
    match week_start {
        0 => Weekday::Sun,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        _ => Weekday::Mon,
    }
}

/// Arrange days into week columns, the first row being `week_start`.
/// Dates missing inside the range are left empty.
pub fn layout_weeks(days: &[ContributionDay], week_start: Weekday) -> Vec<Week> {
    let by_date: HashMap<NaiveDate, &ContributionDay> =
        days.iter().map(|day| (day.date, day)).collect();
    let (Some(first), Some(last)) = (by_date.keys().min().copied(), by_date.keys().max().copied())
    else {
        return Vec::new();
    };

    let lead = (first.weekday().num_days_from_monday() + 7 - week_start.num_days_from_monday()) % 7;
    let mut cursor = first - Duration::days(lead as i64);
    let mut weeks = Vec::new();

    while cursor <= last {
        let mut week: Week = Default::default();
        for slot in week.iter_mut() {
            if cursor >= first && cursor <= last {
                *slot = by_date.get(&cursor).map(|day| (*day).clone());
            }
            cursor += Duration::days(1);
        }
        weeks.push(week);
    }

    weeks
}

pub fn level_color(theme: &[String], level: u8) -> &str {
    if theme.is_empty() {
        return FALLBACK_LEVEL_COLOR;
    }
    let index = (level as usize).min(theme.len() - 1);
    theme[index].as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str, count: u32, level: u8) -> ContributionDay {
        ContributionDay {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            count,
            level,
        }
    }

    #[test]
    fn weeks_start_on_monday_and_pad_the_edges() {
        // 2024-01-03 is a Wednesday, 2024-01-09 a Tuesday.
        let days: Vec<_> = (3..=9)
            .map(|d| day(&format!("2024-01-{d:02}"), d, (d % 5) as u8))
            .collect();

        let weeks = layout_weeks(&days, Weekday::Mon);

        assert_eq!(weeks.len(), 2);
        assert!(weeks[0][0].is_none());
        assert!(weeks[0][1].is_none());
        assert_eq!(weeks[0][2].as_ref().unwrap().count, 3);
        assert_eq!(weeks[0][6].as_ref().unwrap().count, 7);
        assert_eq!(weeks[1][0].as_ref().unwrap().count, 8);
        assert_eq!(weeks[1][1].as_ref().unwrap().count, 9);
        assert!(weeks[1][2..].iter().all(Option::is_none));
    }

    #[test]
    fn sunday_start_shifts_rows() {
        let days = vec![day("2024-01-07", 1, 1), day("2024-01-08", 2, 2)];
        let weeks = layout_weeks(&days, Weekday::Sun);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0][0].as_ref().unwrap().count, 1);
        assert_eq!(weeks[0][1].as_ref().unwrap().count, 2);
    }

    #[test]
    fn unsorted_input_and_gaps() {
        let days = vec![day("2024-01-10", 4, 2), day("2024-01-08", 1, 1)];
        let weeks = layout_weeks(&days, Weekday::Mon);
        assert_eq!(weeks.len(), 1);
        assert!(weeks[0][1].is_none());
        assert_eq!(weeks[0][2].as_ref().unwrap().count, 4);
        assert!(layout_weeks(&[], Weekday::Mon).is_empty());
    }

    #[test]
    fn level_colors_clamp_to_theme() {
        let theme = HeatmapSettings::default().theme;
        assert_eq!(level_color(&theme, 0), "#161B22");
        assert_eq!(level_color(&theme, 4), "#39d353");
        assert_eq!(level_color(&theme, 9), "#39d353");
        assert_eq!(level_color(&[], 3), "#161B22");
    }

    #[test]
    fn url_and_payload_shape() {
        let settings = HeatmapSettings::default();
        assert_eq!(
            contributions_url(&settings, "octo cat"),
            "https://github-contributions-api.jogruber.de/v4/octo%20cat?y=last"
        );

        let parsed: ContributionsResponse = serde_json::from_str(
            r#"{"total":{"lastYear":5},"contributions":[{"date":"2024-02-01","count":5,"level":2}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.contributions, vec![day("2024-02-01", 5, 2)]);
    }

    #[test]
    fn week_start_mapping() {
        assert_eq!(week_start_day(0), Weekday::Sun);
        assert_eq!(week_start_day(1), Weekday::Mon);
        assert_eq!(week_start_day(42), Weekday::Mon);
    }
}
