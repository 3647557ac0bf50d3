use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_PERIOD: u32 = 12 * 60;

// informed by http://projects.rajivshah.com/sportvu/PBP_NBA_SportVu.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum EventMessageType {
    Make,
    Miss,
    FreeThrow,
    Rebound,
    Turnover,
    PersonalFoul,
    Violation,
    Substitution,
    Timeout,
    Jumpball,
    Other(u16),
}

impl From<u16> for EventMessageType {
    fn from(code: u16) -> Self {
        match code {
            1 => Self::Make,
            2 => Self::Miss,
            3 => Self::FreeThrow,
            4 => Self::Rebound,
            5 => Self::Turnover,
            6 => Self::PersonalFoul,
            7 => Self::Violation,
            8 => Self::Substitution,
            9 => Self::Timeout,
            10 => Self::Jumpball,
            other => Self::Other(other),
        }
    }
}

impl From<EventMessageType> for u16 {
    fn from(kind: EventMessageType) -> Self {
        match kind {
            EventMessageType::Make => 1,
            EventMessageType::Miss => 2,
            EventMessageType::FreeThrow => 3,
            EventMessageType::Rebound => 4,
            EventMessageType::Turnover => 5,
            EventMessageType::PersonalFoul => 6,
            EventMessageType::Violation => 7,
            EventMessageType::Substitution => 8,
            EventMessageType::Timeout => 9,
            EventMessageType::Jumpball => 10,
            EventMessageType::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPlayEvent {
    #[serde(rename = "gameId", default)]
    pub game_id: String,
    pub eventnum: u32,
    pub eventmsgtype: EventMessageType,
    #[serde(default)]
    pub eventmsgactiontype: u16,
    pub period: u8,
    #[serde(default)]
    pub wctimestring: String,
    pub pctimestring: String,
    #[serde(default)]
    pub homedescription: Option<String>,
    #[serde(default)]
    pub neutraldescription: Option<String>,
    #[serde(default)]
    pub visitordescription: Option<String>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub scoremargin: Option<String>,
}

impl RawPlayEvent {
    pub fn description(&self) -> Option<&str> {
        [
            &self.neutraldescription,
            &self.homedescription,
            &self.visitordescription,
        ]
        .into_iter()
        .filter_map(|d| d.as_deref())
        .find(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPlayByPlay {
    #[serde(rename = "playByPlay")]
    pub play_by_play: Vec<RawPlayEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    #[serde(rename = "eventnum")]
    pub event_num: u32,
    pub period: u8,
    pub actual_time: Option<i64>,
    pub period_seconds_remaining: u32,
    pub seconds_into_game: u32,
    pub away_score: u32,
    pub home_score: u32,
    #[serde(rename = "eventDescription")]
    pub description: Option<String>,
    pub event_type: EventMessageType,
    #[serde(rename = "eventActionType")]
    pub action_type: u16,
}

/// Structured view of `events[index]`, with the score carried back from the
/// most recent scoring event at or before `index`.
///
/// Panics if `index` is out of range.
pub fn normalize_event(game_date: &str, events: &[RawPlayEvent], index: usize) -> NormalizedEvent {
    let event = &events[index];

    let period_seconds_remaining = match parse_period_clock(&event.pctimestring) {
        Some(secs) => secs,
        None => {
            log::debug!(
                "event {}: unreadable period clock {:?}",
                event.eventnum,
                event.pctimestring
            );
            0
        }
    };
    let seconds_into_game = u32::from(event.period.saturating_sub(1)) * SECONDS_PER_PERIOD
        + (SECONDS_PER_PERIOD - period_seconds_remaining);

    let (away_score, home_score) = events[..=index]
        .iter()
        .rev()
        .filter_map(|e| e.score.as_deref())
        .find_map(parse_score)
        .unwrap_or((0, 0));

    NormalizedEvent {
        event_num: event.eventnum,
        period: event.period,
        actual_time: wall_clock_millis(game_date, &event.wctimestring),
        period_seconds_remaining,
        seconds_into_game,
        away_score,
        home_score,
        description: event.description().map(str::to_string),
        event_type: event.eventmsgtype,
        action_type: event.eventmsgactiontype,
    }
}

/// `M:SS` remaining in the period, as seconds within `[0, 720]`.
pub fn parse_period_clock(raw: &str) -> Option<u32> {
    let (minutes, seconds) = raw.trim().split_once(':')?;
    let minutes = minutes.trim().parse::<u32>().ok()?;
    let seconds = seconds.trim().parse::<f64>().ok()?;
    if !(0.0..60.0).contains(&seconds) {
        return None;
    }
    Some(
        minutes
            .checked_mul(60)?
            .checked_add(seconds as u32)?
            .min(SECONDS_PER_PERIOD),
    )
}

pub fn parse_score(raw: &str) -> Option<(u32, u32)> {
    let (away, home) = raw.split_once('-')?;
    let away = away.trim().parse::<u32>().ok()?;
    let home = home.trim().parse::<u32>().ok()?;
    Some((away, home))
}

pub fn wall_clock_millis(game_date: &str, time_of_day: &str) -> Option<i64> {
    let date = game_date.get(..10)?;
    let stamp = format!("{date} {}", time_of_day.trim());
    NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %I:%M %p")
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Indices of the contiguous run of events around `index` logged at the same
/// period clock. The provider records simultaneous events (e.g. a make and
/// the shooting foul on it) as separate rows sharing a clock reading.
pub fn matching_plays(events: &[RawPlayEvent], index: usize) -> Vec<usize> {
    let Some(play) = events.get(index) else {
        return Vec::new();
    };
    let same_tick = |other: &RawPlayEvent| other.pctimestring == play.pctimestring;

    let mut matching = Vec::new();
    for i in (0..index).rev() {
        if !same_tick(&events[i]) {
            break;
        }
        matching.push(i);
    }
    for (i, other) in events.iter().enumerate().skip(index + 1) {
        if !same_tick(other) {
            break;
        }
        matching.push(i);
    }
    matching
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn raw_event(eventnum: u32, clock: &str, score: Option<&str>) -> RawPlayEvent {
        RawPlayEvent {
            game_id: "0021700001".to_string(),
            eventnum,
            eventmsgtype: EventMessageType::Rebound,
            eventmsgactiontype: 0,
            period: 1,
            wctimestring: "8:14 PM".to_string(),
            pctimestring: clock.to_string(),
            homedescription: None,
            neutraldescription: None,
            visitordescription: None,
            score: score.map(str::to_string),
            scoremargin: None,
        }
    }

    #[test]
    fn message_type_codes_round_trip() {
        let raw = r#"{"eventnum":7,"eventmsgtype":6,"eventmsgactiontype":2,"period":1,
            "wctimestring":"8:14 PM","pctimestring":"11:00","homedescription":null,
            "neutraldescription":null,"visitordescription":"Green S.FOUL (P1.T1)",
            "score":null,"scoremargin":null}"#;
        let event: RawPlayEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.eventmsgtype, EventMessageType::PersonalFoul);
        assert_eq!(event.description(), Some("Green S.FOUL (P1.T1)"));
        assert_eq!(EventMessageType::from(18), EventMessageType::Other(18));
        assert_eq!(u16::from(EventMessageType::Jumpball), 10);
    }

    #[test]
    fn clock_and_score_parsing() {
        assert_eq!(parse_period_clock("12:00"), Some(720));
        assert_eq!(parse_period_clock("11:42"), Some(702));
        assert_eq!(parse_period_clock("0:00"), Some(0));
        assert_eq!(parse_period_clock("0:04.3"), Some(4));
        assert_eq!(parse_period_clock("bad"), None);
        assert_eq!(parse_period_clock("99999999:00"), None);
        assert_eq!(parse_score("10 - 12"), Some((10, 12)));
        assert_eq!(parse_score("10-12"), Some((10, 12)));
        assert_eq!(parse_score("TIE"), None);
    }

    #[test]
    fn wall_clock_accepts_single_digit_hour() {
        let a = wall_clock_millis("2017-10-17", "8:14 PM").unwrap();
        let b = wall_clock_millis("2017-10-17T00:00:00", "8:15 PM").unwrap();
        assert_eq!(b - a, 60_000);
        assert!(wall_clock_millis("2017-10-17", "").is_none());
    }

    #[test]
    fn score_is_backfilled_from_earlier_events() {
        let events = vec![
            raw_event(1, "11:40", Some("10-12")),
            raw_event(2, "11:20", None),
            raw_event(3, "11:00", None),
        ];
        let e = normalize_event("2017-10-17", &events, 2);
        assert_eq!((e.away_score, e.home_score), (10, 12));

        let first_only = vec![raw_event(1, "12:00", None)];
        let e = normalize_event("2017-10-17", &first_only, 0);
        assert_eq!((e.away_score, e.home_score), (0, 0));
    }

    #[test]
    fn game_seconds_accumulate_across_periods() {
        let mut event = raw_event(1, "5:00", None);
        event.period = 3;
        let e = normalize_event("2017-10-17", &[event], 0);
        assert_eq!(e.period_seconds_remaining, 300);
        assert_eq!(e.seconds_into_game, 2 * 720 + 420);
    }

    #[test]
    fn matching_plays_is_a_contiguous_run() {
        let events = vec![
            raw_event(1, "6:00", None),
            raw_event(2, "5:30", None),
            raw_event(3, "5:14", None),
            raw_event(4, "5:14", None),
            raw_event(5, "5:14", None),
            raw_event(6, "5:02", None),
        ];
        assert_eq!(matching_plays(&events, 3), vec![2, 4]);
        assert_eq!(matching_plays(&events, 2), vec![3, 4]);
        assert_eq!(matching_plays(&events, 0), Vec::<usize>::new());
        assert_eq!(matching_plays(&events, 99), Vec::<usize>::new());
    }
}
