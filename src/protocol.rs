use serde_json::{Map, Value, json};

use crate::types::{DeumOverride, DeumParams, Forcing, Season, SlotValue, Weekday};

pub const OAUTH_URL: &str = "https://s5a.eu/oauth/token";
pub const API_BASE_URL: &str = "https://api.s5a.eu/api/v1/stations";

// The upstream only accepts the credentials of its own mobile client.
pub const CLIENT_ID: &str = "6";
pub const CLIENT_SECRET: &str = "1H68sl94ep46QtCWNLMelZAiCMcPMRxLpnKmEduS";
pub const USER_AGENT: &str = "Alterego/1 CFNetwork/3860.300.31 Darwin/25.2.0";

pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// Assumed when the token endpoint omits expires_in.
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 31_536_000;

// Upstream rate budget the polling cadence is sized against.
#[allow(dead_code)]
pub const RATE_LIMIT_REQUESTS: u32 = 6000;
#[allow(dead_code)]
pub const RATE_LIMIT_WINDOW_SECS: u64 = 3600;

pub fn auth_form<'a>(username: &'a str, password: &'a str) -> [(&'static str, &'a str); 5] {
    [
        ("grant_type", "password"),
        ("client_id", CLIENT_ID),
        ("client_secret", CLIENT_SECRET),
        ("username", username),
        ("password", password),
    ]
}

pub fn zones_path(station_id: &str) -> String {
    format!("{station_id}/zones")
}

pub fn zone_path(station_id: &str, zone_id: &str) -> String {
    format!("{station_id}/zones/{zone_id}")
}

pub fn global_path(station_id: &str) -> String {
    format!("{station_id}/global")
}

pub fn deums_path(station_id: &str) -> String {
    format!("{station_id}/deums")
}

pub fn deum_path(station_id: &str, deum_id: &str) -> String {
    format!("{station_id}/deums/{deum_id}")
}

pub fn timers_path(station_id: &str) -> String {
    format!("{station_id}/timers")
}

pub fn timer_path(station_id: &str, timer_id: &str) -> String {
    format!("{station_id}/timers/{timer_id}")
}

pub fn slot_key(day: Weekday, slot: usize) -> String {
    format!("S_{}_{slot}", day.as_api_str())
}

pub fn set_forcing_data(forcing: Forcing) -> Value {
    json!({ "forcing": forcing.as_api_str() })
}

pub fn set_season_data(season: Season) -> Value {
    json!({ "global_set_season": season.as_api_str() })
}

pub fn set_deum_override_data(mode: DeumOverride) -> Value {
    json!({ "user_override": mode.as_api_str() })
}

/// Boost writes must resend the vent speeds or the controller resets them.
pub fn set_deum_boost_data(minutes: i64, params: &DeumParams) -> Value {
    json!({
        "boost_timer": minutes,
        "vent_speed_boost": params.vent_speed_boost(),
        "vent_speed_comfort": params.vent_speed_comfort(),
        "vent_speed_economy": params.vent_speed_economy(),
    })
}

pub fn set_humidity_setpoint_data(value: f64) -> Value {
    json!({ "setpoint_humidity": value })
}

/// Which params field a temperature write lands in. AUTO and OFF write the
/// comfort pair, matching the upstream mobile client.
pub fn setpoint_key(forcing: Forcing, season: Season) -> &'static str {
    match (forcing, season) {
        (Forcing::Economy, Season::Summer) => "setpoint_economy_summer",
        (Forcing::Economy, Season::Winter) => "setpoint_economy_winter",
        (_, Season::Summer) => "setpoint_comfort_summer",
        (_, Season::Winter) => "setpoint_comfort_winter",
    }
}

pub fn set_zone_setpoint_data(forcing: Forcing, season: Season, value: f64) -> Value {
    let mut map = Map::new();
    map.insert(setpoint_key(forcing, season).to_string(), json!(value));
    Value::Object(map)
}

pub fn set_timer_slot_data(day: Weekday, slot: usize, value: &SlotValue) -> Value {
    let mut map = Map::new();
    map.insert(slot_key(day, slot), Value::String(value.to_api_string()));
    Value::Object(map)
}
