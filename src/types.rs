use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Zone operating-mode override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Forcing {
    #[default]
    Auto,
    Comfort,
    Economy,
    Off,
}

impl Forcing {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Forcing::Auto => "AUTO",
            Forcing::Comfort => "COMFORT",
            Forcing::Economy => "ECONOMY",
            Forcing::Off => "OFF",
        }
    }

    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "AUTO" => Some(Forcing::Auto),
            "COMFORT" => Some(Forcing::Comfort),
            "ECONOMY" => Some(Forcing::Economy),
            "OFF" => Some(Forcing::Off),
            _ => None,
        }
    }
}

/// Global AC/heating season switch. Selects which setpoint pair is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Season {
    #[default]
    Winter,
    Summer,
}

impl Season {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Season::Winter => "WINTER",
            Season::Summer => "SUMMER",
        }
    }

    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "WINTER" => Some(Season::Winter),
            "SUMMER" => Some(Season::Summer),
            _ => None,
        }
    }
}

/// Dehumidifier speed override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeumOverride {
    #[default]
    Auto,
    Low,
    Medium,
    High,
    Off,
}

impl DeumOverride {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            DeumOverride::Auto => "AUTO",
            DeumOverride::Low => "LOW",
            DeumOverride::Medium => "MEDIUM",
            DeumOverride::High => "HIGH",
            DeumOverride::Off => "OFF",
        }
    }

    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "AUTO" => Some(DeumOverride::Auto),
            "LOW" => Some(DeumOverride::Low),
            "MEDIUM" => Some(DeumOverride::Medium),
            "HIGH" => Some(DeumOverride::High),
            "OFF" => Some(DeumOverride::Off),
            _ => None,
        }
    }
}

/// Mode half of a weekly timer slot value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotMode {
    Comfort,
    Economy,
    Off,
}

impl SlotMode {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            SlotMode::Comfort => "COMFORT",
            SlotMode::Economy => "ECONOMY",
            SlotMode::Off => "OFF",
        }
    }

    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "COMFORT" => Some(SlotMode::Comfort),
            "ECONOMY" => Some(SlotMode::Economy),
            "OFF" => Some(SlotMode::Off),
            _ => None,
        }
    }
}

/// Weekday codes as used in timer slot keys (`S_{day}_{slot}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weekday {
    Mo,
    Tu,
    We,
    Th,
    Fr,
    Sa,
    Su,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mo,
        Weekday::Tu,
        Weekday::We,
        Weekday::Th,
        Weekday::Fr,
        Weekday::Sa,
        Weekday::Su,
    ];

    pub fn as_api_str(&self) -> &'static str {
        match self {
            Weekday::Mo => "MO",
            Weekday::Tu => "TU",
            Weekday::We => "WE",
            Weekday::Th => "TH",
            Weekday::Fr => "FR",
            Weekday::Sa => "SA",
            Weekday::Su => "SU",
        }
    }
}

/// Slots per day in a weekly timer.
pub const TIMER_SLOTS_PER_DAY: usize = 6;

/// Time-of-day half of a timer slot value, wire format `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTime {
    pub hour: u8,
    pub minute: u8,
}

impl SlotTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn parse(s: &str) -> Option<Self> {
        let (h, m) = s.split_once(':')?;
        Self::new(h.parse().ok()?, m.parse().ok()?)
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// One weekly-schedule slot, decoded from `"N/U"` or `"<MODE> <HH:MM>"`.
///
/// A slot can carry a mode without a time (the time half is then treated
/// as unset and written back as `00:00`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotValue {
    Unused,
    Entry {
        mode: SlotMode,
        time: Option<SlotTime>,
    },
}

impl SlotValue {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == "N/U" {
            return SlotValue::Unused;
        }
        let mut parts = raw.split_whitespace();
        match parts.next().and_then(SlotMode::from_api_str) {
            Some(mode) => SlotValue::Entry {
                mode,
                time: parts.next().and_then(SlotTime::parse),
            },
            None => SlotValue::Unused,
        }
    }

    pub fn to_api_string(&self) -> String {
        match self {
            SlotValue::Unused => "N/U".to_string(),
            SlotValue::Entry { mode, time: Some(t) } => format!("{} {t}", mode.as_api_str()),
            SlotValue::Entry { mode, time: None } => format!("{} 00:00", mode.as_api_str()),
        }
    }

    pub fn mode(&self) -> Option<SlotMode> {
        match self {
            SlotValue::Unused => None,
            SlotValue::Entry { mode, .. } => Some(*mode),
        }
    }

    pub fn time(&self) -> Option<SlotTime> {
        match self {
            SlotValue::Unused => None,
            SlotValue::Entry { time, .. } => *time,
        }
    }
}

/// OAuth2 token payload returned by `authenticate`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPayload {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZoneStatus {
    #[serde(default, deserialize_with = "de_loose_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_loose_int")]
    pub enabled: Option<i64>,
    #[serde(default, rename = "type", deserialize_with = "de_loose_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub temperature: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub current_setpoint: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub humidity: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub dewpoint: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub current_mode: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub zone_output: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZoneParams {
    #[serde(default, deserialize_with = "de_loose_string")]
    pub forcing: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub setpoint_comfort_summer: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub setpoint_comfort_winter: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub setpoint_economy_summer: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub setpoint_economy_winter: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub setpoint_humidity: Option<String>,
}

impl ZoneParams {
    pub fn setpoint_comfort(&self, season: Season) -> Option<f64> {
        match season {
            Season::Summer => numeric(&self.setpoint_comfort_summer),
            Season::Winter => numeric(&self.setpoint_comfort_winter),
        }
    }

    pub fn setpoint_economy(&self, season: Season) -> Option<f64> {
        match season {
            Season::Summer => numeric(&self.setpoint_economy_summer),
            Season::Winter => numeric(&self.setpoint_economy_winter),
        }
    }

    pub fn setpoint_humidity(&self) -> Option<f64> {
        numeric(&self.setpoint_humidity)
    }
}

/// One climate-controlled area.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Zone {
    #[serde(default, deserialize_with = "de_loose_id")]
    pub id: String,
    #[serde(default)]
    pub status: ZoneStatus,
    #[serde(default)]
    pub params: ZoneParams,
}

impl Zone {
    pub fn name(&self) -> String {
        match self.status.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d.to_string(),
            _ => format!("Zone {}", self.id),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.status.enabled == Some(1)
    }

    /// The zone reports humidity/dewpoint when its type carries `RH`.
    pub fn is_humidity_capable(&self) -> bool {
        self.status.kind.as_deref().is_some_and(|k| k.contains("RH"))
    }

    /// Measured temperature. `N/A` and `N/C` mean the probe is absent or
    /// not communicating.
    pub fn temperature(&self) -> Option<f64> {
        numeric(&self.status.temperature)
    }

    /// Active setpoint. `0.0` is the upstream sentinel for "no setpoint".
    pub fn setpoint(&self) -> Option<f64> {
        let value = numeric(&self.status.current_setpoint)?;
        (value != 0.0).then_some(value)
    }

    pub fn humidity(&self) -> Option<f64> {
        numeric(&self.status.humidity)
    }

    pub fn dewpoint(&self) -> Option<f64> {
        numeric(&self.status.dewpoint)
    }

    pub fn forcing(&self) -> Forcing {
        self.params
            .forcing
            .as_deref()
            .and_then(Forcing::from_api_str)
            .unwrap_or_default()
    }

    /// Off when forced off or when the zone output is reported off.
    pub fn is_off(&self) -> bool {
        self.forcing() == Forcing::Off || self.status.zone_output.as_deref() == Some("OFF")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalStatus {
    #[serde(default, deserialize_with = "de_loose_string")]
    pub global_status: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub global_season: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub outside_temp: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub last_connection: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalParams {
    #[serde(default, deserialize_with = "de_loose_string")]
    pub global_set_season: Option<String>,
    #[serde(default, deserialize_with = "de_loose_int")]
    pub global_enable: Option<i64>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub global_zset_min_winter: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub global_zset_min_summer: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub global_zset_max_winter: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub global_zset_max_summer: Option<String>,
}

/// Station-wide status and configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalState {
    #[serde(default)]
    pub status: GlobalStatus,
    #[serde(default)]
    pub params: GlobalParams,
}

impl GlobalState {
    /// Season currently reported by the controller.
    pub fn season(&self) -> Season {
        self.status
            .global_season
            .as_deref()
            .and_then(Season::from_api_str)
            .unwrap_or_default()
    }

    /// Season selected in the station configuration.
    pub fn set_season(&self) -> Season {
        self.params
            .global_set_season
            .as_deref()
            .and_then(Season::from_api_str)
            .unwrap_or_default()
    }

    pub fn outside_temperature(&self) -> Option<f64> {
        numeric(&self.status.outside_temp)
    }

    /// Lower zone-setpoint bound for the given season.
    pub fn setpoint_min(&self, season: Season) -> f64 {
        match season {
            Season::Summer => numeric(&self.params.global_zset_min_summer).unwrap_or(15.0),
            Season::Winter => numeric(&self.params.global_zset_min_winter).unwrap_or(10.0),
        }
    }

    /// Upper zone-setpoint bound for the given season.
    pub fn setpoint_max(&self, season: Season) -> f64 {
        match season {
            Season::Summer => numeric(&self.params.global_zset_max_summer).unwrap_or(30.0),
            Season::Winter => numeric(&self.params.global_zset_max_winter).unwrap_or(30.0),
        }
    }
}

/// Wire envelope around the global feed: `{"data": {...}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalEnvelope {
    #[serde(default)]
    pub data: Option<GlobalState>,
}

impl GlobalEnvelope {
    /// The inner state, or an empty record when the envelope is bare or
    /// carries an explicit null.
    pub fn into_state(self) -> GlobalState {
        self.data.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeumStatus {
    #[serde(default, deserialize_with = "de_loose_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_loose_int")]
    pub enabled: Option<i64>,
    #[serde(default, deserialize_with = "de_loose_bool")]
    pub user_visible: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeumParams {
    #[serde(default, deserialize_with = "de_loose_string")]
    pub user_override: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub boost_timer: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub vent_speed_boost: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub vent_speed_comfort: Option<String>,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub vent_speed_economy: Option<String>,
}

impl DeumParams {
    pub fn vent_speed_boost(&self) -> i64 {
        numeric(&self.vent_speed_boost).map(|v| v as i64).unwrap_or(80)
    }

    pub fn vent_speed_comfort(&self) -> i64 {
        numeric(&self.vent_speed_comfort).map(|v| v as i64).unwrap_or(40)
    }

    pub fn vent_speed_economy(&self) -> i64 {
        numeric(&self.vent_speed_economy).map(|v| v as i64).unwrap_or(0)
    }
}

/// One dehumidifier unit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Deum {
    #[serde(default, deserialize_with = "de_loose_id")]
    pub id: String,
    #[serde(default)]
    pub status: DeumStatus,
    #[serde(default)]
    pub params: DeumParams,
}

impl Deum {
    pub fn name(&self) -> String {
        match self.status.description.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => format!("Deum {}", self.id),
        }
    }

    /// Enabled units are also required to be user-visible upstream.
    pub fn is_enabled(&self) -> bool {
        self.status.enabled == Some(1) && self.status.user_visible == Some(true)
    }

    pub fn override_mode(&self) -> DeumOverride {
        self.params
            .user_override
            .as_deref()
            .and_then(DeumOverride::from_api_str)
            .unwrap_or_default()
    }

    /// Remaining boost runtime in minutes.
    pub fn boost_timer(&self) -> Option<f64> {
        numeric(&self.params.boost_timer)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimerStatus {
    #[serde(default, deserialize_with = "de_loose_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_loose_int")]
    pub enabled: Option<i64>,
}

/// Timer params are a flat map of `S_{day}_{slot}` keys; anything else the
/// server sends alongside them is kept but unused.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimerParams {
    #[serde(flatten)]
    pub slots: BTreeMap<String, Value>,
}

/// One weekly schedule object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Timer {
    #[serde(default, deserialize_with = "de_loose_id")]
    pub id: String,
    #[serde(default)]
    pub status: TimerStatus,
    #[serde(default)]
    pub params: TimerParams,
}

impl Timer {
    pub fn name(&self) -> String {
        match self.status.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d.to_string(),
            _ => format!("Timer {}", self.id),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.status.enabled == Some(1)
    }

    /// Decoded slot for a day and slot index. Missing keys read as unused.
    pub fn slot(&self, day: Weekday, index: usize) -> SlotValue {
        self.params
            .slots
            .get(&crate::protocol::slot_key(day, index))
            .and_then(Value::as_str)
            .map(SlotValue::parse)
            .unwrap_or(SlotValue::Unused)
    }
}

/// One station summary from the account-level listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Station {
    #[serde(default, deserialize_with = "de_loose_id")]
    pub statid: String,
    #[serde(default, deserialize_with = "de_loose_string")]
    pub description: Option<String>,
}

/// Last merged state of one station's four feeds. All four fields are
/// always present; a feed that has never loaded is simply empty.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub zones: Vec<Zone>,
    pub global: GlobalState,
    pub deums: Vec<Deum>,
    pub timers: Vec<Timer>,
}

impl Snapshot {
    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn deum(&self, id: &str) -> Option<&Deum> {
        self.deums.iter().find(|d| d.id == id)
    }

    pub fn timer(&self, id: &str) -> Option<&Timer> {
        self.timers.iter().find(|t| t.id == id)
    }

    pub fn enabled_zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter().filter(|z| z.is_enabled())
    }

    /// Enabled, user-visible deums. The feed can repeat a unit; only the
    /// first record per id is yielded.
    pub fn enabled_deums(&self) -> impl Iterator<Item = &Deum> {
        let mut seen = HashSet::new();
        self.deums
            .iter()
            .filter(move |d| !d.id.is_empty() && d.is_enabled() && seen.insert(d.id.clone()))
    }

    pub fn enabled_timers(&self) -> impl Iterator<Item = &Timer> {
        self.timers.iter().filter(|t| t.is_enabled())
    }
}

/// Parse a loosely-typed metric field. Empty strings and the `N/A`/`N/C`
/// probe sentinels read as absent.
fn numeric(raw: &Option<String>) -> Option<f64> {
    let s = raw.as_deref()?.trim();
    if s.is_empty() || s == "N/A" || s == "N/C" {
        return None;
    }
    s.parse().ok()
}

fn loose_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn de_loose_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(loose_string))
}

fn de_loose_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(loose_string).unwrap_or_default())
}

fn de_loose_int<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

fn de_loose_bool<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<bool>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Bool(b) => Some(b),
        _ => None,
    }))
}
