use serde_json::json;

use alterego::{
    Deum, DeumOverride, Forcing, GlobalState, Season, SlotMode, SlotTime, SlotValue, Snapshot,
    Station, TIMER_SLOTS_PER_DAY, Timer, Weekday, Zone,
};

fn zone(value: serde_json::Value) -> Zone {
    serde_json::from_value(value).expect("zone should deserialize")
}

#[test]
fn zone_temperature_parses_from_string() {
    let z = zone(json!({
        "id": "z1",
        "status": {"temperature": "21.5", "current_setpoint": "19.0"},
    }));
    assert_eq!(z.temperature(), Some(21.5));
    assert_eq!(z.setpoint(), Some(19.0));
}

#[test]
fn zone_probe_sentinels_read_as_absent() {
    for sentinel in ["N/A", "N/C", ""] {
        let z = zone(json!({
            "id": "z1",
            "status": {"temperature": sentinel, "humidity": sentinel, "dewpoint": sentinel},
        }));
        assert_eq!(z.temperature(), None, "sentinel {sentinel:?}");
        assert_eq!(z.humidity(), None);
        assert_eq!(z.dewpoint(), None);
    }
}

#[test]
fn zone_setpoint_zero_means_no_setpoint() {
    let z = zone(json!({
        "id": "z1",
        "status": {"temperature": "21.5", "current_setpoint": "0.0"},
    }));
    assert_eq!(z.temperature(), Some(21.5));
    assert_eq!(z.setpoint(), None);
}

#[test]
fn zone_tolerates_numeric_fields_and_ids() {
    let z = zone(json!({
        "id": 7,
        "status": {"temperature": 21.5, "enabled": 1},
    }));
    assert_eq!(z.id, "7");
    assert_eq!(z.temperature(), Some(21.5));
    assert!(z.is_enabled());
}

#[test]
fn zone_name_falls_back_to_id() {
    let named = zone(json!({"id": "z1", "status": {"description": "Soggiorno"}}));
    assert_eq!(named.name(), "Soggiorno");

    let unnamed = zone(json!({"id": "z2", "status": {}}));
    assert_eq!(unnamed.name(), "Zone z2");
}

#[test]
fn zone_forcing_defaults_to_auto() {
    let z = zone(json!({"id": "z1"}));
    assert_eq!(z.forcing(), Forcing::Auto);

    let z = zone(json!({"id": "z1", "params": {"forcing": "ECONOMY"}}));
    assert_eq!(z.forcing(), Forcing::Economy);
}

#[test]
fn zone_is_off_from_forcing_or_output() {
    let forced_off = zone(json!({"id": "z1", "params": {"forcing": "OFF"}}));
    assert!(forced_off.is_off());

    let output_off = zone(json!({
        "id": "z1",
        "status": {"zone_output": "OFF"},
        "params": {"forcing": "COMFORT"},
    }));
    assert!(output_off.is_off());

    let running = zone(json!({
        "id": "z1",
        "status": {"zone_output": "ON"},
        "params": {"forcing": "AUTO"},
    }));
    assert!(!running.is_off());
}

#[test]
fn zone_humidity_capability_from_type() {
    let rh = zone(json!({"id": "z1", "status": {"type": "Z_RH"}}));
    assert!(rh.is_humidity_capable());

    let plain = zone(json!({"id": "z1", "status": {"type": "Z"}}));
    assert!(!plain.is_humidity_capable());
}

#[test]
fn forcing_roundtrip() {
    for forcing in [
        Forcing::Auto,
        Forcing::Comfort,
        Forcing::Economy,
        Forcing::Off,
    ] {
        assert_eq!(Forcing::from_api_str(forcing.as_api_str()), Some(forcing));
    }
    assert_eq!(Forcing::from_api_str("BOGUS"), None);
}

#[test]
fn global_envelope_tolerates_missing_or_null_data() {
    use alterego::GlobalEnvelope;

    let bare: GlobalEnvelope = serde_json::from_value(json!({})).unwrap();
    assert_eq!(bare.into_state().season(), Season::Winter);

    let null: GlobalEnvelope = serde_json::from_value(json!({"data": null})).unwrap();
    assert_eq!(null.into_state().season(), Season::Winter);
}

#[test]
fn global_season_defaults_to_winter() {
    let g: GlobalState = serde_json::from_value(json!({})).unwrap();
    assert_eq!(g.season(), Season::Winter);
    assert_eq!(g.set_season(), Season::Winter);
}

#[test]
fn global_setpoint_bounds_by_season() {
    let g: GlobalState = serde_json::from_value(json!({
        "status": {"global_season": "SUMMER"},
        "params": {
            "global_zset_min_summer": "16.0",
            "global_zset_max_summer": "28.0",
        },
    }))
    .unwrap();
    assert_eq!(g.setpoint_min(Season::Summer), 16.0);
    assert_eq!(g.setpoint_max(Season::Summer), 28.0);
    // Unset winter bounds fall back to the fixed defaults.
    assert_eq!(g.setpoint_min(Season::Winter), 10.0);
    assert_eq!(g.setpoint_max(Season::Winter), 30.0);
}

#[test]
fn global_setpoint_bound_defaults() {
    let g = GlobalState::default();
    assert_eq!(g.setpoint_min(Season::Summer), 15.0);
    assert_eq!(g.setpoint_min(Season::Winter), 10.0);
    assert_eq!(g.setpoint_max(Season::Summer), 30.0);
}

#[test]
fn deum_enabled_requires_user_visibility() {
    let visible: Deum = serde_json::from_value(json!({
        "id": "d1",
        "status": {"enabled": 1, "user_visible": true},
    }))
    .unwrap();
    assert!(visible.is_enabled());

    let hidden: Deum = serde_json::from_value(json!({
        "id": "d2",
        "status": {"enabled": 1, "user_visible": false},
    }))
    .unwrap();
    assert!(!hidden.is_enabled());

    let disabled: Deum = serde_json::from_value(json!({
        "id": "d3",
        "status": {"enabled": 0, "user_visible": true},
    }))
    .unwrap();
    assert!(!disabled.is_enabled());
}

#[test]
fn deum_name_and_overrides() {
    let d: Deum = serde_json::from_value(json!({
        "id": "d1",
        "status": {"description": "  "},
        "params": {"user_override": "HIGH", "boost_timer": "12"},
    }))
    .unwrap();
    assert_eq!(d.name(), "Deum d1");
    assert_eq!(d.override_mode(), DeumOverride::High);
    assert_eq!(d.boost_timer(), Some(12.0));

    let bare: Deum = serde_json::from_value(json!({"id": "d2"})).unwrap();
    assert_eq!(bare.override_mode(), DeumOverride::Auto);
}

#[test]
fn deum_vent_speed_defaults() {
    let d: Deum = serde_json::from_value(json!({"id": "d1"})).unwrap();
    assert_eq!(d.params.vent_speed_boost(), 80);
    assert_eq!(d.params.vent_speed_comfort(), 40);
    assert_eq!(d.params.vent_speed_economy(), 0);

    let d: Deum = serde_json::from_value(json!({
        "id": "d1",
        "params": {"vent_speed_boost": 95},
    }))
    .unwrap();
    assert_eq!(d.params.vent_speed_boost(), 95);
}

#[test]
fn timer_slots_decode_by_day_and_index() {
    let t: Timer = serde_json::from_value(json!({
        "id": "t1",
        "status": {"description": "Piano terra", "enabled": 1},
        "params": {
            "S_MO_0": "COMFORT 06:30",
            "S_MO_1": "ECONOMY 22:15",
            "S_TU_0": "N/U",
        },
    }))
    .unwrap();

    let morning = t.slot(Weekday::Mo, 0);
    assert_eq!(morning.mode(), Some(SlotMode::Comfort));
    assert_eq!(morning.time(), SlotTime::new(6, 30));

    let evening = t.slot(Weekday::Mo, 1);
    assert_eq!(evening.mode(), Some(SlotMode::Economy));
    assert_eq!(evening.time(), SlotTime::new(22, 15));

    assert_eq!(t.slot(Weekday::Tu, 0), SlotValue::Unused);
    // Keys the server never sent read as unused too.
    assert_eq!(t.slot(Weekday::Su, 5), SlotValue::Unused);
}

#[test]
fn timer_full_week_enumeration() {
    let t: Timer = serde_json::from_value(json!({
        "id": "t1",
        "status": {"enabled": 1},
        "params": {
            "S_MO_0": "COMFORT 06:30",
            "S_WE_3": "OFF 13:00",
            "S_SU_5": "ECONOMY 23:00",
        },
    }))
    .unwrap();

    let mut used = 0;
    for day in Weekday::ALL {
        for slot in 0..TIMER_SLOTS_PER_DAY {
            if t.slot(day, slot) != SlotValue::Unused {
                used += 1;
            }
        }
    }
    assert_eq!(used, 3);
}

#[test]
fn slot_value_parse_and_compose() {
    let parsed = SlotValue::parse("COMFORT 06:30");
    assert_eq!(parsed.to_api_string(), "COMFORT 06:30");

    assert_eq!(SlotValue::parse("N/U"), SlotValue::Unused);
    assert_eq!(SlotValue::Unused.to_api_string(), "N/U");

    // A bare mode is valid on the wire; writes backfill midnight.
    let bare = SlotValue::parse("OFF");
    assert_eq!(bare.mode(), Some(SlotMode::Off));
    assert_eq!(bare.time(), None);
    assert_eq!(bare.to_api_string(), "OFF 00:00");

    assert_eq!(SlotValue::parse("GIBBERISH 06:30"), SlotValue::Unused);
}

#[test]
fn slot_time_validation() {
    assert_eq!(SlotTime::parse("06:30").map(|t| (t.hour, t.minute)), Some((6, 30)));
    assert_eq!(SlotTime::parse("24:00"), None);
    assert_eq!(SlotTime::parse("12:60"), None);
    assert_eq!(SlotTime::parse("noon"), None);
    assert_eq!(format!("{}", SlotTime::new(7, 5).unwrap()), "07:05");
}

#[test]
fn station_statid_tolerates_numbers() {
    let s: Station = serde_json::from_value(json!({"statid": "AB12"})).unwrap();
    assert_eq!(s.statid, "AB12");

    let s: Station = serde_json::from_value(json!({"statid": 42})).unwrap();
    assert_eq!(s.statid, "42");
}

#[test]
fn snapshot_lookups_and_enabled_filters() {
    let snapshot = Snapshot {
        zones: vec![
            zone(json!({"id": "z1", "status": {"enabled": 1}})),
            zone(json!({"id": "z2", "status": {"enabled": 0}})),
        ],
        global: GlobalState::default(),
        deums: serde_json::from_value(json!([
            {"id": "d1", "status": {"enabled": 1, "user_visible": true}},
            {"id": "d1", "status": {"enabled": 1, "user_visible": true}},
            {"id": "", "status": {"enabled": 1, "user_visible": true}},
        ]))
        .unwrap(),
        timers: serde_json::from_value(json!([
            {"id": "t1", "status": {"enabled": 1}},
        ]))
        .unwrap(),
    };

    assert!(snapshot.zone("z2").is_some());
    assert!(snapshot.zone("missing").is_none());
    assert_eq!(snapshot.enabled_zones().count(), 1);
    // Duplicate and id-less deum records are dropped.
    assert_eq!(snapshot.enabled_deums().count(), 1);
    assert_eq!(snapshot.enabled_timers().count(), 1);
    assert!(snapshot.timer("t1").is_some());
}

#[test]
fn snapshot_default_has_all_four_feeds_empty() {
    let snapshot = Snapshot::default();
    assert!(snapshot.zones.is_empty());
    assert!(snapshot.deums.is_empty());
    assert!(snapshot.timers.is_empty());
    assert_eq!(snapshot.global.season(), Season::Winter);
}
