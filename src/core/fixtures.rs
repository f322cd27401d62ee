//! JSON builders shared by the unit tests.

use serde_json::{json, Value};

use super::model::{RawBattle, RawEvent, RawPlayer};

pub const START_TIME: &str = "2025-03-01T18:00:00.000Z";
pub const END_TIME: &str = "2025-03-01T18:02:35.000Z";

pub fn raw_player(id: &str, equipment: Value, average_item_power: f64) -> RawPlayer {
    serde_json::from_value(json!({
        "Id": id,
        "Name": format!("Name_{id}"),
        "GuildName": format!("Guild_{id}"),
        "AllianceName": "",
        "Equipment": equipment,
        "AverageItemPower": average_item_power,
    }))
    .expect("fixture player")
}

pub fn raw_event(
    killer: &RawPlayer,
    victim: &RawPlayer,
    group_members: &[&RawPlayer],
    fame: u64,
) -> RawEvent {
    RawEvent {
        event_id: 0,
        time_stamp: None,
        killer: killer.clone(),
        victim: victim.clone(),
        total_victim_kill_fame: fame,
        participants: vec![killer.clone()],
        group_members: group_members.iter().map(|p| (*p).clone()).collect(),
    }
}

pub fn raw_battle(id: u64, player_count: usize) -> RawBattle {
    let players = (0..player_count)
        .map(|i| (format!("p{i}"), json!({})))
        .collect();
    RawBattle {
        id,
        start_time: START_TIME.to_string(),
        end_time: END_TIME.to_string(),
        players,
    }
}

pub fn plate_melee_gear() -> Value {
    json!({
        "MainHand": {"Type": "T6_2H_CLAYMORE@1", "Quality": 3},
        "OffHand": null,
        "Armor": {"Type": "T6_ARMOR_PLATE_SET1", "Quality": 2},
        "Head": {"Type": "T6_HEAD_PLATE_SET1", "Quality": 2},
        "Shoes": {"Type": "T6_SHOES_PLATE_SET1", "Quality": 2},
        "Cape": {"Type": "T6_CAPE", "Quality": 2},
        "Potion": {"Type": "T6_POTION_HEAL", "Quality": 0},
    })
}

pub fn tank_gear() -> Value {
    json!({
        "MainHand": {"Type": "T6_MAIN_MACE@1", "Quality": 3},
        "OffHand": {"Type": "T6_OFF_SHIELD", "Quality": 2},
        "Armor": {"Type": "T6_ARMOR_PLATE_SET3", "Quality": 2},
    })
}

pub fn healer_gear() -> Value {
    json!({
        "MainHand": {"Type": "T6_MAIN_HOLYSTAFF@1", "Quality": 3},
        "OffHand": {"Type": "T6_OFF_BOOK", "Quality": 2},
        "Armor": {"Type": "T6_ARMOR_CLOTH_SET2", "Quality": 2},
    })
}

pub fn leather_gear() -> Value {
    json!({
        "MainHand": {"Type": "T6_2H_BOW", "Quality": 2},
        "Armor": {"Type": "T6_ARMOR_LEATHER_SET1", "Quality": 2},
    })
}

pub fn cloth_gear() -> Value {
    json!({
        "MainHand": {"Type": "T6_MAIN_FIRESTAFF", "Quality": 2},
        "Armor": {"Type": "T6_ARMOR_CLOTH_SET1", "Quality": 2},
    })
}

/// Ten players `a1..a5` against `b1..b5`, with one full group of five.
pub fn five_vs_five_events(average_item_power: f64) -> Vec<RawEvent> {
    let a: Vec<RawPlayer> = (1..=5)
        .map(|i| raw_player(&format!("a{i}"), plate_melee_gear(), average_item_power))
        .collect();
    let b: Vec<RawPlayer> = (1..=5)
        .map(|i| raw_player(&format!("b{i}"), plate_melee_gear(), average_item_power))
        .collect();
    let team_a: Vec<&RawPlayer> = a.iter().collect();
    let team_b: Vec<&RawPlayer> = b.iter().collect();

    vec![
        raw_event(&a[0], &b[0], &team_a, 10_000),
        raw_event(&b[1], &a[2], &team_b, 8_000),
        raw_event(&a[1], &b[2], &[&a[0], &a[1], &a[3]], 9_000),
    ]
}

/// Four players `a1, a2` against `b1, b2`.
pub fn two_vs_two_events(average_item_power: f64, fame: u64) -> Vec<RawEvent> {
    let a1 = raw_player("a1", plate_melee_gear(), average_item_power);
    let a2 = raw_player("a2", plate_melee_gear(), average_item_power);
    let b1 = raw_player("b1", plate_melee_gear(), average_item_power);
    let b2 = raw_player("b2", plate_melee_gear(), average_item_power);

    vec![
        raw_event(&a1, &b1, &[&a1, &a2], 5_000),
        raw_event(&b2, &a2, &[&b1, &b2], fame),
    ]
}
