use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use netdata::play_by_play::RawPlayEvent;
use netdata::player_match::find_player_in_text;
use netdata::prep::process_play_by_play_data;
use netdata::shots::reconstruct_shots;
use netdata::stats_api::parse_stats_json;
use netdata::types::{GameRosters, PlayerInfo, TeamAbbreviation, TeamRoster};

const PLAY_BY_PLAY_JSON: &str = include_str!("../tests/fixtures/playbyplayv2_0021700002.json");

fn home_players() -> Vec<PlayerInfo> {
    vec![
        PlayerInfo::new("201142", "Kevin", "Durant"),
        PlayerInfo::new("203110", "Draymond", "Green"),
        PlayerInfo::new("2585", "Zaza", "Pachulia"),
        PlayerInfo::new("202691", "Klay", "Thompson"),
        PlayerInfo::new("201939", "Stephen", "Curry"),
        PlayerInfo::new("2733", "Shaun", "Livingston"),
    ]
}

fn away_players() -> Vec<PlayerInfo> {
    vec![
        PlayerInfo::new("201569", "Eric", "Gordon"),
        PlayerInfo::new("201583", "Ryan", "Anderson"),
        PlayerInfo::new("203991", "Clint", "Capela"),
        PlayerInfo::new("101108", "Chris", "Paul"),
        PlayerInfo::new("201935", "James", "Harden"),
        PlayerInfo::new("2403", "Nene", "Nene"),
    ]
}

/// The fixture game repeated period after period, roughly a full game's
/// worth of rows.
fn full_game_events() -> Vec<RawPlayEvent> {
    let raw = parse_stats_json(PLAY_BY_PLAY_JSON).unwrap();
    let sample = process_play_by_play_data(&raw).unwrap().play_by_play;
    let mut events = Vec::with_capacity(sample.len() * 24);
    let mut eventnum = 0;
    for block in 0..24u8 {
        for event in &sample {
            let mut event = event.clone();
            event.eventnum = eventnum;
            event.period = block / 6 + 1;
            eventnum += 1;
            events.push(event);
        }
    }
    events
}

fn bench_play_by_play_prep(c: &mut Criterion) {
    c.bench_function("play_by_play_prep", |b| {
        b.iter(|| {
            let raw = parse_stats_json(black_box(PLAY_BY_PLAY_JSON)).unwrap();
            let pbp = process_play_by_play_data(&raw).unwrap();
            black_box(pbp.play_by_play.len());
        })
    });
}

fn bench_reconstruct_shots(c: &mut Criterion) {
    let events = full_game_events();
    let home = home_players();
    let away = away_players();
    let rosters = GameRosters {
        home: TeamRoster {
            team: TeamAbbreviation::GSW,
            players: &home,
        },
        away: TeamRoster {
            team: TeamAbbreviation::HOU,
            players: &away,
        },
    };

    c.bench_function("reconstruct_shots_full_game", |b| {
        b.iter(|| {
            let shots = reconstruct_shots("2017-10-17", black_box(&events), rosters).unwrap();
            black_box(shots.len());
        })
    });
}

fn bench_find_player(c: &mut Criterion) {
    let players: Vec<PlayerInfo> = home_players().into_iter().chain(away_players()).collect();
    c.bench_function("find_player_in_text", |b| {
        b.iter(|| {
            let found = find_player_in_text(
                black_box("Gordon 27' 3PT Jump Shot (3 PTS) (Harden 1 AST)"),
                &players,
            );
            black_box(found.map(|p| p.id.len()));
        })
    });
}

criterion_group!(
    perf,
    bench_play_by_play_prep,
    bench_reconstruct_shots,
    bench_find_player
);
criterion_main!(perf);
