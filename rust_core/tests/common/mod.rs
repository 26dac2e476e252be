//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use pitchstats_core::{run_pipeline, LoadConfig, NormalizeConfig, PipelineReport, RawTable, Store};

/// Player feed with the flattened multi-level headers the scraper writes.
pub const PLAYERS_CSV: &str = "\
Unnamed: 0_level_0_Player,Unnamed: 1_level_0_Nation,Unnamed: 2_level_0_Pos,Unnamed: 3_level_0_Age,Performance_CrdY,Performance_CrdR,Team
Bukayo Saka,eng ENG,FW,22,3,0,Arsenal
Declan Rice,eng ENG,MF,25,5,1,Arsenal
Martin Odegaard,no NOR,MF,25,1,0,Arsenal
Player,Nation,Pos,Age,CrdY,CrdR,Team
Matheus Cunha,br BRA,FW,25,7,1,Wolves
Mario Lemina,ga GAB,MF,30,6,0,Wolves
Bryan Mbeumo,cm CMR,FW,24,2,0,Brentford
Squad Total,,,,,,Brentford
Shane O'Neill,ie IRL,DF,21,0,0,O'Neill's XI
";

/// Standings scenario: Arsenal 2W (6 pts), Wolves 1D 1L (1 pt, GD -1),
/// Brentford 1D 1L (1 pt, GD -3). Every fixture appears from both sides.
pub const MATCHES_CSV: &str = "\
Date,Time,Comp,Round,Venue,Result,GF,GA,Opponent,xG,Poss,Team
2024-08-17,15:00,Premier League,Matchweek 1,Home,W,1,0,Wolves,1.2,55,Arsenal
2024-08-17,15:00,Premier League,Matchweek 1,Away,L,0,1,Arsenal,0.4,45,Wolves
2024-08-24,15:00,Premier League,Matchweek 2,Home,W,3,0,Brentford,2.1,60,Arsenal
2024-08-24,15:00,Premier League,Matchweek 2,Away,L,0,3,Arsenal,0.3,40,Brentford
2024-08-31,17:30,Premier League,Matchweek 3,Home,D,0,0,Brentford,0.9,51,Wolves
2024-08-31,17:30,Premier League,Matchweek 3,Away,D,0,0,Wolves,0.8,49,Brentford
2024-09-18,20:00,Champions Lg,League phase,Home,W,2,0,Atalanta,1.9,58,Arsenal
2024-09-21,15:00,Premier League,Matchweek 4,Home,W,2,1,Arsenal,0.7,38,O'Neill's XI
2024-09-21,15:00,Premier League,Matchweek 4,Away,L,1,2,O'Neill's XI,1.6,62,Arsenal
";

pub fn players_table() -> RawTable {
    RawTable::from_reader(PLAYERS_CSV.as_bytes()).expect("player fixture parses")
}

pub fn matches_table() -> RawTable {
    RawTable::from_reader(MATCHES_CSV.as_bytes()).expect("match fixture parses")
}

/// Fresh in-memory store with the fixture season loaded.
pub async fn loaded_store() -> (Store, PipelineReport) {
    let store = Store::in_memory().await.expect("in-memory store opens");
    let report = run_pipeline(
        &store,
        &players_table(),
        &matches_table(),
        &NormalizeConfig::default(),
        &LoadConfig::default(),
    )
    .await
    .expect("fixture season loads");
    (store, report)
}
