pub mod calc;
pub mod config;
pub mod data_manager;
pub mod description;
pub mod document_store;
pub mod filter;
pub mod http_cache;
pub mod http_client;
pub mod identity_maps;
pub mod ingest;
pub mod play_by_play;
pub mod player_match;
pub mod prep;
pub mod shot_dataset;
pub mod shot_export;
pub mod shot_zone;
pub mod shots;
pub mod stats_api;
pub mod types;
