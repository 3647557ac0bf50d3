use crate::types::{BoxScore, BoxScoreStats, PlayerBoxScoreStats, PlayerInfo, PlayerMap};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxScoreFilter {
    pub min_minutes: f64,
}

impl Default for BoxScoreFilter {
    fn default() -> Self {
        Self { min_minutes: 0.0 }
    }
}

impl BoxScoreFilter {
    /// Four full games of minutes; below this a season line is noise.
    pub const SMALL_SAMPLE_SEASON: BoxScoreFilter = BoxScoreFilter {
        min_minutes: 48.0 * 4.0,
    };

    pub fn passes(&self, stats: &BoxScoreStats) -> bool {
        stats.min > self.min_minutes
    }
}

pub fn filter_player_stats<'a>(
    lines: &'a [PlayerBoxScoreStats],
    players: &PlayerMap,
    filter: BoxScoreFilter,
) -> Vec<&'a PlayerBoxScoreStats> {
    lines
        .iter()
        .filter(|line| filter.passes(&line.stats))
        .filter(|line| players.id_map.contains_key(&line.player_id))
        .collect()
}

pub fn players_from_box_score(box_score: &BoxScore, players: &PlayerMap) -> Vec<PlayerInfo> {
    filter_player_stats(&box_score.player_stats, players, BoxScoreFilter::default())
        .into_iter()
        .filter_map(|line| players.id_map.get(&line.player_id).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, min: f64) -> PlayerBoxScoreStats {
        PlayerBoxScoreStats {
            player_id: id.to_string(),
            player_name: format!("Player {id}"),
            start_position: String::new(),
            comment: String::new(),
            stats: BoxScoreStats {
                min,
                ..BoxScoreStats::default()
            },
        }
    }

    #[test]
    fn keeps_known_players_above_minimum() {
        let mut players = PlayerMap::default();
        for id in ["1", "2", "3"] {
            players
                .id_map
                .insert(id.to_string(), PlayerInfo::new(id, "First", "Last"));
        }
        let lines = vec![line("1", 30.5), line("2", 0.0), line("3", 200.0), line("9", 40.0)];

        let kept: Vec<&str> = filter_player_stats(&lines, &players, BoxScoreFilter::default())
            .iter()
            .map(|l| l.player_id.as_str())
            .collect();
        assert_eq!(kept, ["1", "3"]);

        let season: Vec<&str> =
            filter_player_stats(&lines, &players, BoxScoreFilter::SMALL_SAMPLE_SEASON)
                .iter()
                .map(|l| l.player_id.as_str())
                .collect();
        assert_eq!(season, ["3"]);
    }
}
