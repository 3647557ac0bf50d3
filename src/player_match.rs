use crate::types::PlayerInfo;

#[derive(Debug, Clone, Copy)]
struct NameHit<'a> {
    player: &'a PlayerInfo,
    last_idx: Option<usize>,
    first_idx: Option<usize>,
}

fn find_folded(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.find(&needle.to_ascii_lowercase())
}

/// Best-effort match of a free-text event description against a roster.
///
/// Candidates are searched in order (home roster first, then away). A
/// description that starts with a last name wins; then any last-name hit;
/// then a first-name-only hit. Short or common surnames can produce false
/// positives.
///
/// The first-name tie-break for mid-text last-name hits deliberately looks at
/// the leading-last-name subset, which is always empty on that branch. Shot
/// data already generated depends on this ordering, so it is kept as is.
pub fn find_player_in_text<'a>(text: &str, candidates: &'a [PlayerInfo]) -> Option<&'a PlayerInfo> {
    let folded = text.to_ascii_lowercase();
    let hits: Vec<NameHit<'a>> = candidates
        .iter()
        .map(|player| NameHit {
            player,
            last_idx: find_folded(&folded, &player.last_name),
            first_idx: find_folded(&folded, &player.first_name),
        })
        .filter(|hit| hit.last_idx.is_some() || hit.first_idx.is_some())
        .collect();

    let leading: Vec<&NameHit<'a>> = hits.iter().filter(|hit| hit.last_idx == Some(0)).collect();
    if let Some(first) = leading.first() {
        let with_first_name = leading.iter().find(|hit| hit.first_idx.is_some());
        return Some(with_first_name.unwrap_or(first).player);
    }

    let later: Vec<&NameHit<'a>> = hits
        .iter()
        .filter(|hit| hit.last_idx.is_some_and(|idx| idx > 0))
        .collect();
    if let Some(first) = later.first() {
        let with_first_name = leading.iter().find(|hit| hit.first_idx.is_some());
        return Some(with_first_name.unwrap_or(first).player);
    }

    hits.first().map(|hit| hit.player)
}

#[cfg(test)]
mod tests {
    use super::find_player_in_text;
    use crate::types::PlayerInfo;

    fn roster() -> Vec<PlayerInfo> {
        vec![
            PlayerInfo::new("2544", "LeBron", "James"),
            PlayerInfo::new("201567", "Kevin", "Love"),
            PlayerInfo::new("202681", "Kyrie", "Irving"),
        ]
    }

    #[test]
    fn upper_case_description_resolves_full_name() {
        let players = roster();
        let found = find_player_in_text("LEBRON JAMES makes 22' jumper", &players).unwrap();
        assert_eq!(found.id, "2544");
    }

    #[test]
    fn leading_last_name_wins_over_later_mentions() {
        let players = roster();
        let found = find_player_in_text("Love 3' Layup (2 PTS) (James 4 AST)", &players).unwrap();
        assert_eq!(found.id, "201567");
    }

    #[test]
    fn leading_last_name_prefers_first_name_hit() {
        let players = vec![
            PlayerInfo::new("1", "Marcus", "Morris"),
            PlayerInfo::new("2", "Markieff", "Morris"),
        ];
        let found = find_player_in_text("Morris, Markieff 18' Jump Shot", &players).unwrap();
        assert_eq!(found.id, "2");
        let found = find_player_in_text("Morris 18' Jump Shot", &players).unwrap();
        assert_eq!(found.id, "1");
    }

    #[test]
    fn mid_text_last_name_takes_roster_order() {
        // Both last names appear after index 0; the first-name check looks at
        // the (empty) leading subset, so roster order decides.
        let players = vec![
            PlayerInfo::new("1", "Tristan", "Thompson"),
            PlayerInfo::new("2", "Klay", "Thompson"),
        ];
        let found = find_player_in_text("MISS Klay Thompson 25' 3PT Jump Shot", &players).unwrap();
        assert_eq!(found.id, "1");
    }

    #[test]
    fn first_name_only_and_no_match() {
        let players = roster();
        let found = find_player_in_text("Kyrie steal", &players).unwrap();
        assert_eq!(found.id, "202681");
        assert!(find_player_in_text("Jump Ball Horford vs. Adams", &players).is_none());
        assert!(find_player_in_text("anything", &[]).is_none());
    }
}
