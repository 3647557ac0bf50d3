#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Word(&'a str),
    Space,
    Apostrophe,
    OpenParen,
    CloseParen,
    Symbol(char),
}

impl<'a> Token<'a> {
    fn word(self) -> Option<&'a str> {
        match self {
            Token::Word(w) => Some(w),
            _ => None,
        }
    }

    fn is_single_char(self) -> bool {
        match self {
            Token::Word(w) => w.len() == 1,
            _ => true,
        }
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;
    for (idx, ch) in text.char_indices() {
        if is_word_char(ch) {
            word_start.get_or_insert(idx);
            continue;
        }
        if let Some(start) = word_start.take() {
            tokens.push(Token::Word(&text[start..idx]));
        }
        tokens.push(match ch {
            ' ' => Token::Space,
            '\'' => Token::Apostrophe,
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            other => Token::Symbol(other),
        });
    }
    if let Some(start) = word_start {
        tokens.push(Token::Word(&text[start..]));
    }
    tokens
}

pub fn parse_shot_distance(description: &str) -> Option<f64> {
    let tokens = tokenize(description);
    tokens.windows(2).find_map(|pair| {
        let word = pair[0].word()?;
        if pair[1] != Token::Apostrophe {
            return None;
        }
        let digits_start = word
            .char_indices()
            .rev()
            .take_while(|(_, ch)| ch.is_ascii_digit())
            .last()
            .map(|(idx, _)| idx)?;
        word[digits_start..].parse::<f64>().ok()
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistInfo {
    pub name: String,
    pub count: Option<u32>,
}

pub fn parse_assist(description: &str) -> Option<AssistInfo> {
    let tokens = tokenize(description);
    tokens.windows(7).find_map(|w| {
        if w[0] != Token::OpenParen
            || w[2] != Token::Space
            || w[4] != Token::Space
            || w[5] != Token::Word("AST")
            || w[6] != Token::CloseParen
        {
            return None;
        }
        let name = w[1].word()?;
        let count = w[3].word()?;
        if !count.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(AssistInfo {
            name: name.to_string(),
            count: count.parse().ok(),
        })
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FoulType {
    Personal,
    Shooting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoulInfo {
    pub foul_type: Option<FoulType>,
    pub fouling_player: Option<String>,
}

/// Foul written as `<Player> <Letter>.FOUL`, e.g. `Green S.FOUL (P2.T1)`.
/// `P` is a personal foul and `S` a shooting foul; other letters keep the
/// player but carry no foul type. When the pattern is absent both fields are
/// empty.
pub fn parse_foul(description: &str) -> FoulInfo {
    let tokens = tokenize(description);
    let found = tokens.windows(5).find_map(|w| {
        let player = w[0].word()?;
        if w[1] != Token::Space {
            return None;
        }
        let letter = w[2].word()?;
        if !w[3].is_single_char() || !w[4].word()?.starts_with("FOUL") {
            return None;
        }
        Some((player, letter))
    });

    match found {
        Some((player, letter)) => FoulInfo {
            foul_type: match letter {
                "P" => Some(FoulType::Personal),
                "S" => Some(FoulType::Shooting),
                _ => None,
            },
            fouling_player: Some(player.to_string()),
        },
        None => FoulInfo {
            foul_type: None,
            fouling_player: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_splits_words_and_punctuation() {
        let tokens = tokenize("Green S.FOUL (P2)");
        assert_eq!(
            tokens,
            vec![
                Token::Word("Green"),
                Token::Space,
                Token::Word("S"),
                Token::Symbol('.'),
                Token::Word("FOUL"),
                Token::Space,
                Token::OpenParen,
                Token::Word("P2"),
                Token::CloseParen,
            ]
        );
    }

    #[test]
    fn distance_takes_first_digits_before_apostrophe() {
        assert_eq!(parse_shot_distance("Curry 26' 3PT Jump Shot (3 PTS)"), Some(26.0));
        assert_eq!(parse_shot_distance("MISS Love 1' Layup"), Some(1.0));
        assert_eq!(parse_shot_distance("Harden Driving Layup (2 PTS)"), None);
        assert_eq!(parse_shot_distance("O'Quinn 7' Hook Shot"), Some(7.0));
        assert_eq!(parse_shot_distance("B12' shot"), Some(12.0));
    }

    #[test]
    fn assist_pattern_requires_full_shape() {
        let info = parse_assist("James 22' Jump Shot (4 PTS) (Love 3 AST)").unwrap();
        assert_eq!(info.name, "Love");
        assert_eq!(info.count, Some(3));
        assert_eq!(parse_assist("James 22' Jump Shot (4 PTS)"), None);
        assert_eq!(parse_assist("(Love AST)"), None);
        assert_eq!(parse_assist("(Love x AST)"), None);

        let oversized = parse_assist("Curry 3' Layup (2 PTS) (Green 99999999999 AST)").unwrap();
        assert_eq!(oversized.name, "Green");
        assert_eq!(oversized.count, None);
    }

    #[test]
    fn foul_letters_map_to_types() {
        let shooting = parse_foul("Green S.FOUL (P2.T1) (S.Foster)");
        assert_eq!(shooting.foul_type, Some(FoulType::Shooting));
        assert_eq!(shooting.fouling_player.as_deref(), Some("Green"));

        let personal = parse_foul("Al Horford P.FOUL (P1.T1)");
        assert_eq!(personal.foul_type, Some(FoulType::Personal));
        assert_eq!(personal.fouling_player.as_deref(), Some("Horford"));

        let loose_ball = parse_foul("Adams L.B.FOUL (P3.PN)");
        assert_eq!(loose_ball.foul_type, None);
        assert_eq!(loose_ball.fouling_player, None);

        let other = parse_foul("Adams T.FOUL");
        assert_eq!(other.foul_type, None);
        assert_eq!(other.fouling_player.as_deref(), Some("Adams"));
    }
}
