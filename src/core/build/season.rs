use serde::Serialize;

/// Chapter/season a version belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Season {
    pub chapter: u32,
    pub season: u32,
}

/// Map a numeric version (`11.4` for "11.40") to its chapter and season.
pub fn chapter_and_season(version: f64) -> Season {
    let major = version.floor() as u32;
    let (chapter, offset) = if version <= 10.4 {
        (1, 0)
    } else if version <= 18.4 {
        (2, 10)
    } else if version <= 22.4 {
        (3, 18)
    } else if version <= 27.11 {
        (4, 22)
    } else {
        (5, 27)
    };

    Season {
        chapter,
        season: major.saturating_sub(offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_boundaries() {
        assert_eq!(chapter_and_season(4.5), Season { chapter: 1, season: 4 });
        assert_eq!(chapter_and_season(10.4), Season { chapter: 1, season: 10 });
        assert_eq!(chapter_and_season(11.4), Season { chapter: 2, season: 1 });
        assert_eq!(chapter_and_season(19.01), Season { chapter: 3, season: 1 });
        assert_eq!(chapter_and_season(23.5), Season { chapter: 4, season: 1 });
        assert_eq!(chapter_and_season(28.1), Season { chapter: 5, season: 1 });
    }
}
