use plotters::style::RGBColor;

pub const GREY: RGBColor = RGBColor(127, 127, 127);
pub const GOLD: RGBColor = RGBColor(255, 215, 0);

/// One cell of the simulated map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Path,
    Wall,
    Gold,
    Robot,
    Unknown(char),
}

impl Tile {
    pub fn from_code(code: char) -> Self {
        match code {
            'p' => Tile::Path,
            'w' => Tile::Wall,
            'g' => Tile::Gold,
            'R' => Tile::Robot,
            other => Tile::Unknown(other),
        }
    }

    pub fn code(&self) -> char {
        match self {
            Tile::Path => 'p',
            Tile::Wall => 'w',
            Tile::Gold => 'g',
            Tile::Robot => 'R',
            Tile::Unknown(c) => *c,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Tile::Unknown(_))
    }
}

impl From<char> for Tile {
    fn from(code: char) -> Self {
        Tile::from_code(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_from_code() {
        assert_eq!(Tile::from_code('p'), Tile::Path);
        assert_eq!(Tile::from_code('w'), Tile::Wall);
        assert_eq!(Tile::from_code('g'), Tile::Gold);
        assert_eq!(Tile::from_code('R'), Tile::Robot);
    }

    #[test]
    fn test_tile_codes_are_case_sensitive() {
        assert_eq!(Tile::from_code('r'), Tile::Unknown('r'));
        assert_eq!(Tile::from_code('P'), Tile::Unknown('P'));
        assert_eq!(Tile::from_code('r').is_known(), false);
    }

    #[test]
    fn test_tile_code_roundtrip() {
        for c in &['p', 'w', 'g', 'R', 'x'] {
            assert_eq!(Tile::from(*c).code(), *c);
        }
    }
}
