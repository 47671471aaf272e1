/// The map file dialect a document is loaded from or saved to.
///
/// The format decides which UV coordinate system new faces use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapFormat {
    /// Not yet detected. Must never reach face construction.
    Unknown,
    Standard,
    Quake2,
    Quake2Valve,
    Valve,
    Quake3Legacy,
    Quake3Valve,
    Hexen2,
    Daikatana,
}

impl MapFormat {
    /// Whether faces in this format store explicit U/V axes.
    ///
    /// # Panics
    ///
    /// Panics if called on [`MapFormat::Unknown`].
    #[must_use]
    pub fn is_parallel_uv_coord_system(self) -> bool {
        match self {
            Self::Unknown => panic!("map format is unknown"),
            Self::Valve | Self::Quake2Valve | Self::Quake3Valve => true,
            Self::Standard
            | Self::Quake2
            | Self::Quake3Legacy
            | Self::Hexen2
            | Self::Daikatana => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valve_formats_are_parallel() {
        assert!(MapFormat::Valve.is_parallel_uv_coord_system());
        assert!(MapFormat::Quake2Valve.is_parallel_uv_coord_system());
        assert!(!MapFormat::Standard.is_parallel_uv_coord_system());
        assert!(!MapFormat::Quake2.is_parallel_uv_coord_system());
    }

    #[test]
    #[should_panic(expected = "map format is unknown")]
    fn unknown_format_is_a_contract_violation() {
        let _ = MapFormat::Unknown.is_parallel_uv_coord_system();
    }
}
