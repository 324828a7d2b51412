//! Numeric spatial reference identifiers.

use std::{fmt, str::FromStr};

use crate::Error;

/// A code from the EPSG registry of spatial reference systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Epsg(u32);

impl Epsg {
    pub const fn new(code: u32) -> Self {
        Epsg(code)
    }

    pub const fn code(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Epsg {
    fn from(code: u32) -> Self {
        Epsg(code)
    }
}

impl fmt::Display for Epsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

/// Accepts both the bare code (`4326`) and the authority prefixed form (`EPSG:4326`)
impl FromStr for Epsg {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let code = match trimmed.split_once(':') {
            Some((authority, code)) if authority.eq_ignore_ascii_case("epsg") => code,
            Some(_) => return Err(Error::InvalidArgument(format!("Unsupported spatial reference authority: {trimmed}"))),
            None => trimmed,
        };

        code.trim()
            .parse::<u32>()
            .map(Epsg)
            .map_err(|err| Error::InvalidArgument(format!("Invalid EPSG code '{trimmed}' ({err})")))
    }
}

pub mod epsg {
    use super::Epsg;

    pub const WGS84: Epsg = Epsg::new(4326);
    pub const WGS84_WEB_MERCATOR: Epsg = Epsg::new(3857);
    pub const BELGIAN_LAMBERT72: Epsg = Epsg::new(31370);
    /// NAD83 / New York Long Island (ftUS)
    pub const NAD83_NY_LONG_ISLAND_FTUS: Epsg = Epsg::new(2263);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsg_display() {
        assert_eq!(epsg::WGS84.to_string(), "EPSG:4326");
        assert_eq!(Epsg::from(31370).code(), 31370);
    }

    #[test]
    fn epsg_parse() {
        assert_eq!("4326".parse::<Epsg>().unwrap(), epsg::WGS84);
        assert_eq!("EPSG:3857".parse::<Epsg>().unwrap(), epsg::WGS84_WEB_MERCATOR);
        assert_eq!(" epsg:2263 ".parse::<Epsg>().unwrap(), epsg::NAD83_NY_LONG_ISLAND_FTUS);
        assert!("ESRI:102100".parse::<Epsg>().is_err());
        assert!("wgs84".parse::<Epsg>().is_err());
        assert!("".parse::<Epsg>().is_err());
    }
}
