//! City directory backed by configuration.

use std::collections::HashMap;

use super::CityDirectory;

#[derive(Clone, Debug, Default)]
pub struct StaticCityDirectory {
    default_radius: u32,
    radii: HashMap<String, u32>,
}

impl StaticCityDirectory {
    pub fn new(default_radius: u32, radii: HashMap<String, u32>) -> Self {
        Self { default_radius, radii }
    }

    /// Parses `slug=meters` pairs separated by commas. Returns the first bad pair on error.
    pub fn parse_radii(raw: &str) -> Result<HashMap<String, u32>, String> {
        raw.split(',')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (slug, meters) = pair.split_once('=').ok_or_else(|| pair.to_string())?;
                let meters = meters.trim().parse::<u32>().map_err(|_| pair.to_string())?;
                Ok((slug.trim().to_lowercase(), meters))
            })
            .collect()
    }
}

impl CityDirectory for StaticCityDirectory {
    fn radius_for_city(&self, slug: &str) -> u32 {
        self.radii.get(&slug.to_lowercase()).copied().unwrap_or(self.default_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_radii() {
        let radii = StaticCityDirectory::parse_radii("moscow=40000, Spb = 25000,").unwrap();
        assert_eq!(radii.get("moscow"), Some(&40000));
        assert_eq!(radii.get("spb"), Some(&25000));
        assert_eq!(StaticCityDirectory::parse_radii("kazan").unwrap_err(), "kazan");
        assert_eq!(StaticCityDirectory::parse_radii("kazan=far").unwrap_err(), "kazan=far");
    }

    #[test]
    fn test_unknown_city_uses_default() {
        let cities = StaticCityDirectory::new(30000, StaticCityDirectory::parse_radii("spb=25000").unwrap());
        assert_eq!(cities.radius_for_city("SPB"), 25000);
        assert_eq!(cities.radius_for_city("tver"), 30000);
    }
}
