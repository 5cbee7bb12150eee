use std::str::FromStr;

use anyhow::{ensure, Result};

use crate::ramal::RegionCode;

/// Public BMKG endpoint serving the forecast of a single adm4 region.
pub const BMKG_FORECAST_URL: &str = "https://api.bmkg.go.id/publik/prakiraan-cuaca?adm4={}";

const PLACEHOLDER: &str = "{}";

/// A url template with exactly one `{}` placeholder for the region code.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ForecastUrl(String);

impl ForecastUrl {
    pub fn for_region(&self, code: &RegionCode) -> String {
        self.0.replacen(PLACEHOLDER, code.as_str(), 1)
    }
}

impl Default for ForecastUrl {
    fn default() -> Self {
        ForecastUrl(BMKG_FORECAST_URL.to_owned())
    }
}

impl FromStr for ForecastUrl {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let placeholders = s.matches(PLACEHOLDER).count();
        ensure!(placeholders == 1, "expected exactly one {{}} in forecast url {:?}, found {}", s, placeholders);

        Ok(ForecastUrl(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ramal::UnitId;

    #[test]
    fn default_points_to_bmkg() {
        let code = RegionCode::try_from(&UnitId::from(3171071001)).unwrap();
        assert_eq!(
            ForecastUrl::default().for_region(&code),
            "https://api.bmkg.go.id/publik/prakiraan-cuaca?adm4=31.71.07.1001",
        );
    }

    #[test]
    fn custom_template() {
        let url = ForecastUrl::from_str("http://localhost:8080/forecast/{}/daily").unwrap();
        let code = RegionCode::try_from(&UnitId::from(7)).unwrap();
        assert_eq!(url.for_region(&code), "http://localhost:8080/forecast/00.00.00.0007/daily");
    }

    #[test]
    fn template_needs_single_placeholder() {
        assert!(ForecastUrl::from_str("https://example.com/forecast").is_err());
        assert!(ForecastUrl::from_str("https://example.com/{}/{}").is_err());
    }
}
