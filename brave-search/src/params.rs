//! Closed parameter vocabularies accepted by the provider.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    Strict,
    Moderate,
    Off,
}

impl SafeSearch {
    pub const ALL: &'static [&'static str] = &["strict", "moderate", "off"];

    pub fn as_str(self) -> &'static str {
        match self {
            SafeSearch::Strict => "strict",
            SafeSearch::Moderate => "moderate",
            SafeSearch::Off => "off",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Metric,
    Imperial,
}

impl Units {
    pub const ALL: &'static [&'static str] = &["metric", "imperial"];

    pub fn as_str(self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

/// Publication window: past day, week, month or year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    Pd,
    Pw,
    Pm,
    Py,
}

impl Freshness {
    pub const ALL: &'static [&'static str] = &["pd", "pw", "pm", "py"];

    pub fn as_str(self) -> &'static str {
        match self {
            Freshness::Pd => "pd",
            Freshness::Pw => "pw",
            Freshness::Pm => "pm",
            Freshness::Py => "py",
        }
    }
}

macro_rules! display_as_str {
    ($($t:ty),*) => {
        $(impl std::fmt::Display for $t {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(SafeSearch, Units, Freshness);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_serde() {
        for (name, v) in SafeSearch::ALL.iter().zip([
            SafeSearch::Strict,
            SafeSearch::Moderate,
            SafeSearch::Off,
        ]) {
            assert_eq!(v.as_str(), *name);
            assert_eq!(serde_json::to_value(v).unwrap(), *name);
        }
        assert_eq!(Units::Imperial.to_string(), "imperial");
        assert_eq!(
            serde_json::from_str::<Freshness>("\"pw\"").unwrap(),
            Freshness::Pw
        );
        assert!(serde_json::from_str::<Freshness>("\"pz\"").is_err());
    }
}
