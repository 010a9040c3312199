//! Supported 1D symbologies.

use serde::{Deserialize, Serialize};

/// A 1D barcode encoding. One scanner reads exactly one symbology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    #[default]
    #[serde(rename = "ean_13")]
    Ean13,
    #[serde(rename = "ean_8")]
    Ean8,
    UpcA,
    #[serde(rename = "code_128")]
    Code128,
    #[serde(rename = "code_39")]
    Code39,
}

impl Symbology {
    /// Canonical lower-case name, as used in config files.
    pub fn name(&self) -> &'static str {
        match self {
            Symbology::Ean13 => "ean_13",
            Symbology::Ean8 => "ean_8",
            Symbology::UpcA => "upc_a",
            Symbology::Code128 => "code_128",
            Symbology::Code39 => "code_39",
        }
    }
}

impl std::fmt::Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Symbology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "ean_13" | "ean13" => Ok(Symbology::Ean13),
            "ean_8" | "ean8" => Ok(Symbology::Ean8),
            "upc_a" | "upca" => Ok(Symbology::UpcA),
            "code_128" | "code128" => Ok(Symbology::Code128),
            "code_39" | "code39" => Ok(Symbology::Code39),
            other => Err(format!("unsupported symbology {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for symbology in [
            Symbology::Ean13,
            Symbology::Ean8,
            Symbology::UpcA,
            Symbology::Code128,
            Symbology::Code39,
        ] {
            assert_eq!(symbology.name().parse::<Symbology>(), Ok(symbology));
        }
        assert_eq!("EAN-13".parse::<Symbology>(), Ok(Symbology::Ean13));
        assert!("qr_code".parse::<Symbology>().is_err());
    }

    #[test]
    fn test_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            symbology: Symbology,
        }
        let parsed: Wrapper = toml::from_str("symbology = \"code_128\"").unwrap();
        assert_eq!(parsed.symbology, Symbology::Code128);
    }
}
