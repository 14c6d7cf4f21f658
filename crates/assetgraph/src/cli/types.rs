//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::AssetStatus;

/// Asset status for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    /// Fresh relative to all upstream assets
    Good,
    /// A direct upstream asset is newer
    Old,
    /// Some upstream asset is not good
    #[value(name = "downstream-from-old")]
    DownstreamFromOld,
    /// Never materialized
    #[value(name = "none", alias = "unmaterialized")]
    Unmaterialized,
}

impl std::fmt::Display for StatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", AssetStatus::from(*self))
    }
}

impl From<StatusArg> for AssetStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Good => AssetStatus::Good,
            StatusArg::Old => AssetStatus::Old,
            StatusArg::DownstreamFromOld => AssetStatus::DownstreamFromOld,
            StatusArg::Unmaterialized => AssetStatus::Unmaterialized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("good", AssetStatus::Good)]
    #[case("old", AssetStatus::Old)]
    #[case("downstream-from-old", AssetStatus::DownstreamFromOld)]
    #[case("none", AssetStatus::Unmaterialized)]
    #[case("unmaterialized", AssetStatus::Unmaterialized)]
    fn parses_status_names(#[case] input: &str, #[case] expected: AssetStatus) {
        let arg = StatusArg::from_str(input, false).unwrap();
        assert_eq!(AssetStatus::from(arg), expected);
    }

    #[test]
    fn display_matches_domain_status() {
        assert_eq!(StatusArg::DownstreamFromOld.to_string(), "downstream-from-old");
        assert_eq!(StatusArg::Unmaterialized.to_string(), "none");
    }
}
