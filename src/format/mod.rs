/// SACD layout constants and output container formats

/// Format constants
pub mod constants;

pub use constants::*;

/// Output container format for extracted tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Sony DSD Stream File
    #[default]
    Dsf,
    /// DSD Interchange File Format
    Dsdiff,
    /// DSDIFF Edit Master
    DsdiffEditMaster,
}

impl OutputFormat {
    /// Get the file extension (without dot) for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Dsf => "dsf",
            OutputFormat::Dsdiff | OutputFormat::DsdiffEditMaster => "dff",
        }
    }

    /// Get a human-readable description of this format
    pub fn description(&self) -> &'static str {
        match self {
            OutputFormat::Dsf => "DSF (Sony DSD Stream File)",
            OutputFormat::Dsdiff => "DSDIFF (DSD Interchange File Format)",
            OutputFormat::DsdiffEditMaster => "DSDIFF Edit Master",
        }
    }

    /// Header overhead added to size estimates
    pub fn header_overhead(&self) -> u64 {
        match self {
            OutputFormat::Dsf => 96,
            OutputFormat::Dsdiff | OutputFormat::DsdiffEditMaster => 512,
        }
    }

    /// Check if this format is written with the DSDIFF writer
    pub fn is_dsdiff(&self) -> bool {
        matches!(self, OutputFormat::Dsdiff | OutputFormat::DsdiffEditMaster)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = crate::error::SacdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dsf" => Ok(OutputFormat::Dsf),
            "dff" | "dsdiff" => Ok(OutputFormat::Dsdiff),
            "dff-em" | "em" | "editmaster" => Ok(OutputFormat::DsdiffEditMaster),
            other => Err(crate::error::SacdError::generic(format!(
                "Unknown output format: {}",
                other
            ))),
        }
    }
}
