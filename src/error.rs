//! Error types for plotting runs.

use crate::models::Axis;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while validating the catalog or writing charts.
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Gene {gene} references unknown {axis} '{value}'")]
    UnknownCategory {
        gene: String,
        axis: Axis,
        value: String,
    },

    #[error("Gene '{0}' is not in the catalog")]
    UnknownGene(String),

    #[error("Category ordering for {0} is empty")]
    EmptyOrdering(Axis),

    #[error("Duplicate {axis} category '{value}'")]
    DuplicateCategory { axis: Axis, value: String },

    #[error("Gene '{0}' appears more than once in the catalog")]
    DuplicateGene(String),

    #[error("Gene name '{0}' cannot be used in a file name")]
    InvalidGeneName(String),

    #[error("Failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PlotError::UnknownCategory {
            gene: "SPARC".to_string(),
            axis: Axis::Tissue,
            value: "Kidney".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Gene SPARC references unknown tissue 'Kidney'"
        );

        let err = PlotError::EmptyOrdering(Axis::Species);
        assert_eq!(err.to_string(), "Category ordering for species is empty");
    }

    #[test]
    fn test_write_error_keeps_io_cause_out_of_message() {
        use std::error::Error as _;

        let err = PlotError::Write {
            path: PathBuf::from("out/tissuesSPARC.svg"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied"),
        };
        assert_eq!(err.to_string(), "Failed to write out/tissuesSPARC.svg");
        assert_eq!(err.source().unwrap().to_string(), "access denied");

        // The alternate chain shows the io cause exactly once.
        let chained = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(chained.matches("access denied").count(), 1);
    }
}
