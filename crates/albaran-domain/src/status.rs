//! Workflow status enums.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Progress of a project.
///
/// Wire format: the Spanish display label (`"Pendiente"`, `"En progreso"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    #[serde(rename = "Pendiente")]
    Pendiente,
    #[serde(rename = "En progreso")]
    EnProgreso,
    #[serde(rename = "Completado")]
    Completado,
    #[serde(rename = "Cancelado")]
    Cancelado,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pendiente => "Pendiente",
            Self::EnProgreso => "En progreso",
            Self::Completado => "Completado",
            Self::Cancelado => "Cancelado",
        }
    }
}

/// Lifecycle state of an albarán.
///
/// `Signed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlbaranStatus {
    #[default]
    Draft,
    Pending,
    Signed,
    Cancelled,
}

impl AlbaranStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Signed => "signed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Signed | Self::Cancelled)
    }
}

/// Returned when a stored status string matches no variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ProjectStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pendiente" => Ok(Self::Pendiente),
            "En progreso" => Ok(Self::EnProgreso),
            "Completado" => Ok(Self::Completado),
            "Cancelado" => Ok(Self::Cancelado),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

impl FromStr for AlbaranStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "signed" => Ok(Self::Signed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AlbaranStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
