use crate::Clinic;
use serde::{Deserialize, Serialize};

pub const PRIMARY_PROPERTY: &str = "--primary";
pub const ACCENT_PROPERTY: &str = "--accent";

/// Product-level branding used when no clinic is active
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub product_name: String,
    pub default_title: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            product_name: "Dawini".to_string(),
            default_title: "Dawini Santé".to_string(),
        }
    }
}

/// Visual theme derived from the current tenancy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub primary: Option<String>,
    pub accent: Option<String>,
    pub title: String,
}

impl Theme {
    /// Compute the theme for a tenancy state. Pure: same inputs, same theme.
    pub fn resolve(clinic: Option<&Clinic>, branding: &Branding) -> Self {
        match clinic {
            Some(clinic) => Self {
                primary: Some(clinic.primary_color.clone()),
                accent: Some(clinic.accent_color().to_string()),
                title: format!("{} - {}", clinic.name, branding.product_name),
            },
            None => Self::neutral(branding),
        }
    }

    pub fn neutral(branding: &Branding) -> Self {
        Self {
            primary: None,
            accent: None,
            title: branding.default_title.clone(),
        }
    }

    pub fn is_branded(&self) -> bool {
        self.primary.is_some()
    }

    /// Custom properties for hosts that style through CSS variables.
    /// Empty when no clinic branding applies.
    pub fn css_properties(&self) -> Vec<(&'static str, String)> {
        let mut props = Vec::new();
        if let Some(primary) = &self.primary {
            props.push((PRIMARY_PROPERTY, primary.clone()));
        }
        if let Some(accent) = &self.accent {
            props.push((ACCENT_PROPERTY, accent.clone()));
        }
        props
    }
}
