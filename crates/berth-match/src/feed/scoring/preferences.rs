use serde::{Deserialize, Serialize};

/// Static search preferences a member starts from. Learned preferences
/// override parts of this at scoring time; these bounds also drive the hard
/// filters that sink listings outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPreferences {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub preferred_countries: Vec<String>,
    pub preferred_brands: Vec<String>,
    pub disliked_brands: Vec<String>,
    pub min_length: Option<f64>,
    pub max_length: Option<f64>,
    pub min_cabins: Option<u32>,
    pub min_baths: Option<u32>,
    pub min_year: Option<i32>,
    pub include_charter: bool,
    pub exclude_sold: bool,
    pub prefer_video: bool,
    pub prefer_360_images: bool,
}

impl Default for SearchPreferences {
    fn default() -> Self {
        Self {
            min_price: None,
            max_price: Some(5_000_000.0),
            preferred_countries: vec![
                "Italy".to_string(),
                "France".to_string(),
                "Monaco".to_string(),
                "Croatia".to_string(),
            ],
            preferred_brands: vec![
                "Azimut".to_string(),
                "Riva".to_string(),
                "Sunseeker".to_string(),
                "Ferretti".to_string(),
                "Sanlorenzo".to_string(),
            ],
            disliked_brands: Vec::new(),
            min_length: Some(15.0),
            max_length: None,
            min_cabins: None,
            min_baths: None,
            min_year: None,
            include_charter: false,
            exclude_sold: true,
            prefer_video: true,
            prefer_360_images: true,
        }
    }
}
