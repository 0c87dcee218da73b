use serde::{Deserialize, Serialize};

/// Stock photos substituted when a package carries no images of its own
pub const FALLBACK_IMAGES: [&str; 3] = [
    "https://images.pexels.com/photos/1578750/pexels-photo-1578750.jpeg?w=800&h=600&fit=crop",
    "https://images.pexels.com/photos/1118877/pexels-photo-1118877.jpeg?w=800&h=600&fit=crop",
    "https://images.pexels.com/photos/1029599/pexels-photo-1029599.jpeg?w=800&h=600&fit=crop",
];

/// A tour package as returned by the backend package search.
///
/// Field names follow the backend's JSON (camelCase); everything beyond
/// the scoring inputs is optional so older backend payloads still decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: String,
    pub title: String,
    pub destination: String,
    /// Trip length in days
    pub duration: u32,
    /// Price per head in PKR
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub max_travelers: Option<u32>,
    /// Completed bookings, used as a popularity signal
    #[serde(default)]
    pub bookings_count: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_name: Option<String>,
}

fn default_active() -> bool {
    true
}

/// A scored package, recomputed per request and never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecommendation {
    pub package_id: String,
    pub title: String,
    pub destination: String,
    pub duration: u32,
    pub price: f64,
    pub rating: f64,
    /// 0-100 match score, clamped
    pub match_score: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_reasons: Vec<String>,
    /// Guaranteed non-empty; see [`FALLBACK_IMAGES`]
    pub images: Vec<String>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_name: Option<String>,
}

impl PackageRecommendation {
    /// Build a recommendation from a candidate package and its score,
    /// substituting the fallback image list when the package has none.
    pub fn from_package(pkg: Package, match_score: u8, match_reasons: Vec<String>) -> Self {
        let images = if pkg.images.is_empty() {
            FALLBACK_IMAGES.iter().map(|s| s.to_string()).collect()
        } else {
            pkg.images
        };

        Self {
            package_id: pkg.id,
            title: pkg.title,
            destination: pkg.destination,
            duration: pkg.duration,
            price: pkg.price,
            rating: pkg.rating,
            match_score,
            match_reasons,
            images,
            includes: pkg.includes,
            description: pkg.description,
            agency_name: pkg.agency_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_package() -> Package {
        Package {
            id: "pkg_1".to_string(),
            title: "Hunza Explorer".to_string(),
            destination: "Hunza".to_string(),
            duration: 5,
            price: 25000.0,
            rating: 4.5,
            max_travelers: Some(12),
            bookings_count: 18,
            is_active: true,
            images: vec![],
            includes: vec!["Transport".to_string()],
            description: None,
            agency_name: None,
        }
    }

    #[test]
    fn test_image_fallback_applied() {
        let rec = PackageRecommendation::from_package(sample_package(), 80, vec![]);
        assert_eq!(rec.images.len(), 3);
        assert_eq!(rec.images[0], FALLBACK_IMAGES[0]);
    }

    #[test]
    fn test_existing_images_kept() {
        let mut pkg = sample_package();
        pkg.images = vec!["https://cdn.example.com/hunza.jpg".to_string()];
        let rec = PackageRecommendation::from_package(pkg, 80, vec![]);
        assert_eq!(rec.images.len(), 1);
    }

    #[test]
    fn test_decodes_minimal_backend_payload() {
        let pkg: Package = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "title": "Swat Getaway",
            "destination": "Swat",
            "duration": 3,
            "price": 15000.0
        }))
        .unwrap();
        assert!(pkg.is_active);
        assert_eq!(pkg.bookings_count, 0);
        assert!(pkg.images.is_empty());
    }
}
