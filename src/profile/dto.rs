use serde::{Deserialize, Serialize};

/// Form fields accepted by the profile editor.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub grade: Option<String>,
    pub graduation_year: Option<String>,
    pub nationality: Option<String>,
    pub university: Option<String>,
}

/// JSON result of a profile mutation.
#[derive(Debug, Serialize)]
pub struct UpdateResult {
    pub success: bool,
    pub message: String,
}

/// JSON result of an avatar upload. `image_url` points at the endpoint
/// serving the stored image.
#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub success: bool,
    pub image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_result_serialization() {
        let result = UpdateResult {
            success: true,
            message: "Profile updated successfully!".into(),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("Profile updated successfully!"));
    }

    #[test]
    fn upload_result_serialization() {
        let result = UploadResult {
            success: true,
            image_url: "/profile_image".into(),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"image_url\":\"/profile_image\""));
    }
}
