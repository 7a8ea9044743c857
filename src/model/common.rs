use chrono::{DateTime, Utc};
use uuid::Uuid;

pub type Id = String;

pub type Timestamp = DateTime<Utc>;

const PROJECT_CODE_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const PROJECT_CODE_LEN: usize = 5;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// Short alphanumeric code that addresses a project on the mock-serving route
pub fn generate_project_code() -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(PROJECT_CODE_LEN)
        .map(|byte| PROJECT_CODE_CHARSET[*byte as usize % PROJECT_CODE_CHARSET.len()] as char)
        .collect()
}

pub fn now() -> Timestamp {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_code_shape() {
        for _ in 0..100 {
            let code = generate_project_code();
            assert_eq!(code.len(), PROJECT_CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(generate_id(), generate_id());
    }
}
