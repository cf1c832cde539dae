// Path validation (runs before anything is spawned)

use std::path::Path;

use crate::domain::ValidationError;

/// Confirm a regular file exists at `path`.
/// Directories and dangling symlinks count as missing.
pub fn validate_file_path(path: &Path) -> Result<(), ValidationError> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => Ok(()),
        _ => Err(ValidationError::FileNotFound(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_file_passes() {
        let exe = std::env::current_exe().unwrap();
        assert!(validate_file_path(&exe).is_ok());
    }

    #[test]
    fn test_missing_file_carries_path() {
        let path = Path::new("/definitely/not/here/tool");

        assert_eq!(
            validate_file_path(path),
            Err(ValidationError::FileNotFound(path.to_path_buf()))
        );
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = std::env::temp_dir();
        assert!(matches!(
            validate_file_path(&dir),
            Err(ValidationError::FileNotFound(_))
        ));
    }
}
