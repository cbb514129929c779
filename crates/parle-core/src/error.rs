use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Grammar error: {0}")]
    Grammar(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Extension not found: {0}")]
    ExtensionNotFound(String),

    #[error("Extension already registered: {0}")]
    DuplicateExtension(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("IO error"));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn test_error_display_json() {
        let json_err = serde_json::from_str::<String>("not valid json").unwrap_err();
        let err = Error::Json(json_err);
        assert!(err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_error_display_grammar() {
        let err = Error::Grammar("unexpected end of document".to_string());
        assert_eq!(err.to_string(), "Grammar error: unexpected end of document");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Config error: missing field");
    }

    #[test]
    fn test_error_display_extension_not_found() {
        let err = Error::ExtensionNotFound("meteo".to_string());
        assert_eq!(err.to_string(), "Extension not found: meteo");
    }

    #[test]
    fn test_error_display_duplicate_extension() {
        let err = Error::DuplicateExtension("meteo".to_string());
        assert_eq!(err.to_string(), "Extension already registered: meteo");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<i32>("\"not a number\"").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
