#[derive(Debug)]
pub enum AppError {
    Storage(sqlx::Error),
    Export(String),
    Parse(String),
    Validation(String),
    Config(String),
    Io(std::io::Error),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Storage(err) => write!(f, "Storage Error: {err}"),
            AppError::Export(msg) => write!(f, "Export Error: {msg}"),
            AppError::Parse(msg) => write!(f, "Parse Error: {msg}"),
            AppError::Validation(msg) => write!(f, "Validation Error: {msg}"),
            AppError::Config(msg) => write!(f, "Config Error: {msg}"),
            AppError::Io(err) => write!(f, "IO Error: {err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Storage(err) => Some(err),
            AppError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Export(err.to_string())
    }
}

impl From<calamine::XlsxError> for AppError {
    fn from(err: calamine::XlsxError) -> Self {
        AppError::Parse(err.to_string())
    }
}
