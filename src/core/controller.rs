use axum::http::StatusCode;
use crate::books::repository::LibraryHandle;
use crate::core::command::CommandError;

#[derive(Clone)]
pub struct AppState {
    pub library: LibraryHandle,
}

impl AppState {
    pub fn new(library: LibraryHandle) -> AppState {
        AppState {
            library,
        }
    }
}

pub type ServerError = (StatusCode, String);

pub fn json_to_server_error(err: serde_json::Error) -> ServerError {
    (StatusCode::BAD_REQUEST, format!("{}", err))
}

impl CommandError {
    pub fn message(&self) -> &str {
        match self {
            CommandError::Storage { message, .. } => { message }
            CommandError::DuplicateKey { message } => { message }
            CommandError::NotFound { message } => { message }
            CommandError::Upstream { message, .. } => { message }
            CommandError::Runtime { message, .. } => { message }
            CommandError::Serialization { message } => { message }
            CommandError::Validation { message, .. } => { message }
            CommandError::InvalidFormat { message } => { message }
        }
    }
}

impl From<CommandError> for ServerError {
    fn from(err: CommandError) -> Self {
        let status = match err {
            CommandError::Storage { .. } => { StatusCode::INTERNAL_SERVER_ERROR }
            CommandError::DuplicateKey { .. } => { StatusCode::CONFLICT }
            CommandError::NotFound { .. } => { StatusCode::NOT_FOUND }
            CommandError::Upstream { .. } => { StatusCode::BAD_GATEWAY }
            CommandError::Runtime { .. } => { StatusCode::INTERNAL_SERVER_ERROR }
            CommandError::Serialization { .. } => { StatusCode::INTERNAL_SERVER_ERROR }
            CommandError::Validation { .. } => { StatusCode::BAD_REQUEST }
            CommandError::InvalidFormat { .. } => { StatusCode::UNPROCESSABLE_ENTITY }
        };
        (status, err.message().to_string())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use crate::core::command::CommandError;
    use crate::core::controller::ServerError;

    #[tokio::test]
    async fn test_should_map_command_errors_to_status() {
        let cases = vec![
            (CommandError::Storage { message: "disk".to_string(), reason_code: None }, StatusCode::INTERNAL_SERVER_ERROR),
            (CommandError::DuplicateKey { message: "dup".to_string() }, StatusCode::CONFLICT),
            (CommandError::NotFound { message: "gone".to_string() }, StatusCode::NOT_FOUND),
            (CommandError::Upstream { message: "down".to_string(), reason_code: None }, StatusCode::BAD_GATEWAY),
            (CommandError::Validation { message: "empty".to_string(), reason_code: None }, StatusCode::BAD_REQUEST),
            (CommandError::InvalidFormat { message: "shape".to_string() }, StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (err, status) in cases {
            let expected = err.message().to_string();
            let (code, body): ServerError = err.into();
            assert_eq!(status, code);
            assert_eq!(expected, body);
        }
    }
}
