/*!
 * Tests for error types and conversions
 */

use bilisubdl::errors::{ApiError, AppError, SubtitleError};
use bilisubdl::subtitle_processor::CueDocument;

#[test]
fn test_apiError_requestFailed_shouldDisplayCorrectly() {
    let error = ApiError::RequestFailed("Connection timeout".to_string());
    let display = format!("{}", error);
    assert!(display.contains("API request failed"));
    assert!(display.contains("Connection timeout"));
}

#[test]
fn test_apiError_httpStatus_shouldDisplayStatusCode() {
    let error = ApiError::HttpStatus { status_code: 503 };
    assert_eq!(format!("{}", error), "http error 503");
}

#[test]
fn test_apiError_api_shouldDisplayCodeAndMessage() {
    let error = ApiError::Api { code: -404, message: "not found".to_string() };
    let display = format!("{}", error);
    assert!(display.contains("-404"));
    assert!(display.contains("not found"));
}

#[test]
fn test_subtitleError_fromSerde_shouldWrapDecodeError() {
    let error = CueDocument::from_json(b"[1,2").unwrap_err();
    assert!(matches!(error, SubtitleError::Decode(_)));
    assert!(format!("{}", error).contains("Failed to decode subtitle payload"));
}

#[test]
fn test_appError_fromApiError_shouldConvert() {
    let app_error: AppError = ApiError::HttpStatus { status_code: 404 }.into();
    assert!(matches!(app_error, AppError::Api(ApiError::HttpStatus { status_code: 404 })));
    assert!(format!("{}", app_error).contains("API error"));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let app_error: AppError = io_error.into();
    assert!(matches!(app_error, AppError::File(_)));
}

#[test]
fn test_appError_fromAnyhow_shouldKeepMessage() {
    let app_error: AppError = anyhow::anyhow!("something odd").into();
    match app_error {
        AppError::Unknown(message) => assert_eq!(message, "something odd"),
        other => panic!("unexpected error: {:?}", other),
    }
}
