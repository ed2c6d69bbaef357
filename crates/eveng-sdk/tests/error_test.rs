// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error type tests for eveng-sdk.

use eveng_sdk::{Edition, HttpError, SdkError};

#[test]
fn test_config_error_display() {
    let err = SdkError::Config("base URL is empty".to_string());
    assert!(err.to_string().contains("configuration error"));
    assert!(err.to_string().contains("base URL is empty"));
}

#[test]
fn test_transport_error_display() {
    let err = SdkError::Transport {
        attempts: 5,
        message: "connection refused".to_string(),
    };
    let display = err.to_string();
    assert!(display.contains("5 attempt"));
    assert!(display.contains("connection refused"));
}

#[test]
fn test_application_error_display() {
    let err = SdkError::Application {
        http_status: 200,
        code: 400,
        message: "Lab already exists (20008).".to_string(),
    };
    let display = err.to_string();
    assert!(display.contains("server error"));
    assert!(display.contains("400"));
    assert!(display.contains("20008"));
    assert_eq!(err.http_status(), Some(200));
}

#[test]
fn test_client_rejected_display() {
    let err = SdkError::ClientRejected {
        http_status: 404,
        code: 404,
        message: "Lab does not exist (20024).".to_string(),
    };
    assert!(err.to_string().contains("request rejected"));
    assert_eq!(err.http_status(), Some(404));
    assert!(!err.is_local());
}

#[test]
fn test_decode_error_keeps_status_text() {
    let err = SdkError::Decode {
        http_status: 502,
        status_text: "Bad Gateway".to_string(),
        reason: "expected value at line 1 column 1".to_string(),
    };
    let display = err.to_string();
    assert!(display.contains("502"));
    assert!(display.contains("Bad Gateway"));
    assert_eq!(err.http_status(), Some(502));
}

#[test]
fn test_capability_error_display() {
    let err = SdkError::Capability {
        operation: "interface styling",
        required: Edition::Pro,
    };
    assert_eq!(err.to_string(), "interface styling requires the Pro edition");
    assert!(err.is_local());
    assert_eq!(err.http_status(), None);
}

#[test]
fn test_authentication_error_display() {
    let err = SdkError::Authentication("Invalid username/password (90014).".to_string());
    assert!(err.to_string().contains("authentication failed"));
    assert!(err.to_string().contains("90014"));
}

#[test]
fn test_interface_not_found_display() {
    let err = SdkError::InterfaceNotFound("Gi0/9".to_string());
    assert!(err.to_string().contains("interface not found"));
    assert!(err.to_string().contains("Gi0/9"));
}

#[test]
fn test_from_http_error() {
    assert!(matches!(
        SdkError::from(HttpError::Cancelled),
        SdkError::Cancelled
    ));
    assert!(matches!(
        SdkError::from(HttpError::DeadlineExceeded),
        SdkError::DeadlineExceeded
    ));
    assert!(matches!(
        SdkError::from(HttpError::Transport("reset".to_string())),
        SdkError::Transport { attempts: 1, .. }
    ));
}

#[test]
fn test_from_serde_error() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: SdkError = json_err.into();
    assert!(matches!(err, SdkError::Serialization(_)));
}
