//! Integration tests for the job outcome contract seen by presenters.
//!
//! Exercises the public re-exports only: error codes arriving as strings,
//! outcome classification and the serialized update format.

use storedl_core::{
    AuthErrorCode, BuildVersion, CancelReason, DownloadErrorCode, DownloadMode, ErrorCode,
    ErrorRecord, JobOutcome, JobUpdate, ProgressEvent, RemediationAction,
};

fn version() -> BuildVersion {
    BuildVersion::parse("1.29.1").unwrap()
}

#[test]
fn test_every_known_code_round_trips_through_strings() {
    let codes: Vec<ErrorCode> = AuthErrorCode::ALL
        .into_iter()
        .map(ErrorCode::from)
        .chain(DownloadErrorCode::ALL.into_iter().map(ErrorCode::from))
        .collect();

    assert_eq!(codes.len(), 13);
    for code in codes {
        assert_eq!(ErrorCode::parse(code.as_str()), code);
        assert_eq!(code.display_code(), code.as_str());
    }
}

#[test]
fn test_unknown_codes_always_have_a_displayable_code() {
    for raw in ["", "TOTALLY_NEW", "meta_login_failed"] {
        let code = ErrorCode::parse(raw);
        assert!(matches!(code, ErrorCode::Unknown(_)));
        assert_eq!(code.display_code(), "UNKNOWN_ERROR");
    }
}

#[test]
fn test_only_manifest_failures_carry_remediation() {
    let with_action: Vec<_> = DownloadErrorCode::ALL
        .into_iter()
        .filter(|c| ErrorCode::from(*c).remediation().is_some())
        .collect();
    assert_eq!(
        with_action,
        vec![
            DownloadErrorCode::UnableToGetManifest,
            DownloadErrorCode::ManifestFailed
        ]
    );
    assert!(
        AuthErrorCode::ALL
            .into_iter()
            .all(|c| ErrorCode::from(c).remediation().is_none())
    );
    assert_eq!(
        RemediationAction::ClaimDesktopVersion.as_str(),
        "claim-your-desktop-version"
    );
}

#[test]
fn test_soft_cancel_law() {
    for reason in [CancelReason::LoginClosed, CancelReason::DownloadStopped] {
        let outcome = JobOutcome::Cancelled { reason };
        assert!(outcome.notification().is_none());
        let record = outcome.into_result().unwrap_err();
        assert!(record.is_soft_cancel());
        assert_eq!(
            JobOutcome::from_error(record),
            JobOutcome::Cancelled { reason }
        );
    }
}

#[test]
fn test_update_wire_format() {
    let progress = JobUpdate::Progress(ProgressEvent::new(10, 100, version()));
    let json = serde_json::to_value(&progress).unwrap();
    assert_eq!(json["type"], "progress");
    assert_eq!(json["current"], 10);
    assert_eq!(json["version"], "1.29.1");

    let finished = JobUpdate::Finished(JobOutcome::Failed {
        error: ErrorRecord::new(DownloadErrorCode::ManifestFailed),
    });
    let json = serde_json::to_value(&finished).unwrap();
    assert_eq!(json["type"], "finished");
    assert_eq!(json["outcome"], "failed");
    assert_eq!(json["error"]["code"], "DOWNLOAD_MANIFEST_FAILED");

    let verified = JobUpdate::Finished(JobOutcome::Succeeded {
        version: version(),
        mode: DownloadMode::Verify,
    });
    let back: JobUpdate = serde_json::from_value(serde_json::to_value(&verified).unwrap()).unwrap();
    assert_eq!(back, verified);
}
