// src/applier/tests.rs
use std::sync::Arc;

use super::testing::{applicant, elements, fixture, fixture_with, job, page, FakePort, RecordingAudit};
use super::{JobApplier, UploadTier};
use crate::config::ApplierSettings;
use crate::perception::{FileInput, FileTarget};
use crate::rules;
use crate::types::{PageType, PersonalInfo, ProcessingStatus};

const SUBMIT_MARKER: &str = "Complete the job application submission";

fn settings(max_retries: u32) -> ApplierSettings {
    ApplierSettings {
        max_retries,
        ..Default::default()
    }
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A single-page form holding `fields` that confirms on the first submit.
fn single_page_form(fields: &[&str]) -> FakePort {
    FakePort::new()
        .extraction(page("application_form", "Application form with personal details"))
        .observation(rules::OBSERVE_FORM_FIELDS, elements(fields))
        .observation(rules::OBSERVE_BUTTONS, elements(&["Submit application"]))
        .observation(
            rules::OBSERVE_SUBMISSION_CONFIRMATION,
            elements(&["Thank you for applying"]),
        )
}

#[tokio::test]
async fn test_application_form_submitted_in_one_pass() {
    let (applier, port, audit) = fixture(single_page_form(&["Email (required)"]));

    let result = applier.process(&job()).await;

    assert_eq!(result.status, ProcessingStatus::Success);
    assert_eq!(result.fields_filled, labels(&["Email"]));
    assert_eq!(result.attempts, 1);
    assert_eq!(result.message, "submitted");
    assert_eq!(result.description, "Application form with personal details");
    assert_eq!(result.last_screenshot.as_deref(), Some(std::path::Path::new("success.png")));
    assert_eq!(port.navigation_count(), 1);
    assert_eq!(port.acts_containing(SUBMIT_MARKER), 1);
    assert_eq!(audit.count("application_completed"), 1);
    assert_eq!(audit.count("success"), 1);
}

#[tokio::test]
async fn test_job_not_found_is_skipped_without_retry() {
    let port = FakePort::new().always_extract(page(
        "job_not_found",
        "This job is no longer available",
    ));
    let (applier, port, audit) = fixture_with(port, settings(3));

    let result = applier.process(&job()).await;

    assert_eq!(result.status, ProcessingStatus::Skipped);
    assert!(result.message.contains("no longer available"));
    assert_eq!(result.attempts, 1);
    assert_eq!(port.navigation_count(), 1);
    assert_eq!(audit.count("job_not_found"), 1);
    assert_eq!(audit.count("skipped"), 1);
}

#[tokio::test]
async fn test_classify_translates_foreign_page() {
    let port = FakePort::new()
        .extraction(page("other", "Page in German language, Google Translate button visible"))
        .extraction(page("job_detail", "Senior Rust Engineer posting"));
    let (applier, port, _) = fixture(port);

    let classification = applier.classify().await.unwrap();

    assert_eq!(classification.page_type, PageType::JobDetail);
    assert_eq!(classification.details, "Senior Rust Engineer posting");
    assert_eq!(port.acts_containing("Google Translate"), 1);
    assert_eq!(*port.extract_calls.lock().unwrap(), 2);
}

#[tokio::test]
async fn test_classify_keeps_original_when_translation_fails() {
    let port = FakePort::new()
        .extraction(page("other", "Page in German language, Google Translate button visible"))
        .fail_act("Google Translate");
    let (applier, port, _) = fixture(port);

    let classification = applier.classify().await.unwrap();

    assert_eq!(classification.page_type, PageType::Other);
    assert!(classification.details.contains("German"));
    assert_eq!(*port.extract_calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_retryable_outcome_is_bounded() {
    let port = FakePort::new().always_extract(page("other", "Company homepage"));
    let (applier, port, audit) = fixture_with(port, settings(2));

    let result = applier.process(&job()).await;

    assert_eq!(result.status, ProcessingStatus::Skipped);
    assert_eq!(result.attempts, 3);
    assert_eq!(result.message, "Unrecognized page: Company homepage");
    assert_eq!(port.navigation_count(), 3);
    assert_eq!(audit.count("unknown_page"), 3);
}

#[tokio::test]
async fn test_navigation_failure_ends_in_error() {
    let port = FakePort::new().fail_navigation("net::ERR_NAME_NOT_RESOLVED");
    let (applier, port, audit) = fixture_with(port, settings(1));

    let result = applier.process(&job()).await;

    assert_eq!(result.status, ProcessingStatus::Error);
    assert_eq!(result.attempts, 2);
    assert!(result.message.contains("ERR_NAME_NOT_RESOLVED"));
    assert_eq!(port.navigation_count(), 2);
    assert_eq!(audit.count("error"), 2);
}

#[tokio::test]
async fn test_unparseable_classification_is_an_error() {
    let port = FakePort::new().always_extract("I am not sure what this page is".to_string());
    let (applier, _, _) = fixture_with(port, settings(0));

    let result = applier.process(&job()).await;

    assert_eq!(result.status, ProcessingStatus::Error);
    assert_eq!(result.attempts, 1);
    assert!(result.message.contains("not a JSON object"));
}

#[tokio::test]
async fn test_multi_step_form_merges_fields_in_order() {
    let port = FakePort::new()
        .extraction(page("application_form", "Step 1 of 2"))
        .extraction(page("application_form", "Step 2 of 2"))
        .observation(
            rules::OBSERVE_FORM_FIELDS,
            elements(&["First name (required)", "Email (required)"]),
        )
        .observation(
            rules::OBSERVE_FORM_FIELDS,
            elements(&["Email (required)", "City (required)"]),
        )
        .observation(rules::OBSERVE_BUTTONS, elements(&["Back", "Continue"]))
        .observation(rules::OBSERVE_BUTTONS, elements(&["Submit"]))
        .observation(
            rules::OBSERVE_SUBMISSION_CONFIRMATION,
            elements(&["Application received"]),
        );
    let (applier, port, audit) = fixture(port);

    let result = applier.process(&job()).await;

    assert_eq!(result.status, ProcessingStatus::Success);
    assert_eq!(result.fields_filled, labels(&["First Name", "Email", "City"]));
    assert_eq!(port.acts_containing("Click on the button: Continue"), 1);
    assert_eq!(port.acts_containing(SUBMIT_MARKER), 1);
    assert_eq!(audit.count("application_completed"), 2);
}

#[tokio::test]
async fn test_signin_then_apply_then_form() {
    let port = FakePort::new()
        .extraction(page("signin_page", "LinkedIn login page with email field"))
        .extraction(page("job_detail", "Rust Engineer at Acme"))
        .extraction(page("application_form", "Easy Apply form"))
        .observation(rules::OBSERVE_FORM_FIELDS, elements(&["Phone (required)"]))
        .observation(
            rules::OBSERVE_SUBMISSION_CONFIRMATION,
            elements(&["Your application was sent"]),
        );
    let (applier, port, _) = fixture(port);

    let result = applier.process(&job()).await;

    assert_eq!(result.status, ProcessingStatus::Success);
    assert_eq!(result.fields_filled, labels(&["Phone Number"]));
    assert_eq!(result.description, "LinkedIn login page with email field");
    assert_eq!(port.acts_containing("You are on a sign-in page"), 1);
    assert_eq!(port.acts_containing(rules::CLICK_CONTINUE_IF_PRESENT), 1);
    assert_eq!(port.acts_containing(rules::CLICK_APPLY_INSTRUCTION), 1);
}

#[tokio::test]
async fn test_signin_continue_click_failure_is_ignored() {
    let port = FakePort::new()
        .extraction(page("signin_page", "Careers portal login"))
        .extraction(page("job_not_found", "Posting removed"))
        .fail_act(rules::CLICK_CONTINUE_IF_PRESENT);
    let (applier, _, _) = fixture_with(port, settings(0));

    let result = applier.process(&job()).await;

    assert_eq!(result.status, ProcessingStatus::Skipped);
    assert_eq!(result.message, "Job not found or expired: Posting removed");
}

#[tokio::test]
async fn test_page_depth_is_bounded() {
    let port = FakePort::new().always_extract(page("signin_page", "Company portal login"));
    let bounded = ApplierSettings {
        max_retries: 0,
        max_page_depth: 3,
        ..Default::default()
    };
    let (applier, port, _) = fixture_with(port, bounded);

    let result = applier.process(&job()).await;

    assert_eq!(result.status, ProcessingStatus::Skipped);
    assert_eq!(result.message, "Page did not stabilize after 3 transitions");
    assert_eq!(port.acts_containing("You are on a sign-in page"), 4);
    assert_eq!(*port.extract_calls.lock().unwrap(), 5);
}

#[tokio::test]
async fn test_unconfirmed_submission_is_not_retried() {
    let port = FakePort::new()
        .always_extract(page("application_form", "Single page form"))
        .observation(rules::OBSERVE_FORM_FIELDS, elements(&["Email (required)"]));
    let bounded = ApplierSettings {
        max_retries: 2,
        max_submit_attempts: 2,
        ..Default::default()
    };
    let (applier, port, audit) = fixture_with(port, bounded);

    let result = applier.process(&job()).await;

    assert_eq!(result.status, ProcessingStatus::Skipped);
    assert!(result.message.contains("not confirmed"));
    assert_eq!(result.fields_filled, labels(&["Email"]));
    assert_eq!(port.navigation_count(), 1);
    assert_eq!(port.acts_containing(SUBMIT_MARKER), 2);
    assert_eq!(port.observe_count(rules::OBSERVE_SUBMISSION_CONFIRMATION), 2);
    assert_eq!(audit.count("application_failed"), 1);
}

#[tokio::test]
async fn test_form_errors_are_fixed_before_submitting() {
    let port = single_page_form(&["Email (required)"]).observation(
        rules::OBSERVE_FORM_ERRORS,
        vec![crate::perception::ObservedElement::new("Email is invalid").with_selector("#email")],
    );
    let (applier, port, _) = fixture(port);

    let result = applier.process(&job()).await;

    assert_eq!(result.status, ProcessingStatus::Success);
    assert_eq!(
        port.acts_containing("Fix the form error: Email is invalid with the selector #email"),
        1
    );
}

#[tokio::test]
async fn test_profile_field_is_filled_not_uploaded() {
    let port = Arc::new(single_page_form(&["LinkedIn Profile URL (required)", "Email (required)"]));
    let info = PersonalInfo {
        linkedin_url: Some("https://linkedin.com/in/ada".to_string()),
        ..applicant()
    };
    let applier = JobApplier::new(
        port.clone(),
        Arc::new(RecordingAudit::default()),
        info,
        ApplierSettings::default().without_delays(),
    );

    let result = applier.process(&job()).await;

    assert_eq!(result.status, ProcessingStatus::Success);
    assert_eq!(result.fields_filled, labels(&["LinkedIn URL", "Email"]));
    assert!(port.acts_containing("https://linkedin.com/in/ada") >= 1);
    assert!(port.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_optional_fields_are_skipped() {
    let (applier, port, _) = fixture(single_page_form(&["Cover letter", "Email (required)"]));

    let result = applier.process(&job()).await;

    assert_eq!(result.fields_filled, labels(&["Email"]));
    assert_eq!(port.acts_containing("Cover letter"), 0);
}

#[tokio::test]
async fn test_unmapped_required_field_is_improvised() {
    let question = "Why do you want to work here? (required)";
    let (applier, port, _) = fixture(single_page_form(&[question]));

    let result = applier.process(&job()).await;

    assert_eq!(result.status, ProcessingStatus::Success);
    assert_eq!(result.fields_filled, labels(&[question]));
    assert!(port.acts_containing("Fill in the form field") >= 1);
}

#[tokio::test]
async fn test_custom_required_predicate() {
    let port = Arc::new(single_page_form(&["Cover letter", "Email"]));
    let audit = Arc::new(RecordingAudit::default());
    let applier = JobApplier::new(
        port.clone(),
        audit,
        applicant(),
        ApplierSettings::default().without_delays(),
    )
    .with_required_predicate(|_| true);

    let result = applier.process(&job()).await;

    assert_eq!(result.fields_filled, labels(&["Cover letter", "Email"]));
}

#[tokio::test]
async fn test_apply_click_failure_is_retryable() {
    let port = FakePort::new()
        .always_extract(page("job_detail", "Rust Engineer at Acme"))
        .fail_act(rules::CLICK_APPLY_INSTRUCTION);
    let (applier, port, _) = fixture_with(port, settings(1));

    let result = applier.process(&job()).await;

    assert_eq!(result.status, ProcessingStatus::Skipped);
    assert_eq!(result.attempts, 2);
    assert!(result.message.starts_with("Failed to click Apply"));
    assert_eq!(port.navigation_count(), 2);
}

#[tokio::test]
async fn test_resume_upload_falls_back_to_instruction() {
    let port = FakePort::new()
        .fail_upload(FileTarget::Selector("#resume-upload".to_string()))
        .fail_upload(FileTarget::TestId("ResumeField".to_string()))
        .fail_upload(FileTarget::AcceptsPdf);
    let (applier, port, audit) = fixture(port);
    let fields = vec![
        crate::perception::ObservedElement::new("Upload resume (required)")
            .with_selector("#resume-upload"),
    ];

    let tier = applier.upload_resume(&job(), &fields).await;

    assert_eq!(tier, Some(UploadTier::Instruction));
    assert_eq!(
        *port.uploads.lock().unwrap(),
        vec![
            FileTarget::Selector("#resume-upload".to_string()),
            FileTarget::TestId("ResumeField".to_string()),
            FileTarget::AcceptsPdf,
        ]
    );
    assert_eq!(port.acts_containing("Upload the file"), 1);
    assert_eq!(*port.file_input_scans.lock().unwrap(), 0);
    assert_eq!(audit.count("resume_upload_tier_4"), 1);
}

#[tokio::test]
async fn test_resume_upload_uses_observed_selector_first() {
    let (applier, port, _) = fixture(FakePort::new());
    let fields = vec![crate::perception::ObservedElement::new("Resume/CV").with_selector("#resume")];

    let tier = applier.upload_resume(&job(), &fields).await;

    assert_eq!(tier, Some(UploadTier::ObservedSelector));
    assert_eq!(
        *port.uploads.lock().unwrap(),
        vec![FileTarget::Selector("#resume".to_string())]
    );
}

#[tokio::test]
async fn test_resume_upload_scan_prefers_matching_context() {
    let port = FakePort::new()
        .fail_upload(FileTarget::TestId("ResumeField".to_string()))
        .fail_upload(FileTarget::AcceptsPdf)
        .fail_act("Upload the file")
        .with_file_inputs(vec![
            FileInput {
                index: 0,
                context_text: Some("Cover letter".to_string()),
            },
            FileInput {
                index: 1,
                context_text: Some("Attach your CV".to_string()),
            },
        ]);
    let (applier, port, _) = fixture(port);

    let tier = applier.upload_resume(&job(), &elements(&["Upload resume"])).await;

    assert_eq!(tier, Some(UploadTier::FileInputScan));
    assert_eq!(port.uploads.lock().unwrap().last(), Some(&FileTarget::Index(1)));
}

#[tokio::test]
async fn test_resume_upload_without_path_is_skipped() {
    let port = Arc::new(FakePort::new());
    let audit = Arc::new(RecordingAudit::default());
    let info = PersonalInfo {
        resume_path: None,
        ..applicant()
    };
    let applier = JobApplier::new(
        port.clone(),
        audit.clone(),
        info,
        ApplierSettings::default().without_delays(),
    );

    let tier = applier.upload_resume(&job(), &elements(&["Upload resume"])).await;

    assert_eq!(tier, None);
    assert!(port.uploads.lock().unwrap().is_empty());
    assert!(audit.tags.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_resume_upload_counts_once_per_pass() {
    let (applier, port, _) = fixture(single_page_form(&[
        "Upload resume (required)",
        "Attach file (optional)",
        "Email (required)",
    ]));

    let result = applier.process(&job()).await;

    assert_eq!(result.fields_filled, labels(&["Resume Upload", "Email"]));
    assert_eq!(
        *port.uploads.lock().unwrap(),
        vec![FileTarget::TestId("ResumeField".to_string())]
    );
}
