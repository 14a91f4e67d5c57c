// src/rules.rs
//! Natural-language rules handed to the perception engine.
//!
//! These strings are data: they can be tuned or localized without touching
//! the state machine, as long as the extraction rule keeps asking for
//! `{pageType, details}`.

use std::path::Path;

use crate::types::PersonalInfo;

pub const CLASSIFY_PAGE_RULE: &str = r#"
Analyze this webpage and determine its type. Return a JSON object with the following structure:
{"pageType": "job_detail" | "application_form" | "signin_page" | "job_not_found" | "other", "details": string}

Page type definitions:
- "job_detail": a page showing job information, description, requirements, company info
- "application_form": a page with form fields to fill out for a job application (name, email, resume upload, etc.)
- "signin_page": a page requiring login/authentication (LinkedIn, company portal, etc.)
- "job_not_found": a page indicating the job posting is no longer available, expired, removed, or a 404 for the job
- "other": any other page (error, redirect, company homepage, etc.)

In the details field, give a brief description of what you see on the page.

If the page content is in a language other than English and a Google Translate option or language
selector is visible, mention it in the details field so the page can be translated to English.

Example responses:
{"pageType": "job_detail", "details": "Job posting for Software Engineer at TechCorp with requirements and description"}
{"pageType": "signin_page", "details": "LinkedIn login page with email/password fields"}
{"pageType": "application_form", "details": "Application form with fields for personal info and resume upload"}
{"pageType": "job_not_found", "details": "Page shows 'This job is no longer available' or a 404 error"}
{"pageType": "other", "details": "Page in Spanish language, Google Translate button visible in top right"}

Only return valid JSON.
"#;

pub const TRANSLATE_PAGE_INSTRUCTION: &str =
    "Click on Google Translate or the language selector to translate the page to English";

pub const CLICK_APPLY_INSTRUCTION: &str =
    "Click a button that says 'Apply', 'Easy Apply', or 'Apply Now'";

pub const CLICK_CONTINUE_IF_PRESENT: &str = "Click on the continue button if there is one";

pub const OBSERVE_FORM_FIELDS: &str = "What form fields are available? List all input fields, \
     dropdowns, file uploads, and required information. Mention 'required' in the description \
     of every field that is marked as required.";

pub const OBSERVE_BUTTONS: &str = "What buttons are available? List all buttons and their labels. \
     If a label is not in English, add a short English translation in brackets (e.g. Weiter (Continue)).";

pub const OBSERVE_FORM_ERRORS: &str =
    "Are there any error messages or highlighted fields indicating form errors? List them.";

pub const OBSERVE_SUBMISSION_CONFIRMATION: &str = "Is there a message confirming that the \
     application was submitted successfully (e.g. 'Thank you for applying', 'Application received')? \
     List it, or return nothing if there is none.";

pub const SUBMIT_APPLICATION_RULE: &str = r#"Complete the job application submission by following these steps in order:

1. FIRST - look for and click one of these submission buttons (in order of preference):
   - "Submit Application" or "Submit"
   - "Apply Now" or "Apply"
   - "Send Application"
   - "Complete Application"
   - "Finish" or "Done"
   - "Continue" or "Next" (only if it is the final step)
   - "Proceed" or "Confirm"

2. The button should be prominently placed, primary colored and NOT disabled.

3. Different scenarios:
   - If a confirmation dialog appears, click "Yes" or "Confirm"
   - If there is an unchecked terms/privacy/agreement checkbox, check it first
   - If the button is disabled, look for missing required fields or errors

4. AVOID clicking:
   - "Cancel", "Back", "Previous", "Save Draft"
   - Social media share buttons
   - "Edit" or "Modify" buttons
   - Navigation buttons that don't submit

5. Also accept international variants:
   "Enviar" (Spanish), "Soumettre" (French), "Absenden" (German), "送信" (Japanese),
   "提交" (Chinese), "Отправить" (Russian), "Invio" (Italian), "Verzenden" (Dutch), "Skicka" (Swedish)

6. If there is no obvious submit button, click the most prominent call-to-action button.

Only click the button that will actually submit/complete the application."#;

/// Sign-in instruction. The password is only to be used when the page asks for one.
pub fn signin_instruction(info: &PersonalInfo, linkedin: bool) -> String {
    let password = if linkedin {
        info.linkedin_password.as_deref().or(info.password.as_deref())
    } else {
        info.password.as_deref()
    };

    let mut instruction = format!(
        "You are on a sign-in page. Sign in with the email \"{}\".",
        info.email
    );
    match password {
        Some(password) => instruction.push_str(&format!(
            " Only if the page requires a password, enter the password \"{}\". \
             If the page offers to continue with just an email, do that instead.",
            password
        )),
        None => instruction.push_str(" Continue with just the email; do not create an account."),
    }
    instruction
}

pub fn click_button_instruction(description: &str, selector: Option<&str>) -> String {
    match selector {
        Some(selector) => format!("Click on the button: {} (selector {})", description, selector),
        None => format!("Click on the button: {}", description),
    }
}

pub fn fix_error_instruction(description: &str, selector: Option<&str>) -> String {
    match selector {
        Some(selector) => format!("Fix the form error: {} with the selector {}", description, selector),
        None => format!("Fix the form error: {}", description),
    }
}

pub fn improvise_field_instruction(description: &str, info: &PersonalInfo) -> String {
    format!(
        "Fill in the form field \"{}\" appropriately using this applicant information: {}. \
         If nothing fits, choose the most reasonable option for a job applicant.",
        description,
        info.to_prompt_json()
    )
}

pub fn upload_resume_instruction(resume_path: &Path) -> String {
    format!(
        "Upload the file \"{}\" to the resume upload field. Look for file upload areas, dropzones, \
         or \"Choose File\" buttons related to resume or CV.",
        resume_path.display()
    )
}
