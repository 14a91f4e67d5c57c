// src/applier/mapping.rs
use crate::types::PersonalInfo;

/// A fill rule selected by keyword match against an observed field description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// Lowercase phrases; any one appearing in the description selects the entry
    pub keywords: &'static [&'static str],
    pub label: &'static str,
    pub instruction: String,
}

impl FieldMapping {
    fn new(keywords: &'static [&'static str], label: &'static str, instruction: String) -> Self {
        Self {
            keywords,
            label,
            instruction,
        }
    }

    pub fn matches(&self, description: &str) -> bool {
        crate::utils::contains_word(description, self.keywords)
    }
}

/// First entry in table order whose keywords match `description` as whole words, case-insensitively.
pub fn find_mapping<'a>(mappings: &'a [FieldMapping], description: &str) -> Option<&'a FieldMapping> {
    mappings.iter().find(|mapping| mapping.matches(description))
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Build the ordered fill table for `info`. Entries whose value the applicant
/// has not provided are left out, so those fields fall through to improvisation.
pub fn build_field_mappings(info: &PersonalInfo) -> Vec<FieldMapping> {
    let mut mappings = Vec::new();

    if !info.first_name.trim().is_empty() {
        mappings.push(FieldMapping::new(
            &["first name", "firstname", "given name"],
            "First Name",
            format!("Fill in the first name field with \"{}\"", info.first_name),
        ));
    }

    if !info.last_name.trim().is_empty() {
        mappings.push(FieldMapping::new(
            &["last name", "lastname", "surname", "family name"],
            "Last Name",
            format!("Fill in the last name field with \"{}\"", info.last_name),
        ));
    }

    let full_name = info.full_name();
    if !full_name.is_empty() {
        mappings.push(FieldMapping::new(
            &["full name", "your name", "legal name"],
            "Full Name",
            format!("Fill in the full name field with \"{}\"", full_name),
        ));
    }

    if !info.email.trim().is_empty() {
        mappings.push(FieldMapping::new(
            &["email", "e-mail"],
            "Email",
            format!("Fill in the email field with \"{}\"", info.email),
        ));
    }

    if !info.phone.trim().is_empty() {
        let mut instruction = format!("Fill in the phone number field with \"{}\".", info.phone);
        if let (Some(code), Some(local)) = (
            present(&info.country_code),
            present(&info.phone_without_country_code),
        ) {
            instruction.push_str(&format!(
                " If there's a country code dropdown and it is not set to {code}, select {code} first, \
                 then fill the phone number field with {local}. \
                 If the field doesn't accept that, try the full number {}.",
                info.phone
            ));
        }
        mappings.push(FieldMapping::new(
            &["phone", "telephone", "mobile", "cell", "country code", "dial code"],
            "Phone Number",
            instruction,
        ));
    }

    if let Some(url) = present(&info.linkedin_url) {
        mappings.push(FieldMapping::new(
            &["linkedin"],
            "LinkedIn URL",
            format!("Fill in the LinkedIn URL field with \"{}\"", url),
        ));
    }

    if let Some(url) = present(&info.github_url) {
        mappings.push(FieldMapping::new(
            &["github"],
            "GitHub URL",
            format!("Fill in the GitHub URL field with \"{}\"", url),
        ));
    }

    if let Some(url) = present(&info.portfolio_url) {
        mappings.push(FieldMapping::new(
            &["portfolio", "website", "personal site"],
            "Portfolio URL",
            format!("Fill in the portfolio/website field with \"{}\"", url),
        ));
    }

    if let Some(country) = present(&info.country) {
        mappings.push(FieldMapping::new(
            &["country", "nationality"],
            "Country",
            format!("Fill in the country field with \"{}\"", country),
        ));
    }

    if let Some(city) = present(&info.city) {
        mappings.push(FieldMapping::new(
            &["city", "location", "current city"],
            "City",
            format!("Fill in the city field with \"{}\"", city),
        ));
    }

    if !info.salary_expectations.is_empty() {
        let amounts = info
            .salary_expectations
            .iter()
            .map(|(currency, amount)| format!("{} {}", amount, currency))
            .collect::<Vec<_>>()
            .join(", ");
        mappings.push(FieldMapping::new(
            &["salary", "compensation", "expected pay"],
            "Salary Expectation",
            format!(
                "Fill in the salary expectation field. Use the amount in the currency the field asks for: {}",
                amounts
            ),
        ));
    }

    if let Some(level) = present(&info.experience_level) {
        mappings.push(FieldMapping::new(
            &["years of experience", "experience level", "seniority"],
            "Experience Level",
            format!("Fill in the experience field with \"{}\"", level),
        ));
    }

    if let Some(level) = present(&info.education_level) {
        mappings.push(FieldMapping::new(
            &["education", "degree", "highest level"],
            "Education Level",
            format!("Fill in the education field with \"{}\"", level),
        ));
    }

    if !info.skills.is_empty() {
        mappings.push(FieldMapping::new(
            &["skills"],
            "Skills",
            format!("Fill in the skills field with \"{}\"", info.skills.join(", ")),
        ));
    }

    mappings
}
