//! Sign-up credential checks.
//!
//! The identity provider itself stays external; these are the pre-flight
//! checks the registration flow runs before handing credentials over. Each
//! check returns the list of problems found, empty when the input is
//! acceptable.

const MIN_PASSWORD_LENGTH: usize = 6;

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

pub fn verify_email(email: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if email.trim().is_empty() {
        problems.push("Email is required.".to_string());
    } else if !is_valid_email(email) {
        problems.push("Email address is not valid.".to_string());
    }
    problems
}

pub fn verify_password(password: &str, confirmation: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if password.len() < MIN_PASSWORD_LENGTH {
        problems.push(format!(
            "Password must be at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }
    if password != confirmation {
        problems.push("Passwords do not match.".to_string());
    }
    problems
}

/// Every problem with the whole registration form, email first.
pub fn check_user_details(email: &str, password: &str, confirmation: &str) -> Vec<String> {
    let mut problems = verify_email(email);
    problems.extend(verify_password(password, confirmation));
    problems
}
