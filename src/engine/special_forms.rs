//! Names of the special forms installed in the root environment.

pub const IF: &str = "if";
pub const DEFINE: &str = "define";
pub const LAMBDA: &str = "lambda";

/// Array of special form names, in registration order.
pub const SPECIAL_FORMS: &[&str] = &[IF, DEFINE, LAMBDA];

/// Checks if a given name is one of the built-in special forms.
///
/// Rebinding one of these names is allowed; this only reports the registry.
pub fn is_special_form(name: &str) -> bool {
    SPECIAL_FORMS.contains(&name)
}
