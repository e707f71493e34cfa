use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Raw body of a contact-form post.
///
/// Every field is optional here; [`Submission::try_from`] decides what is
/// actually required. Scalar JSON values (numbers, booleans) are accepted and
/// converted to their string form, so a phone number posted as `5551234`
/// survives. Falsy values (`null`, `false`, `0` and `""`) count as absent.
///
/// # Examples
///
/// ```
/// use formrelay_core::FormInput;
///
/// let input: FormInput = serde_json::from_value(serde_json::json!({
///     "name": "Ada",
///     "company": "Analytical Engines",
///     "email": "ada@example.com",
///     "phone": 5551234
/// }))
/// .unwrap();
/// assert_eq!(input.phone.as_deref(), Some("5551234"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FormInput {
    /// Contact person's name.
    #[serde(default, deserialize_with = "text_field")]
    pub name: Option<String>,
    /// Company the contact works for.
    #[serde(default, deserialize_with = "text_field")]
    pub company: Option<String>,
    /// Address the sales team should reply to.
    #[serde(default, deserialize_with = "text_field")]
    pub email: Option<String>,
    /// Optional phone number.
    #[serde(default, deserialize_with = "text_field")]
    pub phone: Option<String>,
}

fn text_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null | Value::Bool(false)) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) if is_zero(&n) => None,
        Some(other) => Some(other.to_string()),
    })
}

fn is_zero(n: &serde_json::Number) -> bool {
    n.as_f64()
        .is_some_and(|f| f.classify() == std::num::FpCategory::Zero)
}

/// A validated contact request.
///
/// Fields are private: once constructed a submission cannot change, and it is
/// dropped as soon as the response is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    name: String,
    company: String,
    email: String,
    phone: Option<String>,
}

/// The submission is missing one or more required fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("name, company and email are required (missing: {})", .missing.join(", "))]
pub struct ValidationError {
    missing: Vec<&'static str>,
}

impl ValidationError {
    /// Names of the required fields that were absent or empty, in form order.
    pub fn missing_fields(&self) -> &[&'static str] {
        &self.missing
    }
}

impl Submission {
    /// Build a submission, rejecting empty required fields.
    ///
    /// No format checks are applied: any non-empty string is accepted for
    /// every field. An empty `phone` is treated as not provided.
    pub fn new(
        name: impl Into<String>,
        company: impl Into<String>,
        email: impl Into<String>,
        phone: Option<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let company = company.into();
        let email = email.into();

        let missing: Vec<&'static str> = [("name", &name), ("company", &company), ("email", &email)]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(field, _)| field)
            .collect();

        if !missing.is_empty() {
            return Err(ValidationError { missing });
        }

        Ok(Self {
            name,
            company,
            email,
            phone: phone.filter(|p| !p.is_empty()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

impl TryFrom<FormInput> for Submission {
    type Error = ValidationError;

    fn try_from(input: FormInput) -> Result<Self, Self::Error> {
        Self::new(
            input.name.unwrap_or_default(),
            input.company.unwrap_or_default(),
            input.email.unwrap_or_default(),
            input.phone,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: Option<&str>, company: Option<&str>, email: Option<&str>) -> FormInput {
        FormInput {
            name: name.map(str::to_owned),
            company: company.map(str::to_owned),
            email: email.map(str::to_owned),
            phone: None,
        }
    }

    #[test]
    fn complete_input_is_accepted() {
        let submission =
            Submission::try_from(input(Some("A"), Some("B"), Some("a@b.com"))).unwrap();
        assert_eq!(submission.name(), "A");
        assert_eq!(submission.company(), "B");
        assert_eq!(submission.email(), "a@b.com");
        assert!(submission.phone().is_none());
    }

    #[test]
    fn each_missing_required_field_is_rejected() {
        let cases = [
            (input(None, Some("B"), Some("a@b.com")), vec!["name"]),
            (input(Some("A"), None, Some("a@b.com")), vec!["company"]),
            (input(Some("A"), Some("B"), None), vec!["email"]),
            (input(None, None, None), vec!["name", "company", "email"]),
        ];
        for (form, expected) in cases {
            let err = Submission::try_from(form).unwrap_err();
            assert_eq!(err.missing_fields(), expected.as_slice());
        }
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let err = Submission::try_from(input(Some(""), Some("B"), Some(""))).unwrap_err();
        assert_eq!(err.missing_fields(), &["name", "email"]);
        assert_eq!(
            err.to_string(),
            "name, company and email are required (missing: name, email)"
        );
    }

    #[test]
    fn email_shape_is_not_checked() {
        let submission = Submission::new("A", "B", "not an address", None).unwrap();
        assert_eq!(submission.email(), "not an address");
    }

    #[test]
    fn empty_phone_is_not_provided() {
        let submission = Submission::new("A", "B", "a@b.com", Some(String::new())).unwrap();
        assert!(submission.phone().is_none());

        let submission = Submission::new("A", "B", "a@b.com", Some("555".into())).unwrap();
        assert_eq!(submission.phone(), Some("555"));
    }

    #[test]
    fn json_scalars_are_stringified() {
        let form: FormInput = serde_json::from_value(serde_json::json!({
            "name": "A",
            "company": "B",
            "email": "a@b.com",
            "phone": 12345,
        }))
        .unwrap();
        assert_eq!(form.phone.as_deref(), Some("12345"));
    }

    #[test]
    fn json_null_and_missing_fields_are_none() {
        let form: FormInput =
            serde_json::from_value(serde_json::json!({ "name": null, "company": "B" })).unwrap();
        assert!(form.name.is_none());
        assert_eq!(form.company.as_deref(), Some("B"));
        assert!(form.email.is_none());
        assert!(form.phone.is_none());
    }

    #[test]
    fn falsy_json_values_are_absent() {
        let form: FormInput = serde_json::from_value(serde_json::json!({
            "name": false,
            "company": 0,
            "email": "",
            "phone": 0.0,
        }))
        .unwrap();
        assert!(form.name.is_none());
        assert!(form.company.is_none());
        assert!(form.email.is_none());
        assert!(form.phone.is_none());

        let err = Submission::try_from(form).unwrap_err();
        assert_eq!(err.missing_fields(), &["name", "company", "email"]);
    }

    #[test]
    fn truthy_scalars_are_kept() {
        let form: FormInput = serde_json::from_value(serde_json::json!({
            "name": true,
            "company": 7,
            "email": "a@b.com",
        }))
        .unwrap();
        assert_eq!(form.name.as_deref(), Some("true"));
        assert_eq!(form.company.as_deref(), Some("7"));
    }

    #[test]
    fn urlencoded_form_is_accepted() {
        let form: FormInput =
            serde_urlencoded::from_str("name=A&company=B%20Corp&email=a%40b.com").unwrap();
        assert_eq!(form.name.as_deref(), Some("A"));
        assert_eq!(form.company.as_deref(), Some("B Corp"));
        assert_eq!(form.email.as_deref(), Some("a@b.com"));
        assert!(form.phone.is_none());
    }
}
