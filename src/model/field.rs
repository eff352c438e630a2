use serde::{Deserialize, Serialize};

/// One of the five registration form inputs, in form order.
#[derive(
    Clone,
    Copy,
    Debug,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    #[strum(to_string = "fullName", serialize = "full_name")]
    FullName,
    #[strum(to_string = "email")]
    Email,
    #[strum(to_string = "password")]
    Password,
    #[strum(to_string = "confirmPassword", serialize = "confirm_password")]
    ConfirmPassword,
    #[strum(to_string = "dateOfBirth", serialize = "date_of_birth")]
    DateOfBirth,
}

impl Field {
    /// Human readable label used in messages and prompts.
    pub fn label(&self) -> &'static str {
        use Field::*;

        match self {
            FullName => "Full Name",
            Email => "Email Address",
            Password => "Password",
            ConfirmPassword => "Confirm Password",
            DateOfBirth => "Date of Birth",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_wire_and_rust_names() {
        assert_eq!("fullName".parse::<Field>().unwrap(), Field::FullName);
        assert_eq!("full_name".parse::<Field>().unwrap(), Field::FullName);
        assert_eq!("confirm_password".parse::<Field>().unwrap(), Field::ConfirmPassword);
        assert_eq!("dateOfBirth".parse::<Field>().unwrap(), Field::DateOfBirth);
        assert!("nickname".parse::<Field>().is_err());
    }

    #[test]
    fn displays_wire_name() {
        assert_eq!(Field::ConfirmPassword.to_string(), "confirmPassword");
        assert_eq!(Field::Email.to_string(), "email");
    }

    #[test]
    fn iterates_in_form_order() {
        let fields: Vec<Field> = Field::iter().collect();
        assert_eq!(
            fields,
            vec![
                Field::FullName,
                Field::Email,
                Field::Password,
                Field::ConfirmPassword,
                Field::DateOfBirth
            ]
        );
    }
}
