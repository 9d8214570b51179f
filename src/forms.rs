//! Raw form inputs, one struct per submit surface.
//!
//! Each form lists the fields it gates submission on. Values are kept as
//! typed so validation sees exactly what the user entered.

use crate::ui::Field;
use crate::validation::{FieldCheck, validate};

#[derive(Clone, Debug, Default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default)]
pub struct LinkForm {
    pub title: String,
    pub url: String,
}

/// A form whose fields can be checked before submission.
pub trait Form {
    /// `(field, raw value)` pairs, in display order.
    fn fields(&self) -> Vec<(Field, &str)>;

    /// Validate every field.
    fn checks(&self) -> Vec<(Field, FieldCheck)> {
        self.fields()
            .into_iter()
            .map(|(field, raw)| (field, validate(field, raw)))
            .collect()
    }
}

impl Form for SignupForm {
    fn fields(&self) -> Vec<(Field, &str)> {
        vec![
            (Field::Username, self.username.as_str()),
            (Field::Email, self.email.as_str()),
            (Field::Password, self.password.as_str()),
        ]
    }
}

impl Form for LoginForm {
    fn fields(&self) -> Vec<(Field, &str)> {
        vec![(Field::Email, self.email.as_str()), (Field::LoginPassword, self.password.as_str())]
    }
}

impl Form for LinkForm {
    fn fields(&self) -> Vec<(Field, &str)> {
        vec![(Field::Title, self.title.as_str()), (Field::Url, self.url.as_str())]
    }
}
