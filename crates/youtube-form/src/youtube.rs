// File: youtube-form/src/youtube.rs
// Purpose: The YouTube channel registration form: defaults, fields and rules

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rusty_forms::{ElementRef, FieldPath, FieldRules, FormConfig, FormStateManager, Result, Value};
use serde_json::json;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?",
    )
    .unwrap()
});

pub const PHONE_LIST: &str = "phNumbers";

/// Default values, with `dob` starting at `today`
pub fn defaults(today: NaiveDate) -> Value {
    let mut values = Value::from(json!({
        "username": "",
        "email": "",
        "channel": "",
        "social": { "twitter": "", "facebook": "" },
        "phoneNumbers": ["", ""],
        "phNumbers": [{ "number": "" }],
        "age": 0
    }));
    values.set_path(&FieldPath::from("dob"), Value::from(today));
    values
}

fn channel_is_empty(values: &Value) -> bool {
    values
        .get_path(&FieldPath::from("channel"))
        .map_or(true, Value::is_empty)
}

/// Build the form and register every input with its rules and element
pub fn build(config: FormConfig, today: NaiveDate) -> Result<FormStateManager> {
    let mut form = FormStateManager::new(defaults(today)).with_config(config);

    let fields: Vec<(&str, &str, FieldRules)> = vec![
        (
            "username",
            "username",
            FieldRules::new()
                .required("Username is required")
                .validate(|value, _| match value.as_str() {
                    Some("admin@example.com") => Err("Enter a different email address".into()),
                    _ => Ok(()),
                }),
        ),
        (
            "email",
            "email",
            FieldRules::new().pattern(EMAIL_REGEX.clone(), "Invalid email format"),
        ),
        ("channel", "channel", FieldRules::new().required("Channel is required")),
        (
            "social.twitter",
            "twitter",
            FieldRules::new()
                .required("Twitter handler is required")
                .disabled_when(channel_is_empty),
        ),
        (
            "social.facebook",
            "facebook",
            FieldRules::new().required("Facebook username is required"),
        ),
        (
            "phoneNumbers.0",
            "primary-phone",
            FieldRules::new().required("Primary phone is required"),
        ),
        (
            "phoneNumbers.1",
            "secondary-phone",
            FieldRules::new().required("Secondary phone is required"),
        ),
        (
            "age",
            "age",
            FieldRules::new().value_as_number().required("Age is required"),
        ),
        (
            "dob",
            "dob",
            FieldRules::new()
                .value_as_date()
                .required("Date of birth is required"),
        ),
    ];

    for (path, element, rules) in fields {
        let binding = form.register(path, rules)?;
        binding.set_ref(&mut form, Some(ElementRef::new(element)));
    }

    register_phone_rows(&mut form)?;
    Ok(form)
}

/// Register the `number` input of every row in the phone list
pub fn register_phone_rows(form: &mut FormStateManager) -> Result<()> {
    let rows = form.field_array(PHONE_LIST)?.len();
    for index in 0..rows {
        let path = FieldPath::from(PHONE_LIST).index(index).key("number");
        form.register(path, FieldRules::new())?;
    }
    Ok(())
}
