// File: youtube-form/src/main.rs
// Purpose: Drive the YouTube registration form through a scripted user session

mod youtube;

use anyhow::Result;
use rusty_forms::{FieldPath, FormConfig, FormStateManager, SetValueOptions, SubmitOutcome};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = FormConfig::load_default().unwrap_or_else(|e| {
        warn!("Failed to load form config: {:#}, using defaults", e);
        FormConfig::default()
    });
    info!(mode = ?config.mode, re_validate = ?config.re_validate_mode, "youtube-form starting");

    let today = chrono::Local::now().date_naive();
    let mut form = youtube::build(config, today)?;

    let username_watch = form.subscribe("username", |event| {
        let username = event.values.get_path(&FieldPath::from("username"));
        info!(kind = ?event.kind, username = ?username.map(ToString::to_string), "watched username");
    });

    type_into(&mut form, "username", "Bruce");
    type_into(&mut form, "email", "bruce-at-wayne");
    type_into(&mut form, "channel", "batcave");
    type_into(&mut form, "social.twitter", "@batman");
    type_into(&mut form, "social.facebook", "bruce.wayne");
    type_into(&mut form, "phoneNumbers.0", "555-0100");
    type_into(&mut form, "age", "thirty");
    log_state(&form);

    submit(&mut form);
    if let Some(target) = form.focus_target() {
        info!(%target, "focus moved to first invalid field");
    }

    // fix the reported errors
    type_into(&mut form, "email", "bruce@wayne.com");
    type_into(&mut form, "phoneNumbers.1", "555-0101");
    type_into(&mut form, "age", "35");
    type_into(&mut form, "dob", "1989-02-19");

    {
        let mut phones = form.field_array(youtube::PHONE_LIST)?;
        phones.append(json!({ "number": "555-0102" }))?;
        phones.append(json!({ "number": "555-0103" }))?;
        phones.remove(1)?;
        for item in phones.fields() {
            info!(id = %item.id, index = item.index, value = %item.value, "phone row");
        }
    }
    youtube::register_phone_rows(&mut form)?;

    info!(values = %form.get_values(), "get values");
    form.set_value("username", "Batman", SetValueOptions::all());
    info!(username = ?form.watch("username").into_field(), "after set value");

    log_state(&form);
    submit(&mut form);

    form.unsubscribe(username_watch);
    println!("{}", form.inspect().to_json_pretty()?);
    Ok(())
}

/// Input then blur, like a user tabbing through the form
fn type_into(form: &mut FormStateManager, path: &str, raw: &str) {
    let path = FieldPath::from(path);
    form.handle_change(&path, raw);
    form.handle_blur(&path);
    if let Some(error) = form.errors().get(&path) {
        info!(field = %path, %error, "field error");
    }
}

fn log_state(form: &FormStateManager) {
    let state = form.form_state();
    info!(
        dirty = state.dirty_fields.len(),
        touched = state.touched_fields.len(),
        is_dirty = state.is_dirty,
        is_valid = state.is_valid,
        can_submit = state.can_submit(),
        "form state"
    );
}

fn submit(form: &mut FormStateManager) {
    let outcome = form.handle_submit(
        |snapshot| info!(values = %snapshot.values, "form submitted"),
        |errors| {
            for (path, error) in errors.iter() {
                warn!(field = %path, %error, "form error");
            }
        },
    );
    if outcome == SubmitOutcome::Invalid {
        info!(submit_count = form.form_state().submit_count, "submit rejected");
    }
}
