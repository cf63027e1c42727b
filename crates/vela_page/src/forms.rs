//! Form submission flow
//!
//! Submissions are intercepted, validated through a [`FormValidator`] and,
//! when valid, parked in a pending state: the submit control is disabled and
//! relabelled until the host reports completion with
//! [`FormCoordinator::complete`]. The core keeps no timers; the host decides
//! how long "sending" takes.
//!
//! The newsletter form has its own email-only flow and is never handled by
//! the general one.

use std::sync::OnceLock;

use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use vela_core::{ElementId, PageEvent};
use vela_platform::{Page, Selector};

use crate::config::{self, FormMessages, FormsConfig};

const FIELDS: &str = "input, textarea, select";
const EMAIL_INPUT: &str = "input[type=\"email\"]";
const ERROR_CLASS: &str = "has-error";
/// Input types that are controls rather than data and survive a reset
const CONTROL_TYPES: [&str; 4] = ["submit", "button", "reset", "hidden"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Decides whether a form may be submitted. May mark invalid fields.
pub trait FormValidator {
    fn validate(&self, page: &mut dyn Page, form: ElementId) -> bool;
}

/// Shows a transient message to the user
pub trait Notifier {
    fn notify(&self, message: &str, severity: Severity);
}

/// A message handed to the [`Notifier`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

pub fn is_valid_email(value: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
        .is_match(value)
}

/// Required fields must be non-blank; email fields must look like an
/// address. Invalid fields get the `has-error` class.
pub struct RequiredFieldsValidator {
    required: Selector,
}

impl RequiredFieldsValidator {
    pub fn new(required: Selector) -> Self {
        Self { required }
    }

    pub fn from_config(config: &FormsConfig) -> Option<Self> {
        config::compile(&config.required_fields, "forms").map(Self::new)
    }
}

impl FormValidator for RequiredFieldsValidator {
    fn validate(&self, page: &mut dyn Page, form: ElementId) -> bool {
        let mut valid = true;
        for field in page.query_within(form, &self.required) {
            let value = page.value(field).unwrap_or_default();
            let value = value.trim();
            let is_email = page.attribute(field, "type").as_deref() == Some("email");

            let ok = !value.is_empty() && (!is_email || is_valid_email(value));
            if ok {
                page.remove_class(field, ERROR_CLASS);
                page.remove_attribute(field, "aria-invalid");
            } else {
                page.add_class(field, ERROR_CLASS);
                page.set_attribute(field, "aria-invalid", "true");
                valid = false;
            }
        }
        valid
    }
}

/// Forwards notifications to the log
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => {
                tracing::info!(?severity, "{}", message)
            }
            Severity::Warning | Severity::Error => {
                tracing::warn!(?severity, "{}", message)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    General,
    Newsletter,
}

struct Pending {
    flow: Flow,
    control: Option<ElementId>,
    label: String,
}

pub struct FormCoordinator {
    forms: Vec<ElementId>,
    newsletter: Option<ElementId>,
    submit_control: Selector,
    fields: Selector,
    email_input: Selector,
    messages: FormMessages,
    validator: Box<dyn FormValidator>,
    notifier: Box<dyn Notifier>,
    pending: FxHashMap<ElementId, Pending>,
    last_notification: Option<Notification>,
}

impl FormCoordinator {
    /// Take over every form on the page. Returns `None` without forms.
    pub fn init(
        page: &dyn Page,
        config: &FormsConfig,
        validator: Box<dyn FormValidator>,
        notifier: Box<dyn Notifier>,
    ) -> Option<Self> {
        let forms = config::compile(&config.forms, "forms")?;
        let submit_control = config::compile(&config.submit_control, "forms")?;
        let fields = config::compile(FIELDS, "forms")?;
        let email_input = config::compile(EMAIL_INPUT, "forms")?;

        let newsletter = page
            .element_by_id(&config.newsletter_id)
            .filter(|&el| page.tag_name(el).as_deref() == Some("form"));
        let forms: Vec<ElementId> = page
            .query_all(&forms)
            .into_iter()
            .filter(|&f| Some(f) != newsletter)
            .collect();
        if forms.is_empty() && newsletter.is_none() {
            tracing::debug!("forms: no forms");
            return None;
        }
        tracing::debug!(
            forms = forms.len(),
            newsletter = newsletter.is_some(),
            "forms: wired"
        );

        Some(Self {
            forms,
            newsletter,
            submit_control,
            fields,
            email_input,
            messages: config.messages.clone(),
            validator,
            notifier,
            pending: FxHashMap::default(),
            last_notification: None,
        })
    }

    fn flow_of(&self, form: ElementId) -> Option<Flow> {
        if self.newsletter == Some(form) {
            Some(Flow::Newsletter)
        } else if self.forms.contains(&form) {
            Some(Flow::General)
        } else {
            None
        }
    }

    /// Intercept a submit event. Returns whether the form is one of ours.
    pub fn handle_submit(&mut self, page: &mut dyn Page, event: &mut PageEvent) -> bool {
        let Some(form) = event.target else {
            return false;
        };
        let Some(flow) = self.flow_of(form) else {
            return false;
        };
        event.prevent_default();

        if self.pending.contains_key(&form) {
            tracing::debug!(?form, "forms: already sending");
            return true;
        }
        match flow {
            Flow::General => self.submit_general(page, form),
            Flow::Newsletter => self.submit_newsletter(page, form),
        }
        true
    }

    fn submit_general(&mut self, page: &mut dyn Page, form: ElementId) {
        if !self.validator.validate(page, form) {
            tracing::debug!(?form, "forms: validation failed");
            return;
        }
        let control = page.query_within(form, &self.submit_control).first().copied();
        let label = control.map(|c| control_label(page, c)).unwrap_or_default();
        let sending = self.messages.sending.clone();
        self.begin(page, form, Flow::General, control, label, &sending);
    }

    fn submit_newsletter(&mut self, page: &mut dyn Page, form: ElementId) {
        let Some(input) = page.query_within(form, &self.email_input).first().copied() else {
            return;
        };
        let email = page.value(input).unwrap_or_default();
        if !is_valid_email(email.trim()) {
            let message = self.messages.invalid_email.clone();
            self.notify(&message, Severity::Error);
            page.focus(input);
            return;
        }
        let control = page.query_within(form, &self.submit_control).first().copied();
        let label = self.messages.subscribe_label.clone();
        let subscribing = self.messages.subscribing.clone();
        self.begin(page, form, Flow::Newsletter, control, label, &subscribing);
    }

    fn begin(
        &mut self,
        page: &mut dyn Page,
        form: ElementId,
        flow: Flow,
        control: Option<ElementId>,
        label: String,
        pending_label: &str,
    ) {
        if let Some(control) = control {
            page.set_attribute(control, "disabled", "");
            set_control_label(page, control, pending_label);
        }
        self.pending.insert(
            form,
            Pending {
                flow,
                control,
                label,
            },
        );
        tracing::debug!(?form, ?flow, "forms: sending");
    }

    /// Finish a pending submission: notify, reset the fields and restore the
    /// submit control. Returns `false` if `form` was not pending.
    pub fn complete(&mut self, page: &mut dyn Page, form: ElementId) -> bool {
        let Some(pending) = self.pending.remove(&form) else {
            return false;
        };
        let message = match pending.flow {
            Flow::General => self.messages.sent.clone(),
            Flow::Newsletter => self.messages.subscribed.clone(),
        };
        self.notify(&message, Severity::Success);

        for field in page.query_within(form, &self.fields) {
            if !is_control_input(page, field) {
                page.set_value(field, "");
            }
        }
        if let Some(control) = pending.control {
            page.remove_attribute(control, "disabled");
            set_control_label(page, control, &pending.label);
        }
        true
    }

    fn notify(&mut self, message: &str, severity: Severity) {
        self.notifier.notify(message, severity);
        self.last_notification = Some(Notification {
            message: message.to_string(),
            severity,
        });
    }

    pub fn is_pending(&self, form: ElementId) -> bool {
        self.pending.contains_key(&form)
    }

    /// Forms waiting for [`complete`](Self::complete), in no particular order
    pub fn pending_forms(&self) -> Vec<ElementId> {
        self.pending.keys().copied().collect()
    }

    pub fn last_notification(&self) -> Option<&Notification> {
        self.last_notification.as_ref()
    }

    pub fn newsletter(&self) -> Option<ElementId> {
        self.newsletter
    }
}

fn is_input(page: &dyn Page, el: ElementId) -> bool {
    page.tag_name(el)
        .is_some_and(|tag| tag.eq_ignore_ascii_case("input"))
}

fn is_control_input(page: &dyn Page, el: ElementId) -> bool {
    is_input(page, el)
        && page.attribute(el, "type").is_some_and(|ty| {
            CONTROL_TYPES
                .iter()
                .any(|control| ty.eq_ignore_ascii_case(control))
        })
}

/// `<input>` controls show their value, buttons their text
fn control_label(page: &dyn Page, control: ElementId) -> String {
    if is_input(page, control) {
        page.value(control).unwrap_or_default()
    } else {
        page.text_content(control)
    }
}

fn set_control_label(page: &mut dyn Page, control: ElementId, label: &str) {
    if is_input(page, control) {
        page.set_value(control, label);
    } else {
        page.set_text_content(control, label);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use vela_platform::{ElementSpec, HeadlessPage};

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(String, Severity)>>>);

    impl Notifier for Recorder {
        fn notify(&self, message: &str, severity: Severity) {
            self.0.lock().unwrap().push((message.to_string(), severity));
        }
    }

    struct Fixture {
        page: HeadlessPage,
        contact: ElementId,
        name: ElementId,
        email: ElementId,
        send: ElementId,
        newsletter: ElementId,
        subscribe_email: ElementId,
        subscribe: ElementId,
    }

    fn fixture() -> Fixture {
        let mut page = HeadlessPage::default();
        let body = page.body();
        let contact = page.insert(body, ElementSpec::new("form").class("contact-form"));
        let name = page.insert(contact, ElementSpec::new("input").attr("required", ""));
        let email = page.insert(
            contact,
            ElementSpec::new("input")
                .attr("type", "email")
                .attr("required", ""),
        );
        page.insert(contact, ElementSpec::new("textarea"));
        let send = page.insert(
            contact,
            ElementSpec::new("button").attr("type", "submit").text("Send"),
        );

        let newsletter = page.insert(body, ElementSpec::new("form").id("newsletter-form"));
        let subscribe_email =
            page.insert(newsletter, ElementSpec::new("input").attr("type", "email"));
        let subscribe = page.insert(
            newsletter,
            ElementSpec::new("button").attr("type", "submit").text("Subscribe"),
        );
        Fixture {
            page,
            contact,
            name,
            email,
            send,
            newsletter,
            subscribe_email,
            subscribe,
        }
    }

    fn coordinator(page: &HeadlessPage, recorder: &Recorder) -> FormCoordinator {
        let config = FormsConfig::default();
        FormCoordinator::init(
            page,
            &config,
            Box::new(RequiredFieldsValidator::from_config(&config).unwrap()),
            Box::new(recorder.clone()),
        )
        .unwrap()
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("chef@example.com"));
        assert!(!is_valid_email("chef@example"));
        assert!(!is_valid_email("chef @example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_invalid_form_is_blocked_and_marked() {
        let mut f = fixture();
        let recorder = Recorder::default();
        let mut forms = coordinator(&f.page, &recorder);

        f.page.set_value(f.name, "Ada");
        f.page.set_value(f.email, "not-an-email");
        let mut submit = PageEvent::submit(f.contact);
        assert!(forms.handle_submit(&mut f.page, &mut submit));
        assert!(submit.default_prevented);
        assert!(!forms.is_pending(f.contact));
        assert!(f.page.has_class(f.email, "has-error"));
        assert!(!f.page.has_class(f.name, "has-error"));
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_submission_round_trip() {
        let mut f = fixture();
        let recorder = Recorder::default();
        let mut forms = coordinator(&f.page, &recorder);

        f.page.set_value(f.name, "Ada");
        f.page.set_value(f.email, "ada@example.com");
        forms.handle_submit(&mut f.page, &mut PageEvent::submit(f.contact));
        assert!(forms.is_pending(f.contact));
        assert_eq!(f.page.text_content(f.send), "Sending...");
        assert!(f.page.attribute(f.send, "disabled").is_some());

        // A second submit while sending is swallowed
        assert!(forms.handle_submit(&mut f.page, &mut PageEvent::submit(f.contact)));

        assert!(forms.complete(&mut f.page, f.contact));
        assert!(!forms.complete(&mut f.page, f.contact));
        assert_eq!(f.page.text_content(f.send), "Send");
        assert_eq!(f.page.attribute(f.send, "disabled"), None);
        assert_eq!(f.page.value(f.name).as_deref(), Some(""));
        assert_eq!(
            forms.last_notification().map(|n| n.severity),
            Some(Severity::Success)
        );
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_input_submit_control_keeps_its_label() {
        let mut page = HeadlessPage::default();
        let body = page.body();
        let form = page.insert(body, ElementSpec::new("form"));
        let name = page.insert(form, ElementSpec::new("input").attr("required", ""));
        let token = page.insert(
            form,
            ElementSpec::new("input")
                .attr("type", "hidden")
                .value("t-42"),
        );
        let send = page.insert(
            form,
            ElementSpec::new("input")
                .attr("type", "submit")
                .value("Send"),
        );
        let recorder = Recorder::default();
        let mut forms = coordinator(&page, &recorder);

        page.set_value(name, "Ada");
        forms.handle_submit(&mut page, &mut PageEvent::submit(form));
        assert_eq!(page.value(send).as_deref(), Some("Sending..."));
        assert_eq!(page.text_content(send), "");

        forms.complete(&mut page, form);
        assert_eq!(page.value(send).as_deref(), Some("Send"));
        assert_eq!(page.value(token).as_deref(), Some("t-42"));
        assert_eq!(page.value(name).as_deref(), Some(""));
    }

    #[test]
    fn test_newsletter_flow() {
        let mut f = fixture();
        let recorder = Recorder::default();
        let mut forms = coordinator(&f.page, &recorder);
        assert_eq!(forms.newsletter(), Some(f.newsletter));

        f.page.set_value(f.subscribe_email, "nope");
        forms.handle_submit(&mut f.page, &mut PageEvent::submit(f.newsletter));
        assert!(!forms.is_pending(f.newsletter));
        assert_eq!(f.page.focused(), Some(f.subscribe_email));
        assert_eq!(
            recorder.0.lock().unwrap()[0],
            (
                "Please enter a valid email address".to_string(),
                Severity::Error
            )
        );

        f.page.set_value(f.subscribe_email, " chef@example.com ");
        forms.handle_submit(&mut f.page, &mut PageEvent::submit(f.newsletter));
        assert!(forms.is_pending(f.newsletter));
        assert_eq!(f.page.text_content(f.subscribe), "Subscribing...");

        forms.complete(&mut f.page, f.newsletter);
        assert_eq!(f.page.text_content(f.subscribe), "Subscribe");
        assert_eq!(f.page.value(f.subscribe_email).as_deref(), Some(""));
    }

    #[test]
    fn test_foreign_targets_are_ignored() {
        let mut f = fixture();
        let recorder = Recorder::default();
        let mut forms = coordinator(&f.page, &recorder);

        let body = f.page.body();
        let mut submit = PageEvent::submit(body);
        assert!(!forms.handle_submit(&mut f.page, &mut submit));
        assert!(!submit.default_prevented);
    }
}
